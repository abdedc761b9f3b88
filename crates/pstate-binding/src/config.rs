//! Binding Configuration

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::BindingError;

/// Prefix of every fully-qualified entry key
pub const DEFAULT_PREFIX: &str = "PersistentStateRegistry";

/// Instance id used when a container has neither `key` nor `id`
pub const GLOBAL_INSTANCE_ID: &str = "GLOBAL";

/// Tag of the scoping element
pub const CONTAINER_TAG: &str = "persistent-state";

/// Binding configuration options
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Entry key prefix, also used by `reset_all`
    pub prefix: String,

    /// Instance id sentinel for anonymous containers
    pub global_instance_id: String,

    /// Custom element name of the container
    pub container_tag: String,

    /// File backing the durable scope (in memory when None)
    pub durable_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            prefix: DEFAULT_PREFIX.to_string(),
            global_instance_id: GLOBAL_INSTANCE_ID.to_string(),
            container_tag: CONTAINER_TAG.to_string(),
            durable_path: None,
        }
    }
}

impl Config {
    /// Parse a JSON configuration; missing fields take their defaults
    pub fn from_json(json: &str) -> Result<Self, BindingError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Use a file for the durable scope
    pub fn with_durable_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.durable_path = Some(path.into());
        self
    }
}
