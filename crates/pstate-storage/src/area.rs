//! Storage scopes
//!
//! A `StorageArea` pairs one durable and one session backend, the way a
//! browsing context exposes `localStorage` and `sessionStorage`.

use std::fmt;

use crate::{KeyValueStore, Storage};

/// Which backend partition a value lives in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum StorageScope {
    /// Survives restarts
    #[default]
    Durable,
    /// Lives as long as the session
    Session,
}

impl StorageScope {
    /// Scope selected by a container's `type` attribute: `"session"` picks
    /// the session scope, anything else (including absent) is durable
    pub fn from_type_attr(attr: Option<&str>) -> Self {
        match attr {
            Some("session") => Self::Session,
            _ => Self::Durable,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Durable => "durable",
            Self::Session => "session",
        }
    }
}

impl fmt::Display for StorageScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Durable + session backends
pub struct StorageArea {
    durable: Box<dyn KeyValueStore>,
    session: Box<dyn KeyValueStore>,
}

impl StorageArea {
    /// Area over arbitrary backends
    pub fn new(durable: Box<dyn KeyValueStore>, session: Box<dyn KeyValueStore>) -> Self {
        Self { durable, session }
    }

    /// Both scopes in memory
    pub fn in_memory() -> Self {
        Self::new(Box::new(Storage::session()), Box::new(Storage::session()))
    }

    /// Backend for a scope
    pub fn scope(&self, scope: StorageScope) -> &dyn KeyValueStore {
        match scope {
            StorageScope::Durable => self.durable.as_ref(),
            StorageScope::Session => self.session.as_ref(),
        }
    }

    /// Mutable backend for a scope
    pub fn scope_mut(&mut self, scope: StorageScope) -> &mut dyn KeyValueStore {
        match scope {
            StorageScope::Durable => self.durable.as_mut(),
            StorageScope::Session => self.session.as_mut(),
        }
    }

    /// Remove entries starting with `prefix` from both scopes
    pub fn clear_prefix(&mut self, prefix: &str) -> usize {
        self.durable.clear_prefix(prefix) + self.session.clear_prefix(prefix)
    }
}

impl Default for StorageArea {
    fn default() -> Self {
        Self::in_memory()
    }
}

impl fmt::Debug for StorageArea {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StorageArea")
            .field("durable", &self.durable.entries().len())
            .field("session", &self.session.entries().len())
            .finish()
    }
}
