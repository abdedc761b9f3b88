//! Binding errors
//!
//! The engine itself never fails: unsupported controls are skipped and
//! serialization problems degrade to raw values. These errors cover the
//! host edges around it.

use pstate_dom::{DomError, NodeId};
use pstate_storage::StorageError;

#[derive(Debug, thiserror::Error)]
pub enum BindingError {
    #[error("Node {node} is not a <{expected}> element")]
    NotAContainer { node: NodeId, expected: String },

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("DOM error: {0}")]
    Dom(#[from] DomError),

    #[error("Invalid configuration: {0}")]
    Config(#[from] serde_json::Error),
}
