//! DOM errors

use crate::NodeId;

/// Errors raised by fallible DOM operations
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DomError {
    #[error("Invalid custom element name: {0}")]
    InvalidCustomElementName(String),

    #[error("Custom element already defined: {0}")]
    AlreadyDefined(String),

    #[error("Node {0} is not an element")]
    NotAnElement(NodeId),
}
