//! Node registry and handler errors.

use nebula_core::NodeKey;

/// Errors from node registry operations.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum NodeError {
    /// No handler constructor is registered for this key.
    #[error("node type not found: {0}")]
    NotFound(NodeKey),

    /// A constructor is already registered under this key.
    #[error("node type '{0}' already registered")]
    AlreadyExists(NodeKey),

    /// The raw node_type string failed key normalization.
    #[error("invalid node key: {0}")]
    InvalidKey(#[from] nebula_core::NodeKeyError),
}
