//! # Nebula Error
//!
//! The top-level error enum the Manager, Executor, and CLI speak:
//! [`CoreError`]. Per-crate errors (`nebula_node::NodeError`,
//! `nebula_workflow::WorkflowError`, `nebula_storage::StorageError`) convert
//! into it via `#[from]`, mirroring a layered error-crate design where each
//! domain owns its own `thiserror` enum and a shared top carries them all.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Shared result alias used throughout the workflow execution core.
pub type Result<T> = std::result::Result<T, CoreError>;

/// Top-level error taxonomy for the workflow execution core.
///
/// Variant names mirror spec §7's error kinds directly so a controller
/// layer can map them onto HTTP status codes without re-deriving the
/// classification.
#[derive(Debug, Error, Clone, Serialize, Deserialize)]
#[non_exhaustive]
pub enum CoreError {
    /// The referenced entity does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// A workflow, node, or edge definition failed structural validation.
    #[error("validation error at {path}: {reason}")]
    Validation { path: String, reason: String },

    /// An operation was attempted in an invalid lifecycle state
    /// (e.g. `execute` on a non-Active workflow).
    #[error("invalid state: {0}")]
    InvalidState(String),

    /// No start node matched the given trigger.
    #[error("no matching start node for trigger")]
    NoStart,

    /// The BFS traversal starved: every queued node has an unsatisfied
    /// predecessor.
    #[error("unsatisfiable dependencies: {0}")]
    UnsatisfiableDependencies(String),

    /// A node handler reported `Failed`.
    #[error("handler failure in node '{node_id}': {message}")]
    HandlerFailure { node_id: String, message: String },

    /// A node or execution exceeded its configured timeout.
    #[error("timeout after {0:?}")]
    Timeout(std::time::Duration),

    /// The execution was cancelled via its cancellation token.
    #[error("execution cancelled")]
    Cancelled,

    /// The persistence adapter failed.
    #[error("persistence error: {0}")]
    Persistence(String),
}

impl CoreError {
    /// Short machine-readable code for controller-layer HTTP mapping.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "not_found",
            Self::Validation { .. } => "validation",
            Self::InvalidState(_) => "invalid_state",
            Self::NoStart => "no_start",
            Self::UnsatisfiableDependencies(_) => "unsatisfiable_dependencies",
            Self::HandlerFailure { .. } => "handler_failure",
            Self::Timeout(_) => "timeout",
            Self::Cancelled => "cancelled",
            Self::Persistence(_) => "persistence",
        }
    }

    /// The HTTP status code a thin controller would map this to.
    #[must_use]
    pub fn http_status(&self) -> u16 {
        match self {
            Self::NotFound(_) => 404,
            Self::Validation { .. } | Self::NoStart | Self::UnsatisfiableDependencies(_) => 400,
            Self::InvalidState(_) => 409,
            Self::HandlerFailure { .. } | Self::Timeout(_) | Self::Persistence(_) => 500,
            Self::Cancelled => 499,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_match_spec_kinds() {
        assert_eq!(CoreError::NotFound("x".into()).code(), "not_found");
        assert_eq!(CoreError::NoStart.code(), "no_start");
        assert_eq!(
            CoreError::UnsatisfiableDependencies("x".into()).code(),
            "unsatisfiable_dependencies"
        );
        assert_eq!(CoreError::Cancelled.code(), "cancelled");
    }

    #[test]
    fn http_status_mapping() {
        assert_eq!(CoreError::NotFound("x".into()).http_status(), 404);
        assert_eq!(
            CoreError::Validation {
                path: "nodes[0]".into(),
                reason: "bad".into()
            }
            .http_status(),
            400
        );
        assert_eq!(CoreError::InvalidState("draft".into()).http_status(), 409);
    }

    #[test]
    fn serde_roundtrip() {
        let err = CoreError::HandlerFailure {
            node_id: "n1".into(),
            message: "boom".into(),
        };
        let json = serde_json::to_string(&err).unwrap();
        let back: CoreError = serde_json::from_str(&json).unwrap();
        assert_eq!(err.code(), back.code());
    }

    #[test]
    fn display_messages() {
        assert_eq!(
            CoreError::Validation {
                path: "edges[0].target".into(),
                reason: "unknown node".into()
            }
            .to_string(),
            "validation error at edges[0].target: unknown node"
        );
    }
}
