//! Workflow-domain errors, converting into [`nebula_error::CoreError`] at
//! the crate boundary.

use thiserror::Error;

/// Errors raised while constructing or validating a [`crate::Workflow`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum WorkflowError {
    /// An edge referenced a node id that doesn't exist in the workflow.
    #[error("edge '{edge_id}' references unknown node '{node_id}'")]
    DanglingEdge { edge_id: String, node_id: String },

    /// Two nodes in the same workflow share an id.
    #[error("duplicate node id '{0}'")]
    DuplicateNodeId(String),

    /// Two edges in the same workflow share an id.
    #[error("duplicate edge id '{0}'")]
    DuplicateEdgeId(String),

    /// No node of a start type (`event_start`/`schedule_start`) exists.
    #[error("workflow has no start node")]
    NoStartNode,

    /// An update tried to set a version that doesn't strictly increase.
    #[error("version must increase: {old} -> {new}")]
    NonMonotonicVersion { old: u64, new: u64 },
}

impl From<WorkflowError> for nebula_error::CoreError {
    fn from(err: WorkflowError) -> Self {
        nebula_error::CoreError::Validation {
            path: "workflow".to_string(),
            reason: err.to_string(),
        }
    }
}
