//! Executor errors (spec §4.D, §7).

use nebula_core::NodeId;

/// Errors from the graph executor.
#[derive(Debug, thiserror::Error)]
pub enum ExecutionError {
    /// `execute` was called on a workflow whose status isn't `Active`.
    #[error("workflow is not active")]
    NotActive,

    /// No node matched the given trigger as a start node.
    #[error("no start node for the given trigger")]
    NoStart,

    /// Every queued node has an unsatisfied predecessor.
    #[error("unsatisfiable dependencies: starved with {remaining} node(s) still queued")]
    UnsatisfiableDependencies { remaining: usize },

    /// A node's handler reported `Failed` and `error_handler` is `stop`.
    #[error("node '{node_id}' failed: {message}")]
    HandlerFailure { node_id: NodeId, message: String },

    /// A node exceeded its configured timeout.
    #[error("node '{node_id}' timed out after {duration:?}")]
    Timeout {
        node_id: NodeId,
        duration: std::time::Duration,
    },

    /// The execution was cancelled via its cancellation token.
    #[error("execution cancelled")]
    Cancelled,

    /// An illegal internal state transition was attempted.
    #[error("invalid execution state transition: {from} -> {to}")]
    InvalidTransition { from: &'static str, to: &'static str },

    /// The node registry has no constructor for a node referenced by the
    /// workflow graph.
    #[error(transparent)]
    Node(#[from] nebula_node::NodeError),
}

impl From<ExecutionError> for nebula_error::CoreError {
    fn from(err: ExecutionError) -> Self {
        match err {
            ExecutionError::NotActive => {
                nebula_error::CoreError::InvalidState("workflow is not active".to_string())
            }
            ExecutionError::NoStart => nebula_error::CoreError::NoStart,
            ExecutionError::UnsatisfiableDependencies { remaining } => {
                nebula_error::CoreError::UnsatisfiableDependencies(format!(
                    "{remaining} node(s) starved"
                ))
            }
            ExecutionError::HandlerFailure { node_id, message } => {
                nebula_error::CoreError::HandlerFailure {
                    node_id: node_id.to_string(),
                    message,
                }
            }
            ExecutionError::Timeout { duration, .. } => nebula_error::CoreError::Timeout(duration),
            ExecutionError::Cancelled => nebula_error::CoreError::Cancelled,
            ExecutionError::InvalidTransition { .. } => {
                nebula_error::CoreError::InvalidState(err.to_string())
            }
            ExecutionError::Node(inner) => {
                nebula_error::CoreError::Validation {
                    path: "node".to_string(),
                    reason: inner.to_string(),
                }
            }
        }
    }
}
