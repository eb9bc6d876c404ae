//! Manager-domain errors, converting into [`nebula_error::CoreError`] at
//! the crate boundary (spec §4.F, §7).

use thiserror::Error;

/// Errors raised by [`crate::WorkflowManager`] operations.
#[derive(Debug, Error)]
pub enum ManagerError {
    #[error("no workflow with id '{0}'")]
    WorkflowNotFound(String),

    #[error("workflow '{0}' is not active")]
    NotActive(String),

    #[error("invalid cron expression in node '{node_id}': {reason}")]
    InvalidCron { node_id: String, reason: String },

    #[error("unrecognized event_type '{0}'")]
    UnknownEventType(String),

    #[error(transparent)]
    Workflow(#[from] nebula_workflow::WorkflowError),

    #[error(transparent)]
    Execution(#[from] nebula_execution::ExecutionError),

    #[error(transparent)]
    Storage(#[from] nebula_storage::StorageError),

    #[error(transparent)]
    Serializer(#[from] nebula_serializer::SerializerError),

    #[error("malformed patch: {0}")]
    Serde(#[from] serde_json::Error),
}

impl From<ManagerError> for nebula_error::CoreError {
    fn from(err: ManagerError) -> Self {
        match err {
            ManagerError::WorkflowNotFound(id) => nebula_error::CoreError::NotFound(id),
            ManagerError::NotActive(id) => nebula_error::CoreError::InvalidState(format!(
                "workflow '{id}' is not active"
            )),
            ManagerError::InvalidCron { node_id, reason } => nebula_error::CoreError::Validation {
                path: format!("nodes[{node_id}].cron_expression"),
                reason,
            },
            ManagerError::UnknownEventType(kind) => nebula_error::CoreError::Validation {
                path: "event_type".to_string(),
                reason: format!("unrecognized event_type '{kind}'"),
            },
            ManagerError::Workflow(inner) => inner.into(),
            ManagerError::Execution(inner) => inner.into(),
            ManagerError::Storage(inner) => inner.into(),
            ManagerError::Serializer(inner) => inner.into(),
            ManagerError::Serde(inner) => nebula_error::CoreError::Validation {
                path: "<patch>".to_string(),
                reason: inner.to_string(),
            },
        }
    }
}
