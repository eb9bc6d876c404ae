//! Persistence adapter errors (spec §7 `persistence`).

/// Errors from a [`crate::PersistenceAdapter`] implementation.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("no workflow record with id '{0}'")]
    WorkflowNotFound(String),

    #[error("no execution record with id '{0}'")]
    ExecutionNotFound(String),

    #[error("malformed record field '{field}': {reason}")]
    MalformedRecord { field: &'static str, reason: String },
}

impl From<StorageError> for nebula_error::CoreError {
    fn from(err: StorageError) -> Self {
        match &err {
            StorageError::WorkflowNotFound(id) | StorageError::ExecutionNotFound(id) => {
                nebula_error::CoreError::NotFound(id.clone())
            }
            StorageError::MalformedRecord { .. } => {
                nebula_error::CoreError::Persistence(err.to_string())
            }
        }
    }
}
