//! Serializer errors.

/// Errors from YAML import/export (spec §4.C).
#[derive(Debug, thiserror::Error)]
pub enum SerializerError {
    #[error("malformed YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("missing required field '{0}'")]
    MissingField(&'static str),

    #[error("invalid value for field '{field}': {value}")]
    InvalidField { field: &'static str, value: String },
}

impl From<SerializerError> for nebula_error::CoreError {
    fn from(err: SerializerError) -> Self {
        nebula_error::CoreError::Validation {
            path: "serializer".to_string(),
            reason: err.to_string(),
        }
    }
}
