use crate::model::Operation;
use crate::store::StoreError;
use crate::validation::ValidationErrors;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SmsdbError {
    #[error("Validation failed: {0}")]
    Validation(ValidationErrors),

    #[error("{entity} with {field} '{value}' already exists")]
    Conflict {
        entity: &'static str,
        field: String,
        value: String,
    },

    #[error("{entity} not found: {key}")]
    NotFound { entity: &'static str, key: String },

    #[error("{entity} does not support {operation}")]
    UnsupportedOperation {
        entity: &'static str,
        operation: Operation,
    },

    #[error("Unknown entity: {0}")]
    UnknownEntity(String),

    #[error("Storage error: {0}")]
    Storage(#[from] StoreError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Config error: {0}")]
    Config(String),
}

impl SmsdbError {
    /// Stable, machine-readable name of the error kind.
    pub fn kind(&self) -> &'static str {
        match self {
            SmsdbError::Validation(_) => "validation",
            SmsdbError::Conflict { .. } => "conflict",
            SmsdbError::NotFound { .. } => "not_found",
            SmsdbError::UnsupportedOperation { .. } => "unsupported_operation",
            SmsdbError::UnknownEntity(_) => "unknown_entity",
            SmsdbError::Storage(_) | SmsdbError::Io(_) | SmsdbError::Serialization(_) => {
                "storage"
            }
            SmsdbError::Config(_) => "config",
        }
    }

    pub fn violations(&self) -> Option<&ValidationErrors> {
        match self {
            SmsdbError::Validation(errors) => Some(errors),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, SmsdbError>;
