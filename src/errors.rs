use thiserror::Error;

/// Error type that captures projection and configuration failures.
#[derive(Debug, Error)]
pub enum ProjectionError {
    #[error("Transaction missing required field `{0}`")]
    MissingField(&'static str),
    #[error("Transaction `when` must be a calendar date or a recurrence source, got `{0}`")]
    InvalidWhenType(String),
    #[error("Invalid recurrence rule: {0}")]
    InvalidRecurrence(String),
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}
