use thiserror::Error;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("validation error: {0}")]
    Validation(String),
    #[error("invalid status transition from {from} to {to}")]
    InvalidTransition { from: String, to: String },
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ModelError {
    pub fn validation(msg: impl Into<String>) -> Self {
        ModelError::Validation(msg.into())
    }

    pub fn transition(from: impl std::fmt::Display, to: impl std::fmt::Display) -> Self {
        ModelError::InvalidTransition { from: from.to_string(), to: to.to_string() }
    }
}
