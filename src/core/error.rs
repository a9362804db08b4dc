use thiserror::Error;

#[derive(Error, Debug)]
pub enum QuotaError {
    /// Startup-time misconfiguration (window policy, config file contents).
    #[error("Configuration error: {0}")]
    Configuration(String),
    /// A value handed to the core that it refuses to clamp or guess around.
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Failed to read plan catalog: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse plan catalog: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, QuotaError>;

impl QuotaError {
    pub fn configuration(msg: impl Into<String>) -> Self {
        QuotaError::Configuration(msg.into())
    }

    pub fn invalid_input(msg: impl Into<String>) -> Self {
        QuotaError::InvalidInput(msg.into())
    }
}
