//! Error Types

use thiserror::Error;

/// Result type alias for funnel operations
pub type Result<T> = std::result::Result<T, FunnelError>;

/// Funnel error types
#[derive(Error, Debug)]
pub enum FunnelError {
    /// Missing or invalid configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Document store (Notion) request failed
    #[error("Store error: {0}")]
    Store(String),

    /// A stored record could not be interpreted
    #[error("Malformed record: {0}")]
    MalformedRecord(String),

    /// Chat notification (LINE) failed
    #[error("Notify error: {0}")]
    Notify(String),

    /// Transactional email (Resend) failed
    #[error("Mail error: {0}")]
    Mail(String),

    /// Request body could not be parsed
    #[error("Parse error: {0}")]
    Parse(String),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Other/unknown error
    #[error("{0}")]
    Other(String),
}

impl FunnelError {
    /// Convert to a short message suitable for an API response
    pub fn user_message(&self) -> String {
        match self {
            FunnelError::Config(msg) => format!("Service configuration error: {}", msg),
            FunnelError::Store(msg) => format!("Lead store error: {}", msg),
            FunnelError::Parse(msg) => format!("Invalid request body: {}", msg),
            FunnelError::Json(e) => format!("Invalid request body: {}", e),
            other => other.to_string(),
        }
    }
}

impl From<anyhow::Error> for FunnelError {
    fn from(err: anyhow::Error) -> Self {
        FunnelError::Other(err.to_string())
    }
}
