//! Payment Error Types

use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, PaymentError>;

/// Payment-provisioning errors
#[derive(Error, Debug)]
pub enum PaymentError {
    /// Stripe API call failed
    #[error("Stripe error: {0}")]
    Stripe(String),

    /// The product lookup itself failed (distinct from "not found"), so the
    /// caller can choose fail-open or fail-closed
    #[error("Product lookup failed: {0}")]
    LookupFailed(String),

    /// Stripe returned a record missing a field we require
    #[error("Unexpected Stripe response: {0}")]
    MalformedResponse(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}
