//! Gateway error types.

use btpay_core::{CoreError, IdError};

/// Errors that can occur when talking to the payment provider.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Provider answered with a non-success status and no readable error body.
    #[error("unexpected HTTP status {status}")]
    Status {
        /// HTTP status code.
        status: u16,
    },

    /// Provider returned one or more API errors.
    #[error("Braintree API error: {message}")]
    Api {
        /// Error message (multiple errors are joined with `; `).
        message: String,
        /// Provider error class (`VALIDATION`, `AUTHORIZATION`, ...).
        error_class: Option<String>,
    },

    /// The requested object does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// Response did not have the expected shape.
    #[error("unexpected response: {0}")]
    Decode(String),

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Configuration(String),
}

impl From<CoreError> for GatewayError {
    fn from(err: CoreError) -> Self {
        Self::Decode(err.to_string())
    }
}

impl From<IdError> for GatewayError {
    fn from(err: IdError) -> Self {
        Self::Decode(err.to_string())
    }
}

impl GatewayError {
    /// Whether the error means the object does not exist.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}
