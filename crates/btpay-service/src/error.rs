//! Handler error type.
//!
//! Every failure is rendered as a `200 OK` HTML page carrying the message,
//! so browsers driving the demo forms always see what went wrong.

use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};

use btpay_core::{CoreError, CustomerId};
use btpay_gateway::GatewayError;

use crate::views;

/// Handler error.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A required form field was empty or absent.
    #[error("{0} is empty")]
    MissingField(&'static str),

    /// The posted body exceeded the configured size limit.
    #[error("request body too large")]
    BodyTooLarge,

    /// The customer has nothing vaulted to charge.
    #[error("no payment methods for customer {0}")]
    NoPaymentMethods(CustomerId),

    /// The requested payment method index does not exist.
    #[error("payment method index {index} out of range for {available} payment methods")]
    PaymentMethodOutOfRange {
        /// Index posted by the form.
        index: i64,
        /// Number of vaulted payment methods.
        available: usize,
    },

    /// Invalid input value.
    #[error(transparent)]
    Invalid(#[from] CoreError),

    /// Payment gateway failure.
    #[error(transparent)]
    Gateway(#[from] GatewayError),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match &self {
            Self::Gateway(e) => tracing::error!(error = %e, "Payment gateway request failed"),
            other => tracing::error!(error = %other, "Request rejected"),
        }

        (StatusCode::OK, Html(views::failure(&self.to_string()))).into_response()
    }
}
