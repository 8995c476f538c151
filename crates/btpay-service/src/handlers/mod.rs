//! Request handlers.
//!
//! Every handler answers `200 OK`. Failures are rendered into the body by
//! [`AppError`](crate::error::AppError).

use axum::extract::rejection::FormRejection;
use axum::http::StatusCode;
use axum::Form;

use crate::error::AppError;

pub mod forms;
pub mod subscriptions;
pub mod transactions;

/// Unwrap a posted form, falling back to all-empty fields when the body
/// cannot be decoded. A body over the size limit is reported as such.
fn form_or_default<T: Default>(form: Result<Form<T>, FormRejection>) -> Result<T, AppError> {
    match form {
        Ok(Form(fields)) => Ok(fields),
        Err(rejection) if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE => {
            Err(AppError::BodyTooLarge)
        }
        Err(rejection) => {
            tracing::warn!(error = %rejection, "Unreadable form body, treating fields as empty");
            Ok(T::default())
        }
    }
}

/// `None` for blank input, otherwise the trimmed value.
fn non_empty(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}
