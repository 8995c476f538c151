//! Page handlers that render the demo forms.

use std::sync::Arc;

use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::response::Html;
use serde::Deserialize;

use crate::error::AppError;
use crate::state::AppState;
use crate::views;

use super::non_empty;

/// Index page. Intentionally blank.
pub async fn show_index() -> Html<&'static str> {
    tracing::info!("New request: index");
    Html("")
}

/// Card payment form with a generic client token.
pub async fn show_form(State(state): State<Arc<AppState>>) -> Result<Html<String>, AppError> {
    tracing::info!("New request: payment form");
    let token = state.generic_token().token().await?;
    Ok(Html(views::payment_form(&token)))
}

/// Drop-in subscription form.
///
/// A token failure still renders the form, with an empty token.
pub async fn show_subscription_form(State(state): State<Arc<AppState>>) -> Html<String> {
    tracing::info!("New request: subscription form");
    let token = match state.generic_token().token().await {
        Ok(token) => token,
        Err(e) => {
            tracing::error!(error = %e, "Failed to create client token");
            String::new()
        }
    };
    Html(views::subscription_form(&token))
}

/// Query for the user subscription form.
#[derive(Debug, Default, Deserialize)]
pub struct CustomerQuery {
    /// Customer email to look up.
    #[serde(default)]
    pub email: String,
}

/// Drop-in form bound to the customer with the given email, if one exists.
pub async fn show_user_subscription_form(
    State(state): State<Arc<AppState>>,
    query: Result<Query<CustomerQuery>, QueryRejection>,
) -> Result<Html<String>, AppError> {
    tracing::info!("New request: user subscription form");
    let email = query.map(|Query(q)| q.email).unwrap_or_default();
    let email = non_empty(&email);
    tracing::info!(email = ?email, "Resolving customer");

    let generator = state.customer_token(email.clone());
    let resolution = generator.resolve().await?;
    let client_id = resolution
        .customer
        .as_ref()
        .map(|c| c.id.to_string())
        .unwrap_or_default();

    Ok(Html(views::user_subscription_form(
        &resolution.token,
        &client_id,
        email.as_deref().unwrap_or_default(),
    )))
}

/// Email form leading to the user subscription form.
pub async fn show_login_form() -> Html<String> {
    tracing::info!("New request: login form");
    Html(views::login_form())
}
