//! Subscription checkout.

use std::sync::Arc;

use axum::extract::rejection::FormRejection;
use axum::extract::State;
use axum::response::Html;
use axum::Form;
use serde::Deserialize;

use btpay_core::{CustomerRequest, PaymentMethodRequest, SubscriptionRequest};

use crate::error::AppError;
use crate::state::AppState;

use super::{form_or_default, non_empty};

/// Fields posted by the subscription form.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CheckoutForm {
    /// Nonce from the drop-in UI.
    pub payment_method_nonce: String,
}

/// Subscribe a fresh customer to the configured plan.
pub async fn create_subscription(
    State(state): State<Arc<AppState>>,
    form: Result<Form<CheckoutForm>, FormRejection>,
) -> Result<Html<String>, AppError> {
    tracing::info!("New request: checkout");
    let nonce = non_empty(&form_or_default(form)?.payment_method_nonce)
        .ok_or(AppError::MissingField("paymentMethodNonce"))?;

    let gateway = state.gateway.as_ref();
    let customer = gateway.create_customer(&CustomerRequest::default()).await?;
    tracing::info!(customer_id = %customer.id, "Created customer");

    let method = gateway
        .create_payment_method(&PaymentMethodRequest {
            customer_id: customer.id.clone(),
            nonce,
            verify_card: false,
        })
        .await?;

    let subscription = gateway
        .create_subscription(&SubscriptionRequest {
            plan_id: state.config.plan_id.clone(),
            payment_method_token: method.token,
        })
        .await?;

    tracing::info!(
        subscription_id = %subscription.id,
        plan_id = %state.config.plan_id,
        status = ?subscription.status,
        transactions = subscription.transaction_count,
        "Subscription created"
    );

    Ok(Html(format!(
        "Success! Subscription #{} created with user ID {}",
        subscription.id, customer.id
    )))
}
