//! One-off sale handlers.

use std::sync::Arc;

use axum::extract::rejection::FormRejection;
use axum::extract::State;
use axum::response::Html;
use axum::Form;
use serde::Deserialize;

use btpay_core::{
    Amount, CreditCard, CustomField, Customer, CustomerId, CustomerRequest, PaymentMethod,
    PaymentMethodRequest, PaymentSource, TransactionRequest,
};
use btpay_gateway::PaymentGateway;

use crate::error::AppError;
use crate::state::AppState;
use crate::views;

use super::{form_or_default, non_empty};

/// Amount charged by the card form, in cents.
const CARD_SALE_CENTS: i64 = 100;

/// First sale for a newly created customer.
const NEW_CUSTOMER_SALE_CENTS: i64 = 5555;
const NEW_CUSTOMER_ORDER_ID: &str = "234234";

/// Sale against a returning customer's vaulted method.
const RETURNING_CUSTOMER_SALE_CENTS: i64 = 222;
const RETURNING_CUSTOMER_ORDER_ID: &str = "12345";

/// Custom field tagging customers created by the demo.
const USER_ID_FIELD: &str = "userid";
const DEMO_USER_ID: &str = "1234";

/// Raw card fields posted to `/createtransaction`.
#[derive(Debug, Default, Deserialize)]
pub struct CardForm {
    /// Card number.
    #[serde(default)]
    pub number: String,
    /// Card verification value.
    #[serde(default)]
    pub cvv: String,
    /// Expiration month.
    #[serde(default)]
    pub month: String,
    /// Expiration year.
    #[serde(default)]
    pub year: String,
}

/// Charge a raw card for `1.00` without settling.
pub async fn create_transaction(
    State(state): State<Arc<AppState>>,
    form: Result<Form<CardForm>, FormRejection>,
) -> Result<Html<String>, AppError> {
    tracing::info!("New request: create transaction");
    let form = form_or_default(form)?;

    let card = CreditCard {
        number: form.number,
        cvv: form.cvv,
        expiration_month: form.month,
        expiration_year: form.year,
    };
    tracing::info!(card = ?card, "Charging card");

    let request =
        TransactionRequest::sale(Amount::from_minor(CARD_SALE_CENTS)?, PaymentSource::Card(card));
    let transaction = state.gateway.create_transaction(&request).await?;

    tracing::info!(
        transaction_id = %transaction.id,
        status = %transaction.status,
        "Transaction success"
    );
    Ok(Html(views::TRANSACTION_SUCCESS.to_string()))
}

/// Fields posted by the user subscription form.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CustomerPaymentForm {
    /// Nonce from the drop-in UI.
    pub payment_method_nonce: String,
    /// Position of the vaulted method to charge, counted from the newest.
    pub payment_method_index: String,
    /// Customer ID resolved when the form was rendered.
    pub client_id: String,
    /// Customer email.
    pub email: String,
}

/// Charge a customer, creating them first if the posted ID is unknown.
///
/// New customers get the nonce vaulted and a `55.55` sale. Returning
/// customers are charged `2.22` on the selected vaulted method. The sale
/// outcome is only logged; the body is `Success! ` either way.
pub async fn create_customer_subscription(
    State(state): State<Arc<AppState>>,
    form: Result<Form<CustomerPaymentForm>, FormRejection>,
) -> Result<Html<String>, AppError> {
    tracing::info!("New request: create customer subscription");
    let form = form_or_default(form)?;

    let nonce =
        non_empty(&form.payment_method_nonce).ok_or(AppError::MissingField("paymentMethodNonce"))?;
    tracing::info!(
        client_id = %form.client_id,
        email = %form.email,
        payment_method_index = %form.payment_method_index,
        "Looking up customer"
    );

    let gateway = state.gateway.as_ref();
    let request = match find_customer(gateway, &form.client_id).await {
        None => {
            tracing::info!("Customer not found, creating new customer");
            let customer = gateway
                .create_customer(&CustomerRequest {
                    first_name: Some("John".into()),
                    last_name: Some("Doe1".into()),
                    email: non_empty(&form.email),
                    custom_fields: vec![CustomField::new(USER_ID_FIELD, DEMO_USER_ID)],
                })
                .await?;
            tracing::info!(customer_id = %customer.id, "Created customer");

            let method = gateway
                .create_payment_method(&PaymentMethodRequest {
                    customer_id: customer.id,
                    nonce,
                    verify_card: false,
                })
                .await?;
            tracing::info!(token = %method.token, "Vaulted payment method");

            TransactionRequest::sale(
                Amount::from_minor(NEW_CUSTOMER_SALE_CENTS)?,
                PaymentSource::Token(method.token),
            )
            .with_order_id(NEW_CUSTOMER_ORDER_ID)
        }
        Some(customer) => {
            tracing::info!(customer_id = %customer.id, "Customer exists, using its payment method");
            log_payment_methods(&customer);
            let method = select_payment_method(
                &customer.id,
                &customer.payment_methods,
                &form.payment_method_index,
            )?;
            tracing::info!(token = %method.token, "Selected payment method");

            TransactionRequest::sale(
                Amount::from_minor(RETURNING_CUSTOMER_SALE_CENTS)?,
                PaymentSource::Token(method.token.clone()),
            )
            .with_order_id(RETURNING_CUSTOMER_ORDER_ID)
        }
    };

    match gateway.create_transaction(&request).await {
        Ok(transaction) => tracing::info!(
            transaction_id = %transaction.id,
            status = %transaction.status,
            "Transaction created"
        ),
        Err(e) => tracing::error!(error = %e, "Create transaction failed"),
    }

    Ok(Html("Success! ".to_string()))
}

/// Look a customer up by the posted ID. Lookup failures count as not found.
async fn find_customer(gateway: &dyn PaymentGateway, client_id: &str) -> Option<Customer> {
    let id: CustomerId = client_id.parse().ok()?;
    match gateway.find_customer(&id).await {
        Ok(customer) => customer,
        Err(e) => {
            tracing::error!(customer_id = %id, error = %e, "Customer lookup failed");
            None
        }
    }
}

fn log_payment_methods(customer: &Customer) {
    tracing::info!(count = customer.payment_methods.len(), "Customer payment methods");
    for (i, method) in customer.payment_methods.iter().enumerate() {
        tracing::debug!(
            index = i,
            token = %method.token,
            image_url = ?method.image_url,
            "Payment method"
        );
    }
    if let Some(default) = customer.default_payment_method() {
        tracing::info!(token = %default.token, "Default payment method");
    }
}

/// Pick the method `index` positions from the end of the list.
///
/// An unparsable index counts as `0`, i.e. the newest method.
fn select_payment_method<'a>(
    customer_id: &CustomerId,
    methods: &'a [PaymentMethod],
    raw_index: &str,
) -> Result<&'a PaymentMethod, AppError> {
    if methods.is_empty() {
        return Err(AppError::NoPaymentMethods(customer_id.clone()));
    }

    let index = raw_index.trim().parse::<i64>().unwrap_or(0);
    let available = methods.len();
    let position = i64::try_from(available)
        .ok()
        .and_then(|len| len.checked_sub(index)?.checked_sub(1))
        .and_then(|p| usize::try_from(p).ok());

    position
        .and_then(|p| methods.get(p))
        .ok_or(AppError::PaymentMethodOutOfRange { index, available })
}
