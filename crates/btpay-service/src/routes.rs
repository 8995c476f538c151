//! Router configuration.
//!
//! This module sets up the Axum router with all routes and middleware.

use std::sync::Arc;
use std::time::Duration;

use axum::routing::{get, post};
use axum::Router;
use tower::limit::ConcurrencyLimitLayer;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::handlers::{forms, subscriptions, transactions};
use crate::state::AppState;

/// Maximum concurrent requests for the payment form posts.
/// Each one makes several sequential gateway calls.
const PAYMENT_MAX_CONCURRENT_REQUESTS: usize = 32;

/// Create the service router with all routes and middleware.
///
/// # Routes
///
/// ## Pages
/// - `GET /` - Blank index
/// - `GET /t` - Card payment form
/// - `GET /s` - Subscription form
/// - `GET /c?email=` - Subscription form for a known customer
/// - `GET /l` - Login form
///
/// ## Payments (rate-limited)
/// - `POST /checkout` - Create customer and subscription
/// - `POST /createtransaction` - Charge a raw card
/// - `POST /createusersubscription` - Charge a new or returning customer
pub fn create_router(state: AppState) -> Router {
    let max_body_bytes = state.config.max_body_bytes;
    let request_timeout_seconds = state.config.request_timeout_seconds;

    let state = Arc::new(state);

    let payment_routes = Router::new()
        .route("/checkout", post(subscriptions::create_subscription))
        .route("/createtransaction", post(transactions::create_transaction))
        .route(
            "/createusersubscription",
            post(transactions::create_customer_subscription),
        )
        .layer(ConcurrencyLimitLayer::new(PAYMENT_MAX_CONCURRENT_REQUESTS));

    Router::new()
        .route("/", get(forms::show_index))
        .route("/t", get(forms::show_form))
        .route("/s", get(forms::show_subscription_form))
        .route("/c", get(forms::show_user_subscription_form))
        .route("/l", get(forms::show_login_form))
        .merge(payment_routes)
        // Global middleware
        .layer(TraceLayer::new_for_http())
        .layer(RequestBodyLimitLayer::new(max_body_bytes))
        .layer(TimeoutLayer::new(Duration::from_secs(
            request_timeout_seconds,
        )))
        .with_state(state)
}
