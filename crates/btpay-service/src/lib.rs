//! btpay HTTP service.
//!
//! A small demo server for Braintree payments:
//!
//! - Client token issuance, optionally scoped to a customer found by email
//! - Drop-in and raw card payment forms
//! - Subscription checkout and one-off sales against vaulted methods
//!
//! All routes answer `200 OK`; failures are described in the page body.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::missing_errors_doc)] // Axum handlers all return Result
#![allow(clippy::unused_async)] // Page handlers are async for the router

pub mod config;
pub mod error;
pub mod handlers;
pub mod resolver;
pub mod routes;
pub mod state;
pub mod views;

pub use config::{load_env_file, ConfigError, ServiceConfig};
pub use error::AppError;
pub use resolver::{generate_client_token, ClientTokenGenerator, Resolution};
pub use routes::create_router;
pub use state::AppState;
