//! Braintree gateway client for btpay.
//!
//! [`PaymentGateway`] is the seam the HTTP service depends on.
//! [`BraintreeClient`] implements it over the provider's GraphQL API.
//!
//! # Example
//!
//! ```no_run
//! use btpay_core::ClientTokenRequest;
//! use btpay_gateway::{BraintreeClient, BraintreeCredentials, Environment, PaymentGateway};
//!
//! # async fn example() -> Result<(), btpay_gateway::GatewayError> {
//! let client = BraintreeClient::new(
//!     Environment::Sandbox,
//!     BraintreeCredentials::new("merchant-id", "public-key", "private-key"),
//! )?;
//!
//! let token = client
//!     .generate_client_token(&ClientTokenRequest::default())
//!     .await?;
//! println!("client token: {token}");
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

mod client;
mod environment;
mod error;
mod gateway;
mod graphql;
#[cfg(feature = "mock")]
pub mod mock;

pub use client::{BraintreeClient, BraintreeCredentials, ClientOptions, DEFAULT_API_VERSION};
pub use environment::Environment;
pub use error::GatewayError;
pub use gateway::PaymentGateway;
