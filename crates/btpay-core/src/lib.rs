//! Core types for btpay.
//!
//! This crate provides the payment domain types shared by the gateway client
//! and the HTTP service:
//!
//! - **Identifiers**: `CustomerId`, `PaymentMethodToken`, `TransactionId`, `SubscriptionId`,
//!   `MerchantAccountId`, `PlanId`
//! - **Money**: `Amount`
//! - **Customers**: `Customer`, `PaymentMethod`, `CustomerRequest`, `CustomerSearch`,
//!   `CustomerMatchPolicy`
//! - **Transactions**: `TransactionRequest`, `PaymentSource`, `CreditCard`, `Transaction`
//! - **Subscriptions and tokens**: `SubscriptionRequest`, `Subscription`, `ClientTokenRequest`

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod customer;
pub mod error;
pub mod ids;
pub mod money;
pub mod transaction;

pub use customer::{
    CustomField, Customer, CustomerMatchPolicy, CustomerRequest, CustomerSearch, PaymentMethod,
};
pub use error::{CoreError, Result};
pub use ids::{
    CustomerId, IdError, MerchantAccountId, PaymentMethodToken, PlanId, SubscriptionId,
    TransactionId,
};
pub use money::Amount;
pub use transaction::{
    ClientTokenRequest, CreditCard, PaymentMethodRequest, PaymentSource, Subscription,
    SubscriptionRequest, Transaction, TransactionKind, TransactionRequest,
    CUSTOM_FIELD_STORE_ID, CUSTOM_FIELD_STORE_NAME, CUSTOM_FIELD_SUBSCRIPTION_START,
};
