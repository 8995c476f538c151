//! The payment gateway abstraction.

use async_trait::async_trait;

use btpay_core::{
    ClientTokenRequest, Customer, CustomerId, CustomerRequest, CustomerSearch, PaymentMethod,
    PaymentMethodRequest, Subscription, SubscriptionRequest, Transaction, TransactionRequest,
};

use crate::error::GatewayError;

/// Operations the service needs from a payment provider.
///
/// Implementations must be safe to share between request handlers.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Issue a client token. An empty request yields a generic token.
    async fn generate_client_token(
        &self,
        request: &ClientTokenRequest,
    ) -> Result<String, GatewayError>;

    /// Search customers.
    async fn search_customers(
        &self,
        search: &CustomerSearch,
    ) -> Result<Vec<Customer>, GatewayError>;

    /// Look up a customer by ID. Returns `None` if it does not exist.
    async fn find_customer(&self, id: &CustomerId) -> Result<Option<Customer>, GatewayError>;

    /// Create a customer.
    async fn create_customer(&self, request: &CustomerRequest) -> Result<Customer, GatewayError>;

    /// Vault a nonce as a reusable payment method.
    async fn create_payment_method(
        &self,
        request: &PaymentMethodRequest,
    ) -> Result<PaymentMethod, GatewayError>;

    /// Create a transaction.
    async fn create_transaction(
        &self,
        request: &TransactionRequest,
    ) -> Result<Transaction, GatewayError>;

    /// Start a subscription.
    async fn create_subscription(
        &self,
        request: &SubscriptionRequest,
    ) -> Result<Subscription, GatewayError>;
}
