//! In-memory gateway that records every call.
//!
//! Enabled with the `mock` feature. Customers live in memory, IDs are
//! sequential (`cust_1`, `pm_2`, `tx_3`, ...), and any operation can be made
//! to fail.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use async_trait::async_trait;

use btpay_core::{
    ClientTokenRequest, Customer, CustomerId, CustomerRequest, CustomerSearch, PaymentMethod,
    PaymentMethodRequest, Subscription, SubscriptionRequest, Transaction, TransactionRequest,
};

use crate::error::GatewayError;
use crate::gateway::PaymentGateway;

/// Gateway operations, used to count calls and inject failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    /// `generate_client_token`
    ClientToken,
    /// `search_customers`
    SearchCustomers,
    /// `find_customer`
    FindCustomer,
    /// `create_customer`
    CreateCustomer,
    /// `create_payment_method`
    CreatePaymentMethod,
    /// `create_transaction`
    CreateTransaction,
    /// `create_subscription`
    CreateSubscription,
}

/// A recorded gateway call with its request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    /// Client token request.
    ClientToken(ClientTokenRequest),
    /// Customer search.
    SearchCustomers(CustomerSearch),
    /// Customer lookup.
    FindCustomer(CustomerId),
    /// Customer creation.
    CreateCustomer(CustomerRequest),
    /// Payment method vaulting.
    CreatePaymentMethod(PaymentMethodRequest),
    /// Transaction creation.
    CreateTransaction(TransactionRequest),
    /// Subscription creation.
    CreateSubscription(SubscriptionRequest),
}

impl Call {
    /// The operation this call belongs to.
    #[must_use]
    pub fn operation(&self) -> Operation {
        match self {
            Self::ClientToken(_) => Operation::ClientToken,
            Self::SearchCustomers(_) => Operation::SearchCustomers,
            Self::FindCustomer(_) => Operation::FindCustomer,
            Self::CreateCustomer(_) => Operation::CreateCustomer,
            Self::CreatePaymentMethod(_) => Operation::CreatePaymentMethod,
            Self::CreateTransaction(_) => Operation::CreateTransaction,
            Self::CreateSubscription(_) => Operation::CreateSubscription,
        }
    }
}

#[derive(Debug, Default)]
struct State {
    customers: Vec<Customer>,
    failures: HashMap<Operation, String>,
    calls: Vec<Call>,
    next_id: u64,
}

impl State {
    fn next_id(&mut self, prefix: &str) -> String {
        self.next_id += 1;
        format!("{prefix}_{}", self.next_id)
    }
}

/// Recording in-memory [`PaymentGateway`].
#[derive(Debug, Default)]
pub struct RecordingGateway {
    state: Mutex<State>,
    latency: Option<Duration>,
}

impl RecordingGateway {
    /// An empty gateway with no customers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a customer.
    #[must_use]
    pub fn with_customer(self, customer: Customer) -> Self {
        self.lock().customers.push(customer);
        self
    }

    /// Make an operation fail with an API error.
    #[must_use]
    pub fn failing(self, operation: Operation, message: impl Into<String>) -> Self {
        self.lock().failures.insert(operation, message.into());
        self
    }

    /// Sleep before answering each call.
    #[must_use]
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Every call so far, in order.
    #[must_use]
    pub fn calls(&self) -> Vec<Call> {
        self.lock().calls.clone()
    }

    /// Number of calls made to one operation.
    #[must_use]
    pub fn count(&self, operation: Operation) -> usize {
        self.lock()
            .calls
            .iter()
            .filter(|c| c.operation() == operation)
            .count()
    }

    /// All client token requests, in order.
    #[must_use]
    pub fn client_token_requests(&self) -> Vec<ClientTokenRequest> {
        self.lock()
            .calls
            .iter()
            .filter_map(|c| match c {
                Call::ClientToken(r) => Some(r.clone()),
                _ => None,
            })
            .collect()
    }

    /// All transaction requests, in order.
    #[must_use]
    pub fn transaction_requests(&self) -> Vec<TransactionRequest> {
        self.lock()
            .calls
            .iter()
            .filter_map(|c| match c {
                Call::CreateTransaction(r) => Some(r.clone()),
                _ => None,
            })
            .collect()
    }

    /// Current customers, including ones created through the gateway.
    #[must_use]
    pub fn customers(&self) -> Vec<Customer> {
        self.lock().customers.clone()
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        // A panic while holding the lock only happens inside a failing test.
        self.state.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    async fn record(&self, call: Call) -> Result<MutexGuard<'_, State>, GatewayError> {
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
        let operation = call.operation();
        let mut state = self.lock();
        state.calls.push(call);
        match state.failures.get(&operation) {
            Some(message) => Err(GatewayError::Api {
                message: message.clone(),
                error_class: None,
            }),
            None => Ok(state),
        }
    }
}

/// Build a customer record for seeding a [`RecordingGateway`].
///
/// # Panics
///
/// Panics if `id` is blank.
#[must_use]
pub fn customer(id: &str, email: &str) -> Customer {
    Customer {
        id: id.parse().expect("customer id must not be blank"),
        legacy_id: None,
        email: Some(email.to_string()),
        first_name: None,
        last_name: None,
        payment_methods: Vec::new(),
    }
}

#[async_trait]
impl PaymentGateway for RecordingGateway {
    async fn generate_client_token(
        &self,
        request: &ClientTokenRequest,
    ) -> Result<String, GatewayError> {
        drop(self.record(Call::ClientToken(request.clone())).await?);

        let mut token = String::from("client-token");
        if let Some(customer_id) = &request.customer_id {
            token.push_str(&format!(":customer={customer_id}"));
        }
        if let Some(merchant) = &request.merchant_account_id {
            token.push_str(&format!(":merchant={merchant}"));
        }
        Ok(token)
    }

    async fn search_customers(
        &self,
        search: &CustomerSearch,
    ) -> Result<Vec<Customer>, GatewayError> {
        let state = self.record(Call::SearchCustomers(search.clone())).await?;
        Ok(state
            .customers
            .iter()
            .filter(|c| c.email.as_deref() == Some(search.email_is.as_str()))
            .cloned()
            .collect())
    }

    async fn find_customer(&self, id: &CustomerId) -> Result<Option<Customer>, GatewayError> {
        let state = self.record(Call::FindCustomer(id.clone())).await?;
        Ok(state.customers.iter().find(|c| &c.id == id).cloned())
    }

    async fn create_customer(&self, request: &CustomerRequest) -> Result<Customer, GatewayError> {
        let mut state = self.record(Call::CreateCustomer(request.clone())).await?;
        let customer = Customer {
            id: state.next_id("cust").parse()?,
            legacy_id: None,
            email: request.email.clone(),
            first_name: request.first_name.clone(),
            last_name: request.last_name.clone(),
            payment_methods: Vec::new(),
        };
        state.customers.push(customer.clone());
        Ok(customer)
    }

    async fn create_payment_method(
        &self,
        request: &PaymentMethodRequest,
    ) -> Result<PaymentMethod, GatewayError> {
        let mut state = self
            .record(Call::CreatePaymentMethod(request.clone()))
            .await?;
        let token = state.next_id("pm").parse()?;
        let owner = state
            .customers
            .iter_mut()
            .find(|c| c.id == request.customer_id)
            .ok_or_else(|| GatewayError::NotFound(format!("customer {}", request.customer_id)))?;

        let method = PaymentMethod {
            token,
            image_url: None,
            is_default: owner.payment_methods.is_empty(),
        };
        owner.payment_methods.push(method.clone());
        Ok(method)
    }

    async fn create_transaction(
        &self,
        request: &TransactionRequest,
    ) -> Result<Transaction, GatewayError> {
        let mut state = self.record(Call::CreateTransaction(request.clone())).await?;
        let status = if request.submit_for_settlement {
            "SUBMITTED_FOR_SETTLEMENT"
        } else {
            "AUTHORIZED"
        };
        Ok(Transaction {
            id: state.next_id("tx").parse()?,
            status: status.to_string(),
            amount: Some(request.amount),
            order_id: request.order_id.clone(),
        })
    }

    async fn create_subscription(
        &self,
        request: &SubscriptionRequest,
    ) -> Result<Subscription, GatewayError> {
        let mut state = self
            .record(Call::CreateSubscription(request.clone()))
            .await?;
        Ok(Subscription {
            id: state.next_id("sub").parse()?,
            status: Some("ACTIVE".to_string()),
            transaction_count: 1,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn client_tokens_are_recorded_and_lock_is_released() {
        let gateway = RecordingGateway::new();
        let scoped = ClientTokenRequest {
            customer_id: Some("cust_1".parse().unwrap()),
            merchant_account_id: Some("usd_account".parse().unwrap()),
        };

        let generic = gateway
            .generate_client_token(&ClientTokenRequest::default())
            .await
            .unwrap();
        let token = gateway.generate_client_token(&scoped).await.unwrap();

        assert_eq!(generic, "client-token");
        assert_eq!(token, "client-token:customer=cust_1:merchant=usd_account");
        assert_eq!(gateway.count(Operation::ClientToken), 2);
        assert_eq!(gateway.client_token_requests()[1], scoped);
    }

    #[tokio::test]
    async fn injected_failure_is_still_recorded() {
        let gateway = RecordingGateway::new().failing(Operation::ClientToken, "down");

        let err = gateway
            .generate_client_token(&ClientTokenRequest::default())
            .await
            .unwrap_err();

        assert!(matches!(err, GatewayError::Api { message, .. } if message == "down"));
        assert_eq!(gateway.calls().len(), 1);
    }

    #[tokio::test]
    async fn vaulting_needs_a_known_customer() {
        let gateway = RecordingGateway::new().with_customer(customer("cust_1", "a@example.com"));
        let request = |id: &str| PaymentMethodRequest {
            customer_id: id.parse().unwrap(),
            nonce: "nonce".into(),
            verify_card: false,
        };

        let method = gateway.create_payment_method(&request("cust_1")).await.unwrap();
        assert!(method.is_default);

        let err = gateway
            .create_payment_method(&request("cust_404"))
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }
}
