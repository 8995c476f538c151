//! Braintree GraphQL API client implementation.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde_json::{json, Map, Value};

use btpay_core::{
    ClientTokenRequest, Customer, CustomerId, CustomerRequest, CustomerSearch, PaymentMethod,
    PaymentMethodRequest, PaymentSource, Subscription, SubscriptionRequest, Transaction,
    TransactionRequest,
};

use crate::environment::Environment;
use crate::error::GatewayError;
use crate::gateway::PaymentGateway;
use crate::graphql::{
    self, Aliased, ClientTokenPayload, CustomerNode, CustomerPayload, GraphQlError,
    GraphQlRequest, GraphQlResponse, PaymentMethodPayload, SearchData, SubscriptionPayload,
    TransactionPayload,
};

/// API version sent in the `Braintree-Version` header.
pub const DEFAULT_API_VERSION: &str = "2019-01-01";

/// Error class the provider uses for missing objects.
const NOT_FOUND_CLASS: &str = "NOT_FOUND";

/// API credentials from the provider control panel.
#[derive(Clone)]
pub struct BraintreeCredentials {
    /// Merchant ID.
    pub merchant_id: String,
    /// Public key (basic auth user).
    pub public_key: String,
    /// Private key (basic auth password).
    pub private_key: String,
}

impl BraintreeCredentials {
    /// Bundle credentials.
    pub fn new(
        merchant_id: impl Into<String>,
        public_key: impl Into<String>,
        private_key: impl Into<String>,
    ) -> Self {
        Self {
            merchant_id: merchant_id.into(),
            public_key: public_key.into(),
            private_key: private_key.into(),
        }
    }

    fn validate(&self) -> Result<(), GatewayError> {
        for (name, value) in [
            ("merchant_id", &self.merchant_id),
            ("public_key", &self.public_key),
            ("private_key", &self.private_key),
        ] {
            if value.trim().is_empty() {
                return Err(GatewayError::Configuration(format!("{name} is empty")));
            }
        }
        Ok(())
    }
}

impl fmt::Debug for BraintreeCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BraintreeCredentials")
            .field("merchant_id", &self.merchant_id)
            .field("public_key", &self.public_key)
            .field("private_key", &"<redacted>")
            .finish()
    }
}

/// Client options for customization.
#[derive(Debug, Clone)]
pub struct ClientOptions {
    /// Request timeout in seconds (default: 30).
    pub timeout_seconds: u64,
    /// Endpoint override; the environment's endpoint is used when `None`.
    pub endpoint: Option<String>,
    /// Value of the `Braintree-Version` header.
    pub api_version: String,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            timeout_seconds: 30,
            endpoint: None,
            api_version: DEFAULT_API_VERSION.to_string(),
        }
    }
}

impl ClientOptions {
    /// Options pointing at a custom endpoint.
    #[must_use]
    pub fn with_endpoint(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: Some(endpoint.into()),
            ..Self::default()
        }
    }
}

/// Braintree API client.
#[derive(Debug, Clone)]
pub struct BraintreeClient {
    client: Client,
    environment: Environment,
    endpoint: String,
    credentials: BraintreeCredentials,
    api_version: String,
}

impl BraintreeClient {
    /// Create a client for an environment.
    ///
    /// # Errors
    ///
    /// Returns an error if a credential is blank or the HTTP client cannot be built.
    pub fn new(
        environment: Environment,
        credentials: BraintreeCredentials,
    ) -> Result<Self, GatewayError> {
        Self::with_options(environment, credentials, ClientOptions::default())
    }

    /// Create a client with custom options.
    ///
    /// # Errors
    ///
    /// Returns an error if a credential is blank or the HTTP client cannot be built.
    pub fn with_options(
        environment: Environment,
        credentials: BraintreeCredentials,
        options: ClientOptions,
    ) -> Result<Self, GatewayError> {
        credentials.validate()?;

        let client = Client::builder()
            .timeout(Duration::from_secs(options.timeout_seconds))
            .build()?;

        let endpoint = options
            .endpoint
            .unwrap_or_else(|| environment.graphql_url().to_string());

        Ok(Self {
            client,
            environment,
            endpoint,
            credentials,
            api_version: options.api_version,
        })
    }

    /// The environment this client targets.
    #[must_use]
    pub fn environment(&self) -> Environment {
        self.environment
    }

    /// The endpoint requests are sent to.
    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// The merchant ID the client was configured with.
    #[must_use]
    pub fn merchant_id(&self) -> &str {
        &self.credentials.merchant_id
    }

    /// Send one GraphQL operation and decode its `data`.
    async fn execute<T: DeserializeOwned>(
        &self,
        operation: &str,
        query: String,
        variables: Value,
    ) -> Result<T, GatewayError> {
        let request = GraphQlRequest {
            query,
            variables,
            operation_name: operation,
        };

        tracing::debug!(operation, endpoint = %self.endpoint, "Sending Braintree request");

        let response = self
            .client
            .post(&self.endpoint)
            .basic_auth(
                &self.credentials.public_key,
                Some(&self.credentials.private_key),
            )
            .header("Braintree-Version", &self.api_version)
            .json(&request)
            .send()
            .await?;

        self.handle_response(operation, response).await
    }

    /// Handle API response and convert errors.
    async fn handle_response<T: DeserializeOwned>(
        &self,
        operation: &str,
        response: reqwest::Response,
    ) -> Result<T, GatewayError> {
        let status = response.status();
        let body: Result<GraphQlResponse<T>, _> = response.json().await;

        match body {
            Ok(envelope) if !envelope.errors.is_empty() => {
                let err = api_error(envelope.errors);
                tracing::debug!(operation, error = %err, "Braintree returned errors");
                Err(err)
            }
            Ok(_) if !status.is_success() => Err(GatewayError::Status {
                status: status.as_u16(),
            }),
            Ok(envelope) => envelope
                .data
                .ok_or_else(|| GatewayError::Decode(format!("{operation}: response has no data"))),
            Err(e) if status.is_success() => {
                Err(GatewayError::Decode(format!("{operation}: {e}")))
            }
            Err(_) => Err(GatewayError::Status {
                status: status.as_u16(),
            }),
        }
    }

    /// The payment method id to charge; raw cards are tokenized first.
    async fn payment_method_id(&self, source: &PaymentSource) -> Result<String, GatewayError> {
        match source {
            PaymentSource::Token(token) => Ok(token.to_string()),
            PaymentSource::Nonce(nonce) => Ok(nonce.clone()),
            PaymentSource::Card(card) => {
                tracing::debug!(last_four = %card.last_four(), "Tokenizing credit card");
                let variables = json!({
                    "input": {
                        "creditCard": {
                            "number": card.number,
                            "expirationMonth": card.expiration_month,
                            "expirationYear": card.expiration_year,
                            "cvv": card.cvv,
                        }
                    }
                });
                let data: Aliased<PaymentMethodPayload> = self
                    .execute(
                        "TokenizeCreditCard",
                        graphql::TOKENIZE_CREDIT_CARD.to_string(),
                        variables,
                    )
                    .await?;
                Ok(required(data, "tokenizeCreditCard")?.payment_method.id)
            }
        }
    }
}

#[async_trait]
impl PaymentGateway for BraintreeClient {
    async fn generate_client_token(
        &self,
        request: &ClientTokenRequest,
    ) -> Result<String, GatewayError> {
        let mut token = Map::new();
        if let Some(customer_id) = &request.customer_id {
            token.insert("customerId".into(), json!(customer_id));
        }
        if let Some(merchant_account_id) = &request.merchant_account_id {
            token.insert("merchantAccountId".into(), json!(merchant_account_id));
        }
        let variables = if token.is_empty() {
            json!({})
        } else {
            json!({ "input": { "clientToken": token } })
        };

        let data: Aliased<ClientTokenPayload> = self
            .execute(
                "CreateClientToken",
                graphql::CREATE_CLIENT_TOKEN.to_string(),
                variables,
            )
            .await?;

        Ok(required(data, "createClientToken")?.client_token)
    }

    async fn search_customers(
        &self,
        search: &CustomerSearch,
    ) -> Result<Vec<Customer>, GatewayError> {
        let variables = json!({ "input": { "email": { "is": search.email_is } } });

        let data: SearchData = self
            .execute(
                "SearchCustomers",
                format!("{}{}", graphql::SEARCH_CUSTOMERS, graphql::CUSTOMER_FIELDS),
                variables,
            )
            .await?;

        data.search
            .customers
            .into_nodes()
            .map(Customer::try_from)
            .collect()
    }

    async fn find_customer(&self, id: &CustomerId) -> Result<Option<Customer>, GatewayError> {
        let result: Result<Aliased<CustomerNode>, _> = self
            .execute(
                "FindCustomer",
                format!("{}{}", graphql::FIND_CUSTOMER, graphql::CUSTOMER_FIELDS),
                json!({ "id": id }),
            )
            .await;

        match result {
            Ok(data) => data.result.map(Customer::try_from).transpose(),
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(e),
        }
    }

    async fn create_customer(&self, request: &CustomerRequest) -> Result<Customer, GatewayError> {
        let mut customer = Map::new();
        if let Some(first_name) = &request.first_name {
            customer.insert("firstName".into(), json!(first_name));
        }
        if let Some(last_name) = &request.last_name {
            customer.insert("lastName".into(), json!(last_name));
        }
        if let Some(email) = &request.email {
            customer.insert("email".into(), json!(email));
        }
        if !request.custom_fields.is_empty() {
            customer.insert(
                "customFields".into(),
                graphql::custom_fields_json(&request.custom_fields),
            );
        }

        let data: Aliased<CustomerPayload> = self
            .execute(
                "CreateCustomer",
                format!("{}{}", graphql::CREATE_CUSTOMER, graphql::CUSTOMER_FIELDS),
                json!({ "input": { "customer": customer } }),
            )
            .await?;

        Customer::try_from(required(data, "createCustomer")?.customer)
    }

    async fn create_payment_method(
        &self,
        request: &PaymentMethodRequest,
    ) -> Result<PaymentMethod, GatewayError> {
        let mut input = Map::new();
        input.insert("paymentMethodId".into(), json!(request.nonce));
        input.insert("customerId".into(), json!(request.customer_id));
        if request.verify_card {
            input.insert("verify".into(), json!(true));
        }

        let data: Aliased<PaymentMethodPayload> = self
            .execute(
                "VaultPaymentMethod",
                graphql::VAULT_PAYMENT_METHOD.to_string(),
                json!({ "input": input }),
            )
            .await?;

        graphql::to_payment_method(required(data, "vaultPaymentMethod")?.payment_method, false)
    }

    async fn create_transaction(
        &self,
        request: &TransactionRequest,
    ) -> Result<Transaction, GatewayError> {
        let payment_method_id = self.payment_method_id(&request.source).await?;

        let mut transaction = Map::new();
        transaction.insert("amount".into(), json!(request.amount.to_string()));
        if let Some(order_id) = &request.order_id {
            transaction.insert("orderId".into(), json!(order_id));
        }
        if !request.custom_fields.is_empty() {
            transaction.insert(
                "customFields".into(),
                graphql::custom_fields_json(&request.custom_fields),
            );
        }

        let (operation, document) = if request.submit_for_settlement {
            ("ChargePaymentMethod", graphql::CHARGE_PAYMENT_METHOD)
        } else {
            ("AuthorizePaymentMethod", graphql::AUTHORIZE_PAYMENT_METHOD)
        };

        let data: Aliased<TransactionPayload> = self
            .execute(
                operation,
                format!("{document}{}", graphql::TRANSACTION_FIELDS),
                json!({
                    "input": {
                        "paymentMethodId": payment_method_id,
                        "transaction": transaction,
                    }
                }),
            )
            .await?;

        Transaction::try_from(required(data, operation)?.transaction)
    }

    async fn create_subscription(
        &self,
        request: &SubscriptionRequest,
    ) -> Result<Subscription, GatewayError> {
        let data: Aliased<SubscriptionPayload> = self
            .execute(
                "CreateSubscription",
                graphql::CREATE_SUBSCRIPTION.to_string(),
                json!({
                    "input": {
                        "paymentMethodId": request.payment_method_token,
                        "planId": request.plan_id,
                    }
                }),
            )
            .await?;

        Subscription::try_from(required(data, "createSubscription")?.subscription)
    }
}

fn required<T>(data: Aliased<T>, field: &str) -> Result<T, GatewayError> {
    data.result
        .ok_or_else(|| GatewayError::Decode(format!("{field} missing from response")))
}

fn api_error(errors: Vec<GraphQlError>) -> GatewayError {
    let class_of = |e: &GraphQlError| e.extensions.as_ref().and_then(|x| x.error_class.clone());

    if let Some(missing) = errors
        .iter()
        .find(|e| class_of(e).as_deref() == Some(NOT_FOUND_CLASS))
    {
        return GatewayError::NotFound(missing.message.clone());
    }

    let error_class = errors.first().and_then(class_of);
    let message = errors
        .into_iter()
        .map(|e| e.message)
        .collect::<Vec<_>>()
        .join("; ");

    GatewayError::Api {
        message,
        error_class,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn credentials() -> BraintreeCredentials {
        BraintreeCredentials::new("merchant", "public", "private")
    }

    #[test]
    fn client_uses_environment_endpoint() {
        let client = BraintreeClient::new(Environment::Sandbox, credentials()).unwrap();
        assert_eq!(client.endpoint(), Environment::Sandbox.graphql_url());
        assert_eq!(client.merchant_id(), "merchant");
    }

    #[test]
    fn endpoint_override_wins() {
        let client = BraintreeClient::with_options(
            Environment::Production,
            credentials(),
            ClientOptions::with_endpoint("http://127.0.0.1:9999/graphql"),
        )
        .unwrap();
        assert_eq!(client.endpoint(), "http://127.0.0.1:9999/graphql");
        assert_eq!(client.environment(), Environment::Production);
    }

    #[test]
    fn blank_credentials_are_rejected() {
        let err = BraintreeClient::new(
            Environment::Sandbox,
            BraintreeCredentials::new("merchant", "public", " "),
        )
        .unwrap_err();
        assert!(matches!(err, GatewayError::Configuration(_)));
    }

    #[test]
    fn debug_redacts_private_key() {
        let printed = format!("{:?}", credentials());
        assert!(printed.contains("<redacted>"));
        assert!(!printed.contains("\"private\""));
    }

    #[test]
    fn not_found_class_maps_to_not_found() {
        let errors: Vec<GraphQlError> = serde_json::from_value(json!([
            { "message": "other", "extensions": { "errorClass": "VALIDATION" } },
            { "message": "no such customer", "extensions": { "errorClass": "NOT_FOUND" } }
        ]))
        .unwrap();
        assert!(matches!(api_error(errors), GatewayError::NotFound(m) if m == "no such customer"));
    }

    #[test]
    fn api_errors_are_joined() {
        let errors: Vec<GraphQlError> = serde_json::from_value(json!([
            { "message": "first", "extensions": { "errorClass": "VALIDATION" } },
            { "message": "second" }
        ]))
        .unwrap();
        match api_error(errors) {
            GatewayError::Api {
                message,
                error_class,
            } => {
                assert_eq!(message, "first; second");
                assert_eq!(error_class.as_deref(), Some("VALIDATION"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
