//! Client token resolution.
//!
//! A [`ClientTokenGenerator`] issues a client token for one request. When it
//! is given an email it first looks the customer up, so the token can be
//! scoped to that customer's vault and the customer ID handed to the page.
//! The result is computed once and reused for the generator's lifetime.

use std::sync::Arc;

use tokio::sync::OnceCell;

use btpay_core::{
    ClientTokenRequest, Customer, CustomerId, CustomerMatchPolicy, CustomerSearch,
    MerchantAccountId,
};
use btpay_gateway::{GatewayError, PaymentGateway};

/// A resolved client token and the customer it is scoped to, if any.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    /// The client token.
    pub token: String,
    /// Customer found by email search.
    pub customer: Option<Customer>,
}

/// Lazily resolves a client token and customer, at most once.
///
/// Concurrent callers share a single resolution. A failed token request is
/// not cached; the next call tries again.
pub struct ClientTokenGenerator {
    gateway: Arc<dyn PaymentGateway>,
    customer_email: Option<String>,
    merchant_account_id: Option<MerchantAccountId>,
    policy: CustomerMatchPolicy,
    resolved: OnceCell<Resolution>,
}

impl ClientTokenGenerator {
    /// Create an unresolved generator.
    #[must_use]
    pub fn new(
        gateway: Arc<dyn PaymentGateway>,
        customer_email: Option<String>,
        merchant_account_id: Option<MerchantAccountId>,
    ) -> Self {
        Self {
            gateway,
            customer_email,
            merchant_account_id,
            policy: CustomerMatchPolicy::default(),
            resolved: OnceCell::new(),
        }
    }

    /// Choose how a customer is picked when several share the email.
    #[must_use]
    pub fn with_policy(mut self, policy: CustomerMatchPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Resolve (first call only) and return the cached result.
    ///
    /// # Errors
    ///
    /// Returns the gateway error if the client token could not be generated.
    pub async fn resolve(&self) -> Result<&Resolution, GatewayError> {
        self.resolved
            .get_or_try_init(|| {
                generate_client_token(
                    self.gateway.as_ref(),
                    self.customer_email.as_deref(),
                    self.merchant_account_id.as_ref(),
                    self.policy,
                )
            })
            .await
    }

    /// The client token.
    ///
    /// # Errors
    ///
    /// Returns the gateway error if the client token could not be generated.
    pub async fn token(&self) -> Result<String, GatewayError> {
        Ok(self.resolve().await?.token.clone())
    }

    /// ID of the customer found by email, or `None` if there was no match.
    ///
    /// # Errors
    ///
    /// Returns the gateway error if the client token could not be generated.
    pub async fn customer_id(&self) -> Result<Option<CustomerId>, GatewayError> {
        Ok(self.resolve().await?.customer.as_ref().map(|c| c.id.clone()))
    }

    /// Whether resolution has already succeeded.
    #[must_use]
    pub fn is_resolved(&self) -> bool {
        self.resolved.initialized()
    }
}

/// Generate a client token without caching.
///
/// With neither an email nor a merchant account a generic token is issued.
/// Otherwise the email (if any) is searched and a matching customer adopted
/// according to `policy`; the token is then scoped to that customer and the
/// merchant account. Search failures are logged and count as "no customer".
///
/// # Errors
///
/// Returns the gateway error from the final token request.
pub async fn generate_client_token(
    gateway: &dyn PaymentGateway,
    customer_email: Option<&str>,
    merchant_account_id: Option<&MerchantAccountId>,
    policy: CustomerMatchPolicy,
) -> Result<Resolution, GatewayError> {
    if customer_email.is_none() && merchant_account_id.is_none() {
        tracing::info!("Creating generic client token");
        let token = gateway
            .generate_client_token(&ClientTokenRequest::default())
            .await?;
        return Ok(Resolution {
            token,
            customer: None,
        });
    }

    let customer = match customer_email {
        Some(email) => find_customer_by_email(gateway, email, policy).await,
        None => None,
    };

    let request = ClientTokenRequest {
        customer_id: customer.as_ref().map(|c| c.id.clone()),
        merchant_account_id: merchant_account_id.cloned(),
    };

    tracing::info!(
        customer_id = ?request.customer_id,
        merchant_account_id = ?request.merchant_account_id,
        "Creating scoped client token"
    );

    let token = gateway.generate_client_token(&request).await?;
    Ok(Resolution { token, customer })
}

async fn find_customer_by_email(
    gateway: &dyn PaymentGateway,
    email: &str,
    policy: CustomerMatchPolicy,
) -> Option<Customer> {
    match gateway
        .search_customers(&CustomerSearch::by_email(email))
        .await
    {
        Ok(matches) => {
            let found = matches.len();
            let customer = policy.select(matches);
            tracing::info!(
                email = %email,
                matches = found,
                policy = %policy,
                customer_id = ?customer.as_ref().map(|c| &c.id),
                "Customer search finished"
            );
            customer
        }
        Err(e) => {
            tracing::error!(email = %email, error = %e, "Customer search failed");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use btpay_gateway::mock::{customer, Operation, RecordingGateway};

    fn generator(
        gateway: &Arc<RecordingGateway>,
        email: Option<&str>,
        merchant: Option<&str>,
    ) -> ClientTokenGenerator {
        ClientTokenGenerator::new(
            gateway.clone(),
            email.map(str::to_string),
            merchant.map(|m| m.parse().unwrap()),
        )
    }

    #[tokio::test]
    async fn generic_token_is_requested_once() {
        let gateway = Arc::new(RecordingGateway::new());
        let generator = generator(&gateway, None, None);

        let first = generator.token().await.unwrap();
        let second = generator.token().await.unwrap();

        assert_eq!(first, second);
        assert_eq!(gateway.count(Operation::ClientToken), 1);
        assert_eq!(gateway.count(Operation::SearchCustomers), 0);
        assert!(gateway.client_token_requests()[0].is_generic());
        assert_eq!(generator.customer_id().await.unwrap(), None);
    }

    #[tokio::test]
    async fn unknown_email_yields_unscoped_token() {
        let gateway = Arc::new(RecordingGateway::new());
        let generator = generator(&gateway, Some("nobody@example.com"), None);

        assert!(!generator.token().await.unwrap().is_empty());
        assert_eq!(generator.customer_id().await.unwrap(), None);

        assert_eq!(gateway.count(Operation::SearchCustomers), 1);
        let requests = gateway.client_token_requests();
        assert_eq!(requests.len(), 1);
        assert!(requests[0].customer_id.is_none());
    }

    #[tokio::test]
    async fn matching_email_scopes_token_to_customer() {
        let gateway =
            Arc::new(RecordingGateway::new().with_customer(customer("cust_1", "a@example.com")));
        let generator = generator(&gateway, Some("a@example.com"), None);

        let customer_id = generator.customer_id().await.unwrap();
        let token = generator.token().await.unwrap();

        assert_eq!(customer_id.as_ref().map(CustomerId::as_str), Some("cust_1"));
        assert!(!token.is_empty());
        assert_eq!(
            gateway.client_token_requests()[0]
                .customer_id
                .as_ref()
                .map(CustomerId::as_str),
            Some("cust_1")
        );

        let calls_before = gateway.calls().len();
        assert_eq!(generator.customer_id().await.unwrap(), customer_id);
        assert_eq!(generator.token().await.unwrap(), token);
        assert_eq!(gateway.calls().len(), calls_before);
    }

    #[tokio::test]
    async fn merchant_account_alone_skips_search() {
        let gateway = Arc::new(RecordingGateway::new());
        let generator = generator(&gateway, None, Some("eur_account"));

        generator.resolve().await.unwrap();

        assert_eq!(gateway.count(Operation::SearchCustomers), 0);
        let request = &gateway.client_token_requests()[0];
        assert!(request.customer_id.is_none());
        assert_eq!(
            request.merchant_account_id.as_ref().map(MerchantAccountId::as_str),
            Some("eur_account")
        );
    }

    #[tokio::test]
    async fn search_failure_is_swallowed() {
        let gateway = Arc::new(
            RecordingGateway::new()
                .with_customer(customer("cust_1", "a@example.com"))
                .failing(Operation::SearchCustomers, "search unavailable"),
        );
        let generator = generator(&gateway, Some("a@example.com"), Some("usd_account"));

        let resolution = generator.resolve().await.unwrap();

        assert!(resolution.customer.is_none());
        assert_eq!(gateway.count(Operation::ClientToken), 1);
    }

    #[tokio::test]
    async fn token_failure_propagates_and_is_retried() {
        let gateway = Arc::new(
            RecordingGateway::new().failing(Operation::ClientToken, "gateway rejected request"),
        );
        let generator = generator(&gateway, None, None);

        assert!(generator.token().await.is_err());
        assert!(!generator.is_resolved());
        assert!(generator.customer_id().await.is_err());
        assert_eq!(gateway.count(Operation::ClientToken), 2);
    }

    #[tokio::test]
    async fn policy_decides_between_duplicate_emails() {
        let seeded = || {
            Arc::new(
                RecordingGateway::new()
                    .with_customer(customer("cust_old", "dup@example.com"))
                    .with_customer(customer("cust_new", "dup@example.com")),
            )
        };

        let gateway = seeded();
        let last = generator(&gateway, Some("dup@example.com"), None)
            .with_policy(CustomerMatchPolicy::Last);
        assert_eq!(
            last.customer_id().await.unwrap().as_ref().map(CustomerId::as_str),
            Some("cust_new")
        );

        let gateway = seeded();
        let unique = generator(&gateway, Some("dup@example.com"), None)
            .with_policy(CustomerMatchPolicy::Unique);
        assert_eq!(unique.customer_id().await.unwrap(), None);
    }

    #[tokio::test]
    async fn concurrent_callers_share_one_resolution() {
        let gateway = Arc::new(
            RecordingGateway::new()
                .with_customer(customer("cust_1", "a@example.com"))
                .with_latency(Duration::from_millis(20)),
        );
        let generator = Arc::new(generator(&gateway, Some("a@example.com"), None));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let generator = generator.clone();
                tokio::spawn(async move { generator.token().await })
            })
            .collect();

        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        assert_eq!(gateway.count(Operation::SearchCustomers), 1);
        assert_eq!(gateway.count(Operation::ClientToken), 1);
    }
}
