//! Application state.

use std::sync::Arc;

use btpay_core::MerchantAccountId;
use btpay_gateway::PaymentGateway;

use crate::config::ServiceConfig;
use crate::resolver::ClientTokenGenerator;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// The payment gateway.
    pub gateway: Arc<dyn PaymentGateway>,

    /// Service configuration.
    pub config: ServiceConfig,
}

impl AppState {
    /// Create a new application state.
    #[must_use]
    pub fn new(gateway: Arc<dyn PaymentGateway>, config: ServiceConfig) -> Self {
        if config.merchant_account_id.is_none() {
            tracing::warn!("No merchant account configured - customer tokens use the default account");
        }

        Self { gateway, config }
    }

    /// A resolver issuing a generic client token.
    #[must_use]
    pub fn generic_token(&self) -> ClientTokenGenerator {
        self.token_generator(None, None)
    }

    /// A resolver for a customer email, scoped to the configured merchant account.
    #[must_use]
    pub fn customer_token(&self, email: Option<String>) -> ClientTokenGenerator {
        self.token_generator(email, self.config.merchant_account_id.clone())
    }

    fn token_generator(
        &self,
        email: Option<String>,
        merchant_account_id: Option<MerchantAccountId>,
    ) -> ClientTokenGenerator {
        ClientTokenGenerator::new(self.gateway.clone(), email, merchant_account_id)
            .with_policy(self.config.customer_match)
    }
}
