//! Transactions, payment sources, vaulting, subscriptions, and client tokens.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::customer::CustomField;
use crate::ids::{
    CustomerId, MerchantAccountId, PaymentMethodToken, PlanId, SubscriptionId, TransactionId,
};
use crate::money::Amount;

/// Custom transaction parameter carrying the store identifier.
pub const CUSTOM_FIELD_STORE_ID: &str = "store_id";
/// Custom transaction parameter carrying the store display name.
pub const CUSTOM_FIELD_STORE_NAME: &str = "store_name";
/// Custom transaction parameter carrying the subscription start timestamp.
pub const CUSTOM_FIELD_SUBSCRIPTION_START: &str = "subscription_start_date_time";

/// Raw card details.
///
/// `Debug` never prints the full number or the CVV.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreditCard {
    /// Primary account number.
    pub number: String,
    /// Card verification value.
    pub cvv: String,
    /// Expiration month (`"01"`..`"12"`).
    pub expiration_month: String,
    /// Expiration year.
    pub expiration_year: String,
}

impl CreditCard {
    /// Last four digits of the card number, or the whole thing if shorter.
    #[must_use]
    pub fn last_four(&self) -> &str {
        let n = &self.number;
        let start = n
            .char_indices()
            .rev()
            .nth(3)
            .map_or(0, |(i, _)| i);
        &n[start..]
    }
}

impl fmt::Debug for CreditCard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CreditCard")
            .field("number", &format_args!("****{}", self.last_four()))
            .field("cvv", &"***")
            .field("expiration_month", &self.expiration_month)
            .field("expiration_year", &self.expiration_year)
            .finish()
    }
}

/// What a transaction is charged against.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentSource {
    /// A vaulted payment method.
    Token(PaymentMethodToken),
    /// A single-use nonce from the client-side UI.
    Nonce(String),
    /// Raw card fields.
    Card(CreditCard),
}

/// Transaction type.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    /// A sale.
    #[default]
    Sale,
}

/// Request to create a transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionRequest {
    /// Transaction type.
    pub kind: TransactionKind,
    /// Amount to charge.
    pub amount: Amount,
    /// Merchant order reference.
    pub order_id: Option<String>,
    /// What to charge.
    pub source: PaymentSource,
    /// Capture immediately instead of only authorizing.
    pub submit_for_settlement: bool,
    /// Custom fields attached to the transaction.
    #[serde(default)]
    pub custom_fields: Vec<CustomField>,
}

impl TransactionRequest {
    /// An authorize-only sale with no order id.
    #[must_use]
    pub fn sale(amount: Amount, source: PaymentSource) -> Self {
        Self {
            kind: TransactionKind::Sale,
            amount,
            order_id: None,
            source,
            submit_for_settlement: false,
            custom_fields: Vec::new(),
        }
    }

    /// Set the order id.
    #[must_use]
    pub fn with_order_id(mut self, order_id: impl Into<String>) -> Self {
        self.order_id = Some(order_id.into());
        self
    }
}

/// A transaction as returned by the provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    /// Transaction ID.
    pub id: TransactionId,
    /// Provider status (`AUTHORIZED`, `SUBMITTED_FOR_SETTLEMENT`, ...).
    pub status: String,
    /// Charged amount, when reported.
    #[serde(default)]
    pub amount: Option<Amount>,
    /// Order reference, when set.
    #[serde(default)]
    pub order_id: Option<String>,
}

/// Request to vault a nonce against a customer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentMethodRequest {
    /// Customer to attach the method to.
    pub customer_id: CustomerId,
    /// Single-use nonce from the client-side UI.
    pub nonce: String,
    /// Run a card verification before vaulting.
    pub verify_card: bool,
}

/// Request to start a subscription.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscriptionRequest {
    /// Plan to subscribe to.
    pub plan_id: PlanId,
    /// Vaulted method to bill.
    pub payment_method_token: PaymentMethodToken,
}

/// A subscription as returned by the provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subscription {
    /// Subscription ID.
    pub id: SubscriptionId,
    /// Provider status.
    #[serde(default)]
    pub status: Option<String>,
    /// Transactions billed so far.
    #[serde(default)]
    pub transaction_count: usize,
}

/// Parameters for a client token. Both empty means a generic token.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientTokenRequest {
    /// Scope the token to this customer's vault.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_id: Option<CustomerId>,
    /// Merchant account the token is issued for.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub merchant_account_id: Option<MerchantAccountId>,
}

impl ClientTokenRequest {
    /// Whether this asks for an unscoped token.
    #[must_use]
    pub fn is_generic(&self) -> bool {
        self.customer_id.is_none() && self.merchant_account_id.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn card_debug_is_redacted() {
        let card = CreditCard {
            number: "4111111111111111".into(),
            cvv: "123".into(),
            expiration_month: "12".into(),
            expiration_year: "2030".into(),
        };
        let printed = format!("{card:?}");
        assert!(printed.contains("****1111"));
        assert!(!printed.contains("4111111111111111"));
        assert!(!printed.contains("123\""));
    }

    #[test]
    fn last_four_handles_short_numbers() {
        let card = CreditCard {
            number: "42".into(),
            ..CreditCard::default()
        };
        assert_eq!(card.last_four(), "42");
    }

    #[test]
    fn sale_defaults_to_authorize_only() {
        let request = TransactionRequest::sale(
            Amount::from_minor(222).unwrap(),
            PaymentSource::Nonce("fake-valid-nonce".into()),
        )
        .with_order_id("12345");

        assert_eq!(request.kind, TransactionKind::Sale);
        assert!(!request.submit_for_settlement);
        assert_eq!(request.order_id.as_deref(), Some("12345"));
    }

    #[test]
    fn generic_token_request() {
        assert!(ClientTokenRequest::default().is_generic());
        let scoped = ClientTokenRequest {
            customer_id: Some("cust_1".parse().unwrap()),
            merchant_account_id: None,
        };
        assert!(!scoped.is_generic());
    }
}
