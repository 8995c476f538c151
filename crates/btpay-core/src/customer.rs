//! Customers, vaulted payment methods, and customer lookup.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::ids::{CustomerId, PaymentMethodToken};

/// A customer record as returned by the provider.
///
/// Customers are owned by the provider; local copies are read-only snapshots.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
    /// Provider customer ID.
    pub id: CustomerId,
    /// Legacy (pre-GraphQL) customer ID, when the provider returns one.
    #[serde(default)]
    pub legacy_id: Option<String>,
    /// Customer email.
    #[serde(default)]
    pub email: Option<String>,
    /// First name.
    #[serde(default)]
    pub first_name: Option<String>,
    /// Last name.
    #[serde(default)]
    pub last_name: Option<String>,
    /// Vaulted payment methods, oldest first.
    #[serde(default)]
    pub payment_methods: Vec<PaymentMethod>,
}

impl Customer {
    /// The customer's default payment method, if any.
    #[must_use]
    pub fn default_payment_method(&self) -> Option<&PaymentMethod> {
        self.payment_methods.iter().find(|pm| pm.is_default)
    }
}

/// A payment method vaulted against a customer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentMethod {
    /// Reusable token for transactions.
    pub token: PaymentMethodToken,
    /// Card brand image, when the provider supplies one.
    #[serde(default)]
    pub image_url: Option<String>,
    /// Whether this is the customer's default method.
    #[serde(default)]
    pub is_default: bool,
}

/// A provider-side custom field (`name=value`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomField {
    /// Field name as configured in the provider control panel.
    pub name: String,
    /// Field value.
    pub value: String,
}

impl CustomField {
    /// Create a custom field.
    #[must_use]
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// Request to create a customer. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerRequest {
    /// First name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    /// Last name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    /// Email.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Custom fields.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub custom_fields: Vec<CustomField>,
}

/// Customer search criteria.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerSearch {
    /// Exact email match.
    pub email_is: String,
}

impl CustomerSearch {
    /// Search by exact email.
    #[must_use]
    pub fn by_email(email: impl Into<String>) -> Self {
        Self {
            email_is: email.into(),
        }
    }
}

/// How to pick a customer when an email search returns several.
///
/// The provider does not enforce unique emails, so a search may return more
/// than one customer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CustomerMatchPolicy {
    /// Adopt the first search result.
    #[default]
    First,
    /// Adopt the last search result.
    Last,
    /// Adopt a customer only when exactly one matched.
    Unique,
}

impl CustomerMatchPolicy {
    /// Pick a customer out of search results.
    #[must_use]
    pub fn select(self, mut matches: Vec<Customer>) -> Option<Customer> {
        match self {
            Self::First => matches.into_iter().next(),
            Self::Last => matches.pop(),
            Self::Unique if matches.len() == 1 => matches.pop(),
            Self::Unique => None,
        }
    }
}

impl FromStr for CustomerMatchPolicy {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "first" => Ok(Self::First),
            "last" => Ok(Self::Last),
            "unique" => Ok(Self::Unique),
            other => Err(CoreError::UnknownMatchPolicy(other.to_string())),
        }
    }
}

impl fmt::Display for CustomerMatchPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::First => "first",
            Self::Last => "last",
            Self::Unique => "unique",
        })
    }
}
