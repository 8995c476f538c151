//! Identifier types for btpay.
//!
//! Provider-issued identifiers are opaque strings. Each kind gets its own
//! newtype so a payment method token can never be passed where a customer id
//! is expected.
//!
//! # Macro-based ID Types
//!
//! The `string_id_type!` macro reduces boilerplate for identifier types,
//! ensuring consistent implementation of serialization, parsing, and display traits.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Macro to define a string-based identifier type with standard trait implementations.
///
/// This macro generates a newtype wrapper around `String` with implementations for:
/// - `Clone`, `PartialEq`, `Eq`, `Hash`
/// - `Serialize`, `Deserialize` (as string, rejecting blanks)
/// - `FromStr`, `Display`, `Debug`
/// - `TryFrom<String>`, `Into<String>`
/// - `AsRef<str>`
///
/// # Example
///
/// ```ignore
/// string_id_type!(MyId, "A custom identifier type.");
/// let id: MyId = "abc".parse().unwrap();
/// ```
macro_rules! string_id_type {
    ($name:ident, $doc:expr) => {
        #[doc = $doc]
        #[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(String);

        impl $name {
            /// Wrap a compile-time constant. The literal must not be blank.
            #[must_use]
            pub fn from_static(value: &'static str) -> Self {
                debug_assert!(!value.trim().is_empty(), "blank {}", stringify!($name));
                Self(value.to_string())
            }

            /// Return the identifier as a string slice.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl FromStr for $name {
            type Err = IdError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let trimmed = s.trim();
                if trimmed.is_empty() {
                    return Err(IdError::Empty {
                        kind: stringify!($name),
                    });
                }
                Ok(Self(trimmed.to_string()))
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.0)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl TryFrom<String> for $name {
            type Error = IdError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                value.parse()
            }
        }

        impl TryFrom<&str> for $name {
            type Error = IdError;

            fn try_from(value: &str) -> Result<Self, Self::Error> {
                value.parse()
            }
        }

        impl From<$name> for String {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

string_id_type!(CustomerId, "A provider-side customer identifier.");
string_id_type!(
    PaymentMethodToken,
    "A vaulted payment method token.\n\nReturned when a nonce or card is stored against a customer and reusable for later transactions."
);
string_id_type!(TransactionId, "A provider-side transaction identifier.");
string_id_type!(SubscriptionId, "A provider-side subscription identifier.");
string_id_type!(
    MerchantAccountId,
    "A merchant account identifier.\n\nSelects which merchant account processes a transaction or scopes a client token."
);
string_id_type!(PlanId, "A subscription plan identifier configured in the provider control panel.");

/// Errors that can occur when parsing identifiers.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IdError {
    /// The input was empty or whitespace only.
    #[error("empty {kind}")]
    Empty {
        /// The identifier type that was being parsed.
        kind: &'static str,
    },
}
