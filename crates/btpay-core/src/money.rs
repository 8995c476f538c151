//! Money amounts.
//!
//! The provider accepts amounts as decimal strings with two fractional digits
//! (`"55.55"`). Amounts are kept as `Decimal` so no floating point ever touches
//! a charge.

use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Number of fractional digits sent to the provider.
pub const AMOUNT_SCALE: u32 = 2;

/// A non-negative transaction amount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct Amount(Decimal);

impl Amount {
    /// Build an amount from minor units (`from_minor(5555)` is `55.55`).
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidAmount`] for negative input.
    pub fn from_minor(minor_units: i64) -> Result<Self, CoreError> {
        Self::new(Decimal::new(minor_units, AMOUNT_SCALE))
    }

    /// Build an amount from a decimal value, rounded to two places.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidAmount`] for negative input.
    pub fn new(value: Decimal) -> Result<Self, CoreError> {
        if value.is_sign_negative() && !value.is_zero() {
            return Err(CoreError::InvalidAmount(format!(
                "amount must not be negative: {value}"
            )));
        }
        let mut value = value.round_dp(AMOUNT_SCALE);
        value.rescale(AMOUNT_SCALE);
        Ok(Self(value))
    }

    /// The underlying decimal value.
    #[must_use]
    pub const fn value(&self) -> Decimal {
        self.0
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Amount {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value = Decimal::from_str(s.trim())
            .map_err(|e| CoreError::InvalidAmount(format!("{s:?}: {e}")))?;
        Self::new(value)
    }
}

impl TryFrom<Decimal> for Amount {
    type Error = CoreError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Amount> for Decimal {
    fn from(amount: Amount) -> Self {
        amount.0
    }
}
