//! Amount - Positive exact-decimal wrapper for disbursement values
//!
//! Limits and payment values travel as decimal strings inside records and
//! payments. They are parsed into `Decimal` only at the point of comparison;
//! binary floating point never takes part.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Errors that can occur when working with amounts
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AmountError {
    #[error("Not a decimal number: {0:?}")]
    Unparseable(String),

    #[error("Amount must be positive: {0}")]
    NotPositive(Decimal),
}

/// Parse a decimal string without any loss of precision.
///
/// Accepts plain notation (`"10000.00"`, `"-5"`) and scientific notation
/// (`"1.5e3"`). Surrounding whitespace is ignored.
pub fn parse_decimal(input: &str) -> Result<Decimal, AmountError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(AmountError::Unparseable(input.to_string()));
    }

    if trimmed.contains(['e', 'E']) {
        return Decimal::from_scientific(trimmed)
            .map_err(|_| AmountError::Unparseable(input.to_string()));
    }

    Decimal::from_str_exact(trimmed).map_err(|_| AmountError::Unparseable(input.to_string()))
}

/// Add two decimals without losing precision.
///
/// `Decimal` addition silently rounds once the result needs more than 28
/// significant digits. Returns `None` on overflow or whenever the result is
/// not the exact sum.
pub fn exact_add(a: Decimal, b: Decimal) -> Option<Decimal> {
    let total = a.checked_add(b)?;
    match total.checked_sub(a) {
        Some(diff) if diff == b => Some(total),
        _ => None,
    }
}

/// A strictly positive decimal amount.
///
/// # Invariant
/// The inner value is always > 0. This is enforced by the constructor.
///
/// # Example
/// ```
/// use fides_core::Amount;
/// use rust_decimal::Decimal;
///
/// let amount = Amount::parse("10000.00").unwrap();
/// assert_eq!(amount.value(), Decimal::new(1_000_000, 2));
///
/// // Zero and negative amounts are rejected
/// assert!(Amount::parse("0.00").is_err());
/// assert!(Amount::parse("-1000.00").is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct Amount(Decimal);

impl Amount {
    /// Create a new Amount from a Decimal.
    ///
    /// Returns an error unless the value is greater than zero.
    pub fn new(value: Decimal) -> Result<Self, AmountError> {
        if value <= Decimal::ZERO {
            Err(AmountError::NotPositive(value))
        } else {
            Ok(Self(value))
        }
    }

    /// Parse a decimal string and require it to be positive.
    pub fn parse(input: &str) -> Result<Self, AmountError> {
        Self::new(parse_decimal(input)?)
    }

    /// Get the inner Decimal value
    #[inline]
    pub const fn value(&self) -> Decimal {
        self.0
    }

    /// Checked addition - None on overflow or precision loss
    pub fn checked_add(&self, other: &Amount) -> Option<Amount> {
        exact_add(self.0, other.0).map(Amount)
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Amount {
    type Err = AmountError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<Decimal> for Amount {
    type Error = AmountError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Amount> for Decimal {
    fn from(amount: Amount) -> Self {
        amount.0
    }
}
