//! Payments - the execution-side fact log
//!
//! Payments are not chained or hashed. A `Payment` is what the executor asks
//! about; a `PaymentRecord` is what it stores after disbursing.

use serde::{Deserialize, Serialize};

/// A payment request to be checked against a decision
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payment {
    /// The decision this payment claims to execute
    pub decision_id: String,
    pub beneficiary: String,
    /// ISO 4217 currency code
    pub currency: String,
    /// Decimal string, e.g. `"50000.00"`
    pub value: String,
    pub payment_date: String,
}

impl Payment {
    pub fn new(
        decision_id: impl Into<String>,
        beneficiary: impl Into<String>,
        currency: impl Into<String>,
        value: impl Into<String>,
        payment_date: impl Into<String>,
    ) -> Self {
        Self {
            decision_id: decision_id.into(),
            beneficiary: beneficiary.into(),
            currency: currency.into(),
            value: value.into(),
            payment_date: payment_date.into(),
        }
    }
}

/// An executed payment as kept in the payment log
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentRecord {
    /// Unique within the payment log
    pub payment_id: String,
    #[serde(flatten)]
    pub payment: Payment,
    /// When the payment was recorded (UTC, RFC 3339)
    pub recorded_at: String,
}

impl PaymentRecord {
    pub fn decision_id(&self) -> &str {
        &self.payment.decision_id
    }

    pub fn value(&self) -> &str {
        &self.payment.value
    }
}
