//! Authorization outcomes
//!
//! One reject reason per rule of the decision chain. The set is closed so
//! that audit tooling matches on variants, never on strings.

use fides_ledger::ValidationCode;
use serde::{Deserialize, Serialize};
use std::fmt;
use strum_macros::AsRefStr;

/// Why a payment was blocked, in rule order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, AsRefStr)]
#[serde(tag = "code", rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum RejectReason {
    /// No DR/SDR carries the payment's decision_id
    RecordNotFound,
    DecisionRevoked,
    /// The stored decision fails structural re-validation
    InvalidRecord { errors: Vec<ValidationCode> },
    InvalidPaymentDate,
    InvalidDecisionDate,
    PaymentBeforeDecision,
    BeneficiaryMismatch,
    CurrencyMismatch,
    InvalidNumericValue,
    /// Payment value is zero or negative
    InvalidPaymentValue,
    ExceedsMaximumValue,
    /// Term-limited decision used after its `maximum_term`
    ExceptionExpired,
    /// The ledger could not be read
    LedgerUnavailable,
}

impl RejectReason {
    /// Stable audit code, e.g. `EXCEEDS_MAXIMUM_VALUE`
    pub fn code(&self) -> &str {
        self.as_ref()
    }
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RejectReason::InvalidRecord { errors } => {
                let codes: Vec<String> = errors.iter().map(ValidationCode::code).collect();
                write!(f, "{}: [{}]", self.code(), codes.join(", "))
            }
            other => f.write_str(other.code()),
        }
    }
}

/// Outcome of the decision chain
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", content = "reason", rename_all = "snake_case")]
pub enum Authorization {
    Authorized,
    Rejected(RejectReason),
}

impl Authorization {
    pub fn is_authorized(&self) -> bool {
        matches!(self, Authorization::Authorized)
    }

    pub fn reason(&self) -> Option<&RejectReason> {
        match self {
            Authorization::Authorized => None,
            Authorization::Rejected(reason) => Some(reason),
        }
    }

    /// `AUTHORIZED` or the reject code
    pub fn code(&self) -> &str {
        match self {
            Authorization::Authorized => "AUTHORIZED",
            Authorization::Rejected(reason) => reason.code(),
        }
    }
}

impl From<Result<(), RejectReason>> for Authorization {
    fn from(result: Result<(), RejectReason>) -> Self {
        match result {
            Ok(()) => Authorization::Authorized,
            Err(reason) => Authorization::Rejected(reason),
        }
    }
}
