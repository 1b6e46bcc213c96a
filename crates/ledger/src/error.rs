//! Ledger errors
//!
//! - `ValidationError`: structural/semantic defect, every violated rule
//! - `ChainError`: genesis or link mismatch at append time, never retried
//! - `LookupError`: revocation target missing or already revoked
//! - `StoreError`: the storage collaborator failed

use crate::hash::ChainError;
use crate::validation::ValidationError;
use thiserror::Error;

/// Errors that can occur in ledger operations
#[derive(Error, Debug)]
pub enum LedgerError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Hash chain rejected append: {0}")]
    Chain(#[from] ChainError),

    #[error(transparent)]
    Lookup(#[from] LookupError),

    #[error("Payment value is not a decimal: {0:?}")]
    InvalidPaymentValue(String),

    #[error("Storage error: {0}")]
    Store(#[from] StoreError),
}

/// Revocation lookups
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LookupError {
    #[error("Target decision not found: {0}")]
    TargetNotFound(String),

    #[error("Decision already revoked: {0}")]
    AlreadyRevoked(String),
}

/// Storage collaborator failures
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Corrupt entry in {file} at line {line}: {reason}")]
    Corrupt {
        file: String,
        line: usize,
        reason: String,
    },

    #[error("Duplicate payment id: {0}")]
    DuplicatePayment(String),

    #[error("Stored payment {payment_id} has a non-decimal value {value:?}")]
    InvalidStoredValue { payment_id: String, value: String },

    #[error("Payment total for {decision_id} is out of exact decimal range")]
    InexactTotal { decision_id: String },

    #[error("Store is closed")]
    Closed,
}

/// Result type for ledger operations
pub type LedgerResult<T> = Result<T, LedgerError>;
