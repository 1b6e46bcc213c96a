//! Authorization errors
//!
//! The decision functions themselves never fail; these cover the gate's
//! record-creation paths and the audit trail.

use fides_ledger::LedgerError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuthzError {
    #[error(transparent)]
    Ledger(#[from] LedgerError),

    #[error("Ledger lock poisoned")]
    LockPoisoned,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for authorization operations
pub type AuthzResult<T> = Result<T, AuthzError>;
