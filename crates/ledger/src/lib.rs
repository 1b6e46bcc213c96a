//! Fides Ledger - Hash-chained authorization records
//!
//! This is the HEART of Fides. Every decision that can authorize a payment,
//! and every revocation that ends one, goes through this crate.
//!
//! # Key Types
//! - `Record`: Decision (DR), term-limited decision (SDR) or revocation (RR)
//! - `Ledger`: Append-only, hash-linked record chain plus the payment log
//! - `RecordStore`: Storage contract the ledger runs on
//! - `NewDecision` / `NewRevocation`: Factory inputs
//!
//! # Flow
//! ```text
//! factory ──► last record ──► previous_record_hash ──► validate ──► Ledger::append
//!                                                                    └── re-checks link
//! ```

pub mod error;
pub mod factory;
pub mod hash;
pub mod ledger;
pub mod memory;
pub mod payment;
pub mod record;
pub mod store;
pub mod validation;

pub use error::{LedgerError, LookupError, StoreError};
pub use factory::{create_decision_record, create_revocation_record, NewDecision, NewRevocation};
pub use hash::{canonical_json, genesis_hash, record_hash, ChainError};
pub use ledger::{ChainIntegrity, Ledger};
pub use memory::MemoryStore;
pub use payment::{Payment, PaymentRecord};
pub use record::{DecisionRecord, Record, RecordType, RevocationRecord};
pub use store::RecordStore;
pub use validation::{validate, validate_document, ValidationCode, ValidationError, ValidationReport};
