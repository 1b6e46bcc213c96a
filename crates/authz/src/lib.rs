//! Fides Authorization Engine
//!
//! "No record, no payment": a payment executor may disburse only if an
//! unrevoked, well-formed decision record covers the payment.
//!
//! ## Architecture
//!
//! ```text
//! Payment ──► PaymentGate ──► engine::authorize_with_reason ──► Ledger (read lock)
//!                │                        │
//!                │                        └── RejectReason ──► AuditTrail (JSONL)
//!                └── bool to the caller
//! ```
//!
//! ## Key Components
//!
//! - [`engine::is_authorized`] - Binary decision, never fails
//! - [`decision::Authorization`] - Outcome with a closed set of reject reasons
//! - [`gate::PaymentGate`] - Thread-safe handle, transactional authorize-and-record
//! - [`audit::AuditTrail`] - Append-only JSONL trail of decisions
//!
//! Reject reasons are for offline audit only and must never be returned to
//! the party requesting the payment.

pub mod audit;
pub mod decision;
pub mod engine;
pub mod error;
pub mod gate;

pub use audit::{AuditEvent, AuditTrail};
pub use decision::{Authorization, RejectReason};
pub use engine::{authorize_with_reason, is_authorized};
pub use error::{AuthzError, AuthzResult};
pub use gate::PaymentGate;
