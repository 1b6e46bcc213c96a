//! Fides Core - Scalar types
//!
//! This crate contains the value parsers every other Fides crate relies on:
//! - `Amount`: Positive exact-decimal wrapper for limits and payment values
//! - `timestamp`: ISO 8601 / RFC 3339 timestamp validation and parsing
//! - `id`: UUIDv4 identifiers

pub mod amount;
pub mod id;
pub mod timestamp;

pub use amount::{exact_add, parse_decimal, Amount, AmountError};
pub use id::{is_uuid_v4, new_uuid_v4};
pub use timestamp::{is_timestamp, now_timestamp, parse_timestamp, TimestampError};
