//! Hash chain utilities for ledger integrity
//!
//! - canonical form: keys sorted at every level, no whitespace, UTF-8
//! - digest: SHA-256, lower-case hex
//! - genesis: `SHA256("FIDES-GENESIS-" + authority_id + "-" + record_timestamp)`

use crate::record::Record;
use serde_json::Value;
use sha2::{Digest, Sha256};

/// Seed prefix for the first record of a chain
pub const GENESIS_PREFIX: &str = "FIDES-GENESIS-";

/// Recursively rebuild a JSON value with object keys in lexicographic order.
///
/// Arrays keep their order.
pub fn canonicalize(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<_> = map.iter().collect();
            entries.sort_by(|(a, _), (b, _)| a.cmp(b));
            Value::Object(
                entries
                    .into_iter()
                    .map(|(key, inner)| (key.clone(), canonicalize(inner)))
                    .collect(),
            )
        }
        Value::Array(items) => Value::Array(items.iter().map(canonicalize).collect()),
        other => other.clone(),
    }
}

/// Canonical JSON string of any value
pub fn canonical_json(value: &Value) -> String {
    // Display on Value is the compact serializer
    canonicalize(value).to_string()
}

/// Canonical JSON string of a record (the hash input and the persisted form)
pub fn canonical_record(record: &Record) -> String {
    canonical_json(&record.to_document())
}

/// SHA-256 of arbitrary bytes as lower-case hex
pub fn sha256_hex(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}

/// Hash that the first record of a chain must carry as `previous_record_hash`
pub fn genesis_hash(authority_id: &str, genesis_timestamp: &str) -> String {
    let seed = format!("{GENESIS_PREFIX}{authority_id}-{genesis_timestamp}");
    sha256_hex(seed.as_bytes())
}

/// Hash of a record's canonical form
pub fn record_hash(record: &Record) -> String {
    sha256_hex(canonical_record(record).as_bytes())
}

/// `previous_record_hash` for a new record: genesis when the chain is empty,
/// otherwise the hash of the previous record.
pub fn compute_previous_hash(
    authority_id: &str,
    record_timestamp: &str,
    previous: Option<&Record>,
) -> String {
    match previous {
        None => genesis_hash(authority_id, record_timestamp),
        Some(record) => record_hash(record),
    }
}

/// Check that a record is a valid first record
pub fn verify_genesis(record: &Record) -> bool {
    record.previous_record_hash() == genesis_hash(record.authority_id(), record.record_timestamp())
}

/// Check that `current` links to `previous`
pub fn verify_chain_link(current: &Record, previous: &Record) -> bool {
    current.previous_record_hash() == record_hash(previous)
}

/// Verify hash chain integrity, reporting the first broken position
pub fn verify_chain(records: &[Record]) -> Result<(), ChainError> {
    let Some(first) = records.first() else {
        return Ok(());
    };

    if !verify_genesis(first) {
        return Err(ChainError::InvalidGenesis {
            expected: genesis_hash(first.authority_id(), first.record_timestamp()),
            actual: first.previous_record_hash().to_string(),
        });
    }

    for (index, pair) in records.windows(2).enumerate() {
        let (previous, current) = (&pair[0], &pair[1]);
        if !verify_chain_link(current, previous) {
            return Err(ChainError::BrokenLink {
                index: index + 1,
                expected: record_hash(previous),
                actual: current.previous_record_hash().to_string(),
            });
        }
    }

    Ok(())
}

/// Errors in hash chain verification
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChainError {
    /// First record does not carry the genesis hash (always index 0)
    InvalidGenesis { expected: String, actual: String },
    /// Record at `index` does not link to record `index - 1`
    BrokenLink {
        index: usize,
        expected: String,
        actual: String,
    },
}

impl ChainError {
    /// Position of the offending record
    pub fn index(&self) -> usize {
        match self {
            ChainError::InvalidGenesis { .. } => 0,
            ChainError::BrokenLink { index, .. } => *index,
        }
    }
}

impl std::fmt::Display for ChainError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ChainError::InvalidGenesis { expected, actual } => {
                write!(
                    f,
                    "Invalid genesis hash: expected '{}', got '{}'",
                    expected, actual
                )
            }
            ChainError::BrokenLink {
                index,
                expected,
                actual,
            } => {
                write!(
                    f,
                    "Broken link at index {}: expected previous_record_hash '{}', got '{}'",
                    index, expected, actual
                )
            }
        }
    }
}

impl std::error::Error for ChainError {}
