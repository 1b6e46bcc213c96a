//! Append-only ledger handle
//!
//! The ledger owns a store and is the only way records get into it. There
//! is no update or delete. Every append re-checks the hash link against the
//! current tail, so a caller that computed its link from a stale tail gets a
//! `ChainError` instead of forking the chain.

use crate::error::{LedgerError, LedgerResult};
use crate::hash::{genesis_hash, record_hash, verify_chain, ChainError};
use crate::memory::MemoryStore;
use crate::payment::{Payment, PaymentRecord};
use crate::record::Record;
use crate::store::RecordStore;
use fides_core::{new_uuid_v4, now_timestamp, parse_decimal};
use rust_decimal::Decimal;

/// Result of a full chain walk
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChainIntegrity {
    pub valid: bool,
    /// Position of the first record whose genesis/link check failed
    pub first_invalid_index: Option<usize>,
}

impl ChainIntegrity {
    pub fn is_valid(&self) -> bool {
        self.valid
    }
}

/// Hash-chained record ledger plus the payment log
pub struct Ledger<S: RecordStore = MemoryStore> {
    store: S,
}

impl Ledger<MemoryStore> {
    /// Create a ledger backed by an empty in-memory store
    pub fn in_memory() -> Self {
        Self::open(MemoryStore::new())
    }
}

impl<S: RecordStore> Ledger<S> {
    /// Open a ledger over an existing store
    pub fn open(store: S) -> Self {
        Self { store }
    }

    /// Append a record, enforcing the genesis rule or the link to the tail.
    ///
    /// Returns the hash of the appended record.
    pub fn append(&mut self, record: Record) -> LedgerResult<String> {
        let position = self.store.record_count()?;

        match self.store.last_hash()? {
            None => {
                let expected = genesis_hash(record.authority_id(), record.record_timestamp());
                if record.previous_record_hash() != expected {
                    tracing::warn!(
                        record_type = %record.record_type(),
                        "Rejected append: invalid genesis hash"
                    );
                    return Err(ChainError::InvalidGenesis {
                        expected,
                        actual: record.previous_record_hash().to_string(),
                    }
                    .into());
                }
            }
            Some(expected) => {
                if record.previous_record_hash() != expected {
                    tracing::warn!(
                        index = position,
                        record_type = %record.record_type(),
                        "Rejected append: hash chain link mismatch"
                    );
                    return Err(ChainError::BrokenLink {
                        index: position,
                        expected,
                        actual: record.previous_record_hash().to_string(),
                    }
                    .into());
                }
            }
        }

        if let Some(decision_id) = record.decision_id() {
            if self.store.find_decision(decision_id)?.is_some() {
                // Not rejected: lookups keep resolving to the first record
                tracing::warn!(decision_id, "Duplicate decision_id appended");
            }
        }

        let hash = record_hash(&record);
        self.store.append_record(&record, &hash)?;

        tracing::debug!(
            index = position,
            record_type = %record.record_type(),
            hash = %hash,
            "Record appended"
        );

        Ok(hash)
    }

    /// First DR/SDR with this `decision_id`
    pub fn find_decision(&self, decision_id: &str) -> LedgerResult<Option<Record>> {
        Ok(self.store.find_decision(decision_id)?)
    }

    /// First RR targeting this `decision_id`
    pub fn find_revocation(&self, decision_id: &str) -> LedgerResult<Option<Record>> {
        Ok(self.store.find_revocation(decision_id)?)
    }

    pub fn is_revoked(&self, decision_id: &str) -> LedgerResult<bool> {
        Ok(self.find_revocation(decision_id)?.is_some())
    }

    /// Exact-decimal total already paid against `decision_id`
    pub fn sum_payments(&self, decision_id: &str) -> LedgerResult<Decimal> {
        Ok(self.store.sum_payments(decision_id)?)
    }

    pub fn payments_for(&self, decision_id: &str) -> LedgerResult<Vec<PaymentRecord>> {
        Ok(self.store.payments_for(decision_id)?)
    }

    /// Record an executed payment under a fresh UUIDv4 payment id.
    ///
    /// The payment is not checked against its decision here; that is the
    /// authorization engine's job and must happen before this call.
    pub fn record_payment(&mut self, payment: &Payment) -> LedgerResult<PaymentRecord> {
        self.record_payment_with_id(&new_uuid_v4(), payment)
    }

    /// Record an executed payment under a caller-chosen id
    pub fn record_payment_with_id(
        &mut self,
        payment_id: &str,
        payment: &Payment,
    ) -> LedgerResult<PaymentRecord> {
        if parse_decimal(&payment.value).is_err() {
            return Err(LedgerError::InvalidPaymentValue(payment.value.clone()));
        }

        let record = PaymentRecord {
            payment_id: payment_id.to_string(),
            payment: payment.clone(),
            recorded_at: now_timestamp(),
        };
        self.store.append_payment(&record)?;

        tracing::debug!(
            payment_id,
            decision_id = %payment.decision_id,
            value = %payment.value,
            "Payment recorded"
        );

        Ok(record)
    }

    /// Walk the whole chain: genesis on element 0, links on the rest
    pub fn verify_chain_integrity(&self) -> LedgerResult<ChainIntegrity> {
        let records = self.store.records()?;

        Ok(match verify_chain(&records) {
            Ok(()) => ChainIntegrity {
                valid: true,
                first_invalid_index: None,
            },
            Err(err) => {
                tracing::warn!(index = err.index(), error = %err, "Chain integrity check failed");
                ChainIntegrity {
                    valid: false,
                    first_invalid_index: Some(err.index()),
                }
            }
        })
    }

    /// All records in insertion order
    pub fn records(&self) -> LedgerResult<Vec<Record>> {
        Ok(self.store.records()?)
    }

    pub fn last_record(&self) -> LedgerResult<Option<Record>> {
        Ok(self.store.last_record()?)
    }

    pub fn last_hash(&self) -> LedgerResult<Option<String>> {
        Ok(self.store.last_hash()?)
    }

    pub fn len(&self) -> LedgerResult<usize> {
        Ok(self.store.record_count()?)
    }

    pub fn is_empty(&self) -> LedgerResult<bool> {
        Ok(self.len()? == 0)
    }

    /// Borrow the underlying store
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Flush and release the store
    pub fn close(mut self) -> LedgerResult<()> {
        self.store.flush()?;
        Ok(())
    }
}
