//! Storage contract for the ledger
//!
//! The backing technology is pluggable. A store must keep records in
//! insertion order, never rewrite or drop them, and keep payments in a
//! separate log. Lookups follow first-occurrence semantics.

use crate::error::StoreError;
use crate::hash::record_hash;
use crate::payment::PaymentRecord;
use crate::record::Record;
use fides_core::{exact_add, parse_decimal};
use rust_decimal::Decimal;

pub trait RecordStore {
    /// Durably append a record. `hash` is the record's canonical hash.
    fn append_record(&mut self, record: &Record, hash: &str) -> Result<(), StoreError>;

    /// All records in insertion order
    fn records(&self) -> Result<Vec<Record>, StoreError>;

    fn record_count(&self) -> Result<usize, StoreError>;

    fn last_record(&self) -> Result<Option<Record>, StoreError>;

    /// Hash of the last record, if any
    fn last_hash(&self) -> Result<Option<String>, StoreError> {
        Ok(self.last_record()?.as_ref().map(record_hash))
    }

    /// First DR/SDR carrying `decision_id`
    fn find_decision(&self, decision_id: &str) -> Result<Option<Record>, StoreError> {
        Ok(self
            .records()?
            .into_iter()
            .find(|record| record.decision_id() == Some(decision_id)))
    }

    /// First RR targeting `decision_id`
    fn find_revocation(&self, decision_id: &str) -> Result<Option<Record>, StoreError> {
        Ok(self
            .records()?
            .into_iter()
            .find(|record| record.target_decision_id() == Some(decision_id)))
    }

    /// Append to the payment log. Duplicate `payment_id`s are rejected.
    fn append_payment(&mut self, payment: &PaymentRecord) -> Result<(), StoreError>;

    /// Payments executed against `decision_id`, in insertion order
    fn payments_for(&self, decision_id: &str) -> Result<Vec<PaymentRecord>, StoreError>;

    /// Exact-decimal sum of payment values for `decision_id`.
    ///
    /// A total that overflows or cannot be held exactly is an error, never a
    /// rounded value.
    fn sum_payments(&self, decision_id: &str) -> Result<Decimal, StoreError> {
        self.payments_for(decision_id)?
            .iter()
            .try_fold(Decimal::ZERO, |total, payment| {
                let value = parse_decimal(payment.value()).map_err(|_| {
                    StoreError::InvalidStoredValue {
                        payment_id: payment.payment_id.clone(),
                        value: payment.value().to_string(),
                    }
                })?;
                exact_add(total, value).ok_or_else(|| StoreError::InexactTotal {
                    decision_id: decision_id.to_string(),
                })
            })
    }

    /// Push buffered writes to durable storage
    fn flush(&mut self) -> Result<(), StoreError> {
        Ok(())
    }
}
