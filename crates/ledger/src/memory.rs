//! In-memory record store
//!
//! Used directly for tests and demos, and as the index behind the durable
//! JSONL store, which replays its files into one of these on open.

use crate::error::StoreError;
use crate::payment::PaymentRecord;
use crate::record::Record;
use crate::store::RecordStore;
use std::collections::{HashMap, HashSet};

#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    /// Records with their canonical hash, in insertion order
    records: Vec<(Record, String)>,
    /// decision_id -> position of the first DR/SDR
    decisions: HashMap<String, usize>,
    /// target_decision_id -> position of the first RR
    revocations: HashMap<String, usize>,
    payments: Vec<PaymentRecord>,
    payment_ids: HashSet<String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn payment_count(&self) -> usize {
        self.payments.len()
    }

    pub fn has_payment_id(&self, payment_id: &str) -> bool {
        self.payment_ids.contains(payment_id)
    }
}

impl RecordStore for MemoryStore {
    fn append_record(&mut self, record: &Record, hash: &str) -> Result<(), StoreError> {
        let position = self.records.len();

        if let Some(decision_id) = record.decision_id() {
            self.decisions
                .entry(decision_id.to_string())
                .or_insert(position);
        }
        if let Some(target) = record.target_decision_id() {
            self.revocations.entry(target.to_string()).or_insert(position);
        }

        self.records.push((record.clone(), hash.to_string()));
        Ok(())
    }

    fn records(&self) -> Result<Vec<Record>, StoreError> {
        Ok(self.records.iter().map(|(record, _)| record.clone()).collect())
    }

    fn record_count(&self) -> Result<usize, StoreError> {
        Ok(self.records.len())
    }

    fn last_record(&self) -> Result<Option<Record>, StoreError> {
        Ok(self.records.last().map(|(record, _)| record.clone()))
    }

    fn last_hash(&self) -> Result<Option<String>, StoreError> {
        Ok(self.records.last().map(|(_, hash)| hash.clone()))
    }

    fn find_decision(&self, decision_id: &str) -> Result<Option<Record>, StoreError> {
        Ok(self
            .decisions
            .get(decision_id)
            .map(|&position| self.records[position].0.clone()))
    }

    fn find_revocation(&self, decision_id: &str) -> Result<Option<Record>, StoreError> {
        Ok(self
            .revocations
            .get(decision_id)
            .map(|&position| self.records[position].0.clone()))
    }

    fn append_payment(&mut self, payment: &PaymentRecord) -> Result<(), StoreError> {
        if !self.payment_ids.insert(payment.payment_id.clone()) {
            return Err(StoreError::DuplicatePayment(payment.payment_id.clone()));
        }
        self.payments.push(payment.clone());
        Ok(())
    }

    fn payments_for(&self, decision_id: &str) -> Result<Vec<PaymentRecord>, StoreError> {
        Ok(self
            .payments
            .iter()
            .filter(|payment| payment.decision_id() == decision_id)
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hash::record_hash;
    use crate::payment::Payment;
    use crate::record::tests::{sample_decision, sample_revocation};
    use rust_decimal_macros::dec;

    fn payment(id: &str, decision_id: &str, value: &str) -> PaymentRecord {
        PaymentRecord {
            payment_id: id.to_string(),
            payment: Payment::new(decision_id, "SUPPLIER-TEST", "BRL", value, "2024-01-15"),
            recorded_at: "2024-01-15T14:00:00Z".to_string(),
        }
    }

    #[test]
    fn test_first_occurrence_wins() {
        let mut store = MemoryStore::new();
        let first = sample_decision();
        let mut duplicate = sample_decision();
        duplicate.beneficiary = "SOMEONE-ELSE".to_string();

        for record in [Record::Decision(first.clone()), Record::Decision(duplicate)] {
            store.append_record(&record, &record_hash(&record)).unwrap();
        }

        let found = store.find_decision(&first.decision_id).unwrap().unwrap();
        assert_eq!(found.as_decision().unwrap().beneficiary, "SUPPLIER-TEST");
        assert_eq!(store.record_count().unwrap(), 2);
    }

    #[test]
    fn test_revocation_lookup_by_target() {
        let mut store = MemoryStore::new();
        let rr = Record::Revocation(sample_revocation());
        store.append_record(&rr, &record_hash(&rr)).unwrap();

        let target = sample_revocation().target_decision_id;
        assert_eq!(store.find_revocation(&target).unwrap(), Some(rr.clone()));
        // A revocation is not a decision
        assert_eq!(store.find_decision(&target).unwrap(), None);
        assert_eq!(store.last_hash().unwrap(), Some(record_hash(&rr)));
    }

    #[test]
    fn test_sum_payments_exact() {
        let mut store = MemoryStore::new();
        store.append_payment(&payment("P1", "d-1", "0.10")).unwrap();
        store.append_payment(&payment("P2", "d-1", "0.20")).unwrap();
        store.append_payment(&payment("P3", "d-2", "999")).unwrap();

        assert_eq!(store.sum_payments("d-1").unwrap(), dec!(0.30));
        assert_eq!(store.sum_payments("d-3").unwrap(), dec!(0));
        assert_eq!(store.payments_for("d-1").unwrap().len(), 2);
    }

    #[test]
    fn test_duplicate_payment_id_rejected() {
        let mut store = MemoryStore::new();
        store.append_payment(&payment("P1", "d-1", "10")).unwrap();
        let result = store.append_payment(&payment("P1", "d-1", "10"));
        assert!(matches!(result, Err(StoreError::DuplicatePayment(_))));
        assert_eq!(store.payment_count(), 1);
    }

    #[test]
    fn test_non_decimal_stored_value_surfaces() {
        let mut store = MemoryStore::new();
        store.append_payment(&payment("P1", "d-1", "ten")).unwrap();
        assert!(matches!(
            store.sum_payments("d-1"),
            Err(StoreError::InvalidStoredValue { .. })
        ));
    }

    #[test]
    fn test_sum_overflow_is_an_error() {
        let mut store = MemoryStore::new();
        store
            .append_payment(&payment("P1", "d-1", "79228162514264337593543950335"))
            .unwrap();
        store
            .append_payment(&payment("P2", "d-1", "79228162514264337593543950335"))
            .unwrap();
        assert!(matches!(
            store.sum_payments("d-1"),
            Err(StoreError::InexactTotal { .. })
        ));
    }

    #[test]
    fn test_sum_never_rounds() {
        let mut store = MemoryStore::new();
        store.append_payment(&payment("P1", "d-1", "100000000000")).unwrap();
        store
            .append_payment(&payment("P2", "d-1", "0.000000000000000001"))
            .unwrap();
        assert!(matches!(
            store.sum_payments("d-1"),
            Err(StoreError::InexactTotal { .. })
        ));
    }
}
