//! Payment Gate - shared, thread-safe entry point for executors
//!
//! Appends (record creation and payment recording) take the write lock, so
//! "read tail, link, append" is one critical section and the chain cannot
//! fork. Checks take the read lock and see a consistent snapshot.
//! `authorize_and_record` decides and records under one write lock, which
//! closes the double-spend window of separate check-then-record calls.

use std::sync::{Arc, Mutex, RwLock, RwLockReadGuard, RwLockWriteGuard};

use fides_ledger::{
    create_decision_record, create_revocation_record, ChainIntegrity, Ledger, MemoryStore,
    NewDecision, NewRevocation, Payment, PaymentRecord, Record, RecordStore,
};

use crate::audit::{AuditEvent, AuditTrail};
use crate::decision::{Authorization, RejectReason};
use crate::engine::authorize_with_reason;
use crate::error::{AuthzError, AuthzResult};

pub struct PaymentGate<S: RecordStore = MemoryStore> {
    ledger: Arc<RwLock<Ledger<S>>>,
    audit: Option<Arc<Mutex<AuditTrail>>>,
}

impl<S: RecordStore> Clone for PaymentGate<S> {
    fn clone(&self) -> Self {
        Self {
            ledger: Arc::clone(&self.ledger),
            audit: self.audit.clone(),
        }
    }
}

impl PaymentGate<MemoryStore> {
    /// Gate over an empty in-memory ledger
    pub fn in_memory() -> Self {
        Self::new(Ledger::in_memory())
    }
}

impl<S: RecordStore> PaymentGate<S> {
    pub fn new(ledger: Ledger<S>) -> Self {
        Self {
            ledger: Arc::new(RwLock::new(ledger)),
            audit: None,
        }
    }

    /// Write every decision, with its reason, to `trail`
    pub fn with_audit(mut self, trail: AuditTrail) -> Self {
        self.audit = Some(Arc::new(Mutex::new(trail)));
        self
    }

    fn read(&self) -> AuthzResult<RwLockReadGuard<'_, Ledger<S>>> {
        self.ledger.read().map_err(|_| AuthzError::LockPoisoned)
    }

    fn write(&self) -> AuthzResult<RwLockWriteGuard<'_, Ledger<S>>> {
        self.ledger.write().map_err(|_| AuthzError::LockPoisoned)
    }

    pub fn create_decision(&self, new: NewDecision) -> AuthzResult<Record> {
        let mut ledger = self.write()?;
        Ok(create_decision_record(&mut *ledger, new)?)
    }

    pub fn create_revocation(&self, new: NewRevocation) -> AuthzResult<Record> {
        let mut ledger = self.write()?;
        Ok(create_revocation_record(&mut *ledger, new)?)
    }

    /// Binary decision for `payment`. Nothing is recorded.
    pub fn check(&self, payment: &Payment) -> bool {
        let outcome = match self.read() {
            Ok(ledger) => authorize_with_reason(&*ledger, payment),
            Err(_) => Authorization::Rejected(RejectReason::LedgerUnavailable),
        };
        self.audit_best_effort(payment, &outcome);
        outcome.is_authorized()
    }

    /// Decide and, when authorized, record the payment under a fresh id.
    ///
    /// `Ok(None)` means blocked. Errors only come from recording or from the
    /// audit trail; in both cases nothing was recorded.
    pub fn authorize_and_record(&self, payment: &Payment) -> AuthzResult<Option<PaymentRecord>> {
        self.authorize_and_record_inner(None, payment)
    }

    /// As [`authorize_and_record`](Self::authorize_and_record), with a
    /// caller-chosen payment id
    pub fn authorize_and_record_with_id(
        &self,
        payment_id: &str,
        payment: &Payment,
    ) -> AuthzResult<Option<PaymentRecord>> {
        self.authorize_and_record_inner(Some(payment_id), payment)
    }

    fn authorize_and_record_inner(
        &self,
        payment_id: Option<&str>,
        payment: &Payment,
    ) -> AuthzResult<Option<PaymentRecord>> {
        let mut ledger = self.write()?;

        let outcome = authorize_with_reason(&*ledger, payment);
        self.audit(payment, &outcome)?;
        if !outcome.is_authorized() {
            return Ok(None);
        }

        let record = match payment_id {
            Some(id) => ledger.record_payment_with_id(id, payment)?,
            None => ledger.record_payment(payment)?,
        };
        Ok(Some(record))
    }

    pub fn verify_chain_integrity(&self) -> AuthzResult<ChainIntegrity> {
        Ok(self.read()?.verify_chain_integrity()?)
    }

    /// Run `f` against a read-locked snapshot of the ledger
    pub fn with_ledger<R>(&self, f: impl FnOnce(&Ledger<S>) -> R) -> AuthzResult<R> {
        Ok(f(&*self.read()?))
    }

    /// Audited events so far, empty when no trail is attached
    pub fn audit_events(&self) -> AuthzResult<Vec<AuditEvent>> {
        match &self.audit {
            Some(trail) => trail.lock().map_err(|_| AuthzError::LockPoisoned)?.read_all(),
            None => Ok(Vec::new()),
        }
    }

    fn audit(&self, payment: &Payment, outcome: &Authorization) -> AuthzResult<()> {
        if let Some(trail) = &self.audit {
            let event = AuditEvent::new(payment.decision_id.clone(), outcome);
            trail
                .lock()
                .map_err(|_| AuthzError::LockPoisoned)?
                .append(&event)?;
        }
        Ok(())
    }

    fn audit_best_effort(&self, payment: &Payment, outcome: &Authorization) {
        if let Err(err) = self.audit(payment, outcome) {
            tracing::warn!(
                decision_id = %payment.decision_id,
                error = %err,
                "Failed to write audit event"
            );
        }
    }
}
