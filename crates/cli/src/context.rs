//! Application context - wires everything together

use fides_authz::{AuditTrail, PaymentGate};
use fides_events::JournalStore;
use fides_ledger::Ledger;
use std::path::Path;

use crate::config::FidesConfig;

/// Application context - a payment gate over the on-disk journal
pub struct AppContext {
    pub gate: PaymentGate<JournalStore>,
    config: FidesConfig,
}

impl AppContext {
    /// Open the journal (replaying it) and attach the audit trail if enabled
    pub fn new(config: FidesConfig) -> Result<Self, anyhow::Error> {
        let store = JournalStore::open_with(
            &config.data_dir,
            &config.records_file,
            &config.payments_file,
        )?;
        let mut gate = PaymentGate::new(Ledger::open(store));

        if config.audit_enabled {
            gate = gate.with_audit(AuditTrail::new(config.audit_path())?);
        }

        let records = gate.with_ledger(|ledger| ledger.len())??;
        tracing::debug!(
            data_dir = %config.data_dir.display(),
            records,
            "Application context ready"
        );

        Ok(Self { gate, config })
    }

    /// Context with default settings rooted at `data_path`
    pub fn open(data_path: impl AsRef<Path>) -> Result<Self, anyhow::Error> {
        Self::new(FidesConfig::default().with_data_dir(Some(data_path.as_ref().to_path_buf())))
    }

    pub fn config(&self) -> &FidesConfig {
        &self.config
    }

    /// Number of records in the chain
    pub fn record_count(&self) -> Result<usize, anyhow::Error> {
        Ok(self.gate.with_ledger(|ledger| ledger.len())??)
    }
}
