//! JSONL journal store - append-only writer with a replayed index

use crate::reader::JournalReader;
use fides_ledger::hash::{canonical_record, record_hash};
use fides_ledger::{MemoryStore, PaymentRecord, Record, RecordStore, StoreError};
use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

pub const RECORDS_FILE: &str = "records.jsonl";
pub const PAYMENTS_FILE: &str = "payments.jsonl";

/// Durable record store.
///
/// Each record is written as one canonical JSON line, each payment as one
/// JSON line, and both writers are flushed per append. Reads are served
/// from an in-memory index rebuilt by replaying the files on open.
pub struct JournalStore {
    base_path: PathBuf,
    records_path: PathBuf,
    payments_path: PathBuf,
    index: MemoryStore,
    records: Option<BufWriter<File>>,
    payments: Option<BufWriter<File>>,
}

impl JournalStore {
    /// Open (or create) a journal in `base_path` with the default file names
    pub fn open(base_path: impl AsRef<Path>) -> Result<Self, StoreError> {
        Self::open_with(base_path, RECORDS_FILE, PAYMENTS_FILE)
    }

    /// Open (or create) a journal with explicit file names
    pub fn open_with(
        base_path: impl AsRef<Path>,
        records_file: &str,
        payments_file: &str,
    ) -> Result<Self, StoreError> {
        let base_path = base_path.as_ref().to_path_buf();
        fs::create_dir_all(&base_path)?;

        let records_path = base_path.join(records_file);
        let payments_path = base_path.join(payments_file);

        let mut index = MemoryStore::new();
        for record in JournalReader::new(&records_path).read_records()? {
            let hash = record_hash(&record);
            index.append_record(&record, &hash)?;
        }
        for payment in JournalReader::new(&payments_path).read_payments()? {
            index.append_payment(&payment)?;
        }

        tracing::debug!(
            path = %base_path.display(),
            records = index.record_count()?,
            payments = index.payment_count(),
            "Journal replayed"
        );

        let records = Some(BufWriter::new(append_file(&records_path)?));
        let payments = Some(BufWriter::new(append_file(&payments_path)?));

        Ok(Self {
            base_path,
            records_path,
            payments_path,
            index,
            records,
            payments,
        })
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    pub fn records_path(&self) -> &Path {
        &self.records_path
    }

    pub fn payments_path(&self) -> &Path {
        &self.payments_path
    }

    /// Flush and close both files. Further appends fail with `Closed`.
    pub fn close(&mut self) -> Result<(), StoreError> {
        self.flush()?;
        self.records = None;
        self.payments = None;
        Ok(())
    }
}

fn append_file(path: &Path) -> Result<File, StoreError> {
    Ok(OpenOptions::new().create(true).append(true).open(path)?)
}

fn write_line(writer: &mut Option<BufWriter<File>>, line: &str) -> Result<(), StoreError> {
    let writer = writer.as_mut().ok_or(StoreError::Closed)?;
    writeln!(writer, "{}", line)?;
    writer.flush()?;
    Ok(())
}

impl RecordStore for JournalStore {
    fn append_record(&mut self, record: &Record, hash: &str) -> Result<(), StoreError> {
        write_line(&mut self.records, &canonical_record(record))?;
        self.index.append_record(record, hash)
    }

    fn records(&self) -> Result<Vec<Record>, StoreError> {
        self.index.records()
    }

    fn record_count(&self) -> Result<usize, StoreError> {
        self.index.record_count()
    }

    fn last_record(&self) -> Result<Option<Record>, StoreError> {
        self.index.last_record()
    }

    fn last_hash(&self) -> Result<Option<String>, StoreError> {
        self.index.last_hash()
    }

    fn find_decision(&self, decision_id: &str) -> Result<Option<Record>, StoreError> {
        self.index.find_decision(decision_id)
    }

    fn find_revocation(&self, decision_id: &str) -> Result<Option<Record>, StoreError> {
        self.index.find_revocation(decision_id)
    }

    fn append_payment(&mut self, payment: &PaymentRecord) -> Result<(), StoreError> {
        // Reject before touching the file so the log never holds a duplicate
        if self.index.has_payment_id(&payment.payment_id) {
            return Err(StoreError::DuplicatePayment(payment.payment_id.clone()));
        }
        write_line(&mut self.payments, &serde_json::to_string(payment)?)?;
        self.index.append_payment(payment)
    }

    fn payments_for(&self, decision_id: &str) -> Result<Vec<PaymentRecord>, StoreError> {
        self.index.payments_for(decision_id)
    }

    fn flush(&mut self) -> Result<(), StoreError> {
        for writer in [&mut self.records, &mut self.payments].into_iter().flatten() {
            writer.flush()?;
        }
        Ok(())
    }
}

impl Drop for JournalStore {
    fn drop(&mut self) {
        let _ = self.close();
    }
}
