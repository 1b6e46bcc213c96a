//! JSONL journal reader - sequential reader for replay

use fides_ledger::{PaymentRecord, Record, StoreError};
use serde_json::Value;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

/// Sequential reader over one journal file
pub struct JournalReader {
    path: PathBuf,
}

impl JournalReader {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Read every record line in order. A missing file reads as empty.
    pub fn read_records(&self) -> Result<Vec<Record>, StoreError> {
        self.read_lines(|line| {
            let document: Value = serde_json::from_str(line).map_err(|e| e.to_string())?;
            Record::from_document(document).map_err(|e| e.to_string())
        })
    }

    /// Read every payment line in order
    pub fn read_payments(&self) -> Result<Vec<PaymentRecord>, StoreError> {
        self.read_lines(|line| serde_json::from_str(line).map_err(|e| e.to_string()))
    }

    /// Count non-empty lines
    pub fn count(&self) -> Result<usize, StoreError> {
        self.read_lines(|_| Ok(())).map(|lines| lines.len())
    }

    fn read_lines<T>(
        &self,
        parse: impl Fn(&str) -> Result<T, String>,
    ) -> Result<Vec<T>, StoreError> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let reader = BufReader::new(File::open(&self.path)?);
        let mut items = Vec::new();

        for (index, line) in reader.lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let item = parse(&line).map_err(|reason| StoreError::Corrupt {
                file: self.path.display().to_string(),
                line: index + 1,
                reason,
            })?;
            items.push(item);
        }

        Ok(items)
    }
}
