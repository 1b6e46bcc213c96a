//! Audit trail - append-only JSONL log of authorization decisions
//!
//! Kept apart from the record ledger: it holds the reject reasons that must
//! never reach the payment requester, for offline review only.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use crate::decision::{Authorization, RejectReason};
use crate::error::AuthzResult;

/// One decision of the engine, as audited
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditEvent {
    pub id: String,
    pub decision_id: String,
    pub authorized: bool,
    /// Failing rule; absent when authorized
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<RejectReason>,
    pub checked_at: DateTime<Utc>,
}

impl AuditEvent {
    pub fn new(decision_id: impl Into<String>, outcome: &Authorization) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            decision_id: decision_id.into(),
            authorized: outcome.is_authorized(),
            reason: outcome.reason().cloned(),
            checked_at: Utc::now(),
        }
    }
}

/// Append-only audit trail.
///
/// Each line is a JSON-serialized `AuditEvent`. The in-memory variant keeps
/// events in a list instead.
pub struct AuditTrail {
    path: PathBuf,
    file: Option<File>,
    events: Vec<AuditEvent>,
}

impl AuditTrail {
    /// Open (or create) a trail at the given path
    pub fn new(path: impl AsRef<Path>) -> AuthzResult<Self> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let file = OpenOptions::new().create(true).append(true).open(&path)?;

        Ok(Self {
            path,
            file: Some(file),
            events: Vec::new(),
        })
    }

    /// Create an in-memory trail
    pub fn in_memory() -> Self {
        Self {
            path: PathBuf::new(),
            file: None,
            events: Vec::new(),
        }
    }

    pub fn append(&mut self, event: &AuditEvent) -> AuthzResult<()> {
        match self.file {
            Some(ref mut file) => {
                let json = serde_json::to_string(event)?;
                writeln!(file, "{}", json)?;
                file.flush()?;
            }
            None => self.events.push(event.clone()),
        }
        Ok(())
    }

    /// Read all events in append order
    pub fn read_all(&self) -> AuthzResult<Vec<AuditEvent>> {
        if self.file.is_none() {
            return Ok(self.events.clone());
        }

        let reader = BufReader::new(File::open(&self.path)?);
        let mut events = Vec::new();

        for line in reader.lines() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            events.push(serde_json::from_str(&line)?);
        }

        Ok(events)
    }

    pub fn len(&self) -> AuthzResult<usize> {
        Ok(self.read_all()?.len())
    }

    pub fn is_empty(&self) -> AuthzResult<bool> {
        Ok(self.len()? == 0)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_in_memory(&self) -> bool {
        self.file.is_none()
    }
}
