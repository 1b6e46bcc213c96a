//! Fides Events - JSONL journal store
//!
//! Records and payments are appended to two JSONL files. The files are the
//! source of truth; the in-memory index is rebuilt from them on every open.

pub mod reader;
pub mod store;

pub use reader::JournalReader;
pub use store::{JournalStore, PAYMENTS_FILE, RECORDS_FILE};
