//! CLI configuration
//!
//! Every field has a serde default, so a config file only needs the keys it
//! changes. Precedence: `--data` flag, then `FIDES_DATA_DIR`, then the file,
//! then the defaults.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variable overriding `data_dir`
pub const DATA_DIR_ENV: &str = "FIDES_DATA_DIR";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FidesConfig {
    /// Directory holding the journal and audit files
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    #[serde(default = "default_records_file")]
    pub records_file: String,

    #[serde(default = "default_payments_file")]
    pub payments_file: String,

    #[serde(default = "default_audit_file")]
    pub audit_file: String,

    /// Write every authorization decision, with its reason, to the audit file
    #[serde(default = "default_audit_enabled")]
    pub audit_enabled: bool,
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("./data")
}

fn default_records_file() -> String {
    fides_events::RECORDS_FILE.to_string()
}

fn default_payments_file() -> String {
    fides_events::PAYMENTS_FILE.to_string()
}

fn default_audit_file() -> String {
    "audit.jsonl".to_string()
}

fn default_audit_enabled() -> bool {
    true
}

impl Default for FidesConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            records_file: default_records_file(),
            payments_file: default_payments_file(),
            audit_file: default_audit_file(),
            audit_enabled: default_audit_enabled(),
        }
    }
}

impl FidesConfig {
    /// Load configuration from JSON file
    pub fn from_file(path: &Path) -> Result<Self, std::io::Error> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))
    }

    /// Resolve the effective configuration for a CLI invocation
    pub fn resolve(
        config_path: Option<&Path>,
        data_flag: Option<PathBuf>,
    ) -> Result<Self, std::io::Error> {
        let config = match config_path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        Ok(config
            .with_data_dir(std::env::var(DATA_DIR_ENV).ok().map(PathBuf::from))
            .with_data_dir(data_flag))
    }

    /// Replace `data_dir` when an override is given
    pub fn with_data_dir(mut self, data_dir: Option<PathBuf>) -> Self {
        if let Some(dir) = data_dir {
            self.data_dir = dir;
        }
        self
    }

    pub fn audit_path(&self) -> PathBuf {
        self.data_dir.join(&self.audit_file)
    }

    pub fn records_path(&self) -> PathBuf {
        self.data_dir.join(&self.records_file)
    }

    pub fn payments_path(&self) -> PathBuf {
        self.data_dir.join(&self.payments_file)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = FidesConfig::default();

        assert_eq!(config.data_dir, PathBuf::from("./data"));
        assert_eq!(config.records_file, "records.jsonl");
        assert_eq!(config.payments_file, "payments.jsonl");
        assert_eq!(config.audit_file, "audit.jsonl");
        assert!(config.audit_enabled);
    }

    #[test]
    fn test_config_partial_json() {
        // Missing fields fall back to defaults
        let json = r#"{ "data_dir": "/var/lib/fides", "audit_enabled": false }"#;
        let config: FidesConfig = serde_json::from_str(json).unwrap();

        assert_eq!(config.data_dir, PathBuf::from("/var/lib/fides"));
        assert!(!config.audit_enabled);
        assert_eq!(config.records_file, "records.jsonl");
    }

    #[test]
    fn test_from_file_and_override() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fides.json");
        std::fs::write(&path, r#"{ "records_file": "decisions.jsonl" }"#).unwrap();

        let config = FidesConfig::from_file(&path)
            .unwrap()
            .with_data_dir(Some(dir.path().to_path_buf()));

        assert_eq!(config.records_path(), dir.path().join("decisions.jsonl"));
        assert_eq!(config.audit_path(), dir.path().join("audit.jsonl"));
    }

    #[test]
    fn test_with_data_dir_none_keeps_value() {
        let config = FidesConfig::default().with_data_dir(None);
        assert_eq!(config.data_dir, PathBuf::from("./data"));
    }

    #[test]
    fn test_invalid_file_is_invalid_data() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fides.json");
        std::fs::write(&path, "not json").unwrap();

        let err = FidesConfig::from_file(&path).unwrap_err();
        assert_eq!(err.kind(), std::io::ErrorKind::InvalidData);
    }
}
