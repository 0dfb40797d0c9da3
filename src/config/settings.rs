//! Ledger settings
//!
//! Stored as `config.json` in the base directory. Every field has a serde
//! default so older files keep loading as fields are added.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::paths::LedgerPaths;
use crate::error::EnvelopeError;
use crate::storage::file_io::write_json_atomic;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// Schema version for migration support
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,

    /// ISO 4217 code used when a budget is created without one
    #[serde(default = "default_currency")]
    pub default_currency: String,

    /// Name of the reserved group holding credit card payment categories
    #[serde(default = "default_debt_group_name")]
    pub debt_group_name: String,

    /// Memo given to reconciliation adjustments when no notes are supplied
    #[serde(default = "default_reconciliation_memo")]
    pub reconciliation_memo: String,

    /// How long a caller waits for a budget lock before giving up
    #[serde(default = "default_lock_timeout_ms")]
    pub lock_timeout_ms: u64,

    #[serde(default = "default_transaction_list_limit")]
    pub transaction_list_limit: usize,

    #[serde(default = "default_payee_search_limit")]
    pub payee_search_limit: usize,

    /// Write create/update/delete entries to `audit.log`
    #[serde(default = "default_audit_enabled")]
    pub audit_enabled: bool,
}

fn default_schema_version() -> u32 {
    1
}

fn default_currency() -> String {
    "USD".to_string()
}

fn default_debt_group_name() -> String {
    "Credit Card Payments".to_string()
}

fn default_reconciliation_memo() -> String {
    "Reconciliation Adjustment".to_string()
}

fn default_lock_timeout_ms() -> u64 {
    5000
}

fn default_transaction_list_limit() -> usize {
    500
}

fn default_payee_search_limit() -> usize {
    100
}

fn default_audit_enabled() -> bool {
    true
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            schema_version: default_schema_version(),
            default_currency: default_currency(),
            debt_group_name: default_debt_group_name(),
            reconciliation_memo: default_reconciliation_memo(),
            lock_timeout_ms: default_lock_timeout_ms(),
            transaction_list_limit: default_transaction_list_limit(),
            payee_search_limit: default_payee_search_limit(),
            audit_enabled: default_audit_enabled(),
        }
    }
}

impl Settings {
    pub fn lock_timeout(&self) -> Duration {
        Duration::from_millis(self.lock_timeout_ms)
    }

    /// Load settings from disk, or fall back to defaults if the file doesn't exist
    pub fn load_or_create(paths: &LedgerPaths) -> Result<Self, EnvelopeError> {
        let settings_path = paths.settings_file();

        if !settings_path.exists() {
            return Ok(Settings::default());
        }

        let contents = std::fs::read_to_string(&settings_path).map_err(|e| {
            EnvelopeError::StoreUnavailable(format!("Failed to read settings file: {}", e))
        })?;

        serde_json::from_str(&contents)
            .map_err(|e| EnvelopeError::Config(format!("Failed to parse settings file: {}", e)))
    }

    pub fn save(&self, paths: &LedgerPaths) -> Result<(), EnvelopeError> {
        paths.ensure_directories()?;
        write_json_atomic(paths.settings_file(), self)
    }

    /// Set a single field from its string form (used by `envelope config set`)
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), EnvelopeError> {
        let invalid = |what: &str| {
            EnvelopeError::InvalidArgument(format!("{} expects {}, got '{}'", key, what, value))
        };

        match key {
            "default_currency" => {
                self.default_currency = crate::models::budget::normalize_currency(value)?;
            }
            "debt_group_name" => {
                let trimmed = value.trim();
                if trimmed.is_empty() {
                    return Err(invalid("a non-empty name"));
                }
                self.debt_group_name = trimmed.to_string();
            }
            "reconciliation_memo" => self.reconciliation_memo = value.to_string(),
            "lock_timeout_ms" => {
                self.lock_timeout_ms = value.parse().map_err(|_| invalid("milliseconds"))?;
            }
            "transaction_list_limit" => {
                self.transaction_list_limit = value.parse().map_err(|_| invalid("a count"))?;
            }
            "payee_search_limit" => {
                self.payee_search_limit = value.parse().map_err(|_| invalid("a count"))?;
            }
            "audit_enabled" => {
                self.audit_enabled = value.parse().map_err(|_| invalid("true or false"))?;
            }
            _ => {
                return Err(EnvelopeError::InvalidArgument(format!(
                    "Unknown setting: {}",
                    key
                )))
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert_eq!(settings.default_currency, "USD");
        assert_eq!(settings.debt_group_name, "Credit Card Payments");
        assert_eq!(settings.lock_timeout(), Duration::from_secs(5));
        assert!(settings.audit_enabled);
    }

    #[test]
    fn test_save_and_load() {
        let temp_dir = TempDir::new().unwrap();
        let paths = LedgerPaths::with_base_dir(temp_dir.path().to_path_buf());

        let mut settings = Settings::default();
        settings.reconciliation_memo = "Statement fix".into();
        settings.lock_timeout_ms = 250;
        settings.save(&paths).unwrap();

        let loaded = Settings::load_or_create(&paths).unwrap();
        assert_eq!(loaded, settings);
    }

    #[test]
    fn test_missing_fields_use_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let paths = LedgerPaths::with_base_dir(temp_dir.path().to_path_buf());
        std::fs::write(paths.settings_file(), r#"{"default_currency":"EUR"}"#).unwrap();

        let loaded = Settings::load_or_create(&paths).unwrap();
        assert_eq!(loaded.default_currency, "EUR");
        assert_eq!(loaded.transaction_list_limit, 500);
    }

    #[test]
    fn test_set_values() {
        let mut settings = Settings::default();
        settings.set("default_currency", "eur").unwrap();
        settings.set("audit_enabled", "false").unwrap();
        assert_eq!(settings.default_currency, "EUR");
        assert!(!settings.audit_enabled);

        assert!(settings.set("lock_timeout_ms", "soon").is_err());
        assert!(settings.set("nonsense", "1").is_err());
        assert!(settings.set("debt_group_name", "  ").is_err());
    }
}
