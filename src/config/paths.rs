//! Path management for the ledger
//!
//! ## Path Resolution Order
//!
//! 1. `ENVELOPE_LEDGER_DATA_DIR` environment variable (if set)
//! 2. The platform config directory from `directories::ProjectDirs`
//!    (`~/.config/envelope-ledger` on Linux)

use std::path::PathBuf;

use directories::ProjectDirs;

use crate::error::EnvelopeError;
use crate::models::BudgetId;

/// Environment variable that overrides the data directory
pub const DATA_DIR_ENV: &str = "ENVELOPE_LEDGER_DATA_DIR";

/// Manages all paths used by the ledger
#[derive(Debug, Clone)]
pub struct LedgerPaths {
    base_dir: PathBuf,
}

impl LedgerPaths {
    /// Resolve the base directory from the environment or the platform
    ///
    /// # Errors
    ///
    /// Returns a `Config` error if no home directory can be determined.
    pub fn new() -> Result<Self, EnvelopeError> {
        let base_dir = match std::env::var(DATA_DIR_ENV) {
            Ok(custom) if !custom.is_empty() => PathBuf::from(custom),
            _ => resolve_default_path()?,
        };

        Ok(Self { base_dir })
    }

    /// Create LedgerPaths with a custom base directory (useful for testing)
    pub fn with_base_dir(base_dir: PathBuf) -> Self {
        Self { base_dir }
    }

    pub fn base_dir(&self) -> &PathBuf {
        &self.base_dir
    }

    /// `<base>/data`
    pub fn data_dir(&self) -> PathBuf {
        self.base_dir.join("data")
    }

    /// `<base>/data/budgets`, one JSON document per budget
    pub fn budgets_dir(&self) -> PathBuf {
        self.data_dir().join("budgets")
    }

    /// Document holding the full ledger of one budget
    pub fn budget_file(&self, budget_id: &BudgetId) -> PathBuf {
        self.budgets_dir().join(format!("{}.json", budget_id))
    }

    /// Advisory lock file guarding commits to one budget document
    pub fn budget_lock_file(&self, budget_id: &BudgetId) -> PathBuf {
        self.budgets_dir().join(format!("{}.json.lock", budget_id))
    }

    pub fn settings_file(&self) -> PathBuf {
        self.base_dir.join("config.json")
    }

    pub fn audit_log(&self) -> PathBuf {
        self.base_dir.join("audit.log")
    }

    /// Ensure all required directories exist
    pub fn ensure_directories(&self) -> Result<(), EnvelopeError> {
        std::fs::create_dir_all(self.budgets_dir()).map_err(|e| {
            EnvelopeError::StoreUnavailable(format!(
                "Failed to create data directory {}: {}",
                self.budgets_dir().display(),
                e
            ))
        })
    }

    /// Whether `init` has been run here (settings file exists)
    pub fn is_initialized(&self) -> bool {
        self.settings_file().exists()
    }
}

fn resolve_default_path() -> Result<PathBuf, EnvelopeError> {
    ProjectDirs::from("", "", "envelope-ledger")
        .map(|dirs| dirs.config_dir().to_path_buf())
        .ok_or_else(|| EnvelopeError::Config("Could not determine a home directory".into()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_custom_base_dir() {
        let temp_dir = TempDir::new().unwrap();
        let paths = LedgerPaths::with_base_dir(temp_dir.path().to_path_buf());

        assert_eq!(paths.base_dir(), temp_dir.path());
        assert_eq!(paths.data_dir(), temp_dir.path().join("data"));
        assert_eq!(paths.settings_file(), temp_dir.path().join("config.json"));
        assert_eq!(paths.audit_log(), temp_dir.path().join("audit.log"));
    }

    #[test]
    fn test_budget_file_layout() {
        let temp_dir = TempDir::new().unwrap();
        let paths = LedgerPaths::with_base_dir(temp_dir.path().to_path_buf());
        let id = BudgetId::new();

        assert_eq!(
            paths.budget_file(&id),
            temp_dir
                .path()
                .join("data")
                .join("budgets")
                .join(format!("{}.json", id))
        );
        assert_eq!(
            paths.budget_lock_file(&id).file_name().unwrap().to_str().unwrap(),
            format!("{}.json.lock", id)
        );
    }

    #[test]
    fn test_ensure_directories() {
        let temp_dir = TempDir::new().unwrap();
        let paths = LedgerPaths::with_base_dir(temp_dir.path().join("nested"));

        assert!(!paths.is_initialized());
        paths.ensure_directories().unwrap();
        assert!(paths.budgets_dir().is_dir());
    }
}
