//! JSON-file ledger store
//!
//! One pretty-printed document per budget under `data/budgets/`, replaced
//! atomically on every commit. Commits take an exclusive advisory lock on a
//! sibling `.lock` file, so the revision check and the rename are one step
//! across every process sharing the data directory.

use std::fs::{File, OpenOptions};

use fs2::FileExt;
use tracing::debug;

use super::file_io::{read_json_optional, write_json_atomic};
use super::{check_revision, LedgerData, LedgerStore};
use crate::config::LedgerPaths;
use crate::error::{EnvelopeError, EnvelopeResult};
use crate::models::BudgetId;

/// Minimal view of a stored document used for the revision check
#[derive(serde::Deserialize)]
struct StoredRevision {
    #[serde(default)]
    revision: u64,
}

pub struct JsonFileStore {
    paths: LedgerPaths,
}

impl JsonFileStore {
    pub fn new(paths: LedgerPaths) -> EnvelopeResult<Self> {
        paths.ensure_directories()?;
        Ok(Self { paths })
    }

    pub fn paths(&self) -> &LedgerPaths {
        &self.paths
    }

    /// Block until this handle holds the budget's commit lock; it is
    /// released when the returned file is closed
    fn lock_budget(&self, budget_id: &BudgetId) -> EnvelopeResult<File> {
        let path = self.paths.budget_lock_file(budget_id);
        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(&path)?;
        file.lock_exclusive().map_err(|e| {
            EnvelopeError::StoreUnavailable(format!("cannot lock {}: {}", path.display(), e))
        })?;
        Ok(file)
    }
}

impl LedgerStore for JsonFileStore {
    fn budget_ids(&self) -> EnvelopeResult<Vec<BudgetId>> {
        let dir = self.paths.budgets_dir();
        if !dir.exists() {
            return Ok(Vec::new());
        }

        let mut ids = Vec::new();
        for entry in std::fs::read_dir(&dir)? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            if let Some(id) = path
                .file_stem()
                .and_then(|s| s.to_str())
                .and_then(|s| s.parse::<BudgetId>().ok())
            {
                ids.push(id);
            }
        }
        ids.sort();
        Ok(ids)
    }

    fn load(&self, budget_id: &BudgetId) -> EnvelopeResult<LedgerData> {
        read_json_optional(self.paths.budget_file(budget_id))?
            .ok_or_else(|| EnvelopeError::budget_not_found(budget_id.to_string()))
    }

    fn commit(&self, data: &LedgerData, expected_revision: u64) -> EnvelopeResult<u64> {
        let _lock = self.lock_budget(&data.budget.id)?;

        let path = self.paths.budget_file(&data.budget.id);
        let stored: Option<StoredRevision> = read_json_optional(&path)?;
        check_revision(&data.budget.id, stored.map(|s| s.revision), expected_revision)?;

        let mut next = data.clone();
        next.revision = expected_revision + 1;
        write_json_atomic(&path, &next)?;

        debug!(budget = %data.budget.id, revision = next.revision, "committed budget");
        Ok(next.revision)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Budget, Month};
    use tempfile::TempDir;

    fn store() -> (JsonFileStore, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let paths = LedgerPaths::with_base_dir(temp_dir.path().to_path_buf());
        (JsonFileStore::new(paths).unwrap(), temp_dir)
    }

    fn ledger() -> LedgerData {
        LedgerData::new(Budget::new("Home", "USD", Month::new(2024, 1).unwrap()))
    }

    #[test]
    fn test_commit_and_load() {
        let (store, _temp) = store();
        let data = ledger();

        assert_eq!(store.commit(&data, 0).unwrap(), 1);
        let loaded = store.load(&data.budget.id).unwrap();
        assert_eq!(loaded.revision, 1);
        assert_eq!(loaded.budget, data.budget);
        assert_eq!(store.budget_ids().unwrap(), vec![data.budget.id]);
    }

    #[test]
    fn test_stale_revision_conflicts() {
        let (store, _temp) = store();
        let data = ledger();
        store.commit(&data, 0).unwrap();
        store.commit(&data, 1).unwrap();

        let err = store.commit(&data, 1).unwrap_err();
        assert!(matches!(err, EnvelopeError::Conflict(_)));
        assert_eq!(store.load(&data.budget.id).unwrap().revision, 2);
    }

    #[test]
    fn test_commits_from_separate_stores_are_serialized() {
        let (first, temp) = store();
        let data = ledger();
        first.commit(&data, 0).unwrap();

        let writers = 8;
        let barrier = std::sync::Barrier::new(writers);
        let results: Vec<EnvelopeResult<u64>> = std::thread::scope(|scope| {
            let handles: Vec<_> = (0..writers)
                .map(|_| {
                    scope.spawn(|| {
                        let paths = LedgerPaths::with_base_dir(temp.path().to_path_buf());
                        let store = JsonFileStore::new(paths).unwrap();
                        let loaded = store.load(&data.budget.id).unwrap();
                        barrier.wait();
                        store.commit(&loaded, loaded.revision)
                    })
                })
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        let committed = results.iter().filter(|r| r.is_ok()).count() as u64;
        assert!(committed >= 1);
        for err in results.iter().filter_map(|r| r.as_ref().err()) {
            assert!(matches!(err, EnvelopeError::Conflict(_)), "{:?}", err);
        }
        assert_eq!(first.load(&data.budget.id).unwrap().revision, 1 + committed);
    }

    #[test]
    fn test_load_missing_budget() {
        let (store, _temp) = store();
        assert!(store.load(&BudgetId::new()).unwrap_err().is_not_found());
    }

    #[test]
    fn test_ignores_stray_files() {
        let (store, temp) = store();
        std::fs::write(
            temp.path().join("data").join("budgets").join("notes.txt"),
            "hi",
        )
        .unwrap();
        assert!(store.budget_ids().unwrap().is_empty());
    }
}
