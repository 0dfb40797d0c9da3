//! In-process ledger store for tests and embedding

use std::collections::HashMap;
use std::sync::RwLock;

use super::{check_revision, LedgerData, LedgerStore};
use crate::error::{EnvelopeError, EnvelopeResult};
use crate::models::BudgetId;

#[derive(Default)]
pub struct MemoryStore {
    budgets: RwLock<HashMap<BudgetId, LedgerData>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn poisoned() -> EnvelopeError {
    EnvelopeError::StoreUnavailable("memory store lock poisoned".into())
}

impl LedgerStore for MemoryStore {
    fn budget_ids(&self) -> EnvelopeResult<Vec<BudgetId>> {
        let budgets = self.budgets.read().map_err(|_| poisoned())?;
        let mut ids: Vec<BudgetId> = budgets.keys().copied().collect();
        ids.sort();
        Ok(ids)
    }

    fn load(&self, budget_id: &BudgetId) -> EnvelopeResult<LedgerData> {
        let budgets = self.budgets.read().map_err(|_| poisoned())?;
        budgets
            .get(budget_id)
            .cloned()
            .ok_or_else(|| EnvelopeError::budget_not_found(budget_id.to_string()))
    }

    fn commit(&self, data: &LedgerData, expected_revision: u64) -> EnvelopeResult<u64> {
        let mut budgets = self.budgets.write().map_err(|_| poisoned())?;
        let stored = budgets.get(&data.budget.id).map(|d| d.revision);
        check_revision(&data.budget.id, stored, expected_revision)?;

        let mut next = data.clone();
        next.revision = expected_revision + 1;
        next.take_audit_entries();
        let revision = next.revision;
        budgets.insert(data.budget.id, next);
        Ok(revision)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Budget, Month};

    #[test]
    fn test_commit_load_and_conflict() {
        let store = MemoryStore::new();
        let data = LedgerData::new(Budget::new("Home", "USD", Month::new(2024, 1).unwrap()));

        assert_eq!(store.commit(&data, 0).unwrap(), 1);
        assert_eq!(store.load(&data.budget.id).unwrap().revision, 1);
        assert!(matches!(
            store.commit(&data, 0),
            Err(EnvelopeError::Conflict(_))
        ));
        assert_eq!(store.budget_ids().unwrap(), vec![data.budget.id]);
    }
}
