//! Storage layer
//!
//! The engine reads and writes budgets only through [`LedgerStore`]. A store
//! holds one [`LedgerData`] document per budget and commits it atomically,
//! refusing a commit whose expected revision no longer matches.

pub mod file_io;
pub mod json_store;
pub mod ledger;
pub mod memory;
pub mod records;

pub use json_store::JsonFileStore;
pub use ledger::LedgerData;
pub use memory::MemoryStore;
pub use records::MonthlyRecords;

use crate::error::{EnvelopeError, EnvelopeResult};
use crate::models::BudgetId;

/// Durable keyed storage for budgets
pub trait LedgerStore: Send + Sync {
    /// Ids of every stored budget
    fn budget_ids(&self) -> EnvelopeResult<Vec<BudgetId>>;

    /// Load the full ledger of one budget (`NotFound` if absent)
    fn load(&self, budget_id: &BudgetId) -> EnvelopeResult<LedgerData>;

    /// Atomically replace the stored ledger and return the new revision.
    ///
    /// `expected_revision` is the revision the caller loaded; 0 means the
    /// budget must not exist yet. Any mismatch is a `Conflict` and nothing is
    /// written.
    fn commit(&self, data: &LedgerData, expected_revision: u64) -> EnvelopeResult<u64>;
}

/// Compare the stored revision against the one a writer loaded
pub(crate) fn check_revision(
    budget_id: &BudgetId,
    stored: Option<u64>,
    expected: u64,
) -> EnvelopeResult<()> {
    let current = stored.unwrap_or(0);
    if current != expected {
        return Err(EnvelopeError::Conflict(format!(
            "budget {} is at revision {}, expected {}",
            budget_id, current, expected
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_revision() {
        let id = BudgetId::new();
        assert!(check_revision(&id, None, 0).is_ok());
        assert!(check_revision(&id, Some(3), 3).is_ok());
        assert!(matches!(
            check_revision(&id, Some(4), 3),
            Err(EnvelopeError::Conflict(_))
        ));
        assert!(matches!(
            check_revision(&id, Some(1), 0),
            Err(EnvelopeError::Conflict(_))
        ));
    }
}
