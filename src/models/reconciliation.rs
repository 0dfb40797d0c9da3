//! Reconciliation events
//!
//! One event is recorded per reconcile call. Events are never edited.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::ids::{AccountId, ReconciliationId, TransactionId};
use super::money::Money;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconciliationEvent {
    pub id: ReconciliationId,

    pub account_id: AccountId,

    pub statement_date: NaiveDate,

    pub statement_balance: Money,

    /// Ledger balance before any adjustment
    pub ledger_balance: Money,

    /// `statement_balance - ledger_balance`
    pub diff: Money,

    pub adjustment_transaction_id: Option<TransactionId>,

    /// Number of cleared transactions moved to reconciled
    pub reconciled_count: usize,

    #[serde(default)]
    pub notes: Option<String>,

    pub created_at: DateTime<Utc>,
}

impl ReconciliationEvent {
    pub fn new(
        account_id: AccountId,
        statement_date: NaiveDate,
        statement_balance: Money,
        ledger_balance: Money,
    ) -> Self {
        Self {
            id: ReconciliationId::new(),
            account_id,
            statement_date,
            statement_balance,
            ledger_balance,
            diff: statement_balance - ledger_balance,
            adjustment_transaction_id: None,
            reconciled_count: 0,
            notes: None,
            created_at: Utc::now(),
        }
    }

    pub fn is_balanced(&self) -> bool {
        self.diff.is_zero()
    }
}
