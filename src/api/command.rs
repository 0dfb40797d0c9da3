//! One variant per engine operation
//!
//! Months travel as plain ISO dates and must name the first of a month;
//! amounts travel as integer minor units.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{EnvelopeError, EnvelopeResult};
use crate::models::{
    AccountId, AccountType, BudgetId, CategoryGroupId, CategoryId, Money, TransactionId,
};
use crate::services::{
    AccountPatch, CategoryPatch, GroupPatch, NewBudget, NewTransaction, TransactionFilter,
    TransactionPatch,
};

fn default_on_budget() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum Command {
    CreateBudget {
        budget: NewBudget,
    },
    ListBudgets,
    GetBudget {
        budget_id: BudgetId,
    },

    CreateAccount {
        budget_id: BudgetId,
        name: String,
        account_type: AccountType,
        #[serde(default = "default_on_budget")]
        on_budget: bool,
    },
    UpdateAccount {
        budget_id: BudgetId,
        account_id: AccountId,
        patch: AccountPatch,
    },
    ListAccounts {
        budget_id: BudgetId,
    },
    ListAccountsWithBalances {
        budget_id: BudgetId,
    },
    AccountBalance {
        budget_id: BudgetId,
        account_id: AccountId,
    },

    CreateTransaction {
        budget_id: BudgetId,
        transaction: NewTransaction,
    },
    UpdateTransaction {
        budget_id: BudgetId,
        transaction_id: TransactionId,
        patch: TransactionPatch,
    },
    DeleteTransaction {
        budget_id: BudgetId,
        transaction_id: TransactionId,
    },
    ListTransactions {
        budget_id: BudgetId,
        #[serde(default)]
        filter: TransactionFilter,
    },
    CreateTransfer {
        budget_id: BudgetId,
        from_account_id: AccountId,
        to_account_id: AccountId,
        date: NaiveDate,
        amount: Money,
        #[serde(default)]
        memo: Option<String>,
    },

    MonthView {
        budget_id: BudgetId,
        month: NaiveDate,
    },
    Assign {
        budget_id: BudgetId,
        category_id: CategoryId,
        month: NaiveDate,
        amount: Money,
    },
    MoveBetweenCategories {
        budget_id: BudgetId,
        from_category_id: CategoryId,
        to_category_id: CategoryId,
        month: NaiveDate,
        amount: Money,
    },
    MoveBetweenMonths {
        budget_id: BudgetId,
        category_id: CategoryId,
        from_month: NaiveDate,
        to_month: NaiveDate,
        amount: Money,
    },

    CreateGroup {
        budget_id: BudgetId,
        name: String,
    },
    UpdateGroup {
        budget_id: BudgetId,
        group_id: CategoryGroupId,
        patch: GroupPatch,
    },
    DeleteGroup {
        budget_id: BudgetId,
        group_id: CategoryGroupId,
    },
    CreateCategory {
        budget_id: BudgetId,
        group_id: CategoryGroupId,
        name: String,
    },
    UpdateCategory {
        budget_id: BudgetId,
        category_id: CategoryId,
        patch: CategoryPatch,
    },
    DeleteCategory {
        budget_id: BudgetId,
        category_id: CategoryId,
    },

    EnsureDebtCategories {
        budget_id: BudgetId,
    },
    DebtBalance {
        budget_id: BudgetId,
        account_id: AccountId,
        month: NaiveDate,
    },
    DebtOverview {
        budget_id: BudgetId,
        month: NaiveDate,
    },

    Reconcile {
        budget_id: BudgetId,
        account_id: AccountId,
        statement_date: NaiveDate,
        /// Integer minor units, e.g. "10000" for 100.00
        statement_balance: String,
        #[serde(default)]
        notes: Option<String>,
    },

    ListPayees {
        budget_id: BudgetId,
        #[serde(default)]
        query: Option<String>,
    },
}

impl Command {
    /// Parse a JSON command; malformed input is an `InvalidArgument`
    pub fn from_json(json: &str) -> EnvelopeResult<Self> {
        serde_json::from_str(json)
            .map_err(|e| EnvelopeError::InvalidArgument(format!("Malformed command: {}", e)))
    }

    /// Whether the command can change stored state
    pub fn is_write(&self) -> bool {
        !matches!(
            self,
            Self::ListBudgets
                | Self::GetBudget { .. }
                | Self::ListAccounts { .. }
                | Self::ListAccountsWithBalances { .. }
                | Self::AccountBalance { .. }
                | Self::ListTransactions { .. }
                | Self::DebtBalance { .. }
                | Self::DebtOverview { .. }
                | Self::ListPayees { .. }
        )
    }
}
