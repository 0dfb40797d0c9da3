//! Typed results of [`Command`](super::Command)

use serde::{Deserialize, Serialize};

use crate::models::{Account, Budget, Category, CategoryGroup, Payee, Transaction};
use crate::services::{
    AccountSummary, DebtBalance, DebtSyncOutcome, MonthView, ReconcileOutcome, TransferResult,
};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", content = "data", rename_all = "snake_case")]
pub enum CommandOutput {
    Budget(Budget),
    Budgets(Vec<Budget>),
    Account(Account),
    Accounts(Vec<Account>),
    AccountSummary(AccountSummary),
    AccountSummaries(Vec<AccountSummary>),
    Transaction(Transaction),
    Transactions(Vec<Transaction>),
    /// Transactions removed by a delete (two for a transfer)
    DeletedTransactions(Vec<Transaction>),
    Transfer(TransferResult),
    MonthView(MonthView),
    Group(CategoryGroup),
    DeletedGroup(CategoryGroup),
    Category(Category),
    DeletedCategory(Category),
    DebtSync(DebtSyncOutcome),
    DebtBalance(DebtBalance),
    DebtBalances(Vec<DebtBalance>),
    Reconciliation(ReconcileOutcome),
    Payees(Vec<Payee>),
}
