//! Core data models for the ledger
//!
//! This module contains the data structures of the budgeting domain:
//! budgets, accounts, transactions, categories and their monthly records.

pub mod account;
pub mod budget;
pub mod category;
pub mod ids;
pub mod money;
pub mod month;
pub mod monthly;
pub mod payee;
pub mod reconciliation;
pub mod transaction;

pub use account::{Account, AccountType};
pub use budget::Budget;
pub use category::{Category, CategoryGroup, DEFAULT_GROUPS};
pub use ids::{
    AccountId, BudgetId, CategoryGroupId, CategoryId, PayeeId, ReconciliationId, TransactionId,
};
pub use money::Money;
pub use month::Month;
pub use monthly::MonthlyCategoryRecord;
pub use payee::Payee;
pub use reconciliation::ReconciliationEvent;
pub use transaction::{Subtransaction, Transaction, TransactionState};
