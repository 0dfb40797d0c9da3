//! Service layer
//!
//! Services apply business rules to a working copy of one budget's
//! [`LedgerData`](crate::storage::LedgerData). They never touch the store
//! directly; the engine loads the ledger, runs a service and commits the
//! result as one unit of work. Read-only computations are free functions
//! over `&LedgerData`.

pub mod account;
pub mod budget;
pub mod category;
pub mod credit;
pub mod envelope;
pub mod payee;
pub mod reconciliation;
pub mod transaction;
pub mod transfer;

pub use account::{AccountPatch, AccountService, AccountSummary};
pub use budget::NewBudget;
pub use category::{CategoryPatch, CategoryService, GroupPatch};
pub use credit::{CreditService, DebtBalance, DebtSyncOutcome};
pub use envelope::{AvailableToBudget, EnvelopeService, MonthView};
pub use reconciliation::{ReconcileOutcome, ReconciliationService};
pub use transaction::{NewTransaction, TransactionFilter, TransactionPatch, TransactionService};
pub use transfer::{TransferResult, TransferService};
