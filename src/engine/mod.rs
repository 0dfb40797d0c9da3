//! The ledger engine
//!
//! [`Engine`] is the single entry point for every operation. Each call is one
//! unit of work against one budget:
//!
//! 1. take the budget's lock (shared for reads, exclusive for writes),
//! 2. load the ledger from the store,
//! 3. run the service code on a private working copy,
//! 4. commit the copy with the revision it was loaded at,
//! 5. append the collected audit entries.
//!
//! An error in steps 2-4 drops the working copy, so a failed call writes
//! nothing.

mod locks;

pub use locks::{BudgetLock, LockRegistry, ReadGuard, WriteGuard};

use chrono::NaiveDate;
use tracing::{debug, info, warn};

use crate::audit::{AuditEntry, AuditLogger};
use crate::config::Settings;
use crate::error::{EnvelopeError, EnvelopeResult};
use crate::models::{
    Account, AccountId, AccountType, Budget, BudgetId, Category, CategoryGroup, CategoryGroupId,
    CategoryId, Money, Month, Payee, Transaction, TransactionId,
};
use crate::services::account::{self, AccountPatch, AccountService, AccountSummary};
use crate::services::budget::{new_budget_ledger, NewBudget};
use crate::services::category::{CategoryPatch, CategoryService, GroupPatch};
use crate::services::credit::{self, CreditService, DebtBalance, DebtSyncOutcome};
use crate::services::envelope::{self, EnvelopeService, MonthView};
use crate::services::payee;
use crate::services::reconciliation::{ReconcileOutcome, ReconciliationService};
use crate::services::transaction::{
    self, NewTransaction, TransactionFilter, TransactionPatch, TransactionService,
};
use crate::services::transfer::{TransferResult, TransferService};
use crate::storage::{LedgerData, LedgerStore};

pub struct Engine<S: LedgerStore> {
    store: S,
    settings: Settings,
    audit: Option<AuditLogger>,
    locks: LockRegistry,
}

impl<S: LedgerStore> Engine<S> {
    pub fn new(store: S, settings: Settings) -> Self {
        Self {
            store,
            settings,
            audit: None,
            locks: LockRegistry::new(),
        }
    }

    /// Record committed changes with `logger` (when audit is enabled)
    pub fn with_audit(mut self, logger: AuditLogger) -> Self {
        self.audit = Some(logger);
        self
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    // ---- unit of work ----

    fn read<T>(
        &self,
        budget_id: &BudgetId,
        f: impl FnOnce(&LedgerData) -> EnvelopeResult<T>,
    ) -> EnvelopeResult<T> {
        let lock = self.locks.lock_for(budget_id)?;
        let _guard = lock.read(self.settings.lock_timeout())?;
        let ledger = self.store.load(budget_id)?;
        f(&ledger)
    }

    fn write<T>(
        &self,
        budget_id: &BudgetId,
        operation: &'static str,
        f: impl FnOnce(&mut LedgerData) -> EnvelopeResult<T>,
    ) -> EnvelopeResult<T> {
        let lock = self.locks.lock_for(budget_id)?;
        let _guard = lock.write(self.settings.lock_timeout())?;

        let mut working = self.store.load(budget_id)?;
        let loaded_revision = working.revision;
        debug!(budget = %budget_id, operation, revision = loaded_revision, "begin write");

        let result = f(&mut working)?;
        working.check_magnitude()?;
        let revision = self.store.commit(&working, loaded_revision)?;
        debug!(budget = %budget_id, operation, revision, "committed");

        self.flush_audit(working.take_audit_entries());
        Ok(result)
    }

    /// The commit already happened; a failed audit append must not turn a
    /// successful call into an error
    fn flush_audit(&self, entries: Vec<AuditEntry>) {
        if !self.settings.audit_enabled {
            return;
        }
        if let Some(logger) = &self.audit {
            if let Err(e) = logger.log_batch(&entries) {
                warn!(error = %e, count = entries.len(), "failed to write audit entries");
            }
        }
    }

    // ---- budgets ----

    pub fn create_budget(&self, input: NewBudget) -> EnvelopeResult<Budget> {
        let mut ledger = new_budget_ledger(&self.settings, input)?;
        let budget_id = ledger.budget_id();

        let lock = self.locks.lock_for(&budget_id)?;
        let _guard = lock.write(self.settings.lock_timeout())?;
        self.store.commit(&ledger, 0)?;
        info!(budget = %budget_id, name = %ledger.budget.name, "created budget");

        self.flush_audit(ledger.take_audit_entries());
        Ok(ledger.budget)
    }

    pub fn list_budgets(&self) -> EnvelopeResult<Vec<Budget>> {
        let mut budgets = self
            .store
            .budget_ids()?
            .iter()
            .map(|id| self.get_budget(id))
            .collect::<EnvelopeResult<Vec<_>>>()?;
        budgets.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));
        Ok(budgets)
    }

    pub fn get_budget(&self, budget_id: &BudgetId) -> EnvelopeResult<Budget> {
        self.read(budget_id, |ledger| Ok(ledger.budget.clone()))
    }

    /// Resolve a budget by id (full or short) or case-insensitive name
    pub fn find_budget(&self, identifier: &str) -> EnvelopeResult<Budget> {
        let budgets = self.list_budgets()?;
        budgets
            .iter()
            .find(|b| b.id.matches(identifier))
            .or_else(|| {
                budgets
                    .iter()
                    .find(|b| b.name.eq_ignore_ascii_case(identifier.trim()))
            })
            .cloned()
            .ok_or_else(|| EnvelopeError::budget_not_found(identifier))
    }

    // ---- accounts ----

    pub fn create_account(
        &self,
        budget_id: &BudgetId,
        name: &str,
        account_type: AccountType,
        on_budget: bool,
    ) -> EnvelopeResult<Account> {
        self.write(budget_id, "create_account", |ledger| {
            AccountService::new(ledger, &self.settings).create_account(name, account_type, on_budget)
        })
    }

    pub fn update_account(
        &self,
        budget_id: &BudgetId,
        account_id: &AccountId,
        patch: AccountPatch,
    ) -> EnvelopeResult<Account> {
        self.write(budget_id, "update_account", |ledger| {
            AccountService::new(ledger, &self.settings).update_account(account_id, patch)
        })
    }

    pub fn list_accounts(&self, budget_id: &BudgetId) -> EnvelopeResult<Vec<Account>> {
        self.read(budget_id, |ledger| Ok(ledger.accounts.clone()))
    }

    pub fn list_accounts_with_balances(&self, budget_id: &BudgetId) -> EnvelopeResult<Vec<AccountSummary>> {
        self.read(budget_id, |ledger| Ok(account::list_with_balances(ledger)))
    }

    pub fn account_balance(
        &self,
        budget_id: &BudgetId,
        account_id: &AccountId,
    ) -> EnvelopeResult<AccountSummary> {
        self.read(budget_id, |ledger| {
            let account = ledger.account(account_id)?;
            Ok(account::account_summary(ledger, account))
        })
    }

    pub fn find_account(&self, budget_id: &BudgetId, identifier: &str) -> EnvelopeResult<Account> {
        self.read(budget_id, |ledger| ledger.find_account(identifier).cloned())
    }

    // ---- transactions ----

    pub fn create_transaction(
        &self,
        budget_id: &BudgetId,
        input: NewTransaction,
    ) -> EnvelopeResult<Transaction> {
        self.write(budget_id, "create_transaction", |ledger| {
            TransactionService::new(ledger).create_transaction(input)
        })
    }

    pub fn update_transaction(
        &self,
        budget_id: &BudgetId,
        transaction_id: &TransactionId,
        patch: TransactionPatch,
    ) -> EnvelopeResult<Transaction> {
        self.write(budget_id, "update_transaction", |ledger| {
            TransactionService::new(ledger).update_transaction(transaction_id, patch)
        })
    }

    /// Returns every removed transaction (both legs for a transfer)
    pub fn delete_transaction(
        &self,
        budget_id: &BudgetId,
        transaction_id: &TransactionId,
    ) -> EnvelopeResult<Vec<Transaction>> {
        self.write(budget_id, "delete_transaction", |ledger| {
            TransactionService::new(ledger).delete_transaction(transaction_id)
        })
    }

    pub fn list_transactions(
        &self,
        budget_id: &BudgetId,
        filter: &TransactionFilter,
    ) -> EnvelopeResult<Vec<Transaction>> {
        self.read(budget_id, |ledger| {
            transaction::list_transactions(ledger, &self.settings, filter)
        })
    }

    pub fn find_transaction(&self, budget_id: &BudgetId, identifier: &str) -> EnvelopeResult<Transaction> {
        self.read(budget_id, |ledger| ledger.find_transaction(identifier).cloned())
    }

    pub fn create_transfer(
        &self,
        budget_id: &BudgetId,
        from_account_id: AccountId,
        to_account_id: AccountId,
        date: NaiveDate,
        amount: Money,
        memo: Option<String>,
    ) -> EnvelopeResult<TransferResult> {
        self.write(budget_id, "create_transfer", |ledger| {
            TransferService::new(ledger).create_transfer(from_account_id, to_account_id, date, amount, memo)
        })
    }

    // ---- envelopes ----

    /// Build the month view, storing zero-valued records for any category
    /// that has none for `month` yet
    pub fn month_view(&self, budget_id: &BudgetId, month: Month) -> EnvelopeResult<MonthView> {
        let ready = self.read(budget_id, |ledger| {
            ledger.check_month(month)?;
            Ok(envelope::is_materialized(ledger, month).then(|| envelope::month_view(ledger, month)))
        })?;
        if let Some(view) = ready {
            return Ok(view);
        }

        self.write(budget_id, "materialize_month", |ledger| {
            EnvelopeService::new(ledger).materialize_month(month)?;
            Ok(envelope::month_view(ledger, month))
        })
    }

    /// Add `delta` to a category's assignment and return the refreshed month
    pub fn assign(
        &self,
        budget_id: &BudgetId,
        category_id: &CategoryId,
        month: Month,
        delta: Money,
    ) -> EnvelopeResult<MonthView> {
        self.write(budget_id, "assign", |ledger| {
            let mut envelopes = EnvelopeService::new(ledger);
            envelopes.assign(category_id, month, delta)?;
            envelopes.materialize_month(month)?;
            Ok(envelope::month_view(ledger, month))
        })
    }

    pub fn move_between_categories(
        &self,
        budget_id: &BudgetId,
        from: &CategoryId,
        to: &CategoryId,
        month: Month,
        amount: Money,
    ) -> EnvelopeResult<MonthView> {
        self.write(budget_id, "move_between_categories", |ledger| {
            let mut envelopes = EnvelopeService::new(ledger);
            envelopes.move_between_categories(from, to, month, amount)?;
            envelopes.materialize_month(month)?;
            Ok(envelope::month_view(ledger, month))
        })
    }

    /// Returns the view of the destination month
    pub fn move_between_months(
        &self,
        budget_id: &BudgetId,
        category_id: &CategoryId,
        from: Month,
        to: Month,
        amount: Money,
    ) -> EnvelopeResult<MonthView> {
        self.write(budget_id, "move_between_months", |ledger| {
            let mut envelopes = EnvelopeService::new(ledger);
            envelopes.move_between_months(category_id, from, to, amount)?;
            envelopes.materialize_month(to)?;
            Ok(envelope::month_view(ledger, to))
        })
    }

    // ---- categories ----

    pub fn create_group(&self, budget_id: &BudgetId, name: &str) -> EnvelopeResult<CategoryGroup> {
        self.write(budget_id, "create_group", |ledger| {
            CategoryService::new(ledger, &self.settings).create_group(name)
        })
    }

    pub fn update_group(
        &self,
        budget_id: &BudgetId,
        group_id: &CategoryGroupId,
        patch: GroupPatch,
    ) -> EnvelopeResult<CategoryGroup> {
        self.write(budget_id, "update_group", |ledger| {
            CategoryService::new(ledger, &self.settings).update_group(group_id, patch)
        })
    }

    pub fn delete_group(&self, budget_id: &BudgetId, group_id: &CategoryGroupId) -> EnvelopeResult<CategoryGroup> {
        self.write(budget_id, "delete_group", |ledger| {
            CategoryService::new(ledger, &self.settings).delete_group(group_id)
        })
    }

    pub fn create_category(
        &self,
        budget_id: &BudgetId,
        group_id: &CategoryGroupId,
        name: &str,
    ) -> EnvelopeResult<Category> {
        self.write(budget_id, "create_category", |ledger| {
            CategoryService::new(ledger, &self.settings).create_category(name, group_id)
        })
    }

    pub fn update_category(
        &self,
        budget_id: &BudgetId,
        category_id: &CategoryId,
        patch: CategoryPatch,
    ) -> EnvelopeResult<Category> {
        self.write(budget_id, "update_category", |ledger| {
            CategoryService::new(ledger, &self.settings).update_category(category_id, patch)
        })
    }

    pub fn delete_category(&self, budget_id: &BudgetId, category_id: &CategoryId) -> EnvelopeResult<Category> {
        self.write(budget_id, "delete_category", |ledger| {
            CategoryService::new(ledger, &self.settings).delete_category(category_id)
        })
    }

    pub fn find_category(&self, budget_id: &BudgetId, identifier: &str) -> EnvelopeResult<Category> {
        self.read(budget_id, |ledger| ledger.find_category(identifier).cloned())
    }

    pub fn find_group(&self, budget_id: &BudgetId, identifier: &str) -> EnvelopeResult<CategoryGroup> {
        self.read(budget_id, |ledger| ledger.find_group(identifier).cloned())
    }

    // ---- credit ----

    pub fn ensure_debt_categories(&self, budget_id: &BudgetId) -> EnvelopeResult<DebtSyncOutcome> {
        self.write(budget_id, "ensure_debt_categories", |ledger| {
            CreditService::new(ledger, &self.settings).ensure_debt_categories()
        })
    }

    pub fn debt_balance(
        &self,
        budget_id: &BudgetId,
        account_id: &AccountId,
        month: Month,
    ) -> EnvelopeResult<DebtBalance> {
        self.read(budget_id, |ledger| {
            ledger.check_month(month)?;
            credit::debt_balance(ledger, &self.settings, account_id, month)
        })
    }

    pub fn debt_overview(&self, budget_id: &BudgetId, month: Month) -> EnvelopeResult<Vec<DebtBalance>> {
        self.read(budget_id, |ledger| {
            ledger.check_month(month)?;
            credit::debt_overview(ledger, &self.settings, month)
        })
    }

    // ---- reconciliation ----

    pub fn reconcile(
        &self,
        budget_id: &BudgetId,
        account_id: &AccountId,
        statement_date: NaiveDate,
        statement_balance: Money,
        notes: Option<String>,
    ) -> EnvelopeResult<ReconcileOutcome> {
        self.write(budget_id, "reconcile", |ledger| {
            ReconciliationService::new(ledger, &self.settings).reconcile(
                account_id,
                statement_date,
                statement_balance,
                notes,
            )
        })
    }

    // ---- payees ----

    pub fn list_payees(&self, budget_id: &BudgetId, query: Option<&str>) -> EnvelopeResult<Vec<Payee>> {
        self.read(budget_id, |ledger| Ok(payee::list_payees(ledger, &self.settings, query)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LedgerPaths;
    use crate::storage::{JsonFileStore, MemoryStore};
    use tempfile::TempDir;

    fn engine() -> (Engine<MemoryStore>, BudgetId) {
        let engine = Engine::new(MemoryStore::new(), Settings::default());
        let budget = engine
            .create_budget(NewBudget {
                name: "Home".into(),
                currency: None,
                start_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
                with_defaults: true,
            })
            .unwrap();
        (engine, budget.id)
    }

    fn march() -> Month {
        Month::new(2024, 3).unwrap()
    }

    #[test]
    fn test_month_view_materializes_once() {
        let (engine, budget) = engine();
        let before = engine.store().load(&budget).unwrap().revision;

        let view = engine.month_view(&budget, march()).unwrap();
        assert_eq!(view.records.len(), view.categories.len());
        let after_first = engine.store().load(&budget).unwrap().revision;
        assert_eq!(after_first, before + 1);

        engine.month_view(&budget, march()).unwrap();
        assert_eq!(engine.store().load(&budget).unwrap().revision, after_first);
    }

    #[test]
    fn test_failed_write_leaves_ledger_untouched() {
        let (engine, budget) = engine();
        let before = engine.store().load(&budget).unwrap();

        let err = engine
            .assign(&budget, &CategoryId::new(), march(), Money::from_cents(100))
            .unwrap_err();
        assert!(err.is_not_found());

        let after = engine.store().load(&budget).unwrap();
        assert_eq!(after.revision, before.revision);
        assert!(after.monthly_records.is_empty());
    }

    #[test]
    fn test_month_view_outside_window_is_rejected() {
        let (engine, budget) = engine();
        let before = engine.store().load(&budget).unwrap().revision;

        let err = engine
            .month_view(&budget, Month::new(2124, 1).unwrap())
            .unwrap_err();
        assert!(err.is_invalid_argument());
        assert_eq!(engine.store().load(&budget).unwrap().revision, before);
    }

    #[test]
    fn test_large_assignments_roll_over_without_overflow() {
        let (engine, budget) = engine();
        let rent = engine.find_category(&budget, "Rent").unwrap();
        let april = Month::new(2024, 4).unwrap();

        engine.assign(&budget, &rent.id, march(), Money::MAX).unwrap();
        let view = engine.assign(&budget, &rent.id, april, Money::MAX).unwrap();
        assert_eq!(
            view.record_for(&rent.id).unwrap().available.cents(),
            2 * Money::MAX.cents()
        );

        let before = engine.store().load(&budget).unwrap().revision;
        let err = engine
            .assign(&budget, &rent.id, april, Money::from_cents(i64::MAX))
            .unwrap_err();
        assert!(err.is_invalid_argument());
        assert_eq!(engine.store().load(&budget).unwrap().revision, before);
    }

    #[test]
    fn test_assign_returns_refreshed_view() {
        let (engine, budget) = engine();
        let groceries = engine.find_category(&budget, "Groceries").unwrap();

        let view = engine
            .assign(&budget, &groceries.id, march(), Money::from_cents(50000))
            .unwrap();
        let record = view.record_for(&groceries.id).unwrap();
        assert_eq!(record.assigned.cents(), 50000);
        assert_eq!(record.available.cents(), 50000);
        assert_eq!(view.available_to_budget.available.cents(), -50000);
    }

    #[test]
    fn test_audit_written_after_commit() {
        let temp = TempDir::new().unwrap();
        let paths = LedgerPaths::with_base_dir(temp.path().to_path_buf());
        let engine = Engine::new(JsonFileStore::new(paths.clone()).unwrap(), Settings::default())
            .with_audit(AuditLogger::new(paths.audit_log()));

        let budget = engine
            .create_budget(NewBudget {
                name: "Home".into(),
                currency: Some("usd".into()),
                start_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
                with_defaults: false,
            })
            .unwrap();
        engine
            .create_account(&budget.id, "Checking", AccountType::Checking, true)
            .unwrap();
        assert!(engine
            .create_account(&budget.id, "checking", AccountType::Savings, true)
            .is_err());

        let entries = AuditLogger::new(paths.audit_log()).read_all().unwrap();
        assert_eq!(entries.len(), 2);
    }

    #[test]
    fn test_find_budget_by_name() {
        let (engine, budget) = engine();
        assert_eq!(engine.find_budget("home").unwrap().id, budget);
        assert_eq!(engine.find_budget(&budget.short()).unwrap().id, budget);
        assert!(engine.find_budget("Work").unwrap_err().is_not_found());
    }
}
