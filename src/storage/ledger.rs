//! The persisted state of one budget
//!
//! [`LedgerData`] is loaded whole, mutated as a private working copy inside a
//! unit of work, and committed whole. Accessors follow the repository naming
//! (`get_*` returns an `Option`, the plain name returns `NotFound`).

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt::Display;

use crate::audit::{AuditEntry, EntityType};
use crate::error::{EnvelopeError, EnvelopeResult};
use crate::models::{
    Account, AccountId, Budget, BudgetId, Category, CategoryGroup, CategoryGroupId, CategoryId,
    Money, Month, MonthlyCategoryRecord, Payee, PayeeId, ReconciliationEvent, Transaction,
    TransactionId,
};

use super::records::MonthlyRecords;

/// Months may lie at most this many years before or after the budget start
pub const MONTH_WINDOW_YEARS: i64 = 50;

/// Upper bound on the sum of every stored amount's magnitude. Any balance,
/// rollover chain or Available to Budget figure is a signed sum of a subset
/// of those amounts, so with this headroom none of them can overflow.
pub const MAGNITUDE_LIMIT: i128 = (i64::MAX / 4) as i128;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerData {
    /// Bumped by the store on every successful commit
    #[serde(default)]
    pub revision: u64,

    pub budget: Budget,

    #[serde(default)]
    pub accounts: Vec<Account>,

    #[serde(default)]
    pub transactions: Vec<Transaction>,

    #[serde(default)]
    pub groups: Vec<CategoryGroup>,

    #[serde(default)]
    pub categories: Vec<Category>,

    #[serde(default)]
    pub monthly_records: MonthlyRecords,

    #[serde(default)]
    pub payees: Vec<Payee>,

    #[serde(default)]
    pub reconciliations: Vec<ReconciliationEvent>,

    /// Audit entries produced by the current unit of work
    #[serde(skip)]
    pending_audit: Vec<AuditEntry>,
}

impl LedgerData {
    /// A fresh, never-committed ledger
    pub fn new(budget: Budget) -> Self {
        Self {
            revision: 0,
            budget,
            accounts: Vec::new(),
            transactions: Vec::new(),
            groups: Vec::new(),
            categories: Vec::new(),
            monthly_records: MonthlyRecords::new(),
            payees: Vec::new(),
            reconciliations: Vec::new(),
            pending_audit: Vec::new(),
        }
    }

    pub fn budget_id(&self) -> BudgetId {
        self.budget.id
    }

    // ---- limits ----

    /// Reject months too far from the budget start to be materialized
    pub fn check_month(&self, month: Month) -> EnvelopeResult<()> {
        let offset = self.budget.start_month.months_until(month);
        if offset.abs() > MONTH_WINDOW_YEARS * 12 {
            return Err(EnvelopeError::InvalidArgument(format!(
                "{} is more than {} years from the budget start ({})",
                month, MONTH_WINDOW_YEARS, self.budget.start_month
            )));
        }
        Ok(())
    }

    pub fn check_date(&self, date: NaiveDate) -> EnvelopeResult<()> {
        self.check_month(Month::containing(date))
    }

    /// Transaction validation plus the ledger's date and amount limits
    pub fn check_transaction(&self, txn: &Transaction) -> EnvelopeResult<()> {
        txn.validate()?;
        self.check_date(txn.date)?;
        if let Some(month) = txn.income_month {
            self.check_month(month)?;
        }
        Ok(())
    }

    /// Sum of the magnitudes of every stored transaction amount, split
    /// amount and assignment
    pub fn magnitude(&self) -> i128 {
        let transactions: i128 = self
            .transactions
            .iter()
            .map(|t| {
                i128::from(t.amount.cents().unsigned_abs())
                    + t.subtransactions
                        .iter()
                        .map(|s| i128::from(s.amount.cents().unsigned_abs()))
                        .sum::<i128>()
            })
            .sum();
        let assigned: i128 = self
            .monthly_records
            .iter()
            .map(|r| i128::from(r.assigned.cents().unsigned_abs()))
            .sum();
        transactions + assigned
    }

    /// Refuse to commit a ledger whose totals could overflow
    pub fn check_magnitude(&self) -> EnvelopeResult<()> {
        if self.magnitude() > MAGNITUDE_LIMIT {
            return Err(EnvelopeError::InvalidArgument(
                "ledger totals would exceed the supported amount range".into(),
            ));
        }
        Ok(())
    }

    // ---- audit ----

    pub fn log_create<T: Serialize>(
        &mut self,
        entity_type: EntityType,
        id: impl Display,
        name: Option<String>,
        entity: &T,
    ) {
        let entry = AuditEntry::create(self.budget.id, entity_type, id.to_string(), name, entity);
        self.pending_audit.push(entry);
    }

    pub fn log_update<T: Serialize>(
        &mut self,
        entity_type: EntityType,
        id: impl Display,
        name: Option<String>,
        before: &T,
        after: &T,
    ) {
        let entry = AuditEntry::update(
            self.budget.id,
            entity_type,
            id.to_string(),
            name,
            before,
            after,
        );
        self.pending_audit.push(entry);
    }

    pub fn log_delete<T: Serialize>(
        &mut self,
        entity_type: EntityType,
        id: impl Display,
        name: Option<String>,
        entity: &T,
    ) {
        let entry = AuditEntry::delete(self.budget.id, entity_type, id.to_string(), name, entity);
        self.pending_audit.push(entry);
    }

    pub fn take_audit_entries(&mut self) -> Vec<AuditEntry> {
        std::mem::take(&mut self.pending_audit)
    }

    // ---- accounts ----

    pub fn get_account(&self, id: &AccountId) -> Option<&Account> {
        self.accounts.iter().find(|a| a.id == *id)
    }

    pub fn account(&self, id: &AccountId) -> EnvelopeResult<&Account> {
        self.get_account(id)
            .ok_or_else(|| EnvelopeError::account_not_found(id.to_string()))
    }

    pub fn account_mut(&mut self, id: &AccountId) -> EnvelopeResult<&mut Account> {
        self.accounts
            .iter_mut()
            .find(|a| a.id == *id)
            .ok_or_else(|| EnvelopeError::account_not_found(id.to_string()))
    }

    /// Resolve an account by id (full or short) or case-insensitive name
    pub fn find_account(&self, identifier: &str) -> EnvelopeResult<&Account> {
        self.accounts
            .iter()
            .find(|a| a.id.matches(identifier))
            .or_else(|| {
                self.accounts
                    .iter()
                    .find(|a| a.name.eq_ignore_ascii_case(identifier.trim()))
            })
            .ok_or_else(|| EnvelopeError::account_not_found(identifier))
    }

    pub fn account_name_exists(&self, name: &str, exclude: Option<AccountId>) -> bool {
        self.accounts
            .iter()
            .any(|a| Some(a.id) != exclude && a.name.eq_ignore_ascii_case(name.trim()))
    }

    pub fn credit_accounts(&self) -> impl Iterator<Item = &Account> {
        self.accounts.iter().filter(|a| a.is_credit())
    }

    /// Sum of every transaction on the account, all states
    pub fn account_balance(&self, id: &AccountId) -> Money {
        self.transactions_for_account(id).map(|t| t.amount).sum()
    }

    // ---- transactions ----

    pub fn get_transaction(&self, id: &TransactionId) -> Option<&Transaction> {
        self.transactions.iter().find(|t| t.id == *id)
    }

    pub fn transaction(&self, id: &TransactionId) -> EnvelopeResult<&Transaction> {
        self.get_transaction(id)
            .ok_or_else(|| EnvelopeError::transaction_not_found(id.to_string()))
    }

    pub fn transaction_mut(&mut self, id: &TransactionId) -> EnvelopeResult<&mut Transaction> {
        self.transactions
            .iter_mut()
            .find(|t| t.id == *id)
            .ok_or_else(|| EnvelopeError::transaction_not_found(id.to_string()))
    }

    /// Resolve a transaction by full or short id
    pub fn find_transaction(&self, identifier: &str) -> EnvelopeResult<&Transaction> {
        self.transactions
            .iter()
            .find(|t| t.id.matches(identifier))
            .ok_or_else(|| EnvelopeError::transaction_not_found(identifier))
    }

    pub fn transactions_for_account<'a>(
        &'a self,
        id: &'a AccountId,
    ) -> impl Iterator<Item = &'a Transaction> + 'a {
        self.transactions.iter().filter(move |t| t.account_id == *id)
    }

    pub fn insert_transaction(&mut self, txn: Transaction) {
        self.transactions.push(txn);
    }

    pub fn remove_transaction(&mut self, id: &TransactionId) -> Option<Transaction> {
        let index = self.transactions.iter().position(|t| t.id == *id)?;
        Some(self.transactions.remove(index))
    }

    /// Whether any split on any transaction points at the category
    pub fn category_has_transactions(&self, id: &CategoryId) -> bool {
        self.transactions
            .iter()
            .any(|t| t.category_ids().any(|c| c == *id))
    }

    // ---- groups ----

    pub fn group(&self, id: &CategoryGroupId) -> EnvelopeResult<&CategoryGroup> {
        self.groups
            .iter()
            .find(|g| g.id == *id)
            .ok_or_else(|| EnvelopeError::group_not_found(id.to_string()))
    }

    pub fn group_mut(&mut self, id: &CategoryGroupId) -> EnvelopeResult<&mut CategoryGroup> {
        self.groups
            .iter_mut()
            .find(|g| g.id == *id)
            .ok_or_else(|| EnvelopeError::group_not_found(id.to_string()))
    }

    pub fn get_group_by_name(&self, name: &str) -> Option<&CategoryGroup> {
        self.groups
            .iter()
            .find(|g| g.name.eq_ignore_ascii_case(name.trim()))
    }

    pub fn find_group(&self, identifier: &str) -> EnvelopeResult<&CategoryGroup> {
        self.groups
            .iter()
            .find(|g| g.id.matches(identifier))
            .or_else(|| self.get_group_by_name(identifier))
            .ok_or_else(|| EnvelopeError::group_not_found(identifier))
    }

    pub fn next_group_sort_order(&self) -> i32 {
        self.groups.iter().map(|g| g.sort_order + 1).max().unwrap_or(0)
    }

    // ---- categories ----

    pub fn get_category(&self, id: &CategoryId) -> Option<&Category> {
        self.categories.iter().find(|c| c.id == *id)
    }

    pub fn category(&self, id: &CategoryId) -> EnvelopeResult<&Category> {
        self.get_category(id)
            .ok_or_else(|| EnvelopeError::category_not_found(id.to_string()))
    }

    pub fn category_mut(&mut self, id: &CategoryId) -> EnvelopeResult<&mut Category> {
        self.categories
            .iter_mut()
            .find(|c| c.id == *id)
            .ok_or_else(|| EnvelopeError::category_not_found(id.to_string()))
    }

    /// Resolve a category by id (full or short) or case-insensitive name
    pub fn find_category(&self, identifier: &str) -> EnvelopeResult<&Category> {
        self.categories
            .iter()
            .find(|c| c.id.matches(identifier))
            .or_else(|| {
                self.categories
                    .iter()
                    .find(|c| c.name.eq_ignore_ascii_case(identifier.trim()))
            })
            .ok_or_else(|| EnvelopeError::category_not_found(identifier))
    }

    pub fn categories_in_group<'a>(
        &'a self,
        group_id: &'a CategoryGroupId,
    ) -> impl Iterator<Item = &'a Category> + 'a {
        self.categories.iter().filter(move |c| c.group_id == *group_id)
    }

    pub fn next_category_sort_order(&self, group_id: &CategoryGroupId) -> i32 {
        self.categories_in_group(group_id)
            .map(|c| c.sort_order + 1)
            .max()
            .unwrap_or(0)
    }

    // ---- monthly records ----

    pub fn record(&self, category_id: &CategoryId, month: Month) -> Option<&MonthlyCategoryRecord> {
        self.monthly_records.get(category_id, month)
    }

    pub fn record_mut(
        &mut self,
        category_id: &CategoryId,
        month: Month,
    ) -> Option<&mut MonthlyCategoryRecord> {
        self.monthly_records.get_mut(category_id, month)
    }

    pub fn has_records(&self, category_id: &CategoryId) -> bool {
        self.monthly_records.for_category(category_id).next().is_some()
    }

    /// First and last materialized month of a category
    pub fn record_span(&self, category_id: &CategoryId) -> Option<(Month, Month)> {
        self.monthly_records.span(category_id)
    }

    /// Assigned amount, zero if no record exists
    pub fn assigned(&self, category_id: &CategoryId, month: Month) -> Money {
        self.record(category_id, month)
            .map(|r| r.assigned)
            .unwrap_or_default()
    }

    pub fn remove_records_for_category(&mut self, category_id: &CategoryId) {
        self.monthly_records.remove_category(category_id);
    }

    // ---- payees ----

    pub fn get_payee_by_name(&self, name: &str) -> Option<&Payee> {
        self.payees.iter().find(|p| p.is_named(name))
    }

    /// Find a payee by name or create it, returning its id and canonical name
    pub fn get_or_create_payee(&mut self, name: &str) -> EnvelopeResult<(PayeeId, String)> {
        if let Some(existing) = self.get_payee_by_name(name) {
            return Ok((existing.id, existing.name.clone()));
        }

        let payee = Payee::new(name.trim());
        payee.validate()?;
        let result = (payee.id, payee.name.clone());
        self.log_create(EntityType::Payee, payee.id, Some(payee.name.clone()), &payee);
        self.payees.push(payee);
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AccountType, Subtransaction};
    use chrono::NaiveDate;

    fn ledger() -> LedgerData {
        LedgerData::new(Budget::new("Test", "USD", Month::new(2024, 1).unwrap()))
    }

    #[test]
    fn test_find_account_by_name_and_id() {
        let mut data = ledger();
        let account = Account::new(data.budget_id(), "Checking", AccountType::Checking);
        let id = account.id;
        data.accounts.push(account);

        assert_eq!(data.find_account("checking").unwrap().id, id);
        assert_eq!(data.find_account(&id.short()).unwrap().id, id);
        assert_eq!(data.find_account(&id.to_string()).unwrap().id, id);
        assert!(data.find_account("Savings").unwrap_err().is_not_found());
        assert!(data.account_name_exists("CHECKING", None));
        assert!(!data.account_name_exists("Checking", Some(id)));
    }

    #[test]
    fn test_account_balance_and_category_usage() {
        let mut data = ledger();
        let account_id = AccountId::new();
        let category_id = CategoryId::new();
        let date = NaiveDate::from_ymd_opt(2024, 1, 10).unwrap();

        let mut purchase = Transaction::new(account_id, date, Money::from_cents(-2500));
        purchase.subtransactions = vec![Subtransaction::new(Some(category_id), purchase.amount)];
        data.insert_transaction(purchase);
        data.insert_transaction(Transaction::new(account_id, date, Money::from_cents(10000)));

        assert_eq!(data.account_balance(&account_id), Money::from_cents(7500));
        assert!(data.category_has_transactions(&category_id));
        assert!(!data.category_has_transactions(&CategoryId::new()));
    }

    #[test]
    fn test_record_span() {
        let mut data = ledger();
        let category_id = CategoryId::new();
        assert!(data.record_span(&category_id).is_none());

        for month in [3, 1, 2] {
            data.monthly_records.insert(MonthlyCategoryRecord::new(
                category_id,
                Month::new(2024, month).unwrap(),
            ));
        }
        assert_eq!(
            data.record_span(&category_id),
            Some((Month::new(2024, 1).unwrap(), Month::new(2024, 3).unwrap()))
        );
    }

    #[test]
    fn test_month_window() {
        let data = ledger();
        assert!(data.check_month(Month::new(2074, 1).unwrap()).is_ok());
        assert!(data.check_month(Month::new(1974, 1).unwrap()).is_ok());

        let err = data.check_month(Month::new(2074, 2).unwrap()).unwrap_err();
        assert!(err.is_invalid_argument());
        assert!(data
            .check_date(NaiveDate::from_ymd_opt(262142, 12, 31).unwrap())
            .unwrap_err()
            .is_invalid_argument());
    }

    #[test]
    fn test_magnitude_limit() {
        let mut data = ledger();
        let account_id = AccountId::new();
        let date = NaiveDate::from_ymd_opt(2024, 1, 10).unwrap();

        let mut txn = Transaction::new(account_id, date, Money::from_cents(-300));
        txn.subtransactions = vec![
            Subtransaction::new(None, Money::from_cents(-500)),
            Subtransaction::new(None, Money::from_cents(200)),
        ];
        data.insert_transaction(txn);
        assert_eq!(data.magnitude(), 1000);
        assert!(data.check_magnitude().is_ok());

        for _ in 0..(MAGNITUDE_LIMIT / i128::from(Money::MAX.cents()) + 1) {
            data.insert_transaction(Transaction::new(account_id, date, Money::MAX));
        }
        assert!(data.check_magnitude().unwrap_err().is_invalid_argument());
    }

    #[test]
    fn test_get_or_create_payee_logs_once() {
        let mut data = ledger();
        let (first, _) = data.get_or_create_payee("Corner Grocery").unwrap();
        let (second, name) = data.get_or_create_payee("corner grocery").unwrap();

        assert_eq!(first, second);
        assert_eq!(name, "Corner Grocery");
        assert_eq!(data.payees.len(), 1);
        assert_eq!(data.take_audit_entries().len(), 1);
        assert!(data.take_audit_entries().is_empty());
    }

    #[test]
    fn test_pending_audit_not_serialized() {
        let mut data = ledger();
        data.get_or_create_payee("Landlord").unwrap();
        let json = serde_json::to_string(&data).unwrap();
        let mut back: LedgerData = serde_json::from_str(&json).unwrap();
        assert_eq!(back.payees.len(), 1);
        assert!(back.take_audit_entries().is_empty());
    }
}
