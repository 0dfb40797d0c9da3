//! Credit debt synchronizer
//!
//! Every credit account gets one payment category, named after the account,
//! inside a single reserved group. The step is an idempotent upsert that runs
//! on every write that can change the set of credit accounts.
//!
//! Purchases on a card do not move money into its payment category; that
//! category is funded by explicit assignment only.

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::audit::EntityType;
use crate::config::Settings;
use crate::error::{EnvelopeError, EnvelopeResult};
use crate::models::{AccountId, Category, CategoryGroup, CategoryGroupId, CategoryId, Money, Month};
use crate::storage::LedgerData;

/// What `ensure_debt_categories` had to create
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DebtSyncOutcome {
    pub group_id: Option<CategoryGroupId>,
    pub group_created: bool,
    pub created_categories: Vec<CategoryId>,
}

/// Derived debt figures for one credit account in one month
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DebtBalance {
    pub account_id: AccountId,
    pub account_name: String,
    pub month: Month,
    pub payment_category_id: Option<CategoryId>,
    /// Sum of every transaction on the card
    pub account_balance: Money,
    /// Assigned to the payment category this month
    pub assigned: Money,
    /// Inflows to the card posted this month
    pub payments: Money,
    /// `account_balance + assigned - payments`
    pub debt_balance: Money,
}

/// The reserved group, if it exists
pub fn debt_group<'l>(ledger: &'l LedgerData, settings: &Settings) -> Option<&'l CategoryGroup> {
    ledger.get_group_by_name(&settings.debt_group_name)
}

/// The payment category for a credit account named `account_name`
pub fn payment_category<'l>(
    ledger: &'l LedgerData,
    settings: &Settings,
    account_name: &str,
) -> Option<&'l Category> {
    let group = debt_group(ledger, settings)?;
    ledger
        .categories_in_group(&group.id)
        .find(|c| c.is_credit_payment && c.name.eq_ignore_ascii_case(account_name.trim()))
}

/// `currentAccountBalance + assigned(paymentCategory, month) - paymentsPosted(account, month)`
pub fn debt_balance(
    ledger: &LedgerData,
    settings: &Settings,
    account_id: &AccountId,
    month: Month,
) -> EnvelopeResult<DebtBalance> {
    let account = ledger.account(account_id)?;
    if !account.is_credit() {
        return Err(EnvelopeError::InvalidArgument(format!(
            "{} is not a credit account",
            account.name
        )));
    }

    let category = payment_category(ledger, settings, &account.name);
    let assigned = category
        .map(|c| ledger.assigned(&c.id, month))
        .unwrap_or_default();
    let payments: Money = ledger
        .transactions_for_account(account_id)
        .filter(|t| t.amount.is_positive() && month.contains(t.date))
        .map(|t| t.amount)
        .sum();
    let account_balance = ledger.account_balance(account_id);

    Ok(DebtBalance {
        account_id: *account_id,
        account_name: account.name.clone(),
        month,
        payment_category_id: category.map(|c| c.id),
        account_balance,
        assigned,
        payments,
        debt_balance: account_balance + assigned - payments,
    })
}

/// Debt figures for every credit account
pub fn debt_overview(
    ledger: &LedgerData,
    settings: &Settings,
    month: Month,
) -> EnvelopeResult<Vec<DebtBalance>> {
    ledger
        .credit_accounts()
        .map(|a| debt_balance(ledger, settings, &a.id, month))
        .collect()
}

pub struct CreditService<'a> {
    ledger: &'a mut LedgerData,
    settings: &'a Settings,
}

impl<'a> CreditService<'a> {
    pub fn new(ledger: &'a mut LedgerData, settings: &'a Settings) -> Self {
        Self { ledger, settings }
    }

    /// Make sure every credit account has its payment category.
    ///
    /// Existing categories count even when hidden, so a category the user hid
    /// is never recreated. The reserved group is created the first time a
    /// credit account needs it.
    pub fn ensure_debt_categories(&mut self) -> EnvelopeResult<DebtSyncOutcome> {
        let mut outcome = DebtSyncOutcome {
            group_id: debt_group(self.ledger, self.settings).map(|g| g.id),
            ..DebtSyncOutcome::default()
        };

        let ledger: &LedgerData = self.ledger;
        let missing: Vec<String> = ledger
            .credit_accounts()
            .filter(|a| payment_category(ledger, self.settings, &a.name).is_none())
            .map(|a| a.name.clone())
            .collect();
        if missing.is_empty() {
            return Ok(outcome);
        }

        let group_id = match outcome.group_id {
            Some(id) => id,
            None => {
                let group = CategoryGroup::with_sort_order(self.settings.debt_group_name.clone(), -1);
                group.validate()?;
                let id = group.id;
                self.ledger
                    .log_create(EntityType::CategoryGroup, id, Some(group.name.clone()), &group);
                self.ledger.groups.push(group);
                outcome.group_created = true;
                outcome.group_id = Some(id);
                id
            }
        };

        for name in missing {
            let sort_order = self.ledger.next_category_sort_order(&group_id);
            let category = Category::credit_payment(name, group_id, sort_order);
            category.validate()?;
            info!(category = %category.name, "created credit card payment category");
            self.ledger.log_create(
                EntityType::Category,
                category.id,
                Some(category.name.clone()),
                &category,
            );
            outcome.created_categories.push(category.id);
            self.ledger.categories.push(category);
        }

        Ok(outcome)
    }

    /// Follow a credit account rename with its payment category
    pub fn rename_payment_category(&mut self, old_name: &str, new_name: &str) -> EnvelopeResult<()> {
        let Some(id) = payment_category(self.ledger, self.settings, old_name).map(|c| c.id) else {
            return Ok(());
        };

        let category = self.ledger.category_mut(&id)?;
        let before = category.clone();
        category.name = new_name.trim().to_string();
        category.updated_at = chrono::Utc::now();
        category.validate()?;
        let after = category.clone();

        self.ledger
            .log_update(EntityType::Category, id, Some(after.name.clone()), &before, &after);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Account, AccountType, Budget, Transaction};
    use crate::services::envelope::EnvelopeService;
    use chrono::NaiveDate;

    fn ledger_with(accounts: &[(&str, AccountType)]) -> LedgerData {
        let mut ledger = LedgerData::new(Budget::new("Test", "USD", Month::new(2024, 1).unwrap()));
        for (name, kind) in accounts {
            let account = Account::new(ledger.budget_id(), *name, *kind);
            ledger.accounts.push(account);
        }
        ledger
    }

    fn payment_categories(ledger: &LedgerData) -> usize {
        ledger.categories.iter().filter(|c| c.is_credit_payment).count()
    }

    #[test]
    fn test_ensure_is_idempotent() {
        let settings = Settings::default();
        let mut ledger = ledger_with(&[
            ("Visa", AccountType::Credit),
            ("Amex", AccountType::Credit),
            ("Checking", AccountType::Checking),
        ]);

        let first = CreditService::new(&mut ledger, &settings)
            .ensure_debt_categories()
            .unwrap();
        assert!(first.group_created);
        assert_eq!(first.created_categories.len(), 2);

        let second = CreditService::new(&mut ledger, &settings)
            .ensure_debt_categories()
            .unwrap();
        assert!(!second.group_created);
        assert!(second.created_categories.is_empty());
        assert_eq!(ledger.groups.len(), 1);
        assert_eq!(payment_categories(&ledger), 2);
    }

    #[test]
    fn test_no_group_without_credit_accounts() {
        let settings = Settings::default();
        let mut ledger = ledger_with(&[("Checking", AccountType::Checking)]);
        let outcome = CreditService::new(&mut ledger, &settings)
            .ensure_debt_categories()
            .unwrap();
        assert!(outcome.group_id.is_none());
        assert!(ledger.groups.is_empty());
    }

    #[test]
    fn test_hidden_category_not_recreated() {
        let settings = Settings::default();
        let mut ledger = ledger_with(&[("Visa", AccountType::Credit)]);
        CreditService::new(&mut ledger, &settings)
            .ensure_debt_categories()
            .unwrap();
        ledger.categories[0].hidden = true;

        let outcome = CreditService::new(&mut ledger, &settings)
            .ensure_debt_categories()
            .unwrap();
        assert!(outcome.created_categories.is_empty());
        assert_eq!(payment_categories(&ledger), 1);
    }

    #[test]
    fn test_rename_follows_account() {
        let settings = Settings::default();
        let mut ledger = ledger_with(&[("Visa", AccountType::Credit)]);
        let mut service = CreditService::new(&mut ledger, &settings);
        service.ensure_debt_categories().unwrap();
        service.rename_payment_category("Visa", "Visa Rewards").unwrap();

        assert!(payment_category(&ledger, &settings, "Visa Rewards").is_some());
        assert!(payment_category(&ledger, &settings, "Visa").is_none());
    }

    #[test]
    fn test_debt_balance() {
        let settings = Settings::default();
        let mut ledger = ledger_with(&[("Visa", AccountType::Credit), ("Checking", AccountType::Checking)]);
        CreditService::new(&mut ledger, &settings)
            .ensure_debt_categories()
            .unwrap();
        let visa = ledger.accounts[0].id;
        let payment_cat = payment_category(&ledger, &settings, "Visa").unwrap().id;
        let march = Month::new(2024, 3).unwrap();

        let day = |d| NaiveDate::from_ymd_opt(2024, 3, d).unwrap();
        ledger.insert_transaction(Transaction::new(visa, day(2), Money::from_cents(-30000)));
        ledger.insert_transaction(Transaction::new(visa, day(20), Money::from_cents(10000)));
        EnvelopeService::new(&mut ledger)
            .assign(&payment_cat, march, Money::from_cents(5000))
            .unwrap();

        let debt = debt_balance(&ledger, &settings, &visa, march).unwrap();
        assert_eq!(debt.account_balance.cents(), -20000);
        assert_eq!(debt.assigned.cents(), 5000);
        assert_eq!(debt.payments.cents(), 10000);
        assert_eq!(debt.debt_balance.cents(), -25000);

        let checking = ledger.accounts[1].id;
        assert!(debt_balance(&ledger, &settings, &checking, march)
            .unwrap_err()
            .is_invalid_argument());
        assert_eq!(debt_overview(&ledger, &settings, march).unwrap().len(), 1);
    }
}
