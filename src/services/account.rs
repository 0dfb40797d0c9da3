//! Account service
//!
//! Provides business logic for account management including creation,
//! renaming, and balance calculation. Credit accounts keep their payment
//! category in step through the credit debt synchronizer.

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::audit::EntityType;
use crate::config::Settings;
use crate::error::{EnvelopeError, EnvelopeResult};
use crate::models::{Account, AccountId, AccountType, Money, TransactionState};
use crate::services::credit::CreditService;
use crate::storage::LedgerData;

/// Summary of an account with computed fields
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountSummary {
    pub account: Account,
    /// Sum of every transaction
    pub balance: Money,
    /// Cleared and reconciled transactions only
    pub cleared_balance: Money,
    pub uncleared_count: usize,
}

/// Fields of an account that can be changed after creation
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountPatch {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub on_budget: Option<bool>,
    #[serde(default)]
    pub notes: Option<String>,
}

pub fn account_summary(ledger: &LedgerData, account: &Account) -> AccountSummary {
    let mut balance = Money::zero();
    let mut cleared_balance = Money::zero();
    let mut uncleared_count = 0;

    for txn in ledger.transactions_for_account(&account.id) {
        balance += txn.amount;
        match txn.state {
            TransactionState::Cleared | TransactionState::Reconciled => {
                cleared_balance += txn.amount;
            }
            TransactionState::Uncleared => {
                uncleared_count += 1;
            }
        }
    }

    AccountSummary {
        account: account.clone(),
        balance,
        cleared_balance,
        uncleared_count,
    }
}

pub fn list_with_balances(ledger: &LedgerData) -> Vec<AccountSummary> {
    ledger
        .accounts
        .iter()
        .map(|a| account_summary(ledger, a))
        .collect()
}

pub struct AccountService<'a> {
    ledger: &'a mut LedgerData,
    settings: &'a Settings,
}

impl<'a> AccountService<'a> {
    pub fn new(ledger: &'a mut LedgerData, settings: &'a Settings) -> Self {
        Self { ledger, settings }
    }

    pub fn create_account(
        &mut self,
        name: &str,
        account_type: AccountType,
        on_budget: bool,
    ) -> EnvelopeResult<Account> {
        let name = name.trim();
        if self.ledger.account_name_exists(name, None) {
            return Err(EnvelopeError::InvalidArgument(format!(
                "An account named '{}' already exists",
                name
            )));
        }

        let mut account = Account::new(self.ledger.budget_id(), name, account_type);
        account.on_budget = on_budget;
        account.validate()?;

        self.ledger.log_create(
            EntityType::Account,
            account.id,
            Some(account.name.clone()),
            &account,
        );
        self.ledger.accounts.push(account.clone());

        if account.is_credit() {
            CreditService::new(self.ledger, self.settings).ensure_debt_categories()?;
        }
        Ok(account)
    }

    pub fn update_account(&mut self, id: &AccountId, patch: AccountPatch) -> EnvelopeResult<Account> {
        let before = self.ledger.account(id)?.clone();

        let new_name = patch.name.as_deref().map(str::trim);
        if let Some(name) = new_name {
            if self.ledger.account_name_exists(name, Some(*id)) {
                return Err(EnvelopeError::InvalidArgument(format!(
                    "An account named '{}' already exists",
                    name
                )));
            }
        }

        let account = self.ledger.account_mut(id)?;
        if let Some(name) = new_name {
            account.name = name.to_string();
        }
        if let Some(on_budget) = patch.on_budget {
            account.on_budget = on_budget;
        }
        if let Some(notes) = patch.notes {
            account.notes = notes;
        }
        account.updated_at = Utc::now();
        account.validate()?;
        let after = account.clone();

        self.ledger.log_update(
            EntityType::Account,
            id,
            Some(after.name.clone()),
            &before,
            &after,
        );

        if after.is_credit() {
            let mut credit = CreditService::new(self.ledger, self.settings);
            if before.name != after.name {
                credit.rename_payment_category(&before.name, &after.name)?;
            }
            credit.ensure_debt_categories()?;
        }
        Ok(after)
    }
}
