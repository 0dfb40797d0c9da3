//! Transaction service
//!
//! Create, patch, delete and list transactions. Transfer legs are routed
//! through the transfer coordinator, and every write refreshes the record
//! chains of the categories it touched.

use std::collections::BTreeSet;

use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::audit::EntityType;
use crate::config::Settings;
use crate::error::{EnvelopeError, EnvelopeResult};
use crate::models::{
    AccountId, CategoryId, Money, Month, Subtransaction, Transaction, TransactionId,
    TransactionState,
};
use crate::services::envelope::EnvelopeService;
use crate::services::transfer::TransferService;
use crate::storage::LedgerData;

/// Input for creating a new transaction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewTransaction {
    pub account_id: AccountId,
    pub date: NaiveDate,
    pub amount: Money,
    #[serde(default)]
    pub payee: Option<String>,
    #[serde(default)]
    pub memo: Option<String>,
    #[serde(default)]
    pub state: TransactionState,
    /// Single category covering the whole amount
    #[serde(default)]
    pub category_id: Option<CategoryId>,
    #[serde(default)]
    pub splits: Vec<Subtransaction>,
    #[serde(default)]
    pub income_month: Option<Month>,
    /// Turns the transaction into a transfer; a negative amount moves money
    /// out of `account_id`
    #[serde(default)]
    pub transfer_account_id: Option<AccountId>,
}

impl NewTransaction {
    pub fn new(account_id: AccountId, date: NaiveDate, amount: Money) -> Self {
        Self {
            account_id,
            date,
            amount,
            payee: None,
            memo: None,
            state: TransactionState::default(),
            category_id: None,
            splits: Vec::new(),
            income_month: None,
            transfer_account_id: None,
        }
    }
}

/// Partial update; `None` leaves a field as it is
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionPatch {
    #[serde(default)]
    pub date: Option<NaiveDate>,
    #[serde(default)]
    pub amount: Option<Money>,
    #[serde(default)]
    pub memo: Option<String>,
    #[serde(default)]
    pub payee: Option<String>,
    #[serde(default)]
    pub category_id: Option<CategoryId>,
    /// Remove all splits
    #[serde(default)]
    pub clear_category: bool,
    #[serde(default)]
    pub splits: Option<Vec<Subtransaction>>,
    #[serde(default)]
    pub state: Option<TransactionState>,
    #[serde(default)]
    pub income_month: Option<Month>,
    #[serde(default)]
    pub clear_income_month: bool,
}

impl TransactionPatch {
    fn touches_categories(&self) -> bool {
        self.category_id.is_some() || self.clear_category || self.splits.is_some()
    }

    fn touches_income(&self) -> bool {
        self.income_month.is_some() || self.clear_income_month
    }
}

/// Filter for listing transactions
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionFilter {
    #[serde(default)]
    pub account_id: Option<AccountId>,
    /// Only transactions dated on or after this day
    #[serde(default)]
    pub since: Option<NaiveDate>,
    #[serde(default)]
    pub limit: Option<usize>,
}

/// Newest first, capped by `filter.limit` or the configured list limit
pub fn list_transactions(
    ledger: &LedgerData,
    settings: &Settings,
    filter: &TransactionFilter,
) -> EnvelopeResult<Vec<Transaction>> {
    if let Some(account_id) = &filter.account_id {
        ledger.account(account_id)?;
    }

    let mut transactions: Vec<Transaction> = ledger
        .transactions
        .iter()
        .filter(|t| filter.account_id.map_or(true, |id| t.account_id == id))
        .filter(|t| filter.since.map_or(true, |since| t.date >= since))
        .cloned()
        .collect();
    transactions.sort_by(|a, b| b.date.cmp(&a.date).then(b.created_at.cmp(&a.created_at)));

    let limit = filter
        .limit
        .unwrap_or(settings.transaction_list_limit)
        .min(settings.transaction_list_limit);
    transactions.truncate(limit);
    Ok(transactions)
}

pub struct TransactionService<'a> {
    ledger: &'a mut LedgerData,
}

impl<'a> TransactionService<'a> {
    pub fn new(ledger: &'a mut LedgerData) -> Self {
        Self { ledger }
    }

    pub fn create_transaction(&mut self, input: NewTransaction) -> EnvelopeResult<Transaction> {
        self.ledger.account(&input.account_id)?;

        if let Some(other) = input.transfer_account_id {
            return self.create_transfer_leg(input, other);
        }
        if input.category_id.is_some() && !input.splits.is_empty() {
            return Err(EnvelopeError::InvalidArgument(
                "Use either a category or splits, not both".into(),
            ));
        }

        let mut txn = Transaction::new(input.account_id, input.date, input.amount);
        txn.state = input.state;
        txn.income_month = input.income_month;
        if let Some(memo) = input.memo {
            txn.memo = memo;
        }
        if let Some(payee) = input.payee.as_deref() {
            self.apply_payee(&mut txn, payee)?;
        }

        if let Some(category_id) = input.category_id {
            txn.set_category(Some(category_id));
        } else {
            txn.subtransactions = input.splits;
        }
        self.check_categories(&txn)?;
        self.ledger.check_transaction(&txn)?;

        self.ledger.log_create(
            EntityType::Transaction,
            txn.id,
            Some(format!("{} {}", txn.date, txn.payee_name)),
            &txn,
        );
        let touched: Vec<CategoryId> = txn.category_ids().collect();
        self.ledger.insert_transaction(txn.clone());
        EnvelopeService::new(self.ledger).refresh_tracked(touched)?;

        Ok(txn)
    }

    fn create_transfer_leg(
        &mut self,
        input: NewTransaction,
        other: AccountId,
    ) -> EnvelopeResult<Transaction> {
        if input.category_id.is_some() || !input.splits.is_empty() {
            return Err(EnvelopeError::InvalidArgument(
                "A transfer cannot be categorized".into(),
            ));
        }
        if input.income_month.is_some() {
            return Err(EnvelopeError::InvalidArgument(
                "A transfer cannot be tagged as income".into(),
            ));
        }
        if input.amount.is_zero() {
            return Err(EnvelopeError::InvalidArgument(
                "Transfer amount must be non-zero".into(),
            ));
        }

        let magnitude = input
            .amount
            .checked_abs()
            .filter(Money::is_in_range)
            .ok_or_else(|| {
                EnvelopeError::InvalidArgument(format!(
                    "Transfer amount {} is outside the supported range",
                    input.amount
                ))
            })?;

        let mut transfers = TransferService::new(self.ledger);
        let result = if input.amount.is_negative() {
            transfers.create_transfer(input.account_id, other, input.date, magnitude, input.memo)?
        } else {
            transfers.create_transfer(other, input.account_id, input.date, input.amount, input.memo)?
        };

        let leg = if result.from_transaction.account_id == input.account_id {
            result.from_transaction
        } else {
            result.to_transaction
        };
        if input.state != TransactionState::Uncleared {
            let stored = self.ledger.transaction_mut(&leg.id)?;
            stored.set_state(input.state);
            return Ok(stored.clone());
        }
        Ok(leg)
    }

    pub fn update_transaction(
        &mut self,
        id: &TransactionId,
        patch: TransactionPatch,
    ) -> EnvelopeResult<Transaction> {
        let before = self.ledger.transaction(id)?.clone();

        if patch.category_id.is_some() && patch.splits.is_some() {
            return Err(EnvelopeError::InvalidArgument(
                "Use either a category or splits, not both".into(),
            ));
        }
        if patch.income_month.is_some() && (patch.category_id.is_some() || patch.splits.is_some()) {
            return Err(EnvelopeError::InvalidArgument(
                "Income transactions cannot be categorized".into(),
            ));
        }

        if before.is_transfer() {
            if patch.touches_categories() {
                return Err(EnvelopeError::InvalidArgument(
                    "A transfer cannot be categorized".into(),
                ));
            }
            if patch.touches_income() {
                return Err(EnvelopeError::InvalidArgument(
                    "A transfer cannot be tagged as income".into(),
                ));
            }
            if patch.date.is_some() || patch.amount.is_some() {
                TransferService::new(self.ledger).update_transfer(id, patch.date, patch.amount)?;
            }
        }

        let mut txn = self.ledger.transaction(id)?.clone();
        if !txn.is_transfer() {
            if let Some(date) = patch.date {
                txn.date = date;
            }
            if let Some(amount) = patch.amount {
                // A single split follows the amount; multiple splits must be
                // re-specified
                if txn.subtransactions.len() == 1 && patch.splits.is_none() {
                    txn.subtransactions[0].amount = amount;
                }
                txn.amount = amount;
            }
            if patch.clear_category {
                txn.subtransactions.clear();
            }
            if let Some(category_id) = patch.category_id {
                txn.set_category(Some(category_id));
            }
            if let Some(splits) = patch.splits {
                txn.subtransactions = splits;
            }
            if patch.clear_income_month {
                txn.income_month = None;
            }
            if let Some(month) = patch.income_month {
                // Income is budgeted through Available to Budget, not a category
                txn.subtransactions.clear();
                txn.income_month = Some(month);
            }
        }
        if let Some(memo) = patch.memo {
            txn.memo = memo;
        }
        if let Some(payee) = patch.payee.as_deref() {
            self.apply_payee(&mut txn, payee)?;
        }
        if let Some(state) = patch.state {
            txn.set_state(state);
        }
        txn.updated_at = Utc::now();

        self.check_categories(&txn)?;
        self.ledger.check_transaction(&txn)?;

        let touched: BTreeSet<CategoryId> =
            before.category_ids().chain(txn.category_ids()).collect();
        *self.ledger.transaction_mut(id)? = txn.clone();
        self.ledger.log_update(
            EntityType::Transaction,
            id,
            Some(format!("{} {}", txn.date, txn.payee_name)),
            &before,
            &txn,
        );
        EnvelopeService::new(self.ledger).refresh_tracked(touched)?;

        Ok(txn)
    }

    /// Delete a transaction; both legs go for a transfer
    pub fn delete_transaction(&mut self, id: &TransactionId) -> EnvelopeResult<Vec<Transaction>> {
        let txn = self.ledger.transaction(id)?;
        if txn.is_transfer() {
            return TransferService::new(self.ledger).delete_transfer(id);
        }

        let removed = self
            .ledger
            .remove_transaction(id)
            .ok_or_else(|| EnvelopeError::transaction_not_found(id.to_string()))?;
        self.ledger.log_delete(
            EntityType::Transaction,
            removed.id,
            Some(format!("{} {}", removed.date, removed.payee_name)),
            &removed,
        );
        let touched: Vec<CategoryId> = removed.category_ids().collect();
        EnvelopeService::new(self.ledger).refresh_tracked(touched)?;

        Ok(vec![removed])
    }

    fn apply_payee(&mut self, txn: &mut Transaction, payee: &str) -> EnvelopeResult<()> {
        let payee = payee.trim();
        if payee.is_empty() {
            txn.payee_id = None;
            txn.payee_name.clear();
            return Ok(());
        }
        let (payee_id, name) = self.ledger.get_or_create_payee(payee)?;
        txn.payee_id = Some(payee_id);
        txn.payee_name = name;
        Ok(())
    }

    fn check_categories(&self, txn: &Transaction) -> EnvelopeResult<()> {
        for category_id in txn.category_ids() {
            self.ledger.category(&category_id)?;
        }
        Ok(())
    }
}
