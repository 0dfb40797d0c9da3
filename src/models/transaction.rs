//! Transaction model
//!
//! A transaction posts a signed amount to one account. Its category effect is
//! carried by subtransactions (splits); a single-category transaction is just
//! a transaction with one split. Transfer legs carry no splits at all.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::ids::{AccountId, CategoryId, PayeeId, TransactionId};
use super::money::Money;
use super::month::Month;
use crate::error::EnvelopeError;

/// Clearing state of a transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TransactionState {
    /// Entered but not yet seen on a statement
    #[default]
    Uncleared,
    /// Seen on the bank side; eligible for reconciliation
    Cleared,
    /// Matched against a statement
    Reconciled,
}

impl TransactionState {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "uncleared" | "pending" => Some(Self::Uncleared),
            "cleared" => Some(Self::Cleared),
            "reconciled" => Some(Self::Reconciled),
            _ => None,
        }
    }
}

impl fmt::Display for TransactionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Uncleared => write!(f, "Uncleared"),
            Self::Cleared => write!(f, "Cleared"),
            Self::Reconciled => write!(f, "Reconciled"),
        }
    }
}

/// The portion of a transaction attributed to one category
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subtransaction {
    /// `None` means uncategorized
    pub category_id: Option<CategoryId>,

    /// Same sign convention as the parent
    pub amount: Money,

    #[serde(default)]
    pub memo: String,
}

impl Subtransaction {
    pub fn new(category_id: Option<CategoryId>, amount: Money) -> Self {
        Self {
            category_id,
            amount,
            memo: String::new(),
        }
    }

    pub fn with_memo(category_id: Option<CategoryId>, amount: Money, memo: impl Into<String>) -> Self {
        Self {
            category_id,
            amount,
            memo: memo.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: TransactionId,

    pub account_id: AccountId,

    pub date: NaiveDate,

    /// Positive for inflow, negative for outflow
    pub amount: Money,

    #[serde(default)]
    pub payee_id: Option<PayeeId>,

    /// Stored for display, even if payee_id is set
    #[serde(default)]
    pub payee_name: String,

    #[serde(default)]
    pub memo: String,

    #[serde(default)]
    pub state: TransactionState,

    /// Month this inflow counts toward as budgetable income
    #[serde(default)]
    pub income_month: Option<Month>,

    /// For transfer legs, the account on the other side
    #[serde(default)]
    pub transfer_account_id: Option<AccountId>,

    /// For transfer legs, the mirrored transaction
    #[serde(default)]
    pub transfer_transaction_id: Option<TransactionId>,

    #[serde(default)]
    pub subtransactions: Vec<Subtransaction>,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

impl Transaction {
    pub fn new(account_id: AccountId, date: NaiveDate, amount: Money) -> Self {
        let now = Utc::now();
        Self {
            id: TransactionId::new(),
            account_id,
            date,
            amount,
            payee_id: None,
            payee_name: String::new(),
            memo: String::new(),
            state: TransactionState::Uncleared,
            income_month: None,
            transfer_account_id: None,
            transfer_transaction_id: None,
            subtransactions: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_transfer(&self) -> bool {
        self.transfer_account_id.is_some()
    }

    pub fn is_income(&self) -> bool {
        self.income_month.is_some()
    }

    pub fn is_inflow(&self) -> bool {
        self.amount.is_positive()
    }

    /// Calendar month of the posting date
    pub fn posting_month(&self) -> Month {
        Month::containing(self.date)
    }

    pub fn set_state(&mut self, state: TransactionState) {
        self.state = state;
        self.updated_at = Utc::now();
    }

    /// Replace all splits with one split covering the full amount
    pub fn set_category(&mut self, category_id: Option<CategoryId>) {
        self.subtransactions = vec![Subtransaction::new(category_id, self.amount)];
        self.updated_at = Utc::now();
    }

    /// The single category of a one-split transaction
    pub fn category_id(&self) -> Option<CategoryId> {
        match self.subtransactions.as_slice() {
            [only] => only.category_id,
            _ => None,
        }
    }

    /// Categories touched by this transaction's splits
    pub fn category_ids(&self) -> impl Iterator<Item = CategoryId> + '_ {
        self.subtransactions.iter().filter_map(|s| s.category_id)
    }

    pub fn subtransactions_total(&self) -> Money {
        self.subtransactions.iter().map(|s| s.amount).sum()
    }

    pub fn validate(&self) -> Result<(), TransactionValidationError> {
        let amounts_in_range = self.amount.is_in_range()
            && self.subtransactions.iter().all(|s| s.amount.is_in_range());
        if !amounts_in_range {
            return Err(TransactionValidationError::AmountOutOfRange);
        }

        if self.is_transfer() && !self.subtransactions.is_empty() {
            return Err(TransactionValidationError::TransferWithCategory);
        }

        if self.is_income() {
            if !self.is_inflow() {
                return Err(TransactionValidationError::IncomeNotInflow);
            }
            if !self.subtransactions.is_empty() {
                return Err(TransactionValidationError::IncomeWithCategory);
            }
        }

        if !self.subtransactions.is_empty() {
            let total = Money::checked_sum(self.subtransactions.iter().map(|s| s.amount))
                .ok_or(TransactionValidationError::AmountOutOfRange)?;
            if total != self.amount {
                return Err(TransactionValidationError::SplitsMismatch {
                    transaction_amount: self.amount,
                    splits_total: total,
                });
            }
        }

        Ok(())
    }
}

impl fmt::Display for Transaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {}",
            self.date.format("%Y-%m-%d"),
            self.payee_name,
            self.amount
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransactionValidationError {
    #[error("Split totals ({splits_total}) do not match transaction amount ({transaction_amount})")]
    SplitsMismatch {
        transaction_amount: Money,
        splits_total: Money,
    },
    #[error("Transfer transactions cannot be categorized")]
    TransferWithCategory,
    #[error("Income must be an inflow")]
    IncomeNotInflow,
    #[error("Income transactions cannot be categorized")]
    IncomeWithCategory,
    #[error("Amount is outside the supported range")]
    AmountOutOfRange,
}

impl From<TransactionValidationError> for EnvelopeError {
    fn from(err: TransactionValidationError) -> Self {
        match err {
            TransactionValidationError::SplitsMismatch { .. } => {
                Self::InvariantViolation(err.to_string())
            }
            _ => Self::InvalidArgument(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, 15).unwrap()
    }

    #[test]
    fn test_new_transaction() {
        let account_id = AccountId::new();
        let txn = Transaction::new(account_id, date(), Money::from_cents(-5000));
        assert_eq!(txn.account_id, account_id);
        assert_eq!(txn.state, TransactionState::Uncleared);
        assert_eq!(txn.posting_month(), Month::new(2025, 1).unwrap());
        assert!(txn.validate().is_ok());
    }

    #[test]
    fn test_set_category() {
        let mut txn = Transaction::new(AccountId::new(), date(), Money::from_cents(-5000));
        let cat = CategoryId::new();
        txn.set_category(Some(cat));
        assert_eq!(txn.category_id(), Some(cat));
        assert_eq!(txn.subtransactions_total(), txn.amount);
        assert!(txn.validate().is_ok());
    }

    #[test]
    fn test_split_transaction() {
        let mut txn = Transaction::new(AccountId::new(), date(), Money::from_cents(-10000));
        txn.subtransactions = vec![
            Subtransaction::new(Some(CategoryId::new()), Money::from_cents(-6000)),
            Subtransaction::with_memo(None, Money::from_cents(-4000), "misc"),
        ];
        assert!(txn.validate().is_ok());
        assert_eq!(txn.category_id(), None);
        assert_eq!(txn.category_ids().count(), 1);
    }

    #[test]
    fn test_amount_out_of_range() {
        let txn = Transaction::new(AccountId::new(), date(), Money::from_cents(i64::MIN));
        assert_eq!(txn.validate(), Err(TransactionValidationError::AmountOutOfRange));

        let mut split = Transaction::new(AccountId::new(), date(), Money::from_cents(-100));
        split.subtransactions = vec![
            Subtransaction::new(None, Money::from_cents(i64::MAX)),
            Subtransaction::new(None, Money::from_cents(-100)),
        ];
        let err: EnvelopeError = split.validate().unwrap_err().into();
        assert!(err.is_invalid_argument());
    }

    #[test]
    fn test_split_mismatch_is_invariant_violation() {
        let mut txn = Transaction::new(AccountId::new(), date(), Money::from_cents(-10000));
        txn.subtransactions = vec![Subtransaction::new(
            Some(CategoryId::new()),
            Money::from_cents(-5000),
        )];

        let err = txn.validate().unwrap_err();
        assert!(matches!(err, TransactionValidationError::SplitsMismatch { .. }));
        assert!(EnvelopeError::from(err).is_invariant_violation());
    }

    #[test]
    fn test_transfer_cannot_be_categorized() {
        let mut txn = Transaction::new(AccountId::new(), date(), Money::from_cents(-100));
        txn.transfer_account_id = Some(AccountId::new());
        assert!(txn.validate().is_ok());

        txn.set_category(Some(CategoryId::new()));
        assert_eq!(
            txn.validate(),
            Err(TransactionValidationError::TransferWithCategory)
        );
    }

    #[test]
    fn test_income_rules() {
        let mut txn = Transaction::new(AccountId::new(), date(), Money::from_cents(100000));
        txn.income_month = Some(Month::new(2025, 2).unwrap());
        assert!(txn.validate().is_ok());

        txn.amount = Money::from_cents(-100);
        assert_eq!(
            txn.validate(),
            Err(TransactionValidationError::IncomeNotInflow)
        );
    }

    #[test]
    fn test_state_parse() {
        assert_eq!(TransactionState::parse("cleared"), Some(TransactionState::Cleared));
        assert_eq!(TransactionState::parse("Pending"), Some(TransactionState::Uncleared));
        assert_eq!(TransactionState::parse("void"), None);
    }

    #[test]
    fn test_display() {
        let mut txn = Transaction::new(AccountId::new(), date(), Money::from_cents(-5000));
        txn.payee_name = "Test Store".to_string();
        assert_eq!(format!("{}", txn), "2025-01-15 Test Store -50.00");
    }
}
