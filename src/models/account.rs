//! Account model
//!
//! Represents the places money lives (checking, savings, credit cards, ...).
//! An account's balance is never stored; it is the sum of its transactions.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::ids::{AccountId, BudgetId};
use super::money::Money;

/// Type of financial account
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum AccountType {
    #[default]
    Checking,
    Savings,
    Cash,
    /// Credit card; gets a payment category in the reserved debt group
    Credit,
    Asset,
    Liability,
}

impl AccountType {
    /// Whether this account participates in credit debt tracking
    pub fn is_credit(&self) -> bool {
        matches!(self, Self::Credit)
    }

    /// Parse account type from string
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "checking" => Some(Self::Checking),
            "savings" => Some(Self::Savings),
            "cash" => Some(Self::Cash),
            "credit" | "credit_card" | "creditcard" => Some(Self::Credit),
            "asset" => Some(Self::Asset),
            "liability" => Some(Self::Liability),
            _ => None,
        }
    }
}

impl fmt::Display for AccountType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Checking => write!(f, "Checking"),
            Self::Savings => write!(f, "Savings"),
            Self::Cash => write!(f, "Cash"),
            Self::Credit => write!(f, "Credit Card"),
            Self::Asset => write!(f, "Asset"),
            Self::Liability => write!(f, "Liability"),
        }
    }
}

/// A financial account
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub id: AccountId,

    pub budget_id: BudgetId,

    /// Account name (e.g., "Chase Checking")
    pub name: String,

    #[serde(rename = "type")]
    pub account_type: AccountType,

    /// Off-budget accounts don't feed Available to Budget
    pub on_budget: bool,

    #[serde(default)]
    pub notes: String,

    /// Statement date of the last reconciliation
    #[serde(default)]
    pub last_reconciled_date: Option<NaiveDate>,

    /// Statement balance of the last reconciliation
    #[serde(default)]
    pub last_reconciled_balance: Option<Money>,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

impl Account {
    pub fn new(budget_id: BudgetId, name: impl Into<String>, account_type: AccountType) -> Self {
        let now = Utc::now();
        Self {
            id: AccountId::new(),
            budget_id,
            name: name.into(),
            account_type,
            on_budget: true,
            notes: String::new(),
            last_reconciled_date: None,
            last_reconciled_balance: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_credit(&self) -> bool {
        self.account_type.is_credit()
    }

    /// Record a completed reconciliation
    pub fn mark_reconciled(&mut self, date: NaiveDate, balance: Money) {
        self.last_reconciled_date = Some(date);
        self.last_reconciled_balance = Some(balance);
        self.updated_at = Utc::now();
    }

    pub fn validate(&self) -> Result<(), AccountValidationError> {
        if self.name.trim().is_empty() {
            return Err(AccountValidationError::EmptyName);
        }

        if self.name.len() > 100 {
            return Err(AccountValidationError::NameTooLong(self.name.len()));
        }

        Ok(())
    }
}

impl fmt::Display for Account {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.account_type)
    }
}

/// Validation errors for accounts
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AccountValidationError {
    #[error("Account name cannot be empty")]
    EmptyName,
    #[error("Account name too long ({0} chars, max 100)")]
    NameTooLong(usize),
}

impl From<AccountValidationError> for crate::error::EnvelopeError {
    fn from(err: AccountValidationError) -> Self {
        Self::InvalidArgument(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_account() {
        let budget_id = BudgetId::new();
        let account = Account::new(budget_id, "Checking", AccountType::Checking);
        assert_eq!(account.name, "Checking");
        assert_eq!(account.budget_id, budget_id);
        assert!(account.on_budget);
        assert!(!account.is_credit());
        assert!(account.last_reconciled_date.is_none());
    }

    #[test]
    fn test_account_type_parse() {
        assert_eq!(AccountType::parse("credit_card"), Some(AccountType::Credit));
        assert_eq!(AccountType::parse("Liability"), Some(AccountType::Liability));
        assert_eq!(AccountType::parse("brokerage"), None);
        assert!(AccountType::Credit.is_credit());
        assert!(!AccountType::Liability.is_credit());
    }

    #[test]
    fn test_validation() {
        let mut account = Account::new(BudgetId::new(), "Valid", AccountType::Cash);
        assert!(account.validate().is_ok());

        account.name = " ".into();
        assert_eq!(account.validate(), Err(AccountValidationError::EmptyName));

        account.name = "a".repeat(101);
        assert!(matches!(
            account.validate(),
            Err(AccountValidationError::NameTooLong(101))
        ));
    }

    #[test]
    fn test_mark_reconciled() {
        let mut account = Account::new(BudgetId::new(), "Checking", AccountType::Checking);
        let date = NaiveDate::from_ymd_opt(2024, 3, 31).unwrap();
        account.mark_reconciled(date, Money::from_cents(10000));
        assert_eq!(account.last_reconciled_date, Some(date));
        assert_eq!(account.last_reconciled_balance, Some(Money::from_cents(10000)));
    }

    #[test]
    fn test_serialization() {
        let account = Account::new(BudgetId::new(), "Visa", AccountType::Credit);
        let json = serde_json::to_string(&account).unwrap();
        assert!(json.contains("\"type\":\"credit\""));
        let back: Account = serde_json::from_str(&json).unwrap();
        assert_eq!(back, account);
    }
}
