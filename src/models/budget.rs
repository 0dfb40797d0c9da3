//! Budget model
//!
//! The budget is the root every other entity hangs off. It is created once and
//! almost never changes afterwards.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::ids::BudgetId;
use super::month::Month;
use crate::error::EnvelopeError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Budget {
    pub id: BudgetId,

    pub name: String,

    /// ISO 4217 code; amounts are minor units of this currency
    pub currency: String,

    /// First month the budget tracks
    pub start_month: Month,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

impl Budget {
    pub fn new(name: impl Into<String>, currency: impl Into<String>, start_month: Month) -> Self {
        let now = Utc::now();
        Self {
            id: BudgetId::new(),
            name: name.into(),
            currency: currency.into(),
            start_month,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn validate(&self) -> Result<(), EnvelopeError> {
        if self.name.trim().is_empty() {
            return Err(EnvelopeError::InvalidArgument(
                "Budget name cannot be empty".into(),
            ));
        }
        if self.name.len() > 100 {
            return Err(EnvelopeError::InvalidArgument(format!(
                "Budget name too long ({} chars, max 100)",
                self.name.len()
            )));
        }
        normalize_currency(&self.currency).map(|_| ())
    }
}

impl fmt::Display for Budget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.currency)
    }
}

/// Upper-case a currency code, rejecting anything that isn't three ASCII letters
pub fn normalize_currency(code: &str) -> Result<String, EnvelopeError> {
    let code = code.trim();
    if code.len() != 3 || !code.chars().all(|c| c.is_ascii_alphabetic()) {
        return Err(EnvelopeError::InvalidArgument(format!(
            "Currency must be a three-letter code, got '{}'",
            code
        )));
    }
    Ok(code.to_ascii_uppercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_currency() {
        assert_eq!(normalize_currency("usd").unwrap(), "USD");
        assert_eq!(normalize_currency(" Eur ").unwrap(), "EUR");
        assert!(normalize_currency("US").is_err());
        assert!(normalize_currency("U5D").is_err());
    }

    #[test]
    fn test_validate() {
        let month = Month::new(2024, 1).unwrap();
        assert!(Budget::new("Household", "USD", month).validate().is_ok());
        assert!(Budget::new("  ", "USD", month).validate().is_err());
        assert!(Budget::new("Household", "dollars", month).validate().is_err());
    }

    #[test]
    fn test_serialization() {
        let budget = Budget::new("Household", "USD", Month::new(2024, 3).unwrap());
        let json = serde_json::to_string(&budget).unwrap();
        assert!(json.contains("\"start_month\":\"2024-03-01\""));
        let back: Budget = serde_json::from_str(&json).unwrap();
        assert_eq!(back, budget);
    }
}
