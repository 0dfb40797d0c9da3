//! Payee model
//!
//! Payees are created on demand when a transaction names one, and are offered
//! back for autocomplete.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::ids::PayeeId;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payee {
    pub id: PayeeId,

    pub name: String,

    pub created_at: DateTime<Utc>,
}

impl Payee {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: PayeeId::new(),
            name: name.into(),
            created_at: Utc::now(),
        }
    }

    /// Case-insensitive exact name match
    pub fn is_named(&self, name: &str) -> bool {
        self.name.eq_ignore_ascii_case(name.trim())
    }

    /// Case-insensitive substring match used for autocomplete
    pub fn matches_query(&self, query: &str) -> bool {
        self.name
            .to_lowercase()
            .contains(&query.trim().to_lowercase())
    }

    pub fn validate(&self) -> Result<(), PayeeValidationError> {
        if self.name.trim().is_empty() {
            return Err(PayeeValidationError::EmptyName);
        }

        if self.name.len() > 100 {
            return Err(PayeeValidationError::NameTooLong(self.name.len()));
        }

        Ok(())
    }
}

impl fmt::Display for Payee {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PayeeValidationError {
    #[error("Payee name cannot be empty")]
    EmptyName,
    #[error("Payee name too long ({0} chars, max 100)")]
    NameTooLong(usize),
}

impl From<PayeeValidationError> for crate::error::EnvelopeError {
    fn from(err: PayeeValidationError) -> Self {
        Self::InvalidArgument(err.to_string())
    }
}
