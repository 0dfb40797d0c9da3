//! Per-category, per-month envelope records
//!
//! A record is the unit of month-to-month carry-forward:
//!
//! ```text
//! available(C, M) = available(C, M-1) + assigned(C, M) + activity(C, M)
//! ```
//!
//! with `available` of the month before a category's first record taken as
//! zero. Negative `available` is overspending the next assignment must cover.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ids::CategoryId;
use super::money::Money;
use super::month::Month;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthlyCategoryRecord {
    pub category_id: CategoryId,

    pub month: Month,

    /// Amount explicitly budgeted this month
    pub assigned: Money,

    /// Sum of split amounts posted to this category this month
    pub activity: Money,

    /// Rolling balance after this month
    pub available: Money,

    pub updated_at: DateTime<Utc>,
}

impl MonthlyCategoryRecord {
    /// A zero-valued record (lazy materialization)
    pub fn new(category_id: CategoryId, month: Month) -> Self {
        Self {
            category_id,
            month,
            assigned: Money::zero(),
            activity: Money::zero(),
            available: Money::zero(),
            updated_at: Utc::now(),
        }
    }

    /// Recompute `available` from the prior month's balance.
    /// Returns whether anything changed.
    pub fn roll_forward(&mut self, prior_available: Money, activity: Money) -> bool {
        let available = prior_available + self.assigned + activity;
        if available == self.available && activity == self.activity {
            return false;
        }
        self.activity = activity;
        self.available = available;
        self.updated_at = Utc::now();
        true
    }

    /// Whether the carry-forward invariant holds against `prior_available`
    pub fn is_consistent_with(&self, prior_available: Money) -> bool {
        self.available == prior_available + self.assigned + self.activity
    }
}
