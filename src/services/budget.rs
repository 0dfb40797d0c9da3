//! Budget creation
//!
//! Builds the initial ledger document for a new budget, optionally seeded
//! with the default category groups.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::audit::EntityType;
use crate::config::Settings;
use crate::error::EnvelopeResult;
use crate::models::budget::normalize_currency;
use crate::models::{Budget, Category, CategoryGroup, Month, DEFAULT_GROUPS};
use crate::storage::LedgerData;

/// Input for creating a budget
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewBudget {
    pub name: String,
    /// Defaults to the configured currency
    #[serde(default)]
    pub currency: Option<String>,
    /// Any day; the budget starts on the first of that month
    pub start_date: NaiveDate,
    #[serde(default)]
    pub with_defaults: bool,
}

/// A fresh, uncommitted ledger for `input`
pub fn new_budget_ledger(settings: &Settings, input: NewBudget) -> EnvelopeResult<LedgerData> {
    let currency = normalize_currency(
        input
            .currency
            .as_deref()
            .unwrap_or(&settings.default_currency),
    )?;
    let budget = Budget::new(
        input.name.trim(),
        currency,
        Month::containing(input.start_date),
    );
    budget.validate()?;

    let mut ledger = LedgerData::new(budget.clone());
    ledger.log_create(EntityType::Budget, budget.id, Some(budget.name.clone()), &budget);

    if input.with_defaults {
        seed_default_categories(&mut ledger);
    }
    Ok(ledger)
}

fn seed_default_categories(ledger: &mut LedgerData) {
    for (i, (group_name, categories)) in DEFAULT_GROUPS.iter().enumerate() {
        let group = CategoryGroup::with_sort_order(*group_name, i as i32);
        let group_id = group.id;
        ledger.log_create(EntityType::CategoryGroup, group.id, Some(group.name.clone()), &group);
        ledger.groups.push(group);

        for (j, name) in categories.iter().enumerate() {
            let category = Category::with_sort_order(*name, group_id, j as i32);
            ledger.log_create(
                EntityType::Category,
                category.id,
                Some(category.name.clone()),
                &category,
            );
            ledger.categories.push(category);
        }
    }
}
