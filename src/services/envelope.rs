//! Envelope engine
//!
//! Per-category monthly rollover, lazy materialization of monthly records,
//! assignment deltas and the month-level Available to Budget figure.
//!
//! Records for a category always form a contiguous run of months, each
//! satisfying `available = prior available + assigned + activity`. Any write
//! that can change a category's activity re-runs the chain for that category.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use crate::audit::EntityType;
use crate::error::{EnvelopeError, EnvelopeResult};
use crate::models::{
    BudgetId, Category, CategoryGroup, CategoryId, Money, Month, MonthlyCategoryRecord,
};
use crate::storage::LedgerData;

/// Available to Budget for one month, with the parts it is built from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvailableToBudget {
    pub month: Month,
    /// Inflows tagged as income for this month on on-budget accounts
    pub income: Money,
    /// Sum of this month's assignments across categories
    pub assigned: Money,
    /// Sum of this month's category activity (informational)
    pub activity: Money,
    /// Leftover carried from last month (never negative)
    pub not_budgeted_last_month: Money,
    /// Over-assignment carried from last month (never positive)
    pub overspent_last_month: Money,
    /// `income - assigned + not_budgeted_last_month + overspent_last_month`
    pub available: Money,
}

/// Everything the budget screen needs for one month
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonthView {
    pub budget_id: BudgetId,
    pub month: Month,
    pub groups: Vec<CategoryGroup>,
    pub categories: Vec<Category>,
    pub records: Vec<MonthlyCategoryRecord>,
    pub available_to_budget: AvailableToBudget,
}

impl MonthView {
    pub fn record_for(&self, category_id: &CategoryId) -> Option<&MonthlyCategoryRecord> {
        self.records.iter().find(|r| r.category_id == *category_id)
    }
}

/// Net split amounts posted to a category, keyed by posting month
pub fn activity_by_month(ledger: &LedgerData, category_id: &CategoryId) -> BTreeMap<Month, Money> {
    let mut by_month = BTreeMap::new();
    for txn in &ledger.transactions {
        let amount: Money = txn
            .subtransactions
            .iter()
            .filter(|s| s.category_id == Some(*category_id))
            .map(|s| s.amount)
            .sum();
        if !amount.is_zero() {
            *by_month.entry(txn.posting_month()).or_default() += amount;
        }
    }
    by_month
}

/// Activity of one category in one month
pub fn activity(ledger: &LedgerData, category_id: &CategoryId, month: Month) -> Money {
    ledger
        .transactions
        .iter()
        .filter(|t| month.contains(t.date))
        .flat_map(|t| t.subtransactions.iter())
        .filter(|s| s.category_id == Some(*category_id))
        .map(|s| s.amount)
        .sum()
}

/// Income received per month (by `income_month`, on-budget accounts only)
fn income_by_month(ledger: &LedgerData) -> BTreeMap<Month, Money> {
    let mut by_month = BTreeMap::new();
    for txn in &ledger.transactions {
        let Some(month) = txn.income_month else {
            continue;
        };
        let on_budget = ledger
            .get_account(&txn.account_id)
            .map(|a| a.on_budget)
            .unwrap_or(false);
        if on_budget {
            *by_month.entry(month).or_default() += txn.amount;
        }
    }
    by_month
}

/// Compute Available to Budget for `month`.
///
/// `rawATB(M) = income(M) - assigned(M) + carry(M-1)` where the carry is
/// `max(rawATB(M-1), 0) + min(rawATB(M-1), 0)`, i.e. `rawATB(M-1)` itself.
/// Unrolled, the prior month's figure is the running sum of
/// `income - assigned` over every earlier month, which is computed in one pass.
pub fn available_to_budget(ledger: &LedgerData, month: Month) -> AvailableToBudget {
    let mut net_by_month: BTreeMap<Month, Money> = income_by_month(ledger);
    for (record_month, assigned) in ledger.monthly_records.assigned_by_month() {
        *net_by_month.entry(record_month).or_default() -= assigned;
    }

    let prior: Money = net_by_month
        .range(..month)
        .map(|(_, net)| *net)
        .sum();

    let income = income_by_month(ledger)
        .get(&month)
        .copied()
        .unwrap_or_default();
    let assigned: Money = ledger
        .monthly_records
        .in_month(month)
        .map(|r| r.assigned)
        .sum();
    let activity: Money = ledger
        .categories
        .iter()
        .map(|c| self::activity(ledger, &c.id, month))
        .sum();

    let not_budgeted_last_month = prior.max_zero();
    let overspent_last_month = prior.min_zero();

    AvailableToBudget {
        month,
        income,
        assigned,
        activity,
        not_budgeted_last_month,
        overspent_last_month,
        available: income - assigned + not_budgeted_last_month + overspent_last_month,
    }
}

/// Whether every category already has a record for `month`
pub fn is_materialized(ledger: &LedgerData, month: Month) -> bool {
    ledger
        .categories
        .iter()
        .all(|c| ledger.record(&c.id, month).is_some())
}

/// Build the month view from stored records; missing records read as zero
pub fn month_view(ledger: &LedgerData, month: Month) -> MonthView {
    let mut groups = ledger.groups.clone();
    groups.sort_by(|a, b| a.sort_order.cmp(&b.sort_order).then(a.name.cmp(&b.name)));

    let group_rank: HashMap<_, _> = groups
        .iter()
        .enumerate()
        .map(|(i, g)| (g.id, i))
        .collect();
    let mut categories = ledger.categories.clone();
    categories.sort_by(|a, b| {
        group_rank
            .get(&a.group_id)
            .cmp(&group_rank.get(&b.group_id))
            .then(a.sort_order.cmp(&b.sort_order))
            .then(a.name.cmp(&b.name))
    });

    let records = categories
        .iter()
        .map(|c| {
            ledger
                .record(&c.id, month)
                .cloned()
                .unwrap_or_else(|| MonthlyCategoryRecord::new(c.id, month))
        })
        .collect();

    MonthView {
        budget_id: ledger.budget_id(),
        month,
        groups,
        categories,
        records,
        available_to_budget: available_to_budget(ledger, month),
    }
}

/// Write-side envelope operations on a working copy of the ledger
pub struct EnvelopeService<'a> {
    ledger: &'a mut LedgerData,
}

impl<'a> EnvelopeService<'a> {
    pub fn new(ledger: &'a mut LedgerData) -> Self {
        Self { ledger }
    }

    /// Recompute a category's record chain.
    ///
    /// The chain covers the category's existing records, its earliest
    /// activity month and `through` (when given), with any gaps filled by
    /// zero-valued records. A category with neither records nor a requested
    /// month is left alone. The whole chain must lie inside the budget's
    /// month window.
    pub fn refresh_category(
        &mut self,
        category_id: &CategoryId,
        through: Option<Month>,
    ) -> EnvelopeResult<()> {
        let activity = activity_by_month(self.ledger, category_id);
        let span = self.ledger.record_span(category_id);

        let (first, last) = match (span, through) {
            (None, None) => return Ok(()),
            (Some((lo, hi)), None) => (lo, hi),
            (None, Some(m)) => (m, m),
            (Some((lo, hi)), Some(m)) => (lo.min(m), hi.max(m)),
        };
        let first = activity
            .keys()
            .next()
            .map_or(first, |earliest| first.min(*earliest));
        self.ledger.check_month(first)?;
        self.ledger.check_month(last)?;

        let mut prior = Money::zero();
        for month in first.through(last) {
            let month_activity = activity.get(&month).copied().unwrap_or_default();
            let record = self.ledger.monthly_records.entry(category_id, month);
            record.roll_forward(prior, month_activity);
            prior = record.available;
        }
        Ok(())
    }

    /// Refresh every category that is already tracked
    pub fn refresh_tracked<I>(&mut self, category_ids: I) -> EnvelopeResult<()>
    where
        I: IntoIterator<Item = CategoryId>,
    {
        for id in category_ids {
            if self.ledger.has_records(&id) {
                self.refresh_category(&id, None)?;
            }
        }
        Ok(())
    }

    /// Give every category a record for `month`
    pub fn materialize_month(&mut self, month: Month) -> EnvelopeResult<()> {
        self.ledger.check_month(month)?;
        let ids: Vec<CategoryId> = self.ledger.categories.iter().map(|c| c.id).collect();
        for id in ids {
            if self.ledger.record(&id, month).is_none() {
                self.refresh_category(&id, Some(month))?;
            }
        }
        Ok(())
    }

    /// Add `delta` to `assigned(category, month)` and roll the change forward
    pub fn assign(&mut self, category_id: &CategoryId, month: Month, delta: Money) -> EnvelopeResult<()> {
        let name = self.ledger.category(category_id)?.name.clone();
        if !delta.is_in_range() {
            return Err(EnvelopeError::InvalidArgument(format!(
                "assignment of {} is outside the supported range",
                delta
            )));
        }

        self.refresh_category(category_id, Some(month))?;
        let before = self
            .ledger
            .record(category_id, month)
            .cloned()
            .unwrap_or_else(|| MonthlyCategoryRecord::new(*category_id, month));

        let assigned = before.assigned.checked_add(delta).ok_or_else(|| {
            EnvelopeError::InvalidArgument(format!("assigned amount overflows for {}", name))
        })?;
        if let Some(record) = self.ledger.record_mut(category_id, month) {
            record.assigned = assigned;
        }
        self.refresh_category(category_id, Some(month))?;

        if let Some(after) = self.ledger.record(category_id, month).cloned() {
            self.ledger.log_update(
                EntityType::MonthlyCategoryRecord,
                format!("{}:{}", category_id, month),
                Some(name),
                &before,
                &after,
            );
        }
        Ok(())
    }

    /// Move assigned money between two categories in the same month
    pub fn move_between_categories(
        &mut self,
        from: &CategoryId,
        to: &CategoryId,
        month: Month,
        amount: Money,
    ) -> EnvelopeResult<()> {
        require_positive(amount)?;
        if from == to {
            return Err(EnvelopeError::InvalidArgument(
                "Cannot move money to the same category".into(),
            ));
        }
        self.ledger.category(to)?;
        self.assign(from, month, -amount)?;
        self.assign(to, month, amount)
    }

    /// Move assigned money for one category from one month to another
    pub fn move_between_months(
        &mut self,
        category_id: &CategoryId,
        from: Month,
        to: Month,
        amount: Money,
    ) -> EnvelopeResult<()> {
        require_positive(amount)?;
        if from == to {
            return Err(EnvelopeError::InvalidArgument(
                "Source and destination months are the same".into(),
            ));
        }
        self.assign(category_id, from, -amount)?;
        self.assign(category_id, to, amount)
    }
}

fn require_positive(amount: Money) -> EnvelopeResult<()> {
    if !amount.is_positive() {
        return Err(EnvelopeError::InvalidArgument(
            "Amount to move must be positive".into(),
        ));
    }
    Ok(())
}
