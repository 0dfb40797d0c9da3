//! Monthly category records keyed by category and month
//!
//! Stored on disk as a plain list; held in memory as an ordered map so a
//! record chain can be walked without rescanning every record per month.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::models::{CategoryId, Money, Month, MonthlyCategoryRecord};

type Key = (CategoryId, Month);

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<MonthlyCategoryRecord>", into = "Vec<MonthlyCategoryRecord>")]
pub struct MonthlyRecords(BTreeMap<Key, MonthlyCategoryRecord>);

impl MonthlyRecords {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, category_id: &CategoryId, month: Month) -> Option<&MonthlyCategoryRecord> {
        self.0.get(&(*category_id, month))
    }

    pub fn get_mut(
        &mut self,
        category_id: &CategoryId,
        month: Month,
    ) -> Option<&mut MonthlyCategoryRecord> {
        self.0.get_mut(&(*category_id, month))
    }

    /// The record for `(category, month)`, created zero-valued if missing
    pub fn entry(&mut self, category_id: &CategoryId, month: Month) -> &mut MonthlyCategoryRecord {
        self.0
            .entry((*category_id, month))
            .or_insert_with(|| MonthlyCategoryRecord::new(*category_id, month))
    }

    /// Insert or replace the record at its own key
    pub fn insert(&mut self, record: MonthlyCategoryRecord) {
        self.0.insert((record.category_id, record.month), record);
    }

    /// Records of one category, oldest month first
    pub fn for_category<'a>(
        &'a self,
        category_id: &'a CategoryId,
    ) -> impl Iterator<Item = &'a MonthlyCategoryRecord> + 'a {
        self.0
            .range((*category_id, Month::MIN)..)
            .take_while(move |((id, _), _)| id == category_id)
            .map(|(_, record)| record)
    }

    /// First and last month of a category's records
    pub fn span(&self, category_id: &CategoryId) -> Option<(Month, Month)> {
        let mut months = self.for_category(category_id).map(|r| r.month);
        let first = months.next()?;
        Some((first, months.last().unwrap_or(first)))
    }

    pub fn remove_category(&mut self, category_id: &CategoryId) {
        self.0.retain(|(id, _), _| id != category_id);
    }

    pub fn iter(&self) -> impl Iterator<Item = &MonthlyCategoryRecord> {
        self.0.values()
    }

    /// Records of every category for one month
    pub fn in_month(&self, month: Month) -> impl Iterator<Item = &MonthlyCategoryRecord> {
        self.0.values().filter(move |r| r.month == month)
    }

    /// Sum of `assigned` per month across all categories
    pub fn assigned_by_month(&self) -> BTreeMap<Month, Money> {
        let mut by_month = BTreeMap::new();
        for record in self.0.values() {
            *by_month.entry(record.month).or_default() += record.assigned;
        }
        by_month
    }
}

impl From<Vec<MonthlyCategoryRecord>> for MonthlyRecords {
    fn from(records: Vec<MonthlyCategoryRecord>) -> Self {
        Self(
            records
                .into_iter()
                .map(|r| ((r.category_id, r.month), r))
                .collect(),
        )
    }
}

impl From<MonthlyRecords> for Vec<MonthlyCategoryRecord> {
    fn from(records: MonthlyRecords) -> Self {
        records.0.into_values().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn month(m: u32) -> Month {
        Month::new(2024, m).unwrap()
    }

    #[test]
    fn test_span_and_category_isolation() {
        let mut records = MonthlyRecords::new();
        let groceries = CategoryId::new();
        let rent = CategoryId::new();
        assert!(records.span(&groceries).is_none());

        for m in [3, 1, 2] {
            records.entry(&groceries, month(m));
        }
        records.entry(&rent, month(7));

        assert_eq!(records.span(&groceries), Some((month(1), month(3))));
        assert_eq!(records.span(&rent), Some((month(7), month(7))));
        assert_eq!(records.for_category(&groceries).count(), 3);
        assert_eq!(records.in_month(month(1)).count(), 1);

        records.remove_category(&groceries);
        assert!(records.span(&groceries).is_none());
        assert_eq!(records.len(), 1);
    }

    #[test]
    fn test_entry_keeps_existing_record() {
        let mut records = MonthlyRecords::new();
        let id = CategoryId::new();
        records.entry(&id, month(2)).assigned = Money::from_cents(500);
        records.entry(&id, month(2));
        assert_eq!(records.get(&id, month(2)).unwrap().assigned.cents(), 500);
        assert_eq!(records.assigned_by_month()[&month(2)].cents(), 500);
    }

    #[test]
    fn test_serializes_as_list() {
        let mut records = MonthlyRecords::new();
        let id = CategoryId::new();
        records.entry(&id, month(1)).assigned = Money::from_cents(100);
        records.entry(&id, month(2));

        let json = serde_json::to_value(&records).unwrap();
        assert_eq!(json.as_array().unwrap().len(), 2);
        let back: MonthlyRecords = serde_json::from_value(json).unwrap();
        assert_eq!(back, records);
    }
}
