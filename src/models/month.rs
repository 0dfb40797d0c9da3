//! Calendar month keyed by its first day
//!
//! Months cross every boundary as the ISO date of their first day
//! (`2024-03-01`). Callers that pass a month must pass exactly that form;
//! [`Month::containing`] is for places that derive a month from an arbitrary
//! date (a transaction's posting month, a budget's start month).

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::EnvelopeError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "NaiveDate", into = "NaiveDate")]
pub struct Month(NaiveDate);

impl Month {
    /// Earliest month chrono can represent
    pub const MIN: Month = Month(NaiveDate::MIN);

    /// Accept a first-of-month date, reject anything else
    pub fn from_first_day(date: NaiveDate) -> Result<Self, EnvelopeError> {
        if date.day() != 1 {
            return Err(EnvelopeError::InvalidArgument(format!(
                "month must be a first-of-month date, got {}",
                date
            )));
        }
        Ok(Self(date))
    }

    /// The month a date falls in
    pub fn containing(date: NaiveDate) -> Self {
        Self(date.with_day(1).unwrap_or(date))
    }

    pub fn new(year: i32, month: u32) -> Result<Self, EnvelopeError> {
        NaiveDate::from_ymd_opt(year, month, 1)
            .map(Self)
            .ok_or_else(|| EnvelopeError::InvalidArgument(format!("no such month: {}-{}", year, month)))
    }

    pub fn first_day(&self) -> NaiveDate {
        self.0
    }

    pub fn last_day(&self) -> NaiveDate {
        self.checked_next()
            .and_then(|next| next.0.pred_opt())
            .unwrap_or(NaiveDate::MAX)
    }

    pub fn year(&self) -> i32 {
        self.0.year()
    }

    pub fn month(&self) -> u32 {
        self.0.month()
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date.year() == self.0.year() && date.month() == self.0.month()
    }

    /// The following month, `None` past the last representable month
    pub fn checked_next(&self) -> Option<Self> {
        let (year, month) = if self.month() == 12 {
            (self.year().checked_add(1)?, 1)
        } else {
            (self.year(), self.month() + 1)
        };
        NaiveDate::from_ymd_opt(year, month, 1).map(Self)
    }

    /// The preceding month, `None` before the first representable month
    pub fn checked_prev(&self) -> Option<Self> {
        let (year, month) = if self.month() == 1 {
            (self.year().checked_sub(1)?, 12)
        } else {
            (self.year(), self.month() - 1)
        };
        NaiveDate::from_ymd_opt(year, month, 1).map(Self)
    }

    /// The following month; stays put at the last representable month
    pub fn next(&self) -> Self {
        self.checked_next().unwrap_or(*self)
    }

    /// The preceding month; stays put at the first representable month
    pub fn prev(&self) -> Self {
        self.checked_prev().unwrap_or(*self)
    }

    /// Whole months from `self` to `other` (negative when `other` is earlier)
    pub fn months_until(&self, other: Month) -> i64 {
        (i64::from(other.year()) - i64::from(self.year())) * 12
            + (i64::from(other.month()) - i64::from(self.month()))
    }

    /// Every month from `self` through `end` inclusive
    pub fn through(self, end: Month) -> impl Iterator<Item = Month> {
        std::iter::successors(Some(self), |m| m.checked_next()).take_while(move |m| *m <= end)
    }
}

impl fmt::Display for Month {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%d"))
    }
}

impl FromStr for Month {
    type Err = EnvelopeError;

    /// Parses `YYYY-MM-01`; `YYYY-MM` is accepted as shorthand
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
            return Self::from_first_day(date);
        }
        NaiveDate::parse_from_str(&format!("{}-01", s), "%Y-%m-%d")
            .map(Self)
            .map_err(|_| EnvelopeError::InvalidArgument(format!("invalid month: {}", s)))
    }
}

impl TryFrom<NaiveDate> for Month {
    type Error = EnvelopeError;

    fn try_from(date: NaiveDate) -> Result<Self, Self::Error> {
        Self::from_first_day(date)
    }
}

impl From<Month> for NaiveDate {
    fn from(month: Month) -> Self {
        month.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_from_first_day() {
        assert!(Month::from_first_day(date(2024, 3, 1)).is_ok());
        let err = Month::from_first_day(date(2024, 3, 15)).unwrap_err();
        assert!(err.is_invalid_argument());
    }

    #[test]
    fn test_containing() {
        assert_eq!(
            Month::containing(date(2024, 3, 31)),
            Month::new(2024, 3).unwrap()
        );
    }

    #[test]
    fn test_navigation() {
        let dec = Month::new(2023, 12).unwrap();
        assert_eq!(dec.next(), Month::new(2024, 1).unwrap());
        assert_eq!(dec.next().prev(), dec);
        assert_eq!(dec.last_day(), date(2023, 12, 31));
        assert_eq!(Month::new(2024, 2).unwrap().last_day(), date(2024, 2, 29));
    }

    #[test]
    fn test_through() {
        let start = Month::new(2023, 11).unwrap();
        let end = Month::new(2024, 2).unwrap();
        let months: Vec<String> = start.through(end).map(|m| m.to_string()).collect();
        assert_eq!(
            months,
            vec!["2023-11-01", "2023-12-01", "2024-01-01", "2024-02-01"]
        );
        assert_eq!(end.through(start).count(), 0);
        assert_eq!(start.through(start).count(), 1);
    }

    #[test]
    fn test_iteration_stops_at_representable_edge() {
        let last = Month::containing(NaiveDate::MAX);
        assert!(last.checked_next().is_none());
        assert_eq!(last.next(), last);
        assert_eq!(last.through(last).take(5).count(), 1);
        assert_eq!(last.prev().through(last).count(), 2);
        assert_eq!(last.last_day(), NaiveDate::MAX);

        assert!(Month::MIN.checked_prev().is_none());
        assert_eq!(Month::MIN.prev(), Month::MIN);
    }

    #[test]
    fn test_months_until() {
        let start = Month::new(2023, 11).unwrap();
        assert_eq!(start.months_until(Month::new(2024, 2).unwrap()), 3);
        assert_eq!(Month::new(2024, 2).unwrap().months_until(start), -3);
        assert_eq!(start.months_until(start), 0);
    }

    #[test]
    fn test_parse() {
        assert_eq!("2024-03-01".parse::<Month>().unwrap().to_string(), "2024-03-01");
        assert_eq!("2024-03".parse::<Month>().unwrap().to_string(), "2024-03-01");
        assert!("2024-03-02".parse::<Month>().is_err());
        assert!("March".parse::<Month>().is_err());
    }

    #[test]
    fn test_serde_rejects_mid_month() {
        let m: Month = serde_json::from_str("\"2024-03-01\"").unwrap();
        assert_eq!(serde_json::to_string(&m).unwrap(), "\"2024-03-01\"");
        assert!(serde_json::from_str::<Month>("\"2024-03-09\"").is_err());
    }
}
