//! Payee lookup for autocomplete

use crate::config::Settings;
use crate::models::Payee;
use crate::storage::LedgerData;

/// Payees whose name contains `query` (case-insensitive), sorted by name
pub fn list_payees(ledger: &LedgerData, settings: &Settings, query: Option<&str>) -> Vec<Payee> {
    let query = query.map(str::trim).filter(|q| !q.is_empty());
    let mut payees: Vec<Payee> = ledger
        .payees
        .iter()
        .filter(|p| query.map_or(true, |q| p.matches_query(q)))
        .cloned()
        .collect();
    payees.sort_by_key(|p| p.name.to_lowercase());
    payees.truncate(settings.payee_search_limit);
    payees
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Budget, Month};

    #[test]
    fn test_search_and_limit() {
        let mut ledger = LedgerData::new(Budget::new("Test", "USD", Month::new(2024, 1).unwrap()));
        for name in ["Whole Foods", "Gas Station", "food truck", "Landlord"] {
            ledger.get_or_create_payee(name).unwrap();
        }
        let mut settings = Settings::default();

        let names: Vec<String> = list_payees(&ledger, &settings, Some("FOOD"))
            .into_iter()
            .map(|p| p.name)
            .collect();
        assert_eq!(names, vec!["food truck", "Whole Foods"]);

        assert_eq!(list_payees(&ledger, &settings, None).len(), 4);
        settings.payee_search_limit = 2;
        let capped = list_payees(&ledger, &settings, Some(" "));
        assert_eq!(capped.len(), 2);
        assert_eq!(capped[0].name, "food truck");
    }
}
