//! Account display formatting
//!
//! Formats accounts for terminal output in table and detail views.

use tabled::settings::Style;
use tabled::{Table, Tabled};

use crate::models::{Account, Money};
use crate::services::AccountSummary;

#[derive(Tabled)]
struct AccountRow {
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Type")]
    account_type: String,
    #[tabled(rename = "Balance")]
    balance: Money,
    #[tabled(rename = "Cleared")]
    cleared: Money,
    #[tabled(rename = "Status")]
    status: String,
}

/// Format a list of accounts with balances as a table
pub fn format_account_list(summaries: &[AccountSummary]) -> String {
    if summaries.is_empty() {
        return "No accounts found.\n".to_string();
    }

    let mut rows: Vec<AccountRow> = summaries
        .iter()
        .map(|s| AccountRow {
            name: s.account.name.clone(),
            account_type: s.account.account_type.to_string(),
            balance: s.balance,
            cleared: s.cleared_balance,
            status: if !s.account.on_budget {
                "Off-Budget".to_string()
            } else if s.uncleared_count > 0 {
                format!("{} pending", s.uncleared_count)
            } else {
                String::new()
            },
        })
        .collect();

    rows.push(AccountRow {
        name: "TOTAL".to_string(),
        account_type: String::new(),
        balance: summaries.iter().map(|s| s.balance).sum(),
        cleared: summaries.iter().map(|s| s.cleared_balance).sum(),
        status: String::new(),
    });

    let mut table = Table::new(rows);
    table.with(Style::psql());
    format!("{}\n", table)
}

/// Format a single account's details
pub fn format_account_details(summary: &AccountSummary) -> String {
    let account = &summary.account;

    let mut output = format_account(account);
    output.push('\n');
    output.push_str(&format!("  Current Balance:  {}\n", summary.balance));
    output.push_str(&format!("  Cleared Balance:  {}\n", summary.cleared_balance));
    output.push_str(&format!("  Uncleared Count:  {}\n", summary.uncleared_count));

    if let Some(date) = account.last_reconciled_date {
        output.push('\n');
        output.push_str(&format!("  Last Reconciled:  {}\n", date));
        if let Some(balance) = account.last_reconciled_balance {
            output.push_str(&format!("  Reconciled Balance: {}\n", balance));
        }
    }

    output
}

pub fn format_account(account: &Account) -> String {
    let mut output = String::new();
    output.push_str(&format!("Account: {}\n", account.name));
    output.push_str(&format!("  Type:           {}\n", account.account_type));
    output.push_str(&format!("  ID:             {}\n", account.id));
    output.push_str(&format!(
        "  On Budget:      {}\n",
        if account.on_budget { "Yes" } else { "No" }
    ));
    if !account.notes.is_empty() {
        output.push_str(&format!("  Notes:          {}\n", account.notes));
    }
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AccountType, BudgetId};

    fn summary(name: &str, balance: i64, on_budget: bool) -> AccountSummary {
        let mut account = Account::new(BudgetId::new(), name, AccountType::Checking);
        account.on_budget = on_budget;
        AccountSummary {
            account,
            balance: Money::from_cents(balance),
            cleared_balance: Money::from_cents(balance),
            uncleared_count: 0,
        }
    }

    #[test]
    fn test_empty_list() {
        assert_eq!(format_account_list(&[]), "No accounts found.\n");
    }

    #[test]
    fn test_list_has_total() {
        let output = format_account_list(&[
            summary("Checking", 100000, true),
            summary("Brokerage", 50000, false),
        ]);
        assert!(output.contains("Checking"));
        assert!(output.contains("Off-Budget"));
        assert!(output.contains("TOTAL"));
        assert!(output.contains("1500.00"));
    }
}
