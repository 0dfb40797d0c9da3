//! Credit debt, reconciliation and payee formatting

use tabled::settings::Style;
use tabled::{Table, Tabled};

use crate::models::{Money, Payee};
use crate::services::{DebtBalance, DebtSyncOutcome, ReconcileOutcome};

#[derive(Tabled)]
struct DebtRow {
    #[tabled(rename = "Card")]
    name: String,
    #[tabled(rename = "Balance")]
    balance: Money,
    #[tabled(rename = "Assigned")]
    assigned: Money,
    #[tabled(rename = "Payments")]
    payments: Money,
    #[tabled(rename = "Debt")]
    debt: Money,
}

pub fn format_debt_balances(balances: &[DebtBalance]) -> String {
    if balances.is_empty() {
        return "No credit accounts.\n".to_string();
    }

    let rows = balances.iter().map(|b| DebtRow {
        name: b.account_name.clone(),
        balance: b.account_balance,
        assigned: b.assigned,
        payments: b.payments,
        debt: b.debt_balance,
    });

    let mut table = Table::new(rows);
    table.with(Style::psql());
    format!("{}\n", table)
}

pub fn format_debt_balance(balance: &DebtBalance) -> String {
    let mut output = String::new();
    output.push_str(&format!(
        "{} ({})\n",
        balance.account_name,
        balance.month.first_day().format("%B %Y")
    ));
    output.push_str(&format!("  Account Balance:  {}\n", balance.account_balance));
    output.push_str(&format!("  Assigned:         {}\n", balance.assigned));
    output.push_str(&format!("  Payments:         {}\n", balance.payments));
    output.push_str(&format!("  Debt Balance:     {}\n", balance.debt_balance));
    if balance.payment_category_id.is_none() {
        output.push_str("  (no payment category; run 'envelope debt --sync')\n");
    }
    output
}

pub fn format_debt_sync(outcome: &DebtSyncOutcome) -> String {
    if outcome.created_categories.is_empty() && !outcome.group_created {
        return "Payment categories are up to date.\n".to_string();
    }
    let mut output = String::new();
    if outcome.group_created {
        output.push_str("Created the credit card payment group.\n");
    }
    output.push_str(&format!(
        "Created {} payment categor{}.\n",
        outcome.created_categories.len(),
        if outcome.created_categories.len() == 1 { "y" } else { "ies" }
    ));
    output
}

pub fn format_reconciliation(outcome: &ReconcileOutcome) -> String {
    let mut output = String::new();
    output.push_str(&format!("Reconciled through {}\n", outcome.statement_date));
    output.push_str(&format!("  Statement Balance: {}\n", outcome.statement_balance));
    output.push_str(&format!("  Ledger Balance:    {}\n", outcome.previous_balance));
    if outcome.diff.is_zero() {
        output.push_str("  Balanced.\n");
    } else {
        output.push_str(&format!("  Adjustment:        {}\n", outcome.diff));
    }
    output.push_str(&format!(
        "  {} transaction(s) marked reconciled\n",
        outcome.reconciled_count
    ));
    output
}

pub fn format_payees(payees: &[Payee]) -> String {
    if payees.is_empty() {
        return "No payees found.\n".to_string();
    }
    let mut output = String::new();
    for payee in payees {
        output.push_str(&payee.name);
        output.push('\n');
    }
    output
}
