//! Transaction display formatting
//!
//! Formats transactions for terminal output in register and detail views.

use tabled::settings::Style;
use tabled::{Table, Tabled};

use crate::models::{Transaction, TransactionState};
use crate::services::TransferResult;

#[derive(Tabled)]
struct RegisterRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Date")]
    date: String,
    #[tabled(rename = "Payee")]
    payee: String,
    #[tabled(rename = "Amount")]
    amount: String,
    #[tabled(rename = "St")]
    state: &'static str,
    #[tabled(rename = "Memo")]
    memo: String,
}

fn state_marker(state: TransactionState) -> &'static str {
    match state {
        TransactionState::Uncleared => "",
        TransactionState::Cleared => "C",
        TransactionState::Reconciled => "R",
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

/// Format transactions as a register table
pub fn format_transaction_register(transactions: &[Transaction]) -> String {
    if transactions.is_empty() {
        return "No transactions found.\n".to_string();
    }

    let rows = transactions.iter().map(|txn| RegisterRow {
        id: txn.id.short(),
        date: txn.date.to_string(),
        payee: truncate(&txn.payee_name, 28),
        amount: txn.amount.to_string(),
        state: state_marker(txn.state),
        memo: if txn.subtransactions.len() > 1 {
            format!("[{} splits] {}", txn.subtransactions.len(), truncate(&txn.memo, 20))
        } else {
            truncate(&txn.memo, 30)
        },
    });

    let mut table = Table::new(rows);
    table.with(Style::psql());
    format!("{}\n", table)
}

/// Format a single transaction's details
pub fn format_transaction_details(txn: &Transaction) -> String {
    let mut output = String::new();

    output.push_str(&format!("Transaction: {}\n", txn.id));
    output.push_str(&format!("  Date:     {}\n", txn.date));
    output.push_str(&format!("  Amount:   {}\n", txn.amount));
    output.push_str(&format!("  State:    {}\n", txn.state));
    output.push_str(&format!("  Account:  {}\n", txn.account_id));

    if !txn.payee_name.is_empty() {
        output.push_str(&format!("  Payee:    {}\n", txn.payee_name));
    }
    if !txn.memo.is_empty() {
        output.push_str(&format!("  Memo:     {}\n", txn.memo));
    }
    if let Some(month) = txn.income_month {
        output.push_str(&format!(
            "  Income for: {}\n",
            month.first_day().format("%B %Y")
        ));
    }
    if let Some(other) = txn.transfer_account_id {
        output.push_str(&format!("  Transfer with account {}\n", other));
    }

    if !txn.subtransactions.is_empty() {
        output.push_str("  Splits:\n");
        for split in &txn.subtransactions {
            let category = split
                .category_id
                .map(|c| c.short())
                .unwrap_or_else(|| "(uncategorized)".to_string());
            output.push_str(&format!("    {:<14} {:>12}", category, split.amount.to_string()));
            if !split.memo.is_empty() {
                output.push_str(&format!("  {}", split.memo));
            }
            output.push('\n');
        }
    }

    output
}

pub fn format_transfer(result: &TransferResult) -> String {
    let from = &result.from_transaction;
    let to = &result.to_transaction;
    format!(
        "Transferred {} on {}\n  {}  {}\n  {}  {}\n",
        to.amount,
        from.date,
        from.id.short(),
        from.payee_name,
        to.id.short(),
        to.payee_name
    )
}

pub fn format_deleted(transactions: &[Transaction]) -> String {
    let mut output = String::new();
    for txn in transactions {
        output.push_str(&format!(
            "Deleted transaction {} ({} on {})\n",
            txn.id.short(),
            txn.amount,
            txn.date
        ));
    }
    output
}
