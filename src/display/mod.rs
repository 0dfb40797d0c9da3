//! Display formatting for terminal output
//!
//! Lists render as tables; single entities render as indented detail blocks.

pub mod account;
pub mod budget;
pub mod category;
pub mod debt;
pub mod month;
pub mod transaction;

use crate::api::CommandOutput;

/// Human-readable rendering of a command result
pub fn render(output: &CommandOutput) -> String {
    match output {
        CommandOutput::Budget(b) => budget::format_budget(b),
        CommandOutput::Budgets(list) => budget::format_budget_list(list),
        CommandOutput::Account(a) => account::format_account(a),
        CommandOutput::Accounts(list) => {
            if list.is_empty() {
                return "No accounts found.\n".to_string();
            }
            list.iter().map(account::format_account).collect()
        }
        CommandOutput::AccountSummary(s) => account::format_account_details(s),
        CommandOutput::AccountSummaries(list) => account::format_account_list(list),
        CommandOutput::Transaction(t) => transaction::format_transaction_details(t),
        CommandOutput::Transactions(list) => transaction::format_transaction_register(list),
        CommandOutput::DeletedTransactions(list) => transaction::format_deleted(list),
        CommandOutput::Transfer(t) => transaction::format_transfer(t),
        CommandOutput::MonthView(v) => month::format_month_view(v),
        CommandOutput::Group(g) => category::format_group(g),
        CommandOutput::DeletedGroup(g) => format!("Deleted category group: {}\n", g.name),
        CommandOutput::Category(c) => category::format_category(c),
        CommandOutput::DeletedCategory(c) => format!("Deleted category: {}\n", c.name),
        CommandOutput::DebtSync(o) => debt::format_debt_sync(o),
        CommandOutput::DebtBalance(b) => debt::format_debt_balance(b),
        CommandOutput::DebtBalances(list) => debt::format_debt_balances(list),
        CommandOutput::Reconciliation(o) => debt::format_reconciliation(o),
        CommandOutput::Payees(list) => debt::format_payees(list),
    }
}
