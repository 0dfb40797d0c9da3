//! Budget display formatting

use tabled::settings::Style;
use tabled::{Table, Tabled};

use crate::models::Budget;

#[derive(Tabled)]
struct BudgetRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Currency")]
    currency: String,
    #[tabled(rename = "Start")]
    start: String,
}

pub fn format_budget_list(budgets: &[Budget]) -> String {
    if budgets.is_empty() {
        return "No budgets yet. Run 'envelope init' to create one.\n".to_string();
    }

    let rows = budgets.iter().map(|b| BudgetRow {
        id: b.id.short(),
        name: b.name.clone(),
        currency: b.currency.clone(),
        start: b.start_month.first_day().format("%B %Y").to_string(),
    });

    let mut table = Table::new(rows);
    table.with(Style::psql());
    format!("{}\n", table)
}

pub fn format_budget(budget: &Budget) -> String {
    let mut output = String::new();
    output.push_str(&format!("Budget: {}\n", budget.name));
    output.push_str(&format!("  ID:       {}\n", budget.id));
    output.push_str(&format!("  Currency: {}\n", budget.currency));
    output.push_str(&format!(
        "  Starts:   {}\n",
        budget.start_month.first_day().format("%B %Y")
    ));
    output
}
