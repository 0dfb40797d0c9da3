//! Month view formatting
//!
//! Renders the budget screen: Available to Budget on top, then one row per
//! visible category grouped under its category group.

use tabled::settings::Style;
use tabled::{Table, Tabled};

use crate::models::Money;
use crate::services::{AvailableToBudget, MonthView};

#[derive(Tabled)]
struct EnvelopeRow {
    #[tabled(rename = "Category")]
    name: String,
    #[tabled(rename = "Assigned")]
    assigned: String,
    #[tabled(rename = "Activity")]
    activity: String,
    #[tabled(rename = "Available")]
    available: String,
}

impl EnvelopeRow {
    fn group(name: &str) -> Self {
        Self {
            name: name.to_uppercase(),
            assigned: String::new(),
            activity: String::new(),
            available: String::new(),
        }
    }

    fn category(name: &str, assigned: Money, activity: Money, available: Money) -> Self {
        let flag = if available.is_negative() { " !" } else { "" };
        Self {
            name: format!("  {}", name),
            assigned: assigned.to_string(),
            activity: activity.to_string(),
            available: format!("{}{}", available, flag),
        }
    }
}

pub fn format_available_to_budget(atb: &AvailableToBudget) -> String {
    let mut output = String::new();
    output.push_str(&format!("  Income:                 {:>12}\n", atb.income.to_string()));
    output.push_str(&format!(
        "  Not budgeted last month: {:>11}\n",
        atb.not_budgeted_last_month.to_string()
    ));
    output.push_str(&format!(
        "  Overspent last month:   {:>12}\n",
        atb.overspent_last_month.to_string()
    ));
    output.push_str(&format!("  Assigned this month:    {:>12}\n", (-atb.assigned).to_string()));
    output.push_str(&format!("  Available to Budget:    {:>12}\n", atb.available.to_string()));
    output
}

pub fn format_month_view(view: &MonthView) -> String {
    let mut output = String::new();
    output.push_str(&format!(
        "Budget for {}\n\n",
        view.month.first_day().format("%B %Y")
    ));
    output.push_str(&format_available_to_budget(&view.available_to_budget));
    output.push('\n');

    let mut rows = Vec::new();
    for group in &view.groups {
        let visible: Vec<_> = view
            .categories
            .iter()
            .filter(|c| c.group_id == group.id && !c.hidden)
            .collect();
        if visible.is_empty() {
            continue;
        }

        rows.push(EnvelopeRow::group(&group.name));
        for category in visible {
            let (assigned, activity, available) = view
                .record_for(&category.id)
                .map(|r| (r.assigned, r.activity, r.available))
                .unwrap_or_default();
            rows.push(EnvelopeRow::category(&category.name, assigned, activity, available));
        }
    }

    if rows.is_empty() {
        output.push_str("No categories yet. Create one with 'envelope category create'.\n");
        return output;
    }

    let mut table = Table::new(rows);
    table.with(Style::psql());
    output.push_str(&table.to_string());
    output.push('\n');
    output
}
