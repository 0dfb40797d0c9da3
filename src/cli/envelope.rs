//! Envelope commands: the month screen, assigning and moving money

use clap::Subcommand;

use super::{parse_amount, parse_month_or_current, Context};
use crate::api::Command;
use crate::error::EnvelopeResult;
use crate::storage::LedgerStore;

#[derive(Subcommand)]
pub enum MoveCommands {
    /// Move money between two categories within a month
    Categories {
        /// Source category name or ID
        from: String,
        /// Destination category name or ID
        to: String,
        /// Amount to move (e.g., "25.00")
        amount: String,
        /// Month (YYYY-MM, defaults to current)
        #[arg(short, long)]
        month: Option<String>,
    },
    /// Move one category's assignment from one month to another
    Months {
        /// Category name or ID
        category: String,
        /// Source month (YYYY-MM)
        from: String,
        /// Destination month (YYYY-MM)
        to: String,
        /// Amount to move (e.g., "25.00")
        amount: String,
    },
}

/// Show the envelopes of one month
pub fn handle_month_command<S: LedgerStore>(ctx: &Context<'_, S>, month: Option<String>) -> EnvelopeResult<()> {
    let budget_id = ctx.budget_id()?;
    let month = parse_month_or_current(month.as_deref())?;
    ctx.run(Command::MonthView {
        budget_id,
        month: month.into(),
    })?;
    Ok(())
}

/// Add (or with a negative amount, remove) money in a category
pub fn handle_assign_command<S: LedgerStore>(
    ctx: &Context<'_, S>,
    category: String,
    amount: String,
    month: Option<String>,
) -> EnvelopeResult<()> {
    let budget_id = ctx.budget_id()?;
    let category_id = ctx.category_id(&budget_id, &category)?;
    let month = parse_month_or_current(month.as_deref())?;
    ctx.run(Command::Assign {
        budget_id,
        category_id,
        month: month.into(),
        amount: parse_amount(&amount)?,
    })?;
    Ok(())
}

pub fn handle_move_command<S: LedgerStore>(ctx: &Context<'_, S>, cmd: MoveCommands) -> EnvelopeResult<()> {
    let budget_id = ctx.budget_id()?;

    match cmd {
        MoveCommands::Categories {
            from,
            to,
            amount,
            month,
        } => {
            let from_category_id = ctx.category_id(&budget_id, &from)?;
            let to_category_id = ctx.category_id(&budget_id, &to)?;
            let month = parse_month_or_current(month.as_deref())?;
            ctx.run(Command::MoveBetweenCategories {
                budget_id,
                from_category_id,
                to_category_id,
                month: month.into(),
                amount: parse_amount(&amount)?,
            })?;
        }
        MoveCommands::Months {
            category,
            from,
            to,
            amount,
        } => {
            let category_id = ctx.category_id(&budget_id, &category)?;
            let from_month = parse_month_or_current(Some(from.as_str()))?;
            let to_month = parse_month_or_current(Some(to.as_str()))?;
            ctx.run(Command::MoveBetweenMonths {
                budget_id,
                category_id,
                from_month: from_month.into(),
                to_month: to_month.into(),
                amount: parse_amount(&amount)?,
            })?;
        }
    }
    Ok(())
}
