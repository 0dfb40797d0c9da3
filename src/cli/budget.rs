//! Budget CLI commands

use clap::Subcommand;

use super::{parse_date_or_today, Context};
use crate::api::Command;
use crate::error::EnvelopeResult;
use crate::services::NewBudget;
use crate::storage::LedgerStore;

/// Budget subcommands
#[derive(Subcommand)]
pub enum BudgetCommands {
    /// Create a new budget
    Create {
        /// Budget name
        name: String,
        /// Three-letter currency code (defaults to the configured currency)
        #[arg(short, long)]
        currency: Option<String>,
        /// Start date (YYYY-MM-DD); the budget starts on the first of that month
        #[arg(short, long)]
        start: Option<String>,
        /// Seed the default category groups
        #[arg(long)]
        defaults: bool,
    },
    /// List all budgets
    List,
    /// Show the selected budget
    Show,
}

pub fn handle_budget_command<S: LedgerStore>(ctx: &Context<'_, S>, cmd: BudgetCommands) -> EnvelopeResult<()> {
    match cmd {
        BudgetCommands::Create {
            name,
            currency,
            start,
            defaults,
        } => {
            ctx.run(Command::CreateBudget {
                budget: NewBudget {
                    name,
                    currency,
                    start_date: parse_date_or_today(start.as_deref())?,
                    with_defaults: defaults,
                },
            })?;
        }
        BudgetCommands::List => {
            ctx.run(Command::ListBudgets)?;
        }
        BudgetCommands::Show => {
            let budget_id = ctx.budget_id()?;
            ctx.run(Command::GetBudget { budget_id })?;
        }
    }
    Ok(())
}

/// First-run setup: one budget seeded with the default categories
pub fn handle_init<S: LedgerStore>(
    ctx: &Context<'_, S>,
    name: String,
    currency: Option<String>,
    no_defaults: bool,
) -> EnvelopeResult<()> {
    let budget = ctx.engine.create_budget(NewBudget {
        name,
        currency,
        start_date: chrono::Local::now().date_naive(),
        with_defaults: !no_defaults,
    })?;

    if ctx.json {
        ctx.print(&crate::api::CommandOutput::Budget(budget))?;
        return Ok(());
    }

    println!("Created budget: {} ({})", budget.name, budget.currency);
    println!("  ID: {}", budget.id);
    println!("  Starts: {}", budget.start_month);
    if !no_defaults {
        println!();
        println!("Default category groups have been created:");
        println!("  - Bills (Rent, Utilities, Phone)");
        println!("  - Needs (Groceries, Transportation, Medical)");
        println!("  - Wants (Dining Out, Entertainment)");
        println!("  - Savings (Emergency Fund, Vacation)");
    }
    println!();
    println!("Run 'envelope month' to see this month's envelopes.");
    Ok(())
}
