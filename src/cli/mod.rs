//! CLI command handlers
//!
//! Each handler turns parsed arguments into an api [`Command`], runs it
//! through the engine and prints the result, either as a table or as JSON.

pub mod account;
pub mod audit;
pub mod budget;
pub mod category;
pub mod config;
pub mod credit;
pub mod envelope;
pub mod payee;
pub mod reconcile;
pub mod transaction;

pub use account::{handle_account_command, AccountCommands};
pub use audit::handle_audit_command;
pub use budget::{handle_budget_command, handle_init, BudgetCommands};
pub use category::{handle_category_command, CategoryCommands};
pub use config::{handle_config_command, ConfigCommands};
pub use credit::handle_debt_command;
pub use envelope::{handle_assign_command, handle_month_command, handle_move_command, MoveCommands};
pub use payee::handle_payee_command;
pub use reconcile::handle_reconcile_command;
pub use transaction::{handle_transaction_command, handle_transfer_command, TransactionCommands};

use chrono::NaiveDate;

use crate::api::{Command, CommandOutput};
use crate::display;
use crate::engine::Engine;
use crate::error::{EnvelopeError, EnvelopeResult};
use crate::models::{AccountId, BudgetId, CategoryGroupId, CategoryId, Money, Month, TransactionId};
use crate::storage::LedgerStore;

/// What every handler needs: the engine, the selected budget and the output mode
pub struct Context<'a, S: LedgerStore> {
    pub engine: &'a Engine<S>,
    /// Budget name or id given with `--budget`
    pub budget: Option<&'a str>,
    pub json: bool,
}

impl<'a, S: LedgerStore> Context<'a, S> {
    /// The selected budget, or the only budget when none was named
    pub fn budget_id(&self) -> EnvelopeResult<BudgetId> {
        if let Some(identifier) = self.budget {
            return Ok(self.engine.find_budget(identifier)?.id);
        }

        let budgets = self.engine.list_budgets()?;
        match budgets.as_slice() {
            [only] => Ok(only.id),
            [] => Err(EnvelopeError::InvalidArgument(
                "No budget exists yet. Run 'envelope init' first.".into(),
            )),
            _ => Err(EnvelopeError::InvalidArgument(
                "Several budgets exist; choose one with --budget".into(),
            )),
        }
    }

    pub fn account_id(&self, budget_id: &BudgetId, identifier: &str) -> EnvelopeResult<AccountId> {
        Ok(self.engine.find_account(budget_id, identifier)?.id)
    }

    pub fn category_id(&self, budget_id: &BudgetId, identifier: &str) -> EnvelopeResult<CategoryId> {
        Ok(self.engine.find_category(budget_id, identifier)?.id)
    }

    pub fn group_id(&self, budget_id: &BudgetId, identifier: &str) -> EnvelopeResult<CategoryGroupId> {
        Ok(self.engine.find_group(budget_id, identifier)?.id)
    }

    pub fn transaction_id(&self, budget_id: &BudgetId, identifier: &str) -> EnvelopeResult<TransactionId> {
        Ok(self.engine.find_transaction(budget_id, identifier)?.id)
    }

    /// Execute `command` and print its output
    pub fn run(&self, command: Command) -> EnvelopeResult<CommandOutput> {
        let output = self.engine.execute(command)?;
        self.print(&output)?;
        Ok(output)
    }

    pub fn print(&self, output: &CommandOutput) -> EnvelopeResult<()> {
        if self.json {
            println!("{}", serde_json::to_string_pretty(output)?);
        } else {
            print!("{}", display::render(output));
        }
        Ok(())
    }
}

/// Parse a decimal amount such as "42.50" or "-1,200"
pub fn parse_amount(input: &str) -> EnvelopeResult<Money> {
    Ok(Money::parse(input)?)
}

/// Parse YYYY-MM-DD, defaulting to today
pub fn parse_date_or_today(input: Option<&str>) -> EnvelopeResult<NaiveDate> {
    match input {
        Some(s) => parse_date(s),
        None => Ok(chrono::Local::now().date_naive()),
    }
}

pub fn parse_date(input: &str) -> EnvelopeResult<NaiveDate> {
    NaiveDate::parse_from_str(input.trim(), "%Y-%m-%d").map_err(|_| {
        EnvelopeError::InvalidArgument(format!(
            "Invalid date format: '{}'. Use YYYY-MM-DD",
            input
        ))
    })
}

/// Parse YYYY-MM (or YYYY-MM-01), defaulting to the current month
pub fn parse_month_or_current(input: Option<&str>) -> EnvelopeResult<Month> {
    match input {
        Some(s) => s.parse(),
        None => Ok(Month::containing(chrono::Local::now().date_naive())),
    }
}
