//! Account CLI commands
//!
//! Implements CLI commands for account management.

use clap::Subcommand;

use super::Context;
use crate::api::Command;
use crate::error::{EnvelopeError, EnvelopeResult};
use crate::models::AccountType;
use crate::services::AccountPatch;
use crate::storage::LedgerStore;

/// Account subcommands
#[derive(Subcommand)]
pub enum AccountCommands {
    /// Create a new account
    Create {
        /// Account name
        name: String,
        /// Account type (checking, savings, cash, credit, asset, liability)
        #[arg(short = 't', long, default_value = "checking")]
        account_type: String,
        /// Mark as off-budget
        #[arg(long)]
        off_budget: bool,
    },
    /// List all accounts with balances
    List,
    /// Show account details
    Show {
        /// Account name or ID
        account: String,
    },
    /// Edit an account
    Edit {
        /// Account name or ID
        account: String,
        /// New name
        #[arg(short, long)]
        name: Option<String>,
        /// Move the account on budget
        #[arg(long, conflicts_with = "off_budget")]
        on_budget: bool,
        /// Move the account off budget
        #[arg(long)]
        off_budget: bool,
        /// Free-form notes
        #[arg(long)]
        notes: Option<String>,
    },
}

pub fn handle_account_command<S: LedgerStore>(ctx: &Context<'_, S>, cmd: AccountCommands) -> EnvelopeResult<()> {
    let budget_id = ctx.budget_id()?;

    match cmd {
        AccountCommands::Create {
            name,
            account_type,
            off_budget,
        } => {
            let account_type = AccountType::parse(&account_type).ok_or_else(|| {
                EnvelopeError::InvalidArgument(format!(
                    "Invalid account type: '{}'. Valid types: checking, savings, cash, credit, asset, liability",
                    account_type
                ))
            })?;
            ctx.run(Command::CreateAccount {
                budget_id,
                name,
                account_type,
                on_budget: !off_budget,
            })?;
        }

        AccountCommands::List => {
            ctx.run(Command::ListAccountsWithBalances { budget_id })?;
        }

        AccountCommands::Show { account } => {
            let account_id = ctx.account_id(&budget_id, &account)?;
            ctx.run(Command::AccountBalance {
                budget_id,
                account_id,
            })?;
        }

        AccountCommands::Edit {
            account,
            name,
            on_budget,
            off_budget,
            notes,
        } => {
            let account_id = ctx.account_id(&budget_id, &account)?;
            let patch = AccountPatch {
                name,
                on_budget: match (on_budget, off_budget) {
                    (true, _) => Some(true),
                    (_, true) => Some(false),
                    _ => None,
                },
                notes,
            };
            if patch == AccountPatch::default() {
                println!("No changes specified. Use --name, --on-budget, --off-budget or --notes.");
                return Ok(());
            }
            ctx.run(Command::UpdateAccount {
                budget_id,
                account_id,
                patch,
            })?;
        }
    }

    Ok(())
}
