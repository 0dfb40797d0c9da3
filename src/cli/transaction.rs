//! Transaction CLI commands
//!
//! Implements CLI commands for transaction management and transfers.

use clap::Subcommand;

use super::{parse_amount, parse_date, parse_date_or_today, parse_month_or_current, Context};
use crate::api::{Command, CommandOutput};
use crate::error::{EnvelopeError, EnvelopeResult};
use crate::models::{BudgetId, Subtransaction, TransactionState};
use crate::services::{NewTransaction, TransactionFilter, TransactionPatch};
use crate::storage::LedgerStore;

/// Transaction subcommands
#[derive(Subcommand)]
pub enum TransactionCommands {
    /// Add a new transaction
    Add {
        /// Account name or ID
        account: String,
        /// Amount (e.g., "-50.00" for outflow, "100.00" for inflow)
        #[arg(allow_negative_numbers = true)]
        amount: String,
        /// Payee name
        #[arg(short, long)]
        payee: Option<String>,
        /// Category name or ID
        #[arg(short, long, conflicts_with = "split")]
        category: Option<String>,
        /// Split line as CATEGORY=AMOUNT; repeat for each line
        #[arg(short, long)]
        split: Vec<String>,
        /// Transaction date (YYYY-MM-DD), defaults to today
        #[arg(short, long)]
        date: Option<String>,
        /// Memo
        #[arg(short, long)]
        memo: Option<String>,
        /// Mark as cleared
        #[arg(long)]
        cleared: bool,
        /// Count this inflow as income for a month (YYYY-MM)
        #[arg(long)]
        income: Option<String>,
    },
    /// List transactions, newest first
    List {
        /// Filter by account name or ID
        #[arg(short, long)]
        account: Option<String>,
        /// Only transactions on or after this date (YYYY-MM-DD)
        #[arg(long)]
        since: Option<String>,
        /// Number of transactions to show
        #[arg(short, long)]
        limit: Option<usize>,
    },
    /// Show transaction details
    Show {
        /// Transaction ID (or its first 8 characters)
        id: String,
    },
    /// Edit a transaction
    Edit {
        /// Transaction ID
        id: String,
        /// New amount
        #[arg(short, long, allow_negative_numbers = true)]
        amount: Option<String>,
        /// New payee (empty to clear)
        #[arg(short, long)]
        payee: Option<String>,
        /// New category name or ID
        #[arg(short, long, conflicts_with = "uncategorize")]
        category: Option<String>,
        /// Remove the category
        #[arg(long)]
        uncategorize: bool,
        /// New date
        #[arg(short, long)]
        date: Option<String>,
        /// New memo
        #[arg(short, long)]
        memo: Option<String>,
        /// New state (uncleared, cleared, reconciled)
        #[arg(long)]
        state: Option<String>,
        /// Count as income for a month (YYYY-MM)
        #[arg(long, conflicts_with = "not_income")]
        income: Option<String>,
        /// Stop counting as income
        #[arg(long)]
        not_income: bool,
    },
    /// Delete a transaction (both legs of a transfer)
    Delete {
        /// Transaction ID
        id: String,
    },
    /// Clear a transaction (mark as cleared)
    Clear {
        /// Transaction ID
        id: String,
    },
    /// Unclear a transaction (mark as uncleared)
    Unclear {
        /// Transaction ID
        id: String,
    },
}

/// Handle a transaction command
pub fn handle_transaction_command<S: LedgerStore>(
    ctx: &Context<'_, S>,
    cmd: TransactionCommands,
) -> EnvelopeResult<()> {
    let budget_id = ctx.budget_id()?;

    match cmd {
        TransactionCommands::Add {
            account,
            amount,
            payee,
            category,
            split,
            date,
            memo,
            cleared,
            income,
        } => {
            let account_id = ctx.account_id(&budget_id, &account)?;
            let mut input = NewTransaction::new(
                account_id,
                parse_date_or_today(date.as_deref())?,
                parse_amount(&amount)?,
            );
            input.payee = payee;
            input.memo = memo;
            if cleared {
                input.state = TransactionState::Cleared;
            }
            if let Some(category) = category {
                input.category_id = Some(ctx.category_id(&budget_id, &category)?);
            }
            input.splits = parse_splits(ctx, &budget_id, &split)?;
            if let Some(income) = income {
                input.income_month = Some(parse_month_or_current(Some(income.as_str()))?);
            }

            ctx.run(Command::CreateTransaction {
                budget_id,
                transaction: input,
            })?;
        }

        TransactionCommands::List {
            account,
            since,
            limit,
        } => {
            let account_id = match account {
                Some(account) => Some(ctx.account_id(&budget_id, &account)?),
                None => None,
            };
            let since = match since {
                Some(since) => Some(parse_date(&since)?),
                None => None,
            };
            ctx.run(Command::ListTransactions {
                budget_id,
                filter: TransactionFilter {
                    account_id,
                    since,
                    limit,
                },
            })?;
        }

        TransactionCommands::Show { id } => {
            let txn = ctx.engine.find_transaction(&budget_id, &id)?;
            ctx.print(&CommandOutput::Transaction(txn))?;
        }

        TransactionCommands::Edit {
            id,
            amount,
            payee,
            category,
            uncategorize,
            date,
            memo,
            state,
            income,
            not_income,
        } => {
            let transaction_id = ctx.transaction_id(&budget_id, &id)?;
            let mut patch = TransactionPatch {
                payee,
                memo,
                clear_category: uncategorize,
                clear_income_month: not_income,
                ..Default::default()
            };
            if let Some(amount) = amount {
                patch.amount = Some(parse_amount(&amount)?);
            }
            if let Some(category) = category {
                patch.category_id = Some(ctx.category_id(&budget_id, &category)?);
            }
            if let Some(date) = date {
                patch.date = Some(parse_date(&date)?);
            }
            if let Some(state) = state {
                patch.state = Some(parse_state(&state)?);
            }
            if let Some(income) = income {
                patch.income_month = Some(parse_month_or_current(Some(income.as_str()))?);
            }

            if patch == TransactionPatch::default() {
                println!("No changes specified.");
                return Ok(());
            }
            ctx.run(Command::UpdateTransaction {
                budget_id,
                transaction_id,
                patch,
            })?;
        }

        TransactionCommands::Delete { id } => {
            let transaction_id = ctx.transaction_id(&budget_id, &id)?;
            ctx.run(Command::DeleteTransaction {
                budget_id,
                transaction_id,
            })?;
        }

        TransactionCommands::Clear { id } => {
            set_state(ctx, budget_id, &id, TransactionState::Cleared)?;
        }

        TransactionCommands::Unclear { id } => {
            set_state(ctx, budget_id, &id, TransactionState::Uncleared)?;
        }
    }

    Ok(())
}

/// Move money between two accounts
pub fn handle_transfer_command<S: LedgerStore>(
    ctx: &Context<'_, S>,
    from: String,
    to: String,
    amount: String,
    date: Option<String>,
    memo: Option<String>,
) -> EnvelopeResult<()> {
    let budget_id = ctx.budget_id()?;
    let from_account_id = ctx.account_id(&budget_id, &from)?;
    let to_account_id = ctx.account_id(&budget_id, &to)?;

    ctx.run(Command::CreateTransfer {
        budget_id,
        from_account_id,
        to_account_id,
        date: parse_date_or_today(date.as_deref())?,
        amount: parse_amount(&amount)?,
        memo,
    })?;
    Ok(())
}

fn set_state<S: LedgerStore>(
    ctx: &Context<'_, S>,
    budget_id: BudgetId,
    id: &str,
    state: TransactionState,
) -> EnvelopeResult<()> {
    let transaction_id = ctx.transaction_id(&budget_id, id)?;
    ctx.run(Command::UpdateTransaction {
        budget_id,
        transaction_id,
        patch: TransactionPatch {
            state: Some(state),
            ..Default::default()
        },
    })?;
    Ok(())
}

fn parse_state(input: &str) -> EnvelopeResult<TransactionState> {
    TransactionState::parse(input).ok_or_else(|| {
        EnvelopeError::InvalidArgument(format!(
            "Invalid state: '{}'. Use uncleared, cleared or reconciled",
            input
        ))
    })
}

/// `CATEGORY=AMOUNT` pairs; the category may itself contain '='
fn parse_splits<S: LedgerStore>(
    ctx: &Context<'_, S>,
    budget_id: &BudgetId,
    lines: &[String],
) -> EnvelopeResult<Vec<Subtransaction>> {
    lines
        .iter()
        .map(|line| {
            let (category, amount) = line.rsplit_once('=').ok_or_else(|| {
                EnvelopeError::InvalidArgument(format!(
                    "Invalid split: '{}'. Use CATEGORY=AMOUNT",
                    line
                ))
            })?;
            Ok(Subtransaction::new(
                Some(ctx.category_id(budget_id, category.trim())?),
                parse_amount(amount)?,
            ))
        })
        .collect()
}
