//! Reconciliation CLI command
//!
//! Compares the ledger to a bank statement, books the difference as an
//! adjustment and locks in every cleared transaction up to the statement date.

use super::{parse_amount, parse_date_or_today, Context};
use crate::api::Command;
use crate::error::EnvelopeResult;
use crate::storage::LedgerStore;

pub fn handle_reconcile_command<S: LedgerStore>(
    ctx: &Context<'_, S>,
    account: String,
    balance: String,
    date: Option<String>,
    notes: Option<String>,
) -> EnvelopeResult<()> {
    let budget_id = ctx.budget_id()?;
    let account_id = ctx.account_id(&budget_id, &account)?;
    let statement_balance = parse_amount(&balance)?;

    ctx.run(Command::Reconcile {
        budget_id,
        account_id,
        statement_date: parse_date_or_today(date.as_deref())?,
        statement_balance: statement_balance.cents().to_string(),
        notes,
    })?;
    Ok(())
}
