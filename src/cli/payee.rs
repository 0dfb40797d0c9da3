//! Payee CLI commands

use super::Context;
use crate::api::Command;
use crate::error::EnvelopeResult;
use crate::storage::LedgerStore;

/// List payees, optionally filtered by a case-insensitive substring
pub fn handle_payee_command<S: LedgerStore>(ctx: &Context<'_, S>, query: Option<String>) -> EnvelopeResult<()> {
    let budget_id = ctx.budget_id()?;
    ctx.run(Command::ListPayees { budget_id, query })?;
    Ok(())
}
