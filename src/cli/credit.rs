//! Credit card debt commands

use super::{parse_month_or_current, Context};
use crate::api::Command;
use crate::error::EnvelopeResult;
use crate::storage::LedgerStore;

/// Show debt figures for one credit account, or all of them.
///
/// With `sync`, payment categories are created first for any credit
/// account that lacks one.
pub fn handle_debt_command<S: LedgerStore>(
    ctx: &Context<'_, S>,
    account: Option<String>,
    month: Option<String>,
    sync: bool,
) -> EnvelopeResult<()> {
    let budget_id = ctx.budget_id()?;
    let month = parse_month_or_current(month.as_deref())?;

    if sync {
        ctx.run(Command::EnsureDebtCategories { budget_id })?;
    }

    match account {
        Some(account) => {
            let account_id = ctx.account_id(&budget_id, &account)?;
            ctx.run(Command::DebtBalance {
                budget_id,
                account_id,
                month: month.into(),
            })?;
        }
        None => {
            ctx.run(Command::DebtOverview {
                budget_id,
                month: month.into(),
            })?;
        }
    }
    Ok(())
}
