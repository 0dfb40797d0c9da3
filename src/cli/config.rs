//! Settings CLI commands

use clap::Subcommand;

use crate::config::{LedgerPaths, Settings};
use crate::error::EnvelopeResult;

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Show the current settings
    Show,
    /// Change one setting
    Set {
        /// Setting name (e.g. default_currency, lock_timeout_ms)
        key: String,
        value: String,
    },
    /// Print where ledger data is stored
    Path,
}

pub fn handle_config_command(
    paths: &LedgerPaths,
    settings: &mut Settings,
    json: bool,
    cmd: ConfigCommands,
) -> EnvelopeResult<()> {
    match cmd {
        ConfigCommands::Show => {
            if json {
                println!("{}", serde_json::to_string_pretty(settings)?);
            } else {
                println!("default_currency        {}", settings.default_currency);
                println!("debt_group_name         {}", settings.debt_group_name);
                println!("reconciliation_memo     {}", settings.reconciliation_memo);
                println!("lock_timeout_ms         {}", settings.lock_timeout_ms);
                println!("transaction_list_limit  {}", settings.transaction_list_limit);
                println!("payee_search_limit      {}", settings.payee_search_limit);
                println!("audit_enabled           {}", settings.audit_enabled);
            }
        }
        ConfigCommands::Set { key, value } => {
            settings.set(&key, &value)?;
            settings.save(paths)?;
            println!("Set {} = {}", key, value);
        }
        ConfigCommands::Path => {
            println!("{}", paths.base_dir().display());
        }
    }
    Ok(())
}
