use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::{debug, error};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;

use envelope_ledger::audit::AuditLogger;
use envelope_ledger::cli::{
    self, AccountCommands, BudgetCommands, CategoryCommands, ConfigCommands, Context,
    MoveCommands, TransactionCommands,
};
use envelope_ledger::{Engine, EnvelopeError, JsonFileStore, LedgerPaths, Settings};

#[derive(Parser)]
#[command(
    name = "envelope",
    author = "Kaylee Beyene",
    version,
    about = "Envelope budgeting ledger",
    long_about = "Give every unit of money a job. Track accounts, assign money to \
                  category envelopes month by month, move money between envelopes \
                  and reconcile against bank statements from the command line."
)]
struct Cli {
    /// Budget name or ID (needed only when more than one budget exists)
    #[arg(short, long, global = true, env = "ENVELOPE_BUDGET")]
    budget: Option<String>,

    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Logging verbosity: off, error, warn, info, debug or trace.
    /// RUST_LOG overrides this.
    #[arg(long, global = true, default_value = "warn")]
    log_level: LevelFilter,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the first budget with default categories
    Init {
        /// Budget name
        #[arg(default_value = "My Budget")]
        name: String,
        /// Three-letter currency code
        #[arg(short, long)]
        currency: Option<String>,
        /// Skip the default category groups
        #[arg(long)]
        no_defaults: bool,
    },

    /// Show or change settings
    #[command(subcommand)]
    Config(ConfigCommands),

    /// Budget management commands
    #[command(subcommand)]
    Budget(BudgetCommands),

    /// Account management commands
    #[command(subcommand)]
    Account(AccountCommands),

    /// Transaction management commands
    #[command(subcommand, alias = "txn")]
    Transaction(TransactionCommands),

    /// Move money between two accounts
    Transfer {
        /// Source account name or ID
        from: String,
        /// Destination account name or ID
        to: String,
        /// Amount (e.g., "250.00")
        amount: String,
        /// Date (YYYY-MM-DD), defaults to today
        #[arg(short, long)]
        date: Option<String>,
        #[arg(short, long)]
        memo: Option<String>,
    },

    /// Category management commands
    #[command(subcommand)]
    Category(CategoryCommands),

    /// Show the envelopes for a month
    Month {
        /// Month (YYYY-MM), defaults to current
        month: Option<String>,
    },

    /// Assign money to a category (negative to take it back)
    Assign {
        /// Category name or ID
        category: String,
        /// Amount (e.g., "400.00" or "-25")
        #[arg(allow_negative_numbers = true)]
        amount: String,
        /// Month (YYYY-MM), defaults to current
        #[arg(short, long)]
        month: Option<String>,
    },

    /// Move assigned money between categories or months
    #[command(subcommand)]
    Move(MoveCommands),

    /// Credit card debt balances
    Debt {
        /// Credit account name or ID (all credit accounts if omitted)
        account: Option<String>,
        /// Month (YYYY-MM), defaults to current
        #[arg(short, long)]
        month: Option<String>,
        /// Create missing payment categories first
        #[arg(long)]
        sync: bool,
    },

    /// Reconcile an account against a statement
    Reconcile {
        /// Account name or ID
        account: String,
        /// Statement ending balance (e.g., "1234.56")
        #[arg(allow_negative_numbers = true)]
        balance: String,
        /// Statement date (YYYY-MM-DD), defaults to today
        #[arg(short, long)]
        date: Option<String>,
        /// Notes; also used as the adjustment memo
        #[arg(short, long)]
        notes: Option<String>,
    },

    /// List payees
    Payee {
        /// Case-insensitive name filter
        query: Option<String>,
    },

    /// Show recent changes from the audit log
    Audit {
        /// Number of entries to show
        #[arg(short, long, default_value_t = 20)]
        limit: usize,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logger(cli.log_level);
    debug!("Log level set to {}", cli.log_level.to_string().to_lowercase());

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Exiting with error: {e:#}");
            eprintln!("Error: {e:#}");
            let code = e
                .downcast_ref::<EnvelopeError>()
                .map(|err| err.kind().exit_code())
                .unwrap_or(1);
            ExitCode::from(code)
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let paths = LedgerPaths::new()?;
    let mut settings = Settings::load_or_create(&paths)?;

    let audit = AuditLogger::new(paths.audit_log());

    // Settings and audit commands work on files directly and don't need the engine
    let command = match cli.command {
        Commands::Config(cmd) => {
            cli::handle_config_command(&paths, &mut settings, cli.json, cmd)?;
            return Ok(());
        }
        Commands::Audit { limit } => {
            cli::handle_audit_command(&audit, limit, cli.json)?;
            return Ok(());
        }
        other => other,
    };

    let store = JsonFileStore::new(paths)?;
    let engine = Engine::new(store, settings).with_audit(audit);
    let ctx = Context {
        engine: &engine,
        budget: cli.budget.as_deref(),
        json: cli.json,
    };

    match command {
        Commands::Init {
            name,
            currency,
            no_defaults,
        } => cli::handle_init(&ctx, name, currency, no_defaults)?,
        Commands::Config(_) | Commands::Audit { .. } => {}
        Commands::Budget(cmd) => cli::handle_budget_command(&ctx, cmd)?,
        Commands::Account(cmd) => cli::handle_account_command(&ctx, cmd)?,
        Commands::Transaction(cmd) => cli::handle_transaction_command(&ctx, cmd)?,
        Commands::Transfer {
            from,
            to,
            amount,
            date,
            memo,
        } => cli::handle_transfer_command(&ctx, from, to, amount, date, memo)?,
        Commands::Category(cmd) => cli::handle_category_command(&ctx, cmd)?,
        Commands::Month { month } => cli::handle_month_command(&ctx, month)?,
        Commands::Assign {
            category,
            amount,
            month,
        } => cli::handle_assign_command(&ctx, category, amount, month)?,
        Commands::Move(cmd) => cli::handle_move_command(&ctx, cmd)?,
        Commands::Debt {
            account,
            month,
            sync,
        } => cli::handle_debt_command(&ctx, account, month, sync)?,
        Commands::Reconcile {
            account,
            balance,
            date,
            notes,
        } => cli::handle_reconcile_command(&ctx, account, balance, date, notes)?,
        Commands::Payee { query } => cli::handle_payee_command(&ctx, query)?,
    }

    Ok(())
}

/// Initializes the tracing subscriber.
fn init_logger(level: LevelFilter) {
    let filter = match std::env::var("RUST_LOG").ok() {
        Some(_) => EnvFilter::from_default_env(),
        None => EnvFilter::new(format!(
            "envelope_ledger={},{}={}",
            level,
            env!("CARGO_CRATE_NAME"),
            level
        )),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
