//! Category CLI commands
//!
//! Implements CLI commands for category and category group management.

use clap::Subcommand;

use super::{parse_month_or_current, Context};
use crate::api::Command;
use crate::error::EnvelopeResult;
use crate::services::{CategoryPatch, GroupPatch};
use crate::storage::LedgerStore;

/// Category subcommands
#[derive(Subcommand)]
pub enum CategoryCommands {
    /// List all categories (organized by group) with this month's balances
    List {
        /// Month to show (YYYY-MM)
        #[arg(short, long)]
        month: Option<String>,
    },

    /// Create a new category
    Create {
        /// Category name
        name: String,
        /// Category group name or ID
        #[arg(short, long)]
        group: String,
    },

    /// Edit a category
    Edit {
        /// Category name or ID
        category: String,
        /// New name
        #[arg(short, long)]
        name: Option<String>,
        /// Move to another group (name or ID)
        #[arg(long)]
        group: Option<String>,
        /// Position within the group
        #[arg(long)]
        sort_order: Option<i32>,
        /// Hide the category
        #[arg(long, conflicts_with = "unhide")]
        hide: bool,
        /// Show a hidden category again
        #[arg(long)]
        unhide: bool,
    },

    /// Delete a category
    Delete {
        /// Category name or ID
        category: String,
    },

    /// Create a new category group
    #[command(name = "create-group")]
    CreateGroup {
        /// Group name
        name: String,
    },

    /// Edit a category group
    #[command(name = "edit-group")]
    EditGroup {
        /// Group name or ID
        group: String,
        /// New name
        #[arg(short, long)]
        name: Option<String>,
        /// Position among groups
        #[arg(long)]
        sort_order: Option<i32>,
    },

    /// Delete an empty category group
    #[command(name = "delete-group")]
    DeleteGroup {
        /// Group name or ID
        group: String,
    },
}

/// Handle a category command
pub fn handle_category_command<S: LedgerStore>(ctx: &Context<'_, S>, cmd: CategoryCommands) -> EnvelopeResult<()> {
    let budget_id = ctx.budget_id()?;

    match cmd {
        CategoryCommands::List { month } => {
            let month = parse_month_or_current(month.as_deref())?;
            ctx.run(Command::MonthView {
                budget_id,
                month: month.into(),
            })?;
        }

        CategoryCommands::Create { name, group } => {
            let group_id = ctx.group_id(&budget_id, &group)?;
            ctx.run(Command::CreateCategory {
                budget_id,
                group_id,
                name,
            })?;
        }

        CategoryCommands::Edit {
            category,
            name,
            group,
            sort_order,
            hide,
            unhide,
        } => {
            let category_id = ctx.category_id(&budget_id, &category)?;
            let group_id = match group {
                Some(group) => Some(ctx.group_id(&budget_id, &group)?),
                None => None,
            };
            let patch = CategoryPatch {
                name,
                group_id,
                sort_order,
                hidden: match (hide, unhide) {
                    (true, _) => Some(true),
                    (_, true) => Some(false),
                    _ => None,
                },
            };
            if patch == CategoryPatch::default() {
                println!("No changes specified. Use --name, --group, --sort-order, --hide or --unhide.");
                return Ok(());
            }
            ctx.run(Command::UpdateCategory {
                budget_id,
                category_id,
                patch,
            })?;
        }

        CategoryCommands::Delete { category } => {
            let category_id = ctx.category_id(&budget_id, &category)?;
            ctx.run(Command::DeleteCategory {
                budget_id,
                category_id,
            })?;
        }

        CategoryCommands::CreateGroup { name } => {
            ctx.run(Command::CreateGroup { budget_id, name })?;
        }

        CategoryCommands::EditGroup {
            group,
            name,
            sort_order,
        } => {
            let group_id = ctx.group_id(&budget_id, &group)?;
            let patch = GroupPatch { name, sort_order };
            if patch == GroupPatch::default() {
                println!("No changes specified. Use --name or --sort-order.");
                return Ok(());
            }
            ctx.run(Command::UpdateGroup {
                budget_id,
                group_id,
                patch,
            })?;
        }

        CategoryCommands::DeleteGroup { group } => {
            let group_id = ctx.group_id(&budget_id, &group)?;
            ctx.run(Command::DeleteGroup {
                budget_id,
                group_id,
            })?;
        }
    }

    Ok(())
}
