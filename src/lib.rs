//! envelope-ledger - envelope budgeting ledger engine
//!
//! Money lives in accounts; every unit of it is given a job by assigning it
//! to a category for a month. This crate keeps those envelopes consistent
//! while transactions, transfers, credit card spending and statement
//! reconciliations change the underlying accounts.
//!
//! # Architecture
//!
//! The crate is organized into the following modules:
//!
//! - `config`: Data directory resolution and settings
//! - `error`: Error taxonomy shared by every operation
//! - `models`: Core data models (budgets, accounts, transactions, categories, ...)
//! - `storage`: The ledger store boundary and its JSON/in-memory backends
//! - `services`: Business rules applied to a working copy of one budget
//! - `engine`: Locking and the load/mutate/commit unit of work
//! - `api`: Typed command boundary over the engine
//! - `audit`: Append-only audit log of committed changes
//! - `cli`, `display`: The `envelope` command line front end
//!
//! # Example
//!
//! ```rust,ignore
//! use envelope_ledger::{Engine, MemoryStore, Settings};
//! use envelope_ledger::services::NewBudget;
//!
//! let engine = Engine::new(MemoryStore::new(), Settings::default());
//! let budget = engine.create_budget(NewBudget { /* ... */ })?;
//! let view = engine.month_view(&budget.id, budget.start_month)?;
//! ```

pub mod api;
pub mod audit;
pub mod cli;
pub mod config;
pub mod display;
pub mod engine;
pub mod error;
pub mod models;
pub mod services;
pub mod storage;

pub use api::{Command, CommandOutput};
pub use config::{LedgerPaths, Settings};
pub use engine::Engine;
pub use error::{EnvelopeError, EnvelopeResult, ErrorKind};
pub use storage::{JsonFileStore, LedgerStore, MemoryStore};
