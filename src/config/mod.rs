//! Configuration for the ledger
//!
//! This module provides:
//! - data directory resolution
//! - settings persistence

pub mod paths;
pub mod settings;

pub use paths::LedgerPaths;
pub use settings::Settings;
