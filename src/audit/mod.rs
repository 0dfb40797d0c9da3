//! Audit logging
//!
//! Every create, update and delete the engine commits is recorded with
//! before/after snapshots in an append-only JSONL file.
//!
//! - `AuditEntry`: one operation on one entity.
//! - `AuditLogger`: appends entries to the log file.
//!
//! Entries are collected while a unit of work runs and written only after the
//! store commit succeeds, so a failed operation leaves no audit trace.

mod entry;
mod logger;

pub use entry::{summarize_changes, AuditEntry, EntityType, Operation};
pub use logger::AuditLogger;
