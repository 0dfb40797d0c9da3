//! Audit log command

use crate::audit::AuditLogger;
use crate::error::EnvelopeResult;

/// Print the newest `limit` audit entries, oldest first
pub fn handle_audit_command(logger: &AuditLogger, limit: usize, json: bool) -> EnvelopeResult<()> {
    let entries = logger.read_recent(limit)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }

    if entries.is_empty() {
        println!("No audit entries yet.");
        return Ok(());
    }
    for entry in &entries {
        println!("{}", entry.summary_line());
    }
    Ok(())
}
