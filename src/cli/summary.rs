//! Summary and audit log CLI commands

use crate::audit::AuditLogger;
use crate::display::{format_budget_summary, format_category_variances, format_projection};
use crate::error::{LedgerError, LedgerResult};
use crate::services::VersionManager;

/// Print category totals, variances and a spend projection for the selected version
pub fn handle_summary_command(
    manager: &VersionManager,
    days_elapsed: i64,
    total_days: i64,
) -> LedgerResult<()> {
    let version = manager
        .selected()
        .ok_or_else(|| LedgerError::version_not_found("selected"))?;

    println!("{}", version.name);
    println!();
    print!(
        "{}",
        format_budget_summary(&manager.summary()?, &version.currency)
    );
    println!();
    print!("{}", format_category_variances(&manager.category_variances()?));

    if total_days > 0 {
        println!();
        print!(
            "{}",
            format_projection(&manager.projection(days_elapsed, total_days)?)
        );
    }

    Ok(())
}

/// Print the most recent audit entries, optionally for one entity
pub fn handle_audit_command(
    audit: &AuditLogger,
    limit: usize,
    entity: Option<&str>,
) -> LedgerResult<()> {
    let entries = match entity {
        Some(entity) => {
            let all = audit.entries_for(entity)?;
            let start = all.len().saturating_sub(limit);
            all[start..].to_vec()
        }
        None => audit.read_recent(limit)?,
    };

    if entries.is_empty() {
        println!("No audit entries found.");
        return Ok(());
    }

    for entry in entries {
        println!("{}", entry.format_human_readable());
    }
    println!();
    println!("{} entries total in {}", audit.entry_count()?, audit.path().display());

    Ok(())
}
