//! Legacy migration CLI commands

use clap::Subcommand;

use crate::error::LedgerResult;
use crate::services::{MigrationManager, VersionManager};
use crate::storage::Storage;

/// Migration subcommands
#[derive(Subcommand)]
pub enum MigrateCommands {
    /// Show whether legacy data is present and what the last run did
    Status,
    /// Compare legacy and stored version counts
    Verify,
}

/// Handle a migration command
///
/// The migration itself runs at startup; these commands only report on it.
pub fn handle_migrate_command(
    manager: &VersionManager,
    storage: &Storage,
    legacy_key: &str,
    cmd: MigrateCommands,
) -> LedgerResult<()> {
    let migration = MigrationManager::new(storage, legacy_key);

    match cmd {
        MigrateCommands::Status => {
            println!("Legacy key:      {}", migration.legacy_key());
            println!(
                "Legacy data:     {}",
                if migration.needs_migration() {
                    "present"
                } else {
                    "none"
                }
            );

            match manager.migration_report() {
                Some(report) => {
                    println!(
                        "Last run:        {} migrated, {} skipped, {} failed",
                        report.migrated, report.skipped, report.failed
                    );
                    if let Some(key) = &report.backup_key {
                        println!("Backup written:  {}", key);
                    }
                }
                None => println!("Last run:        failed (see log output)"),
            }

            let backups = migration.backups()?;
            if !backups.is_empty() {
                println!("Backups:");
                for key in backups {
                    println!("  {}", key);
                }
            }
        }

        MigrateCommands::Verify => {
            let report = migration.verify()?;
            println!("Legacy versions:  {}", report.legacy_count);
            println!("Stored versions:  {}", report.relational_count);
            println!(
                "Verification:     {}",
                if report.passed { "passed" } else { "FAILED" }
            );
        }
    }

    Ok(())
}
