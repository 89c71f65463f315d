//! Version CLI commands
//!
//! Implements CLI commands for budget version management.

use clap::Subcommand;

use crate::display::version::{format_version_details, format_version_list};
use crate::error::{LedgerError, LedgerResult};
use crate::models::VersionId;
use crate::services::VersionManager;

/// Version subcommands
#[derive(Subcommand)]
pub enum VersionCommands {
    /// List all versions (the selected one is marked with *)
    List,
    /// Create a new version and select it
    Create {
        /// Version name
        name: String,
        /// Copy the line item structure of the selected version (amounts reset to zero)
        #[arg(long)]
        copy: bool,
    },
    /// Rename a version
    Rename {
        /// Version name or ID
        version: String,
        /// New name
        name: String,
    },
    /// Lock a version against changes
    Lock {
        /// Version name or ID (defaults to the selected version)
        version: Option<String>,
    },
    /// Unlock a version
    Unlock {
        /// Version name or ID (defaults to the selected version)
        version: Option<String>,
    },
    /// Delete a version
    Delete {
        /// Version name or ID
        version: String,
    },
    /// Copy a version with all its data
    Duplicate {
        /// Version name or ID (defaults to the selected version)
        version: Option<String>,
    },
    /// Select the version other commands work on
    Select {
        /// Version name or ID
        version: String,
    },
    /// Show version details
    Show {
        /// Version name or ID (defaults to the selected version)
        version: Option<String>,
    },
}

/// Resolve a version name or ID, falling back to the selected version
pub fn resolve_version(manager: &VersionManager, identifier: Option<&str>) -> LedgerResult<VersionId> {
    match identifier {
        Some(identifier) => manager
            .find(identifier)
            .map(|v| v.id)
            .ok_or_else(|| LedgerError::version_not_found(identifier)),
        None => manager.selected_id(),
    }
}

/// Handle a version command
pub fn handle_version_command(manager: &mut VersionManager, cmd: VersionCommands) -> LedgerResult<()> {
    match cmd {
        VersionCommands::List => {
            print!("{}", format_version_list(manager.versions(), manager.selected()));
        }

        VersionCommands::Create { name, copy } => {
            let id = manager.create_version(&name, copy)?;
            println!("Created version: {}", name.trim());
            println!("  ID: {}", id);
            if copy {
                println!("  Line item structure copied from the previous selection");
            }
        }

        VersionCommands::Rename { version, name } => {
            let id = resolve_version(manager, Some(&version))?;
            manager.rename_version(id, &name)?;
            println!("Renamed '{}' to '{}'", version, name.trim());
        }

        VersionCommands::Lock { version } => {
            let id = resolve_version(manager, version.as_deref())?;
            manager.lock_version(id)?;
            if let Some(v) = manager.get(id) {
                println!("Locked version: {}", v.name);
            }
        }

        VersionCommands::Unlock { version } => {
            let id = resolve_version(manager, version.as_deref())?;
            manager.unlock_version(id)?;
            if let Some(v) = manager.get(id) {
                println!("Unlocked version: {}", v.name);
            }
        }

        VersionCommands::Delete { version } => {
            let id = resolve_version(manager, Some(&version))?;
            let name = manager.get(id).map(|v| v.name.clone()).unwrap_or_default();
            manager.delete_version(id)?;
            println!("Deleted version: {}", name);
            if let Some(selected) = manager.selected() {
                println!("Selected version: {}", selected.name);
            }
        }

        VersionCommands::Duplicate { version } => {
            let id = resolve_version(manager, version.as_deref())?;
            let copy = manager.duplicate_version(id)?;
            if let Some(v) = manager.get(copy) {
                println!("Created copy: {}", v.name);
                println!("  ID: {}", v.id);
            }
        }

        VersionCommands::Select { version } => {
            let id = resolve_version(manager, Some(&version))?;
            manager.select(id)?;
            if let Some(v) = manager.get(id) {
                println!("Selected version: {}", v.name);
            }
        }

        VersionCommands::Show { version } => {
            let id = resolve_version(manager, version.as_deref())?;
            if let Some(v) = manager.get(id) {
                print!("{}", format_version_details(v));
            }
        }
    }

    Ok(())
}
