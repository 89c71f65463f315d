use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use ledger::audit::AuditLogger;
use ledger::cli::{
    handle_audit_command, handle_item_command, handle_migrate_command, handle_payroll_command,
    handle_rate_card_command, handle_summary_command, handle_transaction_command,
    handle_version_command,
};
use ledger::config::{paths::LedgerPaths, settings::Settings};
use ledger::services::VersionManager;
use ledger::storage::Storage;

#[derive(Parser)]
#[command(
    name = "ledger",
    version,
    about = "Versioned production budget ledger",
    long_about = "Budget Ledger keeps named versions of a production budget, \
                  tracks spend and payroll against them and locks approved \
                  versions against further changes."
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Budget version management commands
    #[command(subcommand)]
    Version(ledger::cli::VersionCommands),

    /// Line item commands
    #[command(subcommand)]
    Item(ledger::cli::ItemCommands),

    /// Transaction commands
    #[command(subcommand, alias = "transaction")]
    Txn(ledger::cli::TransactionCommands),

    /// Show totals, variances and a projection for the selected version
    Summary {
        /// Shooting days elapsed so far
        #[arg(long, default_value = "0")]
        days_elapsed: i64,
        /// Total shooting days (enables the projection)
        #[arg(long, default_value = "0")]
        total_days: i64,
    },

    /// Payroll commands
    #[command(subcommand)]
    Payroll(ledger::cli::PayrollCommands),

    /// Rate card commands
    #[command(subcommand)]
    RateCard(ledger::cli::RateCardCommands),

    /// Legacy data migration commands
    #[command(subcommand)]
    Migrate(ledger::cli::MigrateCommands),

    /// Show recent audit log entries
    Audit {
        /// Number of entries to show
        #[arg(short, long, default_value = "20")]
        limit: usize,
        /// Only entries for this entity ID
        #[arg(short, long)]
        entity: Option<String>,
    },

    /// Show current configuration and paths
    Config,
}

fn init_tracing(settings: &Settings) {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| settings.log_filter.clone()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize paths and settings
    let paths = LedgerPaths::new()?;
    let settings = Settings::load_or_create(&paths)?;
    init_tracing(&settings);

    // Initialize storage
    let audit = Arc::new(AuditLogger::new(paths.audit_log()));
    let storage = Storage::new(paths.clone())?;
    storage.load_all()?;

    let mut manager = VersionManager::new(&storage, &settings, audit.clone());
    manager.start()?;

    match cli.command {
        Some(Commands::Version(cmd)) => {
            handle_version_command(&mut manager, cmd)?;
        }
        Some(Commands::Item(cmd)) => {
            handle_item_command(&mut manager, &storage, &audit, cmd)?;
        }
        Some(Commands::Txn(cmd)) => {
            handle_transaction_command(&mut manager, cmd)?;
        }
        Some(Commands::Summary {
            days_elapsed,
            total_days,
        }) => {
            handle_summary_command(&manager, days_elapsed, total_days)?;
        }
        Some(Commands::Payroll(cmd)) => {
            handle_payroll_command(&mut manager, &settings, cmd)?;
        }
        Some(Commands::RateCard(cmd)) => {
            handle_rate_card_command(&mut manager, &storage, &audit, cmd)?;
        }
        Some(Commands::Migrate(cmd)) => {
            handle_migrate_command(&manager, &storage, &settings.legacy_versions_key, cmd)?;
        }
        Some(Commands::Audit { limit, entity }) => {
            handle_audit_command(&audit, limit, entity.as_deref())?;
        }
        Some(Commands::Config) => {
            println!("Budget Ledger Configuration");
            println!("===========================");
            println!("Base directory:  {}", paths.base_dir().display());
            println!("Data directory:  {}", paths.data_dir().display());
            println!("Audit log:       {}", paths.audit_log().display());
            println!();
            println!("Settings:");
            println!("  Default currency:      {}", settings.default_currency);
            println!("  Default version name:  {}", settings.default_version_label());
            println!("  Legacy versions key:   {}", settings.legacy_versions_key);
            println!(
                "  Upcoming window:       {} days",
                settings.upcoming_payment_window_days
            );
            println!("  Log filter:            {}", settings.log_filter);
        }
        None => {
            if let Some(version) = manager.selected() {
                println!("Budget Ledger - {} selected", version.name);
            } else {
                println!("Budget Ledger");
            }
            println!();
            println!("Run 'ledger --help' for usage information.");
        }
    }

    Ok(())
}
