//! Mesh Sync - Push Meshtastic node identity into Airtable.
//!
//! Queries the attached radio through the `meshtastic` CLI, scrapes the node
//! table, metadata and security blocks from its output, upserts the result
//! into an Airtable table keyed by `Node ID`, then archives the device
//! configuration to a timestamped YAML file.
//!
//!   mesh-sync                          # default connection
//!   mesh-sync --host 192.168.1.20      # TCP
//!   mesh-sync --port /dev/ttyUSB0      # serial
//!   mesh-sync --ble AA:BB:CC:DD:EE:FF  # bluetooth
//!   mesh-sync --dry-run -v             # parse only, show the record

mod application;
mod cli;
mod domain;
mod infrastructure;

use clap::Parser;
use colored::Colorize;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use application::{
    format_record_table, format_report, CommandPlan, ConfigExporter, SyncOptions, SyncService,
};
use cli::Cli;
use infrastructure::{load_settings, AirtableClient, MeshtasticCli};

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose);

    if let Err(e) = run(cli).await {
        eprintln!("{} {}", "Error:".red().bold(), e);
        if e.is_config() {
            eprintln!("Expected keys: AIRTABLE_API_KEY, AIRTABLE_BASE_ID, AIRTABLE_TABLE_NAME");
        }
        std::process::exit(1);
    }
}

/// Main application logic.
async fn run(cli: Cli) -> domain::Result<()> {
    // Credentials must be valid before the device or network is touched.
    let settings = load_settings(&cli.config)?;

    let plan = CommandPlan::new(cli.meshtastic_bin.clone(), cli.connection_target());
    println!(
        "{} Running Meshtastic Command: {}",
        "🔄".bold(),
        plan.display_info_command().cyan()
    );
    println!("{} {}", "📡".bold(), plan.describe());

    let options = SyncOptions {
        dry_run: cli.dry_run,
        export: !cli.no_export,
    };

    let service = SyncService::new(
        MeshtasticCli::new(cli.meshtastic_bin),
        AirtableClient::new(settings),
        ConfigExporter::new(cli.export_dir),
        options,
    )?;

    let report = service.sync(&plan).await?;

    if let Some(record) = &report.record {
        if cli.dry_run || cli.verbose > 0 {
            println!();
            println!("{}", format_record_table(record));
        }
    }

    println!("{}", format_report(&report));

    Ok(())
}

/// Setup tracing/logging based on verbosity level.
fn setup_logging(verbosity: u8) {
    let filter = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).without_time())
        .with(filter)
        .init();
}
