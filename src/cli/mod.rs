//! CLI interface using clap.
//!
//! Provides the connection selectors and run switches for the tool.

use std::path::PathBuf;

use clap::Parser;

use crate::application::{DEFAULT_EXPORT_DIR, DEFAULT_TOOL};
use crate::domain::ConnectionTarget;
use crate::infrastructure::DEFAULT_SETTINGS_FILE;

/// Mesh Sync - Update Airtable with Meshtastic node data.
///
/// Reads identity and status from the attached radio, upserts it into the
/// configured table and saves a timestamped copy of the device config.
#[derive(Parser, Debug)]
#[command(name = "mesh-sync")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// IP address or hostname of the Meshtastic node.
    #[arg(long)]
    pub host: Option<String>,

    /// Serial port of the Meshtastic node.
    #[arg(long)]
    pub port: Option<String>,

    /// Bluetooth address of the Meshtastic node.
    #[arg(long)]
    pub ble: Option<String>,

    /// Settings file with the Airtable credentials.
    #[arg(short, long, default_value = DEFAULT_SETTINGS_FILE)]
    pub config: PathBuf,

    /// Directory for exported device configurations.
    #[arg(long, default_value = DEFAULT_EXPORT_DIR)]
    pub export_dir: PathBuf,

    /// Skip the configuration export.
    #[arg(long)]
    pub no_export: bool,

    /// Parse and print the node record without contacting Airtable.
    #[arg(long)]
    pub dry_run: bool,

    /// Meshtastic CLI executable.
    #[arg(long, default_value = DEFAULT_TOOL)]
    pub meshtastic_bin: String,

    /// Enable verbose logging (use multiple times for more verbosity).
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

impl Cli {
    /// Resolve the connection selectors by precedence.
    pub fn connection_target(&self) -> ConnectionTarget {
        let given = [&self.host, &self.port, &self.ble]
            .iter()
            .filter(|v| v.is_some())
            .count();
        if given > 1 {
            tracing::warn!("Several connection options given; using host > port > ble precedence");
        }

        ConnectionTarget::select(self.host.clone(), self.port.clone(), self.ble.clone())
    }
}
