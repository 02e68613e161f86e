//! Infrastructure layer - external adapters (subprocess, HTTP, filesystem).
//!
//! This layer handles all I/O operations and external dependencies.

pub mod airtable;
pub mod config;
pub mod meshtastic;

pub use airtable::AirtableClient;
pub use config::{load_settings, DEFAULT_SETTINGS_FILE};
pub use meshtastic::MeshtasticCli;
