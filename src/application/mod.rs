//! Application layer - use cases and orchestration.
//!
//! This layer turns device output into a node record, pushes it to the
//! record store and archives the device configuration.

pub mod command;
pub mod exporter;
pub mod formatter;
pub mod parser;
pub mod sync_service;

pub use command::{CommandPlan, DEFAULT_TOOL};
pub use exporter::{ConfigExporter, DEFAULT_EXPORT_DIR};
pub use formatter::{format_record_table, format_report};
pub use sync_service::{SyncOptions, SyncService};
