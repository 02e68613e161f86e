//! Domain layer - core types and the seams to external systems.
//!
//! This layer contains pure domain models and error types
//! without any external dependencies (subprocesses, HTTP, filesystem).

pub mod error;
pub mod models;
pub mod ports;
pub mod settings;

pub use error::{AppError, Result};
pub use models::{
    ConnectionTarget, ExportOutcome, NodeRecord, SyncAction, SyncReport, ToolStatus, WriteOp,
    WriteOutcome,
};
pub use ports::{DeviceTool, RecordStore};
pub use settings::{RawSettings, Settings};
