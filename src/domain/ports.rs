//! Seams to the outside world.
//!
//! The pipeline talks to the device tool and the record store only through
//! these traits, so tests can substitute in-memory fakes.

use std::fs::File;

use super::error::Result;
use super::models::{NodeRecord, ToolStatus, WriteOutcome};

/// The device management command-line tool.
pub trait DeviceTool {
    /// Run the tool with `args` and return its standard output as text.
    async fn capture(&self, args: &[String]) -> Result<String>;

    /// Run the tool with `args`, sending standard output into `dest`.
    async fn run_to_file(&self, args: &[String], dest: File) -> Result<ToolStatus>;
}

/// Hosted table holding one row per node.
pub trait RecordStore {
    /// Identifier of the row whose `Node ID` equals `node_id`, if any.
    async fn find_by_node_id(&self, node_id: &str) -> Result<Option<String>>;

    /// Replace the fields of an existing row.
    async fn update(&self, record_id: &str, record: &NodeRecord) -> Result<WriteOutcome>;

    /// Insert a new row.
    async fn create(&self, record: &NodeRecord) -> Result<WriteOutcome>;
}
