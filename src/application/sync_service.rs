//! Synchronization of the attached node into the record store.
//!
//! One run is strictly linear: query the device, parse, resolve the remote
//! row, update or create it, then export the device configuration. Nothing
//! is retried.

use chrono::Local;

use crate::domain::{
    DeviceTool, NodeRecord, RecordStore, Result, SyncAction, SyncReport, WriteOp, WriteOutcome,
};

use super::command::CommandPlan;
use super::exporter::ConfigExporter;
use super::parser::MeshInfoParser;

/// Switches for optional pipeline stages.
#[derive(Debug, Clone, Copy)]
pub struct SyncOptions {
    /// Parse only; send nothing and skip the export.
    pub dry_run: bool,
    /// Archive the device configuration after the write.
    pub export: bool,
}

impl Default for SyncOptions {
    fn default() -> Self {
        Self {
            dry_run: false,
            export: true,
        }
    }
}

/// Service syncing one device into the record store.
pub struct SyncService<D, S> {
    device: D,
    store: S,
    parser: MeshInfoParser,
    exporter: ConfigExporter,
    options: SyncOptions,
}

impl<D: DeviceTool, S: RecordStore> SyncService<D, S> {
    /// Create a new sync service.
    ///
    /// # Errors
    /// Returns error if the output parser cannot be built.
    pub fn new(
        device: D,
        store: S,
        exporter: ConfigExporter,
        options: SyncOptions,
    ) -> Result<Self> {
        Ok(Self {
            device,
            store,
            parser: MeshInfoParser::new()?,
            exporter,
            options,
        })
    }

    /// Run the pipeline once.
    ///
    /// # Errors
    /// Returns error only for transport failures against the record store.
    /// Parse, write-rejection and export problems are part of the report.
    pub async fn sync(&self, plan: &CommandPlan) -> Result<SyncReport> {
        tracing::info!(command = %plan.display_info_command(), "Starting sync...");

        let output = match self.device.capture(&plan.info_args()).await {
            Ok(output) => output,
            Err(e) => {
                tracing::warn!(error = %e, "Device query failed");
                String::new()
            }
        };

        let record = match self.parser.parse(&output) {
            Ok(Some(record)) => record,
            Ok(None) => return Ok(Self::not_parsed(None)),
            Err(e) => {
                tracing::error!(error = %e, "Device output contained invalid JSON");
                return Ok(Self::not_parsed(Some(e.to_string())));
            }
        };

        if self.options.dry_run {
            tracing::info!(node_id = %record.node_id, "Dry run, skipping record store");
            return Ok(SyncReport {
                record: Some(record),
                action: SyncAction::DryRun,
                export: None,
            });
        }

        let action = self.upsert(&record).await?;

        let export = if self.options.export {
            Some(
                self.exporter
                    .export(&self.device, &plan.export_args(), &record, &Local::now())
                    .await,
            )
        } else {
            None
        };

        tracing::info!(node_id = %record.node_id, "Sync completed");

        Ok(SyncReport {
            record: Some(record),
            action,
            export,
        })
    }

    /// Update the row matching the node id, or create one.
    async fn upsert(&self, record: &NodeRecord) -> Result<SyncAction> {
        let existing = self.store.find_by_node_id(&record.node_id).await?;

        let (op, outcome, record_id) = match existing {
            Some(record_id) => {
                let outcome = self.store.update(&record_id, record).await?;
                (WriteOp::Update, outcome, Some(record_id))
            }
            None => (WriteOp::Create, self.store.create(record).await?, None),
        };

        Ok(match (outcome, record_id) {
            (WriteOutcome::Accepted, Some(record_id)) => SyncAction::Updated { record_id },
            (WriteOutcome::Accepted, None) => SyncAction::Created,
            (WriteOutcome::Rejected { status, body }, _) => {
                SyncAction::Rejected { op, status, body }
            }
        })
    }

    const fn not_parsed(error: Option<String>) -> SyncReport {
        SyncReport {
            record: None,
            action: SyncAction::NotParsed { error },
            export: None,
        }
    }
}
