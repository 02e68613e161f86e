//! Device configuration snapshots.
//!
//! Each run writes the tool's exported configuration to a new file named
//! after the node, so earlier snapshots are never overwritten.

use std::fs::{self, File, OpenOptions};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use chrono::{DateTime, TimeZone};

use crate::domain::{DeviceTool, ExportOutcome, NodeRecord};

/// Default directory (relative to the working directory) for snapshots.
pub const DEFAULT_EXPORT_DIR: &str = "config_exports";

const PLACEHOLDER: &str = "UNKNOWN";

/// Highest numbered suffix tried when snapshots collide within one minute.
const MAX_SUFFIX: u32 = 99;

/// Writes configuration snapshots into a directory.
#[derive(Debug, Clone)]
pub struct ConfigExporter {
    dir: PathBuf,
}

impl ConfigExporter {
    /// Create an exporter writing into `dir`.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Run the tool's export mode with `args`, stdout going to a new snapshot file.
    ///
    /// Never fails: every problem is reported through the returned outcome.
    /// A file left behind by a failing tool is kept as-is.
    pub async fn export<D, Tz>(
        &self,
        tool: &D,
        args: &[String],
        record: &NodeRecord,
        now: &DateTime<Tz>,
    ) -> ExportOutcome
    where
        D: DeviceTool,
        Tz: TimeZone,
        Tz::Offset: std::fmt::Display,
    {
        if let Err(e) = fs::create_dir_all(&self.dir) {
            return ExportOutcome::Failed {
                path: None,
                message: format!("Failed to create directory {}: {e}", self.dir.display()),
            };
        }

        let (path, file) = match create_snapshot(&self.dir, &export_filename(record, now)) {
            Ok(created) => created,
            Err((path, e)) => {
                return ExportOutcome::Failed {
                    message: format!("Failed to create {}: {e}", path.display()),
                    path: Some(path),
                };
            }
        };

        tracing::info!(path = %path.display(), "Exporting device configuration");

        match tool.run_to_file(args, file).await {
            Ok(status) if status.success => ExportOutcome::Written { path },
            Ok(status) => ExportOutcome::ToolFailed {
                path,
                code: status.code,
                stderr: status.stderr.trim().to_string(),
            },
            Err(e) => ExportOutcome::Failed {
                path: Some(path),
                message: e.to_string(),
            },
        }
    }
}

/// Create `name` in `dir`, never truncating an existing file.
///
/// On a name clash `_2`, `_3`, ... is inserted before the extension.
fn create_snapshot(
    dir: &Path,
    name: &str,
) -> std::result::Result<(PathBuf, File), (PathBuf, std::io::Error)> {
    let (stem, ext) = name.rsplit_once('.').unwrap_or((name, "yaml"));
    let mut n = 1;

    loop {
        let path = if n == 1 {
            dir.join(name)
        } else {
            dir.join(format!("{stem}_{n}.{ext}"))
        };

        match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(file) => return Ok((path, file)),
            Err(e) if e.kind() == ErrorKind::AlreadyExists && n < MAX_SUFFIX => {
                tracing::debug!(path = %path.display(), "Snapshot exists, trying next suffix");
                n += 1;
            }
            Err(e) => return Err((path, e)),
        }
    }
}

/// `{short}_{long}_{id}_{YYYYMMDD_HHMM}.yaml` with every part made filename-safe.
#[must_use]
pub fn export_filename<Tz>(record: &NodeRecord, now: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    let node_id = record.node_id.strip_prefix('!').unwrap_or(&record.node_id);

    format!(
        "{}_{}_{}_{}.yaml",
        sanitize(&record.short_name),
        sanitize(&record.long_name),
        sanitize(node_id),
        now.format("%Y%m%d_%H%M"),
    )
}

/// Spaces become underscores; anything outside `[A-Za-z0-9_-]` is dropped.
#[must_use]
pub fn sanitize(name: &str) -> String {
    let cleaned: String = name
        .replace(' ', "_")
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_' || *c == '-')
        .collect();

    if cleaned.is_empty() {
        PLACEHOLDER.to_string()
    } else {
        cleaned
    }
}
