//! Domain models for mesh node synchronization.
//!
//! These models represent the node identity scraped from the device tool,
//! the way the tool is reached, and the outcome of each pipeline stage.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// How the device tool reaches the radio.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ConnectionTarget {
    /// Network host (IP address or hostname).
    Host(String),
    /// Serial device path.
    SerialPort(String),
    /// Bluetooth LE address.
    Ble(String),
    /// Let the tool pick (serial autodetect or localhost).
    #[default]
    Default,
}

impl ConnectionTarget {
    /// Pick a target from optional arguments. Host wins over port, port over BLE.
    #[must_use]
    pub fn select(host: Option<String>, port: Option<String>, ble: Option<String>) -> Self {
        if let Some(host) = host {
            Self::Host(host)
        } else if let Some(port) = port {
            Self::SerialPort(port)
        } else if let Some(ble) = ble {
            Self::Ble(ble)
        } else {
            Self::Default
        }
    }

    /// Tool arguments selecting this connection. Values are passed verbatim.
    #[must_use]
    pub fn args(&self) -> Vec<String> {
        match self {
            Self::Host(v) => vec!["--host".into(), v.clone()],
            Self::SerialPort(v) => vec!["--port".into(), v.clone()],
            Self::Ble(v) => vec!["--ble".into(), v.clone()],
            Self::Default => Vec::new(),
        }
    }
}

impl std::fmt::Display for ConnectionTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Host(v) => write!(f, "Using HOST: {v}"),
            Self::SerialPort(v) => write!(f, "Using PORT: {v}"),
            Self::Ble(v) => write!(f, "Using BLE: {v}"),
            Self::Default => write!(f, "Using DEFAULT CONNECTION (serial or localhost)"),
        }
    }
}

/// Identity and status of the locally attached node.
///
/// Serialized field names are the column names of the remote table.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct NodeRecord {
    #[serde(rename = "Node ID")]
    pub node_id: String,
    #[serde(rename = "Long Name")]
    pub long_name: String,
    #[serde(rename = "Short Name")]
    pub short_name: String,
    #[serde(rename = "Hardware")]
    pub hardware: String,
    #[serde(rename = "Node Number")]
    pub node_number: String,
    #[serde(rename = "MAC Address")]
    pub mac_address: String,
    #[serde(rename = "Public Key")]
    pub public_key: String,
    #[serde(rename = "Role")]
    pub role: String,
    #[serde(rename = "Firmware Version")]
    pub firmware_version: String,
    #[serde(rename = "Managed")]
    pub managed: String,
}

impl NodeRecord {
    /// Field label/value pairs in display order.
    #[must_use]
    pub fn fields(&self) -> [(&'static str, &str); 10] {
        [
            ("node_id", self.node_id.as_str()),
            ("long_name", self.long_name.as_str()),
            ("short_name", self.short_name.as_str()),
            ("hardware", self.hardware.as_str()),
            ("node_number", self.node_number.as_str()),
            ("mac_address", self.mac_address.as_str()),
            ("public_key", self.public_key.as_str()),
            ("role", self.role.as_str()),
            ("firmware_version", self.firmware_version.as_str()),
            ("managed", self.managed.as_str()),
        ]
    }
}

/// Which write was attempted against the record store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOp {
    Update,
    Create,
}

impl std::fmt::Display for WriteOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Update => write!(f, "updating"),
            Self::Create => write!(f, "creating"),
        }
    }
}

/// Result of a single write request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteOutcome {
    /// Store answered 200.
    Accepted,
    /// Store answered anything else.
    Rejected { status: u16, body: String },
}

/// What happened to the remote row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncAction {
    /// Device output could not be parsed; nothing was sent.
    NotParsed { error: Option<String> },
    /// Parsed but not sent (`--dry-run`).
    DryRun,
    /// Existing row was updated.
    Updated { record_id: String },
    /// New row was created.
    Created,
    /// Store refused the write.
    Rejected {
        op: WriteOp,
        status: u16,
        body: String,
    },
}

/// Result of the configuration export step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportOutcome {
    /// Tool exited successfully and the file holds its output.
    Written { path: PathBuf },
    /// Tool exited non-zero; the file is left in place.
    ToolFailed {
        path: PathBuf,
        code: Option<i32>,
        stderr: String,
    },
    /// Directory, file or spawn failure.
    Failed {
        path: Option<PathBuf>,
        message: String,
    },
}

/// Everything a single run produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncReport {
    pub record: Option<NodeRecord>,
    pub action: SyncAction,
    /// `None` when the export step did not run.
    pub export: Option<ExportOutcome>,
}

/// Captured result of a tool invocation whose stdout went to a file.
#[derive(Debug, Clone, Default)]
pub struct ToolStatus {
    pub success: bool,
    pub code: Option<i32>,
    pub stderr: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connection_precedence() {
        let t = ConnectionTarget::select(
            Some("10.0.0.5".into()),
            Some("/dev/ttyUSB0".into()),
            Some("AA:BB".into()),
        );
        assert_eq!(t, ConnectionTarget::Host("10.0.0.5".into()));

        let t = ConnectionTarget::select(None, Some("/dev/ttyUSB0".into()), Some("AA:BB".into()));
        assert_eq!(t, ConnectionTarget::SerialPort("/dev/ttyUSB0".into()));

        let t = ConnectionTarget::select(None, None, Some("AA:BB".into()));
        assert_eq!(t, ConnectionTarget::Ble("AA:BB".into()));

        assert_eq!(
            ConnectionTarget::select(None, None, None),
            ConnectionTarget::Default
        );
    }

    #[test]
    fn test_connection_args_pass_through() {
        let t = ConnectionTarget::Host("not an ip; rm -rf".into());
        assert_eq!(t.args(), vec!["--host", "not an ip; rm -rf"]);
        assert!(ConnectionTarget::Default.args().is_empty());
    }

    #[test]
    fn test_record_serializes_with_column_names() {
        let record = NodeRecord {
            node_id: "!a1b2c3d4".into(),
            node_number: "2712847316".into(),
            ..Default::default()
        };
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["Node ID"], "!a1b2c3d4");
        assert_eq!(json["Node Number"], "2712847316");
        assert_eq!(json["Managed"], "");
        assert_eq!(json.as_object().unwrap().len(), 10);
    }
}
