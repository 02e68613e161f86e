//! Extraction of node identity from the device tool's info output.
//!
//! The tool prints free-form text with JSON objects embedded after fixed
//! labels. Everything that knows about that layout lives here.

use regex::Regex;
use serde_json::{Map, Value};

use crate::domain::{AppError, NodeRecord, Result};

const NODES_PATTERN: &str = r"(?s)Nodes in mesh: (\{.*?\})\r?\n\r?\nPreferences:";
const METADATA_PATTERN: &str = r"Metadata: (\{.*?\})";
const SECURITY_PATTERN: &str = r#"(?s)"security":\s*(\{.*?\})"#;
const MY_INFO_PATTERN: &str = r"My info: (\{.*?\})";

/// Parser for the output of the info query.
#[derive(Debug, Clone)]
pub struct MeshInfoParser {
    nodes: Regex,
    metadata: Regex,
    security: Regex,
    my_info: Regex,
}

impl MeshInfoParser {
    /// Compile the extraction patterns.
    ///
    /// # Errors
    /// Returns error if a pattern fails to compile.
    pub fn new() -> Result<Self> {
        let compile = |pattern: &str| {
            Regex::new(pattern).map_err(|e| AppError::Config {
                message: format!("Invalid extraction pattern {pattern}: {e}"),
            })
        };

        Ok(Self {
            nodes: compile(NODES_PATTERN)?,
            metadata: compile(METADATA_PATTERN)?,
            security: compile(SECURITY_PATTERN)?,
            my_info: compile(MY_INFO_PATTERN)?,
        })
    }

    /// Extract the record of the first node in the reported node table.
    ///
    /// Returns `Ok(None)` when any of the node table, metadata or security
    /// blocks is missing, or when the node table is empty.
    ///
    /// # Errors
    /// Returns error if a matched block is not valid JSON.
    pub fn parse(&self, output: &str) -> Result<Option<NodeRecord>> {
        let (Some(nodes), Some(metadata), Some(security)) = (
            capture(&self.nodes, output),
            capture(&self.metadata, output),
            capture(&self.security, output),
        ) else {
            tracing::debug!("Expected blocks not found in device output");
            return Ok(None);
        };

        let nodes: Map<String, Value> = serde_json::from_str(nodes).map_err(AppError::json_parse)?;
        let metadata: Value = serde_json::from_str(metadata).map_err(AppError::json_parse)?;
        let security: Value = serde_json::from_str(security).map_err(AppError::json_parse)?;

        // Insertion order is preserved, so this is the first node the tool printed.
        let Some((node_id, node)) = nodes.iter().next() else {
            tracing::debug!("Node table is empty");
            return Ok(None);
        };

        if nodes.len() > 1 {
            tracing::debug!(ignored = nodes.len() - 1, "Using first node of table");
        }
        self.check_local_node(output, node);

        let public_key = match text(node, &["user", "publicKey"]) {
            key if key.is_empty() => text(&security, &["publicKey"]),
            key => key,
        };

        let record = NodeRecord {
            node_id: node_id.clone(),
            long_name: text(node, &["user", "longName"]),
            short_name: text(node, &["user", "shortName"]),
            hardware: text(node, &["user", "hwModel"]),
            node_number: text(node, &["num"]),
            mac_address: text(node, &["user", "macaddr"]),
            public_key,
            role: text(&metadata, &["role"]),
            firmware_version: text(&metadata, &["firmwareVersion"]),
            managed: text(&security, &["isManaged"]),
        };

        for (field, value) in record.fields() {
            tracing::debug!(field, value, "Parsed field");
        }

        Ok(Some(record))
    }

    /// Warn when the selected node is not the one the tool reports as local.
    fn check_local_node(&self, output: &str, node: &Value) {
        let Some(my_info) = capture(&self.my_info, output)
            .and_then(|raw| serde_json::from_str::<Value>(raw).ok())
        else {
            return;
        };

        let local = text(&my_info, &["myNodeNum"]);
        let selected = text(node, &["num"]);
        if !local.is_empty() && !selected.is_empty() && local != selected {
            tracing::warn!(
                local_node = %local,
                selected_node = %selected,
                "First node in table is not the locally attached node"
            );
        }
    }
}

fn capture<'a>(re: &Regex, haystack: &'a str) -> Option<&'a str> {
    re.captures(haystack)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
}

/// Walk `path` through nested objects; anything absent or non-scalar is `""`.
fn text(value: &Value, path: &[&str]) -> String {
    let found = path
        .iter()
        .try_fold(value, |current, key| current.get(*key));

    match found {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        _ => String::new(),
    }
}

#[cfg(test)]
pub(crate) const SAMPLE_OUTPUT: &str = r#"Connected to radio
Owner: Hilltop Relay (HTR1)
My info: { "myNodeNum": 2712847316, "rebootCount": 12, "minAppVersion": 30200 }
Metadata: { "firmwareVersion": "2.5.15.79da236", "deviceStateVersion": 23, "canShutdown": true, "hasWifi": true, "role": "ROUTER", "hwModel": "HELTEC_V3" }

Nodes in mesh: {
  "!a1b2c3d4": {
    "num": 2712847316,
    "user": {
      "id": "!a1b2c3d4",
      "longName": "Hilltop Relay",
      "shortName": "HTR1",
      "macaddr": "48:ca:a1:b2:c3:d4",
      "hwModel": "HELTEC_V3",
      "publicKey": "q83vEjRWeJCrze8SNFZ4kKvN7xI0VniQ"
    }
  },
  "!0000beef": {
    "num": 48879,
    "user": {
      "longName": "Neighbour",
      "shortName": "NB"
    }
  }
}

Preferences: {
  "device": {
    "role": "ROUTER"
  },
  "security": {
    "publicKey": "c2VjdXJpdHkta2V5",
    "adminKey": [
      "YWRtaW4="
    ],
    "isManaged": false,
    "serialEnabled": true
  }
}
"#;
