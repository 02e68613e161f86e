//! Operator-facing output for a sync run.

use colored::Colorize;
use comfy_table::{presets::UTF8_FULL, Table};

use crate::domain::{ExportOutcome, NodeRecord, SyncAction, SyncReport};

/// Formats the parsed node as a two-column table.
pub fn format_record_table(record: &NodeRecord) -> String {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(vec!["Field", "Value"]);

    for (field, value) in record.fields() {
        let value = if value.is_empty() { "-" } else { value };
        table.add_row(vec![field.to_string(), truncate(value, 48)]);
    }

    table.to_string()
}

/// Formats the outcome of the record store step.
pub fn format_action(action: &SyncAction, record: Option<&NodeRecord>) -> String {
    let node_id = record.map_or("", |r| r.node_id.as_str());

    match action {
        SyncAction::NotParsed { error } => {
            let mut out = String::new();
            if let Some(error) = error {
                out.push_str(&format!("{} {error}\n", "Error parsing JSON:".red()));
            }
            out.push_str(&"⚠️  Could not parse Meshtastic output.".yellow().to_string());
            out
        }
        SyncAction::DryRun => format!(
            "{} Dry run: record for Node ID {node_id} was not sent",
            "ℹ".blue().bold()
        ),
        SyncAction::Updated { record_id } => format!(
            "{} Updated record {record_id} for Node ID: {node_id}",
            "✓".green().bold()
        ),
        SyncAction::Created => format!(
            "{} Created new record for Node ID: {node_id}",
            "✓".green().bold()
        ),
        SyncAction::Rejected { op, status, body } => format!(
            "{} Error {op} record: {status}, {body}",
            "✗".red().bold()
        ),
    }
}

/// Formats the outcome of the configuration export.
pub fn format_export(outcome: &ExportOutcome) -> String {
    match outcome {
        ExportOutcome::Written { path } => {
            format!("{} Config exported to {}", "📁".bold(), path.display())
        }
        ExportOutcome::ToolFailed { path, code, stderr } => {
            let code = code.map_or_else(|| "signal".to_string(), |c| c.to_string());
            format!(
                "{} Config export failed (exit {code}), partial file kept at {}: {stderr}",
                "✗".red().bold(),
                path.display()
            )
        }
        ExportOutcome::Failed { path, message } => {
            let location = path
                .as_ref()
                .map(|p| format!(" ({})", p.display()))
                .unwrap_or_default();
            format!("{} Config export error{location}: {message}", "✗".red().bold())
        }
    }
}

/// Formats the whole run report.
pub fn format_report(report: &SyncReport) -> String {
    let mut out = format_action(&report.action, report.record.as_ref());

    if let Some(export) = &report.export {
        out.push('\n');
        out.push_str(&format_export(export));
    }

    out
}

/// Truncates a string to max length with ellipsis.
fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max_len - 3).collect();
        format!("{cut}...")
    }
}
