//! Builds device tool invocations for a connection target.

use crate::domain::ConnectionTarget;

/// Default program name of the device tool.
pub const DEFAULT_TOOL: &str = "meshtastic";

/// Argument lists for every tool invocation of one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandPlan {
    /// Program to execute.
    pub program: String,
    /// Target the plan was built for.
    pub target: ConnectionTarget,
    /// Connection-specific arguments, shared by the query and the export.
    pub connection_args: Vec<String>,
}

impl CommandPlan {
    /// Create a plan for `program` talking to `target`.
    #[must_use]
    pub fn new(program: impl Into<String>, target: ConnectionTarget) -> Self {
        let connection_args = target.args();
        Self {
            program: program.into(),
            target,
            connection_args,
        }
    }

    /// Arguments for the info query.
    #[must_use]
    pub fn info_args(&self) -> Vec<String> {
        self.with_mode(&["--info", "--no-nodes"])
    }

    /// Arguments for the configuration export.
    #[must_use]
    pub fn export_args(&self) -> Vec<String> {
        self.with_mode(&["--export-config"])
    }

    /// Human-readable description of the connection mode.
    #[must_use]
    pub fn describe(&self) -> String {
        self.target.to_string()
    }

    /// Shell-like rendering of the info query, for display only.
    #[must_use]
    pub fn display_info_command(&self) -> String {
        std::iter::once(self.program.clone())
            .chain(self.info_args())
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn with_mode(&self, mode: &[&str]) -> Vec<String> {
        self.connection_args
            .iter()
            .cloned()
            .chain(mode.iter().map(|s| (*s).to_string()))
            .collect()
    }
}
