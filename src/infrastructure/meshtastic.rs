//! Subprocess adapter for the Meshtastic command-line tool.

use std::fs::File;
use std::process::Stdio;

use tokio::process::Command;

use crate::domain::{AppError, DeviceTool, Result, ToolStatus};

/// Runs the device tool as a child process. No timeout is applied.
#[derive(Debug, Clone)]
pub struct MeshtasticCli {
    program: String,
}

impl MeshtasticCli {
    /// Create an adapter for `program` (name on `PATH` or a path).
    #[must_use]
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl DeviceTool for MeshtasticCli {
    async fn capture(&self, args: &[String]) -> Result<String> {
        tracing::debug!(program = %self.program, ?args, "Running device tool");

        let output = Command::new(&self.program)
            .args(args)
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|e| AppError::subprocess(format!("Failed to run {}", self.program), e))?;

        if !output.status.success() {
            tracing::warn!(code = ?output.status.code(), "Device tool exited with failure");
        }

        let stderr = String::from_utf8_lossy(&output.stderr);
        if !stderr.trim().is_empty() {
            tracing::debug!(stderr = %stderr.trim(), "Device tool stderr");
        }

        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }

    async fn run_to_file(&self, args: &[String], dest: File) -> Result<ToolStatus> {
        tracing::debug!(program = %self.program, ?args, "Running device tool into file");

        // Spawned directly so stdout stays redirected into `dest`.
        let child = Command::new(&self.program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::from(dest))
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| AppError::subprocess(format!("Failed to run {}", self.program), e))?;

        let output = child
            .wait_with_output()
            .await
            .map_err(|e| {
                AppError::subprocess(format!("Failed waiting for {}", self.program), e)
            })?;

        Ok(ToolStatus {
            success: output.status.success(),
            code: output.status.code(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}
