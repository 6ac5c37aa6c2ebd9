//! Subprocess execution for the platform routing tools
//!
//! The executor is the only component that touches the operating system.
//! Commands are built as structured argument lists and only joined into a
//! single string for display; the argv form is what actually gets spawned.
//!
//! A non-zero exit code is NOT an error here. The routing tool returns
//! non-zero for both fatal and informational conditions, so callers inspect
//! `CommandOutput::exit_code` and `stderr` to decide what happened.

use std::fmt;
use std::time::Duration;
use thiserror::Error;
use tokio::process::Command;
use tracing::debug;

#[derive(Error, Debug)]
pub enum ExecError {
    #[error("command timed out after {seconds}s: {command}")]
    Timeout { command: String, seconds: u64 },
    #[error("failed to launch {command}: {source}")]
    Launch {
        command: String,
        source: std::io::Error,
    },
}

/// A platform command as a structured argument list.
///
/// Serialized to a single string only for logging and user confirmation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedCommand {
    pub program: String,
    pub args: Vec<String>,
}

impl RenderedCommand {
    pub fn new(program: &str, args: Vec<String>) -> Self {
        Self {
            program: program.to_string(),
            args,
        }
    }
}

impl fmt::Display for RenderedCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}

/// Captured result of a completed subprocess.
#[derive(Debug, Clone)]
pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
    /// Exit code; `None` if the process was terminated by a signal.
    pub exit_code: Option<i32>,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }
}

/// Run a command and drain both output streams, bounded by `timeout`.
///
/// Exactly one subprocess is spawned per call. The child is killed if the
/// timeout elapses before it exits.
pub async fn run(command: &RenderedCommand, timeout: Duration) -> Result<CommandOutput, ExecError> {
    debug!("Executing: {} (timeout {:?})", command, timeout);

    let output = Command::new(&command.program)
        .args(&command.args)
        .kill_on_drop(true)
        .output();

    let output = match tokio::time::timeout(timeout, output).await {
        Ok(result) => result.map_err(|e| ExecError::Launch {
            command: command.to_string(),
            source: e,
        })?,
        Err(_) => {
            return Err(ExecError::Timeout {
                command: command.to_string(),
                seconds: timeout.as_secs(),
            });
        }
    };

    let result = CommandOutput {
        stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        exit_code: output.status.code(),
    };

    debug!(
        "Command finished: exit={:?}, {} bytes stdout, {} bytes stderr",
        result.exit_code,
        result.stdout.len(),
        result.stderr.len()
    );

    Ok(result)
}
