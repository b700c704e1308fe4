//! Command Result Model
//!
//! Captured outcome of one spawned process: both output streams, the exit
//! code and whether the wall-clock bound expired first.

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::error::{Error, Result};

/// Execution status of a command
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExecutionStatus {
    /// Process exited with code 0
    Completed,
    /// Process exited with a non-zero code or was killed by a signal
    Failed,
    /// Process exceeded its timeout and was abandoned
    TimedOut,
}

/// Captured outcome of a spawned command
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandResult {
    /// The command text that was executed
    pub command: String,

    /// Directory where command was executed
    pub working_directory: PathBuf,

    /// Captured standard output
    pub stdout: String,

    /// Captured standard error
    pub stderr: String,

    /// Exit code (None if killed by a signal or timed out)
    pub exit_code: Option<i32>,

    /// Whether the timeout elapsed before the process exited
    pub timed_out: bool,

    /// When the command was started (in local time)
    pub started_at: DateTime<Local>,

    /// How long the command took
    pub duration: Duration,
}

impl CommandResult {
    /// Result for a command abandoned after `timeout`
    pub fn timed_out(command: String, working_directory: PathBuf, started_at: DateTime<Local>, timeout: Duration) -> Self {
        Self {
            command,
            working_directory,
            stdout: String::new(),
            stderr: String::new(),
            exit_code: None,
            timed_out: true,
            started_at,
            duration: timeout,
        }
    }

    /// Derived status
    pub fn status(&self) -> ExecutionStatus {
        if self.timed_out {
            ExecutionStatus::TimedOut
        } else if self.exit_code == Some(0) {
            ExecutionStatus::Completed
        } else {
            ExecutionStatus::Failed
        }
    }

    /// Check if the command completed successfully
    pub fn is_success(&self) -> bool {
        self.status() == ExecutionStatus::Completed
    }

    /// Convert a timeout into [`Error::ProcessTimeout`], passing everything else through
    pub fn into_result(self) -> Result<Self> {
        if self.timed_out {
            return Err(Error::ProcessTimeout {
                command: self.command,
                timeout: self.duration,
            });
        }
        Ok(self)
    }
}
