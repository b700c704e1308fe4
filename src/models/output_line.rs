//! Output Line Model
//!
//! Represents a single line of terminal output. Lines carry a kind so the
//! display layer can color command echoes, stderr and notices differently.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Where a line of terminal output came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputKind {
    /// Echo of a submitted command line
    Command,
    /// Captured standard output
    Stdout,
    /// Captured standard error
    Stderr,
    /// Informational notice (exit codes, cwd changes, listings)
    Info,
    /// Failure reported inline (spawn errors, timeouts, missing directories)
    Error,
    /// Welcome banner
    Banner,
}

/// Represents a single line of terminal output
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputLine {
    /// The actual text content
    pub text: String,

    /// Origin of the line
    pub kind: OutputKind,

    /// Position in the output (line number)
    pub line_number: usize,

    /// When this line was appended
    pub timestamp: DateTime<Utc>,
}

impl OutputLine {
    /// Create a new output line
    pub fn new(text: impl Into<String>, kind: OutputKind, line_number: usize) -> Self {
        Self {
            text: text.into(),
            kind,
            line_number,
            timestamp: Utc::now(),
        }
    }

    /// Check if line is empty or whitespace only
    pub fn is_empty(&self) -> bool {
        self.text.trim().is_empty()
    }

    /// Whether the line reports a failure
    pub fn is_error(&self) -> bool {
        matches!(self.kind, OutputKind::Error | OutputKind::Stderr)
    }
}
