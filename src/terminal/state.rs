//! Terminal State

use serde::{Deserialize, Serialize};
use std::fmt;

/// What the terminal is doing right now
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TerminalState {
    /// Waiting for input
    #[default]
    Idle,
    /// Awaiting a spawned command inline
    Executing { command: String },
    /// Commands handed to the worker pool and not yet drained
    Dispatched { in_flight: usize },
}

impl TerminalState {
    pub fn is_idle(&self) -> bool {
        matches!(self, TerminalState::Idle)
    }
}

impl fmt::Display for TerminalState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TerminalState::Idle => write!(f, "idle"),
            TerminalState::Executing { command } => write!(f, "executing '{}'", command),
            TerminalState::Dispatched { in_flight } => write!(f, "{} command(s) in flight", in_flight),
        }
    }
}
