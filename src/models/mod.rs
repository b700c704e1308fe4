//! Core data models
//!
//! Plain data shared by the highlighting engine, the session manager and
//! the terminal: language tags, terminal output lines and captured command
//! results.

pub mod command_result;
pub mod language;
pub mod output_line;

// Re-exports for convenience
pub use command_result::{CommandResult, ExecutionStatus};
pub use language::LanguageId;
pub use output_line::{OutputKind, OutputLine};
