//! lrd-editor - core of a multi-tab code editor with an embedded terminal
//!
//! This library holds everything of the editor that is not drawing pixels:
//! syntax highlighting, the set of open documents and the command terminal.
//!
//! ## Module Organization
//!
//! - [`highlight`] - Rule tables per language and the per-document highlighter
//! - [`session`] - Open documents, editing, open/save/close flows
//! - [`terminal`] - Built-ins, history, output buffer and the worker-pool dispatcher
//! - [`execution`] - Process spawning with timeouts, run plans, script shortcuts
//! - [`interpreter`] - Detection of installed runtimes and compilers
//! - [`workbench`] - Session and terminal wired together, "run current file"
//! - [`config`] - Configuration structures and file loading
//! - [`models`] - Shared data (languages, output lines, command results)
//! - [`mod@error`] - Error types and Result aliases
//!
//! ## Quick Start
//!
//! ```no_run
//! use lrd_editor::{init, workbench::Workbench};
//!
//! # async fn example() -> lrd_editor::Result<()> {
//! let config = init()?;
//! let mut workbench = Workbench::start(config).await?;
//! workbench.terminal_mut().execute("ls").await;
//! for line in workbench.terminal().output().lines() {
//!     println!("{}", line.text);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Concurrency
//!
//! `Session` and `Terminal` are single-owner values mutated through
//! `&mut self`. Highlighting runs synchronously inside edits. Spawned
//! commands run on tokio, either awaited inline or through the
//! [`terminal::CommandDispatcher`] worker pool.

#[macro_use]
extern crate tracing;

pub mod config;
pub mod error;
pub mod execution;
pub mod highlight;
pub mod interpreter;
pub mod models;
pub mod session;
pub mod terminal;
pub mod workbench;

// Re-exports for core functionality
pub use config::loader::ConfigLoader;
pub use config::Config;
pub use error::{Error, Result};
pub use highlight::{Highlighter, RuleRegistry, StyleTag};
pub use interpreter::{InterpreterMap, Runtime};
pub use models::LanguageId;
pub use session::{Document, DocumentHandle, Editable, Session, SessionPrompt};
pub use terminal::{CommandOutcome, Terminal, TerminalState};
pub use workbench::Workbench;

/// The current version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// The package name from Cargo.toml
pub const NAME: &str = env!("CARGO_PKG_NAME");

/// Load configuration from the default locations
///
/// A missing or unreadable configuration falls back to defaults; an
/// invalid one is reported.
pub fn init() -> Result<Config> {
    info!("Initializing {} v{}", NAME, VERSION);
    let config = ConfigLoader::load()?;
    config.validate()?;
    Ok(config)
}

/// Load configuration from an explicit file
pub fn init_with_config(path: &std::path::Path) -> Result<Config> {
    info!("Initializing {} v{} with {}", NAME, VERSION, path.display());
    ConfigLoader::load_from_path(path)
}
