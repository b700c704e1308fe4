//! Configuration management
//!
//! Serde-backed configuration for every component of the editor core:
//! default document language, highlighting behaviour, terminal limits and
//! interpreter probing. Every timeout lives here rather than in code.

pub mod loader;

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::error::{Error, Result};
use crate::models::LanguageId;

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Document/session configuration
    pub editor: EditorConfig,

    /// Highlighting engine configuration
    pub highlight: HighlightConfig,

    /// Terminal configuration
    pub terminal: TerminalConfig,

    /// Interpreter probing configuration
    pub interpreters: InterpreterConfig,
}

impl Config {
    /// Check limits and required fields
    pub fn validate(&self) -> Result<()> {
        if self.terminal.command_timeout_ms == 0 {
            return Err(invalid("terminal.command_timeout_ms", "must be greater than zero"));
        }
        if self.interpreters.probe_timeout_ms == 0 {
            return Err(invalid("interpreters.probe_timeout_ms", "must be greater than zero"));
        }
        if !(1..=64).contains(&self.terminal.worker_count) {
            return Err(invalid("terminal.worker_count", "must be between 1 and 64"));
        }
        if self.terminal.max_history == 0 {
            return Err(invalid("terminal.max_history", "must be greater than zero"));
        }
        if self.terminal.shell_path.as_os_str().is_empty() {
            return Err(invalid("terminal.shell_path", "cannot be empty"));
        }
        Ok(())
    }
}

fn invalid(field: &str, reason: &str) -> Error {
    Error::ConfigValidationFailed {
        field: field.to_string(),
        reason: reason.to_string(),
    }
}

/// Document and session configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Language given to new, empty documents
    pub default_language: LanguageId,

    /// Whether the host should call `Session::auto_save` periodically
    pub auto_save: bool,

    /// Interval between auto-save passes in seconds
    pub auto_save_interval_secs: u64,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            default_language: LanguageId::Python,
            auto_save: false,
            auto_save_interval_secs: 30,
        }
    }
}

/// Highlighting engine configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HighlightConfig {
    /// Carry open block comments / triple-quoted strings across lines
    pub multiline: bool,

    /// Maximum memoised lines per document before the memo is reset
    pub cache_capacity: usize,
}

impl Default for HighlightConfig {
    fn default() -> Self {
        Self {
            multiline: true,
            cache_capacity: 8192,
        }
    }
}

/// Terminal-specific configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TerminalConfig {
    /// Shell used for non built-in commands
    pub shell_path: PathBuf,

    /// Arguments placed before the command string
    pub shell_args: Vec<String>,

    /// Initial working directory (process cwd when unset)
    pub working_directory: Option<PathBuf>,

    /// Wall-clock bound for every spawned command, in milliseconds
    pub command_timeout_ms: u64,

    /// Skip a command identical to the previous history entry
    pub skip_duplicate_history: bool,

    /// Maximum number of history entries kept
    pub max_history: usize,

    /// Optional file the history is loaded from and appended to
    pub history_file: Option<PathBuf>,

    /// Maximum number of output lines kept
    pub scrollback_lines: usize,

    /// Worker count for the pooled dispatcher
    pub worker_count: usize,
}

impl TerminalConfig {
    /// Spawn timeout as a `Duration`
    pub fn command_timeout(&self) -> Duration {
        Duration::from_millis(self.command_timeout_ms)
    }
}

impl Default for TerminalConfig {
    fn default() -> Self {
        #[cfg(windows)]
        let (shell_path, shell_args) = (PathBuf::from("cmd"), vec!["/C".to_string()]);
        #[cfg(not(windows))]
        let (shell_path, shell_args) = (PathBuf::from("/bin/sh"), vec!["-c".to_string()]);

        Self {
            shell_path,
            shell_args,
            working_directory: None,
            command_timeout_ms: 30_000,
            skip_duplicate_history: true,
            max_history: 1000,
            history_file: None,
            scrollback_lines: 10_000,
            worker_count: 4,
        }
    }
}

/// Interpreter probing configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InterpreterConfig {
    /// Bound for each "is this runtime present" probe, in milliseconds
    pub probe_timeout_ms: u64,
}

impl InterpreterConfig {
    /// Probe timeout as a `Duration`
    pub fn probe_timeout(&self) -> Duration {
        Duration::from_millis(self.probe_timeout_ms)
    }
}

impl Default for InterpreterConfig {
    fn default() -> Self {
        Self {
            probe_timeout_ms: 1000,
        }
    }
}

/// Configuration utilities
pub mod utils {
    use super::*;
    use crate::config::loader::ConfigFormat;
    use std::path::Path;

    /// Get configuration file format from path
    pub fn get_config_format(path: &Path) -> Option<ConfigFormat> {
        match path.extension()?.to_str()? {
            "toml" => Some(ConfigFormat::Toml),
            "json" => Some(ConfigFormat::Json),
            _ => None,
        }
    }

    /// Create a default configuration file content
    pub fn create_default_config_content(format: ConfigFormat) -> Result<String> {
        let config = Config::default();
        match format {
            ConfigFormat::Toml => {
                toml::to_string_pretty(&config).map_err(|e| Error::ConfigSerializationFailed {
                    format: "TOML".to_string(),
                    reason: e.to_string(),
                })
            }
            ConfigFormat::Json => {
                serde_json::to_string_pretty(&config).map_err(|e| Error::ConfigSerializationFailed {
                    format: "JSON".to_string(),
                    reason: e.to_string(),
                })
            }
        }
    }

    /// Overlay non-zero / non-empty fields of `overlay` onto `base`
    pub fn merge_configs(base: Config, overlay: Config) -> Config {
        Config {
            editor: EditorConfig {
                default_language: overlay.editor.default_language,
                auto_save: overlay.editor.auto_save,
                auto_save_interval_secs: if overlay.editor.auto_save_interval_secs == 0 {
                    base.editor.auto_save_interval_secs
                } else {
                    overlay.editor.auto_save_interval_secs
                },
            },
            highlight: HighlightConfig {
                multiline: overlay.highlight.multiline,
                cache_capacity: if overlay.highlight.cache_capacity == 0 {
                    base.highlight.cache_capacity
                } else {
                    overlay.highlight.cache_capacity
                },
            },
            terminal: merge_terminal_configs(base.terminal, overlay.terminal),
            interpreters: InterpreterConfig {
                probe_timeout_ms: if overlay.interpreters.probe_timeout_ms == 0 {
                    base.interpreters.probe_timeout_ms
                } else {
                    overlay.interpreters.probe_timeout_ms
                },
            },
        }
    }

    fn merge_terminal_configs(base: TerminalConfig, overlay: TerminalConfig) -> TerminalConfig {
        TerminalConfig {
            shell_path: if overlay.shell_path.as_os_str().is_empty() { base.shell_path } else { overlay.shell_path },
            shell_args: if overlay.shell_args.is_empty() { base.shell_args } else { overlay.shell_args },
            working_directory: overlay.working_directory.or(base.working_directory),
            command_timeout_ms: if overlay.command_timeout_ms == 0 { base.command_timeout_ms } else { overlay.command_timeout_ms },
            skip_duplicate_history: overlay.skip_duplicate_history,
            max_history: if overlay.max_history == 0 { base.max_history } else { overlay.max_history },
            history_file: overlay.history_file.or(base.history_file),
            scrollback_lines: if overlay.scrollback_lines == 0 { base.scrollback_lines } else { overlay.scrollback_lines },
            worker_count: if overlay.worker_count == 0 { base.worker_count } else { overlay.worker_count },
        }
    }
}
