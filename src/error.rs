//! Error types and Result aliases for the editor core

use std::path::PathBuf;
use std::time::Duration;

use crate::interpreter::Runtime;
use crate::models::LanguageId;
use crate::session::DocumentHandle;

/// Result type alias for editor operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the editor core
#[derive(Debug, thiserror::Error)]
pub enum Error {
    // === Document errors ===
    /// Reading, writing or decoding a file failed
    #[error("File operation failed for '{}': {source}", .path.display())]
    FileIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Handle does not name an open document
    #[error("Document '{handle}' is not open")]
    DocumentNotFound { handle: DocumentHandle },

    /// Edit offset or range does not fit the buffer
    #[error("Invalid edit at byte {offset}: {reason}")]
    InvalidEdit { offset: usize, reason: String },

    /// Document must be saved to a path first
    #[error("Document has not been saved to a file")]
    DocumentNotSaved,

    /// Another open document is already bound to this path
    #[error("'{}' is already open in another tab", .path.display())]
    PathAlreadyOpen { path: PathBuf },

    // === Terminal errors ===
    /// `cd` target does not exist
    #[error("Directory not found: {}", .path.display())]
    DirectoryNotFound { path: PathBuf },

    /// Spawned command exceeded its time bound
    #[error("Command '{command}' timed out after {timeout:?}")]
    ProcessTimeout { command: String, timeout: Duration },

    /// The OS could not start the program
    #[error("Failed to spawn '{command}': {reason}")]
    ProcessSpawn { command: String, reason: String },

    /// Empty command line
    #[error("Command cannot be empty")]
    EmptyCommand,

    /// Worker pool is no longer accepting jobs
    #[error("Command dispatcher has shut down")]
    DispatcherClosed,

    // === Run errors ===
    /// Required runtime was not detected at startup
    #[error("No {runtime} runtime detected")]
    NoInterpreter { runtime: Runtime },

    /// Language cannot be executed
    #[error("Running {language} files is not supported")]
    UnsupportedRunLanguage { language: LanguageId },

    // === Configuration errors ===
    /// Configuration file not found
    #[error("Configuration file not found")]
    ConfigNotFound,

    /// Failed to load configuration file
    #[error("Failed to load config from '{}': {reason}", .path.display())]
    ConfigLoadFailed { path: PathBuf, reason: String },

    /// Failed to parse configuration
    #[error("Failed to parse {format} config: {reason}")]
    ConfigParseFailed { format: String, reason: String },

    /// Failed to serialize configuration
    #[error("Failed to serialize config as {format}: {reason}")]
    ConfigSerializationFailed { format: String, reason: String },

    /// Configuration validation failed
    #[error("Configuration validation failed for '{field}': {reason}")]
    ConfigValidationFailed { field: String, reason: String },

    // === Wrapped errors ===
    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON errors
    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing errors
    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Regex compilation errors
    #[error("Regex compilation error: {0}")]
    Regex(#[from] regex::Error),

    /// Generic errors (use sparingly)
    #[error("Error: {0}")]
    Other(String),
}

impl Error {
    /// Wrap an I/O failure on `path`
    pub fn file_io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::FileIo {
            path: path.into(),
            source,
        }
    }

    /// Whether this is an open/save failure
    pub fn is_file_io(&self) -> bool {
        matches!(self, Error::FileIo { .. })
    }
}

impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Error::Other(err.to_string())
    }
}

impl From<String> for Error {
    fn from(err: String) -> Self {
        Error::Other(err)
    }
}

impl From<&str> for Error {
    fn from(err: &str) -> Self {
        Error::Other(err.to_string())
    }
}
