//! Command history
//!
//! Entries are appended on submit and navigated with a cursor in
//! `[0, len]`, where `len` stands for "past the newest entry" (an empty
//! input line). Navigation itself is the pure [`HistoryView`]; the owning
//! [`CommandHistory`] just stores the cursor it returns.
//!
//! History can be mirrored to a file: loaded once at startup and appended
//! to on every recorded command. File failures are logged and otherwise
//! ignored.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::config::TerminalConfig;
use crate::error::{Error, Result};

/// Read-only cursor over history entries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HistoryView<'a> {
    entries: &'a [String],
    cursor: usize,
}

impl<'a> HistoryView<'a> {
    /// View at `cursor`, clamped to `[0, entries.len()]`
    pub fn new(entries: &'a [String], cursor: usize) -> Self {
        Self {
            entries,
            cursor: cursor.min(entries.len()),
        }
    }

    /// One step towards older entries; stays on the oldest
    pub fn previous(self) -> Self {
        Self {
            cursor: self.cursor.saturating_sub(1),
            ..self
        }
    }

    /// One step towards newer entries; stops past the newest
    pub fn next(self) -> Self {
        Self {
            cursor: (self.cursor + 1).min(self.entries.len()),
            ..self
        }
    }

    /// Entry under the cursor; `None` past the newest
    pub fn current(&self) -> Option<&'a str> {
        self.entries.get(self.cursor).map(String::as_str)
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }
}

/// Bounded, optionally persistent command history
#[derive(Debug, Clone)]
pub struct CommandHistory {
    entries: Vec<String>,
    cursor: usize,
    max_entries: usize,
    skip_duplicates: bool,
    file: Option<PathBuf>,
}

impl CommandHistory {
    pub fn new(max_entries: usize, skip_duplicates: bool) -> Self {
        Self {
            entries: Vec::new(),
            cursor: 0,
            max_entries: max_entries.max(1),
            skip_duplicates,
            file: None,
        }
    }

    /// History configured from the terminal settings, loading the history
    /// file when one is configured
    pub fn from_config(config: &TerminalConfig) -> Self {
        let mut history = Self::new(config.max_history, config.skip_duplicate_history);
        if let Some(path) = &config.history_file {
            if let Err(e) = history.load(path) {
                warn!("Could not load history from {}: {}", path.display(), e);
            }
            history.file = Some(path.clone());
        }
        history
    }

    /// Replace the entries with the contents of `path`
    ///
    /// A missing file is not an error; it simply yields an empty history.
    pub fn load(&mut self, path: &Path) -> Result<()> {
        if !path.exists() {
            return Ok(());
        }
        let content = fs::read_to_string(path).map_err(|e| Error::file_io(path, e))?;

        self.entries = content
            .lines()
            .filter(|line| !line.trim().is_empty())
            .map(str::to_string)
            .collect();
        self.trim();
        self.cursor = self.entries.len();
        debug!("Loaded {} history entries from {}", self.entries.len(), path.display());
        Ok(())
    }

    /// Record a submitted command; returns whether it was added
    ///
    /// The cursor is reset past the newest entry either way.
    pub fn push(&mut self, command: &str) -> bool {
        let command = command.trim();
        let added = !command.is_empty()
            && !(self.skip_duplicates && self.entries.last().map(String::as_str) == Some(command));

        if added {
            self.entries.push(command.to_string());
            self.trim();
            self.append_to_file(command);
        }
        self.cursor = self.entries.len();
        added
    }

    pub fn view(&self) -> HistoryView<'_> {
        HistoryView::new(&self.entries, self.cursor)
    }

    /// Step back (Up key)
    pub fn previous(&mut self) -> Option<&str> {
        self.cursor = self.view().previous().cursor();
        self.entries.get(self.cursor).map(String::as_str)
    }

    /// Step forward (Down key); `None` means the input should be cleared
    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> Option<&str> {
        self.cursor = self.view().next().cursor();
        self.entries.get(self.cursor).map(String::as_str)
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Path the history is mirrored to, if any
    pub fn file(&self) -> Option<&Path> {
        self.file.as_deref()
    }

    fn trim(&mut self) {
        if self.entries.len() > self.max_entries {
            let excess = self.entries.len() - self.max_entries;
            self.entries.drain(..excess);
        }
    }

    fn append_to_file(&self, command: &str) {
        let Some(path) = &self.file else {
            return;
        };
        let written = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .and_then(|mut file| writeln!(file, "{}", command));
        if let Err(e) = written {
            warn!("Could not append to history file {}: {}", path.display(), e);
        }
    }
}

impl Default for CommandHistory {
    fn default() -> Self {
        Self::from_config(&TerminalConfig::default())
    }
}
