//! User decisions the session needs from its host
//!
//! The session never shows dialogs itself. Whenever a choice is needed it
//! asks a [`SessionPrompt`], which a UI implements with real dialogs and
//! tests implement with scripted answers.

use std::path::PathBuf;

use super::document::Document;

/// Answer to "this document has unsaved changes"
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseDecision {
    Save,
    Discard,
    Cancel,
}

/// Result of a save request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveOutcome {
    Saved(PathBuf),
    /// No path was chosen
    Cancelled,
}

/// Result of a close request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseOutcome {
    Closed,
    Cancelled,
}

pub trait SessionPrompt {
    /// Asked before closing a modified document
    fn confirm_close(&mut self, document: &Document) -> CloseDecision;

    /// Asked when saving a document with no path; `None` cancels
    fn choose_save_path(&mut self, document: &Document) -> Option<PathBuf>;

    /// Asked once before closing the whole session while `unsaved` is non-empty
    fn confirm_close_all(&mut self, unsaved: &[&Document]) -> CloseDecision;
}
