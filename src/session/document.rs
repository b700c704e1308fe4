//! Documents
//!
//! A document is a text buffer with an optional backing file, one language
//! and its own highlighter. Every mutation goes through [`Editable`], which
//! marks the document modified and re-highlights it.

use std::fmt;
use std::fs;
use std::io;
use std::ops::Range;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use uuid::Uuid;

use crate::config::HighlightConfig;
use crate::error::{Error, Result};
use crate::highlight::{BlockHighlight, Highlighter, RuleRegistry};
use crate::models::LanguageId;

/// Stable identity of an open document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DocumentHandle(Uuid);

impl DocumentHandle {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for DocumentHandle {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for DocumentHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Buffer editing capability
///
/// Offsets are byte offsets into the UTF-8 buffer and must fall on
/// character boundaries.
pub trait Editable {
    fn text(&self) -> &str;

    /// Insert `text` at `offset`
    fn insert(&mut self, offset: usize, text: &str) -> Result<()>;

    /// Remove the bytes in `range`
    fn delete(&mut self, range: Range<usize>) -> Result<()>;

    /// Replace the whole buffer
    fn replace_all(&mut self, text: &str);

    /// Replace every occurrence of `find`; returns how many were replaced
    fn replace_all_matches(&mut self, find: &str, replace: &str) -> usize;

    /// First occurrence of `needle` at or after byte `from`
    fn find(&self, needle: &str, from: usize) -> Option<Range<usize>> {
        if needle.is_empty() {
            return None;
        }
        let start = from + self.text().get(from..)?.find(needle)?;
        Some(start..start + needle.len())
    }
}

/// One open document
#[derive(Debug)]
pub struct Document {
    handle: DocumentHandle,
    path: Option<PathBuf>,
    text: String,
    language: LanguageId,
    modified: bool,
    path_bound: bool,
    untitled_index: usize,
    highlighter: Highlighter,
}

impl Document {
    /// New empty, unsaved document
    pub(crate) fn empty(
        language: LanguageId,
        untitled_index: usize,
        registry: Arc<RuleRegistry>,
        config: &HighlightConfig,
    ) -> Self {
        let mut highlighter = Highlighter::new(registry, language, config);
        highlighter.rehighlight("");
        Self {
            handle: DocumentHandle::new(),
            path: None,
            text: String::new(),
            language,
            modified: false,
            path_bound: false,
            untitled_index,
            highlighter,
        }
    }

    /// Document loaded from `path`, language inferred from its extension
    pub(crate) fn load(path: &Path, registry: Arc<RuleRegistry>, config: &HighlightConfig) -> Result<Self> {
        let bytes = fs::read(path).map_err(|e| Error::file_io(path, e))?;
        let text = String::from_utf8(bytes)
            .map_err(|e| Error::file_io(path, io::Error::new(io::ErrorKind::InvalidData, e)))?;

        let language = LanguageId::from_path(path);
        let mut highlighter = Highlighter::new(registry, language, config);
        highlighter.rehighlight(&text);

        Ok(Self {
            handle: DocumentHandle::new(),
            path: Some(path.to_path_buf()),
            text,
            language,
            modified: false,
            path_bound: true,
            untitled_index: 0,
            highlighter,
        })
    }

    pub fn handle(&self) -> DocumentHandle {
        self.handle
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn language(&self) -> LanguageId {
        self.language
    }

    pub fn is_modified(&self) -> bool {
        self.modified
    }

    /// Whether the document was ever loaded from or saved to a real file
    pub fn is_path_bound(&self) -> bool {
        self.path_bound
    }

    /// Tab label: file name or `Untitled-N`, with `*` when modified
    pub fn label(&self) -> String {
        let name = self
            .path
            .as_deref()
            .and_then(Path::file_name)
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| format!("Untitled-{}", self.untitled_index));
        if self.modified {
            format!("{}*", name)
        } else {
            name
        }
    }

    /// Number of lines; an empty buffer has one
    pub fn line_count(&self) -> usize {
        self.text.split('\n').count()
    }

    /// 1-based line and column (in characters) of a byte offset
    pub fn cursor_position(&self, offset: usize) -> Option<(usize, usize)> {
        if !self.text.is_char_boundary(offset) {
            return None;
        }
        let before = &self.text[..offset];
        let line = before.matches('\n').count() + 1;
        let line_start = before.rfind('\n').map(|i| i + 1).unwrap_or(0);
        let column = before[line_start..].chars().count() + 1;
        Some((line, column))
    }

    /// Highlighted blocks, one per line
    pub fn highlights(&self) -> &[BlockHighlight] {
        self.highlighter.blocks()
    }

    pub fn highlighter(&self) -> &Highlighter {
        &self.highlighter
    }

    pub(crate) fn set_language(&mut self, language: LanguageId) {
        self.language = language;
        self.highlighter.set_language(language, &self.text);
    }

    /// Record a successful write to `path`
    pub(crate) fn mark_saved(&mut self, path: &Path) {
        self.path = Some(path.to_path_buf());
        self.path_bound = true;
        self.modified = false;
    }

    pub(crate) fn mark_clean(&mut self) {
        self.modified = false;
    }

    fn check_offset(&self, offset: usize) -> Result<()> {
        if offset > self.text.len() {
            return Err(Error::InvalidEdit {
                offset,
                reason: format!("past end of buffer ({} bytes)", self.text.len()),
            });
        }
        if !self.text.is_char_boundary(offset) {
            return Err(Error::InvalidEdit {
                offset,
                reason: "not on a character boundary".to_string(),
            });
        }
        Ok(())
    }

    fn edited(&mut self) {
        self.modified = true;
        self.highlighter.rehighlight(&self.text);
    }
}

impl Editable for Document {
    fn text(&self) -> &str {
        &self.text
    }

    fn insert(&mut self, offset: usize, text: &str) -> Result<()> {
        self.check_offset(offset)?;
        self.text.insert_str(offset, text);
        self.edited();
        Ok(())
    }

    fn delete(&mut self, range: Range<usize>) -> Result<()> {
        if range.start > range.end {
            return Err(Error::InvalidEdit {
                offset: range.start,
                reason: format!("range end {} before start", range.end),
            });
        }
        self.check_offset(range.start)?;
        self.check_offset(range.end)?;
        self.text.replace_range(range, "");
        self.edited();
        Ok(())
    }

    fn replace_all(&mut self, text: &str) {
        self.text.clear();
        self.text.push_str(text);
        self.edited();
    }

    fn replace_all_matches(&mut self, find: &str, replace: &str) -> usize {
        if find.is_empty() {
            return 0;
        }
        let count = self.text.matches(find).count();
        if count > 0 {
            self.text = self.text.replace(find, replace);
            self.edited();
        }
        count
    }
}
