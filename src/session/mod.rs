//! Document session management
//!
//! The [`Session`] owns every open document and the active-document
//! pointer. It is never empty: closing the last document opens a fresh one.
//! All persistence goes through here so a failed open or save leaves the
//! session exactly as it was.

pub mod document;
pub mod prompt;

pub use document::{Document, DocumentHandle, Editable};
pub use prompt::{CloseDecision, CloseOutcome, SaveOutcome, SessionPrompt};

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use uuid::Uuid;

use crate::config::{Config, EditorConfig, HighlightConfig};
use crate::error::{Error, Result};
use crate::highlight::RuleRegistry;
use crate::models::LanguageId;

/// Write `contents` to a sibling temp file, then rename it over `path`
pub(crate) fn write_atomic(path: &Path, contents: &str) -> Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    let name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    let temp = dir.join(format!(".{}.{}.tmp", name, Uuid::new_v4().simple()));

    if let Err(e) = fs::write(&temp, contents) {
        let _ = fs::remove_file(&temp);
        return Err(Error::file_io(path, e));
    }
    if let Err(e) = fs::rename(&temp, path) {
        let _ = fs::remove_file(&temp);
        return Err(Error::file_io(path, e));
    }
    Ok(())
}

/// Canonical form of a save target that may not exist yet
fn canonical_target(path: &Path) -> PathBuf {
    if let Ok(path) = path.canonicalize() {
        return path;
    }
    match (path.parent(), path.file_name()) {
        (Some(parent), Some(name)) => {
            let parent = if parent.as_os_str().is_empty() { Path::new(".") } else { parent };
            parent
                .canonicalize()
                .map(|parent| parent.join(name))
                .unwrap_or_else(|_| path.to_path_buf())
        }
        _ => path.to_path_buf(),
    }
}

/// The set of open documents
#[derive(Debug)]
pub struct Session {
    documents: Vec<Document>,
    active: usize,
    registry: Arc<RuleRegistry>,
    editor: EditorConfig,
    highlight: HighlightConfig,
    untitled_counter: usize,
}

impl Session {
    /// Session holding one empty document
    pub fn new(config: &Config) -> Self {
        Self::with_registry(config, Arc::new(RuleRegistry::new()))
    }

    /// Session sharing an existing rule registry
    pub fn with_registry(config: &Config, registry: Arc<RuleRegistry>) -> Self {
        let mut session = Self {
            documents: Vec::new(),
            active: 0,
            registry,
            editor: config.editor.clone(),
            highlight: config.highlight.clone(),
            untitled_counter: 0,
        };
        session.create_document(None);
        session
    }

    /// New empty document; it becomes active
    pub fn create_document(&mut self, language: Option<LanguageId>) -> DocumentHandle {
        self.untitled_counter += 1;
        let language = language.unwrap_or(self.editor.default_language);
        let document = Document::empty(language, self.untitled_counter, self.registry.clone(), &self.highlight);
        let handle = document.handle();
        debug!("Created {} document {}", language, handle);
        self.push_active(document);
        handle
    }

    /// Open `path`, or focus it when it is already open
    pub fn open_document(&mut self, path: &Path) -> Result<DocumentHandle> {
        let path = path.canonicalize().map_err(|e| Error::file_io(path, e))?;

        if let Some(index) = self.documents.iter().position(|doc| doc.path() == Some(path.as_path())) {
            debug!("{} already open, focusing", path.display());
            self.active = index;
            return Ok(self.documents[index].handle());
        }

        let document = Document::load(&path, self.registry.clone(), &self.highlight)?;
        let handle = document.handle();
        info!("Opened {} as {}", path.display(), document.language());
        self.push_active(document);
        Ok(handle)
    }

    /// Save to the bound path, asking for one when there is none
    pub fn save_document(&mut self, handle: DocumentHandle, prompt: &mut dyn SessionPrompt) -> Result<SaveOutcome> {
        let index = self.index_of(handle)?;
        let document = &self.documents[index];

        let path = match document.path() {
            Some(path) if document.is_path_bound() => path.to_path_buf(),
            _ => match prompt.choose_save_path(document) {
                Some(path) => {
                    self.save_as_document(handle, &path)?;
                    return Ok(SaveOutcome::Saved(path));
                }
                None => {
                    debug!("Save of {} cancelled", handle);
                    return Ok(SaveOutcome::Cancelled);
                }
            },
        };

        write_atomic(&path, document.text())?;
        self.documents[index].mark_clean();
        debug!("Saved {}", path.display());
        Ok(SaveOutcome::Saved(path))
    }

    /// Save under a new path, re-inferring the language from its extension
    ///
    /// Refused when another open document is already bound to `path`.
    pub fn save_as_document(&mut self, handle: DocumentHandle, path: &Path) -> Result<()> {
        let index = self.index_of(handle)?;
        let bound = canonical_target(path);
        let taken = self
            .documents
            .iter()
            .enumerate()
            .any(|(i, doc)| i != index && doc.path() == Some(bound.as_path()));
        if taken {
            return Err(Error::PathAlreadyOpen { path: bound });
        }

        write_atomic(path, self.documents[index].text())?;

        let document = &mut self.documents[index];
        document.mark_saved(&bound);
        let language = LanguageId::from_path(path);
        document.set_language(language);
        info!("Saved {} as {} ({})", handle, path.display(), language);
        Ok(())
    }

    /// Close a document, asking first when it has unsaved changes
    pub fn close_document(&mut self, handle: DocumentHandle, prompt: &mut dyn SessionPrompt) -> Result<CloseOutcome> {
        let index = self.index_of(handle)?;

        if self.documents[index].is_modified() {
            match prompt.confirm_close(&self.documents[index]) {
                CloseDecision::Cancel => return Ok(CloseOutcome::Cancelled),
                CloseDecision::Discard => {}
                CloseDecision::Save => {
                    if self.save_document(handle, prompt)? == SaveOutcome::Cancelled {
                        return Ok(CloseOutcome::Cancelled);
                    }
                }
            }
        }

        self.documents.remove(index);
        debug!("Closed {}", handle);

        if self.documents.is_empty() {
            self.create_document(None);
        } else if index < self.active || self.active >= self.documents.len() {
            self.active = self.active.saturating_sub(1);
        }
        Ok(CloseOutcome::Closed)
    }

    /// Whether any open document has unsaved changes
    pub fn has_unsaved(&self) -> bool {
        self.documents.iter().any(Document::is_modified)
    }

    /// Close every document, asking once when any has unsaved changes
    ///
    /// Save writes path-bound documents and prompts for a path for the
    /// rest; a failed or cancelled save keeps the session as it is. On
    /// success the session holds one fresh empty document.
    pub fn close_all(&mut self, prompt: &mut dyn SessionPrompt) -> Result<CloseOutcome> {
        if self.has_unsaved() {
            let decision = {
                let unsaved: Vec<&Document> = self.documents.iter().filter(|doc| doc.is_modified()).collect();
                prompt.confirm_close_all(&unsaved)
            };
            match decision {
                CloseDecision::Cancel => return Ok(CloseOutcome::Cancelled),
                CloseDecision::Discard => {}
                CloseDecision::Save => {
                    if let Some((handle, e)) = self.auto_save().into_iter().next() {
                        warn!("Close of all documents aborted, {} failed to save", handle);
                        return Err(e);
                    }
                    let untitled: Vec<DocumentHandle> = self
                        .documents
                        .iter()
                        .filter(|doc| doc.is_modified())
                        .map(Document::handle)
                        .collect();
                    for handle in untitled {
                        if self.save_document(handle, prompt)? == SaveOutcome::Cancelled {
                            return Ok(CloseOutcome::Cancelled);
                        }
                    }
                }
            }
        }

        let closed = self.documents.len();
        self.documents.clear();
        self.create_document(None);
        info!("Closed {} documents", closed);
        Ok(CloseOutcome::Closed)
    }

    /// Change a document's language and re-highlight it
    pub fn set_language(&mut self, handle: DocumentHandle, language: LanguageId) -> Result<()> {
        let index = self.index_of(handle)?;
        self.documents[index].set_language(language);
        Ok(())
    }

    /// Save every modified document that has a file; failures are returned,
    /// not raised
    pub fn auto_save(&mut self) -> Vec<(DocumentHandle, Error)> {
        let mut failures = Vec::new();
        for document in &mut self.documents {
            if !document.is_modified() || !document.is_path_bound() {
                continue;
            }
            let Some(path) = document.path().map(Path::to_path_buf) else {
                continue;
            };
            match write_atomic(&path, document.text()) {
                Ok(()) => {
                    document.mark_clean();
                    debug!("Auto-saved {}", path.display());
                }
                Err(e) => {
                    warn!("Auto-save of {} failed: {}", path.display(), e);
                    failures.push((document.handle(), e));
                }
            }
        }
        failures
    }

    /// Focus the next document, wrapping around
    pub fn next_document(&mut self) -> DocumentHandle {
        self.active = (self.active + 1) % self.documents.len();
        self.active_handle()
    }

    /// Focus the previous document, wrapping around
    pub fn previous_document(&mut self) -> DocumentHandle {
        self.active = (self.active + self.documents.len() - 1) % self.documents.len();
        self.active_handle()
    }

    pub fn set_active(&mut self, handle: DocumentHandle) -> Result<()> {
        self.active = self.index_of(handle)?;
        Ok(())
    }

    pub fn active(&self) -> &Document {
        &self.documents[self.active]
    }

    pub fn active_handle(&self) -> DocumentHandle {
        self.documents[self.active].handle()
    }

    pub fn document(&self, handle: DocumentHandle) -> Option<&Document> {
        self.documents.iter().find(|doc| doc.handle() == handle)
    }

    pub fn document_mut(&mut self, handle: DocumentHandle) -> Option<&mut Document> {
        self.documents.iter_mut().find(|doc| doc.handle() == handle)
    }

    /// Editing capability for a document
    pub fn editable(&mut self, handle: DocumentHandle) -> Result<&mut dyn Editable> {
        self.document_mut(handle)
            .map(|doc| doc as &mut dyn Editable)
            .ok_or(Error::DocumentNotFound { handle })
    }

    /// Open documents in tab order
    pub fn documents(&self) -> &[Document] {
        &self.documents
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    /// Always false; kept for API symmetry with `len`
    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    pub fn registry(&self) -> &Arc<RuleRegistry> {
        &self.registry
    }

    fn push_active(&mut self, document: Document) {
        self.documents.push(document);
        self.active = self.documents.len() - 1;
    }

    fn index_of(&self, handle: DocumentHandle) -> Result<usize> {
        self.documents
            .iter()
            .position(|doc| doc.handle() == handle)
            .ok_or(Error::DocumentNotFound { handle })
    }
}
