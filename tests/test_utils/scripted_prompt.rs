//! Scripted answers for session prompts

use std::collections::VecDeque;
use std::path::PathBuf;

use lrd_editor::session::{CloseDecision, Document, SessionPrompt};

/// Answers prompts from queues and records what was asked
#[derive(Debug, Default)]
pub struct ScriptedPrompt {
    close_answers: VecDeque<CloseDecision>,
    save_paths: VecDeque<Option<PathBuf>>,
    pub close_asked: Vec<String>,
    pub save_asked: Vec<String>,
    pub close_all_asked: Vec<Vec<String>>,
}

impl ScriptedPrompt {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_close(mut self, decision: CloseDecision) -> Self {
        self.close_answers.push_back(decision);
        self
    }

    pub fn on_save(mut self, path: Option<PathBuf>) -> Self {
        self.save_paths.push_back(path);
        self
    }
}

impl SessionPrompt for ScriptedPrompt {
    fn confirm_close(&mut self, document: &Document) -> CloseDecision {
        self.close_asked.push(document.label());
        self.close_answers
            .pop_front()
            .expect("unexpected close prompt")
    }

    fn choose_save_path(&mut self, document: &Document) -> Option<PathBuf> {
        self.save_asked.push(document.label());
        self.save_paths.pop_front().expect("unexpected save prompt")
    }

    fn confirm_close_all(&mut self, unsaved: &[&Document]) -> CloseDecision {
        self.close_all_asked
            .push(unsaved.iter().map(|document| document.label()).collect());
        self.close_answers
            .pop_front()
            .expect("unexpected close-all prompt")
    }
}
