//! Terminal output buffer

use std::collections::VecDeque;
use std::path::Path;

use crate::models::{OutputKind, OutputLine};

/// Scrollback-bounded list of output lines
#[derive(Debug, Clone)]
pub struct OutputBuffer {
    lines: VecDeque<OutputLine>,
    max_lines: usize,
    next_line_number: usize,
    generation: u64,
}

impl OutputBuffer {
    pub fn new(max_lines: usize) -> Self {
        Self {
            lines: VecDeque::new(),
            max_lines: max_lines.max(1),
            next_line_number: 0,
            generation: 0,
        }
    }

    /// Append one line, dropping the oldest when full
    pub fn push(&mut self, text: impl Into<String>, kind: OutputKind) {
        if self.lines.len() == self.max_lines {
            self.lines.pop_front();
        }
        self.lines.push_back(OutputLine::new(text, kind, self.next_line_number));
        self.next_line_number += 1;
    }

    /// Append every line of `text`; trailing newlines add nothing
    pub fn push_text(&mut self, text: &str, kind: OutputKind) {
        for line in text.lines() {
            self.push(line, kind);
        }
    }

    /// Drop everything and start over with the banner
    pub fn reset(&mut self, cwd: &Path) {
        self.lines.clear();
        self.next_line_number = 0;
        self.generation += 1;
        self.push_banner(cwd);
    }

    pub fn push_banner(&mut self, cwd: &Path) {
        self.push("LRD TERMINAL", OutputKind::Banner);
        self.push(format!("Directory: {}", cwd.display()), OutputKind::Banner);
        self.push("Type commands below. Type 'help' for assistance.", OutputKind::Banner);
    }

    /// Bumped on every reset; line numbers restart from zero with it
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn lines(&self) -> impl DoubleEndedIterator<Item = &OutputLine> {
        self.lines.iter()
    }

    pub fn last(&self) -> Option<&OutputLine> {
        self.lines.back()
    }

    /// Text of every line, newline separated
    pub fn text(&self) -> String {
        self.lines
            .iter()
            .map(|line| line.text.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}
