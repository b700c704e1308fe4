//! Rule-based syntax highlighting
//!
//! A block (one line of a document) is highlighted by running every rule of
//! the document's language in declared order and recording one span per
//! match. Spans are never rejected, so where two rules overlap the later one
//! wins. Block comments and triple-quoted strings are carried from one block
//! to the next through [`BlockState`].
//!
//! ```
//! use lrd_editor::highlight::{Highlighter, RuleRegistry, StyleTag};
//! use lrd_editor::config::HighlightConfig;
//! use lrd_editor::LanguageId;
//! use std::sync::Arc;
//!
//! let registry = Arc::new(RuleRegistry::new());
//! let highlighter = Highlighter::new(registry, LanguageId::Python, &HighlightConfig::default());
//! let block = highlighter.highlight("def f():");
//! assert_eq!(block.style_at(0), Some(StyleTag::Keyword));
//! assert_eq!(block.style_at(4), Some(StyleTag::Function));
//! ```

pub mod languages;
pub mod rules;

use std::collections::HashMap;
use std::ops::Range;
use std::sync::Arc;

use regex::Match;
use serde::{Deserialize, Serialize};

use crate::config::HighlightConfig;
use crate::models::LanguageId;

pub use rules::{HighlightRule, LanguageDefinition, MultilineRule, RuleRegistry, RuleSet, StyleTag};

/// A styled byte range inside one block
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HighlightSpan {
    pub range: Range<usize>,
    pub style: StyleTag,
}

/// Highlighting state carried from the end of one block into the next
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BlockState {
    #[default]
    Normal,
    /// Inside the still-open multi-line construct with this index
    Inside(usize),
}

/// Span assignments for one block, in application order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockHighlight {
    pub spans: Vec<HighlightSpan>,
    pub end_state: BlockState,
}

impl BlockHighlight {
    /// Effective style at a byte offset: the last span covering it
    pub fn style_at(&self, offset: usize) -> Option<StyleTag> {
        self.spans
            .iter()
            .rev()
            .find(|span| span.range.contains(&offset))
            .map(|span| span.style)
    }

    /// Non-overlapping runs after resolving overlaps, left to right
    pub fn resolved(&self) -> Vec<HighlightSpan> {
        let mut bounds: Vec<usize> = self
            .spans
            .iter()
            .flat_map(|span| [span.range.start, span.range.end])
            .collect();
        bounds.sort_unstable();
        bounds.dedup();

        let mut runs: Vec<HighlightSpan> = Vec::new();
        for pair in bounds.windows(2) {
            let (start, end) = (pair[0], pair[1]);
            let Some(style) = self.style_at(start) else {
                continue;
            };
            match runs.last_mut() {
                Some(last) if last.range.end == start && last.style == style => last.range.end = end,
                _ => runs.push(HighlightSpan {
                    range: start..end,
                    style,
                }),
            }
        }
        runs
    }

    pub fn is_empty(&self) -> bool {
        self.spans.is_empty()
    }
}

/// Highlight one block with a compiled rule set
pub fn highlight_block(rules: &RuleSet, text: &str, start_state: BlockState, multiline: bool) -> BlockHighlight {
    let mut spans = Vec::new();

    for rule in &rules.rules {
        for captures in rule.regex.captures_iter(text) {
            if let Some(m) = captures.get(rule.group) {
                if !m.is_empty() {
                    spans.push(HighlightSpan {
                        range: m.range(),
                        style: rule.style,
                    });
                }
            }
        }
    }

    let end_state = if multiline && !rules.multiline.is_empty() {
        apply_multiline(rules, text, start_state, &mut spans)
    } else {
        BlockState::Normal
    };

    BlockHighlight { spans, end_state }
}

fn apply_multiline(rules: &RuleSet, text: &str, start_state: BlockState, spans: &mut Vec<HighlightSpan>) -> BlockState {
    let single_line = spans.len();
    let mut state = start_state;
    let mut pos = 0;

    loop {
        match state {
            BlockState::Inside(index) => {
                let Some(rule) = rules.multiline.get(index) else {
                    state = BlockState::Normal;
                    continue;
                };
                match rule.end.find_at(text, pos) {
                    Some(end) => {
                        push_span(spans, pos..end.end(), rule.style);
                        pos = end.end();
                        state = BlockState::Normal;
                    }
                    None => {
                        push_span(spans, pos..text.len(), rule.style);
                        return state;
                    }
                }
            }
            BlockState::Normal => {
                let next = rules
                    .multiline
                    .iter()
                    .enumerate()
                    .filter_map(|(index, rule)| {
                        next_opening(&rule.start, text, pos, &spans[..single_line]).map(|m| (index, m))
                    })
                    .min_by_key(|(index, m)| (m.start(), *index));

                let Some((index, opening)) = next else {
                    return BlockState::Normal;
                };
                let rule = &rules.multiline[index];
                match rule.end.find_at(text, opening.end()) {
                    Some(end) => {
                        push_span(spans, opening.start()..end.end(), rule.style);
                        pos = end.end();
                    }
                    None => {
                        push_span(spans, opening.start()..text.len(), rule.style);
                        return BlockState::Inside(index);
                    }
                }
            }
        }
    }
}

/// Next non-empty opening match not already sitting inside a comment or string
fn next_opening<'t>(start: &regex::Regex, text: &'t str, mut pos: usize, spans: &[HighlightSpan]) -> Option<Match<'t>> {
    while let Some(m) = start.find_at(text, pos) {
        if m.is_empty() {
            return None;
        }
        let shadowed = spans.iter().any(|span| {
            matches!(span.style, StyleTag::Comment | StyleTag::String)
                && span.range.start < m.start()
                && m.start() < span.range.end
        });
        if !shadowed {
            return Some(m);
        }
        pos = m.end();
    }
    None
}

fn push_span(spans: &mut Vec<HighlightSpan>, range: Range<usize>, style: StyleTag) {
    if !range.is_empty() {
        spans.push(HighlightSpan { range, style });
    }
}

/// Per-document highlighter
///
/// Holds the active rule set and the highlighted blocks of the owning
/// document. Results are memoised per `(line, incoming state)` so
/// re-highlighting after an edit only evaluates lines whose text or
/// incoming state changed.
#[derive(Debug)]
pub struct Highlighter {
    registry: Arc<RuleRegistry>,
    rules: Arc<RuleSet>,
    multiline: bool,
    cache_capacity: usize,
    memo: HashMap<(String, BlockState), BlockHighlight>,
    blocks: Vec<BlockHighlight>,
}

impl Highlighter {
    pub fn new(registry: Arc<RuleRegistry>, language: LanguageId, config: &HighlightConfig) -> Self {
        let rules = registry.get(language);
        Self {
            registry,
            rules,
            multiline: config.multiline,
            cache_capacity: config.cache_capacity.max(1),
            memo: HashMap::new(),
            blocks: Vec::new(),
        }
    }

    pub fn language(&self) -> LanguageId {
        self.rules.language()
    }

    /// Replace the active rules and re-highlight the whole document
    pub fn set_language(&mut self, language: LanguageId, text: &str) {
        if language != self.language() {
            debug!("Highlighter switching {} -> {}", self.language(), language);
            self.rules = self.registry.get(language);
            self.memo.clear();
        }
        self.rehighlight(text);
    }

    /// Highlight a single block starting from [`BlockState::Normal`]
    pub fn highlight(&self, block: &str) -> BlockHighlight {
        self.highlight_with_state(block, BlockState::Normal)
    }

    pub fn highlight_with_state(&self, block: &str, state: BlockState) -> BlockHighlight {
        highlight_block(&self.rules, block, state, self.multiline)
    }

    /// Re-highlight every line of `text`, reusing memoised lines
    pub fn rehighlight(&mut self, text: &str) -> &[BlockHighlight] {
        let mut blocks = Vec::with_capacity(self.blocks.len().max(1));
        let mut state = BlockState::Normal;

        for line in text.split('\n') {
            let key = (line.to_string(), state);
            let block = match self.memo.get(&key) {
                Some(block) => block.clone(),
                None => {
                    let block = highlight_block(&self.rules, line, state, self.multiline);
                    if self.memo.len() >= self.cache_capacity {
                        trace!("Highlight memo full ({} lines), resetting", self.memo.len());
                        self.memo.clear();
                    }
                    self.memo.insert(key, block.clone());
                    block
                }
            };
            state = block.end_state;
            blocks.push(block);
        }

        self.blocks = blocks;
        &self.blocks
    }

    /// Blocks from the last full highlight, one per line
    pub fn blocks(&self) -> &[BlockHighlight] {
        &self.blocks
    }

    /// Effective style at a (0-based) line and byte column
    pub fn style_at(&self, line: usize, column: usize) -> Option<StyleTag> {
        self.blocks.get(line)?.style_at(column)
    }

    /// Number of memoised lines
    pub fn memo_len(&self) -> usize {
        self.memo.len()
    }
}
