//! Highlight rules and compiled rule sets
//!
//! A [`LanguageDefinition`] is the declarative, ordered list of rules for one
//! language. [`RuleSet::compile`] turns it into regexes, dropping (and
//! logging) any pattern that fails to compile so one bad rule never takes
//! the rest of the language down with it.

use once_cell::sync::OnceCell;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

use super::languages;
use crate::models::LanguageId;

/// Style category assigned to a highlighted span
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StyleTag {
    Keyword,
    Builtin,
    String,
    Comment,
    Function,
    Class,
    Number,
    Operator,
    Tag,
    Attribute,
    Variable,
    Decorator,
}

impl StyleTag {
    /// Lowercase name, used as the lookup key by theme providers
    pub fn as_str(self) -> &'static str {
        match self {
            StyleTag::Keyword => "keyword",
            StyleTag::Builtin => "builtin",
            StyleTag::String => "string",
            StyleTag::Comment => "comment",
            StyleTag::Function => "function",
            StyleTag::Class => "class",
            StyleTag::Number => "number",
            StyleTag::Operator => "operator",
            StyleTag::Tag => "tag",
            StyleTag::Attribute => "attribute",
            StyleTag::Variable => "variable",
            StyleTag::Decorator => "decorator",
        }
    }
}

impl fmt::Display for StyleTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One single-line rule: a pattern and the style for its matches
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HighlightRule {
    /// Regular expression source
    pub pattern: String,
    /// Style assigned to each match
    pub style: StyleTag,
    /// Capture group to style; 0 styles the whole match
    pub group: usize,
}

impl HighlightRule {
    pub fn new(pattern: impl Into<String>, style: StyleTag) -> Self {
        Self {
            pattern: pattern.into(),
            style,
            group: 0,
        }
    }

    /// Style only capture group `group` of each match
    pub fn with_group(mut self, group: usize) -> Self {
        self.group = group;
        self
    }
}

/// A construct that may continue onto following blocks
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MultilineRule {
    pub start: String,
    pub end: String,
    pub style: StyleTag,
}

impl MultilineRule {
    pub fn new(start: impl Into<String>, end: impl Into<String>, style: StyleTag) -> Self {
        Self {
            start: start.into(),
            end: end.into(),
            style,
        }
    }
}

/// Declarative rule list for one language
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LanguageDefinition {
    pub language: LanguageId,
    /// Applied in this order; later rules win on overlap
    pub rules: Vec<HighlightRule>,
    /// Applied after `rules`
    pub multiline: Vec<MultilineRule>,
}

impl LanguageDefinition {
    /// Definition with no rules at all
    pub fn plain(language: LanguageId) -> Self {
        Self {
            language,
            rules: Vec::new(),
            multiline: Vec::new(),
        }
    }
}

#[derive(Debug)]
pub(crate) struct CompiledRule {
    pub(crate) regex: Regex,
    pub(crate) style: StyleTag,
    pub(crate) group: usize,
}

#[derive(Debug)]
pub(crate) struct CompiledMultiline {
    pub(crate) start: Regex,
    pub(crate) end: Regex,
    pub(crate) style: StyleTag,
}

/// Compiled, ready-to-run rules for one language
#[derive(Debug)]
pub struct RuleSet {
    language: LanguageId,
    pub(crate) rules: Vec<CompiledRule>,
    pub(crate) multiline: Vec<CompiledMultiline>,
    dropped: Vec<String>,
}

impl RuleSet {
    /// Compile a definition, dropping malformed patterns
    pub fn compile(definition: &LanguageDefinition) -> Self {
        let mut dropped = Vec::new();

        let rules = definition
            .rules
            .iter()
            .filter_map(|rule| match Regex::new(&rule.pattern) {
                Ok(regex) if rule.group < regex.captures_len() => Some(CompiledRule {
                    regex,
                    style: rule.style,
                    group: rule.group,
                }),
                Ok(_) => {
                    warn!(
                        "Dropping {} rule '{}': no capture group {}",
                        definition.language, rule.pattern, rule.group
                    );
                    dropped.push(rule.pattern.clone());
                    None
                }
                Err(e) => {
                    warn!("Dropping {} rule '{}': {}", definition.language, rule.pattern, e);
                    dropped.push(rule.pattern.clone());
                    None
                }
            })
            .collect();

        let multiline = definition
            .multiline
            .iter()
            .filter_map(|rule| match (Regex::new(&rule.start), Regex::new(&rule.end)) {
                (Ok(start), Ok(end)) => Some(CompiledMultiline {
                    start,
                    end,
                    style: rule.style,
                }),
                (Err(e), _) | (_, Err(e)) => {
                    warn!(
                        "Dropping {} multi-line rule '{}'..'{}': {}",
                        definition.language, rule.start, rule.end, e
                    );
                    dropped.push(format!("{}..{}", rule.start, rule.end));
                    None
                }
            })
            .collect();

        Self {
            language: definition.language,
            rules,
            multiline,
            dropped,
        }
    }

    /// Rule set that styles nothing
    pub fn empty(language: LanguageId) -> Self {
        Self::compile(&LanguageDefinition::plain(language))
    }

    pub fn language(&self) -> LanguageId {
        self.language
    }

    /// Number of active single-line rules
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty() && self.multiline.is_empty()
    }

    /// Sources of the patterns that failed to compile
    pub fn dropped(&self) -> &[String] {
        &self.dropped
    }
}

/// Lazily compiled rule sets for every built-in language
///
/// Shared by all highlighters of a session through an `Arc`, so each
/// language's regexes are compiled at most once.
#[derive(Debug, Default)]
pub struct RuleRegistry {
    slots: [OnceCell<Arc<RuleSet>>; LanguageId::ALL.len()],
}

impl RuleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Compiled rules for `language`, compiling on first use
    pub fn get(&self, language: LanguageId) -> Arc<RuleSet> {
        let index = LanguageId::ALL
            .iter()
            .position(|lang| *lang == language)
            .unwrap_or(LanguageId::ALL.len() - 1);
        self.slots[index]
            .get_or_init(|| {
                let rules = RuleSet::compile(&languages::definition(language));
                debug!("Compiled {} highlight rules for {}", rules.len(), language);
                Arc::new(rules)
            })
            .clone()
    }
}
