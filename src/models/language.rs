//! Language Model
//!
//! The closed set of languages the editor knows how to highlight, and the
//! static extension table used to infer a document's language from its path.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// Language tag attached to every document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LanguageId {
    Python,
    JavaScript,
    Html,
    Css,
    Java,
    Cpp,
    C,
    Php,
    Sql,
    Bash,
    /// Plain text, no highlighting rules
    #[default]
    Text,
}

impl LanguageId {
    /// Every language, in menu order
    pub const ALL: [LanguageId; 11] = [
        LanguageId::Python,
        LanguageId::JavaScript,
        LanguageId::Html,
        LanguageId::Css,
        LanguageId::Java,
        LanguageId::Cpp,
        LanguageId::C,
        LanguageId::Php,
        LanguageId::Sql,
        LanguageId::Bash,
        LanguageId::Text,
    ];

    /// Lowercase tag, e.g. `python`
    pub fn as_str(self) -> &'static str {
        match self {
            LanguageId::Python => "python",
            LanguageId::JavaScript => "javascript",
            LanguageId::Html => "html",
            LanguageId::Css => "css",
            LanguageId::Java => "java",
            LanguageId::Cpp => "cpp",
            LanguageId::C => "c",
            LanguageId::Php => "php",
            LanguageId::Sql => "sql",
            LanguageId::Bash => "bash",
            LanguageId::Text => "text",
        }
    }

    /// Resolve a tag, falling back to [`LanguageId::Text`] for anything unknown
    pub fn from_tag(tag: &str) -> Self {
        let tag = tag.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|lang| lang.as_str() == tag)
            .unwrap_or(LanguageId::Text)
    }

    /// Map a file extension (without the dot, any case) to a language
    pub fn from_extension(ext: &str) -> Self {
        match ext.to_ascii_lowercase().as_str() {
            "py" => LanguageId::Python,
            "js" => LanguageId::JavaScript,
            "html" | "htm" => LanguageId::Html,
            "css" => LanguageId::Css,
            "java" => LanguageId::Java,
            "cpp" | "cc" | "cxx" => LanguageId::Cpp,
            "c" => LanguageId::C,
            "php" => LanguageId::Php,
            "sql" => LanguageId::Sql,
            "sh" | "bash" => LanguageId::Bash,
            _ => LanguageId::Text,
        }
    }

    /// Infer the language of a file from its extension
    pub fn from_path(path: &Path) -> Self {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(Self::from_extension)
            .unwrap_or(LanguageId::Text)
    }

    /// Whether this language carries highlighting rules
    pub fn is_plain_text(self) -> bool {
        matches!(self, LanguageId::Text)
    }
}

impl fmt::Display for LanguageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LanguageId {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from_tag(s))
    }
}
