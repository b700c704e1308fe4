//! Built-in rule tables
//!
//! Rules run top to bottom and the last matching rule wins, so every table
//! follows the same layering: keywords and builtins first, then numbers and
//! declaration names, then strings, then comments on top.

use super::rules::{HighlightRule, LanguageDefinition, MultilineRule, StyleTag};
use crate::models::LanguageId;

/// Rule table for `language`
pub fn definition(language: LanguageId) -> LanguageDefinition {
    match language {
        LanguageId::Python => python(),
        LanguageId::JavaScript => javascript(),
        LanguageId::Html => html(),
        LanguageId::Css => css(),
        LanguageId::Java => java(),
        LanguageId::Cpp => cpp(),
        LanguageId::C => c(),
        LanguageId::Php => php(),
        LanguageId::Sql => sql(),
        LanguageId::Bash => bash(),
        LanguageId::Text => LanguageDefinition::plain(LanguageId::Text),
    }
}

/// One rule matching any of `words` as a whole word
fn words(words: &[&str], style: StyleTag) -> HighlightRule {
    HighlightRule::new(format!(r"\b(?:{})\b", words.join("|")), style)
}

const DOUBLE_QUOTED: &str = r#""[^"\\]*(?:\\.[^"\\]*)*""#;
const SINGLE_QUOTED: &str = r"'[^'\\]*(?:\\.[^'\\]*)*'";
const NUMBER: &str = r"\b\d+(?:\.\d+)?\b";
const LINE_COMMENT: &str = r"//.*";

fn block_comment() -> MultilineRule {
    MultilineRule::new(r"/\*", r"\*/", StyleTag::Comment)
}

fn python() -> LanguageDefinition {
    LanguageDefinition {
        language: LanguageId::Python,
        rules: vec![
            words(
                &[
                    "and", "as", "assert", "async", "await", "break", "class", "continue", "def",
                    "del", "elif", "else", "except", "False", "finally", "for", "from", "global",
                    "if", "import", "in", "is", "lambda", "None", "nonlocal", "not", "or", "pass",
                    "raise", "return", "True", "try", "while", "with", "yield",
                ],
                StyleTag::Keyword,
            ),
            words(
                &[
                    "print", "len", "range", "str", "int", "float", "list", "dict", "set", "tuple",
                    "open", "input", "type", "isinstance", "enumerate", "zip", "map", "filter",
                    "sorted", "sum", "min", "max", "abs", "round", "all", "any", "dir", "help",
                    "super", "self",
                ],
                StyleTag::Builtin,
            ),
            HighlightRule::new(NUMBER, StyleTag::Number),
            HighlightRule::new(r"\bdef\s+(\w+)", StyleTag::Function).with_group(1),
            HighlightRule::new(r"\bclass\s+(\w+)", StyleTag::Class).with_group(1),
            HighlightRule::new(r"@[\w.]+", StyleTag::Decorator),
            HighlightRule::new(DOUBLE_QUOTED, StyleTag::String),
            HighlightRule::new(SINGLE_QUOTED, StyleTag::String),
            HighlightRule::new(r"#.*", StyleTag::Comment),
        ],
        multiline: vec![
            MultilineRule::new(r#"""""#, r#"""""#, StyleTag::String),
            MultilineRule::new(r"'''", r"'''", StyleTag::String),
        ],
    }
}

fn javascript() -> LanguageDefinition {
    LanguageDefinition {
        language: LanguageId::JavaScript,
        rules: vec![
            words(
                &[
                    "function", "class", "const", "let", "var", "if", "else", "for", "while", "do",
                    "switch", "case", "break", "continue", "return", "try", "catch", "finally",
                    "throw", "new", "this", "super", "extends", "import", "export", "default",
                    "async", "await", "yield", "typeof", "instanceof", "in", "of", "null",
                    "undefined", "true", "false",
                ],
                StyleTag::Keyword,
            ),
            words(
                &[
                    "console", "document", "window", "Array", "Object", "String", "Number",
                    "Boolean", "Date", "Math", "JSON", "Promise", "setTimeout", "setInterval",
                ],
                StyleTag::Builtin,
            ),
            HighlightRule::new(NUMBER, StyleTag::Number),
            HighlightRule::new(r"\bfunction\s+(\w+)", StyleTag::Function).with_group(1),
            HighlightRule::new(r"\bclass\s+(\w+)", StyleTag::Class).with_group(1),
            HighlightRule::new(r"=>|===|!==|&&|\|\|", StyleTag::Operator),
            HighlightRule::new(DOUBLE_QUOTED, StyleTag::String),
            HighlightRule::new(SINGLE_QUOTED, StyleTag::String),
            HighlightRule::new(r"`[^`]*`", StyleTag::String),
            HighlightRule::new(LINE_COMMENT, StyleTag::Comment),
        ],
        multiline: vec![block_comment(), MultilineRule::new("`", "`", StyleTag::String)],
    }
}

fn html() -> LanguageDefinition {
    LanguageDefinition {
        language: LanguageId::Html,
        rules: vec![
            HighlightRule::new(r"</?[A-Za-z][\w-]*|/?>", StyleTag::Tag),
            HighlightRule::new(r"<!DOCTYPE\b[^>]*>", StyleTag::Tag),
            HighlightRule::new(r"\b([\w-]+)\s*=", StyleTag::Attribute).with_group(1),
            HighlightRule::new(r#""[^"]*""#, StyleTag::String),
            HighlightRule::new(r"'[^']*'", StyleTag::String),
            HighlightRule::new(r"&\w+;", StyleTag::Variable),
        ],
        multiline: vec![MultilineRule::new("<!--", "-->", StyleTag::Comment)],
    }
}

fn css() -> LanguageDefinition {
    LanguageDefinition {
        language: LanguageId::Css,
        rules: vec![
            HighlightRule::new(r"@[\w-]+", StyleTag::Keyword),
            HighlightRule::new(r"([\w-]+)\s*:", StyleTag::Attribute).with_group(1),
            HighlightRule::new(r"\b\d+(?:\.\d+)?(?:px|em|rem|vh|vw|ms|s|%)?", StyleTag::Number),
            HighlightRule::new(r"#[0-9a-fA-F]{3,8}\b", StyleTag::Number),
            HighlightRule::new(r"!important\b", StyleTag::Keyword),
            HighlightRule::new(DOUBLE_QUOTED, StyleTag::String),
            HighlightRule::new(SINGLE_QUOTED, StyleTag::String),
        ],
        multiline: vec![block_comment()],
    }
}

fn java() -> LanguageDefinition {
    LanguageDefinition {
        language: LanguageId::Java,
        rules: vec![
            words(
                &[
                    "public", "private", "protected", "static", "final", "abstract", "class",
                    "interface", "enum", "extends", "implements", "import", "package", "new",
                    "return", "if", "else", "for", "while", "do", "switch", "case", "break",
                    "continue", "try", "catch", "finally", "throw", "throws", "void", "int",
                    "long", "double", "float", "boolean", "char", "byte", "short", "this", "super",
                    "null", "true", "false",
                ],
                StyleTag::Keyword,
            ),
            words(
                &[
                    "System", "Math", "String", "Integer", "Double", "Boolean", "ArrayList",
                    "HashMap", "List", "Set", "Map", "Exception", "Thread", "Object",
                ],
                StyleTag::Builtin,
            ),
            HighlightRule::new(r"\b\d+(?:\.\d+)?[fFdDlL]?\b", StyleTag::Number),
            HighlightRule::new(r"\b(?:class|interface|enum)\s+(\w+)", StyleTag::Class).with_group(1),
            HighlightRule::new(r"@\w+", StyleTag::Decorator),
            HighlightRule::new(DOUBLE_QUOTED, StyleTag::String),
            HighlightRule::new(r"'(?:\\.|[^'\\])'", StyleTag::String),
            HighlightRule::new(LINE_COMMENT, StyleTag::Comment),
        ],
        multiline: vec![block_comment()],
    }
}

const C_KEYWORDS: &[&str] = &[
    "auto", "break", "case", "char", "const", "continue", "default", "do", "double", "else",
    "enum", "extern", "float", "for", "goto", "if", "int", "long", "register", "return", "short",
    "signed", "sizeof", "static", "struct", "switch", "typedef", "union", "unsigned", "void",
    "volatile", "while",
];

fn c_family(language: LanguageId, extra_keywords: &[&str]) -> LanguageDefinition {
    let mut keywords = C_KEYWORDS.to_vec();
    keywords.extend_from_slice(extra_keywords);

    LanguageDefinition {
        language,
        rules: vec![
            HighlightRule::new(r"\b(?:0x[0-9a-fA-F]+|\d+(?:\.\d+)?[uUlLfF]*)\b", StyleTag::Number),
            HighlightRule::new(r"\b(\w+)\s*\(", StyleTag::Function).with_group(1),
            HighlightRule::new(r"\b(?:class|struct)\s+(\w+)", StyleTag::Class).with_group(1),
            // after the call rule so `if (` and `sizeof(` stay keywords
            words(&keywords, StyleTag::Keyword),
            HighlightRule::new(r"^\s*#\s*\w+", StyleTag::Decorator),
            HighlightRule::new(DOUBLE_QUOTED, StyleTag::String),
            HighlightRule::new(r"'(?:\\.|[^'\\])'", StyleTag::String),
            HighlightRule::new(r"<[\w./]+\.h(?:pp)?>", StyleTag::String),
            HighlightRule::new(LINE_COMMENT, StyleTag::Comment),
        ],
        multiline: vec![block_comment()],
    }
}

fn c() -> LanguageDefinition {
    c_family(LanguageId::C, &[])
}

fn cpp() -> LanguageDefinition {
    c_family(
        LanguageId::Cpp,
        &[
            "class", "private", "public", "protected", "template", "typename", "new", "delete",
            "using", "namespace", "try", "catch", "throw", "true", "false", "nullptr", "virtual",
            "override", "bool",
        ],
    )
}

fn php() -> LanguageDefinition {
    LanguageDefinition {
        language: LanguageId::Php,
        rules: vec![
            words(
                &[
                    "function", "class", "public", "private", "protected", "static", "final",
                    "abstract", "interface", "extends", "implements", "namespace", "use", "new",
                    "return", "if", "else", "elseif", "for", "foreach", "as", "while", "do",
                    "switch", "case", "break", "continue", "try", "catch", "finally", "throw",
                    "echo", "print", "isset", "empty", "array", "true", "false", "null", "const",
                    "global", "require", "include", "require_once", "include_once",
                ],
                StyleTag::Keyword,
            ),
            words(
                &[
                    "strlen", "strpos", "substr", "str_replace", "explode", "implode", "count",
                    "in_array", "array_merge", "json_encode", "json_decode", "preg_match",
                    "preg_replace",
                ],
                StyleTag::Builtin,
            ),
            HighlightRule::new(r"<\?php|\?>", StyleTag::Tag),
            HighlightRule::new(NUMBER, StyleTag::Number),
            HighlightRule::new(r"\$\w+", StyleTag::Variable),
            HighlightRule::new(r"\bfunction\s+(\w+)", StyleTag::Function).with_group(1),
            HighlightRule::new(r"\bclass\s+(\w+)", StyleTag::Class).with_group(1),
            HighlightRule::new(DOUBLE_QUOTED, StyleTag::String),
            HighlightRule::new(SINGLE_QUOTED, StyleTag::String),
            HighlightRule::new(r"(?://|#).*", StyleTag::Comment),
        ],
        multiline: vec![block_comment()],
    }
}

fn sql() -> LanguageDefinition {
    let keywords = [
        "select", "from", "where", "insert", "into", "values", "update", "set", "delete",
        "create", "table", "drop", "alter", "index", "view", "join", "inner", "left", "right",
        "outer", "on", "group", "by", "order", "having", "limit", "offset", "and", "or", "not",
        "null", "is", "in", "like", "between", "as", "distinct", "union", "primary", "key",
        "foreign", "references", "default",
    ];
    LanguageDefinition {
        language: LanguageId::Sql,
        rules: vec![
            HighlightRule::new(format!(r"(?i)\b(?:{})\b", keywords.join("|")), StyleTag::Keyword),
            HighlightRule::new(r"(?i)\b(?:count|sum|avg|min|max|coalesce|now)\s*\(", StyleTag::Builtin),
            HighlightRule::new(r"(?i)\b(?:int|integer|varchar|text|date|timestamp|boolean|real)\b", StyleTag::Class),
            HighlightRule::new(NUMBER, StyleTag::Number),
            HighlightRule::new(r"'(?:''|[^'])*'", StyleTag::String),
            HighlightRule::new(r"--.*", StyleTag::Comment),
        ],
        multiline: vec![block_comment()],
    }
}

fn bash() -> LanguageDefinition {
    LanguageDefinition {
        language: LanguageId::Bash,
        rules: vec![
            words(
                &[
                    "if", "then", "else", "elif", "fi", "case", "esac", "for", "while", "until",
                    "do", "done", "function", "select", "in", "return", "local",
                ],
                StyleTag::Keyword,
            ),
            words(
                &[
                    "echo", "cd", "export", "source", "read", "printf", "exit", "set", "unset",
                    "shift", "test",
                ],
                StyleTag::Builtin,
            ),
            HighlightRule::new(NUMBER, StyleTag::Number),
            HighlightRule::new(r"^\s*(?:function\s+)?(\w+)\s*\(\)", StyleTag::Function).with_group(1),
            HighlightRule::new(r"\$\{[^}]*\}|\$\w+", StyleTag::Variable),
            HighlightRule::new(r#""[^"]*""#, StyleTag::String),
            HighlightRule::new(r"'[^']*'", StyleTag::String),
            HighlightRule::new(r"(?:^|\s)(#.*)", StyleTag::Comment).with_group(1),
        ],
        multiline: Vec::new(),
    }
}
