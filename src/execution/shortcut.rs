//! Execution shortcuts
//!
//! Typing the name of a script on its own runs it with the matching
//! runtime, e.g. `demo.py` becomes `python3 "demo.py"`.

use std::path::Path;

use super::run::{plan_for, RunPlan};
use crate::error::Result;
use crate::interpreter::InterpreterMap;
use crate::models::LanguageId;

/// Languages reachable through the shortcut
const SHORTCUT_LANGUAGES: [LanguageId; 5] = [
    LanguageId::Python,
    LanguageId::JavaScript,
    LanguageId::Php,
    LanguageId::Bash,
    LanguageId::Java,
];

/// Plan for a command line that is a single script name, or `None` when the
/// line should go to the shell unchanged
pub fn plan(command: &str, cwd: &Path, interpreters: &InterpreterMap) -> Option<Result<RunPlan>> {
    let mut tokens = command.split_whitespace();
    let token = tokens.next()?;
    if tokens.next().is_some() {
        return None;
    }

    let language = LanguageId::from_path(Path::new(token));
    if !SHORTCUT_LANGUAGES.contains(&language) {
        return None;
    }

    let script = cwd.join(token);
    debug!("Shortcut: running {} as {}", script.display(), language);
    Some(plan_for(&script, language, interpreters))
}
