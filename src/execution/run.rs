//! Run plans
//!
//! Turns a source file into the shell commands that execute it with a
//! detected runtime. Compiled languages take two steps: compile, then run.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::interpreter::{InterpreterMap, Runtime};
use crate::models::LanguageId;

/// Ordered shell commands that run one source file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunPlan {
    /// Short description shown before the steps run
    pub label: String,
    /// Directory every step runs in
    pub working_dir: PathBuf,
    /// Shell commands, run in order until one fails
    pub steps: Vec<String>,
}

fn quoted(path: &Path) -> String {
    format!("\"{}\"", path.display())
}

/// Build the plan that runs `path` as `language`
pub fn plan_for(path: &Path, language: LanguageId, interpreters: &InterpreterMap) -> Result<RunPlan> {
    let working_dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    let stem = path
        .file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or_default()
        .to_string();
    let file = quoted(path);

    let steps = match language {
        LanguageId::Python => vec![format!("{} {}", interpreters.require(Runtime::Python)?, file)],
        LanguageId::JavaScript => vec![format!("{} {}", interpreters.require(Runtime::Node)?, file)],
        LanguageId::Php => vec![format!("{} {}", interpreters.require(Runtime::Php)?, file)],
        LanguageId::Bash => vec![format!("{} {}", interpreters.require(Runtime::Bash)?, file)],
        LanguageId::Java => {
            let javac = interpreters.require(Runtime::Javac)?;
            let java = interpreters.require(Runtime::Java)?;
            vec![
                format!("{} {}", javac, file),
                format!("{} -cp {} {}", java, quoted(&working_dir), stem),
            ]
        }
        LanguageId::C | LanguageId::Cpp => {
            let compiler = if language == LanguageId::C { Runtime::Gcc } else { Runtime::Gxx };
            let compiler = interpreters.require(compiler)?;
            let binary = working_dir.join(format!("{}{}", stem, std::env::consts::EXE_SUFFIX));
            vec![
                format!("{} {} -o {}", compiler, file, quoted(&binary)),
                quoted(&binary),
            ]
        }
        _ => return Err(Error::UnsupportedRunLanguage { language }),
    };

    let name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    Ok(RunPlan {
        label: format!("Running {} file: {}", language, name),
        working_dir,
        steps,
    })
}
