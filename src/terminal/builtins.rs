//! Built-in terminal commands
//!
//! Commands handled by the terminal itself rather than the host shell. The
//! command word is matched case-insensitively; the rest of the line is the
//! argument, taken verbatim so paths with spaces survive. A listing with
//! flags (`ls -la`) is left to the shell.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// A parsed built-in command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Builtin<'a> {
    Clear,
    Help,
    Cd(Option<&'a str>),
    List(Option<&'a str>),
    Pwd,
    History,
    Interpreters,
}

impl<'a> Builtin<'a> {
    /// Recognise a built-in, or `None` for anything the shell should run
    pub fn parse(line: &'a str) -> Option<Self> {
        let line = line.trim();
        let (word, rest) = match line.split_once(char::is_whitespace) {
            Some((word, rest)) => (word, rest.trim()),
            None => (line, ""),
        };
        let arg = (!rest.is_empty()).then(|| rest.trim_matches('"'));

        let builtin = match word.to_ascii_lowercase().as_str() {
            "clear" => Builtin::Clear,
            "help" => Builtin::Help,
            "cd" => Builtin::Cd(arg),
            // flags belong to the shell's own ls
            "ls" | "dir" if arg.is_some_and(|arg| arg.starts_with('-')) => return None,
            "ls" | "dir" => Builtin::List(arg),
            "pwd" => Builtin::Pwd,
            "history" => Builtin::History,
            "interpreters" | "compilers" => Builtin::Interpreters,
            _ => return None,
        };
        Some(builtin)
    }
}

pub const HELP_TEXT: &[&str] = &[
    "Built-in commands:",
    "  help                  Show this help",
    "  clear                 Clear the terminal",
    "  cd [dir]              Change directory (.. for parent, ~ for home)",
    "  ls, dir [dir]         List directory contents",
    "  pwd                   Print the working directory",
    "  history               Show command history",
    "  interpreters          Show detected interpreters and compilers",
    "Anything else runs in the system shell.",
    "Typing a script name (demo.py, app.js, Main.java) runs it directly.",
];

/// Resolve the target of `cd` against `cwd`
///
/// The result is canonical and guaranteed to be an existing directory.
pub fn resolve_directory(cwd: &Path, arg: Option<&str>) -> Result<PathBuf> {
    let arg = arg.unwrap_or("~");

    let candidate = match arg {
        ".." => return Ok(cwd.parent().unwrap_or(cwd).to_path_buf()),
        "~" => home_dir(arg)?,
        _ => match arg.strip_prefix("~/") {
            Some(rest) => home_dir(arg)?.join(rest),
            None => cwd.join(arg),
        },
    };

    if !candidate.is_dir() {
        return Err(Error::DirectoryNotFound { path: PathBuf::from(arg) });
    }
    candidate
        .canonicalize()
        .map_err(|_| Error::DirectoryNotFound { path: PathBuf::from(arg) })
}

fn home_dir(arg: &str) -> Result<PathBuf> {
    dirs::home_dir().ok_or_else(|| Error::DirectoryNotFound { path: PathBuf::from(arg) })
}

/// Sorted entry names of `dir`, directories suffixed with `/`
pub fn list_directory(dir: &Path) -> Result<Vec<String>> {
    let entries = fs::read_dir(dir).map_err(|e| Error::file_io(dir, e))?;

    let mut names: Vec<String> = entries
        .filter_map(|entry| entry.ok())
        .map(|entry| {
            let name = entry.file_name().to_string_lossy().into_owned();
            match entry.file_type() {
                Ok(kind) if kind.is_dir() => format!("{}/", name),
                _ => name,
            }
        })
        .collect();
    names.sort();
    Ok(names)
}
