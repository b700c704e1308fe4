//! Integration tests for the command terminal
//!
//! Built-ins, shell commands, timeouts and history through `Terminal`.

use std::fs;
use std::sync::Arc;
use std::time::{Duration, Instant};

use lrd_editor::models::OutputKind;
use lrd_editor::{CommandOutcome, InterpreterMap, Terminal, TerminalState};

#[path = "../test_utils/mod.rs"]
mod test_utils;

use test_utils::terminal_config;

fn terminal_in(dir: &std::path::Path) -> Terminal {
    Terminal::new(&terminal_config(dir), Arc::new(InterpreterMap::new())).unwrap()
}

fn texts(terminal: &Terminal) -> Vec<String> {
    terminal.output().lines().map(|line| line.text.clone()).collect()
}

#[tokio::test]
async fn test_banner_on_start() {
    let dir = tempfile::tempdir().unwrap();
    let terminal = terminal_in(dir.path());
    let lines = texts(&terminal);
    assert_eq!(lines[0], "LRD TERMINAL");
    assert!(lines[1].starts_with("Directory: "));
    assert_eq!(terminal.state(), &TerminalState::Idle);
}

#[tokio::test]
async fn test_cd_into_missing_directory_keeps_cwd() {
    let dir = tempfile::tempdir().unwrap();
    let mut terminal = terminal_in(dir.path());
    let cwd = terminal.cwd().to_path_buf();

    let outcome = terminal.execute("cd nope").await;
    assert!(matches!(outcome, CommandOutcome::Builtin));
    assert_eq!(terminal.cwd(), cwd);
    assert!(texts(&terminal).contains(&"Directory not found: nope".to_string()));
}

#[tokio::test]
async fn test_cd_into_child_and_back() {
    let dir = tempfile::tempdir().unwrap();
    fs::create_dir(dir.path().join("sub dir")).unwrap();
    let mut terminal = terminal_in(dir.path());
    let root = terminal.cwd().to_path_buf();

    terminal.execute("cd \"sub dir\"").await;
    assert_eq!(terminal.cwd(), root.join("sub dir"));
    assert_eq!(
        terminal.output().last().unwrap().text,
        format!("Changed to: {}", root.join("sub dir").display())
    );

    terminal.execute("cd ..").await;
    assert_eq!(terminal.cwd(), root);
}

#[tokio::test]
async fn test_pwd_and_ls() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("b.txt"), "").unwrap();
    fs::write(dir.path().join("a.py"), "").unwrap();
    fs::create_dir(dir.path().join("src")).unwrap();
    let mut terminal = terminal_in(dir.path());

    terminal.execute("pwd").await;
    assert_eq!(terminal.output().last().unwrap().text, terminal.cwd().display().to_string());

    let before = terminal.output().len();
    terminal.execute("LS").await;
    let listed: Vec<String> = texts(&terminal).into_iter().skip(before + 1).collect();
    assert_eq!(listed, vec!["a.py", "b.txt", "src/"]);
}

#[cfg(unix)]
#[tokio::test]
async fn test_ls_with_flags_runs_in_shell() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join(".hidden"), "").unwrap();
    fs::write(dir.path().join("a.py"), "").unwrap();
    let mut terminal = terminal_in(dir.path());

    let before = terminal.output().len();
    let outcome = terminal.execute("ls -a").await;
    let CommandOutcome::Process(results) = outcome else {
        panic!("expected ls -a to run in the shell");
    };
    assert!(results[0].is_success());

    let listed: Vec<_> = terminal.output().lines().skip(before + 1).collect();
    assert!(listed.iter().all(|line| line.kind == OutputKind::Stdout));
    let names: Vec<&str> = listed.iter().map(|line| line.text.as_str()).collect();
    assert!(names.contains(&".hidden"));
    assert!(names.contains(&"a.py"));
}

#[tokio::test]
async fn test_clear_resets_to_banner() {
    let dir = tempfile::tempdir().unwrap();
    let mut terminal = terminal_in(dir.path());
    terminal.execute("help").await;
    assert!(terminal.output().len() > 5);

    terminal.execute("clear").await;
    assert!(terminal.output().lines().all(|line| line.kind == OutputKind::Banner));
    assert_eq!(terminal.history().entries(), ["help", "clear"]);
}

#[tokio::test]
async fn test_history_builtin_lists_entries() {
    let dir = tempfile::tempdir().unwrap();
    let mut terminal = terminal_in(dir.path());
    terminal.execute("pwd").await;
    terminal.execute("history").await;

    let lines = texts(&terminal);
    let tail = &lines[lines.len() - 2..];
    assert_eq!(tail, ["    1  pwd", "    2  history"]);
}

#[tokio::test]
async fn test_interpreters_builtin() {
    let dir = tempfile::tempdir().unwrap();
    let mut terminal = terminal_in(dir.path());
    terminal.execute("interpreters").await;
    assert_eq!(terminal.output().last().unwrap().text, "No interpreters detected");
}

#[cfg(unix)]
#[tokio::test]
async fn test_shell_command_output() {
    let dir = tempfile::tempdir().unwrap();
    let mut terminal = terminal_in(dir.path());

    let outcome = terminal.execute("echo hello; echo oops 1>&2").await;
    let CommandOutcome::Process(results) = outcome else {
        panic!("expected a process outcome");
    };
    assert_eq!(results.len(), 1);
    assert!(results[0].is_success());

    let lines: Vec<_> = terminal.output().lines().collect();
    let n = lines.len();
    assert_eq!(lines[n - 2].text, "hello");
    assert_eq!(lines[n - 2].kind, OutputKind::Stdout);
    assert_eq!(lines[n - 1].text, "oops");
    assert_eq!(lines[n - 1].kind, OutputKind::Stderr);
    assert_eq!(terminal.state(), &TerminalState::Idle);
}

#[cfg(unix)]
#[tokio::test]
async fn test_commands_run_in_terminal_cwd() {
    let dir = tempfile::tempdir().unwrap();
    fs::create_dir(dir.path().join("inner")).unwrap();
    let mut terminal = terminal_in(dir.path());
    let process_cwd = std::env::current_dir().unwrap();

    terminal.execute("cd inner").await;
    terminal.execute("command pwd -P").await;

    assert_eq!(std::env::current_dir().unwrap(), process_cwd);
    let expected = dir.path().canonicalize().unwrap().join("inner");
    assert_eq!(terminal.output().last().unwrap().text, expected.display().to_string());
}

#[cfg(unix)]
#[tokio::test]
async fn test_nonzero_exit_code_reported() {
    let dir = tempfile::tempdir().unwrap();
    let mut terminal = terminal_in(dir.path());

    terminal.execute("exit 3").await;
    assert_eq!(terminal.output().last().unwrap().text, "Exit code: 3");
}

#[cfg(unix)]
#[tokio::test]
async fn test_timeout_is_bounded() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = terminal_config(dir.path());
    config.command_timeout_ms = 200;
    let mut terminal = Terminal::new(&config, Arc::new(InterpreterMap::new())).unwrap();

    let start = Instant::now();
    let outcome = terminal.execute("sleep 10").await;
    assert!(start.elapsed() < Duration::from_secs(5));

    let CommandOutcome::Process(results) = outcome else {
        panic!("expected a process outcome");
    };
    assert!(results[0].timed_out);
    let last = terminal.output().last().unwrap();
    assert!(last.text.starts_with("Command timed out after"));
    assert_eq!(last.kind, OutputKind::Error);
}

#[tokio::test]
async fn test_history_navigation_through_terminal() {
    let dir = tempfile::tempdir().unwrap();
    let mut terminal = terminal_in(dir.path());
    for command in ["pwd", "help", "history"] {
        terminal.execute(command).await;
    }

    assert_eq!(terminal.history_previous(), Some("history"));
    assert_eq!(terminal.history_previous(), Some("help"));
    assert_eq!(terminal.history_previous(), Some("pwd"));
    assert_eq!(terminal.history_previous(), Some("pwd"));
    assert_eq!(terminal.history_next(), Some("help"));
    assert_eq!(terminal.history_next(), Some("history"));
    assert_eq!(terminal.history_next(), None);
}

#[tokio::test]
async fn test_history_file_persists_between_terminals() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = terminal_config(dir.path());
    config.history_file = Some(dir.path().join("history.txt"));

    {
        let mut terminal = Terminal::new(&config, Arc::new(InterpreterMap::new())).unwrap();
        terminal.execute("pwd").await;
        terminal.execute("help").await;
    }

    let mut terminal = Terminal::new(&config, Arc::new(InterpreterMap::new())).unwrap();
    assert_eq!(terminal.history().entries(), ["pwd", "help"]);
    assert_eq!(terminal.history_previous(), Some("help"));
}

#[tokio::test]
async fn test_missing_script_runtime_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let mut terminal = terminal_in(dir.path());

    let outcome = terminal.execute("demo.py").await;
    let CommandOutcome::Failed(message) = outcome else {
        panic!("expected a failure");
    };
    assert_eq!(message, "Error: No python runtime detected");
    assert_eq!(terminal.output().last().unwrap().kind, OutputKind::Error);
}
