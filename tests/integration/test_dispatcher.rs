//! Integration tests for the pooled command dispatcher

#![cfg(unix)]

use std::sync::Arc;
use std::time::Duration;

use lrd_editor::execution::ProcessRunner;
use lrd_editor::models::OutputKind;
use lrd_editor::terminal::{CommandDispatcher, CompletionStatus};
use lrd_editor::{InterpreterMap, Terminal, TerminalState};

#[path = "../test_utils/mod.rs"]
mod test_utils;

use test_utils::terminal_config;

#[tokio::test]
async fn test_dispatch_delivers_every_completion() {
    let dir = tempfile::tempdir().unwrap();
    let mut terminal = Terminal::new(&terminal_config(dir.path()), Arc::new(InterpreterMap::new())).unwrap();

    let first = terminal.dispatch("echo one").unwrap();
    let second = terminal.dispatch("echo two").unwrap();
    assert_eq!(first, Some(0));
    assert_eq!(second, Some(1));
    assert_eq!(terminal.state(), &TerminalState::Dispatched { in_flight: 2 });

    assert_eq!(terminal.wait_for_completions().await, 2);
    assert_eq!(terminal.state(), &TerminalState::Idle);

    let stdout: Vec<&str> = terminal
        .output()
        .lines()
        .filter(|line| line.kind == OutputKind::Stdout)
        .map(|line| line.text.as_str())
        .collect();
    assert_eq!(stdout.len(), 2);
    assert!(stdout.contains(&"one"));
    assert!(stdout.contains(&"two"));
    assert!(terminal.output().lines().any(|line| line.text == "[0] echo one"));
}

#[tokio::test]
async fn test_dispatch_runs_builtins_inline() {
    let dir = tempfile::tempdir().unwrap();
    let mut terminal = Terminal::new(&terminal_config(dir.path()), Arc::new(InterpreterMap::new())).unwrap();

    assert_eq!(terminal.dispatch("pwd").unwrap(), None);
    assert_eq!(terminal.dispatch("   ").unwrap(), None);
    assert_eq!(terminal.state(), &TerminalState::Idle);
    assert_eq!(terminal.wait_for_completions().await, 0);
    assert_eq!(terminal.output().last().unwrap().text, terminal.cwd().display().to_string());
}

#[tokio::test]
async fn test_stop_all_cancels_queued_jobs() {
    let dir = tempfile::tempdir().unwrap();
    let runner = ProcessRunner::new("/bin/sh", vec!["-c".to_string()]);
    let mut dispatcher = CommandDispatcher::new(1, runner, Duration::from_secs(5)).unwrap();

    dispatcher.submit("sleep 0.5", dir.path().to_path_buf()).unwrap();
    tokio::time::sleep(Duration::from_millis(100)).await;
    for n in 0..3 {
        dispatcher.submit(format!("echo {}", n), dir.path().to_path_buf()).unwrap();
    }
    assert_eq!(dispatcher.stop_all(), 3);

    let mut finished = 0;
    let mut cancelled = 0;
    while let Some(completion) = dispatcher.next_completion().await {
        match completion.status {
            CompletionStatus::Finished(_) => finished += 1,
            CompletionStatus::Cancelled => cancelled += 1,
            CompletionStatus::SpawnFailed(reason) => panic!("spawn failed: {}", reason),
        }
    }
    assert_eq!((finished, cancelled), (1, 3));
    assert_eq!(dispatcher.queued(), 0);
}

#[tokio::test]
async fn test_jobs_submitted_after_stop_still_run() {
    let dir = tempfile::tempdir().unwrap();
    let runner = ProcessRunner::new("/bin/sh", vec!["-c".to_string()]);
    let mut dispatcher = CommandDispatcher::new(2, runner, Duration::from_secs(5)).unwrap();

    dispatcher.stop_all();
    dispatcher.submit("echo later", dir.path().to_path_buf()).unwrap();

    let completion = dispatcher.next_completion().await.unwrap();
    let CompletionStatus::Finished(result) = completion.status else {
        panic!("expected the job to run");
    };
    assert_eq!(result.stdout.trim(), "later");
    dispatcher.shutdown().await;
}
