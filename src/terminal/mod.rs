//! Command terminal
//!
//! A [`Terminal`] owns one working directory, the command history and the
//! output buffer. Submitted lines are echoed, recorded, then either handled
//! by a built-in or spawned through the host shell with the terminal's cwd.
//! Failures never escape: they are rendered into the output buffer.
//!
//! Two execution models are offered. [`Terminal::execute`] awaits the
//! command inline; [`Terminal::dispatch`] hands it to a worker pool and
//! [`Terminal::drain_completions`] appends results as they arrive.

pub mod builtins;
pub mod dispatcher;
pub mod history;
pub mod output;
pub mod state;

pub use builtins::Builtin;
pub use dispatcher::{CommandDispatcher, Completion, CompletionStatus};
pub use history::{CommandHistory, HistoryView};
pub use output::OutputBuffer;
pub use state::TerminalState;

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use crate::config::TerminalConfig;
use crate::error::{Error, Result};
use crate::execution::{shortcut, ProcessRunner, RunPlan};
use crate::interpreter::InterpreterMap;
use crate::models::{CommandResult, OutputKind};

/// What happened to one submitted line
#[derive(Debug, Clone)]
pub enum CommandOutcome {
    /// Blank line; nothing echoed or recorded
    Empty,
    /// Handled by a built-in
    Builtin,
    /// Spawned one or more processes, in run order
    Process(Vec<CommandResult>),
    /// Could not run; the message was written to the output
    Failed(String),
}

/// Interactive command terminal
pub struct Terminal {
    cwd: PathBuf,
    history: CommandHistory,
    output: OutputBuffer,
    state: TerminalState,
    runner: ProcessRunner,
    timeout: Duration,
    worker_count: usize,
    interpreters: Arc<InterpreterMap>,
    dispatcher: Option<CommandDispatcher>,
}

impl Terminal {
    /// Create a terminal in the configured (or current) directory
    pub fn new(config: &TerminalConfig, interpreters: Arc<InterpreterMap>) -> Result<Self> {
        let cwd = match &config.working_directory {
            Some(dir) => dir
                .canonicalize()
                .map_err(|_| Error::DirectoryNotFound { path: dir.clone() })?,
            None => std::env::current_dir()?,
        };

        let mut output = OutputBuffer::new(config.scrollback_lines);
        output.push_banner(&cwd);
        info!("Terminal started in {}", cwd.display());

        Ok(Self {
            cwd,
            history: CommandHistory::from_config(config),
            output,
            state: TerminalState::Idle,
            runner: ProcessRunner::from_config(config),
            timeout: config.command_timeout(),
            worker_count: config.worker_count,
            interpreters,
            dispatcher: None,
        })
    }

    /// Run one line and wait for it to finish or time out
    pub async fn execute(&mut self, line: &str) -> CommandOutcome {
        let Some(command) = self.submit_line(line) else {
            return CommandOutcome::Empty;
        };

        if let Some(builtin) = Builtin::parse(&command) {
            self.run_builtin(builtin);
            return CommandOutcome::Builtin;
        }

        if let Some(plan) = shortcut::plan(&command, &self.cwd, &self.interpreters) {
            return match plan {
                Ok(plan) => self.run_plan(&plan).await,
                Err(e) => self.fail(e),
            };
        }

        self.state = TerminalState::Executing {
            command: command.clone(),
        };
        let outcome = match self.runner.run(&command, &self.cwd, self.timeout).await {
            Ok(result) => {
                self.render_result(&result);
                CommandOutcome::Process(vec![result])
            }
            Err(e) => self.fail(e),
        };
        self.settle_state();
        outcome
    }

    /// Run the steps of `plan` in order, stopping at the first that fails
    pub async fn run_plan(&mut self, plan: &RunPlan) -> CommandOutcome {
        self.output.push(plan.label.clone(), OutputKind::Info);

        let mut results = Vec::with_capacity(plan.steps.len());
        for step in &plan.steps {
            self.state = TerminalState::Executing { command: step.clone() };
            match self.runner.run(step, &plan.working_dir, self.timeout).await {
                Ok(result) => {
                    self.render_result(&result);
                    let succeeded = result.is_success();
                    results.push(result);
                    if !succeeded {
                        break;
                    }
                }
                Err(e) => {
                    self.settle_state();
                    return self.fail(e);
                }
            }
        }

        self.settle_state();
        CommandOutcome::Process(results)
    }

    /// Hand one line to the worker pool
    ///
    /// Built-ins still run immediately since they act on the terminal
    /// itself. Returns the job id when a process was queued. A pool that
    /// cannot start or accept the job is reported in the output as well.
    pub fn dispatch(&mut self, line: &str) -> Result<Option<u64>> {
        let Some(command) = self.submit_line(line) else {
            return Ok(None);
        };

        if let Some(builtin) = Builtin::parse(&command) {
            self.run_builtin(builtin);
            return Ok(None);
        }

        let (command, cwd) = match shortcut::plan(&command, &self.cwd, &self.interpreters) {
            Some(Ok(plan)) => {
                self.output.push(plan.label.clone(), OutputKind::Info);
                (plan.steps.join(" && "), plan.working_dir)
            }
            Some(Err(e)) => {
                self.fail(e);
                return Ok(None);
            }
            None => (command, self.cwd.clone()),
        };

        match self.submit_to_pool(command, cwd) {
            Ok(id) => {
                self.settle_state();
                Ok(Some(id))
            }
            Err(e) => {
                self.report_error(&e);
                Err(e)
            }
        }
    }

    /// Queue on the worker pool, starting it on first use
    fn submit_to_pool(&mut self, command: String, cwd: PathBuf) -> Result<u64> {
        if self.dispatcher.is_none() {
            self.dispatcher = Some(CommandDispatcher::new(
                self.worker_count,
                self.runner.clone(),
                self.timeout,
            )?);
        }
        let dispatcher = self.dispatcher.as_mut().ok_or(Error::DispatcherClosed)?;
        dispatcher.submit(command, cwd)
    }

    /// Append every completion that has already arrived; returns how many
    pub fn drain_completions(&mut self) -> usize {
        let mut drained = 0;
        while let Some(completion) = self.dispatcher.as_mut().and_then(CommandDispatcher::try_next_completion) {
            self.render_completion(completion);
            drained += 1;
        }
        self.settle_state();
        drained
    }

    /// Wait for every dispatched command and append the results
    pub async fn wait_for_completions(&mut self) -> usize {
        let mut drained = 0;
        while let Some(dispatcher) = self.dispatcher.as_mut() {
            let Some(completion) = dispatcher.next_completion().await else {
                break;
            };
            self.render_completion(completion);
            drained += 1;
        }
        self.settle_state();
        drained
    }

    /// Cancel dispatched commands that have not started
    pub fn stop_all(&self) -> usize {
        self.dispatcher.as_ref().map(CommandDispatcher::stop_all).unwrap_or(0)
    }

    pub fn history_previous(&mut self) -> Option<&str> {
        self.history.previous()
    }

    pub fn history_next(&mut self) -> Option<&str> {
        self.history.next()
    }

    pub fn history(&self) -> &CommandHistory {
        &self.history
    }

    pub fn cwd(&self) -> &Path {
        &self.cwd
    }

    pub fn output(&self) -> &OutputBuffer {
        &self.output
    }

    pub fn state(&self) -> &TerminalState {
        &self.state
    }

    pub fn interpreters(&self) -> &Arc<InterpreterMap> {
        &self.interpreters
    }

    /// Write an informational line, e.g. from the host application
    pub fn notify(&mut self, text: impl Into<String>) {
        self.output.push(text, OutputKind::Info);
    }

    /// Echo and record a line; `None` for blank input
    fn submit_line(&mut self, line: &str) -> Option<String> {
        let command = line.trim();
        if command.is_empty() {
            return None;
        }
        self.output.push(format!("$ {}", command), OutputKind::Command);
        self.history.push(command);
        Some(command.to_string())
    }

    fn run_builtin(&mut self, builtin: Builtin<'_>) {
        debug!("Built-in {:?} in {}", builtin, self.cwd.display());
        match builtin {
            Builtin::Clear => self.output.reset(&self.cwd),
            Builtin::Help => {
                for line in builtins::HELP_TEXT {
                    self.output.push(*line, OutputKind::Info);
                }
            }
            Builtin::Cd(arg) => match builtins::resolve_directory(&self.cwd, arg) {
                Ok(dir) => {
                    self.cwd = dir;
                    self.output
                        .push(format!("Changed to: {}", self.cwd.display()), OutputKind::Info);
                }
                Err(e) => self.output.push(e.to_string(), OutputKind::Error),
            },
            Builtin::List(arg) => {
                let dir = arg.map(|arg| self.cwd.join(arg)).unwrap_or_else(|| self.cwd.clone());
                match builtins::list_directory(&dir) {
                    Ok(names) => {
                        for name in names {
                            self.output.push(name, OutputKind::Stdout);
                        }
                    }
                    Err(e) => self.output.push(format!("Error: {}", e), OutputKind::Error),
                }
            }
            Builtin::Pwd => self.output.push(self.cwd.display().to_string(), OutputKind::Stdout),
            Builtin::History => {
                let lines: Vec<String> = self
                    .history
                    .entries()
                    .iter()
                    .enumerate()
                    .map(|(n, entry)| format!("{:>5}  {}", n + 1, entry))
                    .collect();
                for line in lines {
                    self.output.push(line, OutputKind::Info);
                }
            }
            Builtin::Interpreters => {
                if self.interpreters.is_empty() {
                    self.output.push("No interpreters detected", OutputKind::Info);
                } else {
                    self.output.push("Detected interpreters:", OutputKind::Info);
                    let lines: Vec<String> = self
                        .interpreters
                        .iter()
                        .map(|(runtime, command)| format!("  {}: {}", runtime, command))
                        .collect();
                    for line in lines {
                        self.output.push(line, OutputKind::Info);
                    }
                }
            }
        }
    }

    fn render_result(&mut self, result: &CommandResult) {
        if result.timed_out {
            self.output.push(
                format!("Command timed out after {}s", result.duration.as_secs_f32()),
                OutputKind::Error,
            );
            return;
        }

        self.output.push_text(&result.stdout, OutputKind::Stdout);
        self.output.push_text(&result.stderr, OutputKind::Stderr);
        match result.exit_code {
            Some(0) => {}
            Some(code) => self.output.push(format!("Exit code: {}", code), OutputKind::Info),
            None => self.output.push("Process terminated by signal", OutputKind::Info),
        }
    }

    fn render_completion(&mut self, completion: Completion) {
        self.output.push(
            format!("[{}] {}", completion.id, completion.command),
            OutputKind::Info,
        );
        match completion.status {
            CompletionStatus::Finished(result) => self.render_result(&result),
            CompletionStatus::SpawnFailed(message) => {
                self.output.push(format!("Error: {}", message), OutputKind::Error);
            }
            CompletionStatus::Cancelled => self.output.push("Cancelled", OutputKind::Info),
        }
    }

    /// Render an error inline; returns the line written
    pub fn report_error(&mut self, error: &Error) -> String {
        let message = match error {
            Error::ProcessSpawn { reason, .. } | Error::Other(reason) => format!("Error: {}", reason),
            other => format!("Error: {}", other),
        };
        warn!("Command failed: {}", error);
        self.output.push(message.clone(), OutputKind::Error);
        message
    }

    fn fail(&mut self, error: Error) -> CommandOutcome {
        CommandOutcome::Failed(self.report_error(&error))
    }

    fn settle_state(&mut self) {
        let in_flight = self.dispatcher.as_ref().map(CommandDispatcher::in_flight).unwrap_or(0);
        self.state = if in_flight > 0 {
            TerminalState::Dispatched { in_flight }
        } else {
            TerminalState::Idle
        };
    }
}
