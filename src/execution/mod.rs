//! Process execution
//!
//! Every command the editor runs goes through [`ProcessRunner`]: the working
//! directory is passed in explicitly, output is captured whole once the
//! process exits, and a wall-clock timeout bounds every spawn. A child that
//! outlives its timeout is killed when its future is dropped.

pub mod run;
pub mod shortcut;

use chrono::Local;
use std::collections::HashMap;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::{Duration, Instant};
use tokio::process::Command;
use tokio::time::timeout;

use crate::config::TerminalConfig;
use crate::error::{Error, Result};
use crate::models::CommandResult;

pub use run::{plan_for, RunPlan};

/// Spawns commands through the host shell or directly
#[derive(Debug, Clone)]
pub struct ProcessRunner {
    /// Shell used for command strings
    shell: PathBuf,
    /// Arguments placed before the command string
    shell_args: Vec<String>,
    /// Extra environment variables for every child
    env_vars: HashMap<String, String>,
}

impl ProcessRunner {
    pub fn new(shell: impl Into<PathBuf>, shell_args: Vec<String>) -> Self {
        Self {
            shell: shell.into(),
            shell_args,
            env_vars: HashMap::new(),
        }
    }

    pub fn from_config(config: &TerminalConfig) -> Self {
        Self::new(config.shell_path.clone(), config.shell_args.clone())
    }

    /// Set environment variable
    pub fn set_env(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.env_vars.insert(key.into(), value.into());
    }

    /// Run a command string through the shell in `cwd`
    pub async fn run(&self, command: &str, cwd: &Path, limit: Duration) -> Result<CommandResult> {
        let command = command.trim();
        if command.is_empty() {
            return Err(Error::EmptyCommand);
        }

        let mut cmd = Command::new(&self.shell);
        cmd.args(&self.shell_args).arg(command);
        self.capture(cmd, command, cwd, limit).await
    }

    /// Run a program with explicit arguments, bypassing the shell
    pub async fn run_program<S: AsRef<OsStr>>(
        &self,
        program: &str,
        args: &[S],
        cwd: &Path,
        limit: Duration,
    ) -> Result<CommandResult> {
        let mut cmd = Command::new(program);
        cmd.args(args);
        self.capture(cmd, program, cwd, limit).await
    }

    async fn capture(&self, mut cmd: Command, label: &str, cwd: &Path, limit: Duration) -> Result<CommandResult> {
        cmd.current_dir(cwd)
            .envs(&self.env_vars)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let started_at = Local::now();
        let clock = Instant::now();

        let child = cmd.spawn().map_err(|e| Error::ProcessSpawn {
            command: label.to_string(),
            reason: e.to_string(),
        })?;

        match timeout(limit, child.wait_with_output()).await {
            Ok(Ok(output)) => {
                let result = CommandResult {
                    command: label.to_string(),
                    working_directory: cwd.to_path_buf(),
                    stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
                    stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
                    exit_code: output.status.code(),
                    timed_out: false,
                    started_at,
                    duration: clock.elapsed(),
                };
                trace!("'{}' exited with {:?} after {:?}", label, result.exit_code, result.duration);
                Ok(result)
            }
            Ok(Err(e)) => Err(Error::ProcessSpawn {
                command: label.to_string(),
                reason: e.to_string(),
            }),
            Err(_) => {
                warn!("'{}' timed out after {:?}, killing", label, limit);
                Ok(CommandResult::timed_out(
                    label.to_string(),
                    cwd.to_path_buf(),
                    started_at,
                    limit,
                ))
            }
        }
    }
}

impl Default for ProcessRunner {
    fn default() -> Self {
        Self::from_config(&TerminalConfig::default())
    }
}
