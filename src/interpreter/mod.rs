//! Interpreter discovery
//!
//! Probes the host for language runtimes once at startup. The resulting
//! [`InterpreterMap`] is immutable and handed out behind an `Arc` to the
//! terminal and the run action.

use futures::future::join_all;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use crate::config::InterpreterConfig;
use crate::error::{Error, Result};
use crate::execution::ProcessRunner;

/// A language runtime or compiler the editor knows how to drive
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Runtime {
    Python,
    Node,
    Java,
    Javac,
    Php,
    Gcc,
    #[serde(rename = "g++")]
    Gxx,
    Bash,
}

impl Runtime {
    pub fn as_str(self) -> &'static str {
        match self {
            Runtime::Python => "python",
            Runtime::Node => "node",
            Runtime::Java => "java",
            Runtime::Javac => "javac",
            Runtime::Php => "php",
            Runtime::Gcc => "gcc",
            Runtime::Gxx => "g++",
            Runtime::Bash => "bash",
        }
    }
}

impl fmt::Display for Runtime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How to look for one runtime: programs tried in order, and the flag that
/// makes them print a version and exit
#[derive(Debug, Clone)]
pub struct ProbeCandidate {
    pub runtime: Runtime,
    pub programs: Vec<String>,
    pub version_arg: String,
}

impl ProbeCandidate {
    pub fn new(runtime: Runtime, programs: &[&str], version_arg: &str) -> Self {
        Self {
            runtime,
            programs: programs.iter().map(|p| p.to_string()).collect(),
            version_arg: version_arg.to_string(),
        }
    }
}

/// The fixed probe list
pub fn default_candidates() -> Vec<ProbeCandidate> {
    vec![
        ProbeCandidate::new(Runtime::Python, &["python3", "python"], "--version"),
        ProbeCandidate::new(Runtime::Node, &["node"], "--version"),
        ProbeCandidate::new(Runtime::Java, &["java"], "-version"),
        ProbeCandidate::new(Runtime::Javac, &["javac"], "-version"),
        ProbeCandidate::new(Runtime::Php, &["php"], "--version"),
        ProbeCandidate::new(Runtime::Gcc, &["gcc"], "--version"),
        ProbeCandidate::new(Runtime::Gxx, &["g++"], "--version"),
        ProbeCandidate::new(Runtime::Bash, &["bash"], "--version"),
    ]
}

/// Detected runtimes, keyed by [`Runtime`]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterpreterMap {
    entries: BTreeMap<Runtime, String>,
}

impl InterpreterMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_entries(entries: impl IntoIterator<Item = (Runtime, String)>) -> Self {
        Self {
            entries: entries.into_iter().collect(),
        }
    }

    /// Command that launches `runtime`, if it was found
    pub fn get(&self, runtime: Runtime) -> Option<&str> {
        self.entries.get(&runtime).map(String::as_str)
    }

    /// Like [`get`](Self::get) but absence is an error
    pub fn require(&self, runtime: Runtime) -> Result<&str> {
        self.get(runtime).ok_or(Error::NoInterpreter { runtime })
    }

    pub fn contains(&self, runtime: Runtime) -> bool {
        self.entries.contains_key(&runtime)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Runtime, &str)> {
        self.entries.iter().map(|(runtime, command)| (*runtime, command.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<(Runtime, String)> for InterpreterMap {
    fn from_iter<I: IntoIterator<Item = (Runtime, String)>>(iter: I) -> Self {
        Self::from_entries(iter)
    }
}

/// Probes candidates concurrently and builds an [`InterpreterMap`]
pub struct InterpreterRegistry {
    candidates: Vec<ProbeCandidate>,
    probe_timeout: Duration,
    runner: ProcessRunner,
}

impl InterpreterRegistry {
    pub fn new(config: &InterpreterConfig, runner: ProcessRunner) -> Self {
        Self {
            candidates: default_candidates(),
            probe_timeout: config.probe_timeout(),
            runner,
        }
    }

    /// Replace the probe list
    pub fn with_candidates(mut self, candidates: Vec<ProbeCandidate>) -> Self {
        self.candidates = candidates;
        self
    }

    /// Probe every candidate; runtimes that cannot be confirmed are omitted
    pub async fn probe(&self) -> InterpreterMap {
        let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        let probes = self.candidates.iter().map(|candidate| self.probe_one(candidate, &cwd));
        let map: InterpreterMap = join_all(probes).await.into_iter().flatten().collect();

        info!(
            "Detected {} of {} runtimes: {}",
            map.len(),
            self.candidates.len(),
            map.iter().map(|(runtime, _)| runtime.as_str()).collect::<Vec<_>>().join(", ")
        );
        map
    }

    async fn probe_one(&self, candidate: &ProbeCandidate, cwd: &std::path::Path) -> Option<(Runtime, String)> {
        for program in &candidate.programs {
            let args = [candidate.version_arg.as_str()];
            match self.runner.run_program(program, &args, cwd, self.probe_timeout).await {
                Ok(result) if result.is_success() => {
                    debug!("Found {} as '{}'", candidate.runtime, program);
                    return Some((candidate.runtime, program.clone()));
                }
                Ok(result) if result.timed_out => {
                    debug!("Probe of '{}' timed out after {:?}", program, self.probe_timeout);
                }
                Ok(result) => {
                    debug!("Probe of '{}' exited with {:?}", program, result.exit_code);
                }
                Err(e) => {
                    debug!("Probe of '{}' failed: {}", program, e);
                }
            }
        }
        None
    }
}
