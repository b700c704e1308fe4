//! Workbench
//!
//! Wires the session, the terminal and the interpreter map together and
//! implements the "run current document" action.

use std::sync::Arc;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::execution::{plan_for, ProcessRunner};
use crate::interpreter::{InterpreterMap, InterpreterRegistry};
use crate::session::{SaveOutcome, Session, SessionPrompt};
use crate::terminal::{CommandOutcome, Terminal};

pub struct Workbench {
    config: Config,
    session: Session,
    terminal: Terminal,
    interpreters: Arc<InterpreterMap>,
}

impl Workbench {
    /// Validate the configuration, probe interpreters and build everything
    pub async fn start(config: Config) -> Result<Self> {
        config.validate()?;
        let registry = InterpreterRegistry::new(
            &config.interpreters,
            ProcessRunner::from_config(&config.terminal),
        );
        let interpreters = Arc::new(registry.probe().await);
        Self::with_interpreters(config, interpreters)
    }

    /// Build with an already known interpreter map
    pub fn with_interpreters(config: Config, interpreters: Arc<InterpreterMap>) -> Result<Self> {
        let session = Session::new(&config);
        let terminal = Terminal::new(&config.terminal, interpreters.clone())?;
        Ok(Self {
            config,
            session,
            terminal,
            interpreters,
        })
    }

    /// Save the active document if needed, then run it in the terminal
    ///
    /// An unsaved document is saved first (asking for a path when it has
    /// none); cancelling that save cancels the run with
    /// [`Error::DocumentNotSaved`]. Planning failures are also written to
    /// the terminal.
    pub async fn run_active_document(&mut self, prompt: &mut dyn SessionPrompt) -> Result<CommandOutcome> {
        let handle = self.session.active_handle();
        let document = self.session.active();

        if !document.is_path_bound() || document.is_modified() {
            if let SaveOutcome::Cancelled = self.session.save_document(handle, prompt)? {
                return Err(Error::DocumentNotSaved);
            }
        }

        let document = self.session.active();
        let path = document.path().ok_or(Error::DocumentNotSaved)?;
        let plan = match plan_for(path, document.language(), &self.interpreters) {
            Ok(plan) => plan,
            Err(e) => {
                self.terminal.report_error(&e);
                return Err(e);
            }
        };

        info!("Running {} in {}", path.display(), plan.working_dir.display());
        Ok(self.terminal.run_plan(&plan).await)
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut Session {
        &mut self.session
    }

    pub fn terminal(&self) -> &Terminal {
        &self.terminal
    }

    pub fn terminal_mut(&mut self) -> &mut Terminal {
        &mut self.terminal
    }

    pub fn interpreters(&self) -> &Arc<InterpreterMap> {
        &self.interpreters
    }
}
