//! Pooled command dispatcher
//!
//! A fixed number of tokio worker tasks pull jobs from one shared queue and
//! send completions back over a channel. Completions of concurrent jobs
//! arrive in whatever order the processes finish.
//!
//! [`CommandDispatcher::stop_all`] cancels every job still waiting in the
//! queue by moving to a new epoch: workers compare each job's epoch with the
//! current one and report stale jobs as [`CompletionStatus::Cancelled`]
//! without spawning them. Jobs already running are left to finish or time out.

use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;

use crate::error::{Error, Result};
use crate::execution::ProcessRunner;
use crate::models::CommandResult;

/// A queued command
#[derive(Debug, Clone)]
pub struct Job {
    pub id: u64,
    pub command: String,
    pub cwd: PathBuf,
    epoch: u64,
}

/// How a job ended
#[derive(Debug, Clone)]
pub enum CompletionStatus {
    /// The process ran (it may still have failed or timed out)
    Finished(CommandResult),
    /// The process could not be started
    SpawnFailed(String),
    /// Cancelled by `stop_all` before it started
    Cancelled,
}

/// Result of one job, delivered on the completion channel
#[derive(Debug, Clone)]
pub struct Completion {
    pub id: u64,
    pub command: String,
    pub status: CompletionStatus,
}

struct Shared {
    runner: ProcessRunner,
    timeout: Duration,
    epoch: AtomicU64,
    queued: AtomicUsize,
}

pub struct CommandDispatcher {
    jobs: Option<mpsc::UnboundedSender<Job>>,
    completions: mpsc::UnboundedReceiver<Completion>,
    shared: Arc<Shared>,
    workers: Vec<JoinHandle<()>>,
    next_id: u64,
    in_flight: usize,
}

impl CommandDispatcher {
    /// Start `worker_count` workers on the current tokio runtime
    pub fn new(worker_count: usize, runner: ProcessRunner, timeout: Duration) -> Result<Self> {
        let handle = Handle::try_current().map_err(|e| Error::Other(format!("No tokio runtime for dispatcher: {}", e)))?;

        let (job_tx, job_rx) = mpsc::unbounded_channel::<Job>();
        let (done_tx, done_rx) = mpsc::unbounded_channel::<Completion>();
        let job_rx = Arc::new(Mutex::new(job_rx));
        let shared = Arc::new(Shared {
            runner,
            timeout,
            epoch: AtomicU64::new(0),
            queued: AtomicUsize::new(0),
        });

        let workers = (0..worker_count.max(1))
            .map(|worker| handle.spawn(worker_loop(worker, job_rx.clone(), done_tx.clone(), shared.clone())))
            .collect();

        debug!("Command dispatcher started with {} workers", worker_count.max(1));
        Ok(Self {
            jobs: Some(job_tx),
            completions: done_rx,
            shared,
            workers,
            next_id: 0,
            in_flight: 0,
        })
    }

    /// Queue a command; returns its job id
    pub fn submit(&mut self, command: impl Into<String>, cwd: PathBuf) -> Result<u64> {
        let command = command.into();
        if command.trim().is_empty() {
            return Err(Error::EmptyCommand);
        }
        let sender = self.jobs.as_ref().ok_or(Error::DispatcherClosed)?;

        let id = self.next_id;
        let job = Job {
            id,
            command,
            cwd,
            epoch: self.shared.epoch.load(Ordering::SeqCst),
        };
        self.shared.queued.fetch_add(1, Ordering::SeqCst);
        if sender.send(job).is_err() {
            self.shared.queued.fetch_sub(1, Ordering::SeqCst);
            return Err(Error::DispatcherClosed);
        }

        self.next_id += 1;
        self.in_flight += 1;
        Ok(id)
    }

    /// Cancel every job that has not started yet; returns how many were queued
    pub fn stop_all(&self) -> usize {
        self.shared.epoch.fetch_add(1, Ordering::SeqCst);
        let queued = self.shared.queued.load(Ordering::SeqCst);
        info!("Stopping {} queued command(s)", queued);
        queued
    }

    /// A completion if one is ready, without waiting
    pub fn try_next_completion(&mut self) -> Option<Completion> {
        let completion = self.completions.try_recv().ok()?;
        self.in_flight = self.in_flight.saturating_sub(1);
        Some(completion)
    }

    /// Wait for the next completion; `None` once nothing is in flight
    pub async fn next_completion(&mut self) -> Option<Completion> {
        if self.in_flight == 0 {
            return None;
        }
        let completion = self.completions.recv().await?;
        self.in_flight = self.in_flight.saturating_sub(1);
        Some(completion)
    }

    /// Jobs submitted whose completion has not been received
    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    /// Jobs waiting in the queue, not yet picked up by a worker
    pub fn queued(&self) -> usize {
        self.shared.queued.load(Ordering::SeqCst)
    }

    /// Stop accepting jobs and wait for the workers to drain the queue
    pub async fn shutdown(mut self) {
        self.jobs = None;
        for worker in self.workers.drain(..) {
            if let Err(e) = worker.await {
                warn!("Dispatcher worker ended abnormally: {}", e);
            }
        }
    }
}

impl Drop for CommandDispatcher {
    fn drop(&mut self) {
        for worker in &self.workers {
            worker.abort();
        }
    }
}

async fn worker_loop(
    worker: usize,
    jobs: Arc<Mutex<mpsc::UnboundedReceiver<Job>>>,
    completions: mpsc::UnboundedSender<Completion>,
    shared: Arc<Shared>,
) {
    loop {
        let job = {
            let mut jobs = jobs.lock().await;
            jobs.recv().await
        };
        let Some(job) = job else {
            break;
        };
        shared.queued.fetch_sub(1, Ordering::SeqCst);

        let status = if job.epoch != shared.epoch.load(Ordering::SeqCst) {
            debug!("Worker {} skipping cancelled job {}", worker, job.id);
            CompletionStatus::Cancelled
        } else {
            trace!("Worker {} running job {}: {}", worker, job.id, job.command);
            match shared.runner.run(&job.command, &job.cwd, shared.timeout).await {
                Ok(result) => CompletionStatus::Finished(result),
                Err(e) => CompletionStatus::SpawnFailed(e.to_string()),
            }
        };

        let completion = Completion {
            id: job.id,
            command: job.command,
            status,
        };
        if completions.send(completion).is_err() {
            break;
        }
    }
    trace!("Worker {} exiting", worker);
}
