use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::{self, UnboundedReceiver};
use tokio::task::JoinHandle;
use tracing::{Instrument, debug, info, info_span};
use uuid::Uuid;

use crate::error::{Result, MangaBatchError};
use super::{BatchSummary, CancelToken, CommandRunner, CommandTemplate, JobQueue, ProgressUpdate, run_batch};

/// Completed/total counters, owned by the supervising side
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressState {
    completed: usize,
    total: usize,
}

impl ProgressState {
    pub fn new(total: usize) -> Self {
        Self { completed: 0, total }
    }

    /// `completed` never moves backwards and never exceeds `total`
    pub fn apply(&mut self, update: ProgressUpdate) {
        self.completed = self.completed.max(update.completed.min(self.total));
    }

    pub fn completed(&self) -> usize {
        self.completed
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub fn percentage(&self) -> u32 {
        if self.total == 0 {
            return 0;
        }
        (self.completed * 100 / self.total) as u32
    }
}

/// A batch running on its own worker task
pub struct BatchHandle {
    run_id: Uuid,
    worker: JoinHandle<Result<BatchSummary>>,
    updates: UnboundedReceiver<ProgressUpdate>,
    state: ProgressState,
    poll_interval: Duration,
    cancel: CancelToken,
}

// `tokio::time::interval` panics on a zero period.
const MIN_POLL_INTERVAL: Duration = Duration::from_millis(1);

/// Start `queue` on a dedicated worker task and return immediately
pub fn spawn_batch(
    queue: JobQueue,
    template: CommandTemplate,
    runner: Arc<dyn CommandRunner>,
    poll_interval: Duration,
) -> BatchHandle {
    let run_id = Uuid::new_v4();
    let (tx, updates) = mpsc::unbounded_channel();
    let cancel = CancelToken::new();
    let state = ProgressState::new(queue.len());

    let worker_cancel = cancel.clone();
    let span = info_span!("batch", run_id = %run_id);
    let worker = tokio::spawn(
        async move {
            run_batch(run_id, &queue, &template, runner.as_ref(), &tx, &worker_cancel).await
        }
        .instrument(span),
    );

    BatchHandle {
        run_id,
        worker,
        updates,
        state,
        poll_interval: poll_interval.max(MIN_POLL_INTERVAL),
        cancel,
    }
}

impl BatchHandle {
    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    pub fn total(&self) -> usize {
        self.state.total()
    }

    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    /// Relay progress to `on_progress` until the worker exits, then return its result.
    ///
    /// Progress is applied to the state and reported only from the task that
    /// awaits this future. Worker liveness is checked every `poll_interval`.
    pub async fn supervise<F>(mut self, mut on_progress: F) -> Result<BatchSummary>
    where
        F: FnMut(usize, usize),
    {
        let mut ticker = tokio::time::interval(self.poll_interval);

        loop {
            tokio::select! {
                Some(update) = self.updates.recv() => {
                    self.state.apply(update);
                    on_progress(self.state.completed(), self.state.total());
                }
                _ = ticker.tick() => {
                    if self.worker.is_finished() {
                        break;
                    }
                }
            }
        }

        // The worker has exited, so everything it sent is already queued.
        while let Ok(update) = self.updates.try_recv() {
            self.state.apply(update);
            on_progress(self.state.completed(), self.state.total());
        }

        debug!("Batch worker {} finished", self.run_id);
        let result = self
            .worker
            .await
            .map_err(|e| MangaBatchError::WorkerPanicked(e.to_string()))?;

        if let Ok(summary) = &result {
            info!(
                "Batch {} processed {} files in {}s",
                summary.run_id,
                summary.processed,
                (summary.finished_at - summary.started_at).num_seconds()
            );
        }
        result
    }
}

/// Runs batches with a fixed command template and runner
pub struct Orchestrator {
    template: CommandTemplate,
    runner: Arc<dyn CommandRunner>,
    poll_interval: Duration,
}

impl Orchestrator {
    pub fn new(template: CommandTemplate, runner: Arc<dyn CommandRunner>, poll_interval: Duration) -> Self {
        Self {
            template,
            runner,
            poll_interval,
        }
    }

    pub fn start(&self, queue: JobQueue) -> BatchHandle {
        spawn_batch(queue, self.template.clone(), Arc::clone(&self.runner), self.poll_interval)
    }

    /// Run `queue` to completion or first failure, reporting `(completed, total)`
    pub async fn run_batch<F>(&self, queue: JobQueue, on_progress: F) -> Result<BatchSummary>
    where
        F: FnMut(usize, usize),
    {
        self.start(queue).supervise(on_progress).await
    }
}
