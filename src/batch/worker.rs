use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, error, info};
use uuid::Uuid;

use crate::error::{Result, MangaBatchError};
use super::{CommandRunner, CommandTemplate, JobQueue};

/// Progress message sent from the worker to the supervising task
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressUpdate {
    pub completed: usize,
    pub total: usize,
}

/// Stops a batch between two items. A running tool process is never interrupted.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

#[derive(Debug, Clone)]
pub struct BatchSummary {
    pub run_id: Uuid,
    pub processed: usize,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

fn failure_detail(err: MangaBatchError) -> String {
    match err {
        MangaBatchError::Process(detail) => detail,
        other => other.to_string(),
    }
}

/// Process the queue in order, one tool invocation at a time.
///
/// A progress update is sent after every successful item and once more after
/// the last one. The first failing item ends the batch; nothing after it is
/// attempted and no update is sent for it.
pub async fn run_batch(
    run_id: Uuid,
    queue: &JobQueue,
    template: &CommandTemplate,
    runner: &dyn CommandRunner,
    progress: &UnboundedSender<ProgressUpdate>,
    cancel: &CancelToken,
) -> Result<BatchSummary> {
    let started_at = Utc::now();
    let total = queue.len();

    let send = |completed: usize| {
        if progress.send(ProgressUpdate { completed, total }).is_err() {
            debug!("Progress receiver dropped; continuing without progress reports");
        }
    };

    for item in queue {
        if cancel.is_cancelled() {
            info!("Batch cancelled before {}", item.path.display());
            return Err(MangaBatchError::Cancelled { completed: item.index, total });
        }

        info!("Processing file {}/{}: {}", item.index + 1, total, item.path.display());
        let command = template.for_item(item);

        if let Err(e) = runner.run(&command).await {
            let detail = failure_detail(e);
            error!("Failed to process '{}': {}", item.path.display(), detail);
            return Err(MangaBatchError::ExternalCommandFailed {
                path: item.path.clone(),
                detail,
            });
        }

        info!("Processed successfully: {}", item.path.display());
        send(item.index + 1);
    }

    send(total);

    Ok(BatchSummary {
        run_id,
        processed: total,
        started_at,
        finished_at: Utc::now(),
    })
}
