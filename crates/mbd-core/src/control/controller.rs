//! Operator-driven cancellation of running jobs.

use std::future::Future;
use std::sync::Arc;

use tokio::sync::mpsc;

use super::registry::{ActiveJob, JobControl};
use crate::selection::parse_ranges;

/// Reacts to interrupt notifications by asking the operator which running
/// jobs to cancel. The batch itself keeps going.
pub struct CancellationController {
    control: Arc<JobControl>,
}

impl CancellationController {
    pub fn new(control: Arc<JobControl>) -> Self {
        Self { control }
    }

    /// Snapshot of the jobs that can be cancelled right now.
    pub fn running(&self) -> Vec<ActiveJob> {
        self.control.running()
    }

    /// Cancels the jobs picked by `selection` (1-based positions in
    /// `listed`, range syntax). Jobs that finished since the listing are
    /// skipped. Returns the playlist indices actually cancelled.
    pub fn cancel_selected(&self, listed: &[ActiveJob], selection: &str) -> Vec<usize> {
        let mut cancelled = Vec::new();
        for pos in parse_ranges(selection, listed.len()) {
            let Some(job) = pos.checked_sub(1).and_then(|i| listed.get(i)) else {
                continue;
            };
            if self.control.request_cancel(job.index) {
                tracing::info!(index = job.index, name = %job.name, "cancellation requested");
                cancelled.push(job.index);
            } else {
                tracing::debug!(index = job.index, "job no longer running; nothing to cancel");
            }
        }
        cancelled
    }

    /// Serves interrupts until the sender side is dropped. For each one the
    /// current running set is handed to `prompt`, whose answer is the selection.
    pub async fn serve<F, Fut>(&self, mut interrupts: mpsc::Receiver<()>, mut prompt: F)
    where
        F: FnMut(Vec<ActiveJob>) -> Fut,
        Fut: Future<Output = String>,
    {
        while interrupts.recv().await.is_some() {
            let running = self.running();
            if running.is_empty() {
                tracing::debug!("interrupt with no running jobs");
                continue;
            }
            let answer = prompt(running.clone()).await;
            self.cancel_selected(&running, &answer);
        }
    }
}
