//! Run a batch of jobs concurrently under an admission cap.
//!
//! Keeps up to `max_concurrent` jobs running at once; when one finishes,
//! the next queued job is started until the queue is empty.

use std::collections::VecDeque;
use std::sync::Arc;

use tokio::sync::mpsc;

use crate::control::JobControl;
use crate::job::JobSpec;
use crate::progress::ProgressUpdate;
use crate::retry::RetryPolicy;
use crate::transcode::AttemptRunner;

use super::report::{BatchReport, JobReport};
use super::worker::run_job;

/// Runs one job in its own task so a panic in it still yields a report and
/// frees its registry slot.
async fn supervise(
    spec: JobSpec,
    runner: Arc<dyn AttemptRunner>,
    control: Arc<JobControl>,
    policy: RetryPolicy,
    progress_tx: Option<mpsc::Sender<ProgressUpdate>>,
) -> JobReport {
    let fallback = spec.clone();
    let worker = tokio::spawn(run_job(spec, runner, Arc::clone(&control), policy, progress_tx));
    match worker.await {
        Ok(report) => report,
        Err(e) => {
            tracing::error!(index = fallback.index, "job worker died: {}", e);
            let attempts = control
                .snapshot()
                .into_iter()
                .find(|view| view.index == fallback.index)
                .map_or(0, |view| view.attempt);
            control.unregister(fallback.index);
            JobReport::worker_lost(&fallback, attempts, &e.to_string())
        }
    }
}

/// Runs `jobs` with up to `max_concurrent` in flight at once and returns once
/// every job is terminal. Jobs are admitted in order. A job's failure or
/// cancellation never affects its siblings. Progress from any job is sent to
/// `progress_tx`.
pub async fn run_jobs_parallel(
    jobs: Vec<JobSpec>,
    runner: Arc<dyn AttemptRunner>,
    control: Arc<JobControl>,
    policy: RetryPolicy,
    max_concurrent: usize,
    progress_tx: Option<mpsc::Sender<ProgressUpdate>>,
) -> BatchReport {
    let max_concurrent = max_concurrent.max(1);
    let mut queue: VecDeque<JobSpec> = jobs.into();
    let mut reports: Vec<JobReport> = Vec::with_capacity(queue.len());
    let mut join_set = tokio::task::JoinSet::new();

    loop {
        while join_set.len() < max_concurrent {
            let Some(spec) = queue.pop_front() else {
                break;
            };
            tracing::debug!(index = spec.index, in_flight = join_set.len(), "admitting job");
            join_set.spawn(supervise(
                spec,
                Arc::clone(&runner),
                Arc::clone(&control),
                policy,
                progress_tx.clone(),
            ));
        }

        let Some(res) = join_set.join_next().await else {
            break;
        };
        match res {
            Ok(report) => reports.push(report),
            Err(e) => tracing::error!("job task join: {}", e),
        }
    }

    reports.sort_by_key(|r| r.index);
    BatchReport {
        jobs: reports,
        skipped: 0,
    }
}
