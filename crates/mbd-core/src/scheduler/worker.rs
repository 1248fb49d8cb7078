//! One job from admission to terminal state.

use std::sync::Arc;

use tokio::sync::mpsc;

use crate::control::JobControl;
use crate::job::{Job, JobSpec, JobState};
use crate::progress::{MonitorSink, ProgressSnapshot, ProgressUpdate};
use crate::retry::{AttemptOutcome, RetryPolicy};
use crate::transcode::{AttemptContext, AttemptRunner};

use super::report::JobReport;

/// Runs `spec` through attempts until it succeeds, exhausts the retry
/// policy, or is cancelled. The job is registered in `control` for its whole
/// lifetime so it can be listed and cancelled.
pub(crate) async fn run_job(
    spec: JobSpec,
    runner: Arc<dyn AttemptRunner>,
    control: Arc<JobControl>,
    policy: RetryPolicy,
    progress_tx: Option<mpsc::Sender<ProgressUpdate>>,
) -> JobReport {
    let index = spec.index;
    let token = control.register(&spec);
    let mut job = Job::new(spec);

    loop {
        if token.is_cancelled() {
            if let Err(e) = job.cancel() {
                tracing::error!(index, "{}", e);
            }
            break;
        }

        let attempt = match job.start_attempt() {
            Ok(n) => n,
            Err(e) => {
                tracing::error!(index, "{}", e);
                break;
            }
        };
        control.update(index, |view| {
            view.state = JobState::Running;
            view.attempt = attempt;
            view.progress = ProgressSnapshot::default();
        });
        tracing::info!(index, name = %job.spec.entry.name, attempt, "attempt started");
        if let Some(tx) = &progress_tx {
            // Start marker: lets display layers report retries of attempts
            // that die before printing anything.
            let _ = tx
                .send(ProgressUpdate {
                    index,
                    name: job.spec.entry.name.clone(),
                    attempt,
                    snapshot: ProgressSnapshot::default(),
                })
                .await;
        }

        let ctx = AttemptContext {
            spec: &job.spec,
            attempt,
            cancel: &token,
            sink: MonitorSink {
                control: &control,
                updates: progress_tx.as_ref(),
            },
        };
        let mut outcome = runner.run_attempt(ctx).await;
        if token.is_cancelled() {
            // Operator intent wins over whatever the process did meanwhile.
            outcome = AttemptOutcome::Cancelled;
        }
        if let Some(view) = control.snapshot().into_iter().find(|v| v.index == index) {
            job.progress = view.progress;
        }

        let next = match job.finish_attempt(outcome, &policy) {
            Ok(next) => next,
            Err(e) => {
                tracing::error!(index, "{}", e);
                break;
            }
        };
        control.update(index, |view| view.state = next);

        match next {
            JobState::Retrying => tracing::warn!(
                index,
                name = %job.spec.entry.name,
                "retry {}/{}: {}",
                attempt,
                policy.max_attempts,
                job.last_error.as_deref().unwrap_or("")
            ),
            JobState::Succeeded => {
                tracing::info!(index, name = %job.spec.entry.name, attempt, "job succeeded");
                break;
            }
            JobState::Failed => {
                tracing::warn!(
                    index,
                    name = %job.spec.entry.name,
                    "job failed after {} attempt(s): {}",
                    attempt,
                    job.last_error.as_deref().unwrap_or("")
                );
                break;
            }
            JobState::Cancelled => {
                tracing::info!(index, name = %job.spec.entry.name, "job cancelled");
                break;
            }
            JobState::Pending | JobState::Running => break,
        }
    }

    control.unregister(index);

    let output_bytes = if job.state == JobState::Succeeded {
        tokio::fs::metadata(&job.spec.output_path)
            .await
            .ok()
            .map(|m| m.len())
    } else {
        None
    };
    JobReport::from_job(&job, output_bytes)
}
