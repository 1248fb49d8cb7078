//! Jobs: one playlist entry plus its resolved output path and execution state.
//!
//! A [`JobSpec`] is fixed before scheduling. The mutable [`Job`] is owned by
//! the worker running it; the only state other threads touch lives in the
//! [`JobControl`](crate::control::JobControl) registry.

mod state;

use std::path::{Path, PathBuf};

use crate::output_path;
use crate::playlist::StreamEntry;
use crate::progress::ProgressSnapshot;
use crate::retry::{classify, AttemptOutcome, RetryDecision, RetryPolicy};

pub use state::{InvalidTransition, JobState};

/// Immutable description of one job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobSpec {
    /// 0-based position in the parsed playlist.
    pub index: usize,
    pub entry: StreamEntry,
    pub output_path: PathBuf,
}

/// Builds job specs for every entry, resolving output paths against the full list.
pub fn plan_jobs(entries: &[StreamEntry], dir: &Path) -> Vec<JobSpec> {
    output_path::resolve_all(dir, entries)
        .into_iter()
        .zip(entries.iter().cloned())
        .enumerate()
        .map(|(index, (output_path, entry))| JobSpec {
            index,
            entry,
            output_path,
        })
        .collect()
}

/// Live execution record of a job, mutated only by its worker.
#[derive(Debug, Clone)]
pub struct Job {
    pub spec: JobSpec,
    /// 1-based attempt number; 0 until the first attempt starts.
    pub attempt: u32,
    pub state: JobState,
    pub last_error: Option<String>,
    pub progress: ProgressSnapshot,
}

impl Job {
    pub fn new(spec: JobSpec) -> Self {
        Self {
            spec,
            attempt: 0,
            state: JobState::Pending,
            last_error: None,
            progress: ProgressSnapshot::default(),
        }
    }

    fn transition(&mut self, to: JobState) -> Result<(), InvalidTransition> {
        if !self.state.can_transition_to(to) {
            return Err(InvalidTransition {
                from: self.state,
                to,
            });
        }
        self.state = to;
        Ok(())
    }

    /// Enters Running for the next attempt and resets attempt-scoped progress.
    pub fn start_attempt(&mut self) -> Result<u32, InvalidTransition> {
        self.transition(JobState::Running)?;
        self.attempt += 1;
        self.progress = ProgressSnapshot::default();
        Ok(self.attempt)
    }

    /// Applies the outcome of the current attempt and returns the new state:
    /// Retrying when another attempt is allowed, otherwise a terminal state.
    pub fn finish_attempt(
        &mut self,
        outcome: AttemptOutcome,
        policy: &RetryPolicy,
    ) -> Result<JobState, InvalidTransition> {
        let next = match outcome {
            AttemptOutcome::Succeeded => JobState::Succeeded,
            AttemptOutcome::Cancelled => JobState::Cancelled,
            AttemptOutcome::Failed(err) => {
                let decision = policy.decide(self.attempt, classify(&err));
                self.last_error = Some(err.to_string());
                match decision {
                    RetryDecision::RetryNow => JobState::Retrying,
                    RetryDecision::NoRetry => JobState::Failed,
                }
            }
        };
        self.transition(next)?;
        Ok(next)
    }

    /// Cancels a job that is between attempts.
    pub fn cancel(&mut self) -> Result<(), InvalidTransition> {
        self.transition(JobState::Cancelled)
    }
}
