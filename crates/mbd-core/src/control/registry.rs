//! Shared registry of active jobs.
//!
//! Workers insert themselves when they start and remove themselves when they
//! reach a terminal state. Readers (display, cancellation) only get cloned
//! snapshots. A single mutex guards the map; the per-job cancellation token is
//! the one piece of job state written from outside the worker.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard};

use tokio_util::sync::CancellationToken;

use crate::job::{JobSpec, JobState};
use crate::progress::ProgressSnapshot;

/// Display view of an active job.
#[derive(Debug, Clone, PartialEq)]
pub struct ActiveJob {
    pub index: usize,
    pub name: String,
    pub output_path: PathBuf,
    pub attempt: u32,
    pub state: JobState,
    pub progress: ProgressSnapshot,
}

struct Slot {
    view: ActiveJob,
    token: CancellationToken,
}

/// Registry of job index -> (display view, cancellation token).
#[derive(Default)]
pub struct JobControl {
    jobs: Mutex<BTreeMap<usize, Slot>>,
}

impl JobControl {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, BTreeMap<usize, Slot>> {
        // A panicking worker must not take the registry down with it.
        self.jobs.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Register a starting job; returns the token its worker watches.
    pub fn register(&self, spec: &JobSpec) -> CancellationToken {
        let token = CancellationToken::new();
        let view = ActiveJob {
            index: spec.index,
            name: spec.entry.name.clone(),
            output_path: spec.output_path.clone(),
            attempt: 0,
            state: JobState::Pending,
            progress: ProgressSnapshot::default(),
        };
        self.lock().insert(
            spec.index,
            Slot {
                view,
                token: token.clone(),
            },
        );
        token
    }

    /// Unregister a job (call when the job reaches a terminal state).
    pub fn unregister(&self, index: usize) {
        self.lock().remove(&index);
    }

    /// Update the display view of a registered job. A view already marked
    /// Cancelled keeps that state.
    pub fn update<F>(&self, index: usize, f: F)
    where
        F: FnOnce(&mut ActiveJob),
    {
        if let Some(slot) = self.lock().get_mut(&index) {
            let cancelled = slot.view.state == JobState::Cancelled;
            f(&mut slot.view);
            if cancelled {
                slot.view.state = JobState::Cancelled;
            }
        }
    }

    /// All registered jobs, ordered by playlist index.
    pub fn snapshot(&self) -> Vec<ActiveJob> {
        self.lock().values().map(|s| s.view.clone()).collect()
    }

    /// Registered jobs currently in an attempt.
    pub fn running(&self) -> Vec<ActiveJob> {
        self.lock()
            .values()
            .filter(|s| s.view.state == JobState::Running)
            .map(|s| s.view.clone())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Request cancellation of a running (or retrying) job. Marks the view
    /// Cancelled and fires the job's token; the worker terminates the process.
    /// Returns false when the job is not registered or not in an attempt.
    pub fn request_cancel(&self, index: usize) -> bool {
        let mut jobs = self.lock();
        let Some(slot) = jobs.get_mut(&index) else {
            return false;
        };
        if !matches!(slot.view.state, JobState::Running | JobState::Retrying) {
            return false;
        }
        slot.view.state = JobState::Cancelled;
        slot.token.cancel();
        true
    }
}
