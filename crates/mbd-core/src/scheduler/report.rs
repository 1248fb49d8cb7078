//! Terminal results of a batch run.

use std::path::PathBuf;

use crate::job::{Job, JobSpec, JobState};

/// Final result of one job.
#[derive(Debug, Clone, PartialEq)]
pub struct JobReport {
    pub index: usize,
    pub name: String,
    pub output_path: PathBuf,
    pub state: JobState,
    pub attempts: u32,
    pub last_error: Option<String>,
    /// Output size, sampled for succeeded jobs.
    pub output_bytes: Option<u64>,
}

impl JobReport {
    pub(crate) fn from_job(job: &Job, output_bytes: Option<u64>) -> Self {
        Self {
            index: job.spec.index,
            name: job.spec.entry.name.clone(),
            output_path: job.spec.output_path.clone(),
            state: job.state,
            attempts: job.attempt,
            last_error: job.last_error.clone(),
            output_bytes,
        }
    }

    /// Failed report for a job whose worker ended without producing one.
    pub(crate) fn worker_lost(spec: &JobSpec, attempts: u32, reason: &str) -> Self {
        Self {
            index: spec.index,
            name: spec.entry.name.clone(),
            output_path: spec.output_path.clone(),
            state: JobState::Failed,
            attempts,
            last_error: Some(format!("worker stopped unexpectedly: {}", reason)),
            output_bytes: None,
        }
    }

    /// One-line human summary: size on success, last error on failure.
    pub fn summary(&self) -> String {
        match self.state {
            JobState::Succeeded => {
                let mib = self.output_bytes.unwrap_or(0) as f64 / 1_048_576.0;
                format!("{} ✓ ({:.1}MB)", self.name, mib)
            }
            JobState::Failed => format!(
                "{} ✗ ({})",
                self.name,
                self.last_error.as_deref().unwrap_or("unknown error")
            ),
            JobState::Cancelled => format!("{} ✗ (cancelled)", self.name),
            other => format!("{} ({})", self.name, other),
        }
    }
}

/// Results of every scheduled job, ordered by playlist index.
#[derive(Debug, Clone, Default)]
pub struct BatchReport {
    pub jobs: Vec<JobReport>,
    /// Entries left out because their output already existed.
    pub skipped: usize,
}

impl BatchReport {
    fn count(&self, state: JobState) -> usize {
        self.jobs.iter().filter(|j| j.state == state).count()
    }

    pub fn succeeded(&self) -> usize {
        self.count(JobState::Succeeded)
    }

    pub fn failed(&self) -> usize {
        self.count(JobState::Failed)
    }

    pub fn cancelled(&self) -> usize {
        self.count(JobState::Cancelled)
    }
}
