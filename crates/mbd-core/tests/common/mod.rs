//! Shared helpers: job specs and a scripted attempt runner.

#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use mbd_core::job::JobSpec;
use mbd_core::playlist::StreamEntry;
use mbd_core::retry::{AttemptError, AttemptOutcome};
use mbd_core::transcode::{AttemptContext, AttemptRunner};

pub fn spec(index: usize, dir: &Path) -> JobSpec {
    JobSpec {
        index,
        entry: StreamEntry {
            name: format!("Episode {}", index + 1),
            url: format!("https://cdn.example/{}.m3u8", index),
            referer: None,
            subtitles: Vec::new(),
            quality: None,
        },
        output_path: dir.join(format!("Episode {}.mkv", index + 1)),
    }
}

pub fn specs(n: usize, dir: &Path) -> Vec<JobSpec> {
    (0..n).map(|i| spec(i, dir)).collect()
}

pub fn scratch() -> PathBuf {
    PathBuf::from("/nonexistent-mbd-test")
}

/// What the fake process does on one attempt.
#[derive(Debug, Clone, Copy)]
pub enum Step {
    Succeed,
    Fail,
    /// Run until cancelled, then count one termination request.
    WaitForCancel,
    /// The worker itself panics mid-attempt.
    Panic,
}

/// Attempt runner that follows a per-job script instead of spawning processes.
/// Jobs without a script (or with an exhausted one) succeed.
pub struct ScriptedRunner {
    script: Mutex<HashMap<usize, VecDeque<Step>>>,
    attempts: Mutex<HashMap<usize, u32>>,
    hold: Duration,
    in_flight: AtomicUsize,
    pub max_in_flight: AtomicUsize,
    pub max_registry_running: AtomicUsize,
    pub terminations: AtomicUsize,
}

impl ScriptedRunner {
    pub fn new(hold: Duration) -> Self {
        Self {
            script: Mutex::new(HashMap::new()),
            attempts: Mutex::new(HashMap::new()),
            hold,
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
            max_registry_running: AtomicUsize::new(0),
            terminations: AtomicUsize::new(0),
        }
    }

    pub fn with_script(self, index: usize, steps: &[Step]) -> Self {
        self.script
            .lock()
            .unwrap()
            .insert(index, steps.iter().copied().collect());
        self
    }

    pub fn attempts_for(&self, index: usize) -> u32 {
        self.attempts.lock().unwrap().get(&index).copied().unwrap_or(0)
    }

    fn next_step(&self, index: usize) -> Step {
        self.script
            .lock()
            .unwrap()
            .get_mut(&index)
            .and_then(|steps| steps.pop_front())
            .unwrap_or(Step::Succeed)
    }
}

#[async_trait]
impl AttemptRunner for ScriptedRunner {
    async fn run_attempt(&self, ctx: AttemptContext<'_>) -> AttemptOutcome {
        let index = ctx.spec.index;
        *self.attempts.lock().unwrap().entry(index).or_insert(0) += 1;

        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        let running = ctx.sink.control.running().len();
        self.max_registry_running.fetch_max(running, Ordering::SeqCst);

        let outcome = match self.next_step(index) {
            Step::Succeed => {
                tokio::time::sleep(self.hold).await;
                AttemptOutcome::Succeeded
            }
            Step::Fail => {
                tokio::time::sleep(self.hold).await;
                AttemptOutcome::Failed(AttemptError::Exit { code: Some(1) })
            }
            Step::Panic => {
                self.in_flight.fetch_sub(1, Ordering::SeqCst);
                panic!("scripted worker panic for job {}", index);
            }
            Step::WaitForCancel => {
                ctx.cancel.cancelled().await;
                self.terminations.fetch_add(1, Ordering::SeqCst);
                AttemptOutcome::Cancelled
            }
        };

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        outcome
    }
}
