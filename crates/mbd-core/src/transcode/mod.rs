//! Driving the external media tool for one attempt.
//!
//! [`AttemptRunner`] is the seam between the scheduler and the process: the
//! scheduler only sees [`AttemptOutcome`]s, so retry and cancellation logic
//! can be exercised with fakes. [`FfmpegRunner`] is the real implementation.

mod command;
mod output;
mod probe;
mod terminate;

use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Child;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::config::BatchConfig;
use crate::job::JobSpec;
use crate::progress::{MonitorSink, ProgressMonitor, StreamEnd};
use crate::retry::{AttemptError, AttemptOutcome};

pub use command::build_args;
pub use probe::probe_tool;
pub use terminate::TERMINATE_GRACE;

use self::output::spawn_line_forwarder;
use self::terminate::terminate;

/// Lines buffered between the output readers and the monitor.
const LINE_BUFFER: usize = 256;

/// Everything one attempt needs besides the runner's own settings.
pub struct AttemptContext<'a> {
    pub spec: &'a JobSpec,
    /// 1-based attempt number.
    pub attempt: u32,
    pub cancel: &'a CancellationToken,
    pub sink: MonitorSink<'a>,
}

/// Runs a single attempt of a job to completion, failure or cancellation.
#[async_trait]
pub trait AttemptRunner: Send + Sync {
    async fn run_attempt(&self, ctx: AttemptContext<'_>) -> AttemptOutcome;
}

/// Runs the media tool (ffmpeg-compatible CLI) as a child process.
#[derive(Debug, Clone)]
pub struct FfmpegRunner {
    pub program: PathBuf,
    pub speed_limit: Option<String>,
    /// Bounds both the wait for the next output line and the exit wait.
    pub timeout: Duration,
    pub grace: Duration,
}

impl FfmpegRunner {
    pub fn new(program: impl Into<PathBuf>, cfg: &BatchConfig) -> Self {
        Self {
            program: program.into(),
            speed_limit: cfg.speed_limit.clone(),
            timeout: cfg.timeout_duration(),
            grace: TERMINATE_GRACE,
        }
    }

    fn spawn(&self, spec: &JobSpec) -> std::io::Result<Child> {
        let args = build_args(&spec.entry, &spec.output_path, self.speed_limit.as_deref());
        let mut cmd = tokio::process::Command::new(&self.program);
        cmd.args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        // Own process group: a terminal Ctrl+C reaches us, not every child.
        #[cfg(unix)]
        cmd.process_group(0);
        cmd.spawn()
    }

    async fn cancel_child(&self, child: &mut Child, name: &str) -> AttemptOutcome {
        match terminate(child, self.grace).await {
            Ok(status) => tracing::debug!(job = %name, ?status, "process stopped after cancel"),
            Err(e) => tracing::warn!(job = %name, "stopping cancelled process: {}", e),
        }
        AttemptOutcome::Cancelled
    }
}

#[async_trait]
impl AttemptRunner for FfmpegRunner {
    async fn run_attempt(&self, ctx: AttemptContext<'_>) -> AttemptOutcome {
        let spec = ctx.spec;
        let name = spec.entry.name.as_str();

        let mut child = match self.spawn(spec) {
            Ok(child) => child,
            Err(e) => return AttemptOutcome::Failed(AttemptError::Spawn(e)),
        };
        tracing::debug!(job = %name, attempt = ctx.attempt, pid = child.id(), "spawned media tool");

        let (line_tx, mut lines) = mpsc::channel(LINE_BUFFER);
        if let Some(stdout) = child.stdout.take() {
            spawn_line_forwarder(stdout, line_tx.clone());
        }
        if let Some(stderr) = child.stderr.take() {
            spawn_line_forwarder(stderr, line_tx.clone());
        }
        drop(line_tx);

        let mut monitor =
            ProgressMonitor::new(spec.index, name, ctx.attempt, &spec.output_path, ctx.sink);
        match monitor.consume(&mut lines, self.timeout, ctx.cancel).await {
            StreamEnd::Cancelled => return self.cancel_child(&mut child, name).await,
            StreamEnd::Stalled => {
                let _ = child.kill().await;
                return AttemptOutcome::Failed(AttemptError::Stalled {
                    after: self.timeout,
                });
            }
            StreamEnd::Eof => {}
        }

        tokio::select! {
            biased;
            _ = ctx.cancel.cancelled() => self.cancel_child(&mut child, name).await,
            waited = tokio::time::timeout(self.timeout, child.wait()) => match waited {
                Ok(Ok(status)) => AttemptOutcome::from_exit_code(status.code()),
                Ok(Err(e)) => AttemptOutcome::Failed(AttemptError::Io(e)),
                Err(_) => {
                    let _ = child.kill().await;
                    AttemptOutcome::Failed(AttemptError::Timeout { after: self.timeout })
                }
            },
        }
    }
}
