//! Consumes the media tool's output lines and keeps the attempt's snapshot current.

use std::path::Path;
use std::time::{Duration, Instant};

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use super::parse::{parse_line, ProgressEvent};
use super::snapshot::ProgressSnapshot;
use crate::control::JobControl;

/// Progress event published to display layers.
#[derive(Debug, Clone)]
pub struct ProgressUpdate {
    pub index: usize,
    pub name: String,
    pub attempt: u32,
    pub snapshot: ProgressSnapshot,
}

/// Why the monitor stopped reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamEnd {
    /// The process closed its output.
    Eof,
    /// No line arrived within the stall window.
    Stalled,
    /// The job's cancellation token fired.
    Cancelled,
}

/// Where a monitor publishes its snapshots.
#[derive(Clone, Copy)]
pub struct MonitorSink<'a> {
    pub control: &'a JobControl,
    pub updates: Option<&'a mpsc::Sender<ProgressUpdate>>,
}

/// Per-attempt progress monitor.
pub struct ProgressMonitor<'a> {
    index: usize,
    name: &'a str,
    attempt: u32,
    output_path: &'a Path,
    started: Instant,
    snapshot: ProgressSnapshot,
    sink: MonitorSink<'a>,
}

impl<'a> ProgressMonitor<'a> {
    pub fn new(
        index: usize,
        name: &'a str,
        attempt: u32,
        output_path: &'a Path,
        sink: MonitorSink<'a>,
    ) -> Self {
        Self {
            index,
            name,
            attempt,
            output_path,
            started: Instant::now(),
            snapshot: ProgressSnapshot::default(),
            sink,
        }
    }

    pub fn snapshot(&self) -> &ProgressSnapshot {
        &self.snapshot
    }

    /// Reads lines until end of stream, a stall, or cancellation.
    pub async fn consume(
        &mut self,
        lines: &mut mpsc::Receiver<String>,
        stall: Duration,
        cancel: &CancellationToken,
    ) -> StreamEnd {
        loop {
            let next = tokio::select! {
                biased;
                _ = cancel.cancelled() => return StreamEnd::Cancelled,
                next = tokio::time::timeout(stall, lines.recv()) => next,
            };
            match next {
                Err(_) => return StreamEnd::Stalled,
                Ok(None) => return StreamEnd::Eof,
                Ok(Some(line)) => {
                    self.observe(&line).await;
                }
            }
        }
    }

    /// Applies one output line. Returns true when the snapshot changed.
    pub async fn observe(&mut self, line: &str) -> bool {
        let changed = match parse_line(line) {
            Some(ProgressEvent::Duration(secs)) => self.snapshot.set_duration(secs),
            Some(ProgressEvent::Time(secs)) => {
                self.snapshot.set_position(secs, self.started.elapsed());
                true
            }
            None => {
                tracing::trace!(job = %self.name, "{}", line);
                false
            }
        };
        if changed {
            self.snapshot.output_bytes = sample_size(self.output_path).await;
            self.publish();
        }
        changed
    }

    fn publish(&self) {
        let snapshot = self.snapshot.clone();
        self.sink.control.update(self.index, |view| {
            view.progress = snapshot.clone();
        });
        if let Some(tx) = self.sink.updates {
            let _ = tx.try_send(ProgressUpdate {
                index: self.index,
                name: self.name.to_string(),
                attempt: self.attempt,
                snapshot,
            });
        }
    }
}

/// Current size of the growing output file; 0 when it does not exist yet.
async fn sample_size(path: &Path) -> u64 {
    tokio::fs::metadata(path).await.map(|m| m.len()).unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    async fn feed(lines: &[&str]) -> (mpsc::Receiver<String>, mpsc::Sender<String>) {
        let (tx, rx) = mpsc::channel(lines.len().max(1));
        for l in lines {
            tx.send(l.to_string()).await.unwrap();
        }
        (rx, tx)
    }

    #[tokio::test]
    async fn eof_after_lines_with_percent() {
        let control = JobControl::new();
        let path = PathBuf::from("/nonexistent/out.mkv");
        let sink = MonitorSink {
            control: &control,
            updates: None,
        };
        let mut monitor = ProgressMonitor::new(0, "Ep", 1, &path, sink);
        let (mut rx, tx) = feed(&[
            "  Duration: 00:01:40.00, start: 0.0",
            "noise",
            "out_time=00:00:50.000000",
        ])
        .await;
        drop(tx);
        let end = monitor
            .consume(&mut rx, Duration::from_secs(5), &CancellationToken::new())
            .await;
        assert_eq!(end, StreamEnd::Eof);
        assert_eq!(monitor.snapshot().percent, Some(50.0));
        assert_eq!(monitor.snapshot().output_bytes, 0);
    }

    #[tokio::test]
    async fn unavailable_duration_keeps_percent_unreported() {
        let control = JobControl::new();
        let path = PathBuf::from("/nonexistent/out.mkv");
        let sink = MonitorSink {
            control: &control,
            updates: None,
        };
        let mut monitor = ProgressMonitor::new(0, "Ep", 1, &path, sink);
        let (mut rx, tx) = feed(&["  Duration: N/A, start: 0.0, bitrate: N/A"]).await;
        drop(tx);
        monitor
            .consume(&mut rx, Duration::from_secs(5), &CancellationToken::new())
            .await;
        assert_eq!(monitor.snapshot().percent, None);
        assert_eq!(monitor.snapshot().total_duration_secs, None);
    }

    #[tokio::test(start_paused = true)]
    async fn silent_stream_stalls() {
        let control = JobControl::new();
        let path = PathBuf::from("out.mkv");
        let sink = MonitorSink {
            control: &control,
            updates: None,
        };
        let mut monitor = ProgressMonitor::new(0, "Ep", 1, &path, sink);
        let (mut rx, _tx) = feed(&[]).await;
        let end = monitor
            .consume(&mut rx, Duration::from_secs(30), &CancellationToken::new())
            .await;
        assert_eq!(end, StreamEnd::Stalled);
    }

    #[tokio::test]
    async fn cancellation_stops_reading() {
        let control = JobControl::new();
        let path = PathBuf::from("out.mkv");
        let sink = MonitorSink {
            control: &control,
            updates: None,
        };
        let mut monitor = ProgressMonitor::new(0, "Ep", 1, &path, sink);
        let (mut rx, _tx) = feed(&[]).await;
        let cancel = CancellationToken::new();
        cancel.cancel();
        let end = monitor.consume(&mut rx, Duration::from_secs(30), &cancel).await;
        assert_eq!(end, StreamEnd::Cancelled);
    }

    #[tokio::test]
    async fn updates_published_and_percent_monotonic() {
        let control = JobControl::new();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.mkv");
        std::fs::write(&path, vec![0u8; 2048]).unwrap();
        let (utx, mut urx) = mpsc::channel(16);
        let sink = MonitorSink {
            control: &control,
            updates: Some(&utx),
        };
        let mut monitor = ProgressMonitor::new(4, "Ep", 2, &path, sink);
        for line in [
            "Duration: 00:00:10.00,",
            "time=00:00:02.00 bitrate=1",
            "time=00:00:01.00 bitrate=1",
            "time=00:00:06.00 bitrate=1",
        ] {
            monitor.observe(line).await;
        }
        drop(utx);
        let mut last = -1.0;
        let mut count = 0;
        while let Some(update) = urx.recv().await {
            assert_eq!(update.index, 4);
            assert_eq!(update.attempt, 2);
            assert_eq!(update.snapshot.output_bytes, 2048);
            let pct = update.snapshot.percent.unwrap();
            assert!(pct >= last);
            last = pct;
            count += 1;
        }
        assert_eq!(count, 4);
        assert_eq!(last, 60.0);
    }
}
