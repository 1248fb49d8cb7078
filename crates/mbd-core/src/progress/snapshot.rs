//! Progress snapshot for one running attempt (CLI-friendly).
//!
//! Rates are in media time: `speed_factor` 2.0 means two seconds of media
//! were written per wall-clock second.

use std::time::Duration;

/// Most recent decoded position, speed and ETA of an attempt.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProgressSnapshot {
    /// Media duration; `None` until the tool reports a real one.
    pub total_duration_secs: Option<f64>,
    /// Media position reached so far (never decreases within an attempt).
    pub current_time_secs: f64,
    /// Percent in [0, 100]; `None` while the duration is unknown.
    pub percent: Option<f64>,
    pub elapsed_wall_secs: f64,
    pub speed_factor: f64,
    /// Seconds remaining; `None` when duration or speed is unknown.
    pub eta_secs: Option<f64>,
    /// Size of the output file when last sampled.
    pub output_bytes: u64,
}

impl ProgressSnapshot {
    /// Applies a newly reported total duration. The first real duration wins;
    /// zero or unavailable durations leave it unknown.
    pub(crate) fn set_duration(&mut self, secs: Option<f64>) -> bool {
        match (self.total_duration_secs, secs) {
            (None, Some(d)) if d > 0.0 => {
                self.total_duration_secs = Some(d);
                self.recompute();
                true
            }
            _ => false,
        }
    }

    /// Applies a new media position observed `elapsed` after the attempt started.
    pub(crate) fn set_position(&mut self, secs: f64, elapsed: Duration) {
        self.current_time_secs = self.current_time_secs.max(secs);
        self.elapsed_wall_secs = elapsed.as_secs_f64();
        self.speed_factor = if self.elapsed_wall_secs > 0.0 {
            self.current_time_secs / self.elapsed_wall_secs
        } else {
            0.0
        };
        self.recompute();
    }

    fn recompute(&mut self) {
        self.percent = self
            .total_duration_secs
            .map(|d| (self.current_time_secs / d * 100.0).clamp(0.0, 100.0));
        self.eta_secs = match self.total_duration_secs {
            Some(d) if self.speed_factor > 0.0 => {
                Some((d - self.current_time_secs).max(0.0) / self.speed_factor)
            }
            _ => None,
        };
    }

    /// Output size in MiB, for display.
    pub fn output_mib(&self) -> f64 {
        self.output_bytes as f64 / 1_048_576.0
    }
}
