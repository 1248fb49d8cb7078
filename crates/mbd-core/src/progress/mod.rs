//! Progress reporting for running attempts (media position, speed, ETA).
//!
//! The media tool prints a `Duration:` marker once per input and `time=`
//! markers as it advances. [`parse_line`] decodes single lines, the
//! [`ProgressSnapshot`] holds the derived numbers, and [`ProgressMonitor`]
//! drives both from the process output.

mod monitor;
mod parse;
mod snapshot;

pub use monitor::{MonitorSink, ProgressMonitor, ProgressUpdate, StreamEnd};
pub use parse::{parse_clock, parse_line, ProgressEvent};
pub use snapshot::ProgressSnapshot;
