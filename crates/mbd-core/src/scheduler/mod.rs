//! Batch scheduler.
//!
//! Admits jobs under a concurrency cap and runs each through the attempt /
//! retry state machine:
//! Pending → Running → {Succeeded | Retrying | Failed | Cancelled},
//! Retrying → Running.

mod parallel;
mod report;
mod worker;

pub use parallel::run_jobs_parallel;
pub use report::{BatchReport, JobReport};
