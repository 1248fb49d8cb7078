//! Job control for cancellation: shared registry of active jobs and the
//! operator-facing cancellation controller.
//!
//! When the scheduler runs with a `JobControl`, each running job is registered
//! with a cancellation token. The controller (driven by Ctrl+C in the CLI)
//! fires tokens for the jobs the operator selects; workers observe them and
//! terminate their process.

mod controller;
mod registry;

pub use controller::CancellationController;
pub use registry::{ActiveJob, JobControl};
