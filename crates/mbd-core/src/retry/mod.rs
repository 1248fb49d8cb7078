//! Retry policy for media tool attempts.
//!
//! Every attempt error is retryable; the policy only caps the number of
//! attempts. Retries start immediately, without backoff. Cancellation is an
//! outcome of its own and never reaches the policy.

mod classify;
mod error;
mod policy;

pub use classify::classify;
pub use error::{AttemptError, AttemptOutcome};
pub use policy::{ErrorKind, RetryDecision, RetryPolicy};
