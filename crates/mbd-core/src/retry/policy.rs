/// High-level classification of an attempt error for retry purposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The media tool could not be started.
    Spawn,
    /// Non-zero exit status.
    Exit,
    /// Exit wait or output stall window elapsed.
    Timeout,
    /// Reading output or reaping the process failed.
    Io,
}

/// Decision returned by the retry policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    /// Give up; the job is failed.
    NoRetry,
    /// Start the next attempt immediately.
    RetryNow,
}

/// Immediate-retry policy capped by a maximum attempt count.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Maximum number of attempts (including the first).
    pub max_attempts: u32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self { max_attempts: 3 }
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
        }
    }

    /// Decide what follows a failed attempt.
    ///
    /// `attempt` is 1-based (1 = first attempt). Every error kind is
    /// retryable; the only limit is the attempt count.
    pub fn decide(&self, attempt: u32, kind: ErrorKind) -> RetryDecision {
        if attempt >= self.max_attempts {
            return RetryDecision::NoRetry;
        }
        match kind {
            ErrorKind::Spawn | ErrorKind::Exit | ErrorKind::Timeout | ErrorKind::Io => {
                RetryDecision::RetryNow
            }
        }
    }
}
