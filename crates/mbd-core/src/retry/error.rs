//! Per-attempt error and outcome types.

use std::time::Duration;

/// Why one attempt of the media tool did not succeed.
#[derive(Debug, thiserror::Error)]
pub enum AttemptError {
    /// The process could not be started (tool missing, permission denied).
    #[error("spawn failed: {0}")]
    Spawn(#[source] std::io::Error),
    /// The process ran and exited unsuccessfully; `None` when killed by a signal.
    #[error("{}", exit_message(.code))]
    Exit { code: Option<i32> },
    /// Output ended but the process did not exit within the wait window.
    #[error("process did not exit within {}s", .after.as_secs())]
    Timeout { after: Duration },
    /// The process produced no output for the stall window.
    #[error("no output for {}s", .after.as_secs())]
    Stalled { after: Duration },
    /// Reading the process output or waiting on it failed.
    #[error("process io: {0}")]
    Io(#[source] std::io::Error),
}

fn exit_message(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("exited with code {}", code),
        None => "terminated by signal".to_string(),
    }
}

/// Result of a single attempt as seen by the retry state machine.
#[derive(Debug)]
pub enum AttemptOutcome {
    Succeeded,
    Failed(AttemptError),
    /// The operator cancelled the job while this attempt was running.
    Cancelled,
}

impl AttemptOutcome {
    pub fn from_exit_code(code: Option<i32>) -> Self {
        match code {
            Some(0) => AttemptOutcome::Succeeded,
            code => AttemptOutcome::Failed(AttemptError::Exit { code }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_code_zero_is_success() {
        assert!(matches!(AttemptOutcome::from_exit_code(Some(0)), AttemptOutcome::Succeeded));
        assert!(matches!(
            AttemptOutcome::from_exit_code(Some(1)),
            AttemptOutcome::Failed(AttemptError::Exit { code: Some(1) })
        ));
    }

    #[test]
    fn display_messages() {
        assert_eq!(AttemptError::Exit { code: Some(8) }.to_string(), "exited with code 8");
        assert_eq!(AttemptError::Exit { code: None }.to_string(), "terminated by signal");
        assert_eq!(
            AttemptError::Timeout { after: Duration::from_secs(30) }.to_string(),
            "process did not exit within 30s"
        );
        assert_eq!(
            AttemptError::Stalled { after: Duration::from_secs(5) }.to_string(),
            "no output for 5s"
        );
    }
}
