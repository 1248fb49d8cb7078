//! Classify attempt errors into retry policy error kinds.

use super::error::AttemptError;
use super::policy::ErrorKind;

/// Classify an attempt error for retry decisions and logging.
pub fn classify(e: &AttemptError) -> ErrorKind {
    match e {
        AttemptError::Spawn(_) => ErrorKind::Spawn,
        AttemptError::Exit { .. } => ErrorKind::Exit,
        AttemptError::Timeout { .. } | AttemptError::Stalled { .. } => ErrorKind::Timeout,
        AttemptError::Io(_) => ErrorKind::Io,
    }
}
