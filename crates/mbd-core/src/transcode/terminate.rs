//! Stopping a child process: polite terminate request, then a forced kill
//! once the grace period runs out.

use std::io;
use std::process::ExitStatus;
use std::time::Duration;

use tokio::process::Child;

/// Grace period between the terminate request and the forced kill.
pub const TERMINATE_GRACE: Duration = Duration::from_secs(5);

/// Sends one terminate request (SIGTERM on unix) to the child.
pub(crate) fn request_terminate(child: &mut Child) -> io::Result<()> {
    #[cfg(unix)]
    {
        let Some(pid) = child.id() else {
            // Already reaped.
            return Ok(());
        };
        let r = unsafe { libc::kill(pid as libc::pid_t, libc::SIGTERM) };
        if r != 0 {
            return Err(io::Error::last_os_error());
        }
        Ok(())
    }
    #[cfg(not(unix))]
    {
        child.start_kill()
    }
}

/// Asks the child to exit and waits up to `grace`; kills and reaps it if it
/// is still running. Returns the exit status when it exited on its own.
pub(crate) async fn terminate(child: &mut Child, grace: Duration) -> io::Result<Option<ExitStatus>> {
    if let Err(e) = request_terminate(child) {
        tracing::debug!("terminate request failed: {}", e);
    }
    match tokio::time::timeout(grace, child.wait()).await {
        Ok(status) => status.map(Some),
        Err(_) => {
            tracing::warn!(
                pid = child.id(),
                "process ignored terminate request for {}s; killing",
                grace.as_secs()
            );
            child.kill().await?;
            Ok(None)
        }
    }
}
