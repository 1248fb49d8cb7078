//! Media tool availability check.

use anyhow::{Context, Result};
use std::path::Path;
use std::process::Stdio;
use std::time::Duration;

const PROBE_TIMEOUT: Duration = Duration::from_secs(10);

/// Runs `<program> -version` and returns the first line of its output.
pub async fn probe_tool(program: &Path) -> Result<String> {
    let output = tokio::time::timeout(
        PROBE_TIMEOUT,
        tokio::process::Command::new(program)
            .arg("-version")
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .output(),
    )
    .await
    .with_context(|| format!("{} -version timed out", program.display()))?
    .with_context(|| format!("{} not found or not executable", program.display()))?;

    if !output.status.success() {
        anyhow::bail!("{} -version exited with {}", program.display(), output.status);
    }
    let text = String::from_utf8_lossy(&output.stdout);
    Ok(text.lines().next().unwrap_or("").trim().to_string())
}
