//! `mbd check` – verify that ffmpeg can be started.

use anyhow::Result;
use mbd_core::transcode::probe_tool;
use std::path::Path;

pub async fn run_check(ffmpeg: &Path) -> Result<()> {
    let version = probe_tool(ffmpeg).await?;
    println!("{}: {}", ffmpeg.display(), version);
    Ok(())
}
