//! `mbd list` – show a playlist's entries and their output files without downloading.

use anyhow::Result;
use mbd_core::job::plan_jobs;
use mbd_core::playlist::{clean_path_input, default_output_dir, parse_file};
use std::path::PathBuf;

pub fn run_list(raw: &str, output_dir: Option<PathBuf>) -> Result<()> {
    let path = clean_path_input(raw);
    let parsed = parse_file(&path);
    if let Some(e) = parsed.error {
        return Err(e.into());
    }
    if parsed.entries.is_empty() {
        println!("No links found in {}.", path.display());
        return Ok(());
    }

    let dir = output_dir.unwrap_or_else(|| default_output_dir(&path));
    println!(
        "{:>4}  {:<8} {:<4} {:>4}  {}",
        "No.", "QUALITY", "REF", "SUBS", "OUTPUT"
    );
    for job in plan_jobs(&parsed.entries, &dir) {
        let entry = &job.entry;
        let file = job
            .output_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        println!(
            "{:>4}  {:<8} {:<4} {:>4}  {}",
            job.index + 1,
            entry.quality.as_deref().unwrap_or("-"),
            if entry.referer.is_some() { "yes" } else { "no" },
            entry.subtitles.len(),
            file
        );
    }
    println!("{} entries, saving to {}", parsed.entries.len(), dir.display());
    Ok(())
}
