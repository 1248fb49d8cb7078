//! Existing-file reconciliation before scheduling.
//!
//! The operator picks which already-present outputs to overwrite (1-based
//! playlist indices); every other job whose output exists is skipped.

use std::collections::BTreeSet;
use std::path::Path;

use crate::job::JobSpec;

/// Jobs whose output path already exists, as `(1-based index, path, size in bytes)`.
pub fn existing_outputs<'a, F>(jobs: &'a [JobSpec], exists: F) -> Vec<(usize, &'a Path, u64)>
where
    F: Fn(&Path) -> Option<u64>,
{
    jobs.iter()
        .filter_map(|job| {
            exists(&job.output_path).map(|size| (job.index + 1, job.output_path.as_path(), size))
        })
        .collect()
}

/// Drops jobs whose output already exists unless their index is in `overwrite`.
pub fn filter_existing<F>(jobs: Vec<JobSpec>, exists: F, overwrite: &BTreeSet<usize>) -> Vec<JobSpec>
where
    F: Fn(&Path) -> bool,
{
    jobs.into_iter()
        .filter(|job| {
            let keep = overwrite.contains(&(job.index + 1)) || !exists(&job.output_path);
            if !keep {
                tracing::info!(path = %job.output_path.display(), "output exists; skipping");
            }
            keep
        })
        .collect()
}

/// Size of an existing file on disk, `None` when it does not exist.
pub fn file_size_on_disk(path: &Path) -> Option<u64> {
    std::fs::metadata(path).ok().filter(|m| m.is_file()).map(|m| m.len())
}
