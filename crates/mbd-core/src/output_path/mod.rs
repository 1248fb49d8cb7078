//! Output path resolution.
//!
//! Every entry is written to `<dir>/<sanitized name>.mkv`. When several
//! entries share a base name, all but the first get their quality tag
//! appended so the files do not overwrite each other.

mod sanitize;

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use crate::playlist::StreamEntry;

pub use sanitize::{sanitize_filename, strip_extension};

/// Container every job is remuxed into, whatever the source format.
pub const CONTAINER_EXTENSION: &str = "mkv";

fn base_name(entry: &StreamEntry) -> String {
    sanitize_filename(strip_extension(&entry.name))
}

/// Resolves the output path of `entries[index]`; `None` when `index` is out
/// of range.
///
/// Duplicate detection runs over the full `entries` list so the result does
/// not depend on which entries are later filtered out.
pub fn resolve(dir: &Path, entries: &[StreamEntry], index: usize) -> Option<PathBuf> {
    let entry = entries.get(index)?;
    let base = base_name(entry);
    let mut file_stem = if base.is_empty() {
        format!("Episode {}", index + 1)
    } else {
        base.clone()
    };

    if let Some(quality) = entry.quality.as_deref() {
        let first_with_base = entries.iter().position(|e| base_name(e) == base);
        let shared = entries.iter().filter(|e| base_name(e) == base).count() > 1;
        if shared && first_with_base != Some(index) {
            let tag = sanitize_filename(quality);
            if !tag.is_empty() {
                file_stem = format!("{} {}", file_stem, tag);
            }
        }
    }

    Some(dir.join(format!("{}.{}", file_stem, CONTAINER_EXTENSION)))
}

/// Resolves every entry's output path, guaranteeing pairwise-distinct results.
///
/// Names still equal after quality tagging (same tag, or no tag) get a
/// ` (2)`, ` (3)`, ... counter. Comparison ignores case so the result is also
/// safe on case-insensitive filesystems.
pub fn resolve_all(dir: &Path, entries: &[StreamEntry]) -> Vec<PathBuf> {
    let mut seen: HashSet<String> = HashSet::with_capacity(entries.len());
    let mut out = Vec::with_capacity(entries.len());

    for index in 0..entries.len() {
        let Some(candidate) = resolve(dir, entries, index) else {
            continue;
        };
        let mut path = candidate.clone();
        let mut n = 2u32;
        while !seen.insert(path.to_string_lossy().to_lowercase()) {
            let stem = candidate
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_default();
            path = dir.join(format!("{} ({}).{}", stem, n, CONTAINER_EXTENSION));
            n += 1;
        }
        if path != candidate {
            tracing::debug!(index, path = %path.display(), "output name collision resolved with counter");
        }
        out.push(path);
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(name: &str, quality: Option<&str>) -> StreamEntry {
        StreamEntry {
            name: name.to_string(),
            url: format!("https://cdn.example/{}", name),
            referer: None,
            subtitles: Vec::new(),
            quality: quality.map(str::to_string),
        }
    }

    #[test]
    fn duplicate_names_get_quality_suffix_after_first() {
        let entries = vec![entry("Ep1", Some("720p")), entry("Ep1", Some("1080p"))];
        let dir = Path::new("out");
        assert_eq!(resolve(dir, &entries, 0), Some(PathBuf::from("out/Ep1.mkv")));
        assert_eq!(resolve(dir, &entries, 1), Some(PathBuf::from("out/Ep1 1080p.mkv")));
        assert_eq!(resolve(dir, &entries, 2), None);
    }

    #[test]
    fn index_past_the_list_has_no_path() {
        assert_eq!(resolve(Path::new("d"), &[], 0), None);
        let entries = vec![entry("Ep1", None)];
        assert_eq!(resolve(Path::new("d"), &entries, 1), None);
        assert_eq!(resolve(Path::new("d"), &entries, usize::MAX), None);
    }

    #[test]
    fn unique_names_never_get_suffix() {
        let entries = vec![entry("Ep1", Some("720p")), entry("Ep2", Some("1080p"))];
        let paths = resolve_all(Path::new("d"), &entries);
        assert_eq!(paths, vec![PathBuf::from("d/Ep1.mkv"), PathBuf::from("d/Ep2.mkv")]);
    }

    #[test]
    fn extension_replaced_with_container() {
        let entries = vec![entry("clip.mp4", None)];
        assert_eq!(resolve(Path::new("d"), &entries, 0), Some(PathBuf::from("d/clip.mkv")));
    }

    #[test]
    fn reserved_characters_sanitized() {
        let entries = vec![entry("What? Who: Me", None)];
        assert_eq!(
            resolve(Path::new("d"), &entries, 0),
            Some(PathBuf::from("d/What_ Who_ Me.mkv"))
        );
    }

    #[test]
    fn resolve_all_is_pairwise_distinct_without_tags() {
        let entries = vec![
            entry("Ep1", None),
            entry("Ep1", None),
            entry("ep1", Some("720p")),
            entry("Ep1", Some("1080p")),
            entry("Ep1", Some("1080p")),
        ];
        let paths = resolve_all(Path::new("d"), &entries);
        let unique: HashSet<_> = paths.iter().map(|p| p.to_string_lossy().to_lowercase()).collect();
        assert_eq!(unique.len(), entries.len());
        assert_eq!(paths[0], PathBuf::from("d/Ep1.mkv"));
        assert_eq!(paths[1], PathBuf::from("d/Ep1 (2).mkv"));
        assert_eq!(paths[3], PathBuf::from("d/Ep1 1080p.mkv"));
        assert_eq!(paths[4], PathBuf::from("d/Ep1 1080p (2).mkv"));
    }

    #[test]
    fn stable_against_filtering() {
        let entries = vec![entry("Ep1", Some("720p")), entry("Ep1", Some("1080p"))];
        let all = resolve_all(Path::new("d"), &entries);
        // Path of the second entry does not change if the first is later skipped.
        assert_eq!(all[1], PathBuf::from("d/Ep1 1080p.mkv"));
    }
}
