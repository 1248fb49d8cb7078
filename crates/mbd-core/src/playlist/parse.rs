//! Line grammar for extended M3U playlists.
//!
//! Recognised directives:
//! - `#EXTVLCOPT:http-referrer=<url>` sets the referer for every later entry
//! - `#EXT-X-MEDIA:TYPE=SUBTITLES,...NAME="..",URI=".."` buffers a subtitle
//!   track for the next entry only
//! - `#EXTINF:<attrs>,<display name>` followed by the URL line
//!
//! Anything else is skipped.

use super::entry::{StreamEntry, SubtitleRef};

const REFERER_PREFIX: &str = "#EXTVLCOPT:http-referrer=";
const SUBTITLE_PREFIX: &str = "#EXT-X-MEDIA:TYPE=SUBTITLES";
const ENTRY_PREFIX: &str = "#EXTINF";

/// Parses playlist text into entries in source order. Never fails: lines that
/// do not fit the grammar are skipped and an entry without a URL line is dropped.
pub fn parse(text: &str) -> Vec<StreamEntry> {
    let lines: Vec<&str> = text
        .trim_start_matches('\u{feff}')
        .lines()
        .map(str::trim)
        .collect();

    let mut entries = Vec::new();
    let mut referer: Option<String> = None;
    let mut pending_subtitles: Vec<SubtitleRef> = Vec::new();

    for (i, line) in lines.iter().enumerate() {
        if let Some(value) = line.strip_prefix(REFERER_PREFIX) {
            let value = value.trim();
            referer = (!value.is_empty()).then(|| value.to_string());
        } else if line.starts_with(SUBTITLE_PREFIX) {
            if let Some(sub) = parse_subtitle(line) {
                pending_subtitles.push(sub);
            }
        } else if line.starts_with(ENTRY_PREFIX) {
            let Some(url) = url_after(&lines, i) else {
                tracing::debug!(line = i + 1, "playlist entry without URL line dropped");
                continue;
            };
            let raw_name = display_name(line)
                .map(str::to_string)
                .unwrap_or_else(|| format!("Episode {}", entries.len() + 1));
            let (name, quality) = split_quality(&raw_name);
            entries.push(StreamEntry {
                name,
                url: url.to_string(),
                referer: referer.clone(),
                subtitles: std::mem::take(&mut pending_subtitles),
                quality,
            });
        }
    }

    entries
}

/// Text after the first comma of an `#EXTINF` line, if non-empty.
fn display_name(line: &str) -> Option<&str> {
    let (_, name) = line.split_once(',')?;
    let name = name.trim();
    (!name.is_empty()).then_some(name)
}

/// The first non-blank line after `idx`, unless it is itself a directive or comment.
fn url_after<'a>(lines: &[&'a str], idx: usize) -> Option<&'a str> {
    let next = lines.iter().skip(idx + 1).find(|l| !l.is_empty())?;
    (!next.starts_with('#')).then_some(*next)
}

fn parse_subtitle(line: &str) -> Option<SubtitleRef> {
    let url = quoted_attr(line, "URI")?;
    if url.is_empty() {
        return None;
    }
    Some(SubtitleRef {
        name: quoted_attr(line, "NAME").map(str::to_string),
        url: url.to_string(),
        is_default: line.contains("DEFAULT=YES"),
    })
}

/// Value of `KEY="value"` within an attribute list.
fn quoted_attr<'a>(line: &'a str, key: &str) -> Option<&'a str> {
    let marker = format!("{}=\"", key);
    let mut search = line;
    loop {
        let at = search.find(&marker)?;
        // Reject matches inside a longer key (e.g. `GROUP-NAME=` for `NAME=`).
        let preceded_by_key_char = search[..at]
            .chars()
            .next_back()
            .is_some_and(|c| c.is_ascii_alphanumeric() || c == '-');
        let rest = &search[at + marker.len()..];
        if !preceded_by_key_char {
            let end = rest.find('"')?;
            return Some(&rest[..end]);
        }
        search = rest;
    }
}

/// Splits a trailing `[tag]` off a display name.
///
/// `"Ep1 [1080p]"` becomes `("Ep1", Some("1080p"))`; names without a
/// trailing bracketed suffix are returned unchanged.
pub fn split_quality(raw: &str) -> (String, Option<String>) {
    let trimmed = raw.trim();
    if let Some(without_close) = trimmed.strip_suffix(']') {
        if let Some(open) = without_close.rfind('[') {
            let tag = without_close[open + 1..].trim();
            let name = without_close[..open].trim();
            if !tag.is_empty() && !name.is_empty() {
                return (name.to_string(), Some(tag.to_string()));
            }
        }
    }
    (trimmed.to_string(), None)
}
