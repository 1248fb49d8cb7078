//! Playlist loading and parsing.
//!
//! Parsing itself never fails; only reading the file can, and then the caller
//! gets an empty entry list together with the error to report.

mod entry;
mod parse;

use std::path::{Path, PathBuf};

pub use entry::{StreamEntry, SubtitleRef};
pub use parse::{parse, split_quality};

/// Reading the playlist failed; whatever was parsed before the failure is kept.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("read playlist {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Result of loading a playlist file: entries plus a non-fatal error, if any.
#[derive(Debug, Default)]
pub struct ParsedPlaylist {
    pub entries: Vec<StreamEntry>,
    pub error: Option<ParseError>,
}

/// Reads and parses a playlist file. Invalid UTF-8 is decoded lossily.
pub fn parse_file(path: &Path) -> ParsedPlaylist {
    match std::fs::read(path) {
        Ok(bytes) => ParsedPlaylist {
            entries: parse(&String::from_utf8_lossy(&bytes)),
            error: None,
        },
        Err(source) => {
            let error = ParseError::Read {
                path: path.to_path_buf(),
                source,
            };
            tracing::warn!("{}", error);
            ParsedPlaylist {
                entries: Vec::new(),
                error: Some(error),
            }
        }
    }
}

/// Strips whitespace and surrounding quotes from an operator-supplied path
/// (terminals quote drag-and-dropped paths).
pub fn clean_path_input(raw: &str) -> PathBuf {
    let trimmed = raw.trim();
    let unquoted = trimmed.trim_matches('"').trim_matches('\'');
    PathBuf::from(unquoted)
}

/// Default output folder for a playlist: its file stem, next to the working directory.
pub fn default_output_dir(playlist: &Path) -> PathBuf {
    playlist
        .file_stem()
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("downloads"))
}
