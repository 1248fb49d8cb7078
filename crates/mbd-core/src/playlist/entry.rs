//! Parsed playlist items.

/// One subtitle track attached to a content entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubtitleRef {
    pub name: Option<String>,
    pub url: String,
    pub is_default: bool,
}

impl SubtitleRef {
    /// Display title for the track ("Subtitle" when the playlist gave no name).
    pub fn title(&self) -> &str {
        self.name.as_deref().unwrap_or("Subtitle")
    }

    /// Language tag: lowercased first three characters of the name ("unk" when unnamed).
    pub fn language(&self) -> String {
        let name = self.name.as_deref().unwrap_or("Unknown");
        name.chars().take(3).collect::<String>().to_lowercase()
    }
}

/// One content entry of a playlist, in source order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamEntry {
    /// Display name with any trailing `[quality]` tag removed.
    pub name: String,
    pub url: String,
    /// Referer in effect when the entry was parsed.
    pub referer: Option<String>,
    pub subtitles: Vec<SubtitleRef>,
    /// Quality tag without brackets (e.g. `1080p`).
    pub quality: Option<String>,
}
