//! Filename sanitization for common filesystems.

/// Longest base name we emit, leaving room for a quality suffix, a
/// disambiguation counter and the extension under the 255-byte NAME_MAX.
const BASE_MAX: usize = 200;

/// Sanitizes a display name for use as a file name on Linux, macOS and Windows.
///
/// - Replaces `\ / : * ? " < > |` and control characters with `_`
/// - Trims leading/trailing whitespace and trailing dots
/// - Limits length to a safe number of bytes on a char boundary
pub fn sanitize_filename(name: &str) -> String {
    let replaced: String = name
        .chars()
        .map(|c| match c {
            '\\' | '/' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();

    let trimmed = replaced.trim().trim_end_matches('.').trim_end();

    if trimmed.len() > BASE_MAX {
        let mut take = BASE_MAX;
        while take > 0 && !trimmed.is_char_boundary(take) {
            take -= 1;
        }
        trimmed[..take].trim_end().to_string()
    } else {
        trimmed.to_string()
    }
}

/// Removes a trailing file extension (`.mp4`, `.ts`, ...).
///
/// Only suffixes of up to five ASCII alphanumerics containing a letter count,
/// so names like `Episode 1.5` or `Vol. 2` are left alone.
pub fn strip_extension(name: &str) -> &str {
    let Some(dot) = name.rfind('.') else {
        return name;
    };
    let ext = &name[dot + 1..];
    let looks_like_ext = dot > 0
        && (1..=5).contains(&ext.len())
        && ext.chars().all(|c| c.is_ascii_alphanumeric())
        && ext.chars().any(|c| c.is_ascii_alphabetic());
    if looks_like_ext {
        &name[..dot]
    } else {
        name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn replaces_reserved_characters() {
        assert_eq!(sanitize_filename("a/b\\c:d*e?f\"g<h>i|j"), "a_b_c_d_e_f_g_h_i_j");
    }

    #[test]
    fn keeps_spaces_and_unicode() {
        assert_eq!(sanitize_filename("Show - 01 ドラマ"), "Show - 01 ドラマ");
    }

    #[test]
    fn trims_whitespace_and_trailing_dots() {
        assert_eq!(sanitize_filename("  Title...  "), "Title");
    }

    #[test]
    fn control_chars() {
        assert_eq!(sanitize_filename("file\x00name"), "file_name");
    }

    #[test]
    fn long_names_truncated_on_char_boundary() {
        let long = "é".repeat(300);
        let out = sanitize_filename(&long);
        assert!(out.len() <= BASE_MAX);
        assert!(out.chars().all(|c| c == 'é'));
    }

    #[test]
    fn strip_extension_cases() {
        assert_eq!(strip_extension("clip.mp4"), "clip");
        assert_eq!(strip_extension("Episode 1.5"), "Episode 1.5");
        assert_eq!(strip_extension("Vol. 2"), "Vol. 2");
        assert_eq!(strip_extension(".hidden"), ".hidden");
        assert_eq!(strip_extension("plain"), "plain");
    }
}
