//! Argument list for one media tool attempt.

use std::ffi::{OsStr, OsString};
use std::path::Path;

use crate::playlist::StreamEntry;

/// Builds the arguments for remuxing `entry` into `output`.
///
/// Progress goes to stdout (`-progress pipe:1`), streams are copied without
/// re-encoding, and every subtitle is an extra input mapped into the output
/// with its language, title and default flag.
pub fn build_args(entry: &StreamEntry, output: &Path, speed_limit: Option<&str>) -> Vec<OsString> {
    let mut args: Vec<OsString> = Vec::new();
    push_arg(&mut args, "-y");
    push_arg(&mut args, "-progress");
    push_arg(&mut args, "pipe:1");

    if let Some(referer) = entry.referer.as_deref() {
        push_arg(&mut args, "-headers");
        push_arg(&mut args, &format!("Referer: {}\r\n", referer));
    }

    push_arg(&mut args, "-i");
    push_arg(&mut args, &entry.url);
    for sub in &entry.subtitles {
        push_arg(&mut args, "-i");
        push_arg(&mut args, &sub.url);
    }

    if !entry.subtitles.is_empty() {
        // Without explicit maps only one subtitle stream would be kept. One
        // video and one audio stream: a master playlist exposes every variant.
        for map in ["0:v:0?", "0:a:0?"] {
            push_arg(&mut args, "-map");
            push_arg(&mut args, map);
        }
        for input in 1..=entry.subtitles.len() {
            push_arg(&mut args, "-map");
            push_arg(&mut args, &format!("{}:s", input));
        }
    }

    push_arg(&mut args, "-c");
    push_arg(&mut args, "copy");

    for (i, sub) in entry.subtitles.iter().enumerate() {
        push_arg(&mut args, &format!("-metadata:s:s:{}", i));
        push_arg(&mut args, &format!("language={}", sub.language()));
        push_arg(&mut args, &format!("-metadata:s:s:{}", i));
        push_arg(&mut args, &format!("title={}", sub.title()));
        if sub.is_default {
            push_arg(&mut args, &format!("-disposition:s:{}", i));
            push_arg(&mut args, "default");
        }
    }

    push_arg(&mut args, "-metadata");
    push_arg(&mut args, &format!("title={}", entry.name));

    if let Some(limit) = speed_limit {
        push_arg(&mut args, "-maxrate");
        push_arg(&mut args, limit);
    }

    push_arg(&mut args, output);
    args
}

fn push_arg(args: &mut Vec<OsString>, arg: impl AsRef<OsStr>) {
    args.push(arg.as_ref().to_os_string());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::playlist::SubtitleRef;
    use std::path::PathBuf;

    fn strings(args: &[OsString]) -> Vec<String> {
        args.iter().map(|a| a.to_string_lossy().into_owned()).collect()
    }

    fn entry() -> StreamEntry {
        StreamEntry {
            name: "Show - 01".to_string(),
            url: "https://cdn.example/1.m3u8".to_string(),
            referer: None,
            subtitles: Vec::new(),
            quality: None,
        }
    }

    #[test]
    fn minimal_invocation() {
        let args = strings(&build_args(&entry(), &PathBuf::from("out/Show - 01.mkv"), None));
        assert_eq!(
            args,
            vec![
                "-y",
                "-progress",
                "pipe:1",
                "-i",
                "https://cdn.example/1.m3u8",
                "-c",
                "copy",
                "-metadata",
                "title=Show - 01",
                "out/Show - 01.mkv",
            ]
        );
    }

    #[test]
    fn referer_subtitles_and_rate_cap() {
        let mut e = entry();
        e.referer = Some("https://site.example/".to_string());
        e.subtitles = vec![
            SubtitleRef {
                name: Some("English".to_string()),
                url: "https://cdn.example/en.vtt".to_string(),
                is_default: true,
            },
            SubtitleRef {
                name: Some("Spanish".to_string()),
                url: "https://cdn.example/es.vtt".to_string(),
                is_default: false,
            },
        ];
        let args = strings(&build_args(&e, &PathBuf::from("o.mkv"), Some("2M")));
        let joined = args.join(" ");

        assert_eq!(args[3], "-headers");
        assert_eq!(args[4], "Referer: https://site.example/\r\n");
        assert!(joined.contains("-i https://cdn.example/1.m3u8 -i https://cdn.example/en.vtt -i https://cdn.example/es.vtt"));
        assert!(joined.contains("-map 0:v:0? -map 0:a:0? -map 1:s -map 2:s -c copy"));
        assert!(joined.contains("-metadata:s:s:0 language=eng -metadata:s:s:0 title=English -disposition:s:0 default"));
        assert!(joined.contains("-metadata:s:s:1 language=spa -metadata:s:s:1 title=Spanish -metadata title="));
        assert!(!joined.contains("-disposition:s:1"));
        assert_eq!(&args[args.len() - 3..], ["-maxrate", "2M", "o.mkv"]);
    }

    #[test]
    fn subtitle_maps_select_a_single_video_and_audio_stream() {
        let mut e = entry();
        e.subtitles = vec![SubtitleRef {
            name: None,
            url: "https://cdn.example/sub.vtt".to_string(),
            is_default: false,
        }];
        let args = strings(&build_args(&e, &PathBuf::from("o.mkv"), None));
        let maps: Vec<&str> = args
            .windows(2)
            .filter(|w| w[0] == "-map")
            .map(|w| w[1].as_str())
            .collect();
        assert_eq!(maps, vec!["0:v:0?", "0:a:0?", "1:s"]);
    }
}
