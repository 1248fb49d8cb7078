//! Tests for list, settings and check subcommands.

use super::parse;
use crate::cli::{CliCommand, SettingsArgs};
use mbd_core::config::BatchConfig;
use std::path::Path;

#[test]
fn cli_parse_list() {
    match parse(&["mbd", "list", "show.m3u"]) {
        CliCommand::List {
            playlist,
            output_dir,
        } => {
            assert_eq!(playlist, "show.m3u");
            assert!(output_dir.is_none());
        }
        _ => panic!("expected List"),
    }
}

#[test]
fn cli_parse_settings_without_changes() {
    match parse(&["mbd", "settings"]) {
        CliCommand::Settings { settings } => assert!(settings.is_empty()),
        _ => panic!("expected Settings"),
    }
}

#[test]
fn cli_parse_settings_clear_speed_limit() {
    match parse(&["mbd", "settings", "--speed-limit", "none"]) {
        CliCommand::Settings { settings } => {
            assert!(!settings.is_empty());
            let cfg = settings.apply(BatchConfig {
                speed_limit: Some("2M".to_string()),
                ..BatchConfig::default()
            });
            assert!(cfg.speed_limit.is_none());
        }
        _ => panic!("expected Settings"),
    }
}

#[test]
fn cli_parse_check_default_tool() {
    match parse(&["mbd", "check"]) {
        CliCommand::Check { ffmpeg } => assert_eq!(ffmpeg, Path::new("ffmpeg")),
        _ => panic!("expected Check"),
    }
}

#[test]
fn settings_apply_overrides_and_clamps() {
    let args = SettingsArgs {
        jobs: Some(0),
        retries: Some(7),
        timeout: None,
        speed_limit: Some("500k".to_string()),
    };
    let cfg = args.apply(BatchConfig::default());
    assert_eq!(cfg.parallel_downloads, 1);
    assert_eq!(cfg.retries, 7);
    assert_eq!(cfg.timeout, 30);
    assert_eq!(cfg.speed_limit.as_deref(), Some("500k"));
}
