//! CLI for the MBD playlist batch downloader.

mod commands;
mod prompt;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use mbd_core::config::{self, BatchConfig};
use std::path::PathBuf;

use commands::{run_batches, run_check, run_list, run_settings, RunOptions};

/// Top-level CLI for the MBD playlist batch downloader.
#[derive(Debug, Parser)]
#[command(name = "mbd")]
#[command(about = "MBD: download every stream of an M3U playlist with ffmpeg", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: CliCommand,
}

/// Per-run overrides of the saved settings. Also used by `settings` to persist them.
#[derive(Debug, Default, Args)]
pub struct SettingsArgs {
    /// Number of downloads running at once.
    #[arg(long, value_name = "N")]
    pub jobs: Option<usize>,
    /// Attempts per download, including the first.
    #[arg(long, value_name = "N")]
    pub retries: Option<u32>,
    /// Seconds without output (or waiting for exit) before an attempt fails.
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,
    /// Output bitrate cap passed to ffmpeg as -maxrate (e.g. 500k, 2M); "none" clears it.
    #[arg(long, value_name = "RATE")]
    pub speed_limit: Option<String>,
}

impl SettingsArgs {
    pub fn is_empty(&self) -> bool {
        self.jobs.is_none()
            && self.retries.is_none()
            && self.timeout.is_none()
            && self.speed_limit.is_none()
    }

    /// Returns `cfg` with every given value applied.
    pub fn apply(&self, mut cfg: BatchConfig) -> BatchConfig {
        if let Some(jobs) = self.jobs {
            cfg.parallel_downloads = jobs;
        }
        if let Some(retries) = self.retries {
            cfg.retries = retries;
        }
        if let Some(timeout) = self.timeout {
            cfg.timeout = timeout;
        }
        if let Some(limit) = &self.speed_limit {
            cfg.speed_limit = Some(limit.clone());
        }
        cfg.validated()
    }
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Download every entry of one or more playlists.
    Run {
        /// Playlist files (.m3u). Asked for interactively when omitted.
        playlists: Vec<String>,

        /// Folder for the downloaded files (default: the playlist's name).
        #[arg(long, short = 'o', value_name = "DIR")]
        output_dir: Option<PathBuf>,

        /// Only download these entries (1-based ranges, e.g. 1-3,5).
        #[arg(long, value_name = "RANGES")]
        select: Option<String>,

        /// Overwrite these existing outputs without asking (1-based ranges).
        #[arg(long, value_name = "RANGES", conflicts_with = "overwrite_all")]
        overwrite: Option<String>,

        /// Overwrite every existing output without asking.
        #[arg(long)]
        overwrite_all: bool,

        /// Path or name of the ffmpeg binary.
        #[arg(long, default_value = "ffmpeg", value_name = "PATH")]
        ffmpeg: PathBuf,

        #[command(flatten)]
        settings: SettingsArgs,
    },

    /// Show the entries of a playlist and where they would be saved.
    List {
        /// Playlist file (.m3u).
        playlist: String,

        /// Folder the output names are resolved against.
        #[arg(long, short = 'o', value_name = "DIR")]
        output_dir: Option<PathBuf>,
    },

    /// Show or change the saved settings.
    Settings {
        #[command(flatten)]
        settings: SettingsArgs,
    },

    /// Check that ffmpeg can be started.
    Check {
        /// Path or name of the ffmpeg binary.
        #[arg(long, default_value = "ffmpeg", value_name = "PATH")]
        ffmpeg: PathBuf,
    },
}

impl CliCommand {
    pub async fn run_from_args() -> Result<()> {
        let cli = Cli::parse();
        let cfg = config::load_or_init()?;
        tracing::debug!("loaded config: {:?}", cfg);

        match cli.command {
            CliCommand::Run {
                playlists,
                output_dir,
                select,
                overwrite,
                overwrite_all,
                ffmpeg,
                settings,
            } => {
                let opts = RunOptions {
                    output_dir,
                    select,
                    overwrite,
                    overwrite_all,
                    ffmpeg,
                    cfg: settings.apply(cfg),
                };
                run_batches(playlists, &opts).await?;
            }
            CliCommand::List {
                playlist,
                output_dir,
            } => run_list(&playlist, output_dir)?,
            CliCommand::Settings { settings } => run_settings(cfg, &settings)?,
            CliCommand::Check { ffmpeg } => run_check(&ffmpeg).await?,
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests;
