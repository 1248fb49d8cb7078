//! `mbd run` – download the entries of one or more playlists.

use anyhow::{Context, Result};
use mbd_core::config::BatchConfig;
use mbd_core::control::{CancellationController, JobControl};
use mbd_core::job::{plan_jobs, JobSpec};
use mbd_core::playlist::{clean_path_input, default_output_dir, parse_file};
use mbd_core::progress::{ProgressSnapshot, ProgressUpdate};
use mbd_core::reconcile::{existing_outputs, file_size_on_disk, filter_existing};
use mbd_core::retry::RetryPolicy;
use mbd_core::scheduler::{run_jobs_parallel, BatchReport};
use mbd_core::selection::parse_ranges;
use mbd_core::transcode::{probe_tool, FfmpegRunner};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::mpsc;

use crate::cli::prompt::{self, Console};

const PROGRESS_INTERVAL_MS: u64 = 500;

/// Options shared by every playlist of one `mbd run`.
#[derive(Debug)]
pub struct RunOptions {
    pub output_dir: Option<PathBuf>,
    pub select: Option<String>,
    pub overwrite: Option<String>,
    pub overwrite_all: bool,
    pub ffmpeg: PathBuf,
    pub cfg: BatchConfig,
}

/// Runs each playlist in turn. A failing playlist is reported and the next one still runs.
pub async fn run_batches(playlists: Vec<String>, opts: &RunOptions) -> Result<()> {
    let version = probe_tool(&opts.ffmpeg)
        .await
        .context("ffmpeg is required; install it or pass --ffmpeg")?;
    tracing::info!(tool = %version, "media tool available");

    let console = Console::stdin();
    let playlists = if playlists.is_empty() {
        vec![console.ask("Path to your M3U file").await?]
    } else {
        playlists
    };

    for raw in &playlists {
        let path = clean_path_input(raw);
        match run_playlist(&path, opts, &console).await {
            Ok(Some(report)) => print_report(&report),
            Ok(None) => {}
            Err(e) => {
                tracing::error!(playlist = %path.display(), "batch failed: {:#}", e);
                eprintln!("mbd error: {}: {:#}", path.display(), e);
            }
        }
    }
    Ok(())
}

async fn run_playlist(
    path: &Path,
    opts: &RunOptions,
    console: &Arc<Console>,
) -> Result<Option<BatchReport>> {
    let parsed = parse_file(path);
    if let Some(e) = parsed.error {
        return Err(e.into());
    }
    if parsed.entries.is_empty() {
        println!("No links found in {}.", path.display());
        return Ok(None);
    }

    let dir = opts
        .output_dir
        .clone()
        .unwrap_or_else(|| default_output_dir(path));
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("create output folder {}", dir.display()))?;

    // Paths come from the full list so selection never renames outputs.
    let mut jobs = plan_jobs(&parsed.entries, &dir);
    if let Some(select) = &opts.select {
        let wanted = parse_ranges(select, parsed.entries.len());
        jobs.retain(|job| wanted.contains(&(job.index + 1)));
    }
    let planned = jobs.len();
    let jobs = reconcile_existing(jobs, parsed.entries.len(), opts, console).await?;
    let skipped = planned - jobs.len();
    if jobs.is_empty() {
        println!("No files to download.");
        return Ok(None);
    }

    let cfg = &opts.cfg;
    let control = Arc::new(JobControl::new());

    let (interrupt_tx, interrupt_rx) = mpsc::channel::<()>(4);
    let signal_handle = tokio::spawn(forward_interrupts(interrupt_tx));
    let controller = CancellationController::new(Arc::clone(&control));
    let prompt_console = Arc::clone(console);
    let cancel_handle = tokio::spawn(async move {
        controller
            .serve(interrupt_rx, |running| {
                let console = Arc::clone(&prompt_console);
                async move {
                    prompt::print_running(&running);
                    let answer = console
                        .ask("Enter the numbers of downloads to cancel (e.g., 1-3,5)")
                        .await
                        .unwrap_or_default();
                    if !answer.is_empty() {
                        println!("Cancelling selected downloads...");
                    }
                    answer
                }
            })
            .await;
    });

    let (progress_tx, progress_rx) = mpsc::channel::<ProgressUpdate>(64);
    let progress_handle = tokio::spawn(print_progress(
        progress_rx,
        Arc::clone(console),
        cfg.retries,
    ));

    println!();
    println!("Starting {} download(s) into {}...", jobs.len(), dir.display());
    println!();
    let runner = Arc::new(FfmpegRunner::new(opts.ffmpeg.clone(), cfg));
    let mut report = run_jobs_parallel(
        jobs,
        runner,
        Arc::clone(&control),
        RetryPolicy::new(cfg.retries),
        cfg.parallel_downloads,
        Some(progress_tx),
    )
    .await;
    report.skipped = skipped;

    let prompt_open = console.is_prompting();
    signal_handle.abort();
    cancel_handle.abort();
    let _ = cancel_handle.await;
    if prompt_open {
        println!();
        println!("No downloads left to cancel.");
    }
    let _ = progress_handle.await;
    Ok(Some(report))
}

/// Asks which existing outputs to overwrite (unless decided by flags) and
/// drops the rest.
async fn reconcile_existing(
    jobs: Vec<JobSpec>,
    entry_count: usize,
    opts: &RunOptions,
    console: &Console,
) -> Result<Vec<JobSpec>> {
    let overwrite = {
        let existing = existing_outputs(&jobs, file_size_on_disk);
        if existing.is_empty() {
            None
        } else if opts.overwrite_all {
            Some(existing.iter().map(|(index, _, _)| *index).collect())
        } else if let Some(ranges) = &opts.overwrite {
            Some(parse_ranges(ranges, entry_count))
        } else {
            prompt::print_existing(&existing);
            let answer = console
                .ask("Select the files to overwrite (e.g., 1-3,5)")
                .await?;
            Some(parse_ranges(&answer, entry_count))
        }
    };
    match overwrite {
        Some(overwrite) => Ok(filter_existing(jobs, |p| p.exists(), &overwrite)),
        None => Ok(jobs),
    }
}

async fn forward_interrupts(tx: mpsc::Sender<()>) {
    while tokio::signal::ctrl_c().await.is_ok() {
        if tx.send(()).await.is_err() {
            break;
        }
    }
}

async fn print_progress(
    mut rx: mpsc::Receiver<ProgressUpdate>,
    console: Arc<Console>,
    retries: u32,
) {
    let mut last_print = Instant::now();
    let mut attempts: HashMap<usize, u32> = HashMap::new();
    let mut held: Vec<String> = Vec::new();
    while let Some(update) = rx.recv().await {
        let seen = attempts.entry(update.index).or_insert(update.attempt);
        if update.attempt > *seen {
            *seen = update.attempt;
            held.push(format!("{}: retry {}/{}", update.name, update.attempt - 1, retries));
        }
        // Keep the terminal quiet for the operator's answer.
        if console.is_prompting() {
            continue;
        }
        for line in held.drain(..) {
            println!("{}", line);
        }
        // Attempt start markers carry no progress yet.
        if update.snapshot == ProgressSnapshot::default() {
            continue;
        }
        let now = Instant::now();
        let finished = update.snapshot.percent.is_some_and(|p| p >= 100.0);
        if now.duration_since(last_print).as_millis() as u64 >= PROGRESS_INTERVAL_MS || finished {
            println!("  {}", format_progress(&update));
            last_print = now;
        }
    }
    for line in held {
        println!("{}", line);
    }
}

fn print_report(report: &BatchReport) {
    println!();
    for job in &report.jobs {
        println!("{}", job.summary());
    }
    println!();
    println!(
        "All downloads completed! {} succeeded, {} failed, {} cancelled, {} skipped",
        report.succeeded(),
        report.failed(),
        report.cancelled(),
        report.skipped
    );
}

fn format_progress(update: &ProgressUpdate) -> String {
    let s = &update.snapshot;
    let percent = s
        .percent
        .map(|p| format!("{:5.1}%", p))
        .unwrap_or_else(|| "    ?%".to_string());
    let total = s
        .total_duration_secs
        .map(format_clock)
        .unwrap_or_else(|| "--:--:--".to_string());
    let eta = s
        .eta_secs
        .map(|e| format!("{:.0}s", e))
        .unwrap_or_else(|| "?".to_string());
    format!(
        "{} {}  {} / {}  {:.2}x  {:.1} MiB  ETA {}",
        percent,
        update.name,
        format_clock(s.current_time_secs),
        total,
        s.speed_factor,
        s.output_mib(),
        eta
    )
}

fn format_clock(secs: f64) -> String {
    let t = secs.max(0.0) as u64;
    format!("{:02}:{:02}:{:02}", t / 3600, t % 3600 / 60, t % 60)
}
