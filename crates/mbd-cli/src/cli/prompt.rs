//! Interactive prompts and tables on the terminal.

use anyhow::Result;
use mbd_core::control::ActiveJob;
use std::io::{BufRead, BufReader, Write};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex};

/// Operator input. A single reader thread owns stdin for the whole process
/// and hands lines to whichever prompt is open, so an abandoned prompt never
/// leaves a blocking read behind.
pub struct Console {
    lines: Mutex<mpsc::Receiver<String>>,
    prompting: AtomicBool,
}

impl Console {
    pub fn stdin() -> Arc<Self> {
        Self::from_reader(BufReader::new(std::io::stdin()))
    }

    pub fn from_reader<R>(reader: R) -> Arc<Self>
    where
        R: BufRead + Send + 'static,
    {
        let (tx, rx) = mpsc::channel(16);
        let spawned = std::thread::Builder::new()
            .name("mbd-stdin".to_string())
            .spawn(move || {
                for line in reader.lines() {
                    let Ok(line) = line else { break };
                    if tx.blocking_send(line).is_err() {
                        break;
                    }
                }
            });
        if let Err(e) = spawned {
            // Sender is gone with the closure: every prompt reads as empty.
            tracing::warn!("stdin reader thread: {}", e);
        }
        Arc::new(Self {
            lines: Mutex::new(rx),
            prompting: AtomicBool::new(false),
        })
    }

    /// True while a question is waiting for its answer.
    pub fn is_prompting(&self) -> bool {
        self.prompting.load(Ordering::SeqCst)
    }

    /// Prints `question` and waits for the next line. Lines typed before the
    /// question appeared are discarded. EOF reads as an empty answer.
    pub async fn ask(&self, question: &str) -> Result<String> {
        let mut lines = self.lines.lock().await;
        while lines.try_recv().is_ok() {}

        let _open = OpenPrompt::new(&self.prompting);
        print!("{}: ", question);
        std::io::stdout().flush()?;
        Ok(lines
            .recv()
            .await
            .map(|line| line.trim().to_string())
            .unwrap_or_default())
    }
}

/// Clears the prompting flag when the question is answered or abandoned.
struct OpenPrompt<'a>(&'a AtomicBool);

impl<'a> OpenPrompt<'a> {
    fn new(flag: &'a AtomicBool) -> Self {
        flag.store(true, Ordering::SeqCst);
        Self(flag)
    }
}

impl Drop for OpenPrompt<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// Table of outputs that already exist: `(1-based index, path, bytes)`.
pub fn print_existing(rows: &[(usize, &Path, u64)]) {
    println!();
    println!("The following files already exist:");
    println!("{:>4}  {:>10}  {}", "No.", "Size (MB)", "File Name");
    for (index, path, bytes) in rows {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        println!(
            "{:>4}  {:>10.2}  {}",
            index,
            *bytes as f64 / 1_048_576.0,
            name
        );
    }
}

/// Numbered table of the downloads that can be cancelled.
pub fn print_running(jobs: &[ActiveJob]) {
    println!();
    println!("Ctrl+C detected. Current downloads:");
    println!("{:>4}  {:>7}  {}", "No.", "Done", "File Name");
    for (pos, job) in jobs.iter().enumerate() {
        let done = job
            .progress
            .percent
            .map(|p| format!("{:.1}%", p))
            .unwrap_or_else(|| "?".to_string());
        println!("{:>4}  {:>7}  {}", pos + 1, done, job.name);
    }
}
