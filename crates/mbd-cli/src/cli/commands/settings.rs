//! `mbd settings` – show or persist the batch settings.

use anyhow::Result;
use mbd_core::config::{self, BatchConfig};

use crate::cli::SettingsArgs;

pub fn run_settings(cfg: BatchConfig, changes: &SettingsArgs) -> Result<()> {
    let cfg = if changes.is_empty() {
        cfg
    } else {
        let updated = changes.apply(cfg);
        config::save(&updated)?;
        println!("Settings saved to {}", config::config_path()?.display());
        updated
    };

    println!("{:<20} {}", "parallel downloads", cfg.parallel_downloads);
    println!("{:<20} {}", "retries", cfg.retries);
    println!("{:<20} {}s", "timeout", cfg.timeout);
    println!(
        "{:<20} {}",
        "speed limit",
        cfg.speed_limit.as_deref().unwrap_or("none")
    );
    Ok(())
}
