use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Global configuration loaded from `~/.config/mbd/config.toml`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchConfig {
    /// Maximum number of jobs running at once.
    pub parallel_downloads: usize,
    /// Maximum number of attempts per job (including the first).
    pub retries: u32,
    /// Optional output bitrate cap handed to the media tool (e.g. "500k", "2M").
    pub speed_limit: Option<String>,
    /// Seconds to wait for process exit, and for the next output line.
    pub timeout: u64,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            parallel_downloads: 4,
            retries: 3,
            speed_limit: None,
            timeout: 30,
        }
    }
}

impl BatchConfig {
    /// Returns a copy with every field inside its usable range.
    pub fn validated(mut self) -> Self {
        self.parallel_downloads = self.parallel_downloads.max(1);
        self.retries = self.retries.max(1);
        self.timeout = self.timeout.max(1);
        self.speed_limit = self
            .speed_limit
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty() && !s.eq_ignore_ascii_case("none"));
        self
    }

    pub fn timeout_duration(&self) -> Duration {
        Duration::from_secs(self.timeout)
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("mbd")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<BatchConfig> {
    let path = config_path()?;
    load_or_init_at(&path)
}

/// Same as [`load_or_init`] for an explicit path.
pub fn load_or_init_at(path: &Path) -> Result<BatchConfig> {
    if !path.exists() {
        let default_cfg = BatchConfig::default();
        save_at(path, &default_cfg)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    let data = fs::read_to_string(path)?;
    let cfg: BatchConfig = toml::from_str(&data)?;
    Ok(cfg.validated())
}

/// Persist configuration to the default path.
pub fn save(cfg: &BatchConfig) -> Result<()> {
    let path = config_path()?;
    save_at(&path, cfg)
}

pub fn save_at(path: &Path, cfg: &BatchConfig) -> Result<()> {
    let toml = toml::to_string_pretty(cfg)?;
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, toml)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_values() {
        let cfg = BatchConfig::default();
        assert_eq!(cfg.parallel_downloads, 4);
        assert_eq!(cfg.retries, 3);
        assert!(cfg.speed_limit.is_none());
        assert_eq!(cfg.timeout, 30);
    }

    #[test]
    fn config_toml_custom_values() {
        let toml = r#"
            parallel_downloads = 2
            retries = 5
            speed_limit = "2M"
            timeout = 10
        "#;
        let cfg: BatchConfig = toml::from_str(toml).unwrap();
        assert_eq!(cfg.parallel_downloads, 2);
        assert_eq!(cfg.retries, 5);
        assert_eq!(cfg.speed_limit.as_deref(), Some("2M"));
        assert_eq!(cfg.timeout_duration(), Duration::from_secs(10));
    }

    #[test]
    fn missing_keys_fall_back_to_defaults() {
        let cfg: BatchConfig = toml::from_str("retries = 7").unwrap();
        assert_eq!(cfg.retries, 7);
        assert_eq!(cfg.parallel_downloads, 4);
        assert_eq!(cfg.timeout, 30);
    }

    #[test]
    fn validated_clamps_and_drops_empty_limit() {
        let cfg = BatchConfig {
            parallel_downloads: 0,
            retries: 0,
            speed_limit: Some("  ".to_string()),
            timeout: 0,
        }
        .validated();
        assert_eq!(cfg.parallel_downloads, 1);
        assert_eq!(cfg.retries, 1);
        assert_eq!(cfg.timeout, 1);
        assert!(cfg.speed_limit.is_none());

        let cfg = BatchConfig {
            speed_limit: Some("none".to_string()),
            ..BatchConfig::default()
        }
        .validated();
        assert!(cfg.speed_limit.is_none());
    }

    #[test]
    fn load_or_init_creates_then_reads_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let first = load_or_init_at(&path).unwrap();
        assert_eq!(first, BatchConfig::default());
        assert!(path.exists());

        let changed = BatchConfig {
            parallel_downloads: 8,
            speed_limit: Some("500k".to_string()),
            ..BatchConfig::default()
        };
        save_at(&path, &changed).unwrap();
        assert_eq!(load_or_init_at(&path).unwrap(), changed);
    }
}
