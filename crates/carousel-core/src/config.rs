use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::retry::BackoffConfig;

/// Publishing API endpoint settings (`[api]` section).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Scheme and host of the API, e.g. `https://graph.facebook.com`.
    pub base_url: String,
    /// Version path segment, e.g. `v21.0`.
    pub version: String,
    /// TCP/TLS connect timeout in seconds.
    pub connect_timeout_secs: u64,
    /// Whole-request timeout in seconds.
    pub request_timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "https://graph.facebook.com".to_string(),
            version: "v21.0".to_string(),
            connect_timeout_secs: 15,
            request_timeout_secs: 60,
        }
    }
}

/// Pause between consecutive container creations (`[pacing]` section).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PacingConfig {
    pub base_ms: u64,
    /// Added once per item index, so later items wait slightly longer.
    pub increment_ms: u64,
}

impl Default for PacingConfig {
    fn default() -> Self {
        Self {
            base_ms: 500,
            increment_ms: 250,
        }
    }
}

impl PacingConfig {
    /// Pause before creating the container of zero-based item `index`.
    pub fn delay_for(&self, index: usize) -> Duration {
        let extra = self.increment_ms.saturating_mul(index as u64);
        Duration::from_millis(self.base_ms.saturating_add(extra))
    }
}

/// Wait between assembly and publish (`[processing_wait]` section).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcessingWaitConfig {
    pub base_ms: u64,
    pub per_item_ms: u64,
    pub cap_ms: u64,
}

impl Default for ProcessingWaitConfig {
    fn default() -> Self {
        Self {
            base_ms: 3_000,
            per_item_ms: 1_000,
            cap_ms: 15_000,
        }
    }
}

impl ProcessingWaitConfig {
    /// `min(base + item_count * per_item, cap)`.
    pub fn delay_for(&self, item_count: usize) -> Duration {
        let scaled = self
            .base_ms
            .saturating_add(self.per_item_ms.saturating_mul(item_count as u64));
        Duration::from_millis(scaled.min(self.cap_ms))
    }
}

/// Everything the saga needs besides its collaborators.
#[derive(Debug, Clone, PartialEq)]
pub struct SagaSettings {
    pub container_backoff: BackoffConfig,
    pub assembly_backoff: BackoffConfig,
    pub publish_backoff: BackoffConfig,
    pub pacing: PacingConfig,
    pub processing_wait: ProcessingWaitConfig,
}

impl Default for SagaSettings {
    fn default() -> Self {
        CarouselConfig::default().saga_settings()
    }
}

/// Global configuration loaded from `~/.config/carousel/config.toml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CarouselConfig {
    /// Sagas allowed to run at once against the same account.
    pub max_concurrent_per_account: usize,
    pub api: ApiConfig,
    pub container_backoff: BackoffConfig,
    pub assembly_backoff: BackoffConfig,
    pub publish_backoff: BackoffConfig,
    pub pacing: PacingConfig,
    pub processing_wait: ProcessingWaitConfig,
}

impl Default for CarouselConfig {
    fn default() -> Self {
        Self {
            max_concurrent_per_account: 1,
            api: ApiConfig::default(),
            container_backoff: BackoffConfig::container(),
            assembly_backoff: BackoffConfig::assembly(),
            publish_backoff: BackoffConfig::publish(),
            pacing: PacingConfig::default(),
            processing_wait: ProcessingWaitConfig::default(),
        }
    }
}

impl CarouselConfig {
    /// Saga parameters with backoff profiles normalized.
    pub fn saga_settings(&self) -> SagaSettings {
        SagaSettings {
            container_backoff: self.container_backoff.normalized(),
            assembly_backoff: self.assembly_backoff.normalized(),
            publish_backoff: self.publish_backoff.normalized(),
            pacing: self.pacing,
            processing_wait: self.processing_wait,
        }
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("carousel")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from an explicit file.
pub fn load_from_path(path: &Path) -> Result<CarouselConfig> {
    let data = fs::read_to_string(path)
        .with_context(|| format!("reading config {}", path.display()))?;
    let cfg: CarouselConfig =
        toml::from_str(&data).with_context(|| format!("parsing config {}", path.display()))?;
    Ok(cfg)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<CarouselConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = CarouselConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    load_from_path(&path)
}
