//! # Service Configuration
//!
//! YAML configuration for the alarm sync backend. Every field has a default,
//! so an empty file (or no file at all) yields a working setup.
//!
//! ```yaml
//! database_url: "sqlite:alarm_sync.db"
//! bind_address: "127.0.0.1:3000"
//! health:
//!   failure_ratio_weight: 70.0
//!   latency_threshold_ms: 2000.0
//! sync:
//!   recovery_window: 5
//! delivery_dedup:
//!   ttl_seconds: 300
//! ```
//!
//! `ALARM_SYNC_CONFIG` points at the file; `DATABASE_URL` and `BIND_ADDRESS`
//! override the matching fields.

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::info;

pub const CONFIG_PATH_ENV: &str = "ALARM_SYNC_CONFIG";

/// Upper bound for `health.next_check_hours`: one year
pub const MAX_NEXT_CHECK_HOURS: i64 = 24 * 365;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub database_url: String,
    pub bind_address: String,
    pub health: HealthScoringConfig,
    pub sync: SyncStatusConfig,
    pub delivery_dedup: DeliveryDedupConfig,
}

/// Weights for turning client sync counters into a 0-100 health score
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HealthScoringConfig {
    /// Points lost at a 100% failure ratio, scaled linearly
    pub failure_ratio_weight: f64,
    /// Flat penalty when failures outnumber successes
    pub failures_exceed_successes_penalty: f64,
    pub latency_threshold_ms: f64,
    pub latency_penalty: f64,
    /// Scores at or above this are healthy
    pub healthy_threshold: u8,
    /// Scores at or above this (and below healthy) are a warning
    pub warning_threshold: u8,
    pub next_check_hours: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncStatusConfig {
    /// How many of the newest health entries are inspected for failure patterns
    pub recovery_window: usize,
    /// Fewer entries than this never count as a pattern
    pub recovery_min_entries: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeliveryDedupConfig {
    pub ttl_seconds: u64,
    pub max_entries: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database_url: "sqlite:alarm_sync.db".to_string(),
            bind_address: "127.0.0.1:3000".to_string(),
            health: HealthScoringConfig::default(),
            sync: SyncStatusConfig::default(),
            delivery_dedup: DeliveryDedupConfig::default(),
        }
    }
}

impl Default for HealthScoringConfig {
    fn default() -> Self {
        Self {
            failure_ratio_weight: 70.0,
            failures_exceed_successes_penalty: 20.0,
            latency_threshold_ms: 2000.0,
            latency_penalty: 10.0,
            healthy_threshold: 70,
            warning_threshold: 40,
            next_check_hours: 24,
        }
    }
}

impl Default for SyncStatusConfig {
    fn default() -> Self {
        Self {
            recovery_window: 5,
            recovery_min_entries: 3,
        }
    }
}

impl Default for DeliveryDedupConfig {
    fn default() -> Self {
        Self {
            ttl_seconds: 300,
            max_entries: 10_000,
        }
    }
}

impl DeliveryDedupConfig {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_seconds)
    }
}

impl AppConfig {
    /// Read configuration from a YAML file
    pub fn from_yaml_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::from_yaml_str(&content)
    }

    pub fn from_yaml_str(content: &str) -> Result<Self> {
        // serde_yaml rejects a fully empty document for a struct
        let config: AppConfig = if content.trim().is_empty() {
            AppConfig::default()
        } else {
            serde_yaml::from_str(content).context("Failed to parse config YAML")?
        };
        config.validate()?;
        Ok(config)
    }

    /// Load from `ALARM_SYNC_CONFIG` if set, then apply environment overrides
    pub fn load() -> Result<Self> {
        let mut config = match std::env::var(CONFIG_PATH_ENV) {
            Ok(path) => {
                info!("Loading configuration from {}", path);
                Self::from_yaml_file(Path::new(&path))?
            }
            Err(_) => {
                info!("{} not set, using default configuration", CONFIG_PATH_ENV);
                Self::default()
            }
        };

        if let Ok(url) = std::env::var("DATABASE_URL") {
            config.database_url = url;
        }
        if let Ok(addr) = std::env::var("BIND_ADDRESS") {
            config.bind_address = addr;
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.health.warning_threshold > self.health.healthy_threshold {
            bail!(
                "health.warning_threshold ({}) must not exceed health.healthy_threshold ({})",
                self.health.warning_threshold,
                self.health.healthy_threshold
            );
        }
        if self.health.healthy_threshold > 100 {
            bail!("health.healthy_threshold must be at most 100");
        }
        if !(1..=MAX_NEXT_CHECK_HOURS).contains(&self.health.next_check_hours) {
            bail!(
                "health.next_check_hours ({}) must be between 1 and {}",
                self.health.next_check_hours,
                MAX_NEXT_CHECK_HOURS
            );
        }
        if self.sync.recovery_window == 0 {
            bail!("sync.recovery_window must be positive");
        }
        if self.sync.recovery_min_entries > self.sync.recovery_window {
            bail!(
                "sync.recovery_min_entries ({}) must not exceed sync.recovery_window ({})",
                self.sync.recovery_min_entries,
                self.sync.recovery_window
            );
        }
        if self.delivery_dedup.max_entries == 0 {
            bail!("delivery_dedup.max_entries must be positive");
        }
        Ok(())
    }
}
