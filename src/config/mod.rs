// Copyright (c) 2026 bad-antics
// Licensed under the MIT License. See LICENSE file in the project root.
// https://github.com/bad-antics/smartmine

//! Configuration module

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

use crate::snapshot::AlertThresholds;
use crate::streaming::StreamingConfig;

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Log filter directive, e.g. `info` or `smartmine=debug,warn`
    pub log_level: String,

    /// Simulation configuration
    pub simulation: SimulationConfig,

    /// Reference dataset configuration
    pub dataset: DatasetConfig,

    /// Streaming configuration
    pub streaming: StreamingConfig,

    /// Alert and recommendation thresholds
    pub alerts: AlertThresholds,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            simulation: SimulationConfig::default(),
            dataset: DatasetConfig::default(),
            streaming: StreamingConfig::default(),
            alerts: AlertThresholds::default(),
        }
    }
}

impl Config {
    /// Load configuration from file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        info!("Loaded configuration from {:?}", path);
        Ok(config)
    }

    /// Save configuration to file
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        info!("Saved configuration to {:?}", path);
        Ok(())
    }

    /// Load or create default configuration
    pub fn load_or_create(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            let config = Self::default();

            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }

            config.save(path)?;
            Ok(config)
        }
    }

    /// Log filter directive. `--trace` and `--debug` take precedence.
    pub fn log_directive(&self, debug: bool, trace: bool) -> &str {
        if trace {
            "trace"
        } else if debug {
            "debug"
        } else {
            &self.log_level
        }
    }

    /// Get configuration directory
    pub fn config_dir() -> PathBuf {
        dirs::config_dir()
            .map(|d| d.join("smartmine"))
            .unwrap_or_else(|| PathBuf::from("./config"))
    }

    /// Get default configuration path
    pub fn default_path() -> PathBuf {
        Self::config_dir().join("config.toml")
    }
}

/// Accepted range for `tick_interval_secs`
pub const MIN_TICK_INTERVAL_SECS: f64 = 0.01;
pub const MAX_TICK_INTERVAL_SECS: f64 = 3600.0;

/// Simulation configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Site identifier carried in every snapshot
    pub mine_id: String,

    /// Simulated seconds per tick, and the wall-clock period at speed 1.0
    pub tick_interval_secs: f64,

    /// Initial speed multiplier
    pub speed_multiplier: f64,

    /// Seed for a reproducible run
    pub seed: Option<u64>,

    pub truck_count: usize,
    pub crusher_count: usize,
    pub zone_count: usize,

    /// Per-tick chance of a spontaneous system fault
    pub random_fault_probability: f64,

    /// Wall-clock seconds before an injected fault reverts
    pub fault_duration_secs: u64,

    /// Wall-clock seconds before maintenance mode reverts
    pub maintenance_duration_secs: u64,

    /// Ticks a crusher spends in maintenance
    pub crusher_maintenance_ticks: u32,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            mine_id: "SMARTMINE_001".to_string(),
            tick_interval_secs: 5.0,
            speed_multiplier: 1.0,
            seed: None,
            truck_count: 15,
            crusher_count: 3,
            zone_count: 5,
            random_fault_probability: 0.001,
            fault_duration_secs: 30,
            maintenance_duration_secs: 10,
            crusher_maintenance_ticks: 3,
        }
    }
}

impl SimulationConfig {
    /// `tick_interval_secs` forced into a finite, positive range. NaN falls back to the default.
    pub fn bounded_tick_interval(&self) -> f64 {
        if self.tick_interval_secs.is_nan() {
            return Self::default().tick_interval_secs;
        }
        self.tick_interval_secs
            .clamp(MIN_TICK_INTERVAL_SECS, MAX_TICK_INTERVAL_SECS)
    }
}

/// Reference dataset configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatasetConfig {
    /// CSV file with one row per reference reading
    pub path: PathBuf,

    /// Columns excluded from telemetry even when numeric
    pub label_columns: Vec<String>,
}

impl Default for DatasetConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("./data/reference.csv"),
            label_columns: vec!["Fault_Diagnosis".to_string()],
        }
    }
}
