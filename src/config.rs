//! # Configuration Management Module
//!
//! Dashboard settings stored in a platform-appropriate location.
//! Handles loading, saving, and providing defaults for configuration options.
//!
//! ## Settings
//! - `chart.width` / `chart.height`: Sparkline canvas size in SVG units
//! - `stats.interval_hours`: Trend window (24, 168 or 720)
//! - `stats.alert_threshold`: Latest AQI above which a node counts as an alert
//! - `stats.pollutant`: Pollutant name shown as the most common one
//! - `source.snapshot_path`: Optional TOML snapshot used as the reading source
//!
//! ## Storage Location
//! - macOS: ~/Library/Application Support/aqi-dashboard/config.toml
//! - Linux: ~/.config/aqi-dashboard/config.toml
//! - Windows: %APPDATA%\aqi-dashboard\config.toml

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use crate::error::ConfigError;

pub const DEFAULT_CHART_WIDTH: f64 = 472.0;
pub const DEFAULT_CHART_HEIGHT: f64 = 150.0;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub chart: ChartConfig,
    pub stats: StatsConfig,
    pub source: SourceConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartConfig {
    pub width: f64,
    pub height: f64,
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            width: DEFAULT_CHART_WIDTH,
            height: DEFAULT_CHART_HEIGHT,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StatsConfig {
    pub interval_hours: u32,
    pub alert_threshold: f64,
    pub pollutant: String,
}

impl Default for StatsConfig {
    fn default() -> Self {
        Self {
            interval_hours: 24,
            alert_threshold: 100.0,
            pollutant: "PM2.5".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub snapshot_path: Option<PathBuf>,
}

impl Config {
    /// Get the path to the config file
    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("aqi-dashboard")
            .join("config.toml")
    }

    /// Load config from the default location, creating it if it doesn't exist
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(Self::config_path())
    }

    /// Load config from `path`, writing out the default if the file is missing
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();

        match fs::read_to_string(path) {
            Ok(contents) => {
                let config = toml::from_str(&contents)
                    .map_err(ConfigError::ParseFailed)?;
                log::debug!("Loaded config from {}", path.display());
                Ok(config)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                let config = Self::default();
                config.save_to(path)?;
                log::info!("Wrote default config to {}", path.display());
                Ok(config)
            }
            Err(e) => Err(ConfigError::ReadFailed(e)),
        }
    }

    /// Save config to the default location
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(Self::config_path())
    }

    /// Save config to `path`
    pub fn save_to<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .map_err(ConfigError::WriteFailed)?;
        }

        let toml_string = toml::to_string_pretty(self)
            .map_err(ConfigError::SerializeFailed)?;
        fs::write(path, toml_string)
            .map_err(ConfigError::WriteFailed)?;

        Ok(())
    }
}
