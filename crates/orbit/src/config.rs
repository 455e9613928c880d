use crate::transport::WriteMode;
use anyhow::{Context, Result};
use orbit_core::{Calibration, Vector2, calibration};
use serde::{Deserialize, Serialize};
use std::{fs, path::Path, time::Duration};

/// Runtime configuration for the orbit tooling
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Gimbal head description
    #[serde(default)]
    pub device: DeviceConfig,

    /// Script execution settings
    #[serde(default)]
    pub runner: RunnerConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceConfig {
    /// Steps in one full turn of each axis
    #[serde(default = "default_steps_per_revolution")]
    pub steps_per_revolution: Vector2,

    /// How frames are written to the motion characteristic
    #[serde(default)]
    pub write_mode: WriteMode,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            steps_per_revolution: default_steps_per_revolution(),
            write_mode: WriteMode::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunnerConfig {
    /// Reject script moves the wire format cannot represent instead of
    /// truncating them
    #[serde(default = "default_strict_encoding")]
    pub strict_encoding: bool,

    /// How often `orbit run` reports the position estimate
    #[serde(default = "default_report_interval_ms")]
    pub report_interval_ms: u64,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            strict_encoding: default_strict_encoding(),
            report_interval_ms: default_report_interval_ms(),
        }
    }
}

fn default_steps_per_revolution() -> Vector2 {
    Vector2::new(
        calibration::STEPS_PER_REVOLUTION_X,
        calibration::STEPS_PER_REVOLUTION_Y,
    )
}

fn default_strict_encoding() -> bool {
    true
}

fn default_report_interval_ms() -> u64 {
    250
}

impl Config {
    /// Load configuration from a file, auto-detecting TOML or JSON format
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;

        match path.extension().and_then(|s| s.to_str()) {
            Some("toml") => Self::from_toml(&content),
            Some("json") => Self::from_json(&content),
            _ => Self::from_toml(&content).or_else(|_| Self::from_json(&content)),
        }
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content).context("failed to parse config as TOML")
    }

    pub fn from_json(content: &str) -> Result<Self> {
        serde_json::from_str(content).context("failed to parse config as JSON")
    }

    pub fn validate(&self) -> Result<()> {
        let steps = self.device.steps_per_revolution;
        for (axis, value) in [("x", steps.x()), ("y", steps.y())] {
            if !value.is_finite() || value <= 0.0 {
                anyhow::bail!(
                    "device.steps_per_revolution.{axis} must be a positive number, got {value}"
                );
            }
        }

        if self.runner.report_interval_ms == 0 {
            anyhow::bail!("runner.report_interval_ms cannot be zero");
        }

        Ok(())
    }

    pub fn calibration(&self) -> Calibration {
        Calibration {
            steps_per_revolution: self.device.steps_per_revolution,
        }
    }

    pub fn report_interval(&self) -> Duration {
        Duration::from_millis(self.runner.report_interval_ms)
    }
}
