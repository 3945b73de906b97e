//! # Configuration Module
//!
//! Handles loading and validating configuration from TOML files.
//!
//! Every field has a default matching the built-in constants, so an empty
//! file (or no file at all) yields the stock setup.

use serde::Deserialize;
use serde::de::Error;
use std::fs;
use std::path::Path;

use crate::controller::sampler::{AxisRange, RightStickLayout};
use crate::error::{Result, RoverLinkError};
use crate::link::{DEFAULT_HOST, DEFAULT_PORT};
use crate::rover::control::{DEFAULT_DEADZONE, DEFAULT_POLL_INTERVAL_MS};

/// Main configuration structure
#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub link: LinkConfig,
    #[serde(default)]
    pub controller: ControllerConfig,
    #[serde(default)]
    pub control: ControlConfig,
    #[serde(default)]
    pub telemetry: TelemetryConfig,
}

/// Receiver address configuration
#[derive(Debug, Deserialize, Clone)]
pub struct LinkConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

/// Controller configuration
#[derive(Debug, Deserialize, Clone)]
pub struct ControllerConfig {
    /// Empty means auto-detect.
    #[serde(default)]
    pub device_path: String,

    #[serde(default = "default_deadzone")]
    pub deadzone: f64,

    /// Raw stick range override. Unset means use the limits the device
    /// reports for each axis. Set both or neither.
    #[serde(default)]
    pub axis_min: Option<i32>,

    #[serde(default)]
    pub axis_max: Option<i32>,

    #[serde(default)]
    pub right_stick: RightStickLayout,
}

/// Control loop configuration
#[derive(Debug, Deserialize, Clone)]
pub struct ControlConfig {
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
}

/// Packet log configuration
#[derive(Debug, Deserialize, Clone)]
pub struct TelemetryConfig {
    #[serde(default)]
    pub enabled: bool,

    #[serde(default = "default_log_dir")]
    pub log_dir: String,

    #[serde(default = "default_max_records_per_file")]
    pub max_records_per_file: usize,

    #[serde(default = "default_max_files_to_keep")]
    pub max_files_to_keep: usize,
}

// Default value functions
fn default_host() -> String { DEFAULT_HOST.to_string() }
fn default_port() -> u16 { DEFAULT_PORT }

fn default_deadzone() -> f64 { DEFAULT_DEADZONE }

fn default_poll_interval_ms() -> u64 { DEFAULT_POLL_INTERVAL_MS }

fn default_log_dir() -> String { "./logs".to_string() }
fn default_max_records_per_file() -> usize { 10000 }
fn default_max_files_to_keep() -> usize { 10 }

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            device_path: String::new(),
            deadzone: default_deadzone(),
            axis_min: None,
            axis_max: None,
            right_stick: RightStickLayout::default(),
        }
    }
}

impl Default for ControlConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: default_poll_interval_ms(),
        }
    }
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            log_dir: default_log_dir(),
            max_records_per_file: default_max_records_per_file(),
            max_files_to_keep: default_max_files_to_keep(),
        }
    }
}

impl ControllerConfig {
    /// Configured raw stick range, applied to every axis.
    ///
    /// `None` unless both `axis_min` and `axis_max` are set.
    pub fn axis_range_override(&self) -> Option<AxisRange> {
        match (self.axis_min, self.axis_max) {
            (Some(min), Some(max)) => Some(AxisRange { min, max }),
            _ => None,
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the configuration file
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - File cannot be read
    /// - TOML parsing fails
    /// - Validation fails
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use rover_link::config::Config;
    ///
    /// let config = Config::load("config/rover.toml")?;
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values
    ///
    /// # Errors
    ///
    /// Returns error if any configuration value is out of valid range
    pub fn validate(&self) -> Result<()> {
        if self.link.host.is_empty() {
            return Err(invalid("link host cannot be empty"));
        }

        if self.link.port == 0 {
            return Err(invalid("link port must be between 1 and 65535"));
        }

        if !(0.0..1.0).contains(&self.controller.deadzone) {
            return Err(invalid("deadzone must be at least 0.0 and below 1.0"));
        }

        match (self.controller.axis_min, self.controller.axis_max) {
            (Some(min), Some(max)) if min >= max => {
                return Err(invalid("axis_min must be less than axis_max"));
            }
            (Some(_), None) | (None, Some(_)) => {
                return Err(invalid("axis_min and axis_max must be set together"));
            }
            _ => {}
        }

        if self.control.poll_interval_ms == 0 || self.control.poll_interval_ms > 1000 {
            return Err(invalid("poll_interval_ms must be between 1 and 1000"));
        }

        if self.telemetry.enabled && self.telemetry.log_dir.is_empty() {
            return Err(invalid("telemetry log_dir cannot be empty when enabled"));
        }

        if self.telemetry.max_records_per_file == 0 {
            return Err(invalid("max_records_per_file must be greater than 0"));
        }

        if self.telemetry.max_files_to_keep == 0 {
            return Err(invalid("max_files_to_keep must be greater than 0"));
        }

        Ok(())
    }
}

fn invalid(message: &str) -> RoverLinkError {
    RoverLinkError::Config(toml::de::Error::custom(message))
}
