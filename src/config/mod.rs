// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Configuration system for DRILL.
//!
//! Metronome and pitch-detection settings, loadable from YAML or TOML.
//! Every field has a default, so an empty file is a valid configuration.

use std::fs;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::pitch::{EstimatorSettings, FrequencyBand, PitchTracker};
use crate::timing::{Bpm, SchedulerConfig};

/// Root configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct DrillConfig {
    /// Metronome settings
    #[serde(default)]
    pub metronome: MetronomeConfig,
    /// Pitch detection settings
    #[serde(default)]
    pub pitch: PitchConfig,
}

impl DrillConfig {
    /// Load a configuration file. `.toml` files are read as TOML, anything
    /// else as YAML.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;

        let is_toml = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("toml"));
        let config = if is_toml {
            Self::from_toml(&contents)?
        } else {
            Self::from_yaml(&contents)?
        };

        config
            .validate()
            .with_context(|| format!("Invalid config file: {:?}", path))?;
        Ok(config)
    }

    /// Parse a configuration from a YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        serde_yaml::from_str(yaml).context("Failed to parse YAML configuration")
    }

    /// Parse a configuration from a TOML string
    pub fn from_toml(text: &str) -> Result<Self> {
        toml::from_str(text).context("Failed to parse TOML configuration")
    }

    /// Serialize to YAML string
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).context("Failed to serialize configuration to YAML")
    }

    /// Save configuration to a YAML file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let yaml = self.to_yaml()?;
        fs::write(path.as_ref(), yaml)
            .with_context(|| format!("Failed to write config file: {:?}", path.as_ref()))
    }

    /// Check every value is usable
    pub fn validate(&self) -> crate::Result<()> {
        self.metronome.validate()?;
        self.pitch.validate()
    }
}

/// Metronome configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MetronomeConfig {
    /// Tempo in BPM
    #[serde(default = "default_tempo")]
    pub tempo: f64,
    /// Beats per bar
    #[serde(default = "default_bar_length")]
    pub bar_length: u32,
    /// Poll period in milliseconds
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    /// Lookahead window in seconds
    #[serde(default = "default_schedule_ahead_secs")]
    pub schedule_ahead_secs: f64,
    /// Delay before the first beat after start/resume, in seconds
    #[serde(default = "default_start_delay_secs")]
    pub start_delay_secs: f64,
}

fn default_tempo() -> f64 {
    60.0
}
fn default_bar_length() -> u32 {
    4
}
fn default_poll_interval_ms() -> u64 {
    25
}
fn default_schedule_ahead_secs() -> f64 {
    0.1
}
fn default_start_delay_secs() -> f64 {
    0.1
}

impl Default for MetronomeConfig {
    fn default() -> Self {
        Self {
            tempo: default_tempo(),
            bar_length: default_bar_length(),
            poll_interval_ms: default_poll_interval_ms(),
            schedule_ahead_secs: default_schedule_ahead_secs(),
            start_delay_secs: default_start_delay_secs(),
        }
    }
}

impl MetronomeConfig {
    /// Validated tempo
    pub fn bpm(&self) -> crate::Result<Bpm> {
        Bpm::new(self.tempo)
    }

    /// Build the scheduler settings
    pub fn scheduler_config(&self) -> crate::Result<SchedulerConfig> {
        self.validate()?;
        let mut config = SchedulerConfig::default();
        config.poll_interval = Duration::from_millis(self.poll_interval_ms);
        config.schedule_ahead = self.schedule_ahead_secs;
        config.start_delay = self.start_delay_secs;
        config.with_bar_length(self.bar_length)
    }

    fn validate(&self) -> crate::Result<()> {
        self.bpm()?;
        if self.bar_length == 0 {
            return Err(Error::InvalidBarLength(self.bar_length));
        }
        if self.poll_interval_ms == 0 {
            return Err(invalid("metronome.poll_interval_ms must be greater than zero"));
        }
        if !non_negative(self.schedule_ahead_secs) {
            return Err(invalid("metronome.schedule_ahead_secs must be zero or more"));
        }
        if !non_negative(self.start_delay_secs) {
            return Err(invalid("metronome.start_delay_secs must be zero or more"));
        }
        Ok(())
    }
}

/// Pitch detection configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PitchConfig {
    /// Samples per analysis window
    #[serde(default = "default_window_size")]
    pub window_size: usize,
    /// Capture sample rate in Hz
    #[serde(default = "default_sample_rate")]
    pub sample_rate: u32,
    /// RMS below which a window counts as silence
    #[serde(default = "default_noise_floor")]
    pub noise_floor: f32,
    /// Edge-trim magnitude threshold
    #[serde(default = "default_trim_threshold")]
    pub trim_threshold: f32,
    /// Lowest accepted frequency in Hz (exclusive)
    #[serde(default = "default_min_frequency")]
    pub min_frequency: f64,
    /// Highest accepted frequency in Hz (exclusive)
    #[serde(default = "default_max_frequency")]
    pub max_frequency: f64,
}

fn default_window_size() -> usize {
    2048
}
fn default_sample_rate() -> u32 {
    44_100
}
fn default_noise_floor() -> f32 {
    0.01
}
fn default_trim_threshold() -> f32 {
    0.2
}
fn default_min_frequency() -> f64 {
    50.0
}
fn default_max_frequency() -> f64 {
    2000.0
}

impl Default for PitchConfig {
    fn default() -> Self {
        Self {
            window_size: default_window_size(),
            sample_rate: default_sample_rate(),
            noise_floor: default_noise_floor(),
            trim_threshold: default_trim_threshold(),
            min_frequency: default_min_frequency(),
            max_frequency: default_max_frequency(),
        }
    }
}

impl PitchConfig {
    /// Estimator thresholds
    pub fn estimator_settings(&self) -> EstimatorSettings {
        EstimatorSettings {
            noise_floor: self.noise_floor,
            trim_threshold: self.trim_threshold,
        }
    }

    /// Accepted frequency band
    pub fn band(&self) -> FrequencyBand {
        FrequencyBand {
            min: self.min_frequency,
            max: self.max_frequency,
        }
    }

    /// Build a tracker with these settings
    pub fn tracker(&self) -> PitchTracker {
        PitchTracker::new(self.estimator_settings(), self.band())
    }

    fn validate(&self) -> crate::Result<()> {
        if self.window_size < 3 {
            return Err(invalid("pitch.window_size must be at least 3"));
        }
        if self.sample_rate == 0 {
            return Err(invalid("pitch.sample_rate must be greater than zero"));
        }
        if !non_negative(f64::from(self.noise_floor)) {
            return Err(invalid("pitch.noise_floor must be zero or more"));
        }
        if !non_negative(f64::from(self.trim_threshold)) || self.trim_threshold == 0.0 {
            return Err(invalid("pitch.trim_threshold must be greater than zero"));
        }
        if !non_negative(self.min_frequency)
            || self.max_frequency.is_nan()
            || self.min_frequency >= self.max_frequency
        {
            return Err(invalid(
                "pitch.min_frequency must be zero or more and below pitch.max_frequency",
            ));
        }
        Ok(())
    }
}

fn non_negative(value: f64) -> bool {
    value.is_finite() && value >= 0.0
}

fn invalid(message: &str) -> Error {
    Error::InvalidConfig(message.to_string())
}
