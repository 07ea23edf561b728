//! Engine tuning configuration
//!
//! The smoothing factor and rate cap are empirical UX choices rather than a
//! contract, so they are parameters here with the tuned values as defaults.

use serde::{Deserialize, Serialize};

/// Current configuration format version
pub const CONFIG_VERSION: u8 = 1;

/// Default weight of each new sample in the smoothing filter
pub const DEFAULT_SMOOTHING_FACTOR: f32 = 0.18;

/// Default minimum spacing between accepted samples (≈30 Hz)
pub const DEFAULT_MIN_SAMPLE_INTERVAL_MS: u32 = 33;

/// Default alignment threshold (inclusive)
pub const DEFAULT_ALIGNMENT_THRESHOLD_DEG: f32 = 8.0;

/// Default time allowed for the first valid sample
pub const DEFAULT_SENSOR_TIMEOUT_MS: u32 = 10_000;

/// Default haptic pulse length on alignment
pub const DEFAULT_HAPTIC_PULSE_MS: u16 = 50;

/// Configuration validation errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Smoothing factor outside (0, 1]
    InvalidSmoothingFactor,
    /// Alignment threshold negative, above 180° or not a number
    InvalidThreshold,
    /// Sensor timeout of zero
    InvalidTimeout,
    /// Stored config has a different format version
    VersionMismatch,
}

/// Engine configuration
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[serde(default)]
pub struct EngineConfig {
    /// Format version
    pub version: u8,
    /// Exponential smoothing weight α, in (0, 1]
    pub smoothing_factor: f32,
    /// Samples closer than this to the last accepted one are dropped
    pub min_sample_interval_ms: u32,
    /// Largest heading/bearing separation still counted as aligned
    pub alignment_threshold_deg: f32,
    /// Watchdog timeout for the first valid sample
    pub sensor_timeout_ms: u32,
    /// Vibration length when alignment is reached
    pub haptic_pulse_ms: u16,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            smoothing_factor: DEFAULT_SMOOTHING_FACTOR,
            min_sample_interval_ms: DEFAULT_MIN_SAMPLE_INTERVAL_MS,
            alignment_threshold_deg: DEFAULT_ALIGNMENT_THRESHOLD_DEG,
            sensor_timeout_ms: DEFAULT_SENSOR_TIMEOUT_MS,
            haptic_pulse_ms: DEFAULT_HAPTIC_PULSE_MS,
        }
    }
}

impl EngineConfig {
    /// Check that every parameter is usable
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.version != CONFIG_VERSION {
            return Err(ConfigError::VersionMismatch);
        }

        // NaN fails both comparisons
        if !(self.smoothing_factor > 0.0 && self.smoothing_factor <= 1.0) {
            return Err(ConfigError::InvalidSmoothingFactor);
        }

        if !(self.alignment_threshold_deg >= 0.0 && self.alignment_threshold_deg <= 180.0) {
            return Err(ConfigError::InvalidThreshold);
        }

        if self.sensor_timeout_ms == 0 {
            return Err(ConfigError::InvalidTimeout);
        }

        Ok(())
    }
}
