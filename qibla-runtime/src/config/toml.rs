//! TOML engine configuration
//!
//! The file groups parameters by concern; every key is optional and falls
//! back to the built-in default:
//!
//! ```toml
//! version = 1
//!
//! [smoothing]
//! factor = 0.18
//! min_sample_interval_ms = 33
//!
//! [alignment]
//! threshold_deg = 8.0
//! haptic_pulse_ms = 50
//!
//! [sensor]
//! timeout_ms = 10000
//! ```

use serde::{Deserialize, Serialize};

use qibla_core::config::{ConfigError, EngineConfig, CONFIG_VERSION};

/// Parse error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ParseError {
    /// Not valid TOML, unknown key, or wrong value type
    Syntax,
    /// Well-formed but rejected by validation
    Invalid(ConfigError),
}

impl From<ConfigError> for ParseError {
    fn from(e: ConfigError) -> Self {
        ParseError::Invalid(e)
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct ConfigFile {
    #[serde(skip_serializing_if = "Option::is_none")]
    version: Option<u8>,
    smoothing: SmoothingSection,
    alignment: AlignmentSection,
    sensor: SensorSection,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct SmoothingSection {
    #[serde(skip_serializing_if = "Option::is_none")]
    factor: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    min_sample_interval_ms: Option<u32>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct AlignmentSection {
    #[serde(skip_serializing_if = "Option::is_none")]
    threshold_deg: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    haptic_pulse_ms: Option<u16>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct SensorSection {
    #[serde(skip_serializing_if = "Option::is_none")]
    timeout_ms: Option<u32>,
}

impl ConfigFile {
    fn into_config(self) -> EngineConfig {
        let d = EngineConfig::default();
        EngineConfig {
            version: self.version.unwrap_or(CONFIG_VERSION),
            smoothing_factor: self.smoothing.factor.unwrap_or(d.smoothing_factor),
            min_sample_interval_ms: self
                .smoothing
                .min_sample_interval_ms
                .unwrap_or(d.min_sample_interval_ms),
            alignment_threshold_deg: self
                .alignment
                .threshold_deg
                .unwrap_or(d.alignment_threshold_deg),
            sensor_timeout_ms: self.sensor.timeout_ms.unwrap_or(d.sensor_timeout_ms),
            haptic_pulse_ms: self
                .alignment
                .haptic_pulse_ms
                .unwrap_or(d.haptic_pulse_ms),
        }
    }

    fn from_config(config: &EngineConfig) -> Self {
        Self {
            version: Some(config.version),
            smoothing: SmoothingSection {
                factor: Some(config.smoothing_factor),
                min_sample_interval_ms: Some(config.min_sample_interval_ms),
            },
            alignment: AlignmentSection {
                threshold_deg: Some(config.alignment_threshold_deg),
                haptic_pulse_ms: Some(config.haptic_pulse_ms),
            },
            sensor: SensorSection {
                timeout_ms: Some(config.sensor_timeout_ms),
            },
        }
    }
}

/// Parse and validate a TOML configuration
pub fn parse_config(input: &str) -> Result<EngineConfig, ParseError> {
    let file: ConfigFile = ::toml::from_str(input).map_err(|_| ParseError::Syntax)?;
    let config = file.into_config();
    config.validate()?;
    Ok(config)
}

/// Render a configuration as TOML
pub fn render_config(config: &EngineConfig) -> Result<String, ParseError> {
    ::toml::to_string(&ConfigFile::from_config(config)).map_err(|_| ParseError::Syntax)
}
