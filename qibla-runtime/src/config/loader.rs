//! Configuration persistence
//!
//! Loads engine configuration from the platform key/value store.
//! Falls back to built-in defaults if nothing usable is stored.

use core::str;

use qibla_core::config::{ConfigError, EngineConfig};
use qibla_hal::{KeyValueStore, StorageError, StorageKey};

use super::toml::{parse_config, render_config, ParseError};
use crate::{log_debug, log_info, log_warn};

/// Maximum serialized config size (binary)
const MAX_CONFIG_SIZE: usize = 64;

/// Maximum TOML config size
const MAX_TOML_SIZE: usize = 1024;

/// Configuration persistence errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LoadError {
    /// Store operation failed
    Storage(StorageError),
    /// Binary record could not be decoded
    Deserialize,
    /// Config could not be encoded
    Serialize,
    /// TOML parsing failed
    TomlParse,
    /// Invalid UTF-8 in TOML data
    InvalidUtf8,
    /// Decoded but failed validation
    Invalid(ConfigError),
}

impl From<StorageError> for LoadError {
    fn from(e: StorageError) -> Self {
        LoadError::Storage(e)
    }
}

impl From<ConfigError> for LoadError {
    fn from(e: ConfigError) -> Self {
        LoadError::Invalid(e)
    }
}

impl From<ParseError> for LoadError {
    fn from(e: ParseError) -> Self {
        match e {
            ParseError::Syntax => LoadError::TomlParse,
            ParseError::Invalid(e) => LoadError::Invalid(e),
        }
    }
}

/// Configuration persistence manager
///
/// Borrows the store only for the duration of loading or saving, so the
/// same store can then be handed to the engine.
pub struct ConfigPersistence<'s, S> {
    store: &'s mut S,
}

impl<'s, S: KeyValueStore> ConfigPersistence<'s, S> {
    /// Create a persistence manager over a store
    pub fn new(store: &'s mut S) -> Self {
        Self { store }
    }

    /// Load configuration, or the defaults if none is usable
    pub fn load_or_default(&mut self) -> EngineConfig {
        match self.load() {
            Ok(config) => config,
            Err(LoadError::Storage(StorageError::NotFound)) => {
                log_debug!("No stored configuration, using defaults");
                EngineConfig::default()
            }
            Err(e) => {
                log_warn!("Stored configuration unusable: {:?}, using defaults", e);
                EngineConfig::default()
            }
        }
    }

    /// Load configuration
    ///
    /// Tries the TOML text first, then falls back to the binary postcard
    /// record.
    pub fn load(&mut self) -> Result<EngineConfig, LoadError> {
        match self.load_toml() {
            Ok(config) => {
                log_info!("Loaded configuration from TOML");
                return Ok(config);
            }
            Err(LoadError::Storage(StorageError::NotFound)) => {
                log_debug!("No TOML config found, trying binary format");
            }
            Err(e) => {
                log_warn!("Failed to load TOML config: {:?}, trying binary", e);
            }
        }

        self.load_binary()
    }

    /// Store configuration as a binary postcard record
    pub fn save(&mut self, config: &EngineConfig) -> Result<(), LoadError> {
        config.validate()?;
        let mut buffer = [0u8; MAX_CONFIG_SIZE];
        let bytes = postcard::to_slice(config, &mut buffer).map_err(|_| LoadError::Serialize)?;
        self.store.write(StorageKey::EngineConfig, bytes)?;
        Ok(())
    }

    /// Store configuration as TOML text
    pub fn save_toml(&mut self, config: &EngineConfig) -> Result<(), LoadError> {
        config.validate()?;
        let text = render_config(config)?;
        if text.len() > MAX_TOML_SIZE {
            return Err(LoadError::Storage(StorageError::Full));
        }
        self.store
            .write(StorageKey::EngineConfigToml, text.as_bytes())?;
        Ok(())
    }

    fn load_toml(&mut self) -> Result<EngineConfig, LoadError> {
        let mut buffer = [0u8; MAX_TOML_SIZE];
        let len = self.store.read(StorageKey::EngineConfigToml, &mut buffer)?;

        log_debug!("Read {} bytes of TOML config", len);

        let text = str::from_utf8(&buffer[..len]).map_err(|_| LoadError::InvalidUtf8)?;
        let config = parse_config(text)?;

        log_config_summary(&config);
        Ok(config)
    }

    fn load_binary(&mut self) -> Result<EngineConfig, LoadError> {
        let mut buffer = [0u8; MAX_CONFIG_SIZE];
        let len = self.store.read(StorageKey::EngineConfig, &mut buffer)?;

        log_debug!("Read {} bytes of binary config", len);

        let config: EngineConfig =
            postcard::from_bytes(&buffer[..len]).map_err(|_| LoadError::Deserialize)?;
        config.validate()?;

        log_config_summary(&config);
        Ok(config)
    }
}

/// Log a summary of the loaded configuration
fn log_config_summary(config: &EngineConfig) {
    log_debug!("  smoothing factor {}", config.smoothing_factor);
    log_debug!("  min sample interval {} ms", config.min_sample_interval_ms);
    log_debug!("  alignment threshold {} deg", config.alignment_threshold_deg);
    log_debug!("  sensor timeout {} ms", config.sensor_timeout_ms);
}
