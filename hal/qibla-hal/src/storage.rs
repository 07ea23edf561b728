//! Key/value storage abstractions
//!
//! Provides the persistence trait for the permission flags and the engine
//! configuration. Platforms back the durable scope with something that
//! survives restarts and the session scope with something that is wiped on
//! a fresh launch.

/// Lifetime of a stored value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StorageScope {
    /// Survives application restarts
    Durable,
    /// Cleared when the run/session scope resets
    Session,
}

/// Storage keys
///
/// These keys identify the values the engine persists. The scope of each
/// key is fixed; implementations must honour it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum StorageKey {
    /// Sensor permission has been granted (durable)
    PermissionGranted = 0,
    /// A sensor session is active in this run (session scope)
    SessionActive = 1,
    /// Engine tuning configuration (binary postcard format)
    EngineConfig = 2,
    /// Engine tuning configuration as TOML text
    EngineConfigToml = 3,
}

impl StorageKey {
    /// Get the key as a byte value
    pub fn as_u8(self) -> u8 {
        self as u8
    }

    /// Create a key from a byte value
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(StorageKey::PermissionGranted),
            1 => Some(StorageKey::SessionActive),
            2 => Some(StorageKey::EngineConfig),
            3 => Some(StorageKey::EngineConfigToml),
            _ => None,
        }
    }

    /// Scope this key is stored in
    pub fn scope(self) -> StorageScope {
        match self {
            StorageKey::SessionActive => StorageScope::Session,
            StorageKey::PermissionGranted
            | StorageKey::EngineConfig
            | StorageKey::EngineConfigToml => StorageScope::Durable,
        }
    }
}

/// Errors from storage operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StorageError {
    /// Backing store cannot be reached (private mode, quota policy, ...)
    Unavailable,
    /// Key not found
    NotFound,
    /// Buffer too small for the data
    BufferTooSmall,
    /// Data corrupted or invalid
    Corrupted,
    /// Storage is full
    Full,
}

/// Key/value storage trait
///
/// Writes are synchronous: every platform the engine targets exposes its
/// small-value stores synchronously, and the lifecycle manager must be able
/// to persist a grant before it starts the sensors.
pub trait KeyValueStore {
    /// Read a value by key into the provided buffer
    ///
    /// # Returns
    /// The number of bytes read, or an error.
    fn read(&mut self, key: StorageKey, buffer: &mut [u8]) -> Result<usize, StorageError>;

    /// Write a value by key, replacing any previous value
    fn write(&mut self, key: StorageKey, data: &[u8]) -> Result<(), StorageError>;

    /// Remove a value. Removing a missing key is not an error.
    fn remove(&mut self, key: StorageKey) -> Result<(), StorageError>;

    /// Check if a key exists in storage
    fn exists(&mut self, key: StorageKey) -> bool {
        let mut probe = [0u8; 1];
        match self.read(key, &mut probe) {
            Ok(_) | Err(StorageError::BufferTooSmall) => true,
            Err(_) => false,
        }
    }
}
