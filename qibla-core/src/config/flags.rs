//! Persisted flag records
//!
//! The permission and session flags are stored as small postcard records
//! with a magic number and checksum, so a value written by something else
//! under the same key reads as "not set" rather than as a grant.

use serde::{Deserialize, Serialize};

use qibla_hal::{KeyValueStore, StorageError, StorageKey};

/// Magic number to identify flag records
pub const FLAG_MAGIC: u32 = 0x5142_4C46; // "QBLF"

/// Current flag record version
pub const FLAG_VERSION: u8 = 1;

/// Upper bound on an encoded record
pub const MAX_FLAG_RECORD_SIZE: usize = 16;

/// A boolean flag as stored
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FlagRecord {
    /// Magic number for validation
    pub magic: u32,
    /// Record format version
    pub version: u8,
    /// Flag value
    pub set: bool,
    /// CRC32 over magic, version and value
    pub crc: u32,
}

impl FlagRecord {
    /// Create a record for the given value
    pub fn new(set: bool) -> Self {
        let mut record = Self {
            magic: FLAG_MAGIC,
            version: FLAG_VERSION,
            set,
            crc: 0,
        };
        record.crc = record.calculate_crc();
        record
    }

    /// Check magic, version and checksum
    pub fn is_valid(&self) -> bool {
        self.magic == FLAG_MAGIC && self.version == FLAG_VERSION && self.crc == self.calculate_crc()
    }

    /// Calculate CRC32 for the record (excluding the crc field itself)
    pub fn calculate_crc(&self) -> u32 {
        let mut crc: u32 = 0xFFFF_FFFF;
        crc = crc32_update(crc, &self.magic.to_le_bytes());
        crc = crc32_update(crc, &[self.version]);
        crc = crc32_update(crc, &[self.set as u8]);
        !crc
    }
}

/// Read a flag; anything missing, unreadable or foreign counts as unset
pub fn read_flag<S: KeyValueStore>(store: &mut S, key: StorageKey) -> bool {
    let mut buf = [0u8; MAX_FLAG_RECORD_SIZE];
    let Ok(len) = store.read(key, &mut buf) else {
        return false;
    };
    match postcard::from_bytes::<FlagRecord>(&buf[..len]) {
        Ok(record) => record.is_valid() && record.set,
        Err(_) => false,
    }
}

/// Write a flag
pub fn write_flag<S: KeyValueStore>(
    store: &mut S,
    key: StorageKey,
    set: bool,
) -> Result<(), StorageError> {
    let mut buf = [0u8; MAX_FLAG_RECORD_SIZE];
    let bytes =
        postcard::to_slice(&FlagRecord::new(set), &mut buf).map_err(|_| StorageError::BufferTooSmall)?;
    store.write(key, bytes)
}

/// Simple CRC32 update function (IEEE 802.3 polynomial)
fn crc32_update(crc: u32, data: &[u8]) -> u32 {
    const POLY: u32 = 0xEDB8_8320;
    let mut crc = crc;

    for &byte in data {
        crc ^= byte as u32;
        for _ in 0..8 {
            if crc & 1 != 0 {
                crc = (crc >> 1) ^ POLY;
            } else {
                crc >>= 1;
            }
        }
    }

    crc
}
