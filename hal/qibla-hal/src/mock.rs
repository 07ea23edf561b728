//! In-memory platform doubles
//!
//! Simulates every platform trait in memory so engine and runtime behaviour
//! can be exercised on the host. Each double records what was asked of it.

use std::collections::{BTreeMap, VecDeque};
use std::vec::Vec;

use crate::geolocation::{Geolocation, GeolocationError, Position};
use crate::haptics::{HapticError, HapticOutput, HapticPulse};
use crate::orientation::{
    OrientationCapabilities, OrientationEventKind, OrientationSensor, SubscribeError,
};
use crate::permission::{PermissionError, PermissionPrompt, PermissionResponse};
use crate::storage::{KeyValueStore, StorageError, StorageKey, StorageScope};

/// Mock key/value store
///
/// Supports:
/// - Durable and session scopes, with [`MockStore::relaunch`] wiping the latter
/// - Write failure injection
#[derive(Debug, Default, Clone)]
pub struct MockStore {
    values: BTreeMap<u8, Vec<u8>>,
    fail_writes: bool,
}

impl MockStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulate an application restart: session-scoped keys are dropped
    pub fn relaunch(&mut self) {
        self.values.retain(|key, _| {
            StorageKey::from_u8(*key).map(StorageKey::scope) != Some(StorageScope::Session)
        });
    }

    /// Make every subsequent write fail with [`StorageError::Unavailable`]
    pub fn set_fail_writes(&mut self, fail: bool) {
        self.fail_writes = fail;
    }

    /// Raw stored bytes for a key
    pub fn raw(&self, key: StorageKey) -> Option<&[u8]> {
        self.values.get(&key.as_u8()).map(Vec::as_slice)
    }

    /// Store raw bytes directly, bypassing failure injection
    pub fn insert_raw(&mut self, key: StorageKey, data: &[u8]) {
        self.values.insert(key.as_u8(), data.to_vec());
    }
}

impl KeyValueStore for MockStore {
    fn read(&mut self, key: StorageKey, buffer: &mut [u8]) -> Result<usize, StorageError> {
        let value = self.values.get(&key.as_u8()).ok_or(StorageError::NotFound)?;
        if value.len() > buffer.len() {
            return Err(StorageError::BufferTooSmall);
        }
        buffer[..value.len()].copy_from_slice(value);
        Ok(value.len())
    }

    fn write(&mut self, key: StorageKey, data: &[u8]) -> Result<(), StorageError> {
        if self.fail_writes {
            return Err(StorageError::Unavailable);
        }
        self.values.insert(key.as_u8(), data.to_vec());
        Ok(())
    }

    fn remove(&mut self, key: StorageKey) -> Result<(), StorageError> {
        if self.fail_writes {
            return Err(StorageError::Unavailable);
        }
        self.values.remove(&key.as_u8());
        Ok(())
    }
}

/// Mock orientation sensor
#[derive(Debug, Clone)]
pub struct MockSensor {
    capabilities: OrientationCapabilities,
    subscribed: Option<OrientationEventKind>,
    subscribe_calls: Vec<OrientationEventKind>,
    unsubscribe_calls: usize,
    refuse: bool,
}

impl MockSensor {
    /// Create a sensor advertising the given capabilities
    pub fn new(capabilities: OrientationCapabilities) -> Self {
        Self {
            capabilities,
            subscribed: None,
            subscribe_calls: Vec::new(),
            unsubscribe_calls: 0,
            refuse: false,
        }
    }

    /// Make subscribe calls fail with [`SubscribeError::NotAllowed`]
    pub fn set_refuse(&mut self, refuse: bool) {
        self.refuse = refuse;
    }

    /// Currently active subscription
    pub fn subscribed(&self) -> Option<OrientationEventKind> {
        self.subscribed
    }

    /// Every successful subscribe call, in order
    pub fn subscribe_calls(&self) -> &[OrientationEventKind] {
        &self.subscribe_calls
    }

    /// Number of unsubscribe calls
    pub fn unsubscribe_calls(&self) -> usize {
        self.unsubscribe_calls
    }
}

impl OrientationSensor for MockSensor {
    fn capabilities(&self) -> OrientationCapabilities {
        self.capabilities
    }

    fn subscribe(&mut self, kind: OrientationEventKind) -> Result<(), SubscribeError> {
        if self.refuse {
            return Err(SubscribeError::NotAllowed);
        }
        self.subscribed = Some(kind);
        self.subscribe_calls.push(kind);
        Ok(())
    }

    fn unsubscribe(&mut self) {
        self.subscribed = None;
        self.unsubscribe_calls += 1;
    }
}

/// Mock permission prompt answering from a script
///
/// Once the script runs out every request fails with
/// [`PermissionError::Platform`].
#[derive(Debug, Default, Clone)]
pub struct MockPrompt {
    script: VecDeque<Result<PermissionResponse, PermissionError>>,
    calls: usize,
}

impl MockPrompt {
    /// Create a prompt that answers in the given order
    pub fn new(script: &[Result<PermissionResponse, PermissionError>]) -> Self {
        Self {
            script: script.iter().copied().collect(),
            calls: 0,
        }
    }

    /// Number of times the prompt was shown
    pub fn calls(&self) -> usize {
        self.calls
    }
}

impl PermissionPrompt for MockPrompt {
    async fn request(&mut self) -> Result<PermissionResponse, PermissionError> {
        self.calls += 1;
        self.script.pop_front().unwrap_or(Err(PermissionError::Platform))
    }
}

/// Mock geolocation returning a fixed answer
#[derive(Debug, Clone)]
pub struct MockGeolocation {
    result: Result<Position, GeolocationError>,
    calls: usize,
}

impl MockGeolocation {
    /// Create a provider that always answers `result`
    pub fn new(result: Result<Position, GeolocationError>) -> Self {
        Self { result, calls: 0 }
    }

    /// Number of lookups performed
    pub fn calls(&self) -> usize {
        self.calls
    }
}

impl Geolocation for MockGeolocation {
    async fn current_position(&mut self) -> Result<Position, GeolocationError> {
        self.calls += 1;
        self.result
    }
}

/// Mock haptics recording every pulse
#[derive(Debug, Default, Clone)]
pub struct MockHaptics {
    pulses: Vec<HapticPulse>,
    unsupported: bool,
}

impl MockHaptics {
    /// Create a recorder
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulate a device without a vibration motor
    pub fn unsupported() -> Self {
        Self {
            pulses: Vec::new(),
            unsupported: true,
        }
    }

    /// Pulses received so far
    pub fn pulses(&self) -> &[HapticPulse] {
        &self.pulses
    }
}

impl HapticOutput for MockHaptics {
    fn vibrate(&mut self, pulse: HapticPulse) -> Result<(), HapticError> {
        if self.unsupported {
            return Err(HapticError::Unsupported);
        }
        self.pulses.push(pulse);
        Ok(())
    }
}
