//! Permission state definition
//!
//! Whether sensors may run, and what the UI should show, is a function of
//! the current state only.

use super::events::PermissionEvent;

/// Permission states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PermissionState {
    /// Nothing asked yet, prompt visible
    #[default]
    Unrequested,
    /// Platform prompt in flight
    Requesting,
    /// Sensors may run
    Granted,
    /// User refused; prompt visible again
    Denied,
    /// Watchdog found no usable sensor; terminal until retry or reload
    SensorMissing,
}

impl PermissionState {
    /// Check if sensors may run in this state
    pub fn sensors_allowed(&self) -> bool {
        matches!(self, PermissionState::Granted)
    }

    /// Check if the UI should offer the permission prompt
    pub fn shows_prompt(&self) -> bool {
        matches!(self, PermissionState::Unrequested | PermissionState::Denied)
    }

    /// Check if this state needs an explicit user retry or reload
    pub fn is_terminal(&self) -> bool {
        matches!(self, PermissionState::SensorMissing)
    }

    /// Process an event and return the next state
    ///
    /// This is the core state transition logic. Events that do not apply
    /// to the current state leave it unchanged.
    pub fn transition(self, event: PermissionEvent) -> Self {
        use PermissionEvent::*;
        use PermissionState::*;

        match (self, event) {
            // Start-up
            (Unrequested, SessionResumed) => Granted,

            // Prompt flow
            (Unrequested, RequestStarted) => Requesting,
            (Denied, RequestStarted) => Requesting,
            // Platforms without a prompt grant straight from the prompt state
            (Unrequested, AccessGranted) => Granted,
            (Denied, AccessGranted) => Granted,
            (Requesting, AccessGranted) => Granted,
            (Requesting, AccessRefused) => Denied,
            (Requesting, RequestFailed) => Unrequested,

            // Watchdog
            (Granted, SensorTimeout) => SensorMissing,

            // Explicit retry
            (SensorMissing, Retry) => Granted,

            // Reset is allowed from anywhere
            (_, Reset) => Unrequested,

            // Default: stay in current state
            _ => self,
        }
    }
}
