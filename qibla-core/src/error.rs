//! Engine error taxonomy
//!
//! Every failure is local and non-fatal to the process. Only three reach
//! the user: the re-shown permission prompt, the "sensor not found" screen
//! and the dismissible location notice.

use core::fmt;

use qibla_hal::{GeolocationError, PermissionError};

/// Errors surfaced by the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum EngineError {
    /// User explicitly refused sensor access
    PermissionDenied,
    /// The permission call threw or was rejected
    PermissionRequestFailed,
    /// No valid orientation sample before the watchdog deadline
    SensorMissing,
    /// Position, and therefore bearing and distance, unobtainable
    GeolocationFailure,
    /// Orientation event without a usable heading field
    MalformedOrientationEvent,
}

impl EngineError {
    /// Check if the user can recover without reloading
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, EngineError::SensorMissing)
    }

    /// Check if the UI may offer to dismiss the notice
    pub fn is_dismissible(&self) -> bool {
        matches!(self, EngineError::GeolocationFailure)
    }

    /// Check if the error is ever shown to the user
    pub fn is_surfaced(&self) -> bool {
        !matches!(self, EngineError::MalformedOrientationEvent)
    }

    /// Human-readable status text
    pub fn message(&self) -> &'static str {
        match self {
            EngineError::PermissionDenied => "Compass access was denied",
            EngineError::PermissionRequestFailed => "Tap to enable the compass",
            EngineError::SensorMissing => "Compass sensor not found",
            EngineError::GeolocationFailure => "Could not determine your location",
            EngineError::MalformedOrientationEvent => "Unreadable orientation event",
        }
    }
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

impl From<PermissionError> for EngineError {
    fn from(_: PermissionError) -> Self {
        EngineError::PermissionRequestFailed
    }
}

impl From<GeolocationError> for EngineError {
    fn from(_: GeolocationError) -> Self {
        EngineError::GeolocationFailure
    }
}
