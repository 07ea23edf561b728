//! Haptic output

/// A single vibration pulse request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct HapticPulse {
    /// Pulse length in milliseconds
    pub duration_ms: u16,
}

impl HapticPulse {
    /// Create a pulse of the given length
    pub const fn new(duration_ms: u16) -> Self {
        Self { duration_ms }
    }
}

/// Errors a haptic backend may report
///
/// Callers treat haptics as fire-and-forget; these exist so backends can
/// report without panicking, not so callers can recover.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum HapticError {
    /// Device has no vibration motor
    Unsupported,
    /// Platform refused the request (e.g. no user activation yet)
    Rejected,
}

/// Trait for vibration output
pub trait HapticOutput {
    /// Request a short vibration
    fn vibrate(&mut self, pulse: HapticPulse) -> Result<(), HapticError>;
}
