//! Per-session communication channels
//!
//! Everything in a view session runs on one executor, so the channels use
//! `NoopRawMutex` and are owned by the session rather than being statics.
//! Dropping the channels when the view closes drops any queued readings.

use embassy_sync::blocking_mutex::raw::NoopRawMutex;
use embassy_sync::channel::Channel;
use embassy_sync::signal::Signal;

use qibla_core::bearing::TargetBearing;
use qibla_core::EngineOutput;
use qibla_hal::{GeolocationError, HapticPulse, OrientationReading};

/// Channel capacity for orientation readings
///
/// Platforms deliver events far faster than the filter accepts them, so a
/// full channel drops the newest reading instead of blocking the callback.
pub const READING_CHANNEL_SIZE: usize = 16;

/// Channel capacity for UI commands
pub const COMMAND_CHANNEL_SIZE: usize = 4;

/// User actions from the view
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum UiCommand {
    /// Tap on the permission prompt
    RequestAccess,
    /// Tap on "try again" after the sensor was reported missing
    Retry,
    /// Close the location notice
    DismissStatus,
    /// Forget the session grant and show the prompt again
    ResetSession,
    /// The view is closing
    Leave,
}

/// Result of one geolocation attempt
pub type TargetUpdate = Result<TargetBearing, GeolocationError>;

/// Channels and signals shared between one session's futures
pub struct SessionChannels {
    /// Orientation events from the platform callback
    pub readings: Channel<NoopRawMutex, OrientationReading, READING_CHANNEL_SIZE>,
    /// User actions
    pub commands: Channel<NoopRawMutex, UiCommand, COMMAND_CHANNEL_SIZE>,
    /// Latest engine snapshot for the UI
    pub output: Signal<NoopRawMutex, EngineOutput>,
    /// Geolocation result
    pub target: Signal<NoopRawMutex, TargetUpdate>,
    /// Pending haptic pulse
    pub haptic: Signal<NoopRawMutex, HapticPulse>,
}

impl SessionChannels {
    /// Create empty channels
    pub const fn new() -> Self {
        Self {
            readings: Channel::new(),
            commands: Channel::new(),
            output: Signal::new(),
            target: Signal::new(),
            haptic: Signal::new(),
        }
    }

    /// Queue a reading from the platform callback
    ///
    /// Returns `false` if the reading was dropped because the queue is full.
    pub fn push_reading(&self, reading: OrientationReading) -> bool {
        self.readings.try_send(reading).is_ok()
    }

    /// Queue a user action
    pub async fn command(&self, command: UiCommand) {
        self.commands.send(command).await;
    }
}

impl Default for SessionChannels {
    fn default() -> Self {
        Self::new()
    }
}
