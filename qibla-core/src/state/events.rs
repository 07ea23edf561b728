//! Events that trigger permission state transitions

/// Events that can trigger permission state transitions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PermissionEvent {
    // Initialization
    /// Persisted grant and active session found at start-up
    SessionResumed,

    // User-initiated
    /// User asked for access; the platform prompt is being shown
    RequestStarted,
    /// User asked to retry after the sensor was reported missing
    Retry,

    // Platform answers
    /// Platform granted access, or needs no grant at all
    AccessGranted,
    /// User explicitly refused
    AccessRefused,
    /// The permission call threw or was rejected
    RequestFailed,

    // Watchdog
    /// No valid sample before the watchdog deadline
    SensorTimeout,

    // Session
    /// Full session reset
    Reset,
}

impl PermissionEvent {
    /// Check if this event is user-initiated
    pub fn is_user_event(&self) -> bool {
        matches!(self, PermissionEvent::RequestStarted | PermissionEvent::Retry)
    }

    /// Check if this event is an answer from the platform prompt
    pub fn is_platform_answer(&self) -> bool {
        matches!(
            self,
            PermissionEvent::AccessGranted
                | PermissionEvent::AccessRefused
                | PermissionEvent::RequestFailed
        )
    }
}
