//! Orientation sensor abstractions
//!
//! Platforms report orientation in inconsistent shapes: some expose a
//! ready-made compass heading, others only the rotation around the vertical
//! axis (`alpha`), with the opposite sign convention. This module carries the
//! raw payload as-is; normalisation happens in the core engine.

/// Orientation event variant
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum OrientationEventKind {
    /// Referenced to the Earth's frame (preferred)
    Absolute,
    /// Referenced to an arbitrary starting frame
    Relative,
}

/// Raw orientation payload as delivered by the platform
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct OrientationReading {
    /// Which event variant produced this reading
    pub kind: OrientationEventKind,
    /// Monotonic timestamp in milliseconds
    pub timestamp_ms: u64,
    /// Compass heading in degrees, clockwise from north, if exposed
    pub compass_heading: Option<f32>,
    /// Rotation around the vertical axis in degrees (counter-clockwise)
    pub alpha: Option<f32>,
}

impl OrientationReading {
    /// Reading carrying a compass heading
    pub const fn compass(kind: OrientationEventKind, timestamp_ms: u64, heading: f32) -> Self {
        Self {
            kind,
            timestamp_ms,
            compass_heading: Some(heading),
            alpha: None,
        }
    }

    /// Reading carrying only an alpha rotation
    pub const fn alpha(kind: OrientationEventKind, timestamp_ms: u64, alpha: f32) -> Self {
        Self {
            kind,
            timestamp_ms,
            compass_heading: None,
            alpha: Some(alpha),
        }
    }

    /// Reading with no usable field
    pub const fn empty(kind: OrientationEventKind, timestamp_ms: u64) -> Self {
        Self {
            kind,
            timestamp_ms,
            compass_heading: None,
            alpha: None,
        }
    }
}

/// What the platform's orientation API offers, probed once at start
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct OrientationCapabilities {
    /// Absolute orientation events are available
    pub absolute_events: bool,
    /// Readings carry a compass heading field
    pub compass_heading: bool,
    /// An explicit asynchronous permission grant is required
    pub requires_permission: bool,
}

impl Default for OrientationCapabilities {
    fn default() -> Self {
        Self {
            absolute_events: true,
            compass_heading: false,
            requires_permission: false,
        }
    }
}

/// Errors from subscribing to orientation events
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SubscribeError {
    /// The requested event variant does not exist on this platform
    Unsupported,
    /// Subscribing was refused (usually a missing permission)
    NotAllowed,
}

/// Trait for orientation event sources
///
/// Readings are pushed by the platform into the session's reading channel;
/// this trait only controls the subscription.
pub trait OrientationSensor {
    /// Probe what the platform offers
    fn capabilities(&self) -> OrientationCapabilities;

    /// Start delivering events of the given variant
    fn subscribe(&mut self, kind: OrientationEventKind) -> Result<(), SubscribeError>;

    /// Stop delivering events. Must be synchronous and idempotent.
    fn unsubscribe(&mut self);
}
