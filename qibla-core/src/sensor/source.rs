//! Heading source adapters

use qibla_hal::{OrientationCapabilities, OrientationEventKind, OrientationReading};

use crate::angle::{normalize_degrees, FULL_TURN_DEG};

/// A raw heading extracted from one orientation event
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct HeadingSample {
    /// Heading in [0, 360), clockwise from north
    pub degrees: f32,
    /// Timestamp of the originating event (ms)
    pub timestamp_ms: u64,
}

/// Trait for turning orientation payloads into headings
///
/// Implementations return `None` for events they cannot interpret. Such
/// events are dropped without touching any engine state.
pub trait HeadingSource {
    /// Event variant this source subscribes to
    fn event_kind(&self) -> OrientationEventKind;

    /// Extract a heading from a reading
    fn parse(&self, reading: &OrientationReading) -> Option<HeadingSample>;
}

/// Source for platforms that expose a compass heading directly
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CompassHeadingSource {
    kind: OrientationEventKind,
}

impl CompassHeadingSource {
    /// Create a source for the given event variant
    pub const fn new(kind: OrientationEventKind) -> Self {
        Self { kind }
    }
}

impl HeadingSource for CompassHeadingSource {
    fn event_kind(&self) -> OrientationEventKind {
        self.kind
    }

    fn parse(&self, reading: &OrientationReading) -> Option<HeadingSample> {
        // Some platforms omit the compass field on individual events while
        // still sending alpha; fall back rather than lose the sample.
        compass_degrees(reading)
            .or_else(|| alpha_degrees(reading))
            .map(|degrees| HeadingSample {
                degrees,
                timestamp_ms: reading.timestamp_ms,
            })
    }
}

/// Source for platforms that only report rotation around the vertical axis
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AlphaHeadingSource {
    kind: OrientationEventKind,
}

impl AlphaHeadingSource {
    /// Create a source for the given event variant
    pub const fn new(kind: OrientationEventKind) -> Self {
        Self { kind }
    }
}

impl HeadingSource for AlphaHeadingSource {
    fn event_kind(&self) -> OrientationEventKind {
        self.kind
    }

    fn parse(&self, reading: &OrientationReading) -> Option<HeadingSample> {
        alpha_degrees(reading).map(|degrees| HeadingSample {
            degrees,
            timestamp_ms: reading.timestamp_ms,
        })
    }
}

/// The adapter picked at subscribe time
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SelectedSource {
    Compass(CompassHeadingSource),
    Alpha(AlphaHeadingSource),
}

impl HeadingSource for SelectedSource {
    fn event_kind(&self) -> OrientationEventKind {
        match self {
            SelectedSource::Compass(s) => s.event_kind(),
            SelectedSource::Alpha(s) => s.event_kind(),
        }
    }

    fn parse(&self, reading: &OrientationReading) -> Option<HeadingSample> {
        match self {
            SelectedSource::Compass(s) => s.parse(reading),
            SelectedSource::Alpha(s) => s.parse(reading),
        }
    }
}

/// Pick the most capable source the platform offers
///
/// Absolute events are preferred over relative ones; a native compass
/// heading is preferred over a derived one.
pub fn select_source(capabilities: &OrientationCapabilities) -> SelectedSource {
    let kind = if capabilities.absolute_events {
        OrientationEventKind::Absolute
    } else {
        OrientationEventKind::Relative
    };

    if capabilities.compass_heading {
        SelectedSource::Compass(CompassHeadingSource::new(kind))
    } else {
        SelectedSource::Alpha(AlphaHeadingSource::new(kind))
    }
}

fn compass_degrees(reading: &OrientationReading) -> Option<f32> {
    reading
        .compass_heading
        .filter(|h| h.is_finite())
        .map(normalize_degrees)
}

/// Alpha grows counter-clockwise; compass headings grow clockwise.
fn alpha_degrees(reading: &OrientationReading) -> Option<f32> {
    reading
        .alpha
        .filter(|a| a.is_finite())
        .map(|a| normalize_degrees(FULL_TURN_DEG - a))
}

#[cfg(test)]
mod tests {
    use super::*;
    use OrientationEventKind::{Absolute, Relative};

    #[test]
    fn test_select_prefers_absolute_compass() {
        let caps = OrientationCapabilities {
            absolute_events: true,
            compass_heading: true,
            requires_permission: false,
        };
        let source = select_source(&caps);
        assert_eq!(source, SelectedSource::Compass(CompassHeadingSource::new(Absolute)));
        assert_eq!(source.event_kind(), Absolute);
    }

    #[test]
    fn test_select_falls_back_to_relative_alpha() {
        let caps = OrientationCapabilities {
            absolute_events: false,
            compass_heading: false,
            requires_permission: false,
        };
        let source = select_source(&caps);
        assert_eq!(source, SelectedSource::Alpha(AlphaHeadingSource::new(Relative)));
    }

    #[test]
    fn test_compass_heading_used_directly() {
        let source = CompassHeadingSource::new(Absolute);
        let sample = source
            .parse(&OrientationReading::compass(Absolute, 100, 42.5))
            .unwrap();
        assert_eq!(sample.degrees, 42.5);
        assert_eq!(sample.timestamp_ms, 100);
    }

    #[test]
    fn test_alpha_sign_is_compensated() {
        let source = AlphaHeadingSource::new(Absolute);

        // Turning clockwise decreases alpha, so the heading must increase
        let a = source.parse(&OrientationReading::alpha(Absolute, 0, 350.0)).unwrap();
        let b = source.parse(&OrientationReading::alpha(Absolute, 50, 340.0)).unwrap();
        assert_eq!(a.degrees, 10.0);
        assert_eq!(b.degrees, 20.0);

        let north = source.parse(&OrientationReading::alpha(Absolute, 0, 0.0)).unwrap();
        assert_eq!(north.degrees, 0.0);
    }

    #[test]
    fn test_compass_source_falls_back_to_alpha() {
        let source = CompassHeadingSource::new(Absolute);
        let sample = source.parse(&OrientationReading::alpha(Absolute, 0, 270.0)).unwrap();
        assert_eq!(sample.degrees, 90.0);
    }

    #[test]
    fn test_unusable_events_are_dropped() {
        let compass = CompassHeadingSource::new(Absolute);
        let alpha = AlphaHeadingSource::new(Absolute);

        assert!(compass.parse(&OrientationReading::empty(Absolute, 0)).is_none());
        assert!(alpha.parse(&OrientationReading::empty(Absolute, 0)).is_none());
        assert!(alpha
            .parse(&OrientationReading::alpha(Absolute, 0, f32::NAN))
            .is_none());
        assert!(compass
            .parse(&OrientationReading::compass(Absolute, 0, f32::INFINITY))
            .is_none());
    }

    #[test]
    fn test_alpha_source_ignores_compass_field() {
        let alpha = AlphaHeadingSource::new(Relative);
        assert!(alpha
            .parse(&OrientationReading::compass(Relative, 0, 10.0))
            .is_none());
    }
}
