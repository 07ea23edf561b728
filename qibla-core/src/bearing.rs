//! Qibla bearing and distance
//!
//! Initial great-circle bearing and haversine distance from the user's
//! position to the Kaaba. Computed in `f64`: positions are geodetic and the
//! `f32` rounding error at continental distances is several kilometres.

use libm::{atan2, cos, sin, sqrt};
use qibla_hal::Position;

use crate::angle::normalize_degrees;

/// Kaaba latitude (degrees)
pub const KAABA_LATITUDE: f64 = 21.422487;

/// Kaaba longitude (degrees)
pub const KAABA_LONGITUDE: f64 = 39.826206;

/// Mean Earth radius (km)
pub const EARTH_RADIUS_KM: f64 = 6371.0;

const DEG_TO_RAD: f64 = core::f64::consts::PI / 180.0;
const RAD_TO_DEG: f64 = 180.0 / core::f64::consts::PI;

/// Target direction and distance for the current position
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TargetBearing {
    /// Clockwise from true north, in [0, 360)
    pub bearing_deg: f32,
    /// Great-circle distance
    pub distance_km: f32,
}

/// Computes the target bearing for a position
pub trait BearingProvider {
    /// Initial bearing and distance from `position` to the target
    fn bearing_from(&self, position: Position) -> TargetBearing;
}

/// Great-circle bearing toward a fixed destination
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GreatCircle {
    destination: Position,
}

impl GreatCircle {
    /// Bearing provider toward an arbitrary destination
    pub const fn toward(destination: Position) -> Self {
        Self { destination }
    }

    /// Bearing provider toward the Kaaba
    pub const fn kaaba() -> Self {
        Self::toward(Position::new(KAABA_LATITUDE, KAABA_LONGITUDE))
    }
}

impl Default for GreatCircle {
    fn default() -> Self {
        Self::kaaba()
    }
}

impl BearingProvider for GreatCircle {
    fn bearing_from(&self, position: Position) -> TargetBearing {
        let (bearing, distance) = distance_bearing(position, self.destination);
        TargetBearing {
            bearing_deg: normalize_degrees(bearing as f32),
            distance_km: distance as f32,
        }
    }
}

/// Haversine distance (km) and initial bearing (degrees, (-180, 180])
fn distance_bearing(from: Position, to: Position) -> (f64, f64) {
    let lat1 = from.latitude * DEG_TO_RAD;
    let lat2 = to.latitude * DEG_TO_RAD;
    let dlat = lat2 - lat1;
    let dlon = (to.longitude - from.longitude) * DEG_TO_RAD;

    let half_dlat = sin(dlat / 2.0);
    let half_dlon = sin(dlon / 2.0);
    let a = half_dlat * half_dlat + cos(lat1) * cos(lat2) * half_dlon * half_dlon;
    let c = 2.0 * atan2(sqrt(a), sqrt(1.0 - a));

    let y = sin(dlon) * cos(lat2);
    let x = cos(lat1) * sin(lat2) - sin(lat1) * cos(lat2) * cos(dlon);

    (atan2(y, x) * RAD_TO_DEG, EARTH_RADIUS_KM * c)
}
