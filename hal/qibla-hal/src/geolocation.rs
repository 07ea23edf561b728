//! Geolocation abstraction

use core::future::Future;

/// Geographic position in decimal degrees
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Position {
    /// Latitude, positive north
    pub latitude: f64,
    /// Longitude, positive east
    pub longitude: f64,
}

impl Position {
    /// Create a position
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

/// Errors from a position lookup
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum GeolocationError {
    /// User refused location access
    PermissionDenied,
    /// No fix could be obtained
    Unavailable,
    /// The platform gave up waiting for a fix
    Timeout,
}

/// Trait for asynchronous position providers
pub trait Geolocation {
    /// Resolve the current position once
    fn current_position(&mut self) -> impl Future<Output = Result<Position, GeolocationError>>;
}
