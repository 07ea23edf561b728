//! Sensor availability monitoring
//!
//! Detects devices without a usable orientation sensor.

pub mod watchdog;

pub use watchdog::{SensorWatchdog, WatchdogStatus};
