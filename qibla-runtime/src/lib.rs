//! Async session runtime for the qibla alignment engine
//!
//! Drives a [`qibla_core::QiblaEngine`] from platform events on a single
//! cooperative executor:
//! - Orientation readings and user commands arrive over per-session channels
//! - The watchdog deadline is awaited as a timer
//! - Haptic pulses and geolocation run as sibling futures
//! - The UI observes the latest [`qibla_core::EngineOutput`] through a signal

#![deny(unsafe_code)]

pub mod channels;
pub mod config;
pub mod logging;
pub mod session;
pub mod tasks;

pub use channels::{SessionChannels, UiCommand};
pub use session::{run_view, ViewSession};
