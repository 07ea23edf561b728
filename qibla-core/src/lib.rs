//! Platform-agnostic core logic for the qibla alignment engine
//!
//! This crate contains all engine logic that does not depend on a specific
//! platform:
//!
//! - Circular angle arithmetic
//! - Orientation event normalisation (heading sources)
//! - Heading smoothing filter
//! - Sensor availability watchdog
//! - Alignment detection with edge-triggered effects
//! - Permission state machine and session lifecycle
//! - Qibla bearing computation
//! - Configuration and persisted flag types
//!
//! Nothing here blocks, allocates or reads a clock: time is always passed in
//! as milliseconds and side effects are returned to the caller.

#![no_std]
#![deny(unsafe_code)]

pub mod alignment;
pub mod angle;
pub mod bearing;
pub mod config;
pub mod engine;
pub mod error;
pub mod heading;
pub mod lifecycle;
pub mod safety;
pub mod sensor;
pub mod state;

pub use engine::{EngineEffect, EngineOutput, QiblaEngine};
pub use error::EngineError;
