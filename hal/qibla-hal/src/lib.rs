//! Qibla Platform Abstraction Layer
//!
//! This crate defines the traits a host platform implements so the same
//! engine can run on any device that can report its orientation. The core
//! engine never talks to a platform API directly.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  qibla-runtime (session loop, effects)  │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  qibla-hal (this crate - traits)        │
//! └─────────────────────────────────────────┘
//!                     │
//!         ┌───────────┴───────────┐
//!         ▼                       ▼
//! ┌───────────────┐       ┌───────────────┐
//! │ platform glue │       │  mock (tests) │
//! └───────────────┘       └───────────────┘
//! ```
//!
//! # Traits
//!
//! - [`storage::KeyValueStore`] - Durable and session-scoped flags
//! - [`orientation::OrientationSensor`] - Orientation event subscription
//! - [`permission::PermissionPrompt`] - Asynchronous sensor permission grant
//! - [`geolocation::Geolocation`] - Asynchronous position lookup
//! - [`haptics::HapticOutput`] - Fire-and-forget vibration

#![no_std]
#![deny(unsafe_code)]

#[cfg(feature = "mock")]
extern crate std;

pub mod geolocation;
pub mod haptics;
#[cfg(feature = "mock")]
pub mod mock;
pub mod orientation;
pub mod permission;
pub mod storage;

// Re-export key traits at crate root for convenience
pub use geolocation::{Geolocation, GeolocationError, Position};
pub use haptics::{HapticError, HapticOutput, HapticPulse};
pub use orientation::{
    OrientationCapabilities, OrientationEventKind, OrientationReading, OrientationSensor,
    SubscribeError,
};
pub use permission::{PermissionError, PermissionPrompt, PermissionResponse};
pub use storage::{KeyValueStore, StorageError, StorageKey, StorageScope};
