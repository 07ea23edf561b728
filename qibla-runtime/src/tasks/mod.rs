//! Session helper tasks
//!
//! Futures that run alongside the session loop on the same executor:
//! - Haptic pulse executor
//! - One-shot geolocation resolution

pub mod geolocation;
pub mod haptic;

pub use geolocation::geolocation_task;
pub use haptic::haptic_task;
