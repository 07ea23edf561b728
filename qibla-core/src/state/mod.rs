//! Permission state machine
//!
//! Governs when the sensor pipeline may run. The state machine is explicit,
//! finite, and deterministic.

pub mod events;
pub mod machine;

pub use events::PermissionEvent;
pub use machine::PermissionState;
