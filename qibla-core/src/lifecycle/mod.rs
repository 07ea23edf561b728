//! Permission and session lifecycle

pub mod manager;

pub use manager::{LifecycleAction, LifecycleManager};
