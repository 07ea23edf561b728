//! Configuration types
//!
//! Engine tuning parameters and the persisted flag record. Both are stored
//! through the platform key/value store as postcard binary data.

pub mod flags;
pub mod types;

pub use flags::*;
pub use types::*;
