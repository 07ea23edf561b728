//! Configuration loading and parsing
//!
//! Loads engine tuning from the platform key/value store, falling back to
//! built-in defaults when nothing usable is stored.

pub mod loader;
pub mod toml;

pub use self::loader::{ConfigPersistence, LoadError};
pub use self::toml::{parse_config, render_config, ParseError};
