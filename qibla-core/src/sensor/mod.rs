//! Orientation event normalisation
//!
//! Converts platform orientation payloads into a single raw heading. The
//! adapter is chosen once, when the pipeline subscribes, by probing the
//! platform's capabilities.

pub mod source;

pub use source::{
    select_source, AlphaHeadingSource, CompassHeadingSource, HeadingSample, HeadingSource,
    SelectedSource,
};
