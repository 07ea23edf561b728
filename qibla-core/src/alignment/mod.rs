//! Heading-to-bearing alignment detection

pub mod detector;

pub use detector::{is_aligned, AlignmentDetector, AlignmentEffect, AlignmentState};
