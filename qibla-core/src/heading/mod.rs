//! Heading smoothing
//!
//! Raw headings arrive at irregular and sometimes high rates, are noisy,
//! and jump discontinuously at the 0°/360° boundary. The filter in this
//! module unwraps them onto an unbounded axis, applies exponential
//! smoothing, and caps the accepted sample rate.

pub mod filter;

pub use filter::{HeadingEstimate, HeadingFilter, SmoothingState};
