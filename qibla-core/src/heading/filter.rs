//! Unwrapping exponential heading filter
//!
//! Each accepted sample `r` is unwrapped against the current accumulated
//! heading along the shortest path, then a second accumulator follows it
//! with weight `α`:
//!
//! ```text
//! delta        = wrap_180(r − (accumulated mod 360))
//! accumulated += delta
//! smoothed    += (accumulated − smoothed) × α
//! ```
//!
//! Because neither accumulator is reduced modulo 360, crossing north never
//! produces a 359° → 0° flip in the animated value.

use crate::angle::{normalize_degrees, shortest_delta};
use crate::config::EngineConfig;
use crate::sensor::HeadingSample;

/// Internal filter state
///
/// Owned exclusively by [`HeadingFilter`]; zeroed on every (re)start.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SmoothingState {
    /// Unwrapped raw heading (degrees, unbounded)
    pub last_accumulated: f32,
    /// Smoothed unwrapped heading (degrees, unbounded)
    pub smoothed_accumulated: f32,
    /// Timestamp of the last accepted sample (ms)
    pub last_update_ms: u64,
}

/// Filter output after an accepted sample
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct HeadingEstimate {
    /// Smoothed heading in [0, 360) for display and comparison
    pub display_heading: f32,
    /// Smoothed unwrapped heading for continuous rotation animation
    pub continuous_rotation: f32,
}

/// Heading smoothing filter with an accept-rate cap
#[derive(Debug, Clone)]
pub struct HeadingFilter {
    smoothing_factor: f32,
    min_interval_ms: u64,
    state: SmoothingState,
    /// No sample accepted since the last reset
    primed: bool,
}

impl HeadingFilter {
    /// Create a filter
    ///
    /// # Arguments
    /// - `smoothing_factor`: weight of each new sample, in (0, 1]
    /// - `min_interval_ms`: samples closer than this to the last accepted
    ///   one are dropped
    pub fn new(smoothing_factor: f32, min_interval_ms: u64) -> Self {
        Self {
            smoothing_factor,
            min_interval_ms,
            state: SmoothingState::default(),
            primed: false,
        }
    }

    /// Create a filter from engine configuration
    pub fn from_config(config: &EngineConfig) -> Self {
        Self::new(config.smoothing_factor, u64::from(config.min_sample_interval_ms))
    }

    /// Zero all state
    ///
    /// The next sample is accepted unconditionally and seeds both
    /// accumulators, so a restart never animates from stale values.
    pub fn reset(&mut self) {
        self.state = SmoothingState::default();
        self.primed = false;
    }

    /// Current internal state
    pub fn state(&self) -> &SmoothingState {
        &self.state
    }

    /// Latest estimate, if any sample has been accepted since reset
    pub fn estimate(&self) -> Option<HeadingEstimate> {
        if self.primed {
            Some(self.current())
        } else {
            None
        }
    }

    /// Feed one raw sample
    ///
    /// Returns the new estimate, or `None` if the sample was rate-limited.
    /// Dropped samples are not queued.
    pub fn update(&mut self, sample: HeadingSample) -> Option<HeadingEstimate> {
        if !self.primed {
            self.state = SmoothingState {
                last_accumulated: sample.degrees,
                smoothed_accumulated: sample.degrees,
                last_update_ms: sample.timestamp_ms,
            };
            self.primed = true;
            return Some(self.current());
        }

        if self.is_rate_limited(sample.timestamp_ms) {
            return None;
        }

        let wrapped = normalize_degrees(self.state.last_accumulated);
        let delta = shortest_delta(wrapped, sample.degrees);

        self.state.last_accumulated += delta;
        self.state.smoothed_accumulated +=
            (self.state.last_accumulated - self.state.smoothed_accumulated) * self.smoothing_factor;
        self.state.last_update_ms = sample.timestamp_ms;

        Some(self.current())
    }

    /// A timestamp earlier than the last accepted one means the platform
    /// clock restarted; accept it and resynchronise.
    fn is_rate_limited(&self, timestamp_ms: u64) -> bool {
        timestamp_ms >= self.state.last_update_ms
            && timestamp_ms - self.state.last_update_ms < self.min_interval_ms
    }

    fn current(&self) -> HeadingEstimate {
        HeadingEstimate {
            display_heading: normalize_degrees(self.state.smoothed_accumulated),
            continuous_rotation: self.state.smoothed_accumulated,
        }
    }
}
