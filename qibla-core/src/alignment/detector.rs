//! Alignment detector
//!
//! Compares the smoothed heading to the target bearing on every change of
//! either. The device counts as aligned when the separation is at most the
//! threshold (inclusive). There is a single threshold, no enter/exit band.
//!
//! The detector never performs side effects itself. A false→true edge
//! yields an [`AlignmentEffect`] that the caller executes.

use crate::angle::angular_difference;

/// Side effect requested on an alignment edge
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AlignmentEffect {
    /// One short vibration
    HapticPulse,
}

/// Alignment state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AlignmentState {
    /// Heading is within the threshold of the bearing
    pub aligned: bool,
    /// Time of the last change of `aligned` (ms)
    pub last_transition_ms: Option<u64>,
}

/// Check a heading against a bearing
pub fn is_aligned(heading_deg: f32, bearing_deg: f32, threshold_deg: f32) -> bool {
    angular_difference(heading_deg, bearing_deg) <= threshold_deg
}

/// Edge-triggered alignment detector
#[derive(Debug, Clone)]
pub struct AlignmentDetector {
    threshold_deg: f32,
    state: AlignmentState,
}

impl AlignmentDetector {
    /// Create a detector with the given inclusive threshold
    pub fn new(threshold_deg: f32) -> Self {
        Self {
            threshold_deg,
            state: AlignmentState::default(),
        }
    }

    /// Current state
    pub fn state(&self) -> AlignmentState {
        self.state
    }

    /// Check if currently aligned
    pub fn is_aligned(&self) -> bool {
        self.state.aligned
    }

    /// Recompute alignment
    ///
    /// Returns an effect only on a false→true transition.
    pub fn evaluate(
        &mut self,
        heading_deg: f32,
        bearing_deg: f32,
        now_ms: u64,
    ) -> Option<AlignmentEffect> {
        let aligned = is_aligned(heading_deg, bearing_deg, self.threshold_deg);
        self.set(aligned, now_ms)
    }

    /// Force the not-aligned state (no bearing or no heading)
    pub fn clear(&mut self, now_ms: u64) {
        self.set(false, now_ms);
    }

    /// Forget all state without recording a transition
    pub fn reset(&mut self) {
        self.state = AlignmentState::default();
    }

    fn set(&mut self, aligned: bool, now_ms: u64) -> Option<AlignmentEffect> {
        if aligned == self.state.aligned {
            return None;
        }

        self.state = AlignmentState {
            aligned,
            last_transition_ms: Some(now_ms),
        };

        if aligned {
            Some(AlignmentEffect::HapticPulse)
        } else {
            None
        }
    }
}
