//! One-shot sensor availability watchdog
//!
//! Armed when the sensor pipeline starts. If no valid sample is accepted
//! before the deadline, it expires exactly once. The first valid sample
//! satisfies it permanently until it is re-armed by an explicit retry.

/// Watchdog status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum WatchdogStatus {
    /// Not running
    Disarmed,
    /// Waiting for the first valid sample
    Armed {
        /// Expiry time (ms)
        deadline_ms: u64,
    },
    /// A valid sample arrived in time
    Satisfied,
    /// The deadline passed with no valid sample
    Expired,
}

/// Watchdog for the first valid orientation sample
#[derive(Debug, Clone)]
pub struct SensorWatchdog {
    timeout_ms: u64,
    status: WatchdogStatus,
}

impl SensorWatchdog {
    /// Create a disarmed watchdog
    pub fn new(timeout_ms: u32) -> Self {
        Self {
            timeout_ms: u64::from(timeout_ms),
            status: WatchdogStatus::Disarmed,
        }
    }

    /// Current status
    pub fn status(&self) -> WatchdogStatus {
        self.status
    }

    /// Start (or restart) the countdown from `now_ms`
    pub fn arm(&mut self, now_ms: u64) {
        self.status = WatchdogStatus::Armed {
            deadline_ms: now_ms.saturating_add(self.timeout_ms),
        };
    }

    /// Stop without expiring
    pub fn disarm(&mut self) {
        self.status = WatchdogStatus::Disarmed;
    }

    /// Record a valid sample
    ///
    /// Cancels a pending countdown; no effect in any other status.
    pub fn sample_received(&mut self) {
        if matches!(self.status, WatchdogStatus::Armed { .. }) {
            self.status = WatchdogStatus::Satisfied;
        }
    }

    /// Check the deadline
    ///
    /// Returns `true` exactly once, on the call that observes expiry.
    pub fn poll(&mut self, now_ms: u64) -> bool {
        match self.status {
            WatchdogStatus::Armed { deadline_ms } if now_ms >= deadline_ms => {
                self.status = WatchdogStatus::Expired;
                true
            }
            _ => false,
        }
    }

    /// Pending deadline, if armed
    pub fn deadline(&self) -> Option<u64> {
        match self.status {
            WatchdogStatus::Armed { deadline_ms } => Some(deadline_ms),
            _ => None,
        }
    }
}
