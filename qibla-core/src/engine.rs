//! Engine facade coordinating the heading pipeline for one view session
//!
//! The engine is the single owner of all per-view state:
//! - Permission lifecycle and persisted flags
//! - Selected heading source
//! - Smoothing filter
//! - Sensor watchdog
//! - Alignment detector
//! - Current target bearing
//!
//! It never touches the platform. Subscriptions and haptic pulses are
//! queued as [`EngineEffect`]s for the caller to execute, and the UI reads
//! an [`EngineOutput`] snapshot after every change.

use heapless::Deque;
use qibla_hal::{
    GeolocationError, HapticPulse, KeyValueStore, OrientationCapabilities, OrientationEventKind,
    OrientationReading, PermissionError, PermissionResponse, StorageError,
};

use crate::alignment::{AlignmentDetector, AlignmentEffect, AlignmentState};
use crate::angle::normalize_degrees;
use crate::bearing::TargetBearing;
use crate::config::EngineConfig;
use crate::error::EngineError;
use crate::heading::{HeadingEstimate, HeadingFilter};
use crate::lifecycle::{LifecycleAction, LifecycleManager};
use crate::safety::SensorWatchdog;
use crate::sensor::{select_source, HeadingSource, SelectedSource};
use crate::state::PermissionState;

/// Maximum queued effects between drains
pub const MAX_PENDING_EFFECTS: usize = 8;

/// Platform action requested by the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum EngineEffect {
    /// Subscribe to orientation events of this variant
    Subscribe(OrientationEventKind),
    /// Remove the orientation subscription
    Unsubscribe,
    /// Vibrate once; failures are ignored
    Haptic(HapticPulse),
    /// A permission flag could not be written or cleared
    ///
    /// The view keeps running; the next one may prompt again.
    StorageFault(StorageError),
}

/// Snapshot of everything the UI renders
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct EngineOutput {
    /// Smoothed heading in [0, 360); 0 until the first sample
    pub display_heading: f32,
    /// Smoothed unwrapped heading for continuous rotation
    pub continuous_rotation: f32,
    /// Heading is within the alignment threshold of the bearing
    pub aligned: bool,
    /// Bearing relative to heading in [0, 360), if both are known
    pub needle_rotation: Option<f32>,
    /// Distance to the target, if the position is known
    pub distance_km: Option<f32>,
    /// Permission state
    pub permission: PermissionState,
    /// Notice to show, if any
    pub status: Option<EngineError>,
}

/// Qibla heading engine for one view session
pub struct QiblaEngine<S> {
    config: EngineConfig,
    capabilities: OrientationCapabilities,
    lifecycle: LifecycleManager<S>,
    /// Active heading source; `None` while the pipeline is stopped
    source: Option<SelectedSource>,
    filter: HeadingFilter,
    watchdog: SensorWatchdog,
    detector: AlignmentDetector,
    target: Option<TargetBearing>,
    heading: Option<HeadingEstimate>,
    /// Permission or sensor notice
    status: Option<EngineError>,
    /// Location notice, shown whenever no other notice is
    location_error: Option<EngineError>,
    effects: Deque<EngineEffect, MAX_PENDING_EFFECTS>,
}

impl<S: KeyValueStore> QiblaEngine<S> {
    /// Create an engine
    ///
    /// The configuration is used as given; validate it before calling.
    pub fn new(config: EngineConfig, capabilities: OrientationCapabilities, store: S) -> Self {
        Self {
            config,
            capabilities,
            lifecycle: LifecycleManager::new(store),
            source: None,
            filter: HeadingFilter::from_config(&config),
            watchdog: SensorWatchdog::new(config.sensor_timeout_ms),
            detector: AlignmentDetector::new(config.alignment_threshold_deg),
            target: None,
            heading: None,
            status: None,
            location_error: None,
            effects: Deque::new(),
        }
    }

    /// Resume a session granted earlier in this run, or show the prompt
    ///
    /// Returns `true` if the sensor pipeline started.
    pub fn initialize(&mut self, now_ms: u64) -> bool {
        let action = self.lifecycle.check_persisted();
        self.act(action, now_ms)
    }

    /// User asked for sensor access
    ///
    /// Returns `true` if the caller must now await the platform permission
    /// prompt and report the answer through [`Self::complete_request`].
    /// Platforms without a prompt are granted on the spot.
    pub fn begin_request(&mut self, now_ms: u64) -> bool {
        match self
            .lifecycle
            .begin_request(self.capabilities.requires_permission)
        {
            LifecycleAction::AwaitPlatform => {
                self.clear_permission_status();
                true
            }
            action => {
                self.act(action, now_ms);
                false
            }
        }
    }

    /// Report the platform permission prompt's answer
    pub fn complete_request(
        &mut self,
        outcome: Result<PermissionResponse, PermissionError>,
        now_ms: u64,
    ) -> Result<(), EngineError> {
        match self.lifecycle.complete_request(outcome) {
            Ok(action) => {
                self.act(action, now_ms);
                Ok(())
            }
            Err(e) => {
                self.report_storage_fault();
                self.status = Some(e);
                Err(e)
            }
        }
    }

    /// Feed one orientation event
    ///
    /// Events the selected source cannot interpret are dropped and reported
    /// as [`EngineError::MalformedOrientationEvent`]. They change no state,
    /// in particular they do not satisfy the watchdog. Events arriving while
    /// the pipeline is stopped, or of another variant, are ignored.
    ///
    /// The reading's own timestamp drives the rate cap; `now_ms` stamps
    /// alignment transitions on the same clock as every other call.
    pub fn handle_reading(
        &mut self,
        reading: &OrientationReading,
        now_ms: u64,
    ) -> Result<(), EngineError> {
        let Some(source) = self.source else {
            return Ok(());
        };
        if reading.kind != source.event_kind() {
            return Ok(());
        }

        let sample = source
            .parse(reading)
            .ok_or(EngineError::MalformedOrientationEvent)?;
        self.watchdog.sample_received();

        if let Some(estimate) = self.filter.update(sample) {
            self.heading = Some(estimate);
            self.evaluate_alignment(now_ms);
        }
        Ok(())
    }

    /// Check the watchdog deadline
    ///
    /// Returns `true` on the call that declares the sensor missing. The
    /// pipeline is stopped and stays stopped until [`Self::retry`].
    pub fn poll_watchdog(&mut self, now_ms: u64) -> bool {
        if !self.watchdog.poll(now_ms) || !self.lifecycle.sensor_timeout() {
            return false;
        }

        self.stop_pipeline();
        self.detector.clear(now_ms);
        self.status = Some(EngineError::SensorMissing);
        true
    }

    /// Pending watchdog deadline (ms), if armed
    pub fn watchdog_deadline(&self) -> Option<u64> {
        self.watchdog.deadline()
    }

    /// Explicit user retry after the sensor was reported missing
    ///
    /// Returns `true` if the pipeline restarted.
    pub fn retry(&mut self, now_ms: u64) -> bool {
        let action = self.lifecycle.retry();
        self.act(action, now_ms)
    }

    /// Replace the target bearing after a successful position fix
    pub fn set_target(&mut self, target: TargetBearing, now_ms: u64) {
        self.target = Some(target);
        self.location_error = None;
        self.evaluate_alignment(now_ms);
    }

    /// Record a failed position fix
    ///
    /// Any previous target is kept and the heading keeps running. The
    /// notice waits behind a permission or sensor notice and shows once
    /// that one clears.
    pub fn geolocation_failed(&mut self, error: GeolocationError) -> EngineError {
        let error = EngineError::from(error);
        self.location_error = Some(error);
        error
    }

    /// Clear a dismissible notice
    ///
    /// Returns `true` if a notice was cleared.
    pub fn dismiss_status(&mut self) -> bool {
        match self.status {
            Some(e) if e.is_dismissible() => {
                self.status = None;
                true
            }
            Some(_) => false,
            None => self.location_error.take().is_some(),
        }
    }

    /// Leave the view: unsubscribe and disarm, keep the persisted grant
    pub fn teardown(&mut self) {
        self.lifecycle.teardown();
        self.stop_pipeline();
        self.detector.reset();
    }

    /// Full session reset: stop everything and clear the persisted flags
    ///
    /// A pending location notice survives; the position is still unknown.
    pub fn reset_session(&mut self) {
        self.stop_pipeline();
        self.lifecycle.reset_session();
        self.report_storage_fault();
        self.filter.reset();
        self.detector.reset();
        self.heading = None;
        self.status = None;
    }

    /// Snapshot for the UI
    pub fn output(&self) -> EngineOutput {
        let heading = self.heading;
        EngineOutput {
            display_heading: heading.map_or(0.0, |h| h.display_heading),
            continuous_rotation: heading.map_or(0.0, |h| h.continuous_rotation),
            aligned: self.detector.is_aligned(),
            needle_rotation: heading
                .zip(self.target)
                .map(|(h, t)| normalize_degrees(t.bearing_deg - h.display_heading)),
            distance_km: self.target.map(|t| t.distance_km),
            permission: self.lifecycle.state(),
            status: self.status.or(self.location_error),
        }
    }

    /// Take the oldest queued effect
    pub fn pop_effect(&mut self) -> Option<EngineEffect> {
        self.effects.pop_front()
    }

    /// Current permission state
    pub fn permission(&self) -> PermissionState {
        self.lifecycle.state()
    }

    /// Check if the sensor pipeline is running
    pub fn is_running(&self) -> bool {
        self.source.is_some()
    }

    /// Latest heading estimate
    pub fn heading(&self) -> Option<HeadingEstimate> {
        self.heading
    }

    /// Alignment state and the time of its last transition
    pub fn alignment(&self) -> AlignmentState {
        self.detector.state()
    }

    /// Current target bearing
    pub fn target(&self) -> Option<TargetBearing> {
        self.target
    }

    /// Active configuration
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Platform capabilities the engine was created with
    pub fn capabilities(&self) -> OrientationCapabilities {
        self.capabilities
    }

    /// Access the persistence store
    pub fn store(&self) -> &S {
        self.lifecycle.store()
    }

    /// Mutable access to the persistence store
    pub fn store_mut(&mut self) -> &mut S {
        self.lifecycle.store_mut()
    }

    /// Consume the engine and return the store
    pub fn into_store(self) -> S {
        self.lifecycle.into_store()
    }

    fn act(&mut self, action: LifecycleAction, now_ms: u64) -> bool {
        self.report_storage_fault();
        match action {
            LifecycleAction::StartSensors => {
                self.start_pipeline(now_ms);
                true
            }
            LifecycleAction::None | LifecycleAction::ShowPrompt | LifecycleAction::AwaitPlatform => {
                false
            }
        }
    }

    fn start_pipeline(&mut self, now_ms: u64) {
        let source = select_source(&self.capabilities);
        self.source = Some(source);
        self.filter.reset();
        self.detector.reset();
        self.heading = None;
        self.watchdog.arm(now_ms);
        self.clear_permission_status();
        if self.status == Some(EngineError::SensorMissing) {
            self.status = None;
        }
        self.push_effect(EngineEffect::Subscribe(source.event_kind()));
    }

    fn stop_pipeline(&mut self) {
        self.watchdog.disarm();
        if self.source.take().is_some() {
            self.push_effect(EngineEffect::Unsubscribe);
        }
    }

    fn evaluate_alignment(&mut self, now_ms: u64) {
        let effect = match (self.heading, self.target) {
            (Some(heading), Some(target)) => {
                self.detector
                    .evaluate(heading.display_heading, target.bearing_deg, now_ms)
            }
            _ => {
                self.detector.clear(now_ms);
                None
            }
        };

        if let Some(AlignmentEffect::HapticPulse) = effect {
            self.push_effect(EngineEffect::Haptic(HapticPulse::new(
                self.config.haptic_pulse_ms,
            )));
        }
    }

    fn clear_permission_status(&mut self) {
        if matches!(
            self.status,
            Some(EngineError::PermissionDenied | EngineError::PermissionRequestFailed)
        ) {
            self.status = None;
        }
    }

    fn report_storage_fault(&mut self) {
        if let Some(e) = self.lifecycle.take_storage_fault() {
            self.push_effect(EngineEffect::StorageFault(e));
        }
    }

    fn push_effect(&mut self, effect: EngineEffect) {
        // The caller drains after every call, so the queue only fills if
        // it stops draining; newer effects are dropped then.
        let _ = self.effects.push_back(effect);
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::*;
    use crate::config::{read_flag, write_flag};
    use libm::fabsf;
    use qibla_hal::mock::MockStore;
    use qibla_hal::StorageKey;

    const KIND: OrientationEventKind = OrientationEventKind::Absolute;

    fn prompting() -> OrientationCapabilities {
        OrientationCapabilities {
            absolute_events: true,
            compass_heading: true,
            requires_permission: true,
        }
    }

    fn no_prompt() -> OrientationCapabilities {
        OrientationCapabilities {
            absolute_events: true,
            compass_heading: false,
            requires_permission: false,
        }
    }

    fn engine(capabilities: OrientationCapabilities) -> QiblaEngine<MockStore> {
        QiblaEngine::new(EngineConfig::default(), capabilities, MockStore::new())
    }

    fn resumed_store() -> MockStore {
        let mut store = MockStore::new();
        write_flag(&mut store, StorageKey::PermissionGranted, true).unwrap();
        write_flag(&mut store, StorageKey::SessionActive, true).unwrap();
        store
    }

    fn running(capabilities: OrientationCapabilities) -> QiblaEngine<MockStore> {
        let mut e = QiblaEngine::new(EngineConfig::default(), capabilities, resumed_store());
        assert!(e.initialize(0));
        drain(&mut e);
        e
    }

    fn drain(e: &mut QiblaEngine<MockStore>) -> std::vec::Vec<EngineEffect> {
        core::iter::from_fn(|| e.pop_effect()).collect()
    }

    fn target(bearing_deg: f32) -> TargetBearing {
        TargetBearing {
            bearing_deg,
            distance_km: 4793.8,
        }
    }

    #[test]
    fn test_fresh_session_shows_prompt() {
        let mut e = engine(prompting());
        assert!(!e.initialize(0));
        assert_eq!(e.permission(), PermissionState::Unrequested);
        assert!(e.pop_effect().is_none());
        assert_eq!(e.watchdog_deadline(), None);
    }

    #[test]
    fn test_resumed_session_subscribes_and_arms() {
        let mut e = QiblaEngine::new(EngineConfig::default(), prompting(), resumed_store());
        assert!(e.initialize(1_000));
        assert_eq!(drain(&mut e), [EngineEffect::Subscribe(KIND)]);
        assert_eq!(e.watchdog_deadline(), Some(11_000));
        assert_eq!(e.permission(), PermissionState::Granted);
    }

    #[test]
    fn test_prompt_flow_grants_and_persists() {
        let mut e = engine(prompting());
        e.initialize(0);

        assert!(e.begin_request(100));
        assert_eq!(e.permission(), PermissionState::Requesting);
        assert!(e.pop_effect().is_none());

        assert_eq!(e.complete_request(Ok(PermissionResponse::Granted), 200), Ok(()));
        assert_eq!(drain(&mut e), [EngineEffect::Subscribe(KIND)]);
        assert_eq!(e.watchdog_deadline(), Some(10_200));
        assert!(read_flag(e.store_mut(), StorageKey::PermissionGranted));
        assert!(read_flag(e.store_mut(), StorageKey::SessionActive));
    }

    #[test]
    fn test_no_prompt_platform_starts_immediately() {
        let mut e = engine(no_prompt());
        assert!(!e.begin_request(0));
        assert_eq!(drain(&mut e), [EngineEffect::Subscribe(KIND)]);
        assert!(e.is_running());
    }

    #[test]
    fn test_refusal_surfaces_status_and_reprompts() {
        let mut e = engine(prompting());
        e.begin_request(0);
        let result = e.complete_request(Ok(PermissionResponse::Denied), 10);

        assert_eq!(result, Err(EngineError::PermissionDenied));
        let out = e.output();
        assert_eq!(out.status, Some(EngineError::PermissionDenied));
        assert!(out.permission.shows_prompt());
        assert!(!e.is_running());

        // Asking again clears the notice
        assert!(e.begin_request(20));
        assert_eq!(e.output().status, None);
    }

    #[test]
    fn test_failed_request_persists_nothing() {
        let mut e = engine(prompting());
        e.begin_request(0);
        let result = e.complete_request(Err(PermissionError::NoUserGesture), 10);

        assert_eq!(result, Err(EngineError::PermissionRequestFailed));
        assert_eq!(e.permission(), PermissionState::Unrequested);
        assert!(e.store().raw(StorageKey::PermissionGranted).is_none());
        assert!(e.store().raw(StorageKey::SessionActive).is_none());
    }

    #[test]
    fn test_auto_start_and_manual_request_do_not_double_start() {
        let mut e = running(prompting());
        assert!(!e.begin_request(50));
        assert!(e.pop_effect().is_none());
    }

    #[test]
    fn test_reading_updates_heading_and_cancels_watchdog() {
        let mut e = running(prompting());
        let reading = OrientationReading::compass(KIND, 100, 42.0);

        assert_eq!(e.handle_reading(&reading, 100), Ok(()));
        assert_eq!(e.output().display_heading, 42.0);
        assert_eq!(e.watchdog_deadline(), None);
        assert!(!e.poll_watchdog(20_000));
    }

    #[test]
    fn test_alpha_source_inverts_rotation() {
        let mut e = running(no_prompt());
        e.handle_reading(&OrientationReading::alpha(KIND, 0, 90.0), 0)
            .unwrap();
        assert_eq!(e.output().display_heading, 270.0);
    }

    #[test]
    fn test_malformed_reading_dropped_without_cancelling_watchdog() {
        let mut e = running(prompting());
        let result = e.handle_reading(&OrientationReading::empty(KIND, 100), 100);

        assert_eq!(result, Err(EngineError::MalformedOrientationEvent));
        assert_eq!(e.output().status, None);
        assert_eq!(e.heading(), None);
        assert_eq!(e.watchdog_deadline(), Some(10_000));
    }

    #[test]
    fn test_reading_of_other_variant_ignored() {
        let mut e = running(prompting());
        let reading = OrientationReading::compass(OrientationEventKind::Relative, 100, 42.0);
        assert_eq!(e.handle_reading(&reading, 100), Ok(()));
        assert_eq!(e.heading(), None);
    }

    #[test]
    fn test_watchdog_declares_sensor_missing_once() {
        let mut e = running(prompting());

        assert!(!e.poll_watchdog(9_999));
        assert!(e.poll_watchdog(10_000));
        assert!(!e.poll_watchdog(10_001));
        assert!(!e.poll_watchdog(50_000));

        assert_eq!(drain(&mut e), [EngineEffect::Unsubscribe]);
        let out = e.output();
        assert_eq!(out.permission, PermissionState::SensorMissing);
        assert_eq!(out.status, Some(EngineError::SensorMissing));
        assert!(!e.is_running());

        // Late readings have nowhere to go
        e.handle_reading(&OrientationReading::compass(KIND, 10_100, 1.0), 10_100)
            .unwrap();
        assert_eq!(e.heading(), None);
    }

    #[test]
    fn test_sensor_missing_ignores_requests_until_retry() {
        let mut e = running(prompting());
        e.poll_watchdog(10_000);
        drain(&mut e);

        assert!(!e.begin_request(11_000));
        assert!(e.pop_effect().is_none());

        assert!(e.retry(12_000));
        assert_eq!(drain(&mut e), [EngineEffect::Subscribe(KIND)]);
        assert_eq!(e.watchdog_deadline(), Some(22_000));
        assert_eq!(e.output().status, None);
        assert_eq!(e.permission(), PermissionState::Granted);
    }

    #[test]
    fn test_retry_outside_sensor_missing_does_nothing() {
        let mut e = running(prompting());
        assert!(!e.retry(100));
        assert!(e.pop_effect().is_none());
    }

    #[test]
    fn test_alignment_pulses_on_each_rising_edge() {
        let mut e = running(prompting());
        e.set_target(target(119.0), 0);

        // First sample seeds the filter exactly on the bearing
        e.handle_reading(&OrientationReading::compass(KIND, 0, 119.0), 0)
            .unwrap();
        assert!(e.output().aligned);
        assert_eq!(
            drain(&mut e),
            [EngineEffect::Haptic(HapticPulse::new(50))]
        );

        // Staying aligned never pulses again
        e.handle_reading(&OrientationReading::compass(KIND, 40, 120.0), 40)
            .unwrap();
        assert!(e.output().aligned);
        assert!(e.pop_effect().is_none());

        // Swing away
        e.handle_reading(&OrientationReading::compass(KIND, 80, 209.0), 80)
            .unwrap();
        assert!(!e.output().aligned);

        // Come back until aligned again
        let mut t = 80;
        while !e.output().aligned {
            t += 40;
            e.handle_reading(&OrientationReading::compass(KIND, t, 119.0), t)
                .unwrap();
            assert!(t < 2_000);
        }
        assert_eq!(
            drain(&mut e),
            [EngineEffect::Haptic(HapticPulse::new(50))]
        );
    }

    #[test]
    fn test_no_alignment_without_bearing() {
        let mut e = running(prompting());
        e.handle_reading(&OrientationReading::compass(KIND, 0, 119.0), 0)
            .unwrap();

        let out = e.output();
        assert!(!out.aligned);
        assert_eq!(out.needle_rotation, None);
        assert_eq!(out.distance_km, None);
        assert!(e.pop_effect().is_none());
    }

    #[test]
    fn test_needle_points_at_bearing_relative_to_heading() {
        let mut e = running(prompting());
        e.handle_reading(&OrientationReading::compass(KIND, 0, 300.0), 0)
            .unwrap();
        e.set_target(target(60.0), 0);

        let out = e.output();
        let needle = out.needle_rotation.unwrap();
        assert!(fabsf(needle - 120.0) < 1e-3);
        assert_eq!(out.distance_km, Some(4793.8));
    }

    #[test]
    fn test_new_bearing_reevaluates_alignment() {
        let mut e = running(prompting());
        e.handle_reading(&OrientationReading::compass(KIND, 0, 10.0), 0)
            .unwrap();
        e.set_target(target(100.0), 0);
        assert!(!e.output().aligned);

        e.set_target(target(15.0), 10);
        assert!(e.output().aligned);
        assert_eq!(
            drain(&mut e),
            [EngineEffect::Haptic(HapticPulse::new(50))]
        );
    }

    #[test]
    fn test_geolocation_failure_is_dismissible_and_keeps_heading() {
        let mut e = running(prompting());
        let err = e.geolocation_failed(GeolocationError::Timeout);
        assert_eq!(err, EngineError::GeolocationFailure);
        assert_eq!(e.output().status, Some(EngineError::GeolocationFailure));

        e.handle_reading(&OrientationReading::compass(KIND, 0, 77.0), 0)
            .unwrap();
        assert_eq!(e.output().display_heading, 77.0);

        assert!(e.dismiss_status());
        assert_eq!(e.output().status, None);
        assert!(!e.dismiss_status());
    }

    #[test]
    fn test_geolocation_failure_keeps_previous_target() {
        let mut e = running(prompting());
        e.set_target(target(60.0), 0);
        e.geolocation_failed(GeolocationError::Unavailable);
        assert_eq!(e.target(), Some(target(60.0)));
    }

    #[test]
    fn test_sensor_missing_is_not_dismissible() {
        let mut e = running(prompting());
        e.poll_watchdog(10_000);
        e.geolocation_failed(GeolocationError::Timeout);

        assert!(!e.dismiss_status());
        assert_eq!(e.output().status, Some(EngineError::SensorMissing));
    }

    #[test]
    fn test_location_notice_waits_behind_permission_notice() {
        let mut e = engine(prompting());
        e.initialize(0);
        e.begin_request(10);
        let _ = e.complete_request(Err(PermissionError::NoUserGesture), 20);
        e.geolocation_failed(GeolocationError::Unavailable);
        assert_eq!(e.output().status, Some(EngineError::PermissionRequestFailed));

        e.begin_request(30);
        e.complete_request(Ok(PermissionResponse::Granted), 40)
            .unwrap();
        let out = e.output();
        assert_eq!(out.permission, PermissionState::Granted);
        assert_eq!(out.status, Some(EngineError::GeolocationFailure));
        assert_eq!(out.distance_km, None);

        assert!(e.dismiss_status());
        assert_eq!(e.output().status, None);
    }

    #[test]
    fn test_location_notice_shows_after_sensor_retry() {
        let mut e = running(prompting());
        e.poll_watchdog(10_000);
        e.geolocation_failed(GeolocationError::Timeout);
        assert_eq!(e.output().status, Some(EngineError::SensorMissing));

        assert!(e.retry(11_000));
        assert_eq!(e.output().status, Some(EngineError::GeolocationFailure));
    }

    #[test]
    fn test_later_fix_clears_location_notice() {
        let mut e = running(prompting());
        e.geolocation_failed(GeolocationError::Timeout);
        e.set_target(target(60.0), 100);
        assert_eq!(e.output().status, None);
        assert!(!e.dismiss_status());
    }

    #[test]
    fn test_reset_keeps_location_notice() {
        let mut e = running(prompting());
        e.geolocation_failed(GeolocationError::Timeout);
        e.reset_session();
        assert_eq!(e.output().status, Some(EngineError::GeolocationFailure));
    }

    #[test]
    fn test_alignment_transitions_use_caller_clock() {
        let mut e = running(prompting());
        e.set_target(target(119.0), 5_000);

        // Platform event clock far behind the caller's clock
        e.handle_reading(&OrientationReading::compass(KIND, 3, 119.0), 5_100)
            .unwrap();
        assert_eq!(e.alignment().last_transition_ms, Some(5_100));

        e.set_target(target(10.0), 20_500);
        assert_eq!(e.alignment().last_transition_ms, Some(20_500));
    }

    #[test]
    fn test_failed_grant_write_reported_and_view_runs() {
        let mut store = MockStore::new();
        store.set_fail_writes(true);
        let mut e = QiblaEngine::new(EngineConfig::default(), no_prompt(), store);

        assert!(!e.begin_request(0));
        assert_eq!(
            drain(&mut e),
            [
                EngineEffect::StorageFault(StorageError::Unavailable),
                EngineEffect::Subscribe(KIND),
            ]
        );
        assert!(e.is_running());
    }

    #[test]
    fn test_failed_flag_clear_reported_on_reset() {
        let mut e = running(prompting());
        e.store_mut().set_fail_writes(true);
        e.reset_session();
        assert_eq!(
            drain(&mut e),
            [
                EngineEffect::Unsubscribe,
                EngineEffect::StorageFault(StorageError::Unavailable),
            ]
        );
    }

    #[test]
    fn test_teardown_unsubscribes_and_keeps_grant() {
        let mut e = running(prompting());
        e.teardown();

        assert_eq!(drain(&mut e), [EngineEffect::Unsubscribe]);
        assert_eq!(e.watchdog_deadline(), None);
        assert!(!e.poll_watchdog(100_000));

        let mut store = e.into_store();
        assert!(read_flag(&mut store, StorageKey::PermissionGranted));

        // Next view in the same run resumes
        let mut next = QiblaEngine::new(EngineConfig::default(), prompting(), store);
        assert!(next.initialize(0));
    }

    #[test]
    fn test_teardown_twice_unsubscribes_once() {
        let mut e = running(prompting());
        e.teardown();
        e.teardown();
        assert_eq!(drain(&mut e), [EngineEffect::Unsubscribe]);
    }

    #[test]
    fn test_reset_session_clears_flags() {
        let mut e = running(prompting());
        e.handle_reading(&OrientationReading::compass(KIND, 0, 77.0), 0)
            .unwrap();
        e.reset_session();

        assert_eq!(drain(&mut e), [EngineEffect::Unsubscribe]);
        assert_eq!(e.permission(), PermissionState::Unrequested);
        assert_eq!(e.heading(), None);
        assert!(e.store().raw(StorageKey::PermissionGranted).is_none());
        assert!(e.store().raw(StorageKey::SessionActive).is_none());
    }

    #[test]
    fn test_restart_reseeds_filter() {
        let mut e = running(prompting());
        e.handle_reading(&OrientationReading::compass(KIND, 0, 10.0), 0)
            .unwrap();
        e.teardown();
        assert!(!e.begin_request(20_000));
        assert!(e.is_running());

        // No residual animation from the old session
        e.handle_reading(&OrientationReading::compass(KIND, 20_001, 200.0), 20_001)
            .unwrap();
        let out = e.output();
        assert_eq!(out.display_heading, 200.0);
        assert_eq!(out.continuous_rotation, 200.0);
    }
}
