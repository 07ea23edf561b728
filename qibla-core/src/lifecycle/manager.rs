//! Permission and session lifecycle manager
//!
//! Owns the two persisted flags and the permission state:
//!
//! - durable "permission granted" flag, survives restarts
//! - volatile "session active" flag, wiped by the platform on a fresh launch
//!
//! Both flags set at start-up means the user granted access earlier in this
//! run, so sensors resume without a prompt. A durable grant alone is not
//! enough: some platforms forget the grant between launches and would
//! silently deliver no events.
//!
//! The platform permission call is asynchronous, so a request is split into
//! [`LifecycleManager::begin_request`] and
//! [`LifecycleManager::complete_request`] around the caller's await.

use qibla_hal::{KeyValueStore, PermissionError, PermissionResponse, StorageError, StorageKey};

use crate::config::{read_flag, write_flag};
use crate::error::EngineError;
use crate::state::{PermissionEvent, PermissionState};

/// What the caller must do next
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LifecycleAction {
    /// Nothing
    None,
    /// Start the sensor pipeline (the start guard has been claimed)
    StartSensors,
    /// Show the permission prompt UI
    ShowPrompt,
    /// Call the platform permission API and report back
    AwaitPlatform,
}

/// Permission and session lifecycle manager
pub struct LifecycleManager<S> {
    store: S,
    state: PermissionState,
    /// Start guard: the sensor pipeline is running
    started: bool,
    /// Last flag write or removal that failed, until taken
    storage_fault: Option<StorageError>,
}

impl<S: KeyValueStore> LifecycleManager<S> {
    /// Create a manager over the given store
    pub fn new(store: S) -> Self {
        Self {
            store,
            state: PermissionState::Unrequested,
            started: false,
            storage_fault: None,
        }
    }

    /// Current permission state
    pub fn state(&self) -> PermissionState {
        self.state
    }

    /// Check if the sensor pipeline is running
    pub fn is_started(&self) -> bool {
        self.started
    }

    /// Access the underlying store
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Mutable access to the underlying store
    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    /// Take the last failed flag write or removal, if any
    ///
    /// A failed write does not stop the current view; it only costs a
    /// prompt on the next one.
    pub fn take_storage_fault(&mut self) -> Option<StorageError> {
        self.storage_fault.take()
    }

    /// Consume the manager and return the store
    pub fn into_store(self) -> S {
        self.store
    }

    /// Decide at initialization whether to resume without prompting
    pub fn check_persisted(&mut self) -> LifecycleAction {
        let granted = read_flag(&mut self.store, StorageKey::PermissionGranted);
        let active = read_flag(&mut self.store, StorageKey::SessionActive);

        if granted && active {
            self.apply(PermissionEvent::SessionResumed);
            self.start()
        } else if self.state.shows_prompt() {
            LifecycleAction::ShowPrompt
        } else {
            LifecycleAction::None
        }
    }

    /// Handle a user request for sensor access
    ///
    /// # Arguments
    /// - `requires_prompt`: the platform needs an explicit async grant
    pub fn begin_request(&mut self, requires_prompt: bool) -> LifecycleAction {
        match self.state {
            PermissionState::Granted => self.start(),
            PermissionState::Unrequested | PermissionState::Denied => {
                if requires_prompt {
                    self.apply(PermissionEvent::RequestStarted);
                    LifecycleAction::AwaitPlatform
                } else {
                    self.grant()
                }
            }
            // Already asking, or waiting for an explicit retry
            PermissionState::Requesting | PermissionState::SensorMissing => LifecycleAction::None,
        }
    }

    /// Report the platform's answer to a request
    ///
    /// Answers arriving when no request is in flight (after a reset, say)
    /// are ignored.
    pub fn complete_request(
        &mut self,
        outcome: Result<PermissionResponse, PermissionError>,
    ) -> Result<LifecycleAction, EngineError> {
        if self.state != PermissionState::Requesting {
            return Ok(LifecycleAction::None);
        }

        match outcome {
            Ok(PermissionResponse::Granted) => Ok(self.grant()),
            Ok(PermissionResponse::Denied) => {
                self.clear_flags();
                self.apply(PermissionEvent::AccessRefused);
                Err(EngineError::PermissionDenied)
            }
            Err(e) => {
                // Nothing is persisted for a failed call
                self.apply(PermissionEvent::RequestFailed);
                Err(e.into())
            }
        }
    }

    /// Watchdog expiry: the sensor is missing for the rest of the session
    ///
    /// Returns `true` if this call entered [`PermissionState::SensorMissing`].
    pub fn sensor_timeout(&mut self) -> bool {
        if self.state != PermissionState::Granted {
            return false;
        }
        self.apply(PermissionEvent::SensorTimeout);
        self.started = false;
        true
    }

    /// Explicit user retry after the sensor was reported missing
    pub fn retry(&mut self) -> LifecycleAction {
        if self.state != PermissionState::SensorMissing {
            return LifecycleAction::None;
        }
        self.apply(PermissionEvent::Retry);
        self.start()
    }

    /// Leaving the view
    ///
    /// Releases the start guard. Persisted flags are left untouched so the
    /// next view in this session resumes without prompting.
    ///
    /// Returns `true` if the pipeline was running.
    pub fn teardown(&mut self) -> bool {
        core::mem::replace(&mut self.started, false)
    }

    /// Full session reset: clear both flags and forget the grant
    pub fn reset_session(&mut self) {
        self.clear_flags();
        self.apply(PermissionEvent::Reset);
        self.started = false;
    }

    fn grant(&mut self) -> LifecycleAction {
        for key in [StorageKey::PermissionGranted, StorageKey::SessionActive] {
            let result = write_flag(&mut self.store, key, true);
            self.record(result);
        }
        self.apply(PermissionEvent::AccessGranted);
        self.start()
    }

    fn start(&mut self) -> LifecycleAction {
        if !self.state.sensors_allowed() || self.started {
            return LifecycleAction::None;
        }
        self.started = true;
        LifecycleAction::StartSensors
    }

    fn clear_flags(&mut self) {
        for key in [StorageKey::PermissionGranted, StorageKey::SessionActive] {
            match self.store.remove(key) {
                Ok(()) | Err(StorageError::NotFound) => {}
                Err(e) => self.storage_fault = Some(e),
            }
        }
    }

    fn record(&mut self, result: Result<(), StorageError>) {
        if let Err(e) = result {
            self.storage_fault = Some(e);
        }
    }

    fn apply(&mut self, event: PermissionEvent) {
        self.state = self.state.transition(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use qibla_hal::mock::MockStore;

    fn granted_store(session_active: bool) -> MockStore {
        let mut store = MockStore::new();
        write_flag(&mut store, StorageKey::PermissionGranted, true).unwrap();
        if session_active {
            write_flag(&mut store, StorageKey::SessionActive, true).unwrap();
        }
        store
    }

    #[test]
    fn test_resume_with_both_flags() {
        let mut lm = LifecycleManager::new(granted_store(true));
        assert_eq!(lm.check_persisted(), LifecycleAction::StartSensors);
        assert_eq!(lm.state(), PermissionState::Granted);
        assert!(lm.is_started());
    }

    #[test]
    fn test_prompt_without_session_flag() {
        let mut lm = LifecycleManager::new(granted_store(false));
        assert_eq!(lm.check_persisted(), LifecycleAction::ShowPrompt);
        assert_eq!(lm.state(), PermissionState::Unrequested);
        assert!(!lm.is_started());
    }

    #[test]
    fn test_prompt_on_empty_store() {
        let mut lm = LifecycleManager::new(MockStore::new());
        assert_eq!(lm.check_persisted(), LifecycleAction::ShowPrompt);
    }

    #[test]
    fn test_grant_persists_both_flags() {
        let mut lm = LifecycleManager::new(MockStore::new());
        assert_eq!(lm.begin_request(true), LifecycleAction::AwaitPlatform);
        assert_eq!(lm.state(), PermissionState::Requesting);

        let action = lm.complete_request(Ok(PermissionResponse::Granted));
        assert_eq!(action, Ok(LifecycleAction::StartSensors));
        assert_eq!(lm.state(), PermissionState::Granted);

        let store = lm.store_mut();
        assert!(read_flag(store, StorageKey::PermissionGranted));
        assert!(read_flag(store, StorageKey::SessionActive));
    }

    #[test]
    fn test_no_prompt_platform_grants_immediately() {
        let mut lm = LifecycleManager::new(MockStore::new());
        assert_eq!(lm.begin_request(false), LifecycleAction::StartSensors);
        assert_eq!(lm.state(), PermissionState::Granted);
        assert!(read_flag(lm.store_mut(), StorageKey::PermissionGranted));
    }

    #[test]
    fn test_refusal_clears_flags() {
        let mut lm = LifecycleManager::new(granted_store(false));
        lm.begin_request(true);

        let result = lm.complete_request(Ok(PermissionResponse::Denied));
        assert_eq!(result, Err(EngineError::PermissionDenied));
        assert_eq!(lm.state(), PermissionState::Denied);
        assert!(lm.state().shows_prompt());
        assert!(!read_flag(lm.store_mut(), StorageKey::PermissionGranted));
    }

    #[test]
    fn test_failed_call_persists_nothing() {
        let mut lm = LifecycleManager::new(granted_store(false));
        lm.begin_request(true);

        let result = lm.complete_request(Err(PermissionError::NoUserGesture));
        assert_eq!(result, Err(EngineError::PermissionRequestFailed));
        assert_eq!(lm.state(), PermissionState::Unrequested);

        // Earlier durable grant untouched, no session flag written
        assert!(read_flag(lm.store_mut(), StorageKey::PermissionGranted));
        assert!(!read_flag(lm.store_mut(), StorageKey::SessionActive));
    }

    #[test]
    fn test_start_guard_prevents_double_start() {
        let mut lm = LifecycleManager::new(granted_store(true));
        assert_eq!(lm.check_persisted(), LifecycleAction::StartSensors);

        // Manual retry racing the auto-start
        assert_eq!(lm.begin_request(true), LifecycleAction::None);
        assert_eq!(lm.begin_request(false), LifecycleAction::None);
    }

    #[test]
    fn test_duplicate_answer_ignored() {
        let mut lm = LifecycleManager::new(MockStore::new());
        lm.begin_request(true);
        assert_eq!(
            lm.complete_request(Ok(PermissionResponse::Granted)),
            Ok(LifecycleAction::StartSensors)
        );
        assert_eq!(
            lm.complete_request(Ok(PermissionResponse::Granted)),
            Ok(LifecycleAction::None)
        );
    }

    #[test]
    fn test_failed_flag_write_reported_once() {
        let mut store = MockStore::new();
        store.set_fail_writes(true);
        let mut lm = LifecycleManager::new(store);

        // The view still starts
        assert_eq!(lm.begin_request(false), LifecycleAction::StartSensors);
        assert_eq!(lm.take_storage_fault(), Some(StorageError::Unavailable));
        assert_eq!(lm.take_storage_fault(), None);
        assert!(!read_flag(lm.store_mut(), StorageKey::PermissionGranted));
    }

    #[test]
    fn test_failed_flag_removal_reported() {
        let mut lm = LifecycleManager::new(granted_store(true));
        lm.check_persisted();
        lm.store_mut().set_fail_writes(true);

        lm.reset_session();
        assert_eq!(lm.state(), PermissionState::Unrequested);
        assert_eq!(lm.take_storage_fault(), Some(StorageError::Unavailable));
    }

    #[test]
    fn test_successful_grant_reports_no_fault() {
        let mut lm = LifecycleManager::new(MockStore::new());
        lm.begin_request(false);
        lm.reset_session();
        assert_eq!(lm.take_storage_fault(), None);
    }

    #[test]
    fn test_teardown_keeps_durable_flag() {
        let mut lm = LifecycleManager::new(MockStore::new());
        lm.begin_request(false);

        assert!(lm.teardown());
        assert!(!lm.teardown());
        assert!(read_flag(lm.store_mut(), StorageKey::PermissionGranted));
        assert!(read_flag(lm.store_mut(), StorageKey::SessionActive));
    }

    #[test]
    fn test_next_view_resumes_after_teardown() {
        let mut lm = LifecycleManager::new(MockStore::new());
        lm.begin_request(false);
        lm.teardown();

        let mut next = LifecycleManager::new(lm.into_store());
        assert_eq!(next.check_persisted(), LifecycleAction::StartSensors);
    }

    #[test]
    fn test_fresh_launch_prompts_again() {
        let mut lm = LifecycleManager::new(MockStore::new());
        lm.begin_request(false);
        let mut store = lm.into_store();
        store.relaunch();

        let mut next = LifecycleManager::new(store);
        assert_eq!(next.check_persisted(), LifecycleAction::ShowPrompt);
    }

    #[test]
    fn test_reset_session_clears_flags() {
        let mut lm = LifecycleManager::new(granted_store(true));
        lm.check_persisted();
        lm.reset_session();

        assert_eq!(lm.state(), PermissionState::Unrequested);
        assert!(!lm.is_started());
        assert!(!read_flag(lm.store_mut(), StorageKey::PermissionGranted));
        assert!(!read_flag(lm.store_mut(), StorageKey::SessionActive));
    }

    #[test]
    fn test_sensor_timeout_and_retry() {
        let mut lm = LifecycleManager::new(granted_store(true));
        lm.check_persisted();

        assert!(lm.sensor_timeout());
        assert!(!lm.sensor_timeout());
        assert_eq!(lm.state(), PermissionState::SensorMissing);
        assert!(!lm.is_started());

        // Requests do nothing; only retry restarts
        assert_eq!(lm.begin_request(true), LifecycleAction::None);
        assert_eq!(lm.retry(), LifecycleAction::StartSensors);
        assert_eq!(lm.state(), PermissionState::Granted);
    }

    #[test]
    fn test_write_failure_still_starts() {
        let mut store = MockStore::new();
        store.set_fail_writes(true);
        let mut lm = LifecycleManager::new(store);

        assert_eq!(lm.begin_request(false), LifecycleAction::StartSensors);
        assert_eq!(lm.state(), PermissionState::Granted);
    }
}
