//! View session loop
//!
//! One session per visit to the qibla view. The loop owns the engine and
//! the platform sensor and waits on:
//! - Orientation readings
//! - User commands
//! - The geolocation result
//! - The watchdog deadline
//!
//! After every event it executes the engine's queued effects and publishes
//! a fresh [`EngineOutput`](qibla_core::EngineOutput) snapshot.

use core::future::pending;

use embassy_futures::select::{select3, select4, Either4};
use embassy_time::{Instant, Timer};

use qibla_core::bearing::BearingProvider;
use qibla_core::{EngineEffect, QiblaEngine};
use qibla_hal::{
    Geolocation, HapticOutput, KeyValueStore, OrientationReading, OrientationSensor,
    PermissionPrompt,
};

use crate::channels::{SessionChannels, TargetUpdate, UiCommand};
use crate::config::ConfigPersistence;
use crate::tasks::{geolocation_task, haptic_task};
use crate::{log_debug, log_info, log_trace, log_warn};

/// Whether the loop keeps running after a command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    Leave,
}

/// Per-view session
pub struct ViewSession<'c, S, O, P> {
    engine: QiblaEngine<S>,
    sensor: O,
    prompt: P,
    channels: &'c SessionChannels,
}

impl<'c, S, O, P> ViewSession<'c, S, O, P>
where
    S: KeyValueStore,
    O: OrientationSensor,
    P: PermissionPrompt,
{
    /// Open a session
    ///
    /// Loads the engine configuration from the store and probes the sensor
    /// capabilities. Nothing is subscribed until [`Self::run`].
    pub fn open(mut store: S, sensor: O, prompt: P, channels: &'c SessionChannels) -> Self {
        let config = ConfigPersistence::new(&mut store).load_or_default();
        let capabilities = sensor.capabilities();
        log_debug!(
            "Sensor capabilities: absolute={} compass={} prompt={}",
            capabilities.absolute_events,
            capabilities.compass_heading,
            capabilities.requires_permission
        );

        Self {
            engine: QiblaEngine::new(config, capabilities, store),
            sensor,
            prompt,
            channels,
        }
    }

    /// The engine
    pub fn engine(&self) -> &QiblaEngine<S> {
        &self.engine
    }

    /// The platform sensor
    pub fn sensor(&self) -> &O {
        &self.sensor
    }

    /// The platform permission prompt
    pub fn prompt(&self) -> &P {
        &self.prompt
    }

    /// Close the session and return the store
    pub fn into_store(self) -> S {
        self.engine.into_store()
    }

    /// Run until the view is left
    ///
    /// Leaving unsubscribes and disarms the watchdog but keeps the
    /// persisted grant, so the next session in this run resumes directly.
    pub async fn run(&mut self) {
        let channels = self.channels;

        if self.engine.initialize(now_ms()) {
            log_info!("Resuming granted session");
        }
        self.flush();

        loop {
            let deadline = self.engine.watchdog_deadline();
            let event = select4(
                channels.readings.receive(),
                channels.commands.receive(),
                channels.target.wait(),
                watchdog_timer(deadline),
            )
            .await;

            let flow = match event {
                Either4::First(reading) => {
                    self.handle_reading(&reading);
                    Flow::Continue
                }
                Either4::Second(command) => self.handle_command(command).await,
                Either4::Third(update) => {
                    self.handle_target(update);
                    Flow::Continue
                }
                Either4::Fourth(()) => {
                    if self.engine.poll_watchdog(now_ms()) {
                        log_warn!("No orientation sensor found");
                    }
                    Flow::Continue
                }
            };

            self.flush();
            if flow == Flow::Leave {
                break;
            }
        }

        self.engine.teardown();
        self.flush();
        log_info!("Session closed");
    }

    fn handle_reading(&mut self, reading: &OrientationReading) {
        if let Err(e) = self.engine.handle_reading(reading, now_ms()) {
            log_trace!("Dropped orientation event: {:?}", e);
        }
    }

    async fn handle_command(&mut self, command: UiCommand) -> Flow {
        log_debug!("UI command: {:?}", command);

        match command {
            UiCommand::RequestAccess => {
                if self.engine.begin_request(now_ms()) {
                    let outcome = self.prompt.request().await;
                    if let Err(e) = self.engine.complete_request(outcome, now_ms()) {
                        log_warn!("Permission request: {:?}", e);
                    }
                }
            }
            UiCommand::Retry => {
                if self.engine.retry(now_ms()) {
                    log_info!("Retrying sensor");
                }
            }
            UiCommand::DismissStatus => {
                self.engine.dismiss_status();
            }
            UiCommand::ResetSession => {
                log_info!("Resetting session");
                self.engine.reset_session();
            }
            UiCommand::Leave => return Flow::Leave,
        }
        Flow::Continue
    }

    fn handle_target(&mut self, update: TargetUpdate) {
        match update {
            Ok(target) => self.engine.set_target(target, now_ms()),
            Err(e) => {
                let error = self.engine.geolocation_failed(e);
                log_debug!("Status: {}", error.message());
            }
        }
    }

    /// Execute queued effects and publish the new snapshot
    fn flush(&mut self) {
        while let Some(effect) = self.engine.pop_effect() {
            match effect {
                EngineEffect::Subscribe(kind) => {
                    log_debug!("Subscribing to {:?} orientation events", kind);
                    // A refused subscription delivers nothing; the watchdog
                    // reports it as a missing sensor.
                    if let Err(e) = self.sensor.subscribe(kind) {
                        log_warn!("Orientation subscribe failed: {:?}", e);
                    }
                }
                EngineEffect::Unsubscribe => {
                    self.sensor.unsubscribe();
                    self.channels.readings.clear();
                }
                EngineEffect::Haptic(pulse) => self.channels.haptic.signal(pulse),
                EngineEffect::StorageFault(e) => {
                    log_warn!("Permission flags not persisted: {:?}", e);
                }
            }
        }
        self.channels.output.signal(self.engine.output());
    }
}

/// Run a view session together with its helper tasks
///
/// Returns when the session loop returns; a geolocation lookup still in
/// flight is dropped.
pub async fn run_view<S, O, P, G, H, B>(
    session: &mut ViewSession<'_, S, O, P>,
    geolocation: &mut G,
    haptics: &mut H,
    provider: &B,
) where
    S: KeyValueStore,
    O: OrientationSensor,
    P: PermissionPrompt,
    G: Geolocation,
    H: HapticOutput,
    B: BearingProvider,
{
    let channels = session.channels;
    select3(
        session.run(),
        async {
            geolocation_task(geolocation, provider, channels).await;
            pending::<()>().await
        },
        haptic_task(haptics, channels),
    )
    .await;
}

async fn watchdog_timer(deadline_ms: Option<u64>) {
    match deadline_ms {
        Some(ms) => Timer::at(Instant::from_millis(ms)).await,
        None => pending().await,
    }
}

fn now_ms() -> u64 {
    Instant::now().as_millis()
}
