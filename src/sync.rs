//! Poller/sync loop
//!
//! Each iteration reads the inputs, logs them with their change signature and, when the
//! signature moved, runs one GET-then-PUT exchange against the light:
//!
//! ```text
//!   read sensors ──► signature ──unchanged──► idle pause
//!                        │
//!                     changed
//!                        ▼
//!   GET lights ──► on ^ switch ──► PUT single light ──► commit signature ──► cooldown
//! ```

use core::sync::atomic::{AtomicBool, Ordering};

use embedded_hal_async::delay::DelayNs;
use log::{error, info};

use crate::config::{IDLE_POLL_INTERVAL_MS, SYNC_COOLDOWN_MS};
use crate::elgato::{LightApi, LightState, LightsDocument, ProtocolError, light_update};
use crate::http::HttpError;
use crate::sensors::{SensorError, SensorReading, SensorSource};
use crate::signature::{ChangeDetector, ChangeSignature};

/// Anything that stops the sync loop
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SyncError {
    #[error("sensor read failed: {0}")]
    Sensor(#[from] SensorError),
    #[error("light request failed: {0}")]
    Http(#[from] HttpError),
    #[error("light state rejected: {0}")]
    Protocol(#[from] ProtocolError),
}

/// Decides when the loop ends; checked before every iteration
pub trait StopCondition {
    fn should_stop(&mut self) -> bool;
}

/// Never stops; the firmware polls for as long as it is powered
#[derive(Debug, Clone, Copy, Default)]
pub struct Forever;

impl StopCondition for Forever {
    fn should_stop(&mut self) -> bool {
        false
    }
}

/// Stops once the flag is raised
impl StopCondition for &AtomicBool {
    fn should_stop(&mut self) -> bool {
        self.load(Ordering::Acquire)
    }
}

/// Result of one loop iteration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// Signature unchanged, no request issued
    Unchanged(SensorReading),
    /// Light state pushed to the device
    Synced {
        reading: SensorReading,
        pushed: LightState,
    },
}

/// Mirrors the physical controls onto the light
pub struct SyncLoop<S, A, D> {
    sensors: S,
    light: A,
    delay: D,
    detector: ChangeDetector,
}

impl<S, A, D> SyncLoop<S, A, D>
where
    S: SensorSource,
    A: LightApi,
    D: DelayNs,
{
    pub fn new(sensors: S, light: A, delay: D) -> Self {
        Self {
            sensors,
            light,
            delay,
            detector: ChangeDetector::new(),
        }
    }

    /// Signature of the last reading that reached the light
    pub fn last_synced(&self) -> ChangeSignature {
        self.detector.previous()
    }

    pub fn light(&self) -> &A {
        &self.light
    }

    pub fn sensors(&self) -> &S {
        &self.sensors
    }

    /// Run iterations until `stop` says so or an iteration fails.
    pub async fn run(&mut self, mut stop: impl StopCondition) -> Result<(), SyncError> {
        info!("[SYNC] Starting sync loop");
        while !stop.should_stop() {
            if let Err(e) = self.step().await {
                error!("[SYNC] Sync loop halted: {}", e);
                return Err(e);
            }
        }
        info!("[SYNC] Sync loop stopped");
        Ok(())
    }

    /// One poll of the inputs, followed by a GET-then-PUT when they changed.
    pub async fn step(&mut self) -> Result<Step, SyncError> {
        let reading = self.sensors.read()?;
        let signature = ChangeSignature::of(&reading);
        reading.log();
        info!("[SENSOR] Signature:{}", signature);

        if !self.detector.has_changed(signature) {
            self.delay.delay_ms(IDLE_POLL_INTERVAL_MS).await;
            return Ok(Step::Unchanged(reading));
        }

        let current = self.light.fetch_lights().await?;
        let reported_on = current.last_reported_on()?;
        let pushed = light_update(reported_on, &reading);
        self.light.push_lights(&LightsDocument::single(pushed)).await?;
        self.detector.commit(signature);

        info!(
            "[SYNC] Pushed on={} brightness={} temperature={}",
            pushed.on, pushed.brightness, pushed.temperature
        );

        self.delay.delay_ms(SYNC_COOLDOWN_MS).await;
        Ok(Step::Synced { reading, pushed })
    }
}
