use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::gateway::DeviceGateway;
use crate::session::SessionState;
use crate::types::{
    AcMode, CancelOutcome, ControlRequest, DeviceSnapshot, FanLevel, ShutoffOutcome, StatusReport,
    Swing, TEMPERATURE_MAX, TEMPERATURE_MIN,
};
use crate::{Error, Result};

type ShutoffCallback = Box<dyn Fn(&ShutoffOutcome) + Send + Sync>;

pub struct AcControllerBuilder<G> {
    gateway: G,
    mode: AcMode,
    temperature: i32,
    fan_level: FanLevel,
    swing: Swing,
    shutoff_callbacks: Vec<ShutoffCallback>,
}

impl<G: DeviceGateway> AcControllerBuilder<G> {
    pub fn new(gateway: G) -> Self {
        Self {
            gateway,
            mode: AcMode::Cool,
            temperature: 24,
            fan_level: FanLevel::Medium,
            swing: Swing::Off,
            shutoff_callbacks: Vec::new(),
        }
    }

    /// Assumed mode before the first confirmed command or poll.
    pub fn default_mode(mut self, mode: AcMode) -> Self {
        self.mode = mode;
        self
    }

    /// Assumed temperature before the first confirmed command or poll.
    pub fn default_temperature(mut self, temperature: i32) -> Self {
        self.temperature = temperature;
        self
    }

    /// Fan level sent with every ON command.
    pub fn fan_level(mut self, level: FanLevel) -> Self {
        self.fan_level = level;
        self
    }

    /// Swing flag sent with every ON command.
    pub fn swing(mut self, swing: Swing) -> Self {
        self.swing = swing;
        self
    }

    /// Register a callback invoked when a scheduled shut-off fires, with
    /// either the confirmed OFF state or the gateway failure.
    pub fn on_shutoff(mut self, f: impl Fn(&ShutoffOutcome) + Send + Sync + 'static) -> Self {
        self.shutoff_callbacks.push(Box::new(f));
        self
    }

    pub fn build(self) -> Result<AcController<G>> {
        validate_temperature(self.temperature)?;
        Ok(AcController {
            inner: Arc::new(Inner {
                gateway: self.gateway,
                session: Mutex::new(SessionState::new(self.mode, self.temperature)),
                shutoff_callbacks: self.shutoff_callbacks,
                fan_level: self.fan_level,
                swing: self.swing,
            }),
        })
    }
}

struct Inner<G> {
    gateway: G,
    session: Mutex<SessionState>,
    shutoff_callbacks: Vec<ShutoffCallback>,
    fan_level: FanLevel,
    swing: Swing,
}

/// Orchestrates gateway calls and keeps the assumed session state consistent
/// with their outcomes.
///
/// All read-modify-write over the session runs under one async mutex, and a
/// gateway call plus the commit of its result is a single critical section.
/// Cheap to clone; clones share the session.
pub struct AcController<G> {
    inner: Arc<Inner<G>>,
}

impl<G> std::fmt::Debug for AcController<G> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AcController").finish_non_exhaustive()
    }
}

impl<G> Clone for AcController<G> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<G: DeviceGateway> AcController<G> {
    pub fn builder(gateway: G) -> AcControllerBuilder<G> {
        AcControllerBuilder::new(gateway)
    }

    /// Turn the unit on or off with an explicit mode and temperature.
    /// One attempt; on failure the assumed state is left untouched.
    pub async fn set_power(
        &self,
        on: bool,
        mode: AcMode,
        temperature: i32,
    ) -> Result<StatusReport> {
        validate_temperature(temperature)?;
        let mut session = self.inner.session.lock().await;
        self.send_and_confirm(&mut session, on, mode, temperature)
            .await
    }

    /// Turn the unit on in fan-only mode at the last-known temperature.
    pub async fn set_fan_only(&self) -> Result<StatusReport> {
        let mut session = self.inner.session.lock().await;
        let temperature = session.temperature;
        self.send_and_confirm(&mut session, true, AcMode::Fan, temperature)
            .await
    }

    /// Invert the assumed power state and push the inverse to the device.
    /// Serialized with all other session mutations, so two concurrent
    /// toggles cannot interleave the read and the write.
    pub async fn toggle_power(&self) -> Result<StatusReport> {
        let mut session = self.inner.session.lock().await;
        let target = !session.power_on;
        let (mode, temperature) = (session.mode, session.temperature);
        debug!(power_on = target, "toggling power");
        self.send_and_confirm(&mut session, target, mode, temperature)
            .await
    }

    /// Poll the device and overwrite the assumed state from the snapshot.
    /// The only path that corrects drift from reality.
    pub async fn refresh_status(&self) -> Result<DeviceSnapshot> {
        let mut session = self.inner.session.lock().await;
        let snapshot = self.inner.gateway.get_state().await?;
        session.apply_snapshot(&snapshot);
        Ok(snapshot)
    }

    /// Set the assumed power state without touching the device. Escape hatch
    /// for when the user knows the ground truth after drift.
    pub async fn manual_override(&self, on: bool) -> StatusReport {
        let mut session = self.inner.session.lock().await;
        session.power_on = on;
        session.last_updated = Some(Utc::now());
        debug!(on = on, "manual state override");
        session.status_report()
    }

    /// Arm the shut-off timer. An armed timer is cancelled and replaced,
    /// never an error. Any positive duration is accepted.
    pub async fn schedule_shutoff(&self, minutes: u32) -> Result<StatusReport> {
        if minutes == 0 {
            return Err(Error::InvalidDuration(minutes));
        }

        let mut session = self.inner.session.lock().await;
        let token = CancellationToken::new();
        let deadline = Utc::now() + chrono::Duration::minutes(i64::from(minutes));
        let replaced = session.timer.arm(token.clone(), deadline);

        let controller = self.clone();
        let wait_token = token.clone();
        tokio::spawn(async move {
            tokio::select! {
                () = wait_token.cancelled() => {}
                () = tokio::time::sleep(Duration::from_secs(u64::from(minutes) * 60)) => {
                    controller.fire_shutoff(token).await;
                }
            }
        });

        debug!(minutes = minutes, replaced = replaced, "shut-off timer armed");
        Ok(session.status_report())
    }

    /// Disarm the shut-off timer if one is armed. Guaranteed to prevent the
    /// fire: the fire path re-checks its token under the session lock.
    pub async fn cancel_shutoff(&self) -> CancelOutcome {
        let mut session = self.inner.session.lock().await;
        let cancelled = session.timer.cancel();
        debug!(cancelled = cancelled, "shut-off timer cancel requested");
        CancelOutcome {
            cancelled,
            status: session.status_report(),
        }
    }

    /// Current assumed state, for rendering.
    pub async fn status(&self) -> StatusReport {
        self.inner.session.lock().await.status_report()
    }

    async fn send_and_confirm(
        &self,
        session: &mut SessionState,
        on: bool,
        mode: AcMode,
        temperature: i32,
    ) -> Result<StatusReport> {
        let request = ControlRequest {
            power_on: on,
            mode,
            temperature,
            fan_level: self.inner.fan_level,
            swing: self.inner.swing,
        };
        self.inner.gateway.set_state(request).await?;
        session.confirm(on, mode, temperature);
        Ok(session.status_report())
    }

    async fn fire_shutoff(&self, token: CancellationToken) {
        let outcome = {
            let mut session = self.inner.session.lock().await;
            // A cancel or replace that won the lock first has already
            // cancelled this token; the fire must not proceed.
            if token.is_cancelled() {
                return;
            }
            session.timer.clear();

            let request = ControlRequest {
                power_on: false,
                mode: session.mode,
                temperature: session.temperature,
                fan_level: self.inner.fan_level,
                swing: self.inner.swing,
            };
            match self.inner.gateway.set_state(request).await {
                Ok(()) => {
                    let (mode, temperature) = (session.mode, session.temperature);
                    session.confirm(false, mode, temperature);
                    debug!("shut-off timer fired, device confirmed OFF");
                    ShutoffOutcome::Completed {
                        status: session.status_report(),
                    }
                }
                Err(e) => {
                    warn!(error = %e, "shut-off timer fired but device did not confirm OFF");
                    ShutoffOutcome::GatewayFailed {
                        reason: e.to_string(),
                        status: session.status_report(),
                    }
                }
            }
        };

        for cb in &self.inner.shutoff_callbacks {
            cb(&outcome);
        }
    }
}

fn validate_temperature(temperature: i32) -> Result<()> {
    if !(TEMPERATURE_MIN..=TEMPERATURE_MAX).contains(&temperature) {
        return Err(Error::TemperatureOutOfRange(temperature));
    }
    Ok(())
}
