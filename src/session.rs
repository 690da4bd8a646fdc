use chrono::Utc;

use crate::timer::TimerSlot;
use crate::types::{AcMode, DeviceSnapshot, StatusReport};

/// Assumed state of the one AC unit this session controls.
///
/// Updated optimistically on confirmed commands and authoritatively on
/// device polls. Volatile: a restart loses it along with any armed timer.
#[derive(Debug)]
pub(crate) struct SessionState {
    pub power_on: bool,
    pub mode: AcMode,
    pub temperature: i32,
    pub last_updated: Option<chrono::DateTime<Utc>>,
    pub timer: TimerSlot,
}

impl SessionState {
    pub fn new(mode: AcMode, temperature: i32) -> Self {
        Self {
            power_on: false,
            mode,
            temperature,
            last_updated: None,
            timer: TimerSlot::new(),
        }
    }

    /// Commit a confirmed device command.
    pub fn confirm(&mut self, power_on: bool, mode: AcMode, temperature: i32) {
        self.power_on = power_on;
        self.mode = mode;
        self.temperature = temperature;
        self.last_updated = Some(Utc::now());
    }

    /// Overwrite assumed state from an authoritative device poll. The only
    /// path that can correct drift from reality.
    pub fn apply_snapshot(&mut self, snapshot: &DeviceSnapshot) {
        self.power_on = snapshot.power_on;
        self.mode = snapshot.mode;
        self.temperature = snapshot.target_temperature;
        self.last_updated = Some(Utc::now());
    }

    pub fn status_report(&self) -> StatusReport {
        StatusReport {
            power_on: self.power_on,
            mode: self.mode,
            temperature: self.temperature,
            last_updated: self.last_updated,
            shutoff_remaining_minutes: self.timer.remaining_minutes(),
        }
    }
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new(AcMode::Cool, 24)
    }
}
