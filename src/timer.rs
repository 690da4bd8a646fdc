use chrono::{DateTime, Utc};
use tokio_util::sync::CancellationToken;

/// The single shut-off timer slot owned by a session.
///
/// Token and deadline are stored together so they are cleared together.
/// Firing is decided by the spawned task re-checking its token under the
/// session lock, so a cancel that wins the lock always prevents the fire.
#[derive(Debug, Default)]
pub(crate) struct TimerSlot {
    active: Option<ActiveTimer>,
}

#[derive(Debug)]
struct ActiveTimer {
    token: CancellationToken,
    deadline: DateTime<Utc>,
}

impl TimerSlot {
    pub fn new() -> Self {
        Self { active: None }
    }

    /// Arm the slot, cancelling any previously armed timer first.
    /// Returns true if a prior timer was replaced.
    pub fn arm(&mut self, token: CancellationToken, deadline: DateTime<Utc>) -> bool {
        let replaced = self.cancel();
        self.active = Some(ActiveTimer { token, deadline });
        replaced
    }

    /// Cancel and clear the slot. Returns true if a timer was armed.
    pub fn cancel(&mut self) -> bool {
        match self.active.take() {
            Some(timer) => {
                timer.token.cancel();
                true
            }
            None => false,
        }
    }

    /// Clear the slot without cancelling; used by the fire path once it has
    /// confirmed under the session lock that it owns the armed timer.
    pub fn clear(&mut self) {
        self.active = None;
    }

    pub fn is_armed(&self) -> bool {
        self.active.is_some()
    }

    pub fn deadline(&self) -> Option<DateTime<Utc>> {
        self.active.as_ref().map(|t| t.deadline)
    }

    /// Minutes until the deadline, rounded up, floored at zero.
    pub fn remaining_minutes(&self) -> Option<i64> {
        self.active.as_ref().map(|t| {
            let secs = (t.deadline - Utc::now()).num_seconds();
            if secs <= 0 { 0 } else { (secs + 59) / 60 }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn idle_slot_reports_nothing() {
        let slot = TimerSlot::new();
        assert!(!slot.is_armed());
        assert_eq!(slot.deadline(), None);
        assert_eq!(slot.remaining_minutes(), None);
    }

    #[test]
    fn cancel_on_idle_is_noop() {
        let mut slot = TimerSlot::new();
        assert!(!slot.cancel());
    }

    #[test]
    fn arm_replaces_and_cancels_previous_token() {
        let mut slot = TimerSlot::new();
        let first = CancellationToken::new();
        assert!(!slot.arm(first.clone(), Utc::now() + Duration::minutes(5)));

        let second = CancellationToken::new();
        assert!(slot.arm(second.clone(), Utc::now() + Duration::minutes(10)));
        assert!(first.is_cancelled());
        assert!(!second.is_cancelled());
        assert!(slot.is_armed());
    }

    #[test]
    fn cancel_cancels_token_and_clears() {
        let mut slot = TimerSlot::new();
        let token = CancellationToken::new();
        slot.arm(token.clone(), Utc::now() + Duration::minutes(5));

        assert!(slot.cancel());
        assert!(token.is_cancelled());
        assert!(!slot.is_armed());
        assert_eq!(slot.remaining_minutes(), None);
    }

    #[test]
    fn clear_does_not_cancel_token() {
        let mut slot = TimerSlot::new();
        let token = CancellationToken::new();
        slot.arm(token.clone(), Utc::now() + Duration::minutes(5));

        slot.clear();
        assert!(!token.is_cancelled());
        assert!(!slot.is_armed());
    }

    #[test]
    fn remaining_minutes_rounds_up() {
        let mut slot = TimerSlot::new();
        slot.arm(
            CancellationToken::new(),
            Utc::now() + Duration::seconds(4 * 60 + 30),
        );
        assert_eq!(slot.remaining_minutes(), Some(5));
    }

    #[test]
    fn remaining_minutes_floors_at_zero() {
        let mut slot = TimerSlot::new();
        slot.arm(CancellationToken::new(), Utc::now() - Duration::seconds(10));
        assert_eq!(slot.remaining_minutes(), Some(0));
    }
}
