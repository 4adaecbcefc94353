//! One-way email notification opt-in for a ticket.
//!
//! The toggle has two states, [`NotifyState::Off`] and [`NotifyState::On`].
//! The only transition is `Off -> On`, triggered by the client and persisted by
//! a single remote write. Once `On` has been observed (reported by the backend
//! or confirmed by a successful write) the toggle is disabled for good and
//! further triggers do nothing. A failed write leaves it `Off`; nothing retries.

/// Whether the client receives status-change emails for the ticket.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum NotifyState {
    #[default]
    Off,
    On,
}

/// Result of asking the toggle to start a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    /// The caller must perform the remote write and report back through
    /// [`NotificationToggle::complete`].
    Write,
    /// Already on; no write must happen.
    AlreadyOn,
    /// A write is already outstanding.
    InFlight,
}

/// Client-side view of a ticket's notify flag.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NotificationToggle {
    state: NotifyState,
    in_flight: bool,
}

impl NotificationToggle {
    /// A toggle in the initial `Off` state.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            state: NotifyState::Off,
            in_flight: false,
        }
    }

    /// A toggle seeded with the flag the backend reports.
    #[must_use]
    pub const fn from_remote(flag: bool) -> Self {
        let mut toggle = Self::new();
        toggle.observe(flag);
        toggle
    }

    /// Fold in a flag value seen on the backend. Only ever moves towards `On`.
    pub const fn observe(&mut self, flag: bool) {
        if flag {
            self.state = NotifyState::On;
            self.in_flight = false;
        }
    }

    /// Start the `Off -> On` transition.
    pub const fn trigger(&mut self) -> Trigger {
        match (self.state, self.in_flight) {
            (NotifyState::On, _) => Trigger::AlreadyOn,
            (NotifyState::Off, true) => Trigger::InFlight,
            (NotifyState::Off, false) => {
                self.in_flight = true;
                Trigger::Write
            }
        }
    }

    /// Record the outcome of the write started by [`trigger`](Self::trigger).
    pub const fn complete(&mut self, succeeded: bool) {
        self.in_flight = false;
        if succeeded {
            self.state = NotifyState::On;
        }
    }

    /// Current state.
    #[must_use]
    pub const fn state(&self) -> NotifyState {
        self.state
    }

    /// Whether notifications are on.
    #[must_use]
    pub const fn is_on(&self) -> bool {
        matches!(self.state, NotifyState::On)
    }

    /// Whether the control should be rendered disabled.
    #[must_use]
    pub const fn is_disabled(&self) -> bool {
        self.is_on() || self.in_flight
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_off_and_enabled() {
        let toggle = NotificationToggle::new();
        assert_eq!(toggle.state(), NotifyState::Off);
        assert!(!toggle.is_disabled());
    }

    #[test]
    fn test_remote_on_disables_immediately() {
        let mut toggle = NotificationToggle::from_remote(true);
        assert!(toggle.is_on());
        assert!(toggle.is_disabled());
        assert_eq!(toggle.trigger(), Trigger::AlreadyOn);
    }

    #[test]
    fn test_successful_write_is_terminal() {
        let mut toggle = NotificationToggle::from_remote(false);
        assert_eq!(toggle.trigger(), Trigger::Write);
        toggle.complete(true);
        assert!(toggle.is_on());
        assert!(toggle.is_disabled());

        for _ in 0..3 {
            assert_eq!(toggle.trigger(), Trigger::AlreadyOn);
        }
        // A later "off" reading never moves it back.
        toggle.observe(false);
        assert!(toggle.is_on());
    }

    #[test]
    fn test_failed_write_stays_off() {
        let mut toggle = NotificationToggle::new();
        assert_eq!(toggle.trigger(), Trigger::Write);
        toggle.complete(false);
        assert_eq!(toggle.state(), NotifyState::Off);
        assert!(!toggle.is_disabled());
        // The user may try again by hand.
        assert_eq!(toggle.trigger(), Trigger::Write);
    }

    #[test]
    fn test_second_trigger_while_in_flight() {
        let mut toggle = NotificationToggle::new();
        assert_eq!(toggle.trigger(), Trigger::Write);
        assert_eq!(toggle.trigger(), Trigger::InFlight);
        assert!(toggle.is_disabled());
    }
}
