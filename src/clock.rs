//! Uptime clock
//!
//! Counts seconds locally between status snapshots. Every snapshot overwrites
//! the count, so local ticking is only an approximation of the server value.
//! Observers follow the value through a `watch` channel.

use tokio::sync::watch;

/// Displayed while the uptime is unknown
pub const UPTIME_PLACEHOLDER: &str = "--:--:--:--";

const SECONDS_PER_DAY: u64 = 86_400;
const SECONDS_PER_HOUR: u64 = 3_600;
const SECONDS_PER_MINUTE: u64 = 60;

/// Clock state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ClockState {
    /// No uptime known (wire value -1)
    #[default]
    Unknown,
    /// Seconds elapsed
    Counting(u64),
}

impl ClockState {
    /// Map a signed seconds value; negatives mean unknown
    pub fn from_seconds(seconds: i64) -> Self {
        u64::try_from(seconds)
            .map(ClockState::Counting)
            .unwrap_or(ClockState::Unknown)
    }

    pub fn seconds(&self) -> Option<u64> {
        match self {
            ClockState::Unknown => None,
            ClockState::Counting(n) => Some(*n),
        }
    }

    pub fn display(&self) -> String {
        match self {
            ClockState::Unknown => UPTIME_PLACEHOLDER.to_string(),
            ClockState::Counting(n) => format_uptime(*n),
        }
    }
}

/// Format seconds as zero-padded `DD:HH:MM:SS`
pub fn format_uptime(total_seconds: u64) -> String {
    let days = total_seconds / SECONDS_PER_DAY;
    let hours = (total_seconds % SECONDS_PER_DAY) / SECONDS_PER_HOUR;
    let minutes = (total_seconds % SECONDS_PER_HOUR) / SECONDS_PER_MINUTE;
    let seconds = total_seconds % SECONDS_PER_MINUTE;
    format!("{:02}:{:02}:{:02}:{:02}", days, hours, minutes, seconds)
}

/// Observable uptime clock
#[derive(Debug)]
pub struct Clock {
    state: watch::Sender<ClockState>,
}

impl Clock {
    /// Create a clock in the unknown state
    pub fn new() -> Self {
        let (state, _) = watch::channel(ClockState::Unknown);
        Self { state }
    }

    /// Overwrite the count and notify observers
    pub fn set_seconds(&self, seconds: i64) {
        self.state.send_replace(ClockState::from_seconds(seconds));
    }

    /// Advance one second; no-op while unknown
    pub fn tick(&self) {
        self.state.send_if_modified(|state| match state {
            ClockState::Counting(n) => {
                *n = n.saturating_add(1);
                true
            }
            ClockState::Unknown => false,
        });
    }

    pub fn state(&self) -> ClockState {
        *self.state.borrow()
    }

    pub fn display(&self) -> String {
        self.state().display()
    }

    /// Subscribe to state changes
    pub fn subscribe(&self) -> watch::Receiver<ClockState> {
        self.state.subscribe()
    }
}

impl Default for Clock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_format_uptime() {
        assert_eq!(format_uptime(0), "00:00:00:00");
        assert_eq!(format_uptime(59), "00:00:00:59");
        assert_eq!(format_uptime(3_600), "00:01:00:00");
        assert_eq!(format_uptime(90_061), "01:01:01:01");
        assert_eq!(format_uptime(100 * 86_400), "100:00:00:00");
    }

    #[test]
    fn test_unknown_ignores_ticks() {
        let clock = Clock::new();
        assert_eq!(clock.display(), UPTIME_PLACEHOLDER);
        for _ in 0..5 {
            clock.tick();
        }
        assert_eq!(clock.state(), ClockState::Unknown);
        assert_eq!(clock.display(), UPTIME_PLACEHOLDER);
    }

    #[test]
    fn test_set_seconds_overwrites() {
        let clock = Clock::new();
        clock.set_seconds(10);
        clock.tick();
        clock.set_seconds(3);
        assert_eq!(clock.state(), ClockState::Counting(3));

        clock.set_seconds(-1);
        clock.tick();
        assert_eq!(clock.display(), UPTIME_PLACEHOLDER);
    }

    #[test]
    fn test_subscribers_see_updates() {
        let clock = Clock::new();
        let mut rx = clock.subscribe();
        assert!(!rx.has_changed().unwrap());

        clock.set_seconds(42);
        assert!(rx.has_changed().unwrap());
        assert_eq!(*rx.borrow_and_update(), ClockState::Counting(42));

        clock.tick();
        assert_eq!(*rx.borrow_and_update(), ClockState::Counting(43));
    }

    #[test]
    fn test_unknown_tick_does_not_notify() {
        let clock = Clock::new();
        let mut rx = clock.subscribe();
        clock.tick();
        assert!(!rx.has_changed().unwrap());
        assert_eq!(*rx.borrow_and_update(), ClockState::Unknown);
    }

    proptest! {
        #[test]
        fn prop_ticks_count_up_from_set_value(start in 0i64..10_000_000, ticks in 0usize..200) {
            let clock = Clock::new();
            clock.set_seconds(start);
            prop_assert_eq!(clock.display(), format_uptime(start as u64));

            for k in 1..=ticks {
                clock.tick();
                prop_assert_eq!(clock.display(), format_uptime(start as u64 + k as u64));
            }
        }

        #[test]
        fn prop_negative_is_placeholder(value in i64::MIN..0, ticks in 0usize..50) {
            let clock = Clock::new();
            clock.set_seconds(value);
            for _ in 0..ticks {
                clock.tick();
            }
            prop_assert_eq!(clock.display(), UPTIME_PLACEHOLDER);
        }

        #[test]
        fn prop_format_fields_are_in_range(secs in any::<u32>()) {
            let text = format_uptime(secs as u64);
            let fields: Vec<u64> = text.split(':').map(|f| f.parse().unwrap()).collect();
            prop_assert_eq!(fields.len(), 4);
            prop_assert!(fields[1] < 24 && fields[2] < 60 && fields[3] < 60);
            prop_assert_eq!(
                fields[0] * 86_400 + fields[1] * 3_600 + fields[2] * 60 + fields[3],
                secs as u64
            );
        }
    }
}
