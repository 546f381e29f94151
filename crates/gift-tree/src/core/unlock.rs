//! The calendar gate in front of every gift.
//!
//! Gifts open at one fixed instant: December 25, local midnight. Before it,
//! clicking a gift shows a countdown instead of its content.

use std::fmt;

use chrono::{DateTime, FixedOffset, NaiveDate, TimeZone, Utc};

/// Shown in place of the countdown once the gate is open.
pub const UNLOCKED_LABEL: &str = "¡YA ES NAVIDAD!";

const MS_PER_SECOND: i64 = 1000;
const MS_PER_MINUTE: i64 = 60 * MS_PER_SECOND;
const MS_PER_HOUR: i64 = 60 * MS_PER_MINUTE;
const MS_PER_DAY: i64 = 24 * MS_PER_HOUR;

/// Time left until the gate opens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Countdown {
    Remaining {
        days: i64,
        hours: i64,
        minutes: i64,
        seconds: i64,
    },
    Unlocked,
}

impl Countdown {
    /// Split a positive millisecond difference into whole units.
    fn from_millis(diff: i64) -> Self {
        Countdown::Remaining {
            days: diff / MS_PER_DAY,
            hours: (diff % MS_PER_DAY) / MS_PER_HOUR,
            minutes: (diff % MS_PER_HOUR) / MS_PER_MINUTE,
            seconds: (diff % MS_PER_MINUTE) / MS_PER_SECOND,
        }
    }

    pub fn is_unlocked(&self) -> bool {
        matches!(self, Countdown::Unlocked)
    }
}

impl fmt::Display for Countdown {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Countdown::Remaining {
                days,
                hours,
                minutes,
                seconds,
            } => write!(f, "{days}d {hours}h {minutes}m {seconds}s"),
            Countdown::Unlocked => f.write_str(UNLOCKED_LABEL),
        }
    }
}

/// A single instant before which gifts stay closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnlockGate {
    unlock_at: DateTime<Utc>,
}

impl UnlockGate {
    pub fn new(unlock_at: DateTime<Utc>) -> Self {
        Self { unlock_at }
    }

    /// December 25 of `year`, 00:00:00 in the zone at `offset`.
    pub fn christmas(year: i32, offset: FixedOffset) -> Option<Self> {
        let local = NaiveDate::from_ymd_opt(year, 12, 25)?.and_hms_opt(0, 0, 0)?;
        let at = offset.from_local_datetime(&local).single()?;
        Some(Self::new(at.with_timezone(&Utc)))
    }

    /// Gate at an instant computed by the host (milliseconds since the epoch).
    /// The browser resolves local midnight with its own zone rules, DST included.
    pub fn from_epoch_millis(millis: i64) -> Option<Self> {
        DateTime::from_timestamp_millis(millis).map(Self::new)
    }

    pub fn unlock_at(&self) -> DateTime<Utc> {
        self.unlock_at
    }

    pub fn is_unlocked(&self, now: DateTime<Utc>) -> bool {
        now >= self.unlock_at
    }

    pub fn countdown(&self, now: DateTime<Utc>) -> Countdown {
        if self.is_unlocked(now) {
            return Countdown::Unlocked;
        }
        Countdown::from_millis((self.unlock_at - now).num_milliseconds())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn utc_gate(year: i32) -> UnlockGate {
        UnlockGate::christmas(year, FixedOffset::east_opt(0).unwrap()).unwrap()
    }

    fn at(s: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(s).unwrap().with_timezone(&Utc)
    }

    #[test]
    fn christmas_is_local_midnight() {
        let gate = UnlockGate::christmas(2026, FixedOffset::west_opt(5 * 3600).unwrap()).unwrap();
        assert_eq!(gate.unlock_at(), at("2026-12-25T05:00:00Z"));
    }

    #[test]
    fn locked_until_the_exact_instant() {
        let gate = utc_gate(2026);
        let unlock = gate.unlock_at();
        assert!(!gate.is_unlocked(unlock - Duration::milliseconds(1)));
        assert!(gate.is_unlocked(unlock));
        assert!(gate.is_unlocked(unlock + Duration::days(3)));
    }

    #[test]
    fn countdown_splits_units() {
        let gate = utc_gate(2026);
        let now = at("2026-12-23T21:58:30.250Z");
        assert_eq!(
            gate.countdown(now),
            Countdown::Remaining {
                days: 1,
                hours: 2,
                minutes: 1,
                seconds: 29,
            }
        );
        assert_eq!(gate.countdown(now).to_string(), "1d 2h 1m 29s");
    }

    #[test]
    fn countdown_reports_unlocked_label() {
        let gate = utc_gate(2026);
        let countdown = gate.countdown(at("2026-12-25T00:00:00Z"));
        assert!(countdown.is_unlocked());
        assert_eq!(countdown.to_string(), UNLOCKED_LABEL);
    }

    #[test]
    fn last_millisecond_shows_zeroes() {
        let gate = utc_gate(2026);
        let countdown = gate.countdown(gate.unlock_at() - Duration::milliseconds(1));
        assert_eq!(countdown.to_string(), "0d 0h 0m 0s");
    }

    #[test]
    fn from_epoch_millis_round_trips() {
        let gate = utc_gate(2026);
        let millis = gate.unlock_at().timestamp_millis();
        assert_eq!(UnlockGate::from_epoch_millis(millis), Some(gate));
    }
}
