//! Remaining-time decomposition.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

const SECONDS_PER_DAY: i64 = 24 * 60 * 60;

/// Days, hours, minutes and seconds from `now` until a target instant.
///
/// Past targets produce negative components; every component carries the
/// same sign.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Countdown {
    pub days: i64,
    pub hours: i64,
    pub minutes: i64,
    pub seconds: i64,
}

impl Countdown {
    /// Decomposes `target - now` on whole seconds.
    pub fn until(target: DateTime<Utc>, now: DateTime<Utc>) -> Self {
        let total = (target - now).num_seconds();
        Self {
            days: total / SECONDS_PER_DAY,
            hours: total % SECONDS_PER_DAY / 3600,
            minutes: total % 3600 / 60,
            seconds: total % 60,
        }
    }

    /// Total number of seconds represented.
    pub fn total_seconds(&self) -> i64 {
        self.days * SECONDS_PER_DAY + self.hours * 3600 + self.minutes * 60 + self.seconds
    }

    pub fn is_past(&self) -> bool {
        self.total_seconds() < 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn utc(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, min, s).unwrap()
    }

    #[test]
    fn future_target() {
        let now = utc(2024, 1, 10, 12, 0, 0);
        let target = utc(2024, 1, 12, 15, 30, 45);
        let c = Countdown::until(target, now);
        assert_eq!(
            c,
            Countdown {
                days: 2,
                hours: 3,
                minutes: 30,
                seconds: 45
            }
        );
        assert!(!c.is_past());
        assert_eq!(c.total_seconds(), (target - now).num_seconds());
    }

    #[test]
    fn same_instant_is_zero() {
        let now = utc(2024, 1, 10, 12, 0, 0);
        assert_eq!(Countdown::until(now, now), Countdown::default());
    }

    #[test]
    fn past_target_is_negative_throughout() {
        let now = utc(2024, 1, 10, 12, 0, 0);
        let target = now - Duration::seconds(90_061);
        let c = Countdown::until(target, now);
        assert_eq!(
            c,
            Countdown {
                days: -1,
                hours: -1,
                minutes: -1,
                seconds: -1
            }
        );
        assert!(c.is_past());
    }

    #[test]
    fn sub_second_remainder_is_dropped() {
        let now = utc(2024, 1, 10, 12, 0, 0);
        let target = now + Duration::milliseconds(1999);
        assert_eq!(Countdown::until(target, now).seconds, 1);
    }
}
