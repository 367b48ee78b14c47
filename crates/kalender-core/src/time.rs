//! Time zone handling and query windows.
//!
//! [`TimeZoneOffset`] answers "what is the wall-clock offset at this instant"
//! and moves instants between the wall-clock frame and the zone-naive frame
//! recurrence rules are enumerated in. [`Window`] is the `{pastview, now,
//! preview}` triple every pipeline run is evaluated against, and
//! [`ViewSpan`] is the configuration shape windows are built from.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, NaiveTime, Offset, TimeZone, Timelike, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::error::{CalendarError, CalendarResult};

/// Wall-clock zone used to interpret calendar entries.
///
/// Offsets are evaluated per instant, so a series crossing a DST change
/// keeps its local start time on both sides of the transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeZoneOffset {
    tz: Tz,
}

impl Default for TimeZoneOffset {
    fn default() -> Self {
        Self::utc()
    }
}

impl TimeZoneOffset {
    /// Creates an offset calculator for the given zone.
    pub fn new(tz: Tz) -> Self {
        Self { tz }
    }

    /// The UTC zone (offset always zero).
    pub fn utc() -> Self {
        Self { tz: Tz::UTC }
    }

    /// Looks up an IANA zone name such as `Europe/Berlin`.
    pub fn from_name(name: &str) -> CalendarResult<Self> {
        name.trim()
            .parse::<Tz>()
            .map(Self::new)
            .map_err(|_| CalendarError::UnknownTimeZone(name.to_string()))
    }

    /// Uses the `TZ` environment variable, falling back to UTC.
    pub fn from_env() -> Self {
        std::env::var("TZ")
            .ok()
            .and_then(|name| Self::from_name(&name).ok())
            .unwrap_or_default()
    }

    /// Returns the underlying zone.
    pub fn timezone(&self) -> Tz {
        self.tz
    }

    /// Offset from UTC, in minutes, in effect at `instant`.
    pub fn offset_minutes(&self, instant: DateTime<Utc>) -> i64 {
        let offset = self.tz.offset_from_utc_datetime(&instant.naive_utc());
        i64::from(offset.fix().local_minus_utc()) / 60
    }

    /// Moves a wall-clock instant into the zone-naive rule frame.
    ///
    /// The result carries the local wall-clock fields labelled as UTC.
    pub fn to_rule_local(&self, instant: DateTime<Utc>) -> DateTime<Utc> {
        instant + Duration::minutes(self.offset_minutes(instant))
    }

    /// Moves a rule-frame instant back to a real instant.
    ///
    /// The offset is looked up at the candidate itself, so occurrences on
    /// either side of a DST change get their own correction.
    pub fn from_rule_local(&self, rule_local: DateTime<Utc>) -> DateTime<Utc> {
        let guess = rule_local - Duration::minutes(self.offset_minutes(rule_local));
        rule_local - Duration::minutes(self.offset_minutes(guess))
    }

    /// Local wall-clock fields of `instant`.
    pub fn local(&self, instant: DateTime<Utc>) -> NaiveDateTime {
        instant.with_timezone(&self.tz).naive_local()
    }

    /// Local calendar date of `instant`.
    pub fn local_date(&self, instant: DateTime<Utc>) -> NaiveDate {
        self.local(instant).date()
    }

    /// Returns `true` when `instant` sits exactly on a local midnight.
    pub fn is_midnight(&self, instant: DateTime<Utc>) -> bool {
        let local = self.local(instant);
        local.hour() == 0 && local.minute() == 0 && local.second() == 0
    }

    /// Resolves local wall-clock fields to an instant.
    ///
    /// Ambiguous times pick the earlier instant; times skipped by a DST
    /// gap are pushed forward by an hour.
    pub fn at_local(&self, local: NaiveDateTime) -> DateTime<Utc> {
        if let Some(dt) = self.tz.from_local_datetime(&local).earliest() {
            return dt.with_timezone(&Utc);
        }
        if let Some(dt) = self.tz.from_local_datetime(&(local + Duration::hours(1))).earliest() {
            return dt.with_timezone(&Utc);
        }
        self.from_rule_local(local.and_utc())
    }

    /// Local midnight starting `date`.
    pub fn start_of_day(&self, date: NaiveDate) -> DateTime<Utc> {
        self.at_local(date.and_time(NaiveTime::MIN))
    }

    /// Last millisecond of `date`.
    pub fn end_of_day(&self, date: NaiveDate) -> DateTime<Utc> {
        self.start_of_day(shift_date(date, 1)) - Duration::milliseconds(1)
    }

    /// Adds calendar days keeping the local wall-clock time.
    pub fn add_days(&self, instant: DateTime<Utc>, days: i64) -> DateTime<Utc> {
        let local = self.local(instant);
        self.at_local(shift_date(local.date(), days).and_time(local.time()))
    }
}

impl fmt::Display for TimeZoneOffset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.tz.name())
    }
}

/// Shifts a date by `days`, saturating at chrono's supported range.
pub(crate) fn shift_date(date: NaiveDate, days: i64) -> NaiveDate {
    Duration::try_days(days)
        .and_then(|delta| date.checked_add_signed(delta))
        .unwrap_or(if days < 0 { NaiveDate::MIN } else { NaiveDate::MAX })
}

/// Moves `instant` by `delta`, saturating at chrono's supported range.
pub(crate) fn shift_instant(instant: DateTime<Utc>, delta: Duration) -> DateTime<Utc> {
    instant.checked_add_signed(delta).unwrap_or(if delta < Duration::zero() {
        DateTime::<Utc>::MIN_UTC
    } else {
        DateTime::<Utc>::MAX_UTC
    })
}

/// The instants a pipeline run is evaluated against.
///
/// `pastview <= now <= preview` is expected but not enforced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Window {
    /// Earliest instant of interest.
    pub pastview: DateTime<Utc>,
    /// The evaluation instant.
    pub now: DateTime<Utc>,
    /// Latest instant of interest.
    pub preview: DateTime<Utc>,
}

impl Window {
    /// Creates a window from explicit instants.
    pub fn new(pastview: DateTime<Utc>, now: DateTime<Utc>, preview: DateTime<Utc>) -> Self {
        Self {
            pastview,
            now,
            preview,
        }
    }

    /// Builds a window around `now` from configured spans.
    ///
    /// Day spans snap to local day boundaries: the preview ends at the end of
    /// the last covered day and the pastview starts at a local midnight. A
    /// span of one day means "today only".
    pub fn from_spans(
        now: DateTime<Utc>,
        pastview: ViewSpan,
        preview: ViewSpan,
        zone: &TimeZoneOffset,
    ) -> Self {
        let today = zone.local_date(now);

        let preview = match preview.units {
            ViewUnit::Days => {
                let days = if preview.amount == 1 { 0 } else { preview.clamped_days() };
                zone.end_of_day(shift_date(today, days))
            }
            _ => shift_instant(now, preview.duration()),
        };

        let pastview = match pastview.units {
            ViewUnit::Days => {
                let days = if pastview.amount == 1 { 0 } else { pastview.clamped_days() };
                zone.start_of_day(shift_date(today, -days))
            }
            _ => shift_instant(now, -pastview.duration()),
        };

        Self::new(pastview, now, preview)
    }

    /// Length of the window from pastview to preview.
    pub fn span(&self) -> Duration {
        self.preview - self.pastview
    }
}

/// Longest view span honored, in days (about a century).
pub const MAX_VIEW_DAYS: i64 = 36_525;

/// Unit of a configured view span.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewUnit {
    #[serde(alias = "s")]
    Seconds,
    #[serde(alias = "m")]
    Minutes,
    #[serde(alias = "h")]
    Hours,
    #[default]
    #[serde(alias = "d")]
    Days,
    #[serde(alias = "w")]
    Weeks,
}

impl ViewUnit {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Seconds => "seconds",
            Self::Minutes => "minutes",
            Self::Hours => "hours",
            Self::Days => "days",
            Self::Weeks => "weeks",
        }
    }
}

/// An amount of time looking forward (preview) or back (pastview).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewSpan {
    pub amount: i64,
    #[serde(default)]
    pub units: ViewUnit,
}

impl ViewSpan {
    pub fn new(amount: i64, units: ViewUnit) -> Self {
        Self { amount, units }
    }

    pub fn days(amount: i64) -> Self {
        Self::new(amount, ViewUnit::Days)
    }

    /// Exact duration of the span, or `None` if it does not fit a
    /// [`Duration`].
    pub fn checked_duration(&self) -> Option<Duration> {
        match self.units {
            ViewUnit::Seconds => Duration::try_seconds(self.amount),
            ViewUnit::Minutes => Duration::try_minutes(self.amount),
            ViewUnit::Hours => Duration::try_hours(self.amount),
            ViewUnit::Days => Duration::try_days(self.amount),
            ViewUnit::Weeks => Duration::try_weeks(self.amount),
        }
    }

    /// Plain duration of the span, ignoring day boundaries.
    ///
    /// Clamped to [`MAX_VIEW_DAYS`] in either direction.
    pub fn duration(&self) -> Duration {
        let max = Duration::days(MAX_VIEW_DAYS);
        self.checked_duration()
            .unwrap_or(if self.amount < 0 { -max } else { max })
            .clamp(-max, max)
    }

    /// Returns `true` if the span is no longer than [`MAX_VIEW_DAYS`].
    pub fn is_within_limit(&self) -> bool {
        self.checked_duration()
            .is_some_and(|d| d.abs() <= Duration::days(MAX_VIEW_DAYS))
    }

    fn clamped_days(&self) -> i64 {
        self.amount.clamp(-MAX_VIEW_DAYS, MAX_VIEW_DAYS)
    }
}

impl fmt::Display for ViewSpan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.amount, self.units.as_str())
    }
}

impl FromStr for ViewUnit {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "s" | "sec" | "second" | "seconds" => Ok(Self::Seconds),
            "m" | "min" | "minute" | "minutes" => Ok(Self::Minutes),
            "h" | "hour" | "hours" => Ok(Self::Hours),
            "" | "d" | "day" | "days" => Ok(Self::Days),
            "w" | "week" | "weeks" => Ok(Self::Weeks),
            other => Err(format!("unknown view unit: {}", other)),
        }
    }
}

/// Parses `"10"`, `"36h"` or `"2 weeks"`; a bare number counts days.
impl FromStr for ViewSpan {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let split = s
            .char_indices()
            .find(|&(i, c)| !(c.is_ascii_digit() || (i == 0 && c == '-')))
            .map_or(s.len(), |(i, _)| i);
        let (amount, units) = s.split_at(split);
        let amount = amount
            .parse::<i64>()
            .map_err(|_| format!("invalid view span: {:?}", s))?;
        Ok(Self::new(amount, units.parse()?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod spans {
        use super::*;

        #[test]
        fn parse_view_spans() {
            assert_eq!("10".parse::<ViewSpan>().unwrap(), ViewSpan::days(10));
            assert_eq!(
                "36h".parse::<ViewSpan>().unwrap(),
                ViewSpan::new(36, ViewUnit::Hours)
            );
            assert_eq!(
                "2 weeks".parse::<ViewSpan>().unwrap(),
                ViewSpan::new(2, ViewUnit::Weeks)
            );
            assert_eq!(
                "-5m".parse::<ViewSpan>().unwrap(),
                ViewSpan::new(-5, ViewUnit::Minutes)
            );
            assert!("days".parse::<ViewSpan>().is_err());
            assert!("3 fortnights".parse::<ViewSpan>().is_err());
        }

        #[test]
        fn oversized_spans_are_clamped() {
            let huge: ViewSpan = "100000000w".parse().unwrap();
            assert!(!huge.is_within_limit());
            assert_eq!(huge.duration(), Duration::days(MAX_VIEW_DAYS));
            assert_eq!(
                ViewSpan::new(i64::MIN, ViewUnit::Seconds).duration(),
                -Duration::days(MAX_VIEW_DAYS)
            );
            assert!(ViewSpan::days(MAX_VIEW_DAYS).is_within_limit());
            assert!(!ViewSpan::days(MAX_VIEW_DAYS + 1).is_within_limit());
        }

        #[test]
        fn oversized_spans_build_a_window() {
            let now = utc(2024, 1, 10, 12, 0, 0);
            let zone = TimeZoneOffset::utc();

            let huge = "100000000w".parse().unwrap();
            let window = Window::from_spans(now, ViewSpan::days(0), huge, &zone);
            assert_eq!(window.preview, now + Duration::days(MAX_VIEW_DAYS));

            let window = Window::from_spans(
                now,
                ViewSpan::days(100_000_000),
                ViewSpan::days(i64::MAX),
                &zone,
            );
            assert_eq!(
                window.pastview,
                zone.start_of_day(date(2024, 1, 10) - Duration::days(MAX_VIEW_DAYS))
            );
            assert_eq!(
                window.preview,
                zone.end_of_day(date(2024, 1, 10) + Duration::days(MAX_VIEW_DAYS))
            );
        }
    }

    fn utc(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, min, s).unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn berlin() -> TimeZoneOffset {
        TimeZoneOffset::new(chrono_tz::Europe::Berlin)
    }

    mod zone {
        use super::*;

        #[test]
        fn utc_has_zero_offset() {
            let zone = TimeZoneOffset::utc();
            assert_eq!(zone.offset_minutes(utc(2024, 7, 1, 12, 0, 0)), 0);
            assert_eq!(zone.to_string(), "UTC");
        }

        #[test]
        fn offset_follows_dst() {
            let zone = berlin();
            assert_eq!(zone.offset_minutes(utc(2024, 1, 15, 12, 0, 0)), 60);
            assert_eq!(zone.offset_minutes(utc(2024, 7, 15, 12, 0, 0)), 120);
        }

        #[test]
        fn from_name() {
            assert_eq!(
                TimeZoneOffset::from_name("Europe/Berlin").unwrap(),
                berlin()
            );
            assert!(matches!(
                TimeZoneOffset::from_name("Nowhere/Special"),
                Err(CalendarError::UnknownTimeZone(_))
            ));
        }

        #[test]
        fn rule_local_roundtrip() {
            let zone = berlin();
            let winter = utc(2024, 1, 15, 9, 0, 0);
            let summer = utc(2024, 7, 15, 8, 0, 0);

            assert_eq!(zone.to_rule_local(winter), utc(2024, 1, 15, 10, 0, 0));
            assert_eq!(zone.to_rule_local(summer), utc(2024, 7, 15, 10, 0, 0));
            assert_eq!(zone.from_rule_local(utc(2024, 1, 15, 10, 0, 0)), winter);
            assert_eq!(zone.from_rule_local(utc(2024, 7, 15, 10, 0, 0)), summer);
        }

        #[test]
        fn midnight_detection_is_local() {
            let zone = berlin();
            assert!(zone.is_midnight(utc(2024, 1, 9, 23, 0, 0)));
            assert!(!zone.is_midnight(utc(2024, 1, 10, 0, 0, 0)));
            assert!(TimeZoneOffset::utc().is_midnight(utc(2024, 1, 10, 0, 0, 0)));
        }

        #[test]
        fn start_and_end_of_day() {
            let zone = berlin();
            assert_eq!(zone.start_of_day(date(2024, 1, 10)), utc(2024, 1, 9, 23, 0, 0));
            assert_eq!(
                zone.end_of_day(date(2024, 1, 10)),
                utc(2024, 1, 10, 22, 59, 59) + Duration::milliseconds(999)
            );
        }

        #[test]
        fn add_days_keeps_wall_clock_across_dst() {
            let zone = berlin();
            // 2024-03-31 is the spring-forward day in Berlin.
            let before = utc(2024, 3, 30, 9, 0, 0);
            assert_eq!(zone.add_days(before, 1), utc(2024, 3, 31, 8, 0, 0));
        }

        #[test]
        fn gap_times_move_forward() {
            let zone = berlin();
            let skipped = date(2024, 3, 31).and_hms_opt(2, 30, 0).unwrap();
            assert_eq!(zone.at_local(skipped), utc(2024, 3, 31, 1, 30, 0));
        }
    }

    mod window {
        use super::*;

        #[test]
        fn explicit_window() {
            let w = Window::new(
                utc(2024, 1, 1, 0, 0, 0),
                utc(2024, 1, 2, 0, 0, 0),
                utc(2024, 1, 11, 0, 0, 0),
            );
            assert_eq!(w.span(), Duration::days(10));
        }

        #[test]
        fn day_spans_snap_to_day_boundaries() {
            let zone = TimeZoneOffset::utc();
            let now = utc(2024, 1, 10, 12, 30, 0);
            let w = Window::from_spans(now, ViewSpan::days(2), ViewSpan::days(10), &zone);

            assert_eq!(w.pastview, utc(2024, 1, 8, 0, 0, 0));
            assert_eq!(w.now, now);
            assert_eq!(
                w.preview,
                utc(2024, 1, 20, 23, 59, 59) + Duration::milliseconds(999)
            );
        }

        #[test]
        fn one_day_means_today() {
            let zone = TimeZoneOffset::utc();
            let now = utc(2024, 1, 10, 12, 30, 0);
            let w = Window::from_spans(now, ViewSpan::days(1), ViewSpan::days(1), &zone);

            assert_eq!(w.pastview, utc(2024, 1, 10, 0, 0, 0));
            assert_eq!(
                w.preview,
                utc(2024, 1, 10, 23, 59, 59) + Duration::milliseconds(999)
            );
        }

        #[test]
        fn other_units_are_plain_durations() {
            let zone = berlin();
            let now = utc(2024, 1, 10, 12, 30, 0);
            let w = Window::from_spans(
                now,
                ViewSpan::new(90, ViewUnit::Minutes),
                ViewSpan::new(2, ViewUnit::Weeks),
                &zone,
            );

            assert_eq!(w.pastview, utc(2024, 1, 10, 11, 0, 0));
            assert_eq!(w.preview, utc(2024, 1, 24, 12, 30, 0));
        }

        #[test]
        fn span_units_deserialize_with_aliases() {
            let span: ViewSpan = serde_json::from_str(r#"{"amount": 3, "units": "h"}"#).unwrap();
            assert_eq!(span, ViewSpan::new(3, ViewUnit::Hours));

            let span: ViewSpan = serde_json::from_str(r#"{"amount": 5}"#).unwrap();
            assert_eq!(span, ViewSpan::days(5));
            assert_eq!(span.to_string(), "5 days");
        }
    }
}
