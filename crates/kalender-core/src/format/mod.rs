//! Date labels for occurrences.
//!
//! [`DateLabelFormatter`] renders an occurrence's start and end into a short
//! display string. Occurrences that have not started yet (and all-day
//! occurrences covering exactly today) are bucketed relative to today:
//! with word replacement enabled the bucket becomes a localized phrase
//! ("Tomorrow", "In 3 days"), otherwise an absolute `DD.MM.YYYY` date.
//! Occurrences already in progress show the time remaining, or the
//! absolute end date when word replacement is disabled.
//!
//! ```rust
//! use chrono::{TimeZone, Utc};
//! use kalender_core::format::{DateLabelFormatter, Language};
//! use kalender_core::TimeZoneOffset;
//!
//! let formatter = DateLabelFormatter::new(TimeZoneOffset::utc(), Language::En, true);
//! let now = Utc.with_ymd_and_hms(2024, 1, 9, 12, 0, 0).unwrap();
//! let start = Utc.with_ymd_and_hms(2024, 1, 10, 0, 0, 0).unwrap();
//! let end = Utc.with_ymd_and_hms(2024, 1, 11, 0, 0, 0).unwrap();
//!
//! assert_eq!(formatter.format(start, end, true, true, now).text, "Tomorrow");
//! ```

pub mod phrases;

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime, Timelike, Utc};
use serde::{Deserialize, Serialize};

use crate::time::{TimeZoneOffset, shift_date};

pub use phrases::{Language, PhraseKey, PluralForm, lookup, translate};

const SECONDS_PER_DAY: i64 = 24 * 60 * 60;

/// Near-term bucket of an occurrence's start date relative to today.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DateBucket {
    #[serde(rename = "ical_today")]
    Today,
    #[serde(rename = "ical_tomorrow")]
    Tomorrow,
    #[serde(rename = "ical_dayafter")]
    DayAfterTomorrow,
    #[serde(rename = "ical_3days")]
    InThreeDays,
    #[serde(rename = "ical_4days")]
    InFourDays,
    #[serde(rename = "ical_5days")]
    InFiveDays,
    #[serde(rename = "ical_6days")]
    InSixDays,
    #[serde(rename = "ical_oneweek")]
    InOneWeek,
}

impl DateBucket {
    /// Bucket for a start date `days` after today, if within a week.
    pub fn from_offset(days: i64) -> Option<Self> {
        match days {
            0 => Some(Self::Today),
            1 => Some(Self::Tomorrow),
            2 => Some(Self::DayAfterTomorrow),
            3 => Some(Self::InThreeDays),
            4 => Some(Self::InFourDays),
            5 => Some(Self::InFiveDays),
            6 => Some(Self::InSixDays),
            7 => Some(Self::InOneWeek),
            _ => None,
        }
    }

    /// CSS-style class name of the bucket.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Today => "ical_today",
            Self::Tomorrow => "ical_tomorrow",
            Self::DayAfterTomorrow => "ical_dayafter",
            Self::InThreeDays => "ical_3days",
            Self::InFourDays => "ical_4days",
            Self::InFiveDays => "ical_5days",
            Self::InSixDays => "ical_6days",
            Self::InOneWeek => "ical_oneweek",
        }
    }

    pub fn phrase_key(&self) -> PhraseKey {
        match self {
            Self::Today => PhraseKey::Today,
            Self::Tomorrow => PhraseKey::Tomorrow,
            Self::DayAfterTomorrow => PhraseKey::DayAfterTomorrow,
            Self::InThreeDays => PhraseKey::InThreeDays,
            Self::InFourDays => PhraseKey::InFourDays,
            Self::InFiveDays => PhraseKey::InFiveDays,
            Self::InSixDays => PhraseKey::InSixDays,
            Self::InOneWeek => PhraseKey::InOneWeek,
        }
    }
}

/// A rendered label and the bucket it was derived from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateLabel {
    pub text: String,
    pub bucket: Option<DateBucket>,
}

/// Renders occurrence start/end pairs into display labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateLabelFormatter {
    zone: TimeZoneOffset,
    language: Language,
    replace_dates: bool,
}

impl DateLabelFormatter {
    pub fn new(zone: TimeZoneOffset, language: Language, replace_dates: bool) -> Self {
        Self {
            zone,
            language,
            replace_dates,
        }
    }

    pub fn language(&self) -> Language {
        self.language
    }

    pub fn replaces_dates(&self) -> bool {
        self.replace_dates
    }

    /// Renders the label for an occurrence as seen at `now`.
    ///
    /// `with_time` controls the time suffix; `fullday` marks occurrences
    /// spanning whole local days (end exclusive at a midnight).
    pub fn format(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        with_time: bool,
        fullday: bool,
        now: DateTime<Utc>,
    ) -> DateLabel {
        let started = start < now;
        let local_start = self.zone.local(start);
        let local_end = self.zone.local(end);
        let today = self.zone.local_date(now);

        let time = if with_time {
            self.time_suffix(start, end, started, today)
        } else {
            String::new()
        };

        let today_only = fullday
            && local_start.date() == today
            && local_end.date() == shift_date(today, 1);

        if today_only || !started {
            let bucket = DateBucket::from_offset((local_start.date() - today).num_days());
            let text = match bucket {
                Some(bucket) if self.replace_dates => {
                    format!("{}{}", translate(bucket.phrase_key(), self.language), time)
                }
                _ => format!("{}{}", dotted_date(local_start.date()), time),
            };
            return DateLabel {
                text: text.trim().to_string(),
                bucket,
            };
        }

        let text = if self.replace_dates {
            self.remaining(end - now)
        } else if fullday {
            dotted_date(shift_date(local_end.date(), -1))
        } else {
            format!("{} {}", dotted_date(local_end.date()), clock(local_end))
        };

        DateLabel {
            text: text.trim().to_string(),
            bucket: Some(DateBucket::Today),
        }
    }

    /// Builds the `" HH:MM-HH:MM[+N]"` suffix.
    fn time_suffix(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        started: bool,
        today: NaiveDate,
    ) -> String {
        let local_start = self.zone.local(start);
        let local_end = self.zone.local(end);
        let length = end - start;

        let mut time = if started {
            String::new()
        } else {
            format!(" {}", clock(local_start))
        };

        if length.is_zero() {
            if local_start.hour() == 0 && local_start.minute() == 0 {
                time = " ".to_string();
            }
            return time;
        }
        if length < Duration::zero() {
            return time;
        }

        time.push(if started { ' ' } else { '-' });
        time.push_str(&clock(local_end));

        let start_day_end = self.zone.start_of_day(shift_date(local_start.date(), 1));
        if end > start_day_end {
            // Anchor one second past midnight so exact-midnight ends do not
            // count an extra day.
            let anchor_date = if started { today } else { local_start.date() };
            let anchor = self
                .zone
                .at_local(anchor_date.and_time(NaiveTime::MIN) + Duration::seconds(1));
            if length >= Duration::days(1) {
                let days = (end - anchor).num_seconds().div_euclid(SECONDS_PER_DAY);
                time.push_str(&format!("+{}", days));
            }
        } else if self.replace_dates && local_end.hour() == 0 && local_end.minute() == 0 {
            time = " ".to_string();
        }

        time
    }

    /// Remaining-time phrase for an occurrence already in progress.
    ///
    /// Counted in days once a full day remains, otherwise in hours. Both
    /// counts round to the nearest whole unit, halves rounding up.
    fn remaining(&self, left: Duration) -> String {
        if left < Duration::days(1) {
            let hours = round_to_unit(left, 60 * 60);
            return self.counted(hours, PhraseKey::Hour, PhraseKey::HoursFew, PhraseKey::Hours);
        }

        let days = round_to_unit(left, SECONDS_PER_DAY);
        if days % 7 == 0 {
            if let Some(key) = PhraseKey::weeks_left(days / 7) {
                return translate(key, self.language).to_string();
            }
        }
        self.counted(days, PhraseKey::Day, PhraseKey::DaysFew, PhraseKey::Days)
    }

    /// `"[still] N unit [left]"` with the unit in the right plural form.
    fn counted(&self, n: i64, one: PhraseKey, few: PhraseKey, many: PhraseKey) -> String {
        let unit = match self.language.plural_form(n) {
            PluralForm::One => one,
            PluralForm::Few => few,
            PluralForm::Many => many,
        };
        let count = n.to_string();
        [
            translate(PhraseKey::Still, self.language),
            count.as_str(),
            translate(unit, self.language),
            translate(PhraseKey::Left, self.language),
        ]
        .into_iter()
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
    }
}

/// Whole `unit_seconds` units in `span`, rounded half up.
fn round_to_unit(span: Duration, unit_seconds: i64) -> i64 {
    (span.num_seconds() + unit_seconds / 2).div_euclid(unit_seconds)
}

fn dotted_date(date: NaiveDate) -> String {
    format!("{:02}.{:02}.{}", date.day(), date.month(), date.year())
}

fn clock(local: NaiveDateTime) -> String {
    format!("{:02}:{:02}", local.hour(), local.minute())
}

/// Escapes text for HTML display.
pub fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn utc(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, min, s).unwrap()
    }

    fn words(language: Language) -> DateLabelFormatter {
        DateLabelFormatter::new(TimeZoneOffset::utc(), language, true)
    }

    fn dates() -> DateLabelFormatter {
        DateLabelFormatter::new(TimeZoneOffset::utc(), Language::En, false)
    }

    mod bucket {
        use super::*;

        #[test]
        fn offsets() {
            assert_eq!(DateBucket::from_offset(0), Some(DateBucket::Today));
            assert_eq!(DateBucket::from_offset(7), Some(DateBucket::InOneWeek));
            assert_eq!(DateBucket::from_offset(8), None);
            assert_eq!(DateBucket::from_offset(-1), None);
        }

        #[test]
        fn class_names() {
            assert_eq!(DateBucket::DayAfterTomorrow.as_str(), "ical_dayafter");
            assert_eq!(DateBucket::InThreeDays.as_str(), "ical_3days");
            assert_eq!(
                serde_json::to_string(&DateBucket::InOneWeek).unwrap(),
                r#""ical_oneweek""#
            );
        }
    }

    mod upcoming {
        use super::*;

        #[test]
        fn all_day_tomorrow() {
            let label = words(Language::En).format(
                utc(2024, 1, 10, 0, 0, 0),
                utc(2024, 1, 11, 0, 0, 0),
                true,
                true,
                utc(2024, 1, 9, 12, 0, 0),
            );
            assert_eq!(label.text, "Tomorrow");
            assert_eq!(label.bucket, Some(DateBucket::Tomorrow));
        }

        #[test]
        fn timed_today() {
            let label = words(Language::En).format(
                utc(2024, 1, 10, 14, 0, 0),
                utc(2024, 1, 10, 15, 30, 0),
                true,
                false,
                utc(2024, 1, 10, 9, 0, 0),
            );
            assert_eq!(label.text, "Today 14:00-15:30");
        }

        #[test]
        fn beyond_a_week_is_absolute() {
            let label = words(Language::En).format(
                utc(2024, 1, 20, 8, 5, 0),
                utc(2024, 1, 20, 9, 0, 0),
                true,
                false,
                utc(2024, 1, 10, 9, 0, 0),
            );
            assert_eq!(label.text, "20.01.2024 08:05-09:00");
            assert_eq!(label.bucket, None);
        }

        #[test]
        fn bucket_is_kept_without_word_replacement() {
            let label = dates().format(
                utc(2024, 1, 12, 8, 0, 0),
                utc(2024, 1, 12, 9, 0, 0),
                true,
                false,
                utc(2024, 1, 10, 9, 0, 0),
            );
            assert_eq!(label.text, "12.01.2024 08:00-09:00");
            assert_eq!(label.bucket, Some(DateBucket::DayAfterTomorrow));
        }

        #[test]
        fn without_time() {
            let label = dates().format(
                utc(2024, 1, 12, 8, 0, 0),
                utc(2024, 1, 12, 9, 0, 0),
                false,
                false,
                utc(2024, 1, 10, 9, 0, 0),
            );
            assert_eq!(label.text, "12.01.2024");
        }

        #[test]
        fn zero_length_midnight_has_no_time() {
            let label = dates().format(
                utc(2024, 1, 12, 0, 0, 0),
                utc(2024, 1, 12, 0, 0, 0),
                true,
                false,
                utc(2024, 1, 10, 9, 0, 0),
            );
            assert_eq!(label.text, "12.01.2024");
        }

        #[test]
        fn zero_length_timed_keeps_start() {
            let label = dates().format(
                utc(2024, 1, 12, 7, 45, 0),
                utc(2024, 1, 12, 7, 45, 0),
                true,
                false,
                utc(2024, 1, 10, 9, 0, 0),
            );
            assert_eq!(label.text, "12.01.2024 07:45");
        }

        #[test]
        fn multi_day_suffix() {
            let label = words(Language::En).format(
                utc(2024, 1, 11, 10, 0, 0),
                utc(2024, 1, 13, 12, 0, 0),
                true,
                false,
                utc(2024, 1, 10, 9, 0, 0),
            );
            assert_eq!(label.text, "Tomorrow 10:00-12:00+2");
        }

        #[test]
        fn overnight_under_a_day_has_no_suffix() {
            let label = words(Language::En).format(
                utc(2024, 1, 11, 22, 0, 0),
                utc(2024, 1, 12, 2, 0, 0),
                true,
                false,
                utc(2024, 1, 10, 9, 0, 0),
            );
            assert_eq!(label.text, "Tomorrow 22:00-02:00");
        }

        #[test]
        fn localized_bucket() {
            let label = words(Language::De).format(
                utc(2024, 1, 13, 18, 0, 0),
                utc(2024, 1, 13, 19, 0, 0),
                true,
                false,
                utc(2024, 1, 10, 9, 0, 0),
            );
            assert_eq!(label.text, "In 3 Tagen 18:00-19:00");
        }

        #[test]
        fn local_zone_decides_the_day() {
            let formatter =
                DateLabelFormatter::new(TimeZoneOffset::new(chrono_tz::Europe::Berlin), Language::En, true);
            // 23:30 UTC is already the next day in Berlin.
            let label = formatter.format(
                utc(2024, 1, 10, 23, 30, 0),
                utc(2024, 1, 11, 0, 30, 0),
                true,
                false,
                utc(2024, 1, 10, 9, 0, 0),
            );
            assert_eq!(label.text, "Tomorrow 00:30-01:30");
        }
    }

    mod in_progress {
        use super::*;

        #[test]
        fn hours_left() {
            let label = words(Language::En).format(
                utc(2024, 1, 10, 8, 0, 0),
                utc(2024, 1, 10, 12, 0, 0),
                true,
                false,
                utc(2024, 1, 10, 9, 0, 0),
            );
            assert_eq!(label.text, "3 hours left");
            assert_eq!(label.bucket, Some(DateBucket::Today));
        }

        #[test]
        fn one_hour_left_is_singular() {
            let label = words(Language::En).format(
                utc(2024, 1, 10, 8, 0, 0),
                utc(2024, 1, 10, 10, 10, 0),
                true,
                false,
                utc(2024, 1, 10, 9, 0, 0),
            );
            assert_eq!(label.text, "1 hour left");
        }

        #[test]
        fn days_left_german() {
            let label = words(Language::De).format(
                utc(2024, 1, 8, 0, 0, 0),
                utc(2024, 1, 13, 0, 0, 0),
                true,
                true,
                utc(2024, 1, 10, 9, 0, 0),
            );
            assert_eq!(label.text, "Noch 3 Tage");
        }

        #[test]
        fn counts_round_half_up() {
            let now = utc(2024, 1, 10, 9, 0, 0);
            let left = |end| {
                words(Language::En)
                    .format(utc(2024, 1, 10, 8, 0, 0), end, true, false, now)
                    .text
            };
            assert_eq!(left(utc(2024, 1, 10, 11, 30, 0)), "3 hours left");
            assert_eq!(left(utc(2024, 1, 10, 11, 29, 59)), "2 hours left");
            assert_eq!(left(utc(2024, 1, 10, 9, 20, 0)), "0 hours left");
            assert_eq!(left(utc(2024, 1, 11, 21, 0, 0)), "2 days left");
            assert_eq!(left(utc(2024, 1, 11, 20, 59, 59)), "1 day left");
            assert_eq!(left(utc(2024, 1, 17, 0, 0, 0)), "One week left");
        }

        #[test]
        fn whole_weeks_left() {
            let label = words(Language::En).format(
                utc(2024, 1, 1, 0, 0, 0),
                utc(2024, 1, 24, 9, 0, 0),
                true,
                false,
                utc(2024, 1, 10, 9, 0, 0),
            );
            assert_eq!(label.text, "Two weeks left");
        }

        #[test]
        fn russian_few_form() {
            let label = words(Language::Ru).format(
                utc(2024, 1, 9, 0, 0, 0),
                utc(2024, 1, 13, 10, 0, 0),
                true,
                false,
                utc(2024, 1, 10, 9, 0, 0),
            );
            assert_eq!(label.text, "3 дня осталось");
        }

        #[test]
        fn absolute_end_for_timed() {
            let label = dates().format(
                utc(2024, 1, 9, 8, 0, 0),
                utc(2024, 1, 11, 17, 15, 0),
                true,
                false,
                utc(2024, 1, 10, 9, 0, 0),
            );
            assert_eq!(label.text, "11.01.2024 17:15");
        }

        #[test]
        fn absolute_end_for_full_day_is_last_covered_day() {
            let label = dates().format(
                utc(2024, 1, 8, 0, 0, 0),
                utc(2024, 1, 13, 0, 0, 0),
                true,
                true,
                utc(2024, 1, 10, 9, 0, 0),
            );
            assert_eq!(label.text, "12.01.2024");
        }

        #[test]
        fn full_day_today_uses_today_bucket() {
            let label = words(Language::It).format(
                utc(2024, 1, 10, 0, 0, 0),
                utc(2024, 1, 11, 0, 0, 0),
                true,
                true,
                utc(2024, 1, 10, 9, 0, 0),
            );
            assert_eq!(label.text, "Oggi");
            assert_eq!(label.bucket, Some(DateBucket::Today));
        }
    }

    mod html {
        use super::*;

        #[test]
        fn escapes_special_chars() {
            assert_eq!(
                html_escape("<b>Tom & Jerry's \"show\"</b>"),
                "&lt;b&gt;Tom &amp; Jerry&#x27;s &quot;show&quot;&lt;/b&gt;"
            );
        }
    }
}
