//! Window intersection and summary filtering.
//!
//! Full-day occurrences are tested against `[pastview, preview]`. Timed
//! occurrences that started before `pastview` only count while they are
//! still running at `now`, so a timed event that ended before `now` is
//! dropped even when `pastview` reaches back over it.

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::countdown::Countdown;
use crate::error::CalendarResult;
use crate::event::{ConcreteOccurrence, DisplayEvent, RuleLabel};
use crate::format::DateLabelFormatter;
use crate::time::{TimeZoneOffset, Window};

/// How the summary pattern gates acceptance.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TriggerMode {
    /// Accept every summary.
    #[default]
    Always,
    /// Accept summaries matching the pattern.
    Match,
    /// Accept summaries not matching the pattern.
    #[serde(alias = "no_match")]
    NoMatch,
}

impl TriggerMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Always => "always",
            Self::Match => "match",
            Self::NoMatch => "nomatch",
        }
    }
}

impl std::str::FromStr for TriggerMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "always" => Ok(Self::Always),
            "match" => Ok(Self::Match),
            "nomatch" | "no_match" | "no-match" => Ok(Self::NoMatch),
            other => Err(format!("unknown trigger mode: {}", other)),
        }
    }
}

/// Match / no-match regular expression over occurrence summaries.
///
/// A missing pattern behaves like an empty one: it matches everything.
#[derive(Debug, Clone, Default)]
pub struct SummaryFilter {
    mode: TriggerMode,
    pattern: Option<Regex>,
}

impl SummaryFilter {
    /// Accepts everything.
    pub fn always() -> Self {
        Self::default()
    }

    pub fn new(mode: TriggerMode, pattern: Option<&str>) -> CalendarResult<Self> {
        let pattern = match (mode, pattern) {
            (TriggerMode::Always, _) | (_, None) => None,
            (_, Some(pattern)) => Some(Regex::new(pattern)?),
        };
        Ok(Self { mode, pattern })
    }

    pub fn matching(pattern: &str) -> CalendarResult<Self> {
        Self::new(TriggerMode::Match, Some(pattern))
    }

    pub fn not_matching(pattern: &str) -> CalendarResult<Self> {
        Self::new(TriggerMode::NoMatch, Some(pattern))
    }

    pub fn mode(&self) -> TriggerMode {
        self.mode
    }

    pub fn accepts(&self, summary: &str) -> bool {
        let matched = self
            .pattern
            .as_ref()
            .is_none_or(|pattern| pattern.is_match(summary));
        match self.mode {
            TriggerMode::Always => true,
            TriggerMode::Match => matched,
            TriggerMode::NoMatch => !matched,
        }
    }
}

/// Decides which occurrences intersect a window and labels them.
#[derive(Debug, Clone)]
pub struct WindowFilter {
    zone: TimeZoneOffset,
    formatter: DateLabelFormatter,
    filter: SummaryFilter,
}

impl WindowFilter {
    pub fn new(zone: TimeZoneOffset, formatter: DateLabelFormatter, filter: SummaryFilter) -> Self {
        Self {
            zone,
            formatter,
            filter,
        }
    }

    /// Full-day classification.
    ///
    /// Both ends must sit on local midnights and differ. A date-only
    /// occurrence of zero length is first stretched to one day.
    pub fn classify(&self, occurrence: &mut ConcreteOccurrence) -> bool {
        if !self.zone.is_midnight(occurrence.start) || !self.zone.is_midnight(occurrence.end) {
            return false;
        }
        if occurrence.start == occurrence.end && occurrence.all_day {
            occurrence.end = self.zone.add_days(occurrence.end, 1);
        }
        occurrence.end != occurrence.start
    }

    /// Window intersection test for an already classified occurrence.
    pub fn intersects(
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        fullday: bool,
        window: &Window,
    ) -> bool {
        if fullday {
            (start < window.preview && start >= window.pastview)
                || (end > window.pastview && end <= window.preview)
                || (start < window.pastview && end > window.pastview)
        } else {
            (start >= window.pastview && start < window.preview)
                || (end >= window.now && end <= window.preview)
                || (start < window.now && end > window.now)
        }
    }

    /// Classifies, filters and labels one occurrence.
    pub fn accept(
        &self,
        mut occurrence: ConcreteOccurrence,
        rule: RuleLabel,
        window: &Window,
    ) -> Option<DisplayEvent> {
        let fullday = self.classify(&mut occurrence);

        if !self.filter.accepts(&occurrence.summary) {
            trace!(uid = %occurrence.uid, summary = %occurrence.summary, "Filtered out by summary");
            return None;
        }
        if !Self::intersects(occurrence.start, occurrence.end, fullday, window) {
            return None;
        }

        let label = self
            .formatter
            .format(occurrence.start, occurrence.end, true, fullday, window.now);

        trace!(
            uid = %occurrence.uid,
            rule = rule.as_str(),
            fullday,
            date = %label.text,
            "Occurrence accepted"
        );

        Some(DisplayEvent {
            date: label.text,
            date_class: label.bucket,
            topic: occurrence.summary.clone(),
            summary: occurrence.summary,
            calendar_name: occurrence.calendar_name,
            countdown: Countdown::until(occurrence.start, window.now),
            event_start: occurrence.start,
            event_end: occurrence.end,
            description: occurrence.description,
            id: occurrence.uid,
            all_day: fullday,
            rule,
            location: occurrence.location,
        })
    }
}
