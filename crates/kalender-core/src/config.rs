//! Engine configuration.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{CalendarError, CalendarResult};
use crate::format::{DateLabelFormatter, Language};
use crate::recurrence::DEFAULT_MAX_ITERATIONS;
use crate::time::{MAX_VIEW_DAYS, TimeZoneOffset, ViewSpan, Window, shift_instant};
use crate::window::{SummaryFilter, TriggerMode};

/// Default number of entries processed per pass.
pub const DEFAULT_MAX_ENTRIES_PER_PASS: usize = 100;

/// Settings for one calendar view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CalendarConfig {
    pub language: Language,
    /// Render near-term dates as words ("Tomorrow") instead of dates.
    pub replace_dates: bool,
    pub trigger: TriggerMode,
    /// Summary pattern used by [`TriggerMode::Match`] and [`TriggerMode::NoMatch`].
    pub filter: Option<String>,
    pub preview: ViewSpan,
    pub pastview: ViewSpan,
    /// IANA zone name. Falls back to `TZ`, then UTC.
    pub timezone: Option<String>,
    pub max_entries_per_pass: usize,
    pub max_rule_iterations: u16,
}

impl Default for CalendarConfig {
    fn default() -> Self {
        Self {
            language: Language::En,
            replace_dates: false,
            trigger: TriggerMode::Always,
            filter: None,
            preview: ViewSpan::days(10),
            pastview: ViewSpan::days(0),
            timezone: None,
            max_entries_per_pass: DEFAULT_MAX_ENTRIES_PER_PASS,
            max_rule_iterations: DEFAULT_MAX_ITERATIONS,
        }
    }
}

impl CalendarConfig {
    /// Resolves the configured zone.
    pub fn zone(&self) -> CalendarResult<TimeZoneOffset> {
        match self.timezone.as_deref().map(str::trim) {
            Some(name) if !name.is_empty() => TimeZoneOffset::from_name(name),
            _ => Ok(TimeZoneOffset::from_env()),
        }
    }

    pub fn summary_filter(&self) -> CalendarResult<SummaryFilter> {
        SummaryFilter::new(self.trigger, self.filter.as_deref())
    }

    pub fn formatter(&self, zone: TimeZoneOffset) -> DateLabelFormatter {
        DateLabelFormatter::new(zone, self.language, self.replace_dates)
    }

    /// The list window around `now`.
    pub fn window_at(&self, now: DateTime<Utc>, zone: &TimeZoneOffset) -> Window {
        Window::from_spans(now, self.pastview, self.preview, zone)
    }

    /// The sensor window: from `now` to `now + preview`, with no past.
    pub fn sensor_window(&self, now: DateTime<Utc>) -> Window {
        Window::new(now, now, shift_instant(now, self.preview.duration()))
    }

    /// Checks the zone name, the filter pattern and the view spans.
    pub fn validate(&self) -> CalendarResult<()> {
        self.zone()?;
        self.summary_filter()?;
        for (name, span) in [("preview", self.preview), ("pastview", self.pastview)] {
            if !span.is_within_limit() {
                return Err(CalendarError::ViewSpanTooLong {
                    name,
                    span: span.to_string(),
                    max_days: MAX_VIEW_DAYS,
                });
            }
        }
        Ok(())
    }
}
