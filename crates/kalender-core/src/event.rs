//! Calendar entry and occurrence types.
//!
//! - [`Event`]: a raw entry as ingested, possibly recurring
//! - [`OverrideOccurrence`]: a replacement for one instance of a series
//! - [`Occurrence`]: a computed instance or its override, before resolution
//! - [`ConcreteOccurrence`]: one resolved instance with real start/end
//! - [`DisplayEvent`]: the labelled unit handed back to callers

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::countdown::Countdown;
use crate::format::DateBucket;
use crate::time::TimeZoneOffset;

/// Raw entries keyed by identifier, as handed over by retrieval.
pub type EventMap = BTreeMap<String, Event>;

/// iCalendar component kind of an entry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryKind {
    /// VEVENT
    #[default]
    Event,
    /// VTODO
    Todo,
    /// VJOURNAL
    Journal,
    Other,
}

/// A calendar entry as ingested.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    /// Series (or single entry) identifier.
    pub uid: String,
    #[serde(default)]
    pub kind: EntryKind,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub location: String,
    pub start: DateTime<Utc>,
    /// Exclusive end. Synthesized from `start` when absent.
    #[serde(default)]
    pub end: Option<DateTime<Utc>>,
    /// Set when the entry was declared with date values only.
    #[serde(default)]
    pub date_only: bool,
    /// Recurrence rule text (`FREQ=...`, optionally prefixed with `RRULE:`).
    #[serde(default)]
    pub rule: Option<String>,
    /// Instances removed from the series.
    #[serde(default)]
    pub exception_dates: BTreeSet<DateTime<Utc>>,
    /// Modified instances of the series.
    #[serde(default)]
    pub overrides: Vec<OverrideOccurrence>,
    #[serde(default)]
    pub calendar_name: Option<String>,
}

impl Event {
    /// Creates a single, timed entry with no end.
    pub fn new(uid: impl Into<String>, start: DateTime<Utc>) -> Self {
        Self {
            uid: uid.into(),
            kind: EntryKind::Event,
            summary: String::new(),
            description: String::new(),
            location: String::new(),
            start,
            end: None,
            date_only: false,
            rule: None,
            exception_dates: BTreeSet::new(),
            overrides: Vec::new(),
            calendar_name: None,
        }
    }

    #[must_use]
    pub fn with_summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = summary.into();
        self
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    #[must_use]
    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = location.into();
        self
    }

    #[must_use]
    pub fn with_end(mut self, end: DateTime<Utc>) -> Self {
        self.end = Some(end);
        self
    }

    #[must_use]
    pub fn with_kind(mut self, kind: EntryKind) -> Self {
        self.kind = kind;
        self
    }

    /// Marks the entry as declared with date values.
    #[must_use]
    pub fn with_date_only(mut self, date_only: bool) -> Self {
        self.date_only = date_only;
        self
    }

    #[must_use]
    pub fn with_rule(mut self, rule: impl Into<String>) -> Self {
        self.rule = Some(rule.into());
        self
    }

    #[must_use]
    pub fn with_exception(mut self, instant: DateTime<Utc>) -> Self {
        self.exception_dates.insert(instant);
        self
    }

    #[must_use]
    pub fn with_override(mut self, recurrence_instant: DateTime<Utc>, event: Event) -> Self {
        self.overrides.push(OverrideOccurrence::new(recurrence_instant, event));
        self
    }

    #[must_use]
    pub fn with_calendar_name(mut self, name: impl Into<String>) -> Self {
        self.calendar_name = Some(name.into());
        self
    }

    pub fn is_recurring(&self) -> bool {
        self.rule.is_some()
    }

    /// Returns the end, synthesizing one when absent.
    ///
    /// A start on local midnight gets a one-day span; any other start gets
    /// a zero-length span.
    pub fn end_or_synthesized(&self, zone: &TimeZoneOffset) -> DateTime<Utc> {
        match self.end {
            Some(end) => end,
            None if zone.is_midnight(self.start) => zone.add_days(self.start, 1),
            None => self.start,
        }
    }

    /// Fills in a missing end in place.
    pub fn synthesize_end(&mut self, zone: &TimeZoneOffset) {
        if self.end.is_none() {
            self.end = Some(self.end_or_synthesized(zone));
        }
    }

    /// Per-instance identifier: series uid followed by epoch milliseconds.
    pub fn instance_uid(&self, instant: DateTime<Utc>) -> String {
        format!("{}{}", self.uid, instant.timestamp_millis())
    }

    /// The entry as its own single occurrence.
    pub fn to_occurrence(&self, zone: &TimeZoneOffset) -> ConcreteOccurrence {
        ConcreteOccurrence {
            uid: self.instance_uid(self.start),
            start: self.start,
            end: self.end_or_synthesized(zone),
            all_day: self.date_only,
            summary: self.summary.clone(),
            description: self.description.clone(),
            location: self.location.clone(),
            calendar_name: self.calendar_name.clone(),
        }
    }
}

/// A modified instance of a recurring series.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverrideOccurrence {
    /// The instance this override replaces, as the rule would produce it.
    pub recurrence_instant: DateTime<Utc>,
    /// The replacement payload, with its own timing and text.
    pub event: Event,
}

impl OverrideOccurrence {
    pub fn new(recurrence_instant: DateTime<Utc>, event: Event) -> Self {
        Self {
            recurrence_instant,
            event,
        }
    }
}

/// One resolved instance with real start and end instants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConcreteOccurrence {
    /// Stable per-instance key.
    pub uid: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    /// Carries the date-only declaration of the source entry.
    pub all_day: bool,
    pub summary: String,
    pub description: String,
    pub location: String,
    pub calendar_name: Option<String>,
}

impl ConcreteOccurrence {
    pub fn duration(&self) -> Duration {
        self.end - self.start
    }

    /// Returns `true` if `now` falls within `[start, end]`.
    pub fn is_active_at(&self, now: DateTime<Utc>) -> bool {
        self.start <= now && now <= self.end
    }
}

/// A rule-produced instance before override resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Occurrence {
    /// Computed from the rule and the series template.
    Computed(ConcreteOccurrence),
    /// Replaced by a recorded override.
    Overridden(OverrideOccurrence),
}

impl Occurrence {
    /// Collapses the variant into the occurrence that gets windowed.
    ///
    /// An override keeps the identity of the instance it replaces and
    /// otherwise takes timing and text from its own payload.
    pub fn resolve(self, zone: &TimeZoneOffset) -> ConcreteOccurrence {
        match self {
            Self::Computed(occurrence) => occurrence,
            Self::Overridden(replacement) => {
                let mut occurrence = replacement.event.to_occurrence(zone);
                occurrence.uid = replacement.event.instance_uid(replacement.recurrence_instant);
                occurrence
            }
        }
    }

    pub fn is_overridden(&self) -> bool {
        matches!(self, Self::Overridden(_))
    }
}

/// Whether an output event came from a single entry or a recurring series.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleLabel {
    #[default]
    Single,
    #[serde(rename = "rrule")]
    Recurring,
}

impl RuleLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Single => "single",
            Self::Recurring => "rrule",
        }
    }
}

/// An accepted occurrence, labelled for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DisplayEvent {
    /// Rendered date label.
    pub date: String,
    /// Near-term bucket the label was derived from, if any.
    pub date_class: Option<DateBucket>,
    pub summary: String,
    pub topic: String,
    pub calendar_name: Option<String>,
    pub event_start: DateTime<Utc>,
    pub event_end: DateTime<Utc>,
    pub description: String,
    pub id: String,
    pub all_day: bool,
    pub rule: RuleLabel,
    pub location: String,
    pub countdown: Countdown,
}

impl DisplayEvent {
    /// Returns `true` if `now` falls within `[event_start, event_end]`.
    pub fn is_active_at(&self, now: DateTime<Utc>) -> bool {
        self.event_start <= now && now <= self.event_end
    }
}
