//! Summaries derived from a pipeline's output.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::event::DisplayEvent;
use crate::format::html_escape;
use crate::time::{TimeZoneOffset, shift_date};

/// Day counts and an HTML list for an agenda view.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AgendaSummary {
    /// Events touching today.
    pub today: usize,
    /// Events touching tomorrow.
    pub tomorrow: usize,
    pub total: usize,
    pub html_table: String,
}

impl AgendaSummary {
    pub fn from_events(events: &[DisplayEvent], now: DateTime<Utc>, zone: &TimeZoneOffset) -> Self {
        let today = zone.local_date(now);
        let today_start = zone.start_of_day(today);
        let tomorrow_start = zone.start_of_day(shift_date(today, 1));
        let after_tomorrow = zone.start_of_day(shift_date(today, 2));

        let touches = |event: &DisplayEvent, from: DateTime<Utc>, to: DateTime<Utc>| {
            event.event_end > from && event.event_start < to
        };

        Self {
            today: events
                .iter()
                .filter(|e| touches(e, today_start, tomorrow_start))
                .count(),
            tomorrow: events
                .iter()
                .filter(|e| touches(e, tomorrow_start, after_tomorrow))
                .count(),
            total: events.len(),
            html_table: html_list(events),
        }
    }
}

fn html_list(events: &[DisplayEvent]) -> String {
    let lines: Vec<String> = events
        .iter()
        .map(|e| html_escape(format!("{} {}", e.date, e.summary).trim()))
        .collect();
    format!("<span>{}</span>", lines.join("<br/>\n"))
}

/// On/off state of a calendar used as a presence sensor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SensorState {
    pub on: bool,
    /// The first active event.
    pub event: Option<DisplayEvent>,
}

impl SensorState {
    /// The sensor is on while one of `events` runs at `now`.
    ///
    /// `events` is a pipeline's output, so the trigger's summary filter has
    /// already been applied.
    pub fn evaluate(events: &[DisplayEvent], now: DateTime<Utc>) -> Self {
        let event = events.iter().find(|e| e.is_active_at(now)).cloned();
        Self {
            on: event.is_some(),
            event,
        }
    }

    /// Returns `true` if the on/off state differs from `previous`.
    ///
    /// An unknown previous state counts as a change.
    pub fn changed_from(&self, previous: Option<bool>) -> bool {
        previous != Some(self.on)
    }
}
