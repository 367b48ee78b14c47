//! Presence sensor: is an event running now?

use kalender_core::SensorState;
use serde::Serialize;

use super::Session;
use crate::error::ClientResult;

/// JSON payload of `kalender sensor --json`.
#[derive(Debug, Serialize)]
pub struct SensorOutput {
    #[serde(flatten)]
    pub state: SensorState,
    pub changed: bool,
}

/// Print the sensor state for `now`.
pub async fn run(session: &Session, previous: Option<bool>, json: bool) -> ClientResult<()> {
    let window = session.calendar.sensor_window(session.now);
    let events = session.events(&window).await;
    let state = SensorState::evaluate(&events, session.now);
    let output = SensorOutput {
        changed: state.changed_from(previous),
        state,
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        println!("{}", render_text(&output));
    }
    Ok(())
}

pub fn render_text(output: &SensorOutput) -> String {
    let mut line = match output.state.event {
        Some(ref event) => format!("on: {}", event.summary),
        None => "off".to_string(),
    };
    if output.changed {
        line.push_str(" (changed)");
    }
    line
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Duration, TimeZone, Utc};
    use kalender_core::{Countdown, DisplayEvent, RuleLabel};

    fn utc(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, min, s).unwrap()
    }

    fn running(summary: &str, start: DateTime<Utc>) -> DisplayEvent {
        DisplayEvent {
            date: "Today".into(),
            date_class: None,
            summary: summary.into(),
            topic: summary.into(),
            calendar_name: None,
            event_start: start,
            event_end: start + Duration::hours(1),
            description: String::new(),
            id: summary.into(),
            all_day: false,
            rule: RuleLabel::Single,
            location: String::new(),
            countdown: Countdown::default(),
        }
    }

    fn output(events: &[DisplayEvent], previous: Option<bool>) -> SensorOutput {
        let state = SensorState::evaluate(events, utc(2025, 2, 5, 10, 30, 0));
        SensorOutput {
            changed: state.changed_from(previous),
            state,
        }
    }

    #[test]
    fn on_while_event_runs() {
        let events = vec![running("Focus", utc(2025, 2, 5, 10, 0, 0))];
        let out = output(&events, Some(false));
        assert_eq!(render_text(&out), "on: Focus (changed)");

        let out = output(&events, Some(true));
        assert_eq!(render_text(&out), "on: Focus");
    }

    #[test]
    fn off_once_event_ends() {
        let events = vec![running("Lunch", utc(2025, 2, 5, 9, 0, 0))];
        let out = output(&events, Some(false));
        assert_eq!(render_text(&out), "off");
    }

    #[test]
    fn json_is_flat() {
        let out = output(&[], None);
        let value = serde_json::to_value(&out).unwrap();
        assert_eq!(value["on"], false);
        assert_eq!(value["changed"], true);
        assert!(value["event"].is_null());
    }
}
