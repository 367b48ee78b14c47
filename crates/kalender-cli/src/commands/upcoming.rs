//! Upcoming events listing.

use kalender_core::{AgendaSummary, DisplayEvent};
use serde::Serialize;

use super::Session;
use crate::error::ClientResult;

/// JSON payload of `kalender upcoming --json`.
#[derive(Debug, Serialize)]
pub struct UpcomingOutput<'a> {
    pub events: &'a [DisplayEvent],
    pub summary: AgendaSummary,
}

/// Print upcoming events and the agenda summary.
pub async fn run(session: &Session, json: bool) -> ClientResult<()> {
    let window = session.window();
    let mut events = session.events(&window).await;
    if let Some(limit) = session.limit {
        events.truncate(limit);
    }
    let summary = AgendaSummary::from_events(&events, session.now, &session.zone);

    if json {
        let output = UpcomingOutput {
            events: &events,
            summary,
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        print!("{}", render_text(&events, &summary));
    }
    Ok(())
}

/// One line per event, then the day counts.
pub fn render_text(events: &[DisplayEvent], summary: &AgendaSummary) -> String {
    let mut out = String::new();
    if events.is_empty() {
        out.push_str("No upcoming events\n");
        return out;
    }
    for event in events {
        out.push_str(&event.date);
        out.push_str("  ");
        out.push_str(&event.summary);
        if let Some(ref calendar) = event.calendar_name {
            out.push_str(&format!(" [{}]", calendar));
        }
        if !event.location.is_empty() {
            out.push_str(&format!(" @ {}", event.location));
        }
        out.push('\n');
    }
    out.push_str(&format!(
        "today: {}, tomorrow: {}, total: {}\n",
        summary.today, summary.tomorrow, summary.total
    ));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, TimeZone, Utc};
    use kalender_core::{Countdown, RuleLabel, TimeZoneOffset};

    fn utc(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, min, s).unwrap()
    }

    fn display(summary: &str, date: &str, start: DateTime<Utc>) -> DisplayEvent {
        DisplayEvent {
            date: date.into(),
            date_class: None,
            summary: summary.into(),
            topic: summary.into(),
            calendar_name: None,
            event_start: start,
            event_end: start + chrono::Duration::hours(1),
            description: String::new(),
            id: summary.to_lowercase(),
            all_day: false,
            rule: RuleLabel::Single,
            location: String::new(),
            countdown: Countdown::default(),
        }
    }

    #[test]
    fn empty_listing() {
        let text = render_text(&[], &AgendaSummary::default());
        assert_eq!(text, "No upcoming events\n");
    }

    #[test]
    fn lines_and_counts() {
        let now = utc(2025, 2, 5, 8, 0, 0);
        let mut standup = display("Standup", "05.02.2025, 10:00", utc(2025, 2, 5, 10, 0, 0));
        standup.calendar_name = Some("Work".into());
        let mut dentist = display("Dentist", "06.02.2025, 15:00", utc(2025, 2, 6, 15, 0, 0));
        dentist.location = "Main St 1".into();
        let events = vec![standup, dentist];
        let summary = AgendaSummary::from_events(&events, now, &TimeZoneOffset::utc());

        insta::assert_snapshot!(render_text(&events, &summary), @r"
        05.02.2025, 10:00  Standup [Work]
        06.02.2025, 15:00  Dentist @ Main St 1
        today: 1, tomorrow: 1, total: 2
        ");
    }

    #[test]
    fn json_payload_shape() {
        let events = vec![display("Standup", "Today", utc(2025, 2, 5, 10, 0, 0))];
        let output = UpcomingOutput {
            events: &events,
            summary: AgendaSummary::default(),
        };
        let value = serde_json::to_value(&output).unwrap();
        assert_eq!(value["events"][0]["summary"], "Standup");
        assert_eq!(value["events"][0]["rule"], "single");
        assert!(value["summary"].get("htmlTable").is_some());
    }
}
