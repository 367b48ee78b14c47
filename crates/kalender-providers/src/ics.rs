//! iCalendar (RFC 5545) ingestion.
//!
//! Turns ICS text into the engine's [`EventMap`]. Recurring series keep
//! their rule text verbatim; expansion happens in the engine. Components
//! carrying `RECURRENCE-ID` are attached to their series as overrides.

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, TimeZone, Utc};
use icalendar::{Calendar, CalendarComponent, Component, Property};
use kalender_core::{
    CalendarError, EntryKind, Event, EventMap, OverrideOccurrence, TimeZoneOffset,
};
use tracing::{debug, trace, warn};

use crate::error::{ProviderError, ProviderResult};

/// A parsed date or date-time property value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IcsTime {
    pub instant: DateTime<Utc>,
    /// The value was a `DATE` rather than a `DATE-TIME`.
    pub date_only: bool,
}

/// Parses ICS content into entries keyed by UID.
///
/// Entries without `DTSTART` are skipped. Overrides whose series is not in
/// the content are kept as standalone entries.
pub fn parse_ics_content(
    ics: &str,
    calendar_name: Option<&str>,
    zone: &TimeZoneOffset,
) -> ProviderResult<EventMap> {
    let calendar = ics
        .parse::<Calendar>()
        .map_err(|e| ProviderError::invalid_data(format!("failed to parse ICS content: {e}")))?;

    let mut events = EventMap::new();
    let mut overrides = Vec::new();

    for component in calendar.iter() {
        let parsed = match component {
            CalendarComponent::Event(event) => parse_component(event, EntryKind::Event, zone),
            CalendarComponent::Todo(todo) => parse_component(todo, EntryKind::Todo, zone),
            _ => {
                trace!("Skipping unsupported calendar component");
                continue;
            }
        };

        let (mut event, recurrence_id) = match parsed {
            Ok(parsed) => parsed,
            Err(err) => {
                debug!(error = %err, "Skipping calendar entry");
                continue;
            }
        };
        if let Some(name) = calendar_name {
            event = event.with_calendar_name(name);
        }

        match recurrence_id {
            Some(instant) => overrides.push((instant, event)),
            None => {
                if events.contains_key(&event.uid) {
                    debug!(uid = %event.uid, "Duplicate UID, keeping the later entry");
                }
                events.insert(event.uid.clone(), event);
            }
        }
    }

    for (instant, replacement) in overrides {
        match events.get_mut(&replacement.uid) {
            Some(series) => {
                trace!(uid = %series.uid, %instant, "Attached override");
                series
                    .overrides
                    .push(OverrideOccurrence::new(instant, replacement));
            }
            None => {
                let key = replacement.instance_uid(instant);
                debug!(uid = %replacement.uid, "Override without series, keeping standalone");
                events.insert(key, replacement);
            }
        }
    }

    debug!(count = events.len(), calendar = ?calendar_name, "Parsed ICS content");
    Ok(events)
}

/// Parses one component. Returns the entry and its `RECURRENCE-ID`, if any.
fn parse_component(
    component: &impl Component,
    kind: EntryKind,
    zone: &TimeZoneOffset,
) -> Result<(Event, Option<DateTime<Utc>>), CalendarError> {
    let uid = component
        .property_value("UID")
        .map(str::to_string)
        .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());

    let start = property(component, "DTSTART")
        .and_then(|p| parse_time_property(p, zone))
        .ok_or_else(|| CalendarError::missing_start(&uid))?;

    let end = match property(component, "DTEND").and_then(|p| parse_time_property(p, zone)) {
        Some(end) => Some(end.instant),
        None => component
            .property_value("DURATION")
            .and_then(parse_duration)
            .map(|d| start.instant + d),
    };

    let text = |key: &str| component.property_value(key).unwrap_or_default().to_string();
    let mut event = Event::new(uid, start.instant)
        .with_kind(kind)
        .with_summary(text("SUMMARY"))
        .with_description(text("DESCRIPTION"))
        .with_location(text("LOCATION"))
        .with_date_only(start.date_only);
    if let Some(end) = end {
        event = event.with_end(end);
    }
    if let Some(rule) = component.property_value("RRULE") {
        event = event.with_rule(rule);
    }
    for exdate in exception_dates(component, zone) {
        event = event.with_exception(exdate);
    }

    let recurrence_id = property(component, "RECURRENCE-ID")
        .and_then(|p| parse_time_property(p, zone))
        .map(|t| t.instant);

    trace!(
        uid = %event.uid,
        summary = %event.summary,
        start = %event.start,
        recurring = event.is_recurring(),
        "Parsed calendar entry"
    );
    Ok((event, recurrence_id))
}

fn property<'a>(component: &'a impl Component, key: &str) -> Option<&'a Property> {
    component.properties().get(key)
}

/// Every `EXDATE` instant, whether given once with a list or repeated.
fn exception_dates(component: &impl Component, zone: &TimeZoneOffset) -> Vec<DateTime<Utc>> {
    let single = component.properties().get("EXDATE").into_iter();
    let multi = component
        .multi_properties()
        .get("EXDATE")
        .into_iter()
        .flatten();

    single
        .chain(multi)
        .flat_map(|prop| {
            let tzid = param(prop, "TZID");
            let date_value = is_date_value(prop);
            prop.value()
                .split(',')
                .filter_map(|value| {
                    parse_ics_datetime(value, tzid.as_deref(), date_value, zone)
                        .map(|t| t.instant)
                })
                .collect::<Vec<_>>()
        })
        .collect()
}

fn param(prop: &Property, name: &str) -> Option<String> {
    prop.params()
        .get(name)
        .map(|p| p.value().trim_matches('"').to_string())
}

fn is_date_value(prop: &Property) -> bool {
    param(prop, "VALUE").is_some_and(|v| v.eq_ignore_ascii_case("DATE"))
}

fn parse_time_property(prop: &Property, zone: &TimeZoneOffset) -> Option<IcsTime> {
    let tzid = param(prop, "TZID");
    parse_ics_datetime(prop.value(), tzid.as_deref(), is_date_value(prop), zone)
}

/// Parses an iCalendar date or date-time value.
///
/// Handles:
/// - `20250205T100000Z` (UTC)
/// - `20250205T100000` with a `TZID` (resolved through the zone database)
/// - `20250205T100000` without `TZID` (floating, read in `zone`)
/// - `20250205` (date, local midnight in `zone`)
///
/// An unknown `TZID` falls back to `zone`.
pub fn parse_ics_datetime(
    value: &str,
    tzid: Option<&str>,
    date_value: bool,
    zone: &TimeZoneOffset,
) -> Option<IcsTime> {
    let value = value.trim();

    if date_value || (value.len() == 8 && value.chars().all(|c| c.is_ascii_digit())) {
        let date = NaiveDate::parse_from_str(value, "%Y%m%d").ok()?;
        return Some(IcsTime {
            instant: zone.start_of_day(date),
            date_only: true,
        });
    }

    if let Some(utc) = value.strip_suffix('Z') {
        let naive = NaiveDateTime::parse_from_str(utc, "%Y%m%dT%H%M%S").ok()?;
        return Some(IcsTime {
            instant: Utc.from_utc_datetime(&naive),
            date_only: false,
        });
    }

    let naive = NaiveDateTime::parse_from_str(value, "%Y%m%dT%H%M%S").ok()?;
    let instant = match tzid.map(|name| (name, name.parse::<chrono_tz::Tz>())) {
        Some((_, Ok(tz))) => TimeZoneOffset::new(tz).at_local(naive),
        Some((name, Err(_))) => {
            warn!(tzid = %name, "Unknown TZID, using the configured zone");
            zone.at_local(naive)
        }
        None => zone.at_local(naive),
    };
    Some(IcsTime {
        instant,
        date_only: false,
    })
}

/// Parses an RFC 5545 `DURATION` value such as `PT1H30M`, `P1D` or `-P1W`.
pub fn parse_duration(value: &str) -> Option<Duration> {
    let value = value.trim();
    let (negative, rest) = match value.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, value.strip_prefix('+').unwrap_or(value)),
    };
    let rest = rest.strip_prefix('P')?;

    let mut total = Duration::zero();
    let mut digits = String::new();
    let mut in_time = false;
    let mut any = false;

    for c in rest.chars() {
        match c {
            'T' => in_time = true,
            '0'..='9' => digits.push(c),
            'W' | 'D' | 'H' | 'M' | 'S' => {
                // No months in DURATION: M only appears after T.
                if c == 'M' && !in_time {
                    return None;
                }
                let amount: i64 = digits.parse().ok()?;
                digits.clear();
                any = true;
                total += match c {
                    'W' => Duration::weeks(amount),
                    'D' => Duration::days(amount),
                    'H' => Duration::hours(amount),
                    'M' => Duration::minutes(amount),
                    _ => Duration::seconds(amount),
                };
            }
            _ => return None,
        }
    }

    if !digits.is_empty() || !any {
        return None;
    }
    Some(if negative { -total } else { total })
}
