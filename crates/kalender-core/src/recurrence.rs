//! Recurrence expansion.
//!
//! Rules are evaluated in a zone-naive frame: the series start is moved to
//! its local wall-clock fields (labelled UTC) before the rule engine sees
//! it, and every produced date is moved back with the offset in effect at
//! that date. A daily 09:00 series therefore stays at 09:00 local time on
//! both sides of a DST change.

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, Utc};
use rrule::{RRule, RRuleSet, Tz, Unvalidated};
use tracing::{debug, trace};

use crate::error::{CalendarError, CalendarResult};
use crate::event::{ConcreteOccurrence, Event, Occurrence};
use crate::time::{TimeZoneOffset, Window};

/// Default ceiling on dates enumerated per series and run.
pub const DEFAULT_MAX_ITERATIONS: u16 = 1000;

const UNTIL_UTC: &str = "%Y%m%dT%H%M%SZ";
const UNTIL_FLOATING: &str = "%Y%m%dT%H%M%S";
const UNTIL_DATE: &str = "%Y%m%d";

/// Expands recurring entries into concrete occurrences inside a window.
#[derive(Debug, Clone, Copy)]
pub struct RecurrenceExpander {
    zone: TimeZoneOffset,
    max_iterations: u16,
}

impl RecurrenceExpander {
    pub fn new(zone: TimeZoneOffset) -> Self {
        Self {
            zone,
            max_iterations: DEFAULT_MAX_ITERATIONS,
        }
    }

    #[must_use]
    pub fn with_max_iterations(mut self, max_iterations: u16) -> Self {
        self.max_iterations = max_iterations.max(1);
        self
    }

    pub fn max_iterations(&self) -> u16 {
        self.max_iterations
    }

    /// Expands `event` and resolves overrides.
    ///
    /// Occurrences come back in rule order. Entries without a rule expand
    /// to nothing.
    pub fn expand(&self, event: &Event, window: &Window) -> CalendarResult<Vec<ConcreteOccurrence>> {
        Ok(self
            .candidates(event, window)?
            .into_iter()
            .map(|occurrence| occurrence.resolve(&self.zone))
            .collect())
    }

    /// Rule-produced instances in the search range, with exceptions
    /// removed and overrides substituted but not yet resolved.
    pub fn candidates(&self, event: &Event, window: &Window) -> CalendarResult<Vec<Occurrence>> {
        let Some(rule_text) = event.rule.as_deref() else {
            return Ok(Vec::new());
        };

        let end = event.end_or_synthesized(&self.zone);
        let length = end - event.start;

        let lower = self.zone.to_rule_local(self.search_start(length, window));
        let upper = self.zone.to_rule_local(window.preview);
        if upper < lower {
            return Ok(Vec::new());
        }

        let set = self.build(event, rule_text)?;
        let result = set
            .after((lower - Duration::seconds(1)).with_timezone(&Tz::UTC))
            .before((upper + Duration::seconds(1)).with_timezone(&Tz::UTC))
            .all(self.max_iterations.saturating_add(1));

        if result.limited || result.dates.len() > usize::from(self.max_iterations) {
            return Err(CalendarError::RuleLimitExceeded {
                uid: event.uid.clone(),
                limit: self.max_iterations,
            });
        }

        let mut occurrences = Vec::with_capacity(result.dates.len());
        for date in result.dates {
            let rule_local = date.with_timezone(&Utc);
            if rule_local < lower || rule_local > upper {
                continue;
            }

            let start = self.zone.from_rule_local(rule_local);
            if event.exception_dates.contains(&start) {
                trace!(uid = %event.uid, %start, "Excluded instance");
                continue;
            }

            if let Some(replacement) = event
                .overrides
                .iter()
                .find(|o| o.recurrence_instant == start)
            {
                trace!(uid = %event.uid, %start, "Overridden instance");
                occurrences.push(Occurrence::Overridden(replacement.clone()));
                continue;
            }

            occurrences.push(Occurrence::Computed(ConcreteOccurrence {
                uid: event.instance_uid(start),
                start,
                end: self.zone.from_rule_local(rule_local + length),
                all_day: event.date_only,
                summary: event.summary.clone(),
                description: event.description.clone(),
                location: event.location.clone(),
                calendar_name: event.calendar_name.clone(),
            }));
        }

        debug!(
            uid = %event.uid,
            count = occurrences.len(),
            "Expanded recurring entry"
        );
        Ok(occurrences)
    }

    /// Starts the search at today's local midnight, reaching back by the
    /// series length so instances begun earlier and still running are found.
    fn search_start(&self, length: Duration, window: &Window) -> DateTime<Utc> {
        let today = self.zone.start_of_day(self.zone.local_date(window.now));
        today.min(today - length)
    }

    fn build(&self, event: &Event, rule_text: &str) -> CalendarResult<RRuleSet> {
        let normalized = self
            .normalize_rule(rule_text)
            .map_err(|message| CalendarError::malformed_rule(&event.uid, message))?;
        let rule = normalized
            .parse::<RRule<Unvalidated>>()
            .map_err(|err| CalendarError::malformed_rule(&event.uid, err))?;
        let dt_start = self.zone.to_rule_local(event.start).with_timezone(&Tz::UTC);
        rule.build(dt_start)
            .map_err(|err| CalendarError::malformed_rule(&event.uid, err))
    }

    /// Picks the rule line out of `text` and rewrites `UNTIL` into the
    /// rule frame.
    ///
    /// `UNTIL` given as an instant is moved to local wall-clock fields;
    /// floating values are taken as wall-clock already; a bare date runs
    /// to the end of that day.
    fn normalize_rule(&self, text: &str) -> Result<String, String> {
        let line = text
            .lines()
            .map(str::trim)
            .find_map(|line| strip_prefix_ignore_case(line, "RRULE:"))
            .unwrap_or_else(|| text.trim());

        let mut parts = Vec::new();
        for part in line.split(';').map(str::trim).filter(|p| !p.is_empty()) {
            match part.split_once('=') {
                Some((key, value)) if key.eq_ignore_ascii_case("UNTIL") => {
                    let until = self.rule_frame_until(value.trim())?;
                    parts.push(format!("UNTIL={}", until.format(UNTIL_UTC)));
                }
                _ => parts.push(part.to_string()),
            }
        }

        if parts.is_empty() {
            return Err("empty rule".to_string());
        }
        Ok(parts.join(";"))
    }

    fn rule_frame_until(&self, value: &str) -> Result<NaiveDateTime, String> {
        if let Ok(instant) = NaiveDateTime::parse_from_str(value, UNTIL_UTC) {
            return Ok(self.zone.to_rule_local(instant.and_utc()).naive_utc());
        }
        if let Ok(floating) = NaiveDateTime::parse_from_str(value, UNTIL_FLOATING) {
            return Ok(floating);
        }
        NaiveDate::parse_from_str(value, UNTIL_DATE)
            .ok()
            .and_then(|date| date.and_hms_opt(23, 59, 59))
            .ok_or_else(|| format!("invalid UNTIL value {value:?}"))
    }
}

fn strip_prefix_ignore_case<'a>(line: &'a str, prefix: &str) -> Option<&'a str> {
    let head = line.get(..prefix.len())?;
    head.eq_ignore_ascii_case(prefix)
        .then(|| &line[prefix.len()..])
}
