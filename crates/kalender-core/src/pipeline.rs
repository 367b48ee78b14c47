//! The processing driver.
//!
//! A run takes the raw entry map, expands recurring entries, filters every
//! occurrence against the window and merges the survivors into a list
//! ordered by start. Work is split into passes of at most
//! `max_entries_per_pass` entries; whatever a pass leaves behind is picked
//! up by the next one, so every entry is eventually processed.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use tracing::{debug, trace};

use crate::config::{CalendarConfig, DEFAULT_MAX_ENTRIES_PER_PASS};
use crate::diagnostics::{Diagnostic, DiagnosticSink, TracingSink};
use crate::error::CalendarResult;
use crate::event::{ConcreteOccurrence, DisplayEvent, EntryKind, Event, EventMap, RuleLabel};
use crate::format::DateLabelFormatter;
use crate::merge::insert_sorted;
use crate::recurrence::RecurrenceExpander;
use crate::time::{TimeZoneOffset, Window};
use crate::window::{SummaryFilter, WindowFilter};

/// Result of a detailed run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PipelineOutput {
    /// Accepted events ordered by start.
    pub events: Vec<DisplayEvent>,
    /// Accepted occurrences keyed by per-instance uid.
    pub occurrences: BTreeMap<String, ConcreteOccurrence>,
    /// Number of passes the run took.
    pub passes: usize,
}

pub struct Pipeline {
    zone: TimeZoneOffset,
    expander: RecurrenceExpander,
    filter: WindowFilter,
    max_entries_per_pass: usize,
    sink: Arc<dyn DiagnosticSink>,
}

impl fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pipeline")
            .field("zone", &self.zone)
            .field("expander", &self.expander)
            .field("filter", &self.filter)
            .field("max_entries_per_pass", &self.max_entries_per_pass)
            .finish_non_exhaustive()
    }
}

impl Pipeline {
    /// Builds a pipeline from configuration.
    ///
    /// Fails on an unknown zone name or an invalid filter pattern.
    pub fn new(config: &CalendarConfig) -> CalendarResult<Self> {
        let zone = config.zone()?;
        let filter = config.summary_filter()?;
        Ok(Self::from_parts(zone, config.formatter(zone), filter)
            .with_max_entries_per_pass(config.max_entries_per_pass)
            .with_max_rule_iterations(config.max_rule_iterations))
    }

    pub fn from_parts(
        zone: TimeZoneOffset,
        formatter: DateLabelFormatter,
        filter: SummaryFilter,
    ) -> Self {
        Self {
            zone,
            expander: RecurrenceExpander::new(zone),
            filter: WindowFilter::new(zone, formatter, filter),
            max_entries_per_pass: DEFAULT_MAX_ENTRIES_PER_PASS,
            sink: Arc::new(TracingSink),
        }
    }

    #[must_use]
    pub fn with_sink(mut self, sink: Arc<dyn DiagnosticSink>) -> Self {
        self.sink = sink;
        self
    }

    #[must_use]
    pub fn with_max_entries_per_pass(mut self, max: usize) -> Self {
        self.max_entries_per_pass = max.max(1);
        self
    }

    #[must_use]
    pub fn with_max_rule_iterations(mut self, max: u16) -> Self {
        self.expander = self.expander.with_max_iterations(max);
        self
    }

    pub fn zone(&self) -> TimeZoneOffset {
        self.zone
    }

    /// Processes `events` and returns accepted events ordered by start.
    pub fn run(&self, events: EventMap, window: &Window) -> Vec<DisplayEvent> {
        self.run_detailed(events, window).events
    }

    /// Like [`Pipeline::run`], also returning the identity map.
    pub fn run_detailed(&self, mut events: EventMap, window: &Window) -> PipelineOutput {
        let mut output = PipelineOutput::default();
        let total = events.len();

        while !events.is_empty() {
            output.passes += 1;
            self.process_pass(&mut events, window, &mut output);
            if !events.is_empty() {
                self.sink.report(Diagnostic::PassDeferred {
                    pass: output.passes,
                    remaining: events.len(),
                });
            }
        }

        debug!(
            entries = total,
            accepted = output.events.len(),
            passes = output.passes,
            "Pipeline run complete"
        );
        output
    }

    /// Runs on the outcome of a retrieval. A failed retrieval yields an
    /// empty list.
    pub fn run_fetched<E: fmt::Display>(
        &self,
        fetched: Result<EventMap, E>,
        window: &Window,
    ) -> Vec<DisplayEvent> {
        match fetched {
            Ok(events) => self.run(events, window),
            Err(err) => {
                self.sink.report(Diagnostic::RetrievalFailed {
                    message: err.to_string(),
                });
                Vec::new()
            }
        }
    }

    fn process_pass(&self, remaining: &mut EventMap, window: &Window, output: &mut PipelineOutput) {
        for _ in 0..self.max_entries_per_pass {
            let Some((_, event)) = remaining.pop_first() else {
                break;
            };
            self.process_entry(event, window, output);
        }
    }

    fn process_entry(&self, mut event: Event, window: &Window, output: &mut PipelineOutput) {
        if event.kind != EntryKind::Event {
            trace!(uid = %event.uid, kind = ?event.kind, "Skipping non-event entry");
            return;
        }
        event.synthesize_end(&self.zone);

        if !event.is_recurring() {
            let occurrence = event.to_occurrence(&self.zone);
            self.accept(occurrence, RuleLabel::Single, window, output);
            return;
        }

        match self.expander.expand(&event, window) {
            Ok(occurrences) => {
                for occurrence in occurrences {
                    self.accept(occurrence, RuleLabel::Recurring, window, output);
                }
            }
            Err(err) => self.sink.report(Diagnostic::from_error(&event.uid, &err)),
        }
    }

    fn accept(
        &self,
        mut occurrence: ConcreteOccurrence,
        rule: RuleLabel,
        window: &Window,
        output: &mut PipelineOutput,
    ) {
        let Some(display) = self.filter.accept(occurrence.clone(), rule, window) else {
            return;
        };
        occurrence.end = display.event_end;
        output.occurrences.insert(display.id.clone(), occurrence);
        insert_sorted(&mut output.events, display);
    }
}
