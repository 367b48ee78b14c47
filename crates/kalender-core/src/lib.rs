//! Calendar engine: recurrence expansion, windowing, date labels

pub mod agenda;
pub mod config;
pub mod countdown;
pub mod diagnostics;
pub mod error;
pub mod event;
pub mod format;
pub mod merge;
pub mod pipeline;
pub mod recurrence;
pub mod time;
pub mod tracing;
pub mod window;

pub use agenda::{AgendaSummary, SensorState};
pub use config::CalendarConfig;
pub use countdown::Countdown;
pub use diagnostics::{Diagnostic, DiagnosticSink, MemorySink, TracingSink};
pub use error::{CalendarError, CalendarResult};
pub use event::{
    ConcreteOccurrence, DisplayEvent, EntryKind, Event, EventMap, Occurrence, OverrideOccurrence,
    RuleLabel,
};
pub use format::{DateBucket, DateLabel, DateLabelFormatter, Language, html_escape};
pub use merge::{SortedMerge, insert_sorted, insert_sorted_by};
pub use pipeline::{Pipeline, PipelineOutput};
pub use recurrence::RecurrenceExpander;
pub use time::{MAX_VIEW_DAYS, TimeZoneOffset, ViewSpan, ViewUnit, Window};
pub use self::tracing::{LogFormat, TracingConfig, TracingError, init_tracing};
pub use window::{SummaryFilter, TriggerMode, WindowFilter};
