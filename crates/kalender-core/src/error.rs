//! Error types for the calendar engine.
//!
//! None of these are fatal to a pipeline run. Malformed rules and exhausted
//! iteration budgets skip a single series; a missing start skips a single
//! entry at ingestion time.

use thiserror::Error;

/// Errors raised while turning calendar entries into occurrences.
#[derive(Debug, Error)]
pub enum CalendarError {
    /// The recurrence rule could not be parsed or enumerated.
    #[error("malformed recurrence rule for {uid}: {message}")]
    MalformedRule {
        /// Series identifier.
        uid: String,
        /// What the rule engine complained about.
        message: String,
    },

    /// Rule enumeration hit the iteration ceiling before reaching the window end.
    #[error("recurrence rule for {uid} exceeded {limit} iterations")]
    RuleLimitExceeded {
        /// Series identifier.
        uid: String,
        /// The configured ceiling.
        limit: u16,
    },

    /// The entry has no start instant.
    #[error("entry {uid} has no start")]
    MissingStart {
        /// Entry identifier (may be generated).
        uid: String,
    },

    /// The summary filter pattern is not a valid regular expression.
    #[error("invalid summary filter: {0}")]
    InvalidFilter(#[from] regex::Error),

    /// The configured time zone name is not a known IANA zone.
    #[error("unknown time zone: {0}")]
    UnknownTimeZone(String),

    /// A preview or pastview span is longer than the engine accepts.
    #[error("{name} span {span} exceeds {max_days} days")]
    ViewSpanTooLong {
        name: &'static str,
        span: String,
        max_days: i64,
    },
}

impl CalendarError {
    /// Creates a malformed rule error.
    pub fn malformed_rule(uid: impl Into<String>, message: impl ToString) -> Self {
        Self::MalformedRule {
            uid: uid.into(),
            message: message.to_string(),
        }
    }

    /// Creates a missing start error.
    pub fn missing_start(uid: impl Into<String>) -> Self {
        Self::MissingStart { uid: uid.into() }
    }

    /// Returns `true` if the error only affects one series or entry.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::MalformedRule { .. } | Self::RuleLimitExceeded { .. } | Self::MissingStart { .. }
        )
    }
}

/// A specialized Result type for engine operations.
pub type CalendarResult<T> = Result<T, CalendarError>;
