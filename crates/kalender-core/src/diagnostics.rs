//! Non-fatal conditions raised while processing a batch.
//!
//! A batch never fails as a whole. Entries that cannot be expanded are
//! skipped and reported through a [`DiagnosticSink`]; the default sink
//! forwards to `tracing`.

use std::fmt;
use std::sync::Mutex;

use tracing::{debug, warn};

use crate::error::CalendarError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    /// A recurrence rule could not be parsed or built.
    MalformedRule { uid: String, message: String },
    /// Rule enumeration hit the iteration cap.
    RuleLimitExceeded { uid: String, limit: u16 },
    /// A pass hit the per-pass entry cap and left work for the next pass.
    PassDeferred { pass: usize, remaining: usize },
    /// Retrieval failed before any processing.
    RetrievalFailed { message: String },
}

impl Diagnostic {
    /// Converts a per-entry error. Errors that are not about a single
    /// entry become [`Diagnostic::MalformedRule`] under the given uid.
    pub fn from_error(uid: &str, err: &CalendarError) -> Self {
        match err {
            CalendarError::MalformedRule { uid, message } => Self::MalformedRule {
                uid: uid.clone(),
                message: message.clone(),
            },
            CalendarError::RuleLimitExceeded { uid, limit } => Self::RuleLimitExceeded {
                uid: uid.clone(),
                limit: *limit,
            },
            other => Self::MalformedRule {
                uid: uid.to_string(),
                message: other.to_string(),
            },
        }
    }

    /// Whether the condition means some data was skipped.
    pub fn is_loss(&self) -> bool {
        !matches!(self, Self::PassDeferred { .. })
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MalformedRule { uid, message } => {
                write!(f, "malformed recurrence rule for {uid}: {message}")
            }
            Self::RuleLimitExceeded { uid, limit } => {
                write!(f, "recurrence for {uid} exceeded {limit} iterations")
            }
            Self::PassDeferred { pass, remaining } => {
                write!(f, "pass {pass} deferred {remaining} entries")
            }
            Self::RetrievalFailed { message } => write!(f, "retrieval failed: {message}"),
        }
    }
}

pub trait DiagnosticSink: Send + Sync {
    fn report(&self, diagnostic: Diagnostic);
}

/// Logs diagnostics; skipped data at `warn`, deferrals at `debug`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn report(&self, diagnostic: Diagnostic) {
        match &diagnostic {
            Diagnostic::PassDeferred { pass, remaining } => {
                debug!(pass, remaining, "Pass cap reached, deferring");
            }
            Diagnostic::MalformedRule { uid, message } => {
                warn!(uid = %uid, error = %message, "Skipping entry with malformed rule");
            }
            Diagnostic::RuleLimitExceeded { uid, limit } => {
                warn!(uid = %uid, limit, "Skipping entry over iteration cap");
            }
            Diagnostic::RetrievalFailed { message } => {
                warn!(error = %message, "Retrieval failed");
            }
        }
    }
}

/// Collects diagnostics in memory.
#[derive(Debug, Default)]
pub struct MemorySink {
    entries: Mutex<Vec<Diagnostic>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> Vec<Diagnostic> {
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// Drains everything collected so far.
    pub fn take(&self) -> Vec<Diagnostic> {
        std::mem::take(
            &mut *self
                .entries
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner()),
        )
    }
}

impl DiagnosticSink for MemorySink {
    fn report(&self, diagnostic: Diagnostic) {
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(diagnostic);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_error_keeps_variant() {
        let err = CalendarError::RuleLimitExceeded {
            uid: "series".into(),
            limit: 1000,
        };
        assert_eq!(
            Diagnostic::from_error("series", &err),
            Diagnostic::RuleLimitExceeded {
                uid: "series".into(),
                limit: 1000
            }
        );

        let err = CalendarError::missing_start("x");
        assert!(matches!(
            Diagnostic::from_error("x", &err),
            Diagnostic::MalformedRule { uid, .. } if uid == "x"
        ));
    }

    #[test]
    fn memory_sink_collects_and_drains() {
        let sink = MemorySink::new();
        sink.report(Diagnostic::PassDeferred {
            pass: 1,
            remaining: 150,
        });
        sink.report(Diagnostic::RetrievalFailed {
            message: "boom".into(),
        });
        assert_eq!(sink.snapshot().len(), 2);
        assert_eq!(sink.take().len(), 2);
        assert!(sink.snapshot().is_empty());
    }

    #[test]
    fn loss_classification() {
        assert!(!Diagnostic::PassDeferred { pass: 1, remaining: 1 }.is_loss());
        assert!(Diagnostic::RetrievalFailed { message: String::new() }.is_loss());
    }

    #[test]
    fn display() {
        let d = Diagnostic::MalformedRule {
            uid: "a".into(),
            message: "bad FREQ".into(),
        };
        assert_eq!(d.to_string(), "malformed recurrence rule for a: bad FREQ");
    }
}
