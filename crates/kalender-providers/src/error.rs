//! Error types for calendar retrieval.

use std::fmt;
use thiserror::Error;

/// Category of a retrieval failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderErrorCode {
    /// Reading the underlying resource failed.
    Io,
    /// The data could not be parsed as a calendar.
    InvalidData,
    /// The resource does not exist.
    NotFound,
    /// Missing or invalid source settings.
    ConfigurationError,
    InternalError,
}

impl ProviderErrorCode {
    /// Returns true if retrying later may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Io)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Io => "io",
            Self::InvalidData => "invalid_data",
            Self::NotFound => "not_found",
            Self::ConfigurationError => "configuration_error",
            Self::InternalError => "internal_error",
        }
    }
}

impl fmt::Display for ProviderErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A failure while retrieving entries from a calendar source.
#[derive(Debug, Error)]
pub struct ProviderError {
    code: ProviderErrorCode,
    message: String,
    /// Name of the source, e.g. the calendar name or file path.
    source_name: Option<String>,
    #[source]
    source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl ProviderError {
    pub fn new(code: ProviderErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            source_name: None,
            source: None,
        }
    }

    pub fn io(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorCode::Io, message)
    }

    pub fn invalid_data(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorCode::InvalidData, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorCode::NotFound, message)
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorCode::ConfigurationError, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorCode::InternalError, message)
    }

    /// Maps an I/O error, keeping not-found distinct.
    pub fn from_io(err: std::io::Error, what: impl fmt::Display) -> Self {
        let base = if err.kind() == std::io::ErrorKind::NotFound {
            Self::not_found(format!("{what} not found"))
        } else {
            Self::io(format!("failed to read {what}"))
        };
        base.with_source(err)
    }

    #[must_use]
    pub fn with_source_name(mut self, name: impl Into<String>) -> Self {
        self.source_name = Some(name.into());
        self
    }

    #[must_use]
    pub fn with_source<E>(mut self, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        self.source = Some(Box::new(source));
        self
    }

    pub fn code(&self) -> ProviderErrorCode {
        self.code
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn source_name(&self) -> Option<&str> {
        self.source_name.as_deref()
    }

    pub fn is_retryable(&self) -> bool {
        self.code.is_retryable()
    }
}

impl fmt::Display for ProviderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(ref name) = self.source_name {
            write!(f, "[{}] ", name)?;
        }
        write!(f, "{}: {}", self.code, self.message)
    }
}

pub type ProviderResult<T> = Result<T, ProviderError>;
