//! CalendarSource trait and the built-in sources.

use std::future::Future;
use std::path::{Path, PathBuf};
use std::pin::Pin;

use kalender_core::{EventMap, TimeZoneOffset};
use tracing::debug;

use crate::error::{ProviderError, ProviderErrorCode, ProviderResult};
use crate::ics::parse_ics_content;

/// A boxed future, so the trait stays object safe.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Something that can hand over a calendar's raw entries.
///
/// ```ignore
/// let source = IcsFileSource::new("work.ics", zone).with_calendar_name("Work");
/// let events = source.fetch().await?;
/// let upcoming = pipeline.run(events, &window);
/// ```
pub trait CalendarSource: Send + Sync {
    /// Name used in logs and errors.
    fn name(&self) -> &str;

    /// Retrieves every entry, keyed by identifier.
    fn fetch(&self) -> BoxFuture<'_, ProviderResult<EventMap>>;
}

/// Reads one or more `.ics` files.
#[derive(Debug, Clone)]
pub struct IcsFileSource {
    name: String,
    paths: Vec<PathBuf>,
    calendar_name: Option<String>,
    zone: TimeZoneOffset,
}

impl IcsFileSource {
    /// `zone` interprets floating times and dates in the files.
    pub fn new(path: impl AsRef<Path>, zone: TimeZoneOffset) -> Self {
        let path = path.as_ref().to_path_buf();
        Self {
            name: path.display().to_string(),
            paths: vec![path],
            calendar_name: None,
            zone,
        }
    }

    #[must_use]
    pub fn with_path(mut self, path: impl AsRef<Path>) -> Self {
        self.paths.push(path.as_ref().to_path_buf());
        self
    }

    /// Stamps every entry with a calendar name; also used as the source name.
    #[must_use]
    pub fn with_calendar_name(mut self, name: impl Into<String>) -> Self {
        let name = name.into();
        self.name.clone_from(&name);
        self.calendar_name = Some(name);
        self
    }

    pub fn paths(&self) -> &[PathBuf] {
        &self.paths
    }
}

impl CalendarSource for IcsFileSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn fetch(&self) -> BoxFuture<'_, ProviderResult<EventMap>> {
        Box::pin(async move {
            let mut events = EventMap::new();
            for path in &self.paths {
                let content = tokio::fs::read_to_string(path)
                    .await
                    .map_err(|e| ProviderError::from_io(e, path.display()).with_source_name(&self.name))?;
                let parsed = parse_ics_content(&content, self.calendar_name.as_deref(), &self.zone)
                    .map_err(|e| e.with_source_name(&self.name))?;
                debug!(path = %path.display(), count = parsed.len(), "Read calendar file");
                events.extend(parsed);
            }
            Ok(events)
        })
    }
}

/// Serves a fixed set of entries.
#[derive(Debug, Clone, Default)]
pub struct StaticSource {
    name: String,
    events: EventMap,
}

impl StaticSource {
    pub fn new(name: impl Into<String>, events: EventMap) -> Self {
        Self {
            name: name.into(),
            events,
        }
    }
}

impl CalendarSource for StaticSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn fetch(&self) -> BoxFuture<'_, ProviderResult<EventMap>> {
        let events = self.events.clone();
        Box::pin(async move { Ok(events) })
    }
}

/// Always fails, e.g. standing in for a source that could not be set up.
#[derive(Debug, Clone)]
pub struct ErrorSource {
    name: String,
    code: ProviderErrorCode,
    message: String,
}

impl ErrorSource {
    pub fn new(name: impl Into<String>, code: ProviderErrorCode, message: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            code,
            message: message.into(),
        }
    }
}

impl CalendarSource for ErrorSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn fetch(&self) -> BoxFuture<'_, ProviderResult<EventMap>> {
        let error = ProviderError::new(self.code, &self.message).with_source_name(&self.name);
        Box::pin(async move { Err(error) })
    }
}

/// Fetches every source in turn and merges the entries.
///
/// Stops at the first failing source.
pub async fn fetch_all(sources: &[Box<dyn CalendarSource>]) -> ProviderResult<EventMap> {
    let mut events = EventMap::new();
    for source in sources {
        let fetched = source.fetch().await?;
        debug!(source = source.name(), count = fetched.len(), "Fetched source");
        events.extend(fetched);
    }
    Ok(events)
}
