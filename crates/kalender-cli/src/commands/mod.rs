//! Command implementations.

pub mod config;
pub mod sensor;
pub mod upcoming;

use chrono::{DateTime, Utc};
use kalender_core::{CalendarConfig, DisplayEvent, Pipeline, TimeZoneOffset, Window};
use kalender_providers::{CalendarSource, IcsFileSource, fetch_all};
use tracing::debug;

use crate::cli::Cli;
use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};

/// Everything a command needs to fetch and process events.
pub struct Session {
    pub calendar: CalendarConfig,
    pub zone: TimeZoneOffset,
    pub pipeline: Pipeline,
    pub sources: Vec<Box<dyn CalendarSource>>,
    pub now: DateTime<Utc>,
    pub limit: Option<usize>,
}

impl Session {
    /// Merges file settings with flags.
    ///
    /// Fails on an invalid zone, pattern or view span, or when no source is
    /// configured.
    pub fn new(config: &ClientConfig, cli: &Cli) -> ClientResult<Self> {
        let mut calendar = config.calendar.clone();
        cli.apply_overrides(&mut calendar);

        calendar.validate()?;
        let zone = calendar.zone()?;
        let pipeline = Pipeline::new(&calendar)?;

        let mut sources = config.to_sources(zone);
        sources.extend(
            cli.ics
                .iter()
                .map(|path| Box::new(IcsFileSource::new(path, zone)) as Box<dyn CalendarSource>),
        );
        if sources.is_empty() {
            return Err(ClientError::Config(format!(
                "no calendar sources; add [[sources]] to {} or pass --ics",
                ClientConfig::default_path().display()
            )));
        }

        Ok(Self {
            calendar,
            zone,
            pipeline,
            sources,
            now: cli.now.unwrap_or_else(Utc::now),
            limit: cli.limit.or(config.display.limit),
        })
    }

    /// Fetches every source and runs the pipeline over `window`.
    ///
    /// A failed retrieval is reported and yields no events.
    pub async fn events(&self, window: &Window) -> Vec<DisplayEvent> {
        let fetched = fetch_all(&self.sources).await;
        let events = self.pipeline.run_fetched(fetched, window);
        debug!(
            sources = self.sources.len(),
            events = events.len(),
            zone = %self.zone,
            "Collected events"
        );
        events
    }

    /// The list window around `now`.
    pub fn window(&self) -> Window {
        self.calendar.window_at(self.now, &self.zone)
    }
}
