//! Client configuration.
//!
//! All settings live in a single `config.toml` file at
//! `~/.config/kalender/config.toml` by default:
//!
//! ```toml
//! debug = false
//!
//! [calendar]
//! language = "de"
//! replace_dates = true
//! timezone = "Europe/Berlin"
//! preview = { amount = 7, units = "days" }
//!
//! [[sources]]
//! path = "calendars/work.ics"
//! name = "Work"
//!
//! [display]
//! limit = 10
//! ```
//!
//! Relative source paths are resolved against the file's directory.

use std::path::{Path, PathBuf};

use kalender_core::{CalendarConfig, TimeZoneOffset};
use kalender_providers::{CalendarSource, IcsFileSource};
use serde::{Deserialize, Serialize};

/// Configuration for the kalender client.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Debug mode.
    pub debug: bool,

    /// Engine settings.
    pub calendar: CalendarConfig,

    /// Calendar files to read.
    pub sources: Vec<SourceSettings>,

    /// Display settings.
    pub display: DisplaySettings,
}

/// One `.ics` file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceSettings {
    pub path: PathBuf,

    /// Calendar name stamped on its events.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl SourceSettings {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            name: None,
        }
    }

    pub fn to_source(&self, zone: TimeZoneOffset) -> IcsFileSource {
        let source = IcsFileSource::new(&self.path, zone);
        match self.name {
            Some(ref name) => source.with_calendar_name(name),
            None => source,
        }
    }
}

/// Display settings for output formatting.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplaySettings {
    /// Maximum number of events to display.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<usize>,
}

impl ClientConfig {
    /// Loads configuration from the default path.
    pub fn load() -> Result<Self, String> {
        let path = Self::default_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Loads configuration from a specific path.
    pub fn load_from(path: &Path) -> Result<Self, String> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| format!("failed to read config {}: {}", path.display(), e))?;
        let mut config = Self::parse(&content)?;
        if let Some(base) = path.parent() {
            config.resolve_paths(base);
        }
        Ok(config)
    }

    pub fn parse(content: &str) -> Result<Self, String> {
        toml::from_str(content).map_err(|e| format!("failed to parse config: {}", e))
    }

    /// Makes relative source paths relative to `base`.
    pub fn resolve_paths(&mut self, base: &Path) {
        for source in &mut self.sources {
            if source.path.is_relative() {
                source.path = base.join(&source.path);
            }
        }
    }

    /// Builds one source per configured file.
    pub fn to_sources(&self, zone: TimeZoneOffset) -> Vec<Box<dyn CalendarSource>> {
        self.sources
            .iter()
            .map(|s| Box::new(s.to_source(zone)) as Box<dyn CalendarSource>)
            .collect()
    }

    /// Checks the engine settings and sources.
    pub fn validate(&self) -> Result<(), String> {
        self.calendar.validate().map_err(|e| e.to_string())?;
        if let Some(source) = self.sources.iter().find(|s| s.path.as_os_str().is_empty()) {
            return Err(format!(
                "source {} has an empty path",
                source.name.as_deref().unwrap_or("<unnamed>")
            ));
        }
        if self.display.limit == Some(0) {
            return Err("display.limit must be greater than zero".to_string());
        }
        Ok(())
    }

    /// Returns the default configuration file path.
    pub fn default_path() -> PathBuf {
        Self::default_config_dir().join("config.toml")
    }

    /// Returns the default configuration directory.
    pub fn default_config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("kalender")
    }
}
