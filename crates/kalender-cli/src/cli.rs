//! Command-line interface definition.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use kalender_core::{CalendarConfig, Language, LogFormat, TriggerMode, ViewSpan};

/// kalender - upcoming calendar events at a glance
#[derive(Debug, Parser)]
#[command(name = "kalender")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(long, short, env = "KALENDER_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Enable debug output
    #[arg(long, short, global = true)]
    pub debug: bool,

    /// Increase log verbosity (repeatable)
    #[arg(long, short, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Log output format: pretty, compact or json
    #[arg(long, global = true)]
    pub log_format: Option<LogFormat>,

    // --- Sources ---
    /// Calendar file to read, in addition to configured sources (can be repeated)
    #[arg(long = "ics", short, action = clap::ArgAction::Append, global = true)]
    pub ics: Vec<PathBuf>,

    // --- Calendar overrides ---
    /// Display language (en, it, es, pl, fr, de, ru, nl)
    #[arg(long, global = true)]
    pub language: Option<String>,

    /// Show near dates as words ("Tomorrow") instead of dates
    #[arg(long, global = true)]
    pub replace_dates: bool,

    /// IANA time zone, e.g. Europe/Berlin
    #[arg(long, global = true)]
    pub timezone: Option<String>,

    /// How far ahead to look, e.g. 10, 36h or "2 weeks"
    #[arg(long, global = true)]
    pub preview: Option<ViewSpan>,

    /// How far back to look
    #[arg(long, global = true)]
    pub pastview: Option<ViewSpan>,

    /// Summary pattern used by the trigger
    #[arg(long, global = true)]
    pub filter: Option<String>,

    /// Trigger mode: always, match or nomatch
    #[arg(long, global = true)]
    pub trigger: Option<TriggerMode>,

    // --- Output ---
    /// Output in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Maximum number of events to display
    #[arg(long, global = true)]
    pub limit: Option<usize>,

    /// Evaluate at this instant instead of the current time (RFC 3339)
    #[arg(long, global = true)]
    pub now: Option<DateTime<Utc>>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

impl Cli {
    /// Applies flag overrides on top of file settings.
    pub fn apply_overrides(&self, calendar: &mut CalendarConfig) {
        if let Some(ref code) = self.language {
            calendar.language = Language::from(code.clone());
        }
        if self.replace_dates {
            calendar.replace_dates = true;
        }
        if let Some(ref timezone) = self.timezone {
            calendar.timezone = Some(timezone.clone());
        }
        if let Some(preview) = self.preview {
            calendar.preview = preview;
        }
        if let Some(pastview) = self.pastview {
            calendar.pastview = pastview;
        }
        if let Some(ref filter) = self.filter {
            calendar.filter = Some(filter.clone());
        }
        if let Some(trigger) = self.trigger {
            calendar.trigger = trigger;
        }
    }
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// List upcoming events (default)
    Upcoming,

    /// Report whether an event is running now
    Sensor {
        /// Previous on/off state, to report whether it changed
        #[arg(long)]
        previous: Option<bool>,
    },

    /// Configuration commands
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Configuration actions.
#[derive(Debug, Subcommand)]
pub enum ConfigAction {
    /// Dump current configuration
    Dump,

    /// Validate configuration
    Validate,

    /// Show configuration file path
    Path,
}

#[cfg(test)]
mod tests {
    use super::*;
    use kalender_core::ViewUnit;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("kalender").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn default_command_is_none() {
        let cli = parse(&[]);
        assert!(cli.command.is_none());
        assert!(!cli.json);
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli = parse(&["sensor", "--previous", "true", "--json", "--ics", "a.ics"]);
        assert!(matches!(cli.command, Some(Command::Sensor { previous: Some(true) })));
        assert!(cli.json);
        assert_eq!(cli.ics, vec![PathBuf::from("a.ics")]);
    }

    #[test]
    fn overrides_replace_file_values() {
        let cli = parse(&[
            "--language",
            "de",
            "--preview",
            "36h",
            "--trigger",
            "nomatch",
            "--filter",
            "^Lunch",
            "--timezone",
            "Europe/Berlin",
        ]);
        let mut calendar = CalendarConfig::default();
        cli.apply_overrides(&mut calendar);

        assert_eq!(calendar.language, Language::De);
        assert_eq!(calendar.preview, ViewSpan::new(36, ViewUnit::Hours));
        assert_eq!(calendar.pastview, ViewSpan::days(0));
        assert_eq!(calendar.trigger, TriggerMode::NoMatch);
        assert_eq!(calendar.filter.as_deref(), Some("^Lunch"));
        assert_eq!(calendar.timezone.as_deref(), Some("Europe/Berlin"));
    }

    #[test]
    fn unknown_language_falls_back() {
        let cli = parse(&["--language", "xx"]);
        let mut calendar = CalendarConfig {
            language: Language::Fr,
            ..Default::default()
        };
        cli.apply_overrides(&mut calendar);
        assert_eq!(calendar.language, Language::En);
    }

    #[test]
    fn rejects_bad_span() {
        let result = Cli::try_parse_from(["kalender", "--preview", "soon"]);
        assert!(result.is_err());
    }

    #[test]
    fn verbosity_counts() {
        let cli = parse(&["-vv", "upcoming"]);
        assert_eq!(cli.verbose, 2);
    }
}
