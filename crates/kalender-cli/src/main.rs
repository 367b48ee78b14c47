//! kalender CLI entry point.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing::Level;

use kalender_cli::cli::{Cli, Command, ConfigAction};
use kalender_cli::commands::{self, Session};
use kalender_cli::config::ClientConfig;
use kalender_cli::error::{ClientError, ClientResult};
use kalender_core::{TracingConfig, init_tracing};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let (config_path, config) = match load_config(&cli) {
        Ok(loaded) => loaded,
        Err(e) => {
            eprintln!("error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let mut tracing_config = TracingConfig::cli(cli.verbose);
    if cli.debug || config.debug {
        tracing_config = tracing_config.with_level(Level::DEBUG);
    }
    if let Some(format) = cli.log_format {
        tracing_config = tracing_config.with_format(format);
    }
    if let Err(e) = init_tracing(tracing_config) {
        eprintln!("warning: logging disabled: {}", e);
    }

    match run(cli, config_path, config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn load_config(cli: &Cli) -> ClientResult<(PathBuf, ClientConfig)> {
    match cli.config {
        Some(ref path) => {
            let config = ClientConfig::load_from(path).map_err(ClientError::Config)?;
            Ok((path.clone(), config))
        }
        None => {
            let config = ClientConfig::load().map_err(ClientError::Config)?;
            Ok((ClientConfig::default_path(), config))
        }
    }
}

async fn run(cli: Cli, config_path: PathBuf, config: ClientConfig) -> ClientResult<()> {
    match cli.command {
        Some(Command::Config { ref action }) => {
            let mut config = config;
            cli.apply_overrides(&mut config.calendar);
            match action {
                ConfigAction::Dump => commands::config::dump(&config, &config_path),
                ConfigAction::Validate => commands::config::validate(&config),
                ConfigAction::Path => commands::config::path(&config_path),
            }
        }
        Some(Command::Sensor { previous }) => {
            let session = Session::new(&config, &cli)?;
            commands::sensor::run(&session, previous, cli.json).await
        }
        Some(Command::Upcoming) | None => {
            let session = Session::new(&config, &cli)?;
            commands::upcoming::run(&session, cli.json).await
        }
    }
}
