//! Configuration commands.

use std::path::Path;

use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};

/// Dump the current configuration to stdout.
pub fn dump(config: &ClientConfig, path: &Path) -> ClientResult<()> {
    let toml_str = toml::to_string_pretty(config)
        .map_err(|e| ClientError::Config(format!("failed to serialize config: {}", e)))?;
    println!("# config.toml ({})", path.display());
    println!("{}", toml_str);

    Ok(())
}

/// Validate the configuration.
pub fn validate(config: &ClientConfig) -> ClientResult<()> {
    config.validate().map_err(ClientError::Config)?;

    for source in &config.sources {
        if !source.path.exists() {
            tracing::warn!(path = %source.path.display(), "Calendar file does not exist");
        }
    }

    println!(
        "Configuration is valid ({} source{}).",
        config.sources.len(),
        if config.sources.len() == 1 { "" } else { "s" }
    );
    Ok(())
}

/// Show the configuration file path.
pub fn path(path: &Path) -> ClientResult<()> {
    println!("config: {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_reports_config_error() {
        let mut config = ClientConfig::default();
        config.calendar.timezone = Some("Nowhere/Land".to_string());
        assert!(matches!(validate(&config), Err(ClientError::Config(_))));
        assert!(validate(&ClientConfig::default()).is_ok());
    }
}
