//! Configuration commands.

use crate::config::ClientConfig;
use crate::error::CliResult;

/// Dump the current configuration to stdout.
pub fn dump(config: &ClientConfig) -> CliResult<()> {
    let toml_str = toml::to_string_pretty(config)
        .map_err(|e| crate::error::CliError::Config(format!("failed to serialize config: {}", e)))?;
    println!("# config.toml ({})", ClientConfig::default_path().display());
    println!("{}", toml_str);

    Ok(())
}

/// Validate the configuration.
pub fn validate(config: &ClientConfig) -> CliResult<()> {
    if let Some(ref google) = config.google {
        if google.client_id.is_some() || google.client_secret.is_some() {
            google
                .resolve_credentials()
                .map_err(|e| {
                    crate::error::CliError::Config(format!("invalid Google credentials: {}", e))
                })?;
            println!("Google credentials are valid.");
        }
    }

    config
        .email
        .resolve()
        .map_err(crate::error::CliError::Config)?;
    println!("Email settings are valid.");

    println!("Configuration is valid.");
    Ok(())
}

/// Show the configuration file path.
pub fn path() -> CliResult<()> {
    let config_path = ClientConfig::default_path();
    println!("config: {}", config_path.display());
    Ok(())
}
