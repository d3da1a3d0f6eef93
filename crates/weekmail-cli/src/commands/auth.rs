//! Authentication commands.

use std::path::PathBuf;

use tracing::info;

use crate::config::{ClientConfig, GoogleSettings};
use crate::error::CliResult;

/// Run the Google authentication flow.
///
/// Resolves credentials from CLI flags, a `--credentials-file`, or
/// `config.toml`, then runs the OAuth 2.0 PKCE flow.
///
/// When credentials arrive via CLI or `--credentials-file`, they are
/// persisted to `config.toml` so later runs can find them.
pub async fn google(
    client_id: Option<String>,
    client_secret: Option<String>,
    credentials_file: Option<PathBuf>,
    force: bool,
    config: &ClientConfig,
) -> CliResult<()> {
    use weekmail_google::{GoogleCalendar, GoogleConfig, OAuthCredentials};

    let (final_client_id, final_client_secret, source) = resolve_google_credentials(
        client_id,
        client_secret,
        credentials_file,
        config.google.as_ref(),
    )?;

    let credentials = OAuthCredentials::new(&final_client_id, &final_client_secret);
    credentials.validate().map_err(|e| {
        crate::error::CliError::Config(format!("invalid Google credentials: {}", e))
    })?;

    let mut google_config = GoogleConfig::new(credentials);

    if let Some(ref google_settings) = config.google {
        if !google_settings.calendar_id.is_empty() {
            google_config = google_config.with_calendar_id(&google_settings.calendar_id);
        }
        if let Some(ref path) = google_settings.token_path {
            google_config = google_config.with_token_path(path);
        }
    }

    let calendar = GoogleCalendar::new(google_config)?;

    if calendar.is_authenticated() && !force {
        save_credentials_to_config(&final_client_id, &final_client_secret, &source);
        println!("Already authenticated with Google Calendar.");
        println!("Use --force to re-authenticate.");
        return Ok(());
    }

    println!("Starting Google Calendar authentication...");
    println!();
    println!("A browser window will open for you to authorize access.");
    println!("If the browser doesn't open, check the terminal for a URL to copy.");
    println!();

    calendar.authenticate().await?;

    save_credentials_to_config(&final_client_id, &final_client_secret, &source);

    info!("Google authentication successful");
    println!();
    println!("Authentication successful!");
    println!("Your Google Calendar tokens have been saved.");
    println!();
    println!("You can now run weekmail to email yourself the week's schedule.");

    Ok(())
}

/// Where the credentials were resolved from.
#[derive(Debug, PartialEq)]
enum CredentialSource {
    /// From CLI flags (--client-id/--client-secret or --credentials-file)
    Cli,
    /// From config.toml (already persisted)
    Config,
}

/// Saves credentials to `config.toml` under `[google]`.
///
/// Only saves when the credentials came from a transient source (CLI flags
/// or `--credentials-file`). If they're already in config.toml, this is a
/// no-op.
fn save_credentials_to_config(client_id: &str, client_secret: &str, source: &CredentialSource) {
    if *source == CredentialSource::Config {
        return;
    }

    let config_path = ClientConfig::default_path();

    let content = if config_path.exists() {
        std::fs::read_to_string(&config_path).unwrap_or_default()
    } else {
        String::new()
    };

    let mut doc = match content.parse::<toml_edit::DocumentMut>() {
        Ok(d) => d,
        Err(e) => {
            info!("could not parse config.toml for writing: {}", e);
            return;
        }
    };

    if !doc.contains_key("google") {
        doc["google"] = toml_edit::Item::Table(toml_edit::Table::new());
    }

    if let Some(google) = doc["google"].as_table_mut() {
        google["client_id"] = toml_edit::value(client_id);
        google["client_secret"] = toml_edit::value(client_secret);
    }

    if let Some(parent) = config_path.parent() {
        if let Err(e) = std::fs::create_dir_all(parent) {
            info!(
                "could not create config directory {}: {}",
                parent.display(),
                e
            );
            return;
        }
    }

    match std::fs::write(&config_path, doc.to_string()) {
        Ok(()) => {
            info!("Credentials saved to {}", config_path.display());
            println!("Credentials saved to {}", config_path.display());
        }
        Err(e) => {
            info!(
                "could not save credentials to {}: {}",
                config_path.display(),
                e
            );
        }
    }
}

/// Resolves Google credentials from multiple sources.
///
/// Priority (highest to lowest):
/// 1. CLI `--client-id` + `--client-secret`
/// 2. CLI `--credentials-file` (Google Cloud Console JSON)
/// 3. `config.toml` `[google]` section (with secret resolution)
fn resolve_google_credentials(
    cli_client_id: Option<String>,
    cli_client_secret: Option<String>,
    cli_credentials_file: Option<PathBuf>,
    config_google: Option<&GoogleSettings>,
) -> CliResult<(String, String, CredentialSource)> {
    use weekmail_google::OAuthCredentials;

    if let (Some(id), Some(secret)) = (&cli_client_id, &cli_client_secret) {
        return Ok((id.clone(), secret.clone(), CredentialSource::Cli));
    }

    if let Some(ref path) = cli_credentials_file {
        let creds = OAuthCredentials::from_file(path).map_err(|e| {
            crate::error::CliError::Config(format!(
                "failed to load credentials from {}: {}",
                path.display(),
                e
            ))
        })?;
        return Ok((creds.client_id, creds.client_secret, CredentialSource::Cli));
    }

    if let Some(google) = config_google {
        if google.client_id.is_some() && google.client_secret.is_some() {
            let creds = google.resolve_credentials().map_err(|e| {
                crate::error::CliError::Config(format!(
                    "failed to resolve Google credentials from config: {}",
                    e
                ))
            })?;
            return Ok((creds.client_id, creds.client_secret, CredentialSource::Config));
        }
    }

    // Partial CLI args (only id or only secret provided)
    if cli_client_id.is_some() || cli_client_secret.is_some() {
        return Err(crate::error::CliError::Config(
            "both --client-id and --client-secret are required when providing credentials directly"
                .to_string(),
        ));
    }

    let config_path = ClientConfig::default_path();
    Err(crate::error::CliError::Config(format!(
        "Google credentials are required. Provide via:\n  \
         - client_id + client_secret in {}\n  \
         - --client-id and --client-secret flags\n  \
         - --credentials-file flag (path to Google Cloud Console JSON)\n  \
         - GOOGLE_CLIENT_ID and GOOGLE_CLIENT_SECRET env vars",
        config_path.display()
    )))
}
