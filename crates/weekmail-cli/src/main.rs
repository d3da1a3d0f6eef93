//! weekmail CLI entry point.

use std::process::ExitCode;

use clap::Parser;
use tracing::Level;
use tracing_subscriber::EnvFilter;

use weekmail_cli::cli::{AuthProvider, Cli, Command, ConfigAction};
use weekmail_cli::config::ClientConfig;
use weekmail_cli::error::CliResult;

#[tokio::main]
async fn main() -> ExitCode {
    // Pick up SENDER_EMAIL_ADDRESS and friends from a local .env file
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.debug {
        EnvFilter::new(Level::DEBUG.to_string())
    } else {
        EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(Level::WARN.to_string()))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> CliResult<()> {
    // Load configuration
    let config = if let Some(ref path) = cli.config {
        ClientConfig::load_from(path).map_err(weekmail_cli::error::CliError::Config)?
    } else {
        ClientConfig::load().unwrap_or_default()
    };

    // Handle subcommands
    match cli.command {
        Some(Command::Auth { provider }) => match provider {
            AuthProvider::Google {
                client_id,
                client_secret,
                credentials_file,
                force,
            } => {
                weekmail_cli::commands::auth::google(
                    client_id,
                    client_secret,
                    credentials_file,
                    force,
                    &config,
                )
                .await
            }
        },
        Some(Command::Config { action }) => match action {
            ConfigAction::Dump => weekmail_cli::commands::config::dump(&config),
            ConfigAction::Validate => weekmail_cli::commands::config::validate(&config),
            ConfigAction::Path => weekmail_cli::commands::config::path(),
        },
        None => weekmail_cli::commands::run::run(&config, cli.dry_run).await,
    }
}
