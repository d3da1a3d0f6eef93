//! The default command: fetch this week's events and email the digest.

use chrono::Utc;
use tracing::{debug, info};
use weekmail_core::{TimeWindow, digest};
use weekmail_google::GoogleCalendar;

use crate::config::ClientConfig;
use crate::error::{CliError, CliResult};
use crate::mailer::Mailer;

/// Runs the digest pipeline end to end.
///
/// Settings are resolved and validated before any network activity, so a
/// typo in the email section surfaces before the OAuth browser dance. With
/// `dry_run` the digest is printed and no email is sent.
pub async fn run(config: &ClientConfig, dry_run: bool) -> CliResult<()> {
    let dry_run = dry_run || config.dry_run;

    // Validate delivery settings up front (skipped for dry runs, which
    // never touch the relay)
    let mailer = if dry_run {
        None
    } else {
        let mail_settings = config.email.resolve().map_err(CliError::Config)?;
        Some(Mailer::new(mail_settings)?)
    };

    let google_settings = config.google.as_ref().ok_or_else(|| {
        CliError::Config(format!(
            "no [google] section in {}. Run: weekmail auth google --credentials-file <path>",
            ClientConfig::default_path().display()
        ))
    })?;
    let google_config = google_settings
        .to_provider_config()
        .map_err(CliError::Config)?;

    let window = TimeWindow::iso_week_containing(Utc::now());
    debug!("fetching events between {} and {}", window.start, window.end);

    let calendar = GoogleCalendar::new(google_config)?;
    let events = calendar.fetch_events(&window).await?;
    info!("fetched {} events", events.len());

    let body = digest::render(&events);
    println!("{}", body);

    match mailer {
        Some(mailer) => mailer.send_digest(&body).await?,
        None => info!("dry run, not sending email"),
    }

    Ok(())
}
