//! Email delivery over SMTP.
//!
//! Builds a plain-text message and submits it to the configured relay on
//! the STARTTLS submission port.

use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use tracing::{debug, info};

use crate::config::MailSettings;
use crate::error::CliResult;

/// Subject line for the weekly digest email.
const SUBJECT: &str = "Next Week's Schedule";

/// SMTP mailer bound to one relay and sender.
pub struct Mailer {
    settings: MailSettings,
    transport: AsyncSmtpTransport<Tokio1Executor>,
}

impl Mailer {
    /// Creates a mailer for the given settings.
    ///
    /// The connection is opened lazily on the first send.
    pub fn new(settings: MailSettings) -> CliResult<Self> {
        let credentials =
            Credentials::new(settings.sender.clone(), settings.password.clone());

        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&settings.relay_host)?
            .port(settings.relay_port)
            .credentials(credentials)
            .build();

        Ok(Self {
            settings,
            transport,
        })
    }

    /// Sends the digest to the configured recipient.
    pub async fn send_digest(&self, body: &str) -> CliResult<()> {
        let message = self.build_message(body)?;

        debug!(
            "submitting to {}:{}",
            self.settings.relay_host, self.settings.relay_port
        );
        self.transport.send(message).await?;

        info!("digest sent to {}", self.settings.recipient);
        Ok(())
    }

    fn build_message(&self, body: &str) -> CliResult<Message> {
        let message = Message::builder()
            .from(self.settings.sender.parse()?)
            .to(self.settings.recipient.parse()?)
            .subject(SUBJECT)
            .header(ContentType::TEXT_PLAIN)
            .body(body.to_string())?;

        Ok(message)
    }
}
