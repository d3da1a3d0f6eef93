//! Client configuration.
//!
//! All settings live in a single `config.toml` file at
//! `~/.config/weekmail/config.toml` by default.
//!
//! Email settings fall back to environment variables
//! (`SENDER_EMAIL_ADDRESS`, `RECIPIENT_EMAIL_ADDRESS`, `EMAIL_PASSWORD`)
//! when not present in the file, so a `.env` file alone is enough to
//! configure delivery.
//!
//! Credential values (`client_secret`, `password`) support secret
//! references:
//! - `pass::path/in/store` — resolved via `pass show`
//! - `env::VAR_NAME` — resolved from the environment
//! - plain text — used as-is

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Environment fallbacks for the `[email]` section.
const ENV_SENDER: &str = "SENDER_EMAIL_ADDRESS";
const ENV_RECIPIENT: &str = "RECIPIENT_EMAIL_ADDRESS";
const ENV_PASSWORD: &str = "EMAIL_PASSWORD";

const DEFAULT_RELAY_HOST: &str = "smtp.gmail.com";
const DEFAULT_RELAY_PORT: u16 = 587;

// ---------------------------------------------------------------------------
// ClientConfig (config.toml)
// ---------------------------------------------------------------------------

/// Configuration for the weekmail client.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Google Calendar settings.
    pub google: Option<GoogleSettings>,

    /// Email delivery settings.
    #[serde(default)]
    pub email: EmailSettings,

    /// Print the digest without sending an email.
    pub dry_run: bool,
}

impl ClientConfig {
    /// Loads configuration from the default path.
    pub fn load() -> Result<Self, String> {
        let path = Self::default_path();
        if path.exists() {
            let content = std::fs::read_to_string(&path)
                .map_err(|e| format!("failed to read config: {}", e))?;
            toml::from_str(&content).map_err(|e| format!("failed to parse config: {}", e))
        } else {
            Ok(Self::default())
        }
    }

    /// Loads configuration from a specific path.
    pub fn load_from(path: &PathBuf) -> Result<Self, String> {
        let content =
            std::fs::read_to_string(path).map_err(|e| format!("failed to read config: {}", e))?;
        toml::from_str(&content).map_err(|e| format!("failed to parse config: {}", e))
    }

    /// Returns the default configuration file path.
    pub fn default_path() -> PathBuf {
        Self::default_config_dir().join("config.toml")
    }

    /// Returns the default configuration directory.
    pub fn default_config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("weekmail")
    }
}

// ---------------------------------------------------------------------------
// GoogleSettings (in config.toml, including credentials)
// ---------------------------------------------------------------------------

/// Google Calendar provider settings.
///
/// Credentials (`client_id`, `client_secret`) are stored inline and support
/// secret references (`pass::…`, `env::…`).
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct GoogleSettings {
    /// OAuth client ID (supports `pass::` and `env::` prefixes).
    pub client_id: Option<String>,

    /// OAuth client secret (supports `pass::` and `env::` prefixes).
    pub client_secret: Option<String>,

    /// Calendar to fetch events from.
    #[serde(default = "default_calendar_id")]
    pub calendar_id: String,

    /// Path to token storage.
    pub token_path: Option<PathBuf>,
}

fn default_calendar_id() -> String {
    "primary".to_string()
}

impl GoogleSettings {
    /// Converts to provider configuration.
    ///
    /// Resolves credentials (expanding `pass::` / `env::` references) and
    /// builds a `GoogleConfig` suitable for the provider.
    pub fn to_provider_config(&self) -> Result<weekmail_google::GoogleConfig, String> {
        use weekmail_google::GoogleConfig;

        let credentials = self.resolve_credentials()?;
        credentials.validate().map_err(|e| e.to_string())?;

        let mut config = GoogleConfig::new(credentials);

        if !self.calendar_id.is_empty() {
            config = config.with_calendar_id(&self.calendar_id);
        }

        if let Some(ref path) = self.token_path {
            config = config.with_token_path(path);
        }

        Ok(config)
    }

    /// Resolves Google OAuth credentials from inline fields.
    ///
    /// Both `client_id` and `client_secret` must be set. Each value is passed
    /// through `secret::resolve()` to expand `pass::` and `env::` references.
    pub(crate) fn resolve_credentials(&self) -> Result<weekmail_google::OAuthCredentials, String> {
        use weekmail_google::OAuthCredentials;

        let raw_id = self.client_id.as_deref().ok_or_else(|| {
            format!(
                "Google credentials not found. Add to {}:\n  \
                 [google]\n  \
                 client_id = \"YOUR_ID.apps.googleusercontent.com\"\n  \
                 client_secret = \"YOUR_SECRET\"\n\n  \
                 Or run: weekmail auth google --credentials-file <path>",
                ClientConfig::default_path().display()
            )
        })?;

        let raw_secret = self.client_secret.as_deref().ok_or_else(|| {
            "client_secret is missing from [google] section in config.toml".to_string()
        })?;

        let resolved_id = crate::secret::resolve(raw_id)
            .map_err(|e| format!("failed to resolve client_id: {}", e))?;
        let resolved_secret = crate::secret::resolve(raw_secret)
            .map_err(|e| format!("failed to resolve client_secret: {}", e))?;

        Ok(OAuthCredentials::new(resolved_id, resolved_secret))
    }
}

// ---------------------------------------------------------------------------
// EmailSettings (in config.toml, with environment fallbacks)
// ---------------------------------------------------------------------------

/// Email delivery settings as written in `config.toml`.
///
/// Every field is optional here; [`EmailSettings::resolve`] fills the gaps
/// from the environment and produces a validated [`MailSettings`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EmailSettings {
    /// Sender address, also used as the SMTP username.
    pub sender: Option<String>,

    /// Recipient address.
    pub recipient: Option<String>,

    /// SMTP password (supports `pass::` and `env::` prefixes).
    pub password: Option<String>,

    /// SMTP relay hostname.
    pub relay_host: Option<String>,

    /// SMTP relay port (STARTTLS).
    pub relay_port: Option<u16>,
}

/// Fully resolved email delivery settings.
#[derive(Debug, Clone)]
pub struct MailSettings {
    pub sender: String,
    pub recipient: String,
    pub password: String,
    pub relay_host: String,
    pub relay_port: u16,
}

impl EmailSettings {
    /// Resolves delivery settings, filling gaps from the environment.
    ///
    /// Precedence per field: `config.toml` value, then the matching
    /// environment variable, then the built-in default for the relay. The
    /// password is passed through `secret::resolve()`.
    pub fn resolve(&self) -> Result<MailSettings, String> {
        let sender = Self::field(self.sender.as_deref(), ENV_SENDER, "email.sender")?;
        let recipient = Self::field(self.recipient.as_deref(), ENV_RECIPIENT, "email.recipient")?;

        let raw_password = Self::field(self.password.as_deref(), ENV_PASSWORD, "email.password")?;
        let password = crate::secret::resolve(&raw_password)
            .map_err(|e| format!("failed to resolve email password: {}", e))?;

        let settings = MailSettings {
            sender,
            recipient,
            password,
            relay_host: self
                .relay_host
                .clone()
                .unwrap_or_else(|| DEFAULT_RELAY_HOST.to_string()),
            relay_port: self.relay_port.unwrap_or(DEFAULT_RELAY_PORT),
        };

        settings.validate()?;
        Ok(settings)
    }

    fn field(value: Option<&str>, env_var: &str, key: &str) -> Result<String, String> {
        if let Some(v) = value {
            return Ok(v.to_string());
        }
        std::env::var(env_var).map_err(|_| {
            format!(
                "{} is not configured. Set it in {} or via the {} environment variable",
                key,
                ClientConfig::default_path().display(),
                env_var
            )
        })
    }
}

impl MailSettings {
    /// Checks the resolved settings before any network activity.
    pub fn validate(&self) -> Result<(), String> {
        for (label, address) in [("sender", &self.sender), ("recipient", &self.recipient)] {
            if !address.contains('@') {
                return Err(format!("{} address `{}` is not valid", label, address));
            }
        }
        if self.password.is_empty() {
            return Err("email password must not be empty".to_string());
        }
        if self.relay_host.is_empty() {
            return Err("relay host must not be empty".to_string());
        }
        if self.relay_port == 0 {
            return Err("relay port must not be 0".to_string());
        }
        Ok(())
    }
}
