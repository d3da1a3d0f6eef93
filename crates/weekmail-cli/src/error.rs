//! CLI error types.

use std::fmt;

use weekmail_google::GoogleError;

/// Result type for CLI operations.
pub type CliResult<T> = Result<T, CliError>;

/// Errors that can occur while running the CLI.
#[derive(Debug)]
pub enum CliError {
    /// Configuration error.
    Config(String),
    /// Authentication with Google failed.
    Auth(String),
    /// Calendar API request failed.
    Api(String),
    /// Email delivery failed.
    Delivery(String),
    /// IO error.
    Io(std::io::Error),
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(msg) => write!(f, "configuration error: {}", msg),
            Self::Auth(msg) => write!(f, "authentication failed: {}", msg),
            Self::Api(msg) => write!(f, "calendar request failed: {}", msg),
            Self::Delivery(msg) => write!(f, "email delivery failed: {}", msg),
            Self::Io(err) => write!(f, "IO error: {}", err),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for CliError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<GoogleError> for CliError {
    fn from(err: GoogleError) -> Self {
        if err.code().is_authentication() {
            Self::Auth(err.to_string())
        } else {
            Self::Api(err.to_string())
        }
    }
}

impl From<lettre::transport::smtp::Error> for CliError {
    fn from(err: lettre::transport::smtp::Error) -> Self {
        Self::Delivery(err.to_string())
    }
}

impl From<lettre::error::Error> for CliError {
    fn from(err: lettre::error::Error) -> Self {
        Self::Delivery(err.to_string())
    }
}

impl From<lettre::address::AddressError> for CliError {
    fn from(err: lettre::address::AddressError) -> Self {
        Self::Config(format!("invalid email address: {}", err))
    }
}
