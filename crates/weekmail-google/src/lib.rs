//! Google Calendar access for weekmail.
//!
//! This crate covers the two network-facing stages that precede the digest:
//!
//! - [`GoogleCalendar::obtain_access_token`] - returns a usable access token,
//!   reusing the cached one, refreshing an expired one, or running the
//!   interactive OAuth 2.0 PKCE flow when nothing usable exists. The token
//!   file on disk always holds the most recently issued credential.
//! - [`GoogleCalendar::fetch_events`] - lists expanded event instances on the
//!   configured calendar within a [`TimeWindow`], ordered by start time.
//!
//! [`TimeWindow`]: weekmail_core::TimeWindow

pub mod calendar;
pub mod client;
pub mod config;
pub mod error;
pub mod oauth;
pub mod tokens;

pub use calendar::{AuthDecision, GoogleCalendar};
pub use config::{GoogleConfig, OAuthCredentials};
pub use error::{GoogleError, GoogleErrorCode, GoogleResult};
pub use tokens::{TokenInfo, TokenStorage};
