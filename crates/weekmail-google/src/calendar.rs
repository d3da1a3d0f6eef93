//! High-level Google Calendar access.
//!
//! [`GoogleCalendar`] ties the pieces together: it decides how to obtain a
//! usable access token (cached, refreshed, or via the interactive OAuth
//! flow), persists token updates, and fetches events for a time window.

use tracing::{debug, info};
use weekmail_core::{CalendarEvent, TimeWindow};

use crate::client::CalendarApiClient;
use crate::config::GoogleConfig;
use crate::error::{GoogleError, GoogleResult};
use crate::oauth::OAuthClient;
use crate::tokens::{TokenInfo, TokenStorage};

/// How to obtain a usable access token given the cached token state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthDecision {
    /// The cached access token is still valid.
    UseCached,
    /// The cached token is expired but carries a refresh token.
    Refresh,
    /// No usable cached state; the full interactive flow is required.
    Interactive,
}

impl AuthDecision {
    /// Decides based on the cached token, if any.
    ///
    /// A token is only reusable when it covers the required scopes. An
    /// expired token without a refresh token forces the interactive flow.
    pub fn from_cached(tokens: Option<&TokenInfo>, required_scopes: &[String]) -> Self {
        match tokens {
            None => Self::Interactive,
            Some(t) if !t.has_scopes(required_scopes) => Self::Interactive,
            Some(t) if !t.is_expired() => Self::UseCached,
            Some(t) if t.refresh_token.is_some() => Self::Refresh,
            Some(_) => Self::Interactive,
        }
    }
}

/// Authenticated access to one Google calendar.
#[derive(Debug)]
pub struct GoogleCalendar {
    config: GoogleConfig,
    storage: TokenStorage,
    oauth: OAuthClient,
    api: CalendarApiClient,
}

impl GoogleCalendar {
    /// Creates the calendar accessor and loads any cached tokens.
    ///
    /// # Errors
    ///
    /// Fails when the configuration is invalid or the token file exists but
    /// cannot be parsed.
    pub fn new(config: GoogleConfig) -> GoogleResult<Self> {
        config.validate().map_err(GoogleError::configuration)?;

        let storage = TokenStorage::new(&config.token_path);
        if storage.load()? {
            debug!("loaded cached tokens from {}", storage.path().display());
        }

        let oauth = OAuthClient::new(config.credentials.clone(), config.timeout)?;
        let api = CalendarApiClient::new(config.timeout)?;

        Ok(Self {
            config,
            storage,
            oauth,
            api,
        })
    }

    /// Returns true when a non-expired access token is cached.
    pub fn is_authenticated(&self) -> bool {
        matches!(
            AuthDecision::from_cached(self.storage.get().as_ref(), &self.config.scopes),
            AuthDecision::UseCached
        )
    }

    /// Returns a valid access token, refreshing or re-authorizing as needed.
    ///
    /// Any new token state is persisted before the token is returned, so an
    /// interrupted run never loses a fresh refresh token.
    pub async fn obtain_access_token(&self) -> GoogleResult<String> {
        let cached = self.storage.get();
        let decision = AuthDecision::from_cached(cached.as_ref(), &self.config.scopes);
        debug!("auth decision: {:?}", decision);

        match decision {
            AuthDecision::UseCached => {
                let tokens = cached.ok_or_else(|| GoogleError::internal("token cache empty"))?;
                Ok(tokens.access_token)
            }
            AuthDecision::Refresh => {
                let tokens = cached.ok_or_else(|| GoogleError::internal("token cache empty"))?;
                let refresh_token = tokens
                    .refresh_token
                    .as_deref()
                    .ok_or_else(|| GoogleError::internal("refresh decision without token"))?;

                let (access_token, expires_in) = self.oauth.refresh_token(refresh_token).await?;
                self.storage
                    .update_access_token(access_token.clone(), expires_in)?;
                Ok(access_token)
            }
            AuthDecision::Interactive => {
                let tokens = self.authenticate().await?;
                Ok(tokens.access_token)
            }
        }
    }

    /// Runs the interactive OAuth flow and persists the resulting tokens.
    pub async fn authenticate(&self) -> GoogleResult<TokenInfo> {
        info!("no usable cached token, starting interactive authorization");

        let tokens = self
            .oauth
            .authorize(&self.config.scopes, self.config.loopback_port_range)
            .await?;

        self.storage.set(tokens.clone())?;
        info!("tokens saved to {}", self.storage.path().display());

        Ok(tokens)
    }

    /// Fetches events from the configured calendar within the window.
    pub async fn fetch_events(&self, window: &TimeWindow) -> GoogleResult<Vec<CalendarEvent>> {
        let access_token = self.obtain_access_token().await?;

        debug!(
            "fetching events from {} between {} and {}",
            self.config.calendar_id, window.start, window.end
        );

        self.api
            .list_events(&access_token, &self.config.calendar_id, window)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scopes() -> Vec<String> {
        vec!["https://www.googleapis.com/auth/calendar.readonly".to_string()]
    }

    fn valid_token() -> TokenInfo {
        TokenInfo::new("access", Some("refresh".to_string()), Some(3600), scopes())
    }

    fn expired_token(refresh: Option<String>) -> TokenInfo {
        // expires_in below the refresh buffer, so already expired
        TokenInfo::new("access", refresh, Some(0), scopes())
    }

    mod auth_decision {
        use super::*;

        #[test]
        fn no_cached_tokens_means_interactive() {
            assert_eq!(
                AuthDecision::from_cached(None, &scopes()),
                AuthDecision::Interactive
            );
        }

        #[test]
        fn valid_token_is_reused() {
            let tokens = valid_token();
            assert_eq!(
                AuthDecision::from_cached(Some(&tokens), &scopes()),
                AuthDecision::UseCached
            );
        }

        #[test]
        fn expired_with_refresh_token_refreshes() {
            let tokens = expired_token(Some("refresh".to_string()));
            assert_eq!(
                AuthDecision::from_cached(Some(&tokens), &scopes()),
                AuthDecision::Refresh
            );
        }

        #[test]
        fn expired_without_refresh_token_reauthorizes() {
            let tokens = expired_token(None);
            assert_eq!(
                AuthDecision::from_cached(Some(&tokens), &scopes()),
                AuthDecision::Interactive
            );
        }

        #[test]
        fn missing_scope_forces_interactive() {
            let tokens = valid_token();
            let wider = vec!["https://www.googleapis.com/auth/calendar".to_string()];
            assert_eq!(
                AuthDecision::from_cached(Some(&tokens), &wider),
                AuthDecision::Interactive
            );
        }
    }
}
