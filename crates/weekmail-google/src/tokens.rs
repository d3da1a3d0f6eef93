//! OAuth token storage.
//!
//! The credential bundle lives in a single JSON file. It is read once at
//! startup and rewritten atomically whenever a token is refreshed or newly
//! issued, so the file always holds the most recent credential.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{GoogleError, GoogleResult};

/// An OAuth token bundle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenInfo {
    /// The access token for API requests.
    pub access_token: String,

    /// The refresh token for obtaining new access tokens.
    pub refresh_token: Option<String>,

    /// When the access token expires.
    pub expires_at: Option<DateTime<Utc>>,

    /// The OAuth scopes that were granted.
    pub scopes: Vec<String>,

    /// When the tokens were last refreshed.
    pub last_refresh: DateTime<Utc>,
}

impl TokenInfo {
    /// Creates a new token info from OAuth response data.
    pub fn new(
        access_token: impl Into<String>,
        refresh_token: Option<String>,
        expires_in_secs: Option<i64>,
        scopes: Vec<String>,
    ) -> Self {
        let expires_at = expires_in_secs.map(|secs| {
            // Subtract a buffer to refresh before actual expiry
            Utc::now() + Duration::seconds(secs) - Duration::seconds(60)
        });

        Self {
            access_token: access_token.into(),
            refresh_token,
            expires_at,
            scopes,
            last_refresh: Utc::now(),
        }
    }

    /// Returns true if the access token is expired or about to expire.
    pub fn is_expired(&self) -> bool {
        match self.expires_at {
            Some(expires_at) => Utc::now() >= expires_at,
            // If no expiry is set, assume it's valid (some tokens don't expire)
            None => false,
        }
    }

    /// Returns true if the token covers the required scopes.
    pub fn has_scopes(&self, required: &[String]) -> bool {
        required.iter().all(|scope| self.scopes.contains(scope))
    }

    /// Updates the access token after a refresh.
    pub fn update_access_token(
        &mut self,
        access_token: impl Into<String>,
        expires_in_secs: Option<i64>,
    ) {
        self.access_token = access_token.into();
        self.expires_at = expires_in_secs
            .map(|secs| Utc::now() + Duration::seconds(secs) - Duration::seconds(60));
        self.last_refresh = Utc::now();
    }
}

/// Persisted token storage with a file-based backend.
#[derive(Debug)]
pub struct TokenStorage {
    /// Path to the token file.
    path: PathBuf,

    /// In-memory copy of the current tokens.
    tokens: RwLock<Option<TokenInfo>>,
}

impl TokenStorage {
    /// Creates a new token storage at the given path.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            tokens: RwLock::new(None),
        }
    }

    /// Loads tokens from disk into memory.
    ///
    /// Returns Ok(true) if tokens were loaded, Ok(false) if no tokens exist.
    pub fn load(&self) -> GoogleResult<bool> {
        if !self.path.exists() {
            debug!("no token file at {:?}", self.path);
            return Ok(false);
        }

        let content = fs::read_to_string(&self.path)
            .map_err(|e| GoogleError::configuration(format!("failed to read token file: {}", e)))?;

        let tokens: TokenInfo = serde_json::from_str(&content).map_err(|e| {
            GoogleError::configuration(format!("failed to parse token file: {}", e))
        })?;

        info!("loaded tokens from {:?}", self.path);
        *self.tokens.write().unwrap() = Some(tokens);
        Ok(true)
    }

    /// Saves the current tokens to disk.
    pub fn save(&self) -> GoogleResult<()> {
        let tokens = self.tokens.read().unwrap();
        let tokens = tokens
            .as_ref()
            .ok_or_else(|| GoogleError::internal("no tokens to save"))?;

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                GoogleError::configuration(format!("failed to create token directory: {}", e))
            })?;
        }

        // Write to temp file first, then rename for atomicity
        let temp_path = self.path.with_extension("json.tmp");
        let content = serde_json::to_string_pretty(tokens)
            .map_err(|e| GoogleError::internal(format!("failed to serialize tokens: {}", e)))?;

        fs::write(&temp_path, &content).map_err(|e| {
            GoogleError::configuration(format!("failed to write token file: {}", e))
        })?;

        fs::rename(&temp_path, &self.path).map_err(|e| {
            GoogleError::configuration(format!("failed to rename token file: {}", e))
        })?;

        // Restrict permissions on Unix
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let perms = fs::Permissions::from_mode(0o600);
            let _ = fs::set_permissions(&self.path, perms);
        }

        debug!("saved tokens to {:?}", self.path);
        Ok(())
    }

    /// Returns a clone of the current tokens, if any.
    pub fn get(&self) -> Option<TokenInfo> {
        self.tokens.read().unwrap().clone()
    }

    /// Sets new tokens and saves them to disk.
    pub fn set(&self, tokens: TokenInfo) -> GoogleResult<()> {
        *self.tokens.write().unwrap() = Some(tokens);
        self.save()
    }

    /// Updates the access token and saves to disk.
    pub fn update_access_token(
        &self,
        access_token: impl Into<String>,
        expires_in_secs: Option<i64>,
    ) -> GoogleResult<()> {
        let mut tokens = self.tokens.write().unwrap();
        if let Some(ref mut t) = *tokens {
            t.update_access_token(access_token, expires_in_secs);
            drop(tokens);
            self.save()
        } else {
            Err(GoogleError::internal("no tokens to update"))
        }
    }

    /// Returns the token storage path.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn storage_in(dir: &tempfile::TempDir) -> (TokenStorage, PathBuf) {
        let path = dir.path().join("tokens.json");
        (TokenStorage::new(path.clone()), path)
    }

    #[test]
    fn token_info_creation() {
        let token = TokenInfo::new(
            "access-token",
            Some("refresh-token".to_string()),
            Some(3600),
            vec!["scope1".to_string()],
        );

        assert_eq!(token.access_token, "access-token");
        assert_eq!(token.refresh_token, Some("refresh-token".to_string()));
        assert!(token.expires_at.is_some());
        assert!(!token.is_expired());
    }

    #[test]
    fn token_info_expired() {
        let mut token = TokenInfo::new("access", None, Some(3600), vec![]);
        token.expires_at = Some(Utc::now() - Duration::hours(1));
        assert!(token.is_expired());
    }

    #[test]
    fn token_info_no_expiry_is_valid() {
        let token = TokenInfo::new("access", None, None, vec![]);
        assert!(!token.is_expired());
    }

    #[test]
    fn token_info_scope_check() {
        let token = TokenInfo::new(
            "access",
            None,
            None,
            vec!["scope1".to_string(), "scope2".to_string()],
        );

        assert!(token.has_scopes(&["scope1".to_string()]));
        assert!(token.has_scopes(&["scope1".to_string(), "scope2".to_string()]));
        assert!(!token.has_scopes(&["scope3".to_string()]));
    }

    #[test]
    fn storage_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let (storage, path) = storage_in(&dir);

        let token = TokenInfo::new(
            "access-token",
            Some("refresh-token".to_string()),
            Some(3600),
            vec!["scope1".to_string()],
        );

        storage.set(token).unwrap();
        assert!(path.exists());

        let storage2 = TokenStorage::new(path);
        assert!(storage2.load().unwrap());
        let loaded = storage2.get().unwrap();
        assert_eq!(loaded.access_token, "access-token");
        assert_eq!(loaded.refresh_token, Some("refresh-token".to_string()));
    }

    #[test]
    fn storage_overwrites_on_refresh() {
        let dir = tempfile::tempdir().unwrap();
        let (storage, path) = storage_in(&dir);

        let token = TokenInfo::new("old-access", Some("refresh".to_string()), Some(3600), vec![]);
        storage.set(token).unwrap();

        storage.update_access_token("new-access", Some(3600)).unwrap();

        // The file immediately reflects the refreshed token
        let storage2 = TokenStorage::new(path);
        storage2.load().unwrap();
        let loaded = storage2.get().unwrap();
        assert_eq!(loaded.access_token, "new-access");
        assert_eq!(loaded.refresh_token, Some("refresh".to_string()));
    }

    #[test]
    fn storage_no_file() {
        let dir = tempfile::tempdir().unwrap();
        let (storage, _) = storage_in(&dir);
        assert!(!storage.load().unwrap());
        assert!(storage.get().is_none());
    }

    #[test]
    fn storage_update_without_tokens_errors() {
        let dir = tempfile::tempdir().unwrap();
        let (storage, _) = storage_in(&dir);
        assert!(storage.update_access_token("access", Some(3600)).is_err());
    }
}
