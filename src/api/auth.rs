//! API Authentication
//!
//! OAuth2 token exchange against the API token endpoint, with an in-memory
//! token cache backed by an optional on-disk [`TokenStore`] so one token
//! serves many runs.
//!
//! Two grants are supported: API clients use client credentials, user
//! applications trade a refresh token (which the server may rotate).

use super::error::{ApiError, ApiResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};
use tokio::sync::RwLock;

/// Token expiry buffer - refresh tokens this much before they actually expire
/// This prevents using tokens that are about to expire during a request
const TOKEN_EXPIRY_BUFFER: Duration = Duration::from_secs(60);

/// Default token TTL if the token endpoint doesn't report one
const DEFAULT_TOKEN_TTL: Duration = Duration::from_secs(2 * 60 * 60);

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<u64>,
    #[serde(default)]
    refresh_token: Option<String>,
}

/// How the client proves who it is to the token endpoint
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Grant {
    /// API client (`cli-xxxxx`) with its secret
    ClientCredentials { client_id: String, secret: String },
    /// User application acting for a user through a refresh token
    RefreshToken {
        app_id: String,
        app_secret: String,
        refresh_token: String,
    },
}

impl Grant {
    /// Identifier sent as the basic-auth user
    pub fn id(&self) -> &str {
        match self {
            Grant::ClientCredentials { client_id, .. } => client_id,
            Grant::RefreshToken { app_id, .. } => app_id,
        }
    }

    fn secret(&self) -> &str {
        match self {
            Grant::ClientCredentials { secret, .. } => secret,
            Grant::RefreshToken { app_secret, .. } => app_secret,
        }
    }

    fn body(&self) -> serde_json::Value {
        match self {
            Grant::ClientCredentials { client_id, .. } => serde_json::json!({
                "client_id": client_id,
                "grant_type": "client_credentials",
            }),
            Grant::RefreshToken { refresh_token, .. } => serde_json::json!({
                "grant_type": "refresh_token",
                "refresh_token": refresh_token,
            }),
        }
    }

    fn rejected(&self) -> ApiError {
        match self {
            Grant::ClientCredentials { client_id, .. } => ApiError::Unauthorized(format!(
                "token request for client '{}' was rejected",
                client_id
            )),
            Grant::RefreshToken { app_id, .. } => ApiError::Unauthorized(format!(
                "refresh token for application '{}' was rejected; \
                 run `bbox config set refresh-token <value>` with a fresh one",
                app_id
            )),
        }
    }
}

/// Access token persisted between runs
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
struct StoredToken {
    access_token: String,
    /// Unix seconds, buffer already applied
    expires_at: u64,
}

/// `<config_dir>/<client>.oauth_token`, holding the last access token issued
/// to one configured client
#[derive(Debug, Clone)]
pub struct TokenStore {
    path: PathBuf,
}

impl TokenStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn for_client(dir: &Path, client: &str) -> Self {
        let file = client.replace(['/', '\\'], "_");
        Self::new(dir.join(format!("{}.oauth_token", file)))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The stored token, if there is one that hasn't expired
    fn load(&self) -> Option<CachedToken> {
        let content = std::fs::read_to_string(&self.path).ok()?;
        let stored: StoredToken = match serde_json::from_str(&content) {
            Ok(stored) => stored,
            Err(e) => {
                tracing::debug!("Ignoring unreadable token file {}: {}", self.path.display(), e);
                return None;
            }
        };

        let remaining = stored.expires_at.checked_sub(unix_now())?;
        if remaining == 0 {
            return None;
        }
        Some(CachedToken {
            token: stored.access_token,
            expires_at: Instant::now() + Duration::from_secs(remaining),
        })
    }

    fn save(&self, token: &str, valid_for: Duration) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let stored = StoredToken {
            access_token: token.to_string(),
            expires_at: unix_now() + valid_for.as_secs(),
        };
        std::fs::write(&self.path, serde_json::to_string(&stored)?)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(&self.path, std::fs::Permissions::from_mode(0o600))?;
        }
        Ok(())
    }

    /// Forget the stored token; a missing file is already forgotten
    pub fn clear(&self) -> std::io::Result<()> {
        match std::fs::remove_file(&self.path) {
            Err(e) if e.kind() != std::io::ErrorKind::NotFound => Err(e),
            _ => Ok(()),
        }
    }
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

/// API credentials holder with token caching
#[derive(Clone)]
pub struct ApiCredentials {
    http: reqwest::Client,
    token_url: String,
    grant: Arc<RwLock<Grant>>,
    store: Option<TokenStore>,
    token_cache: Arc<RwLock<Option<CachedToken>>>,
}

#[derive(Clone)]
struct CachedToken {
    token: String,
    /// When this token expires (with buffer applied)
    expires_at: Instant,
}

impl CachedToken {
    fn is_valid(&self) -> bool {
        Instant::now() < self.expires_at
    }
}

impl ApiCredentials {
    /// Create credentials for a grant, exchanged at `<auth_url>/token`.
    /// No network call happens until the first token is requested.
    pub fn new(http: reqwest::Client, auth_url: &str, grant: Grant) -> Self {
        Self {
            http,
            token_url: format!("{}/token", auth_url.trim_end_matches('/')),
            grant: Arc::new(RwLock::new(grant)),
            store: None,
            token_cache: Arc::new(RwLock::new(None)),
        }
    }

    /// Reuse and persist tokens through `store`
    pub fn with_store(mut self, store: TokenStore) -> Self {
        self.store = Some(store);
        self
    }

    /// Refresh token the next exchange will use, after any rotation
    pub async fn current_refresh_token(&self) -> Option<String> {
        match &*self.grant.read().await {
            Grant::RefreshToken { refresh_token, .. } => Some(refresh_token.clone()),
            Grant::ClientCredentials { .. } => None,
        }
    }

    /// Get an access token for API calls
    /// Checks token expiry before returning cached token
    pub async fn get_token(&self) -> ApiResult<String> {
        {
            let cache = self.token_cache.read().await;
            if let Some(cached) = cache.as_ref() {
                if cached.is_valid() {
                    return Ok(cached.token.clone());
                }
                tracing::debug!("Cached token expired, fetching new token");
            }
        }

        if let Some(stored) = self.store.as_ref().and_then(TokenStore::load) {
            tracing::debug!("Reusing token from previous run");
            let token = stored.token.clone();
            *self.token_cache.write().await = Some(stored);
            return Ok(token);
        }

        let token = self.fetch_token().await?;

        let ttl = token
            .expires_in
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_TOKEN_TTL);
        let valid_for = ttl.saturating_sub(TOKEN_EXPIRY_BUFFER);

        {
            let mut cache = self.token_cache.write().await;
            *cache = Some(CachedToken {
                token: token.access_token.clone(),
                expires_at: Instant::now() + valid_for,
            });
        }

        if let Some(store) = &self.store {
            if let Err(e) = store.save(&token.access_token, valid_for) {
                tracing::warn!("Could not save token to {}: {}", store.path().display(), e);
            }
        }

        tracing::debug!(
            "New token cached, expires in ~{} minutes",
            valid_for.as_secs() / 60
        );

        Ok(token.access_token)
    }

    /// Force refresh the token
    pub async fn refresh_token(&self) -> ApiResult<String> {
        {
            let mut cache = self.token_cache.write().await;
            *cache = None;
        }
        if let Some(store) = &self.store {
            if let Err(e) = store.clear() {
                tracing::debug!("Could not remove {}: {}", store.path().display(), e);
            }
        }

        self.get_token().await
    }

    async fn fetch_token(&self) -> ApiResult<TokenResponse> {
        let grant = self.grant.read().await.clone();
        tracing::debug!("POST {} (as {})", self.token_url, grant.id());

        let response = self
            .http
            .post(&self.token_url)
            .basic_auth(grant.id(), Some(grant.secret()))
            .json(&grant.body())
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(match status.as_u16() {
                400 | 401 => grant.rejected(),
                _ => ApiError::from_status(status, "token request failed"),
            });
        }

        let token = response.json::<TokenResponse>().await?;

        if let Some(rotated) = &token.refresh_token {
            if let Grant::RefreshToken { refresh_token, .. } = &mut *self.grant.write().await {
                if refresh_token != rotated {
                    tracing::debug!("Refresh token rotated");
                    *refresh_token = rotated.clone();
                }
            }
        }

        Ok(token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grant_bodies() {
        let client = Grant::ClientCredentials {
            client_id: "cli-12345".to_string(),
            secret: "s3cret".to_string(),
        };
        assert_eq!(client.id(), "cli-12345");
        assert_eq!(client.body()["grant_type"], "client_credentials");

        let user = Grant::RefreshToken {
            app_id: "app-12345".to_string(),
            app_secret: "appsecret".to_string(),
            refresh_token: "rt-1".to_string(),
        };
        assert_eq!(user.id(), "app-12345");
        assert_eq!(user.secret(), "appsecret");
        assert_eq!(user.body()["refresh_token"], "rt-1");
        assert!(user.body().get("client_id").is_none());
    }

    #[test]
    fn test_token_store_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = TokenStore::for_client(dir.path(), "cli-12345");
        assert!(store.path().ends_with("cli-12345.oauth_token"));
        assert!(store.load().is_none());

        store.save("tok-1", Duration::from_secs(600)).unwrap();
        let loaded = store.load().unwrap();
        assert_eq!(loaded.token, "tok-1");
        assert!(loaded.is_valid());

        store.clear().unwrap();
        assert!(store.load().is_none());
        store.clear().unwrap();
    }

    #[test]
    fn test_expired_or_corrupt_token_file_is_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let store = TokenStore::for_client(dir.path(), "cli-12345");

        store.save("tok-1", Duration::ZERO).unwrap();
        assert!(store.load().is_none());

        std::fs::write(store.path(), "tok-plain-text").unwrap();
        assert!(store.load().is_none());
    }

    #[cfg(unix)]
    #[test]
    fn test_token_file_is_private() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let store = TokenStore::for_client(dir.path(), "cli-12345");
        store.save("tok-1", Duration::from_secs(600)).unwrap();

        let mode = std::fs::metadata(store.path()).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }
}
