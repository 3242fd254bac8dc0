//! Client-credentials token cache for the Spotify Web API.

use std::time::{Duration, Instant};

use reqwest::{Client, Url};
use serde::Deserialize;
use tokio::sync::Mutex;

use crate::catalog::{join, normalise_base_url, read_json};
use crate::error::CatalogError;

const DEFAULT_ACCOUNTS_URL: &str = "https://accounts.spotify.com/";

/// Tokens are refreshed this long before their stated expiry.
const EXPIRY_MARGIN: Duration = Duration::from_secs(60);

#[derive(Clone)]
pub struct SpotifyCredentials {
    pub client_id: String,
    pub client_secret: String,
}

impl std::fmt::Debug for SpotifyCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpotifyCredentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &"[redacted]")
            .finish()
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    token_type: String,
    expires_in: u64,
}

#[derive(Debug, Clone)]
struct CachedToken {
    access_token: String,
    refresh_at: Instant,
}

/// Caches the client-credentials access token for its lifetime.
///
/// The lock is held across a refresh, so concurrent callers wait for the
/// in-flight exchange instead of issuing their own.
pub struct TokenCache {
    client: Client,
    token_url: Url,
    credentials: SpotifyCredentials,
    cached: Mutex<Option<CachedToken>>,
}

impl TokenCache {
    /// Creates a cache that exchanges against the production accounts service.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::InvalidBaseUrl`] only if the built-in URL fails to parse.
    pub fn new(client: Client, credentials: SpotifyCredentials) -> Result<Self, CatalogError> {
        Self::with_base_url(client, credentials, DEFAULT_ACCOUNTS_URL)
    }

    /// Creates a cache with a custom accounts base URL (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::InvalidBaseUrl`] if `base_url` is not a valid URL.
    pub fn with_base_url(
        client: Client,
        credentials: SpotifyCredentials,
        base_url: &str,
    ) -> Result<Self, CatalogError> {
        let token_url = join(&normalise_base_url(base_url)?, "api/token")?;
        Ok(Self {
            client,
            token_url,
            credentials,
            cached: Mutex::new(None),
        })
    }

    /// Returns a valid access token, exchanging credentials when the cached
    /// one is missing or within 60 seconds of expiry.
    ///
    /// # Errors
    ///
    /// - [`CatalogError::Http`] on network failure.
    /// - [`CatalogError::UnexpectedStatus`] if the exchange is rejected.
    /// - [`CatalogError::Deserialize`] if the token response is malformed.
    pub async fn access_token(&self) -> Result<String, CatalogError> {
        let mut cached = self.cached.lock().await;
        if let Some(token) = cached.as_ref() {
            if Instant::now() < token.refresh_at {
                return Ok(token.access_token.clone());
            }
        }

        let (access_token, refresh_at) = self.exchange().await?;
        *cached = refresh_at.map(|refresh_at| CachedToken {
            access_token: access_token.clone(),
            refresh_at,
        });
        Ok(access_token)
    }

    /// Drops the cached token so the next call performs a fresh exchange.
    pub async fn invalidate(&self) {
        *self.cached.lock().await = None;
    }

    /// The token and when to refresh it. `None` means the stated lifetime
    /// does not fit in an [`Instant`] and the token must not be cached.
    async fn exchange(&self) -> Result<(String, Option<Instant>), CatalogError> {
        let obtained_at = Instant::now();
        let response = self
            .client
            .post(self.token_url.clone())
            .basic_auth(
                &self.credentials.client_id,
                Some(&self.credentials.client_secret),
            )
            .form(&[("grant_type", "client_credentials")])
            .send()
            .await?;
        let token: TokenResponse = read_json(response).await?;

        tracing::debug!(
            token_type = %token.token_type,
            expires_in = token.expires_in,
            "spotify: obtained access token"
        );

        let lifetime = Duration::from_secs(token.expires_in).saturating_sub(EXPIRY_MARGIN);
        let refresh_at = obtained_at.checked_add(lifetime);
        if refresh_at.is_none() {
            tracing::warn!(
                expires_in = token.expires_in,
                "spotify: token lifetime out of range; not caching"
            );
        }
        Ok((token.access_token, refresh_at))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn credentials_debug_redacts_secret() {
        let creds = SpotifyCredentials {
            client_id: "id".to_string(),
            client_secret: "shh".to_string(),
        };
        let debug = format!("{creds:?}");
        assert!(debug.contains("id"));
        assert!(!debug.contains("shh"));
    }

    #[test]
    fn token_url_is_under_api_path() {
        let cache = TokenCache::with_base_url(
            Client::new(),
            SpotifyCredentials {
                client_id: "id".to_string(),
                client_secret: "secret".to_string(),
            },
            "https://accounts.example",
        )
        .unwrap();
        assert_eq!(cache.token_url.as_str(), "https://accounts.example/api/token");
    }
}
