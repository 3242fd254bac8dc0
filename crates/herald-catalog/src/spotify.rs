//! Spotify show-episode lookup via the Web API.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use herald_core::{CandidateEpisode, PlatformMatch};
use reqwest::{Client, StatusCode, Url};
use serde::Deserialize;

use crate::catalog::{normalise_base_url, read_json, resolve, EpisodeCatalog};
use crate::error::CatalogError;
use crate::token::TokenCache;

const DEFAULT_API_URL: &str = "https://api.spotify.com/";

/// Episodes per page; only the newest page is consulted.
const EPISODE_PAGE_LIMIT: &str = "50";

#[derive(Debug, Deserialize)]
struct EpisodesPage {
    #[serde(default)]
    items: Vec<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct SpotifyEpisode {
    id: Option<String>,
    #[serde(default)]
    name: String,
    release_date: Option<String>,
    external_urls: Option<ExternalUrls>,
}

#[derive(Debug, Deserialize)]
struct ExternalUrls {
    spotify: Option<String>,
}

impl SpotifyEpisode {
    fn into_candidate(self) -> CandidateEpisode {
        CandidateEpisode {
            display_name: self.name,
            release_date: self
                .release_date
                .as_deref()
                .and_then(parse_release_date)
                .unwrap_or(DateTime::<Utc>::UNIX_EPOCH),
            platform_id: self.id,
            public_url: self.external_urls.and_then(|u| u.spotify),
        }
    }
}

/// Day-precision release dates are midnight UTC; coarser precisions
/// (`YYYY` or `YYYY-MM`) are treated as undated.
fn parse_release_date(raw: &str) -> Option<DateTime<Utc>> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()?
        .and_hms_opt(0, 0, 0)
        .map(|dt| dt.and_utc())
}

/// Client for a single Spotify show's episode listing.
pub struct SpotifyClient {
    client: Client,
    api_url: Url,
    show_id: String,
    market: String,
    tokens: Arc<TokenCache>,
}

impl SpotifyClient {
    /// Creates a client pointed at the production Web API.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::InvalidBaseUrl`] only if the built-in URL fails to parse.
    pub fn new(
        client: Client,
        tokens: Arc<TokenCache>,
        show_id: &str,
        market: &str,
    ) -> Result<Self, CatalogError> {
        Self::with_base_url(client, tokens, show_id, market, DEFAULT_API_URL)
    }

    /// Creates a client with a custom API base URL (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::InvalidBaseUrl`] if `base_url` is not a valid URL.
    pub fn with_base_url(
        client: Client,
        tokens: Arc<TokenCache>,
        show_id: &str,
        market: &str,
        base_url: &str,
    ) -> Result<Self, CatalogError> {
        Ok(Self {
            client,
            api_url: normalise_base_url(base_url)?,
            show_id: show_id.trim().to_owned(),
            market: market.to_owned(),
            tokens,
        })
    }

    /// The show id is pushed as one percent-encoded path segment.
    fn episodes_url(&self) -> Result<Url, CatalogError> {
        let mut url = self.api_url.clone();
        url.path_segments_mut()
            .map_err(|()| CatalogError::InvalidBaseUrl {
                url: self.api_url.to_string(),
                reason: "base URL cannot have path segments".to_string(),
            })?
            .pop_if_empty()
            .extend(["v1", "shows", self.show_id.as_str(), "episodes"]);
        url.query_pairs_mut()
            .append_pair("limit", EPISODE_PAGE_LIMIT)
            .append_pair("market", &self.market);
        Ok(url)
    }

    /// Fetches the newest page of the show's episodes.
    ///
    /// `null` entries (episodes unavailable in the market) and entries that
    /// fail to deserialize are skipped. A 401 drops the cached token so the
    /// next call re-authenticates.
    ///
    /// # Errors
    ///
    /// - Any error from [`TokenCache::access_token`].
    /// - [`CatalogError::Http`] on network failure.
    /// - [`CatalogError::UnexpectedStatus`] on a non-2xx response.
    /// - [`CatalogError::Deserialize`] if the page is not valid JSON.
    pub async fn list_episodes(&self) -> Result<Vec<CandidateEpisode>, CatalogError> {
        let token = self.tokens.access_token().await?;
        let url = self.episodes_url()?;
        let response = self.client.get(url).bearer_auth(token).send().await?;

        if response.status() == StatusCode::UNAUTHORIZED {
            tracing::warn!("spotify: access token rejected; clearing cache");
            self.tokens.invalidate().await;
        }
        let page: EpisodesPage = read_json(response).await?;

        Ok(page
            .items
            .into_iter()
            .filter(|v| !v.is_null())
            .filter_map(|v| serde_json::from_value::<SpotifyEpisode>(v).ok())
            .map(SpotifyEpisode::into_candidate)
            .collect())
    }
}

#[async_trait]
impl EpisodeCatalog for SpotifyClient {
    fn platform(&self) -> &'static str {
        "spotify"
    }

    async fn find_episode(
        &self,
        title: &str,
        published_at: DateTime<Utc>,
    ) -> Result<Option<PlatformMatch>, CatalogError> {
        if self.show_id.is_empty() {
            tracing::warn!("spotify: no show id configured; skipping lookup");
            return Ok(None);
        }
        let candidates = self.list_episodes().await?;
        Ok(resolve(self.platform(), &candidates, title, published_at))
    }
}
