//! Apple Podcasts episode lookup via the public iTunes lookup API.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use herald_core::{CandidateEpisode, PlatformMatch};
use reqwest::{Client, Url};
use serde::Deserialize;

use crate::catalog::{join, normalise_base_url, read_json, resolve, EpisodeCatalog};
use crate::error::CatalogError;

const DEFAULT_BASE_URL: &str = "https://itunes.apple.com/";

/// The lookup API caps results at 200 per request.
const LOOKUP_LIMIT: &str = "200";

#[derive(Debug, Deserialize)]
struct LookupResponse {
    #[serde(default)]
    results: Vec<serde_json::Value>,
}

/// One lookup record. The show itself and its episodes come back in the same
/// `results` array and are told apart by `wrapperType`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LookupRecord {
    wrapper_type: Option<String>,
    track_id: Option<u64>,
    track_name: Option<String>,
    track_view_url: Option<String>,
    release_date: Option<String>,
}

impl LookupRecord {
    fn is_episode(&self) -> bool {
        self.wrapper_type
            .as_deref()
            .is_some_and(|t| t.to_ascii_lowercase().contains("episode"))
    }

    fn into_candidate(self) -> CandidateEpisode {
        let release_date = self
            .release_date
            .as_deref()
            .and_then(|raw| DateTime::parse_from_rfc3339(raw).ok())
            .map_or(DateTime::<Utc>::UNIX_EPOCH, |dt| dt.with_timezone(&Utc));
        CandidateEpisode {
            display_name: self.track_name.unwrap_or_default(),
            release_date,
            platform_id: self.track_id.map(|id| id.to_string()),
            public_url: self.track_view_url,
        }
    }
}

/// Client for the iTunes lookup endpoint, scoped to one show.
pub struct AppleClient {
    client: Client,
    base_url: Url,
    show_id: String,
    country: String,
}

impl AppleClient {
    /// Creates a client pointed at the production iTunes API.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::InvalidBaseUrl`] only if the built-in base URL
    /// fails to parse.
    pub fn new(client: Client, show_id: &str, country: &str) -> Result<Self, CatalogError> {
        Self::with_base_url(client, show_id, country, DEFAULT_BASE_URL)
    }

    /// Creates a client with a custom base URL (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::InvalidBaseUrl`] if `base_url` is not a valid URL.
    pub fn with_base_url(
        client: Client,
        show_id: &str,
        country: &str,
        base_url: &str,
    ) -> Result<Self, CatalogError> {
        Ok(Self {
            client,
            base_url: normalise_base_url(base_url)?,
            show_id: show_id.trim().to_owned(),
            country: country.to_owned(),
        })
    }

    fn lookup_url(&self) -> Result<Url, CatalogError> {
        let mut url = join(&self.base_url, "lookup")?;
        url.query_pairs_mut()
            .append_pair("id", &self.show_id)
            .append_pair("entity", "podcastEpisode")
            .append_pair("country", &self.country)
            .append_pair("limit", LOOKUP_LIMIT);
        Ok(url)
    }

    /// Fetches the show's episode records, dropping show-level records.
    ///
    /// Records that fail to deserialize are skipped.
    ///
    /// # Errors
    ///
    /// - [`CatalogError::Http`] on network failure.
    /// - [`CatalogError::UnexpectedStatus`] on a non-2xx response.
    /// - [`CatalogError::Deserialize`] if the envelope is not valid JSON.
    pub async fn lookup_episodes(&self) -> Result<Vec<CandidateEpisode>, CatalogError> {
        let url = self.lookup_url()?;
        let response = self.client.get(url).send().await?;
        let envelope: LookupResponse = read_json(response).await?;

        Ok(envelope
            .results
            .into_iter()
            .filter_map(|v| serde_json::from_value::<LookupRecord>(v).ok())
            .filter(LookupRecord::is_episode)
            .map(LookupRecord::into_candidate)
            .collect())
    }
}

#[async_trait]
impl EpisodeCatalog for AppleClient {
    fn platform(&self) -> &'static str {
        "apple"
    }

    async fn find_episode(
        &self,
        title: &str,
        published_at: DateTime<Utc>,
    ) -> Result<Option<PlatformMatch>, CatalogError> {
        if self.show_id.is_empty() {
            tracing::warn!("apple: no show id configured; skipping lookup");
            return Ok(None);
        }
        let candidates = self.lookup_episodes().await?;
        Ok(resolve(self.platform(), &candidates, title, published_at))
    }
}
