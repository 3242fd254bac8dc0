//! The seam between the orchestrator and the platform clients.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use herald_core::{CandidateEpisode, PlatformMatch};
use reqwest::{Client, Url};

use crate::error::CatalogError;

/// A platform that can resolve a canonical episode to its own listing.
#[async_trait]
pub trait EpisodeCatalog: Send + Sync {
    /// Short platform name used in logs.
    fn platform(&self) -> &'static str;

    /// Find the platform's entry for the episode `(title, published_at)`.
    ///
    /// `Ok(None)` means the platform has no usable match yet.
    async fn find_episode(
        &self,
        title: &str,
        published_at: DateTime<Utc>,
    ) -> Result<Option<PlatformMatch>, CatalogError>;
}

/// Builds the HTTP client shared by the platform clients.
///
/// # Errors
///
/// Returns [`CatalogError::Http`] if the `reqwest::Client` cannot be constructed.
pub fn build_http_client(timeout_secs: u64, user_agent: &str) -> Result<Client, CatalogError> {
    Ok(Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .connect_timeout(Duration::from_secs(10))
        .user_agent(user_agent)
        .build()?)
}

/// Parse `base_url` so that relative joins append to its path.
pub(crate) fn normalise_base_url(base_url: &str) -> Result<Url, CatalogError> {
    let normalised = format!("{}/", base_url.trim_end_matches('/'));
    Url::parse(&normalised).map_err(|e| CatalogError::InvalidBaseUrl {
        url: base_url.to_string(),
        reason: e.to_string(),
    })
}

/// Join `path` onto a normalised base URL.
pub(crate) fn join(base: &Url, path: &str) -> Result<Url, CatalogError> {
    base.join(path).map_err(|e| CatalogError::InvalidBaseUrl {
        url: base.to_string(),
        reason: e.to_string(),
    })
}

/// Run the matcher over `candidates`, logging the top of the ranking.
pub(crate) fn resolve(
    platform: &'static str,
    candidates: &[CandidateEpisode],
    title: &str,
    published_at: DateTime<Utc>,
) -> Option<PlatformMatch> {
    if tracing::enabled!(tracing::Level::DEBUG) {
        for ranked in herald_matcher::rank_candidates(candidates, title, published_at)
            .iter()
            .take(3)
        {
            tracing::debug!(
                platform,
                candidate = %ranked.candidate.display_name,
                score = ranked.score,
                "catalog: candidate ranking"
            );
        }
    }

    let found = herald_matcher::find_best_match(candidates, title, published_at);
    tracing::info!(
        platform,
        candidates = candidates.len(),
        matched = found.is_some(),
        "catalog: resolved episode"
    );
    found
}

/// Check the status and deserialize a JSON body, keeping the URL as context.
pub(crate) async fn read_json<T>(response: reqwest::Response) -> Result<T, CatalogError>
where
    T: serde::de::DeserializeOwned,
{
    let url = response.url().to_string();
    let status = response.status();
    if !status.is_success() {
        return Err(CatalogError::UnexpectedStatus {
            status: status.as_u16(),
            url,
        });
    }
    let body = response.text().await?;
    serde_json::from_str(&body).map_err(|source| CatalogError::Deserialize {
        context: url,
        source,
    })
}
