//! HTTP fetch of the canonical feed.

use std::time::Duration;

use chrono::Utc;
use herald_core::CanonicalEpisode;
use reqwest::Client;

use crate::error::FeedError;
use crate::parse::{latest_episode, parse_feed};

/// Fetches the feed of record and picks its latest episode.
pub struct FeedClient {
    client: Client,
    feed_url: String,
}

impl FeedClient {
    /// Creates a client for `feed_url` with a bounded request timeout.
    ///
    /// # Errors
    ///
    /// Returns [`FeedError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(feed_url: &str, timeout_secs: u64, user_agent: &str) -> Result<Self, FeedError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;
        Ok(Self {
            client,
            feed_url: feed_url.to_owned(),
        })
    }

    #[must_use]
    pub fn feed_url(&self) -> &str {
        &self.feed_url
    }

    /// Fetches and parses every item in the feed.
    ///
    /// # Errors
    ///
    /// - [`FeedError::Http`] on network failure or timeout.
    /// - [`FeedError::UnexpectedStatus`] on a non-2xx response.
    /// - Any parse error from [`parse_feed`].
    pub async fn fetch_episodes(&self) -> Result<Vec<CanonicalEpisode>, FeedError> {
        let response = self
            .client
            .get(&self.feed_url)
            .header(
                reqwest::header::ACCEPT,
                "application/rss+xml, application/atom+xml, application/xml;q=0.9, */*;q=0.8",
            )
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FeedError::UnexpectedStatus {
                status: status.as_u16(),
                url: self.feed_url.clone(),
            });
        }

        let body = response.text().await?;
        let episodes = parse_feed(&body, Utc::now())?;
        tracing::debug!(
            feed_url = %self.feed_url,
            items = episodes.len(),
            "feed: fetched items"
        );
        Ok(episodes)
    }

    /// Fetches the feed and returns its most recently published episode.
    ///
    /// # Errors
    ///
    /// Same as [`FeedClient::fetch_episodes`].
    pub async fn fetch_latest(&self) -> Result<Option<CanonicalEpisode>, FeedError> {
        Ok(latest_episode(self.fetch_episodes().await?))
    }
}
