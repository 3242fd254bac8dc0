//! One poll cycle: fetch, match, decide, post, persist.
//!
//! A cycle never announces the same canonical episode twice in a row: the
//! cursor is consulted before any catalog call and is only advanced after
//! the forum post succeeds. A failed save after a successful post is logged
//! and left for the next cycle to repeat (at-least-once).

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use herald_catalog::{CatalogError, EpisodeCatalog};
use herald_core::{CanonicalEpisode, Cursor};
use herald_discord::{Announcement, DiscordClient, DiscordError, ForumPost};
use herald_feed::{FeedClient, FeedError};
use herald_state::StateStore;
use thiserror::Error;
use tokio_util::sync::CancellationToken;

/// Source of the newest canonical episode.
#[async_trait]
pub trait FeedSource: Send + Sync {
    async fn latest_episode(&self) -> Result<Option<CanonicalEpisode>, FeedError>;
}

#[async_trait]
impl FeedSource for FeedClient {
    async fn latest_episode(&self) -> Result<Option<CanonicalEpisode>, FeedError> {
        self.fetch_latest().await
    }
}

/// Destination for forum announcements.
#[async_trait]
pub trait Announcer: Send + Sync {
    async fn create_forum_post(&self, channel_id: &str, post: &ForumPost)
        -> Result<(), DiscordError>;
}

#[async_trait]
impl Announcer for DiscordClient {
    async fn create_forum_post(
        &self,
        channel_id: &str,
        post: &ForumPost,
    ) -> Result<(), DiscordError> {
        DiscordClient::create_forum_post(self, channel_id, post).await
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Fetching,
    Matching,
    Posting,
    Persisting,
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Phase::Fetching => "fetching",
            Phase::Matching => "matching",
            Phase::Posting => "posting",
            Phase::Persisting => "persisting",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CycleOutcome {
    /// The feed has no items.
    NoEpisode,
    /// The newest episode is the one the cursor already records.
    AlreadyAnnounced { guid: String },
    /// At least one catalog has no usable listing yet.
    Unmatched { apple: bool, spotify: bool },
    /// The Spotify match is the previously announced episode; the catalog
    /// has not caught up with the feed.
    AwaitingPropagation { guid: String },
    Posted { guid: String, title: String },
}

#[derive(Debug, Error)]
pub enum CycleFailure {
    #[error(transparent)]
    Feed(#[from] FeedError),

    #[error("{platform}: {source}")]
    Catalog {
        platform: &'static str,
        #[source]
        source: CatalogError,
    },

    #[error(transparent)]
    Discord(#[from] DiscordError),
}

#[derive(Debug, Error)]
#[error("cycle failed while {phase}: {source}")]
pub struct CycleError {
    pub phase: Phase,
    #[source]
    pub source: CycleFailure,
}

impl CycleError {
    fn new(phase: Phase, source: impl Into<CycleFailure>) -> Self {
        Self {
            phase,
            source: source.into(),
        }
    }
}

/// Where and how announcements are posted.
#[derive(Debug, Clone)]
pub struct AnnounceSettings {
    pub show_name: String,
    pub channel_id: String,
    pub tag_ids: Vec<String>,
}

pub struct Orchestrator {
    feed: Arc<dyn FeedSource>,
    apple: Arc<dyn EpisodeCatalog>,
    spotify: Arc<dyn EpisodeCatalog>,
    announcer: Arc<dyn Announcer>,
    state: Arc<dyn StateStore>,
    settings: AnnounceSettings,
}

impl Orchestrator {
    #[must_use]
    pub fn new(
        feed: Arc<dyn FeedSource>,
        apple: Arc<dyn EpisodeCatalog>,
        spotify: Arc<dyn EpisodeCatalog>,
        announcer: Arc<dyn Announcer>,
        state: Arc<dyn StateStore>,
        settings: AnnounceSettings,
    ) -> Self {
        Self {
            feed,
            apple,
            spotify,
            announcer,
            state,
            settings,
        }
    }

    /// Run one cycle.
    ///
    /// # Errors
    ///
    /// Returns [`CycleError`] if the feed fetch, either catalog lookup, or
    /// the forum post fails. The cursor is unchanged in every error case.
    pub async fn run_cycle(&self) -> Result<CycleOutcome, CycleError> {
        let cursor = match self.state.load().await {
            Ok(cursor) => cursor,
            Err(e) => {
                tracing::warn!(
                    store = %self.state.describe(),
                    error = %e,
                    "orchestrator: failed to load cursor; treating as empty"
                );
                Cursor::default()
            }
        };

        let Some(episode) = self
            .feed
            .latest_episode()
            .await
            .map_err(|e| CycleError::new(Phase::Fetching, e))?
        else {
            tracing::info!("orchestrator: feed has no episodes");
            return Ok(CycleOutcome::NoEpisode);
        };

        if cursor.is_announced(&episode.guid) {
            tracing::debug!(guid = %episode.guid, "orchestrator: nothing new");
            return Ok(CycleOutcome::AlreadyAnnounced {
                guid: episode.guid,
            });
        }

        tracing::info!(
            guid = %episode.guid,
            title = %episode.title,
            published_at = %episode.published_at,
            "orchestrator: new episode in feed"
        );

        let (apple, spotify) = tokio::join!(
            self.apple.find_episode(&episode.title, episode.published_at),
            self.spotify.find_episode(&episode.title, episode.published_at),
        );
        let apple = apple.map_err(|source| {
            CycleError::new(
                Phase::Matching,
                CycleFailure::Catalog {
                    platform: self.apple.platform(),
                    source,
                },
            )
        })?;
        let spotify = spotify.map_err(|source| {
            CycleError::new(
                Phase::Matching,
                CycleFailure::Catalog {
                    platform: self.spotify.platform(),
                    source,
                },
            )
        })?;

        let (Some(apple), Some(spotify)) = (&apple, &spotify) else {
            tracing::info!(
                guid = %episode.guid,
                apple = apple.is_some(),
                spotify = spotify.is_some(),
                "orchestrator: skipped; episode not listed on every platform yet"
            );
            return Ok(CycleOutcome::Unmatched {
                apple: apple.is_some(),
                spotify: spotify.is_some(),
            });
        };

        if cursor.last_spotify_episode_id.as_deref() == Some(spotify.episode_id.as_str()) {
            tracing::info!(
                guid = %episode.guid,
                spotify_episode_id = %spotify.episode_id,
                "orchestrator: spotify still lists the previous episode; waiting"
            );
            return Ok(CycleOutcome::AwaitingPropagation {
                guid: episode.guid,
            });
        }

        let post = Announcement {
            show_name: &self.settings.show_name,
            episode: &episode,
            apple_link: &apple.link,
            spotify_link: &spotify.link,
        }
        .into_post(&self.settings.tag_ids);
        self.announcer
            .create_forum_post(&self.settings.channel_id, &post)
            .await
            .map_err(|e| CycleError::new(Phase::Posting, e))?;

        let next = Cursor::new(episode.guid.clone(), spotify.episode_id.clone());
        if let Err(e) = self.state.save(&next).await {
            tracing::error!(
                phase = %Phase::Persisting,
                store = %self.state.describe(),
                guid = %episode.guid,
                error = %e,
                "orchestrator: posted but failed to save cursor"
            );
        }

        tracing::info!(guid = %episode.guid, title = %episode.title, "orchestrator: posted");
        Ok(CycleOutcome::Posted {
            guid: episode.guid,
            title: episode.title,
        })
    }

    /// Run a cycle immediately, then one every `interval` until `cancel` fires.
    ///
    /// Cycle errors are logged and the loop continues.
    pub async fn run(&self, interval: Duration, cancel: CancellationToken) {
        loop {
            if cancel.is_cancelled() {
                break;
            }
            if let Err(e) = self.run_cycle().await {
                tracing::error!(phase = %e.phase, error = %e.source, "orchestrator: cycle failed");
            }
            tokio::select! {
                () = cancel.cancelled() => break,
                () = tokio::time::sleep(interval) => {}
            }
        }
        tracing::info!("orchestrator: stopped");
    }
}

#[cfg(test)]
#[path = "orchestrator_test.rs"]
mod tests;
