use reqwest::{Client, Url};
use serde::Deserialize;

use crate::error::DiscordError;
use crate::message::{CreateThreadBody, ForumPost};

const DEFAULT_BASE_URL: &str = "https://discord.com/";

/// The subset of the created channel object that is logged.
#[derive(Debug, Deserialize)]
struct CreatedThread {
    id: Option<String>,
}

/// Bot-authenticated client for creating forum threads.
pub struct DiscordClient {
    client: Client,
    base_url: Url,
    bot_token: String,
}

impl std::fmt::Debug for DiscordClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DiscordClient")
            .field("base_url", &self.base_url.as_str())
            .field("bot_token", &"[redacted]")
            .finish()
    }
}

impl DiscordClient {
    /// Creates a client pointed at the production Discord API.
    ///
    /// # Errors
    ///
    /// Returns [`DiscordError::InvalidBaseUrl`] only if the built-in URL fails to parse.
    pub fn new(client: Client, bot_token: &str) -> Result<Self, DiscordError> {
        Self::with_base_url(client, bot_token, DEFAULT_BASE_URL)
    }

    /// Creates a client with a custom base URL (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// Returns [`DiscordError::InvalidBaseUrl`] if `base_url` is not a valid URL.
    pub fn with_base_url(
        client: Client,
        bot_token: &str,
        base_url: &str,
    ) -> Result<Self, DiscordError> {
        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let base_url = Url::parse(&normalised).map_err(|e| DiscordError::InvalidBaseUrl {
            url: base_url.to_string(),
            reason: e.to_string(),
        })?;
        Ok(Self {
            client,
            base_url,
            bot_token: bot_token.to_owned(),
        })
    }

    fn threads_url(&self, channel_id: &str) -> Result<Url, DiscordError> {
        let path = format!("api/v10/channels/{channel_id}/threads");
        self.base_url
            .join(&path)
            .map_err(|e| DiscordError::InvalidBaseUrl {
                url: self.base_url.to_string(),
                reason: e.to_string(),
            })
    }

    /// Start a new thread in forum channel `channel_id`.
    ///
    /// Threads auto-archive after three days and the opening message never
    /// pings anyone.
    ///
    /// # Errors
    ///
    /// - [`DiscordError::EmptyThreadName`] if the post name is blank; no
    ///   request is sent.
    /// - [`DiscordError::Http`] on network failure.
    /// - [`DiscordError::UnexpectedStatus`] with the response body on a non-2xx reply.
    pub async fn create_forum_post(
        &self,
        channel_id: &str,
        post: &ForumPost,
    ) -> Result<(), DiscordError> {
        let body = CreateThreadBody::from_post(post)?;
        let url = self.threads_url(channel_id)?;

        let response = self
            .client
            .post(url)
            .header(
                reqwest::header::AUTHORIZATION,
                format!("Bot {}", self.bot_token),
            )
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            return Err(DiscordError::UnexpectedStatus {
                status: status.as_u16(),
                body: text,
            });
        }

        let thread_id = serde_json::from_str::<CreatedThread>(&text)
            .ok()
            .and_then(|t| t.id);
        tracing::info!(
            channel_id,
            thread_id = thread_id.as_deref().unwrap_or("unknown"),
            name = %body.name,
            "discord: created forum post"
        );
        Ok(())
    }
}
