use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

/// Where the announcement cursor is persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StateLocation {
    /// A JSON file on local disk.
    File(PathBuf),
    /// A JSON object in an S3 bucket.
    S3 {
        bucket: String,
        key: String,
        region: String,
    },
}

impl std::fmt::Display for StateLocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StateLocation::File(path) => write!(f, "file://{}", path.display()),
            StateLocation::S3 { bucket, key, .. } => write!(f, "s3://{bucket}/{key}"),
        }
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub discord_bot_token: String,
    pub forum_channel_id: String,
    pub forum_tag_ids: Vec<String>,
    pub feed_url: String,
    pub poll_interval_secs: u64,
    pub show_name: String,
    pub apple_country: String,
    pub apple_show_id: String,
    pub spotify_client_id: String,
    pub spotify_client_secret: String,
    pub spotify_market: String,
    pub spotify_show_id: String,
    pub state_location: StateLocation,
    pub bind_addr: SocketAddr,
    pub log_level: String,
    pub http_timeout_secs: u64,
    pub user_agent: String,
}

impl AppConfig {
    #[must_use]
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("discord_bot_token", &"[redacted]")
            .field("forum_channel_id", &self.forum_channel_id)
            .field("forum_tag_ids", &self.forum_tag_ids)
            .field("feed_url", &self.feed_url)
            .field("poll_interval_secs", &self.poll_interval_secs)
            .field("show_name", &self.show_name)
            .field("apple_country", &self.apple_country)
            .field("apple_show_id", &self.apple_show_id)
            .field("spotify_client_id", &self.spotify_client_id)
            .field("spotify_client_secret", &"[redacted]")
            .field("spotify_market", &self.spotify_market)
            .field("spotify_show_id", &self.spotify_show_id)
            .field("state_location", &self.state_location)
            .field("bind_addr", &self.bind_addr)
            .field("log_level", &self.log_level)
            .field("http_timeout_secs", &self.http_timeout_secs)
            .field("user_agent", &self.user_agent)
            .finish()
    }
}
