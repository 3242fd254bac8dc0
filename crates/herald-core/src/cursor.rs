use serde::{Deserialize, Serialize};

/// Marker of the last successfully announced episode.
///
/// Serialized as `{"lastGuid": .., "lastSpotifyEpisodeId": ..}`; absent keys
/// read back as `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cursor {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_guid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_spotify_episode_id: Option<String>,
}

impl Cursor {
    #[must_use]
    pub fn new(guid: impl Into<String>, spotify_episode_id: impl Into<String>) -> Self {
        Self {
            last_guid: Some(guid.into()),
            last_spotify_episode_id: Some(spotify_episode_id.into()),
        }
    }

    /// Whether `guid` was the last episode announced.
    #[must_use]
    pub fn is_announced(&self, guid: &str) -> bool {
        self.last_guid.as_deref() == Some(guid)
    }
}
