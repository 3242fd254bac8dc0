use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An episode as published in the feed of record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanonicalEpisode {
    /// Feed guid, falling back to the item link, then to a content hash.
    pub guid: String,
    pub title: String,
    pub description: String,
    pub published_at: DateTime<Utc>,
    pub audio_url: Option<String>,
}

/// One entry from a podcast platform's episode listing.
///
/// `release_date` is the Unix epoch when the platform omits it, which pushes
/// undated entries to the bottom of any ranking.
#[derive(Debug, Clone, PartialEq)]
pub struct CandidateEpisode {
    pub display_name: String,
    pub release_date: DateTime<Utc>,
    pub platform_id: Option<String>,
    pub public_url: Option<String>,
}

impl CandidateEpisode {
    /// Returns the platform id if it is present and not blank.
    #[must_use]
    pub fn usable_id(&self) -> Option<&str> {
        non_blank(self.platform_id.as_deref())
    }

    /// Returns the public link if it is present and not blank.
    #[must_use]
    pub fn usable_url(&self) -> Option<&str> {
        non_blank(self.public_url.as_deref())
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

/// A resolved episode on one platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlatformMatch {
    pub episode_id: String,
    pub link: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(id: Option<&str>, url: Option<&str>) -> CandidateEpisode {
        CandidateEpisode {
            display_name: "Ep".to_string(),
            release_date: DateTime::<Utc>::UNIX_EPOCH,
            platform_id: id.map(String::from),
            public_url: url.map(String::from),
        }
    }

    #[test]
    fn blank_id_and_url_are_not_usable() {
        let c = candidate(Some("  "), Some(""));
        assert_eq!(c.usable_id(), None);
        assert_eq!(c.usable_url(), None);
    }

    #[test]
    fn present_id_and_url_are_usable() {
        let c = candidate(Some("a1"), Some("https://a/a1"));
        assert_eq!(c.usable_id(), Some("a1"));
        assert_eq!(c.usable_url(), Some("https://a/a1"));
    }
}
