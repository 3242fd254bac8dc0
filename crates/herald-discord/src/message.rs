//! Forum post payloads and announcement formatting.

use herald_core::CanonicalEpisode;
use serde::Serialize;

use crate::error::DiscordError;

/// Discord rejects thread names longer than this.
const MAX_THREAD_NAME_CHARS: usize = 100;
const TRUNCATED_NAME_CHARS: usize = 97;

/// Discord rejects message content longer than this.
const MAX_MESSAGE_CHARS: usize = 2000;
const ELLIPSIS: &str = "...";

/// Threads auto-archive after three days of inactivity.
pub(crate) const AUTO_ARCHIVE_MINUTES: u32 = 4320;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Embed {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// ISO-8601 timestamp.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
}

/// A new forum thread and its opening message.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ForumPost {
    pub name: String,
    pub content: String,
    pub embeds: Vec<Embed>,
    pub applied_tags: Vec<String>,
}

/// Validate and shorten a thread name to Discord's 1–100 character range.
///
/// # Errors
///
/// Returns [`DiscordError::EmptyThreadName`] if `name` is blank.
pub fn thread_name(name: &str) -> Result<String, DiscordError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(DiscordError::EmptyThreadName);
    }
    if trimmed.chars().count() <= MAX_THREAD_NAME_CHARS {
        return Ok(trimmed.to_string());
    }
    Ok(truncate_chars(trimmed, TRUNCATED_NAME_CHARS))
}

/// The first `keep` characters of `text` followed by an ellipsis.
fn truncate_chars(text: &str, keep: usize) -> String {
    let mut shortened: String = text.chars().take(keep).collect();
    shortened.push_str(ELLIPSIS);
    shortened
}

/// The announcement for one newly published episode.
#[derive(Debug, Clone)]
pub struct Announcement<'a> {
    pub show_name: &'a str,
    pub episode: &'a CanonicalEpisode,
    pub apple_link: &'a str,
    pub spotify_link: &'a str,
}

impl Announcement<'_> {
    /// Message body: header, bold title, description, platform links.
    ///
    /// Single newlines in the description are doubled so Discord renders
    /// them as paragraph breaks. An empty description contributes no line.
    /// The description is shortened so the whole body stays within
    /// Discord's 2000 character message limit.
    #[must_use]
    pub fn content(&self) -> String {
        let description = self.episode.description.replace('\n', "\n\n");
        let mut parts = vec![
            format!(
                ":headphones: New {} Episode! :headphones:",
                self.show_name
            ),
            format!("**{}**", self.episode.title),
            "\n".to_string(),
            "\n".to_string(),
            format!("**Apple Podcasts:** {}", self.apple_link),
            format!("**Spotify:** {}", self.spotify_link),
        ];

        // Every part plus its separator, counting the description's own.
        let fixed: usize = parts.iter().map(|p| p.chars().count() + 1).sum();
        let budget = MAX_MESSAGE_CHARS.saturating_sub(fixed);
        let description = if description.chars().count() <= budget {
            description
        } else if budget > ELLIPSIS.len() {
            truncate_chars(&description, budget - ELLIPSIS.len())
        } else {
            String::new()
        };
        if !description.is_empty() {
            parts.insert(3, description);
        }
        parts.join("\n")
    }

    /// Build the forum post, tagged with `applied_tags`.
    #[must_use]
    pub fn into_post(self, applied_tags: &[String]) -> ForumPost {
        ForumPost {
            name: self.episode.title.clone(),
            content: self.content(),
            embeds: Vec::new(),
            applied_tags: applied_tags.to_vec(),
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct CreateThreadBody<'a> {
    pub name: String,
    pub auto_archive_duration: u32,
    #[serde(skip_serializing_if = "<[String]>::is_empty")]
    pub applied_tags: &'a [String],
    pub message: ThreadMessage<'a>,
}

#[derive(Debug, Serialize)]
pub(crate) struct ThreadMessage<'a> {
    pub content: &'a str,
    #[serde(skip_serializing_if = "<[Embed]>::is_empty")]
    pub embeds: &'a [Embed],
    pub allowed_mentions: AllowedMentions,
}

/// An empty `parse` list disables every kind of mention.
#[derive(Debug, Default, Serialize)]
pub(crate) struct AllowedMentions {
    pub parse: Vec<&'static str>,
}

impl<'a> CreateThreadBody<'a> {
    pub(crate) fn from_post(post: &'a ForumPost) -> Result<Self, DiscordError> {
        Ok(Self {
            name: thread_name(&post.name)?,
            auto_archive_duration: AUTO_ARCHIVE_MINUTES,
            applied_tags: &post.applied_tags,
            message: ThreadMessage {
                content: &post.content,
                embeds: &post.embeds,
                allowed_mentions: AllowedMentions::default(),
            },
        })
    }
}
