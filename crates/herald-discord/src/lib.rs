//! Discord forum announcements.

pub mod client;
pub mod error;
pub mod message;

pub use client::DiscordClient;
pub use error::DiscordError;
pub use message::{thread_name, Announcement, Embed, ForumPost};
