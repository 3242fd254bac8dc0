//! Canonical feed polling: fetch an RSS 2.0 or Atom document and normalize
//! its items into [`herald_core::CanonicalEpisode`] records.

pub mod client;
pub mod error;
pub mod identity;
pub mod parse;
mod text;

pub use client::FeedClient;
pub use error::FeedError;
pub use identity::{content_hash, first_present};
pub use parse::{latest_episode, parse_feed};
