//! Podcast platform lookups.
//!
//! Each client fetches one platform's episode listing, converts it into
//! [`herald_core::CandidateEpisode`]s, and hands it to
//! [`herald_matcher::find_best_match`].

pub mod apple;
pub mod catalog;
pub mod error;
pub mod spotify;
pub mod token;

pub use apple::AppleClient;
pub use catalog::{build_http_client, EpisodeCatalog};
pub use error::CatalogError;
pub use spotify::SpotifyClient;
pub use token::{SpotifyCredentials, TokenCache};
