//! Cross-platform episode matching.
//!
//! [`scorer`] computes a cost between two `(title, date)` pairs and
//! [`matcher`] picks the cheapest candidate from a platform's listing.

pub mod matcher;
pub mod scorer;

pub use matcher::{find_best_match, rank_candidates, ScoredCandidate};
pub use scorer::{date_distance_days, normalize_title, score, title_distance};
