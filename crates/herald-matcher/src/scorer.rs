//! Similarity cost between a feed episode and a platform listing entry.
//!
//! The cost is the Jaccard distance between the token sets of the two
//! normalized titles plus the distance between the two dates in days.
//! Lower is better; identical title and date cost exactly `0.0`.

use std::collections::HashSet;
use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use regex::Regex;

const MILLIS_PER_DAY: f64 = 86_400_000.0;

static NON_ALNUM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^a-z0-9]+").expect("valid non-alphanumeric regex"));

/// Lowercase `title`, collapse every run of characters outside `[a-z0-9]`
/// into one space, and trim.
#[must_use]
pub fn normalize_title(title: &str) -> String {
    let lower = title.to_lowercase();
    NON_ALNUM.replace_all(&lower, " ").trim().to_string()
}

/// Jaccard distance between the whitespace token sets of two normalized
/// titles, in `[0.0, 1.0]`.
///
/// Equal strings return `0.0` before tokenizing.
#[must_use]
pub fn title_distance(a: &str, b: &str) -> f64 {
    if a == b {
        return 0.0;
    }

    let left: HashSet<&str> = a.split_whitespace().collect();
    let right: HashSet<&str> = b.split_whitespace().collect();

    let intersection = left.intersection(&right).count();
    let union = left.union(&right).count().max(1);

    #[allow(clippy::cast_precision_loss)]
    let ratio = intersection as f64 / union as f64;
    1.0 - ratio
}

/// Absolute distance between two timestamps in fractional days.
#[must_use]
pub fn date_distance_days(a: DateTime<Utc>, b: DateTime<Utc>) -> f64 {
    #[allow(clippy::cast_precision_loss)]
    let millis = (a - b).num_milliseconds().unsigned_abs() as f64;
    millis / MILLIS_PER_DAY
}

/// Combined matching cost of a candidate against a target episode.
#[must_use]
pub fn score(
    target_title: &str,
    target_date: DateTime<Utc>,
    candidate_name: &str,
    candidate_date: DateTime<Utc>,
) -> f64 {
    let text = title_distance(
        &normalize_title(target_title),
        &normalize_title(candidate_name),
    );
    text + date_distance_days(target_date, candidate_date)
}
