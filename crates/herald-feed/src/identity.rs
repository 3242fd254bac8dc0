//! Stable identity for feed items.

use sha2::{Digest, Sha256};

/// Returns the first value that is present and not blank.
///
/// Candidates are checked in order, so callers express precedence by the
/// order they pass them in.
#[must_use]
pub fn first_present<'a, I>(candidates: I) -> Option<&'a str>
where
    I: IntoIterator<Item = Option<&'a str>>,
{
    candidates
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|value| !value.is_empty())
}

/// Hex SHA-256 of the raw title followed by the raw publish-date string.
///
/// Used as the item id of last resort, so it must be computed from the
/// unparsed feed text: two fetches of the same malformed item hash the same.
#[must_use]
pub fn content_hash(raw_title: &str, raw_pub_date: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(raw_title.as_bytes());
    hasher.update(raw_pub_date.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Resolve an item id: guid, then link, then [`content_hash`].
#[must_use]
pub fn item_identity(
    guid: Option<&str>,
    link: Option<&str>,
    raw_title: Option<&str>,
    raw_pub_date: Option<&str>,
) -> String {
    first_present([guid, link]).map_or_else(
        || content_hash(raw_title.unwrap_or(""), raw_pub_date.unwrap_or("")),
        str::to_string,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_present_respects_order() {
        assert_eq!(first_present([Some("a"), Some("b")]), Some("a"));
        assert_eq!(first_present([None, Some("b")]), Some("b"));
    }

    #[test]
    fn first_present_skips_blank_values() {
        assert_eq!(first_present([Some("   "), Some(""), Some("c")]), Some("c"));
        assert_eq!(first_present([Some(" "), None]), None);
    }

    #[test]
    fn guid_wins_over_link() {
        let id = item_identity(Some("guid-1"), Some("https://x/1"), Some("T"), Some("D"));
        assert_eq!(id, "guid-1");
    }

    #[test]
    fn link_used_when_guid_missing() {
        let id = item_identity(None, Some("https://x/1"), Some("T"), Some("D"));
        assert_eq!(id, "https://x/1");
    }

    #[test]
    fn hash_used_when_guid_and_link_missing() {
        let id = item_identity(None, Some(" "), Some("Title"), Some("Wed, 01 May 2024"));
        assert_eq!(id, content_hash("Title", "Wed, 01 May 2024"));
        assert_eq!(id.len(), 64);
    }

    #[test]
    fn hash_is_stable_and_sensitive_to_input() {
        assert_eq!(content_hash("a", "b"), content_hash("a", "b"));
        assert_ne!(content_hash("a", "b"), content_hash("a", "c"));
        // Known SHA-256 of the empty string.
        assert_eq!(
            content_hash("", ""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }
}
