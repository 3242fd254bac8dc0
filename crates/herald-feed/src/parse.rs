//! RSS 2.0 and Atom extraction into [`CanonicalEpisode`]s.
//!
//! Items are read with a streaming event loop keyed on qualified element
//! names, so `itunes:title` and `title` are distinct fields and repeated or
//! unknown elements never fail the whole document.

use std::borrow::Cow;
use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, Utc};
use herald_core::CanonicalEpisode;
use quick_xml::events::{BytesStart, BytesText, Event};
use quick_xml::Reader;

use crate::error::FeedError;
use crate::identity::{first_present, item_identity};
use crate::text::html_to_text;

const DEFAULT_TITLE: &str = "New Episode";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FeedFormat {
    Rss,
    Atom,
}

impl FeedFormat {
    fn item_element(self) -> &'static str {
        match self {
            FeedFormat::Rss => "item",
            FeedFormat::Atom => "entry",
        }
    }
}

#[derive(Debug, Default)]
struct RawLink {
    rel: Option<String>,
    href: Option<String>,
}

/// Direct children of one `<item>` or `<entry>`, first occurrence wins.
#[derive(Debug, Default)]
struct RawItem {
    text: HashMap<String, String>,
    attributes: HashMap<String, String>,
    links: Vec<RawLink>,
}

impl RawItem {
    fn text(&self, element: &str) -> Option<&str> {
        self.text.get(element).map(String::as_str)
    }

    fn attribute(&self, element: &str, attribute: &str) -> Option<&str> {
        self.attributes
            .get(&format!("{element}@{attribute}"))
            .map(String::as_str)
    }

    fn record_attributes(&mut self, element: &str, start: &BytesStart<'_>) {
        let mut link = RawLink::default();
        for attr in start.attributes().flatten() {
            let Ok(value) = attr.unescape_value() else {
                continue;
            };
            let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
            if element == "link" {
                match key.as_str() {
                    "rel" => link.rel = Some(value.to_string()),
                    "href" => link.href = Some(value.to_string()),
                    _ => {}
                }
            }
            self.attributes
                .entry(format!("{element}@{key}"))
                .or_insert_with(|| value.into_owned());
        }
        if link.href.is_some() {
            self.links.push(link);
        }
    }

    /// The Atom `alternate` link; a link with no `rel` is `alternate` by default.
    fn alternate_link(&self) -> Option<&str> {
        self.links
            .iter()
            .find(|l| matches!(l.rel.as_deref(), None | Some("alternate")))
            .and_then(|l| l.href.as_deref())
    }

    fn enclosure_link(&self) -> Option<&str> {
        self.links
            .iter()
            .find(|l| l.rel.as_deref() == Some("enclosure"))
            .and_then(|l| l.href.as_deref())
    }
}

/// Parse a feed document into episodes, in document order.
///
/// `fetched_at` stands in for items whose publish date is missing or
/// unparseable.
///
/// # Errors
///
/// - [`FeedError::Xml`] if the document is not well-formed.
/// - [`FeedError::UnsupportedFormat`] if the root is neither `<rss>` nor `<feed>`.
/// - [`FeedError::Empty`] if there is no root element at all.
pub fn parse_feed(
    xml: &str,
    fetched_at: DateTime<Utc>,
) -> Result<Vec<CanonicalEpisode>, FeedError> {
    let format = detect_format(xml)?;
    let items = read_items(xml, format.item_element())?;
    Ok(items
        .iter()
        .map(|item| match format {
            FeedFormat::Rss => rss_episode(item, fetched_at),
            FeedFormat::Atom => atom_episode(item, fetched_at),
        })
        .collect())
}

/// The most recently published episode. Ties keep the earlier item.
#[must_use]
pub fn latest_episode(episodes: Vec<CanonicalEpisode>) -> Option<CanonicalEpisode> {
    let mut latest: Option<CanonicalEpisode> = None;
    for episode in episodes {
        if latest
            .as_ref()
            .is_none_or(|current| episode.published_at > current.published_at)
        {
            latest = Some(episode);
        }
    }
    latest
}

fn qualified_name(start: &BytesStart<'_>) -> String {
    String::from_utf8_lossy(start.name().as_ref()).into_owned()
}

fn detect_format(xml: &str) -> Result<FeedFormat, FeedError> {
    let mut reader = Reader::from_str(xml);
    loop {
        match reader.read_event()? {
            Event::Start(e) | Event::Empty(e) => {
                let name = qualified_name(&e);
                return match name.as_str() {
                    "rss" => Ok(FeedFormat::Rss),
                    "feed" => Ok(FeedFormat::Atom),
                    _ => Err(FeedError::UnsupportedFormat(name)),
                };
            }
            Event::Eof => return Err(FeedError::Empty),
            _ => {}
        }
    }
}

/// Entities XML does not define (`&nbsp;`) are kept raw for the HTML pass.
fn unescaped(text: &BytesText<'_>) -> String {
    text.unescape().map_or_else(
        |_| String::from_utf8_lossy(text.as_ref()).into_owned(),
        Cow::into_owned,
    )
}

/// Collect the direct children of every `item_element`.
///
/// Text inside a child, including text of nested markup, is concatenated
/// and trimmed. Elements outside items (channel metadata) are skipped.
fn read_items(xml: &str, item_element: &str) -> Result<Vec<RawItem>, FeedError> {
    let mut reader = Reader::from_str(xml);
    let mut items = Vec::new();
    let mut current: Option<RawItem> = None;
    // Nesting below the item element; 1 means inside a direct child.
    let mut depth = 0usize;
    let mut field = String::new();
    let mut buffer = String::new();

    loop {
        match reader.read_event()? {
            Event::Start(e) => {
                let Some(item) = current.as_mut() else {
                    if qualified_name(&e) == item_element {
                        current = Some(RawItem::default());
                        depth = 0;
                    }
                    continue;
                };
                depth += 1;
                if depth == 1 {
                    field = qualified_name(&e);
                    item.record_attributes(&field, &e);
                    buffer.clear();
                }
            }
            Event::Empty(e) => {
                if let Some(item) = current.as_mut() {
                    if depth == 0 {
                        item.record_attributes(&qualified_name(&e), &e);
                    }
                }
            }
            Event::End(_) => {
                if current.is_none() {
                    continue;
                }
                if depth == 0 {
                    items.extend(current.take());
                    continue;
                }
                if depth == 1 {
                    if let Some(item) = current.as_mut() {
                        let value = buffer.trim().to_owned();
                        item.text.entry(std::mem::take(&mut field)).or_insert(value);
                    }
                }
                depth -= 1;
            }
            Event::Text(e) => {
                if current.is_some() && depth >= 1 {
                    buffer.push_str(&unescaped(&e));
                }
            }
            Event::CData(e) => {
                if current.is_some() && depth >= 1 {
                    buffer.push_str(&String::from_utf8_lossy(e.as_ref()));
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(items)
}

fn rss_episode(item: &RawItem, fetched_at: DateTime<Utc>) -> CanonicalEpisode {
    let raw_title = item.text("title");
    let raw_pub_date = item.text("pubDate");

    let guid = item_identity(item.text("guid"), item.text("link"), raw_title, raw_pub_date);
    let description = first_present([
        item.text("itunes:summary"),
        item.text("content:encoded"),
        item.text("description"),
    ])
    .map(html_to_text)
    .unwrap_or_default();
    let audio_url = first_present([
        item.attribute("enclosure", "url"),
        item.attribute("itunes:image", "href"),
    ])
    .map(String::from);

    CanonicalEpisode {
        guid,
        title: first_present([raw_title, item.text("itunes:title")])
            .unwrap_or(DEFAULT_TITLE)
            .to_string(),
        description,
        published_at: raw_pub_date.and_then(parse_date).unwrap_or(fetched_at),
        audio_url,
    }
}

fn atom_episode(entry: &RawItem, fetched_at: DateTime<Utc>) -> CanonicalEpisode {
    let raw_title = entry.text("title");
    let raw_date = first_present([entry.text("published"), entry.text("updated")]);

    let guid = item_identity(entry.text("id"), entry.alternate_link(), raw_title, raw_date);
    let description = first_present([entry.text("summary"), entry.text("content")])
        .map(html_to_text)
        .unwrap_or_default();

    CanonicalEpisode {
        guid,
        title: first_present([raw_title]).unwrap_or(DEFAULT_TITLE).to_string(),
        description,
        published_at: raw_date.and_then(parse_date).unwrap_or(fetched_at),
        audio_url: entry.enclosure_link().map(String::from),
    }
}

/// Parse an RFC 2822, RFC 3339, or bare `YYYY-MM-DD` date.
fn parse_date(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    DateTime::parse_from_rfc2822(raw)
        .or_else(|_| DateTime::parse_from_rfc3339(raw))
        .map(|dt| dt.with_timezone(&Utc))
        .ok()
        .or_else(|| {
            NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
                .map(|dt| dt.and_utc())
        })
}

#[cfg(test)]
#[path = "parse_test.rs"]
mod tests;
