use chrono::TimeZone;

use super::*;
use crate::identity::content_hash;

fn fetched_at() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
}

fn rss(items: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0" xmlns:itunes="http://www.itunes.com/dtds/podcast-1.0.dtd" xmlns:content="http://purl.org/rss/1.0/modules/content/">
  <channel>
    <title>Carolina Insider</title>
    <link>https://example.com/show</link>
    <itunes:image href="https://example.com/show.jpg"/>
    {items}
  </channel>
</rss>"#
    )
}

#[test]
fn parses_full_rss_item() {
    let xml = rss(
        r#"<item>
          <title>Season Finale</title>
          <link>https://example.com/ep/finale</link>
          <guid isPermaLink="false">g1</guid>
          <pubDate>Wed, 01 May 2024 10:00:00 +0000</pubDate>
          <description><![CDATA[<p>Plain description</p>]]></description>
          <itunes:summary>The season wraps up.</itunes:summary>
          <enclosure url="https://cdn.example.com/finale.mp3" length="123" type="audio/mpeg"/>
        </item>"#,
    );
    let episodes = parse_feed(&xml, fetched_at()).expect("parse");
    assert_eq!(episodes.len(), 1);
    let ep = &episodes[0];
    assert_eq!(ep.guid, "g1");
    assert_eq!(ep.title, "Season Finale");
    assert_eq!(ep.description, "The season wraps up.");
    assert_eq!(
        ep.published_at,
        Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap()
    );
    assert_eq!(
        ep.audio_url.as_deref(),
        Some("https://cdn.example.com/finale.mp3")
    );
}

#[test]
fn art19_item_keeps_namespaced_fields_apart() {
    let xml = rss(
        r#"<item>
          <title>Ep. 212: Spring Game Recap</title>
          <itunes:title>Spring Game Recap</itunes:title>
          <description><![CDATA[<p>Short blurb</p>]]></description>
          <itunes:summary>Recap of the spring game &amp; what comes next.</itunes:summary>
          <content:encoded><![CDATA[<p>Full <a href="https://example.com">show notes</a></p>]]></content:encoded>
          <guid isPermaLink="false">gid://art19-episode-locator/V0/abc123</guid>
          <pubDate>Tue, 23 Apr 2024 09:00:00 -0000</pubDate>
          <itunes:episodeType>full</itunes:episodeType>
          <itunes:season>4</itunes:season>
          <itunes:episode>212</itunes:episode>
          <itunes:image href="https://content.production.cdn.art19.com/images/ep212.jpeg"/>
          <itunes:explicit>false</itunes:explicit>
          <itunes:duration>00:48:12</itunes:duration>
          <enclosure url="https://rss.art19.com/episodes/abc123.mp3" type="audio/mpeg" length="46285024"/>
        </item>"#,
    );
    let episodes = parse_feed(&xml, fetched_at()).expect("namespaced siblings must not clash");
    assert_eq!(episodes.len(), 1);
    let ep = &episodes[0];
    assert_eq!(ep.guid, "gid://art19-episode-locator/V0/abc123");
    assert_eq!(ep.title, "Ep. 212: Spring Game Recap");
    assert_eq!(ep.description, "Recap of the spring game & what comes next.");
    assert_eq!(
        ep.published_at,
        Utc.with_ymd_and_hms(2024, 4, 23, 9, 0, 0).unwrap()
    );
    assert_eq!(
        ep.audio_url.as_deref(),
        Some("https://rss.art19.com/episodes/abc123.mp3")
    );
}

#[test]
fn itunes_title_used_when_plain_title_missing() {
    let xml = rss("<item><guid>a</guid><itunes:title>Only iTunes</itunes:title></item>");
    let episodes = parse_feed(&xml, fetched_at()).unwrap();
    assert_eq!(episodes[0].title, "Only iTunes");
}

#[test]
fn repeated_and_nested_children_do_not_fail_the_feed() {
    let xml = rss(
        r#"<item>
          <guid>a</guid>
          <title>First</title>
          <title>Second</title>
          <media:group xmlns:media="http://search.yahoo.com/mrss/">
            <media:content url="https://example.com/nested.mp3"/>
            <media:title>Nested</media:title>
          </media:group>
          <itunes:category text="Sports"><itunes:category text="College"/></itunes:category>
        </item>
        <item><guid>b</guid><title>Next</title></item>"#,
    );
    let episodes = parse_feed(&xml, fetched_at()).unwrap();
    assert_eq!(episodes.len(), 2);
    assert_eq!(episodes[0].title, "First");
    assert_eq!(episodes[0].audio_url, None);
    assert_eq!(episodes[1].title, "Next");
}

#[test]
fn channel_image_is_not_an_item_fallback() {
    let xml = rss("<item><guid>a</guid></item>");
    let episodes = parse_feed(&xml, fetched_at()).unwrap();
    assert_eq!(episodes[0].audio_url, None);
}

#[test]
fn link_is_identity_when_guid_missing() {
    let xml = rss(
        "<item><title>Ep</title><link>https://example.com/ep/2</link>\
         <pubDate>Wed, 01 May 2024 10:00:00 GMT</pubDate></item>",
    );
    let episodes = parse_feed(&xml, fetched_at()).unwrap();
    assert_eq!(episodes[0].guid, "https://example.com/ep/2");
}

#[test]
fn content_hash_is_identity_when_guid_and_link_missing() {
    let xml = rss("<item><title>Ep 3</title><pubDate>not a date</pubDate></item>");
    let episodes = parse_feed(&xml, fetched_at()).unwrap();
    assert_eq!(episodes[0].guid, content_hash("Ep 3", "not a date"));
    // Unparseable date falls back to the fetch time.
    assert_eq!(episodes[0].published_at, fetched_at());
}

#[test]
fn blank_guid_falls_through_to_link() {
    let xml = rss("<item><guid>  </guid><link>https://example.com/ep/4</link></item>");
    let episodes = parse_feed(&xml, fetched_at()).unwrap();
    assert_eq!(episodes[0].guid, "https://example.com/ep/4");
}

#[test]
fn missing_title_uses_default() {
    let xml = rss("<item><guid>g9</guid></item>");
    let episodes = parse_feed(&xml, fetched_at()).unwrap();
    assert_eq!(episodes[0].title, "New Episode");
    assert_eq!(episodes[0].description, "");
    assert_eq!(episodes[0].audio_url, None);
}

#[test]
fn description_falls_back_to_content_then_description() {
    let xml = rss(
        r#"<item><guid>a</guid><content:encoded><![CDATA[<p>Encoded <b>body</b></p>]]></content:encoded>
           <description>Short</description></item>
           <item><guid>b</guid><description>&lt;p&gt;Only description&lt;/p&gt;</description></item>"#,
    );
    let episodes = parse_feed(&xml, fetched_at()).unwrap();
    assert_eq!(episodes[0].description, "Encoded body");
    assert_eq!(episodes[1].description, "Only description");
}

#[test]
fn audio_url_falls_back_to_itunes_image() {
    let xml = rss(r#"<item><guid>a</guid><itunes:image href="https://example.com/ep.jpg"/></item>"#);
    let episodes = parse_feed(&xml, fetched_at()).unwrap();
    assert_eq!(
        episodes[0].audio_url.as_deref(),
        Some("https://example.com/ep.jpg")
    );
}

#[test]
fn bare_iso_date_is_midnight_utc() {
    let xml = rss("<item><guid>a</guid><pubDate>2024-05-01</pubDate></item>");
    let episodes = parse_feed(&xml, fetched_at()).unwrap();
    assert_eq!(
        episodes[0].published_at,
        Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap()
    );
}

#[test]
fn channel_without_items_is_empty() {
    let episodes = parse_feed(&rss(""), fetched_at()).unwrap();
    assert!(episodes.is_empty());
}

#[test]
fn parses_atom_entries() {
    let xml = r#"<?xml version="1.0" encoding="utf-8"?>
<feed xmlns="http://www.w3.org/2005/Atom">
  <title>Show</title>
  <entry>
    <id>urn:uuid:1234</id>
    <title type="text">Atom Episode</title>
    <link rel="alternate" href="https://example.com/atom/1"/>
    <link rel="enclosure" href="https://cdn.example.com/atom1.mp3"/>
    <published>2024-05-02T08:30:00Z</published>
    <updated>2024-05-03T00:00:00Z</updated>
    <summary type="html">&lt;p&gt;Atom summary&lt;/p&gt;</summary>
  </entry>
  <entry>
    <title>No Id</title>
    <link href="https://example.com/atom/2"/>
    <updated>2024-05-04T00:00:00Z</updated>
  </entry>
</feed>"#;
    let episodes = parse_feed(xml, fetched_at()).expect("parse atom");
    assert_eq!(episodes.len(), 2);
    assert_eq!(episodes[0].guid, "urn:uuid:1234");
    assert_eq!(episodes[0].title, "Atom Episode");
    assert_eq!(episodes[0].description, "Atom summary");
    assert_eq!(
        episodes[0].published_at,
        Utc.with_ymd_and_hms(2024, 5, 2, 8, 30, 0).unwrap()
    );
    assert_eq!(
        episodes[0].audio_url.as_deref(),
        Some("https://cdn.example.com/atom1.mp3")
    );
    assert_eq!(episodes[1].guid, "https://example.com/atom/2");
    assert_eq!(
        episodes[1].published_at,
        Utc.with_ymd_and_hms(2024, 5, 4, 0, 0, 0).unwrap()
    );
}

#[test]
fn unknown_root_is_rejected() {
    let result = parse_feed("<html><body/></html>", fetched_at());
    assert!(
        matches!(result, Err(FeedError::UnsupportedFormat(ref name)) if name == "html"),
        "got {result:?}"
    );
}

#[test]
fn empty_document_is_rejected() {
    let result = parse_feed("", fetched_at());
    assert!(matches!(result, Err(FeedError::Empty)), "got {result:?}");
}

#[test]
fn latest_episode_picks_newest_regardless_of_order() {
    let xml = rss(
        "<item><guid>old</guid><pubDate>Mon, 01 Apr 2024 00:00:00 +0000</pubDate></item>\
         <item><guid>new</guid><pubDate>Wed, 01 May 2024 00:00:00 +0000</pubDate></item>\
         <item><guid>mid</guid><pubDate>Wed, 10 Apr 2024 00:00:00 +0000</pubDate></item>",
    );
    let latest = latest_episode(parse_feed(&xml, fetched_at()).unwrap()).expect("latest");
    assert_eq!(latest.guid, "new");
}

#[test]
fn latest_episode_ties_keep_feed_order() {
    let xml = rss(
        "<item><guid>first</guid><pubDate>Wed, 01 May 2024 00:00:00 +0000</pubDate></item>\
         <item><guid>second</guid><pubDate>Wed, 01 May 2024 00:00:00 +0000</pubDate></item>",
    );
    let latest = latest_episode(parse_feed(&xml, fetched_at()).unwrap()).expect("latest");
    assert_eq!(latest.guid, "first");
}

#[test]
fn latest_episode_of_nothing_is_none() {
    assert_eq!(latest_episode(Vec::new()), None);
}
