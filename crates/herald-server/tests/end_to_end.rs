//! Full poll cycles against mocked feed, catalog, and Discord endpoints.

use std::sync::Arc;

use herald_catalog::{AppleClient, SpotifyClient, SpotifyCredentials, TokenCache};
use herald_core::Cursor;
use herald_discord::DiscordClient;
use herald_feed::FeedClient;
use herald_server::{AnnounceSettings, CycleOutcome, Orchestrator};
use herald_state::{FileStateStore, StateStore};
use reqwest::Client;
use serde_json::json;
use wiremock::matchers::{body_string_contains, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const APPLE_SHOW_ID: &str = "1153767411";
const SPOTIFY_SHOW_ID: &str = "2QJzvnL7OWI9XZ432l3glX";
const CHANNEL_ID: &str = "998877";

const FEED: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0" xmlns:itunes="http://www.itunes.com/dtds/podcast-1.0.dtd">
  <channel>
    <title>Carolina Insider</title>
    <item>
      <title>Season Finale</title>
      <guid isPermaLink="false">g1</guid>
      <pubDate>Wed, 01 May 2024 07:00:00 +0000</pubDate>
      <description><![CDATA[<p>The last one of the year.</p>]]></description>
    </item>
    <item>
      <title>Midseason Check-in</title>
      <guid isPermaLink="false">g0</guid>
      <pubDate>Wed, 03 Apr 2024 07:00:00 +0000</pubDate>
      <description>Halfway there.</description>
    </item>
  </channel>
</rss>"#;

async fn mount_feed(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/rss"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "application/rss+xml")
                .set_body_string(FEED),
        )
        .mount(server)
        .await;
}

async fn mount_catalogs(server: &MockServer, expected_lookups: u64) {
    Mock::given(method("GET"))
        .and(path("/lookup"))
        .and(query_param("id", APPLE_SHOW_ID))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "resultCount": 2,
            "results": [
                { "wrapperType": "track", "kind": "podcast", "trackName": "Carolina Insider" },
                {
                    "wrapperType": "podcastEpisode",
                    "trackId": 1001,
                    "trackName": "Season Finale",
                    "trackViewUrl": "https://a/a1",
                    "releaseDate": "2024-05-01T07:00:00Z"
                }
            ]
        })))
        .expect(expected_lookups)
        .mount(server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "e2e-token",
            "token_type": "Bearer",
            "expires_in": 3600
        })))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path(format!("/v1/shows/{SPOTIFY_SHOW_ID}/episodes")))
        .and(header("authorization", "Bearer e2e-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [
                {
                    "id": "b1",
                    "name": "season finale!!",
                    "release_date": "2024-05-01",
                    "external_urls": { "spotify": "https://b/b1" }
                }
            ]
        })))
        .expect(expected_lookups)
        .mount(server)
        .await;
}

fn orchestrator(server: &MockServer, state: Arc<FileStateStore>) -> Orchestrator {
    let base = server.uri();
    let http = Client::new();
    let feed = FeedClient::new(&format!("{base}/rss"), 5, "podherald-test").unwrap();
    let apple = AppleClient::with_base_url(http.clone(), APPLE_SHOW_ID, "US", &base).unwrap();
    let tokens = Arc::new(
        TokenCache::with_base_url(
            http.clone(),
            SpotifyCredentials {
                client_id: "client-id".to_string(),
                client_secret: "client-secret".to_string(),
            },
            &base,
        )
        .unwrap(),
    );
    let spotify =
        SpotifyClient::with_base_url(http.clone(), tokens, SPOTIFY_SHOW_ID, "US", &base).unwrap();
    let discord = DiscordClient::with_base_url(http, "bot-token", &base).unwrap();

    Orchestrator::new(
        Arc::new(feed),
        Arc::new(apple),
        Arc::new(spotify),
        Arc::new(discord),
        state,
        AnnounceSettings {
            show_name: "Carolina Insider".to_string(),
            channel_id: CHANNEL_ID.to_string(),
            tag_ids: Vec::new(),
        },
    )
}

#[tokio::test]
async fn new_episode_is_announced_once_with_both_links() {
    let server = MockServer::start().await;
    mount_feed(&server).await;
    mount_catalogs(&server, 1).await;
    Mock::given(method("POST"))
        .and(path(format!("/api/v10/channels/{CHANNEL_ID}/threads")))
        .and(header("authorization", "Bot bot-token"))
        .and(body_string_contains("https://a/a1"))
        .and(body_string_contains("https://b/b1"))
        .and(body_string_contains("\"name\":\"Season Finale\""))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({ "id": "thread-1" })))
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let state = Arc::new(FileStateStore::new(dir.path().join("state.json")));
    let orchestrator = orchestrator(&server, state.clone());

    let first = orchestrator.run_cycle().await.unwrap();
    assert_eq!(
        first,
        CycleOutcome::Posted {
            guid: "g1".to_string(),
            title: "Season Finale".to_string()
        }
    );
    assert_eq!(state.load().await.unwrap(), Cursor::new("g1", "b1"));

    let raw: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(state.path()).unwrap()).unwrap();
    assert_eq!(raw, json!({ "lastGuid": "g1", "lastSpotifyEpisodeId": "b1" }));

    let second = orchestrator.run_cycle().await.unwrap();
    assert_eq!(
        second,
        CycleOutcome::AlreadyAnnounced {
            guid: "g1".to_string()
        }
    );
}

#[tokio::test]
async fn discord_failure_keeps_cursor_for_retry() {
    let server = MockServer::start().await;
    mount_feed(&server).await;
    mount_catalogs(&server, 1).await;
    Mock::given(method("POST"))
        .and(path(format!("/api/v10/channels/{CHANNEL_ID}/threads")))
        .respond_with(ResponseTemplate::new(500).set_body_string("upstream down"))
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let state = Arc::new(FileStateStore::new(dir.path().join("state.json")));

    let err = orchestrator(&server, state.clone())
        .run_cycle()
        .await
        .unwrap_err();

    assert_eq!(err.phase, herald_server::Phase::Posting);
    assert_eq!(state.load().await.unwrap(), Cursor::default());
    assert!(!state.path().exists());
}
