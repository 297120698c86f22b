use std::time::Duration;
use tidal_provider::{TidalClient, TidalConfig};
use tidalink_core::catalog::{CatalogClient, CatalogError, Credentials};
use tidalink_core::models::{
    AlbumId, ArtistId, CreditRole, PageRequest, PlaylistId, QualityTier, TrackId,
};
use wiremock::matchers::{body_string_contains, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn credentials() -> Credentials {
    Credentials::new("listener", "hunter2", "wc8j_yBJd20zOmx0", "LOSSLESS")
}

fn client(server: &MockServer, quality: QualityTier) -> TidalClient {
    let config = TidalConfig {
        base_url: format!("{}/v1/", server.uri()),
        country_code: "US".into(),
        request_timeout: Duration::from_millis(500),
    };
    TidalClient::new(config, credentials(), quality).unwrap()
}

async fn mount_login(server: &MockServer, expected_calls: u64) {
    Mock::given(method("POST"))
        .and(path("/v1/login/username"))
        .and(header("X-Tidal-Token", "wc8j_yBJd20zOmx0"))
        .and(body_string_contains("username=listener"))
        .and(body_string_contains("password=hunter2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "userId": 4242,
            "sessionId": "sess-1",
            "countryCode": "GB"
        })))
        .expect(expected_calls)
        .mount(server)
        .await;
}

fn track_json(id: u64, title: &str) -> serde_json::Value {
    serde_json::json!({
        "id": id,
        "title": title,
        "duration": 200,
        "trackNumber": 1,
        "artists": [{"id": 1, "name": "Nils Frahm", "type": "MAIN"}],
        "album": {"id": 77, "title": "Spaces", "cover": "aa-bb"}
    })
}

#[tokio::test]
async fn playlists_use_login_session_and_country() {
    let server = MockServer::start().await;
    mount_login(&server, 1).await;
    Mock::given(method("GET"))
        .and(path("/v1/users/4242/playlists"))
        .and(query_param("sessionId", "sess-1"))
        .and(query_param("countryCode", "GB"))
        .and(query_param("limit", "50"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "items": [
                {"uuid": "p-1", "title": "Focus", "image": "11-22", "numberOfTracks": 3},
                {"uuid": "p-2", "title": "Empty"}
            ],
            "totalNumberOfItems": 2
        })))
        .mount(&server)
        .await;

    let client = client(&server, QualityTier::Lossless);
    let page = client.my_playlists(PageRequest::first_page(50)).await.unwrap();
    assert_eq!(page.items.len(), 2);
    assert_eq!(page.items[0].id, PlaylistId::new("p-1"));
    assert_eq!(page.items[1].image, None);
    assert_eq!(page.total, Some(2));

    // The second call reuses the cached session.
    client.my_playlists(PageRequest::first_page(50)).await.unwrap();
}

#[tokio::test]
async fn favourites_are_unwrapped() {
    let server = MockServer::start().await;
    mount_login(&server, 1).await;
    Mock::given(method("GET"))
        .and(path("/v1/users/4242/favorites/tracks"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "items": [{"created": "2020-01-01T00:00:00.000+0000", "item": track_json(5, "Says")}]
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/users/4242/favorites/albums"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "items": [{"item": {"id": 77, "title": "Spaces", "cover": "aa-bb",
                                "artist": {"id": 1, "name": "Nils Frahm"}}}]
        })))
        .mount(&server)
        .await;

    let client = client(&server, QualityTier::Lossless);
    let tracks = client.my_tracks(PageRequest::first_page(50)).await.unwrap();
    assert_eq!(tracks.items[0].id, TrackId::new("5"));
    assert_eq!(tracks.items[0].artists[0].role, CreditRole::Main);

    let albums = client.my_albums(PageRequest::first_page(50)).await.unwrap();
    assert_eq!(albums.items[0].id, AlbumId::new("77"));
    assert_eq!(albums.items[0].primary_artist(), "Nils Frahm");
}

#[tokio::test]
async fn album_and_artist_listings() {
    let server = MockServer::start().await;
    mount_login(&server, 1).await;
    Mock::given(method("GET"))
        .and(path("/v1/albums/77/tracks"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "items": [track_json(1, "An Aching"), track_json(2, "Says")]
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/artists/1/albums"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "items": [{"id": 77, "title": "Spaces"}]
        })))
        .mount(&server)
        .await;

    let client = client(&server, QualityTier::Lossless);
    let tracks = client
        .album_tracks(&AlbumId::new("77"), PageRequest::first_page(50))
        .await
        .unwrap();
    assert_eq!(tracks.items.len(), 2);
    assert_eq!(tracks.items[1].title, "Says");

    let albums = client
        .artist_albums(&ArtistId::new("1"), PageRequest::first_page(50))
        .await
        .unwrap();
    assert_eq!(albums.items[0].title, "Spaces");
    assert!(albums.items[0].artists.is_empty());
}

#[tokio::test]
async fn search_requests_all_three_categories() {
    let server = MockServer::start().await;
    mount_login(&server, 1).await;
    Mock::given(method("GET"))
        .and(path("/v1/search"))
        .and(query_param("query", "nils frahm"))
        .and(query_param("types", "ARTISTS,ALBUMS,TRACKS"))
        .and(query_param("limit", "10"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "artists": {"items": [{"id": 1, "name": "Nils Frahm", "picture": "cc-dd"}]},
            "albums": {"items": []},
            "tracks": {"items": [track_json(3, "Says")]}
        })))
        .mount(&server)
        .await;

    let client = client(&server, QualityTier::Lossless);
    let results = client.search("nils frahm", 10).await.unwrap();
    assert_eq!(results.artists.len(), 1);
    assert_eq!(results.artists[0].picture.as_deref(), Some("cc-dd"));
    assert!(results.albums.is_empty());
    assert_eq!(results.tracks[0].id, TrackId::new("3"));
}

#[tokio::test]
async fn stream_url_requests_configured_quality() {
    let server = MockServer::start().await;
    mount_login(&server, 1).await;
    Mock::given(method("GET"))
        .and(path("/v1/tracks/58990516/streamUrl"))
        .and(query_param("soundQuality", "HI_RES"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "url": "https://sp-pr-fa.audio.tidal.com/a.flac?token=x",
            "trackId": 58990516,
            "soundQuality": "HI_RES",
            "codec": "FLAC"
        })))
        .mount(&server)
        .await;

    let client = client(&server, QualityTier::HiRes);
    let stream = client.stream_url(&TrackId::new("58990516")).await.unwrap();
    assert_eq!(stream.quality, QualityTier::HiRes);
    assert_eq!(stream.codec.as_deref(), Some("FLAC"));
    assert!(stream.url.starts_with("https://sp-pr-fa.audio.tidal.com/"));
}

#[tokio::test]
async fn rejected_login_is_an_authentication_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/login/username"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let client = client(&server, QualityTier::Lossless);
    let err = client
        .my_playlists(PageRequest::first_page(50))
        .await
        .unwrap_err();
    assert!(matches!(err, CatalogError::Authentication { .. }));
}

#[tokio::test]
async fn expired_session_triggers_a_fresh_login() {
    let server = MockServer::start().await;
    mount_login(&server, 2).await;
    Mock::given(method("GET"))
        .and(path("/v1/tracks/9"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let client = client(&server, QualityTier::Lossless);
    for _ in 0..2 {
        let err = client.track_info(&TrackId::new("9")).await.unwrap_err();
        assert!(matches!(err, CatalogError::Authentication { .. }));
    }
}

#[tokio::test]
async fn missing_entity_is_not_found() {
    let server = MockServer::start().await;
    mount_login(&server, 1).await;
    Mock::given(method("GET"))
        .and(path("/v1/playlists/nope/tracks"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let client = client(&server, QualityTier::Lossless);
    let err = client
        .playlist_tracks(&PlaylistId::new("nope"), PageRequest::first_page(50))
        .await
        .unwrap_err();
    assert!(matches!(err, CatalogError::NotFound { .. }));
}

#[tokio::test]
async fn slow_responses_time_out() {
    let server = MockServer::start().await;
    mount_login(&server, 1).await;
    Mock::given(method("GET"))
        .and(path("/v1/tracks/1"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(track_json(1, "Late"))
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&server)
        .await;

    let client = client(&server, QualityTier::Lossless);
    let err = client.track_info(&TrackId::new("1")).await.unwrap_err();
    match err {
        CatalogError::Timeout { after, .. } => assert_eq!(after, Duration::from_millis(500)),
        other => panic!("expected timeout, got {other:?}"),
    }
}

#[tokio::test]
async fn malformed_body_is_a_decode_error() {
    let server = MockServer::start().await;
    mount_login(&server, 1).await;
    Mock::given(method("GET"))
        .and(path("/v1/tracks/2"))
        .respond_with(ResponseTemplate::new(200).set_body_string("{\"nope\": true}"))
        .mount(&server)
        .await;

    let client = client(&server, QualityTier::Lossless);
    let err = client.track_info(&TrackId::new("2")).await.unwrap_err();
    assert!(matches!(err, CatalogError::Decode { .. }));
}
