//! TIDAL v1 REST catalog client.

mod mapping;
pub mod models;

use async_trait::async_trait;
use mapping::{map_album, map_playlist, map_search, map_track};
use models::{Favourite, ItemsResponse, LoginResponse, StreamUrlResponse};
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;
use tidalink_core::catalog::{
    ArtworkResolver, CatalogClient, CatalogError, CatalogFactory, CatalogResult, Credentials,
};
use tidalink_core::config::CatalogConfig;
use tidalink_core::models::{
    AlbumId, ArtistId, CatalogAlbum, CatalogPlaylist, CatalogTrack, Page, PageRequest,
    PlaylistId, QualityTier, SearchResults, StreamInfo, TrackId,
};
use tidalink_core::redact::redact_secrets;
use tokio::sync::RwLock;
use tracing::{debug, warn};
use url::Url;

/// Image CDN that artwork references resolve against.
pub const RESOURCES_URL: &str = "https://resources.tidal.com/images";

const TOKEN_HEADER: &str = "X-Tidal-Token";
const SEARCH_TYPES: &str = "ARTISTS,ALBUMS,TRACKS";

#[derive(Debug, Clone)]
pub struct TidalConfig {
    pub base_url: String,
    pub country_code: String,
    pub request_timeout: Duration,
}

impl From<&CatalogConfig> for TidalConfig {
    fn from(config: &CatalogConfig) -> Self {
        Self {
            base_url: config.base_url.clone(),
            country_code: config.country_code.clone(),
            request_timeout: config.request_timeout(),
        }
    }
}

#[derive(Debug, Clone)]
struct Session {
    user_id: String,
    session_id: String,
    country_code: String,
}

pub struct TidalClient {
    http: Client,
    base_url: Url,
    country_code: String,
    timeout: Duration,
    credentials: Credentials,
    quality: QualityTier,
    session: RwLock<Option<Session>>,
}

impl TidalClient {
    /// Build a client; no request is made until the first catalog call.
    pub fn new(
        config: TidalConfig,
        credentials: Credentials,
        quality: QualityTier,
    ) -> CatalogResult<Self> {
        let mut base = config.base_url.clone();
        if !base.ends_with('/') {
            base.push('/');
        }
        let base_url = Url::parse(&base).map_err(|e| CatalogError::Other {
            message: format!("invalid base_url: {e}"),
        })?;
        let http = Client::builder()
            .connect_timeout(config.request_timeout)
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| CatalogError::Other {
                message: e.to_string(),
            })?;
        Ok(Self {
            http,
            base_url,
            country_code: config.country_code,
            timeout: config.request_timeout,
            credentials,
            quality,
            session: RwLock::new(None),
        })
    }

    fn endpoint(&self, path: &str) -> CatalogResult<Url> {
        self.base_url.join(path).map_err(|e| CatalogError::Other {
            message: format!("invalid endpoint {path}: {e}"),
        })
    }

    async fn session(&self) -> CatalogResult<Session> {
        if let Some(session) = self.session.read().await.clone() {
            return Ok(session);
        }
        let mut guard = self.session.write().await;
        if let Some(session) = guard.clone() {
            return Ok(session);
        }
        let session = self.login().await?;
        *guard = Some(session.clone());
        Ok(session)
    }

    async fn login(&self) -> CatalogResult<Session> {
        let url = self.endpoint("login/username")?;
        debug!(username = %self.credentials.username, "logging in to tidal");
        let response = self
            .http
            .post(url)
            .header(TOKEN_HEADER, &self.credentials.token)
            .form(&[
                ("username", self.credentials.username.as_str()),
                ("password", self.credentials.password.as_str()),
            ])
            .send()
            .await
            .map_err(|e| self.transport_error("login", e))?;
        self.check_status("login", response.status())?;
        let body: LoginResponse = self.decode("login", response).await?;
        debug!(user_id = %body.user_id.clone().into_string(), "tidal login succeeded");
        Ok(Session {
            user_id: body.user_id.into_string(),
            session_id: body.session_id,
            country_code: body
                .country_code
                .unwrap_or_else(|| self.country_code.clone()),
        })
    }

    async fn get<T: DeserializeOwned>(
        &self,
        operation: &str,
        path: &str,
        query: &[(&str, String)],
    ) -> CatalogResult<T> {
        let session = self.session().await?;
        let url = self.endpoint(path)?;
        let response = self
            .http
            .get(url)
            .query(&[
                ("sessionId", session.session_id.as_str()),
                ("countryCode", session.country_code.as_str()),
            ])
            .query(query)
            .send()
            .await
            .map_err(|e| self.transport_error(operation, e))?;

        let status = response.status();
        debug!(
            operation,
            url = %redact_secrets(response.url().as_str()),
            status = status.as_u16(),
            "tidal response"
        );
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            warn!(operation, "tidal session rejected; logging in again on next call");
            *self.session.write().await = None;
        }
        self.check_status(operation, status)?;
        self.decode(operation, response).await
    }

    async fn page<W, T>(
        &self,
        operation: &str,
        path: &str,
        paging: PageRequest,
        map: impl Fn(W) -> T,
    ) -> CatalogResult<Page<T>>
    where
        W: DeserializeOwned,
    {
        let body: ItemsResponse<W> = self
            .get(operation, path, &paging_query(paging))
            .await?;
        Ok(Page {
            items: body.items.into_iter().map(map).collect(),
            total: body.total_number_of_items,
        })
    }

    async fn user_path(&self, suffix: &str) -> CatalogResult<String> {
        let session = self.session().await?;
        Ok(format!("users/{}/{suffix}", session.user_id))
    }

    fn check_status(&self, operation: &str, status: StatusCode) -> CatalogResult<()> {
        if status.is_success() {
            return Ok(());
        }
        Err(match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => CatalogError::Authentication {
                message: format!("{operation} rejected with {status}"),
            },
            StatusCode::NOT_FOUND => CatalogError::NotFound {
                entity: operation.to_string(),
            },
            _ => CatalogError::Network {
                message: format!("{operation} failed with {status}"),
            },
        })
    }

    fn transport_error(&self, operation: &str, err: reqwest::Error) -> CatalogError {
        if err.is_timeout() {
            CatalogError::Timeout {
                operation: operation.to_string(),
                after: self.timeout,
            }
        } else {
            CatalogError::Network {
                message: redact_secrets(&err.to_string()).into_owned(),
            }
        }
    }

    async fn decode<T: DeserializeOwned>(
        &self,
        operation: &str,
        response: reqwest::Response,
    ) -> CatalogResult<T> {
        let body = response
            .text()
            .await
            .map_err(|e| self.transport_error(operation, e))?;
        serde_json::from_str(&body).map_err(|e| CatalogError::Decode {
            message: format!("{operation}: {e}"),
        })
    }
}

fn paging_query(paging: PageRequest) -> Vec<(&'static str, String)> {
    vec![
        ("limit", paging.limit.to_string()),
        ("offset", paging.offset.to_string()),
    ]
}

impl ArtworkResolver for TidalClient {
    fn art_url(&self, image: &str, width: u32, height: u32) -> String {
        art_url(image, width, height)
    }
}

/// Image references are UUIDs whose dashes become path separators on the CDN.
pub fn art_url(image: &str, width: u32, height: u32) -> String {
    format!(
        "{RESOURCES_URL}/{}/{width}x{height}.jpg",
        image.replace('-', "/")
    )
}

#[async_trait]
impl CatalogClient for TidalClient {
    async fn my_playlists(&self, paging: PageRequest) -> CatalogResult<Page<CatalogPlaylist>> {
        let path = self.user_path("playlists").await?;
        self.page("my playlists", &path, paging, map_playlist).await
    }

    async fn my_albums(&self, paging: PageRequest) -> CatalogResult<Page<CatalogAlbum>> {
        let path = self.user_path("favorites/albums").await?;
        self.page("favourite albums", &path, paging, |fav: Favourite<models::Album>| {
            map_album(fav.item)
        })
        .await
    }

    async fn my_tracks(&self, paging: PageRequest) -> CatalogResult<Page<CatalogTrack>> {
        let path = self.user_path("favorites/tracks").await?;
        self.page("favourite tracks", &path, paging, |fav: Favourite<models::Track>| {
            map_track(fav.item)
        })
        .await
    }

    async fn playlist_tracks(
        &self,
        playlist_id: &PlaylistId,
        paging: PageRequest,
    ) -> CatalogResult<Page<CatalogTrack>> {
        let path = format!("playlists/{playlist_id}/tracks");
        self.page(&format!("playlist {playlist_id}"), &path, paging, map_track)
            .await
    }

    async fn album_tracks(
        &self,
        album_id: &AlbumId,
        paging: PageRequest,
    ) -> CatalogResult<Page<CatalogTrack>> {
        let path = format!("albums/{album_id}/tracks");
        self.page(&format!("album {album_id}"), &path, paging, map_track)
            .await
    }

    async fn artist_albums(
        &self,
        artist_id: &ArtistId,
        paging: PageRequest,
    ) -> CatalogResult<Page<CatalogAlbum>> {
        let path = format!("artists/{artist_id}/albums");
        self.page(&format!("artist {artist_id}"), &path, paging, map_album)
            .await
    }

    async fn search(&self, query: &str, limit: u32) -> CatalogResult<SearchResults> {
        let body: models::SearchResponse = self
            .get(
                "search",
                "search",
                &[
                    ("query", query.to_string()),
                    ("types", SEARCH_TYPES.to_string()),
                    ("limit", limit.to_string()),
                ],
            )
            .await?;
        Ok(map_search(body))
    }

    async fn stream_url(&self, track_id: &TrackId) -> CatalogResult<StreamInfo> {
        let body: StreamUrlResponse = self
            .get(
                &format!("stream url for track {track_id}"),
                &format!("tracks/{track_id}/streamUrl"),
                &[("soundQuality", self.quality.as_str().to_string())],
            )
            .await?;
        debug!(track = %track_id, quality = %body.sound_quality, "resolved stream");
        Ok(StreamInfo {
            url: body.url,
            quality: body.sound_quality,
            codec: body.codec,
        })
    }

    async fn track_info(&self, track_id: &TrackId) -> CatalogResult<CatalogTrack> {
        let body: models::Track = self
            .get(
                &format!("track {track_id}"),
                &format!("tracks/{track_id}"),
                &[],
            )
            .await?;
        Ok(map_track(body))
    }
}

/// Builds one [`TidalClient`] per configured account.
#[derive(Debug, Clone)]
pub struct TidalClientFactory {
    config: TidalConfig,
}

impl TidalClientFactory {
    pub fn new(config: TidalConfig) -> Self {
        Self { config }
    }
}

impl CatalogFactory for TidalClientFactory {
    fn connect(
        &self,
        credentials: &Credentials,
        quality: QualityTier,
    ) -> CatalogResult<Arc<dyn CatalogClient>> {
        let client = TidalClient::new(self.config.clone(), credentials.clone(), quality)?;
        Ok(Arc::new(client))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn art_url_splits_image_reference() {
        assert_eq!(
            art_url("9a56f482-e9cf-46c3-bb21-82710e7854d4", 320, 320),
            "https://resources.tidal.com/images/9a56f482/e9cf/46c3/bb21/82710e7854d4/320x320.jpg"
        );
    }

    #[test]
    fn base_url_without_trailing_slash_still_joins() {
        let config = TidalConfig {
            base_url: "https://api.tidalhifi.com/v1".into(),
            country_code: "US".into(),
            request_timeout: Duration::from_secs(15),
        };
        let client = TidalClient::new(config, Credentials::default(), QualityTier::Lossless).unwrap();
        assert_eq!(
            client.endpoint("tracks/1").unwrap().as_str(),
            "https://api.tidalhifi.com/v1/tracks/1"
        );
    }

    #[test]
    fn error_statuses_are_classified() {
        let config = TidalConfig {
            base_url: "https://api.tidalhifi.com/v1/".into(),
            country_code: "US".into(),
            request_timeout: Duration::from_secs(15),
        };
        let client = TidalClient::new(config, Credentials::default(), QualityTier::Lossless).unwrap();
        assert!(matches!(
            client.check_status("x", StatusCode::UNAUTHORIZED),
            Err(CatalogError::Authentication { .. })
        ));
        assert!(matches!(
            client.check_status("x", StatusCode::NOT_FOUND),
            Err(CatalogError::NotFound { .. })
        ));
        assert!(matches!(
            client.check_status("x", StatusCode::BAD_GATEWAY),
            Err(CatalogError::Network { .. })
        ));
        assert!(client.check_status("x", StatusCode::OK).is_ok());
    }
}
