use crate::models::{
    AlbumId, ArtistId, CatalogAlbum, CatalogPlaylist, CatalogTrack, Page, PageRequest, PlaylistId,
    QualityTier, SearchResults, StreamInfo, TrackId,
};
use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Classified catalog failures surfaced to the adapter and, from there, to the host.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("authentication error: {message}")]
    Authentication { message: String },
    #[error("entity not found: {entity}")]
    NotFound { entity: String },
    #[error("network error: {message}")]
    Network { message: String },
    #[error("catalog request timed out after {after:?}: {operation}")]
    Timeout { operation: String, after: Duration },
    #[error("unexpected catalog response: {message}")]
    Decode { message: String },
    #[error("{message}")]
    Other { message: String },
}

impl CatalogError {
    /// Whether retrying the same call later could succeed.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            CatalogError::Network { .. } | CatalogError::Timeout { .. }
        )
    }
}

pub type CatalogResult<T> = Result<T, CatalogError>;

/// Builds artwork URLs from the opaque image references the catalog returns.
pub trait ArtworkResolver: Send + Sync {
    fn art_url(&self, image: &str, width: u32, height: u32) -> String;
}

/// Authenticated access to the streaming catalog.
///
/// Implementations own their session; the adapter only ever asks for the
/// first page of any listing.
#[async_trait]
pub trait CatalogClient: ArtworkResolver {
    async fn my_playlists(&self, paging: PageRequest) -> CatalogResult<Page<CatalogPlaylist>>;

    async fn my_albums(&self, paging: PageRequest) -> CatalogResult<Page<CatalogAlbum>>;

    async fn my_tracks(&self, paging: PageRequest) -> CatalogResult<Page<CatalogTrack>>;

    async fn playlist_tracks(
        &self,
        playlist_id: &PlaylistId,
        paging: PageRequest,
    ) -> CatalogResult<Page<CatalogTrack>>;

    async fn album_tracks(
        &self,
        album_id: &AlbumId,
        paging: PageRequest,
    ) -> CatalogResult<Page<CatalogTrack>>;

    async fn artist_albums(
        &self,
        artist_id: &ArtistId,
        paging: PageRequest,
    ) -> CatalogResult<Page<CatalogAlbum>>;

    /// Search artists, tracks and albums at once, `limit` results per category.
    async fn search(&self, query: &str, limit: u32) -> CatalogResult<SearchResults>;

    async fn stream_url(&self, track_id: &TrackId) -> CatalogResult<StreamInfo>;

    async fn track_info(&self, track_id: &TrackId) -> CatalogResult<CatalogTrack>;
}

/// The four account fields the host persists for this catalog.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
    pub token: String,
    pub quality: String,
}

impl Credentials {
    pub fn new(
        username: impl Into<String>,
        password: impl Into<String>,
        token: impl Into<String>,
        quality: impl Into<String>,
    ) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
            token: token.into(),
            quality: quality.into(),
        }
    }

    /// All four fields must be non-empty before a session is attempted.
    pub fn is_complete(&self) -> bool {
        [&self.username, &self.password, &self.token, &self.quality]
            .iter()
            .all(|field| !field.trim().is_empty())
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .field("token", &"[REDACTED]")
            .field("quality", &self.quality)
            .finish()
    }
}

/// Creates one catalog client per session.
pub trait CatalogFactory: Send + Sync {
    fn connect(
        &self,
        credentials: &Credentials,
        quality: QualityTier,
    ) -> CatalogResult<Arc<dyn CatalogClient>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn credentials_require_every_field() {
        let full = Credentials::new("user", "pass", "token", "LOSSLESS");
        assert!(full.is_complete());

        let mut missing = full.clone();
        missing.token = String::new();
        assert!(!missing.is_complete());

        let mut blank = full;
        blank.username = "   ".into();
        assert!(!blank.is_complete());
    }

    #[test]
    fn debug_output_hides_secrets() {
        let creds = Credentials::new("user", "hunter2", "tok-123", "HI_RES");
        let rendered = format!("{creds:?}");
        assert!(!rendered.contains("hunter2"));
        assert!(!rendered.contains("tok-123"));
        assert!(rendered.contains("user"));
    }

    #[test]
    fn only_network_and_timeout_are_transient() {
        assert!(CatalogError::Network {
            message: "reset".into()
        }
        .is_transient());
        assert!(CatalogError::Timeout {
            operation: "search".into(),
            after: Duration::from_secs(15)
        }
        .is_transient());
        assert!(!CatalogError::NotFound {
            entity: "track 1".into()
        }
        .is_transient());
    }
}
