//! Wire shapes of the TIDAL v1 REST API.

use serde::Deserialize;
use tidalink_core::models::{AlbumId, ArtistId, CreditRole, PlaylistId, QualityTier, TrackId};

/// Numeric or string identifier as sent by the API.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum WireId {
    Number(u64),
    Text(String),
}

impl WireId {
    pub fn into_string(self) -> String {
        match self {
            WireId::Number(n) => n.to_string(),
            WireId::Text(s) => s,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub user_id: WireId,
    pub session_id: String,
    #[serde(default)]
    pub country_code: Option<String>,
}

/// `{ items: [...], totalNumberOfItems }` envelope used by every listing.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemsResponse<T> {
    pub items: Vec<T>,
    #[serde(default)]
    pub total_number_of_items: Option<u32>,
}

impl<T> Default for ItemsResponse<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            total_number_of_items: None,
        }
    }
}

/// Favourites wrap the entity: `{ created, item: {...} }`.
#[derive(Debug, Deserialize)]
pub struct Favourite<T> {
    pub item: T,
}

#[derive(Debug, Deserialize)]
pub struct Artist {
    pub id: ArtistId,
    pub name: String,
    #[serde(rename = "type", default)]
    pub role: CreditRole,
    #[serde(default)]
    pub picture: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AlbumRef {
    pub id: AlbumId,
    pub title: String,
    #[serde(default)]
    pub cover: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Track {
    pub id: TrackId,
    pub title: String,
    #[serde(default)]
    pub duration: Option<u32>,
    #[serde(default)]
    pub track_number: Option<u32>,
    #[serde(default)]
    pub artist: Option<Artist>,
    #[serde(default)]
    pub artists: Vec<Artist>,
    pub album: AlbumRef,
}

#[derive(Debug, Deserialize)]
pub struct Album {
    pub id: AlbumId,
    pub title: String,
    #[serde(default)]
    pub artist: Option<Artist>,
    #[serde(default)]
    pub artists: Vec<Artist>,
    #[serde(default)]
    pub cover: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Playlist {
    pub uuid: PlaylistId,
    pub title: String,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub number_of_tracks: Option<u32>,
}

#[derive(Debug, Default, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub artists: ItemsResponse<Artist>,
    #[serde(default)]
    pub albums: ItemsResponse<Album>,
    #[serde(default)]
    pub tracks: ItemsResponse<Track>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StreamUrlResponse {
    pub url: String,
    pub sound_quality: QualityTier,
    #[serde(default)]
    pub codec: Option<String>,
}
