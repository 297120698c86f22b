use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

/// Catalog ids arrive as JSON numbers for tracks/albums/artists and as uuid
/// strings for playlists; both are kept as opaque strings.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawId {
    Text(String),
    Number(u64),
}

impl RawId {
    fn into_string(self) -> String {
        match self {
            RawId::Text(text) => text,
            RawId::Number(number) => number.to_string(),
        }
    }
}

macro_rules! catalog_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
        pub struct $name(pub String);

        impl $name {
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_owned())
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                RawId::deserialize(deserializer).map(|raw| Self(raw.into_string()))
            }
        }
    };
}

catalog_id!(
    /// A catalog track identifier. Opaque and case-sensitive.
    TrackId
);
catalog_id!(
    /// A catalog album identifier.
    AlbumId
);
catalog_id!(
    /// A catalog playlist identifier (a uuid on TIDAL).
    PlaylistId
);
catalog_id!(
    /// A catalog artist identifier.
    ArtistId
);

/// How an artist is credited on a track or album.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CreditRole {
    Main,
    Featured,
    #[default]
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtistCredit {
    pub id: ArtistId,
    pub name: String,
    #[serde(default)]
    pub role: CreditRole,
}

/// The album a track belongs to, as embedded in track payloads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlbumRef {
    pub id: AlbumId,
    pub title: String,
    #[serde(default)]
    pub cover: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogTrack {
    pub id: TrackId,
    pub title: String,
    /// Duration in seconds when known.
    pub duration_seconds: Option<u32>,
    pub track_number: Option<u32>,
    pub artists: Vec<ArtistCredit>,
    pub album: AlbumRef,
}

impl CatalogTrack {
    /// Name of the first credited artist, or an empty string.
    pub fn primary_artist(&self) -> &str {
        self.artists.first().map(|a| a.name.as_str()).unwrap_or("")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogAlbum {
    pub id: AlbumId,
    pub title: String,
    pub artists: Vec<ArtistCredit>,
    pub cover: Option<String>,
}

impl CatalogAlbum {
    pub fn primary_artist(&self) -> &str {
        self.artists.first().map(|a| a.name.as_str()).unwrap_or("")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogPlaylist {
    pub id: PlaylistId,
    pub title: String,
    pub image: Option<String>,
    pub track_count: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogArtist {
    pub id: ArtistId,
    pub name: String,
    pub picture: Option<String>,
}

/// Results of a multi-category catalog search, one page per category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct SearchResults {
    pub artists: Vec<CatalogArtist>,
    pub tracks: Vec<CatalogTrack>,
    pub albums: Vec<CatalogAlbum>,
}

/// Resolved stream for a track. The URL is handed to the audio daemon as-is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamInfo {
    pub url: String,
    pub quality: QualityTier,
    pub codec: Option<String>,
}

/// Audio quality tiers understood by the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum QualityTier {
    Low,
    High,
    Lossless,
    HiRes,
    /// A tier reported by the catalog that this crate has no mapping for.
    #[serde(other)]
    Other,
}

impl QualityTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            QualityTier::Low => "LOW",
            QualityTier::High => "HIGH",
            QualityTier::Lossless => "LOSSLESS",
            QualityTier::HiRes => "HI_RES",
            QualityTier::Other => "OTHER",
        }
    }
}

impl fmt::Display for QualityTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownQualityTier(pub String);

impl fmt::Display for UnknownQualityTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "unknown quality tier '{}' (expected LOW, HIGH, LOSSLESS or HI_RES)",
            self.0
        )
    }
}

impl std::error::Error for UnknownQualityTier {}

impl FromStr for QualityTier {
    type Err = UnknownQualityTier;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "LOW" => Ok(QualityTier::Low),
            "HIGH" => Ok(QualityTier::High),
            "LOSSLESS" => Ok(QualityTier::Lossless),
            "HI_RES" => Ok(QualityTier::HiRes),
            _ => Err(UnknownQualityTier(s.to_string())),
        }
    }
}

/// Sample rate and bit depth advertised to the host for a stream.
///
/// Serialized as the host's display labels (`"96 kHz"`, `"24 bit"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "AudioFormatLabels", into = "AudioFormatLabels")]
pub struct AudioFormat {
    pub sample_rate_hz: u32,
    pub bit_depth: u8,
}

impl AudioFormat {
    pub const HI_RES: AudioFormat = AudioFormat {
        sample_rate_hz: 96_000,
        bit_depth: 24,
    };
    pub const CD: AudioFormat = AudioFormat {
        sample_rate_hz: 44_100,
        bit_depth: 16,
    };

    /// Only the hi-res tier is advertised as 96 kHz / 24 bit; everything else
    /// is reported as CD quality.
    pub fn for_tier(tier: QualityTier) -> Self {
        match tier {
            QualityTier::HiRes => Self::HI_RES,
            _ => Self::CD,
        }
    }

    pub fn sample_rate_label(&self) -> String {
        if self.sample_rate_hz % 1000 == 0 {
            format!("{} kHz", self.sample_rate_hz / 1000)
        } else {
            format!("{:.1} kHz", f64::from(self.sample_rate_hz) / 1000.0)
        }
    }

    pub fn bit_depth_label(&self) -> String {
        format!("{} bit", self.bit_depth)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct AudioFormatLabels {
    samplerate: String,
    bitdepth: String,
}

impl From<AudioFormat> for AudioFormatLabels {
    fn from(format: AudioFormat) -> Self {
        Self {
            samplerate: format.sample_rate_label(),
            bitdepth: format.bit_depth_label(),
        }
    }
}

impl TryFrom<AudioFormatLabels> for AudioFormat {
    type Error = String;

    fn try_from(labels: AudioFormatLabels) -> Result<Self, Self::Error> {
        let khz: f64 = labels
            .samplerate
            .trim()
            .trim_end_matches("kHz")
            .trim()
            .parse()
            .map_err(|_| format!("invalid sample rate label '{}'", labels.samplerate))?;
        let bit_depth: u8 = labels
            .bitdepth
            .trim()
            .trim_end_matches("bit")
            .trim()
            .parse()
            .map_err(|_| format!("invalid bit depth label '{}'", labels.bitdepth))?;
        Ok(Self {
            sample_rate_hz: (khz * 1000.0).round() as u32,
            bit_depth,
        })
    }
}

/// Row type as understood by the host's list renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ItemKind {
    TidalCategory,
    Folder,
    Song,
}

/// Either a font-icon class or an image URL; never empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Artwork {
    #[serde(rename = "icon")]
    Icon(String),
    #[serde(rename = "albumart")]
    AlbumArt(String),
}

impl Artwork {
    pub fn as_str(&self) -> &str {
        match self {
            Artwork::Icon(value) | Artwork::AlbumArt(value) => value,
        }
    }
}

/// One row of a navigation list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrowseItem {
    pub service: String,
    #[serde(rename = "type")]
    pub kind: ItemKind,
    pub title: String,
    #[serde(default)]
    pub artist: String,
    #[serde(default)]
    pub album: String,
    #[serde(flatten)]
    pub artwork: Artwork,
    /// Location the host passes back to browse or play this row.
    pub uri: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ListView {
    List,
    Grid,
}

/// Marks a list rendered under a section heading (search results).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ListKind {
    Title,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemList {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<ListKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(rename = "availableListViews")]
    pub available_list_views: Vec<ListView>,
    pub items: Vec<BrowseItem>,
}

impl ItemList {
    pub fn new(available_list_views: Vec<ListView>, items: Vec<BrowseItem>) -> Self {
        Self {
            kind: None,
            title: None,
            available_list_views,
            items,
        }
    }

    /// A list shown under a `title` heading.
    pub fn titled(
        title: impl Into<String>,
        available_list_views: Vec<ListView>,
        items: Vec<BrowseItem>,
    ) -> Self {
        Self {
            kind: Some(ListKind::Title),
            title: Some(title.into()),
            available_list_views,
            items,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrevLink {
    pub uri: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Navigation {
    pub lists: Vec<ItemList>,
    pub prev: PrevLink,
}

/// A browse response in the host's `{ navigation: { lists, prev } }` shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavigationList {
    pub navigation: Navigation,
}

impl NavigationList {
    pub fn single(list: ItemList, prev: impl Into<String>) -> Self {
        Self {
            navigation: Navigation {
                lists: vec![list],
                prev: PrevLink { uri: prev.into() },
            },
        }
    }

    /// Items of the first list; browse responses carry exactly one list.
    pub fn items(&self) -> &[BrowseItem] {
        self.navigation
            .lists
            .first()
            .map(|list| list.items.as_slice())
            .unwrap_or(&[])
    }

    pub fn prev_uri(&self) -> &str {
        &self.navigation.prev.uri
    }
}

/// Everything the host needs to queue and display a track.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayableDescriptor {
    /// Stream URL handed to the audio daemon.
    pub uri: String,
    pub service: String,
    pub name: String,
    pub artist: String,
    pub album: String,
    #[serde(rename = "type")]
    pub kind: ItemKind,
    pub duration: Option<u32>,
    #[serde(rename = "tracknumber")]
    pub track_number: Option<u32>,
    pub albumart: String,
    #[serde(flatten)]
    pub format: AudioFormat,
    #[serde(rename = "trackType")]
    pub track_type: Option<String>,
}

/// Registration payload that makes this catalog appear in the host's sources.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrowseSource {
    pub name: String,
    pub uri: String,
    pub plugin_type: String,
    pub plugin_name: String,
    pub albumart: String,
}

impl BrowseSource {
    pub fn tidal() -> Self {
        Self {
            name: "Tidal".into(),
            uri: crate::location::Location::Root.to_string(),
            plugin_type: "music_service".into(),
            plugin_name: crate::SERVICE_NAME.into(),
            albumart: crate::SOURCE_ICON.into(),
        }
    }
}

/// Paging request represented as offset/limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    pub offset: u32,
    pub limit: u32,
}

impl PageRequest {
    pub fn first_page(limit: u32) -> Self {
        Self { offset: 0, limit }
    }
}

/// A single page of items.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: Option<u32>,
}

impl<T> Page<T> {
    pub fn single_page(items: Vec<T>) -> Self {
        Self { items, total: None }
    }
}
