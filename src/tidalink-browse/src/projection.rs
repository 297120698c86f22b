//! Pure mappings from catalog entities to the host's display shapes.

use tidalink_core::catalog::ArtworkResolver;
use tidalink_core::location::Location;
use tidalink_core::models::{
    ArtistCredit, Artwork, AudioFormat, BrowseItem, CatalogAlbum, CatalogArtist, CatalogPlaylist,
    CatalogTrack, CreditRole, ItemKind, PlayableDescriptor, StreamInfo,
};
use tidalink_core::{DEFAULT_ICON, SERVICE_NAME};

pub const CATEGORY_ICON: &str = "fa fa-folder-open-o";

pub const PLAYLIST_ART: (u32, u32) = (320, 214);
pub const ALBUM_ART: (u32, u32) = (320, 320);
pub const TRACK_ART: (u32, u32) = (80, 80);
pub const ARTIST_ART: (u32, u32) = (160, 160);
pub const COVER_ART: (u32, u32) = (1280, 1280);

/// The three fixed entries of the root menu.
pub fn root_categories() -> Vec<BrowseItem> {
    [
        ("My Playlists", Location::MyPlaylists),
        ("My Albums", Location::MyAlbums),
        ("My Tracks", Location::MyTracks),
    ]
    .into_iter()
    .map(|(title, location)| category_item(title, &location))
    .collect()
}

pub fn category_item(title: &str, location: &Location) -> BrowseItem {
    BrowseItem {
        service: SERVICE_NAME.into(),
        kind: ItemKind::TidalCategory,
        title: title.into(),
        artist: String::new(),
        album: String::new(),
        artwork: Artwork::Icon(CATEGORY_ICON.into()),
        uri: location.to_string(),
    }
}

pub fn playlist_item<A: ArtworkResolver + ?Sized>(
    art: &A,
    playlist: &CatalogPlaylist,
) -> BrowseItem {
    BrowseItem {
        service: SERVICE_NAME.into(),
        kind: ItemKind::Folder,
        title: playlist.title.clone(),
        artist: String::new(),
        album: String::new(),
        artwork: artwork(art, playlist.image.as_deref(), PLAYLIST_ART),
        uri: Location::Playlist(playlist.id.clone()).to_string(),
    }
}

/// Albums list their first credited artist and repeat the title as album text.
pub fn album_item<A: ArtworkResolver + ?Sized>(art: &A, album: &CatalogAlbum) -> BrowseItem {
    BrowseItem {
        service: SERVICE_NAME.into(),
        kind: ItemKind::Folder,
        title: album.title.clone(),
        artist: album.primary_artist().to_string(),
        album: album.title.clone(),
        artwork: artwork(art, album.cover.as_deref(), ALBUM_ART),
        uri: Location::Album(album.id.clone()).to_string(),
    }
}

pub fn track_item<A: ArtworkResolver + ?Sized>(art: &A, track: &CatalogTrack) -> BrowseItem {
    BrowseItem {
        service: SERVICE_NAME.into(),
        kind: ItemKind::Song,
        title: track.title.clone(),
        artist: track.primary_artist().to_string(),
        album: track.album.title.clone(),
        artwork: artwork(art, track.album.cover.as_deref(), TRACK_ART),
        uri: Location::Track(track.id.clone()).to_string(),
    }
}

pub fn artist_item<A: ArtworkResolver + ?Sized>(art: &A, artist: &CatalogArtist) -> BrowseItem {
    BrowseItem {
        service: SERVICE_NAME.into(),
        kind: ItemKind::Folder,
        title: artist.name.clone(),
        artist: String::new(),
        album: String::new(),
        artwork: artwork(art, artist.picture.as_deref(), ARTIST_ART),
        uri: Location::Artist(artist.id.clone()).to_string(),
    }
}

/// Merge stream resolution and track metadata into one playable descriptor.
pub fn playable_descriptor<A: ArtworkResolver + ?Sized>(
    art: &A,
    track: &CatalogTrack,
    stream: &StreamInfo,
) -> PlayableDescriptor {
    PlayableDescriptor {
        uri: stream.url.clone(),
        service: SERVICE_NAME.into(),
        name: track.title.clone(),
        artist: format_artists(&track.artists),
        album: track.album.title.clone(),
        kind: ItemKind::Song,
        duration: track.duration_seconds,
        track_number: track.track_number,
        albumart: artwork(art, track.album.cover.as_deref(), COVER_ART)
            .as_str()
            .to_string(),
        format: AudioFormat::for_tier(stream.quality),
        track_type: stream.codec.clone(),
    }
}

/// Render credits as `A, B, and C ft. X`.
///
/// Main artists come first; credits without a role count as main when no
/// artist is explicitly marked main.
pub fn format_artists(credits: &[ArtistCredit]) -> String {
    let mut main: Vec<&str> = names_with_role(credits, CreditRole::Main);
    if main.is_empty() {
        main = credits
            .iter()
            .filter(|credit| credit.role != CreditRole::Featured)
            .map(|credit| credit.name.as_str())
            .collect();
    }
    let featured = names_with_role(credits, CreditRole::Featured);

    let mut rendered = join_names(&main);
    if !featured.is_empty() {
        if !rendered.is_empty() {
            rendered.push(' ');
        }
        rendered.push_str("ft. ");
        rendered.push_str(&join_names(&featured));
    }
    rendered
}

fn names_with_role(credits: &[ArtistCredit], role: CreditRole) -> Vec<&str> {
    credits
        .iter()
        .filter(|credit| credit.role == role)
        .map(|credit| credit.name.as_str())
        .collect()
}

fn join_names(names: &[&str]) -> String {
    match names {
        [] => String::new(),
        [only] => (*only).to_string(),
        [init @ .., last] => format!("{}, and {last}", init.join(", ")),
    }
}

/// Catalog artwork when the entity has an image reference, else the default icon.
fn artwork<A: ArtworkResolver + ?Sized>(
    art: &A,
    image: Option<&str>,
    (width, height): (u32, u32),
) -> Artwork {
    match image.filter(|image| !image.is_empty()) {
        Some(image) => Artwork::AlbumArt(art.art_url(image, width, height)),
        None => Artwork::AlbumArt(DEFAULT_ICON.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tidalink_core::models::{AlbumId, AlbumRef, ArtistId, PlaylistId, QualityTier, TrackId};

    struct SizedArt;

    impl ArtworkResolver for SizedArt {
        fn art_url(&self, image: &str, width: u32, height: u32) -> String {
            format!("art://{image}/{width}x{height}")
        }
    }

    fn credit(name: &str, role: CreditRole) -> ArtistCredit {
        ArtistCredit {
            id: ArtistId::new(name),
            name: name.into(),
            role,
        }
    }

    fn track(cover: Option<&str>) -> CatalogTrack {
        CatalogTrack {
            id: TrackId::new("123"),
            title: "Says".into(),
            duration_seconds: Some(498),
            track_number: Some(4),
            artists: vec![credit("Nils Frahm", CreditRole::Main)],
            album: AlbumRef {
                id: AlbumId::new("77"),
                title: "Spaces".into(),
                cover: cover.map(str::to_string),
            },
        }
    }

    #[test]
    fn root_has_three_categories_in_order() {
        let items = root_categories();
        let titles: Vec<_> = items.iter().map(|i| i.title.as_str()).collect();
        assert_eq!(titles, ["My Playlists", "My Albums", "My Tracks"]);
        assert!(items.iter().all(|i| i.kind == ItemKind::TidalCategory));
        assert_eq!(items[0].uri, "tidal/my_playlists");
        assert_eq!(items[2].artwork, Artwork::Icon(CATEGORY_ICON.into()));
    }

    #[test]
    fn each_kind_uses_its_artwork_size() {
        let playlist = CatalogPlaylist {
            id: PlaylistId::new("p-1"),
            title: "Focus".into(),
            image: Some("img".into()),
            track_count: None,
        };
        let album = CatalogAlbum {
            id: AlbumId::new("77"),
            title: "Spaces".into(),
            artists: vec![credit("Nils Frahm", CreditRole::Main)],
            cover: Some("cov".into()),
        };
        let artist = CatalogArtist {
            id: ArtistId::new("9"),
            name: "Nils Frahm".into(),
            picture: Some("pic".into()),
        };

        assert_eq!(playlist_item(&SizedArt, &playlist).artwork.as_str(), "art://img/320x214");
        assert_eq!(album_item(&SizedArt, &album).artwork.as_str(), "art://cov/320x320");
        assert_eq!(track_item(&SizedArt, &track(Some("cov"))).artwork.as_str(), "art://cov/80x80");
        assert_eq!(artist_item(&SizedArt, &artist).artwork.as_str(), "art://pic/160x160");
    }

    #[test]
    fn missing_artwork_falls_back_to_default_icon() {
        let item = track_item(&SizedArt, &track(None));
        assert_eq!(item.artwork, Artwork::AlbumArt(DEFAULT_ICON.into()));

        let item = track_item(&SizedArt, &track(Some("")));
        assert_eq!(item.artwork.as_str(), DEFAULT_ICON);
    }

    #[test]
    fn items_link_to_their_own_locations() {
        let item = track_item(&SizedArt, &track(None));
        assert_eq!(item.uri, "tidal:track:123");
        assert_eq!(item.kind, ItemKind::Song);
        assert_eq!(item.artist, "Nils Frahm");
        assert_eq!(item.album, "Spaces");
    }

    #[test]
    fn descriptor_maps_hi_res_and_cover() {
        let stream = StreamInfo {
            url: "https://stream/a.flac".into(),
            quality: QualityTier::HiRes,
            codec: Some("FLAC".into()),
        };
        let descriptor = playable_descriptor(&SizedArt, &track(Some("cov")), &stream);
        assert_eq!(descriptor.uri, "https://stream/a.flac");
        assert_eq!(descriptor.format, AudioFormat::HI_RES);
        assert_eq!(descriptor.albumart, "art://cov/1280x1280");
        assert_eq!(descriptor.track_type.as_deref(), Some("FLAC"));
        assert_eq!(descriptor.duration, Some(498));
        assert_eq!(descriptor.track_number, Some(4));

        let lossless = StreamInfo {
            quality: QualityTier::Lossless,
            ..stream
        };
        let descriptor = playable_descriptor(&SizedArt, &track(None), &lossless);
        assert_eq!(descriptor.format, AudioFormat::CD);
        assert_eq!(descriptor.albumart, DEFAULT_ICON);
    }

    #[test]
    fn artists_render_main_then_featured() {
        let credits = vec![
            credit("A", CreditRole::Main),
            credit("X", CreditRole::Featured),
            credit("B", CreditRole::Main),
            credit("C", CreditRole::Main),
        ];
        assert_eq!(format_artists(&credits), "A, B, and C ft. X");
        assert_eq!(format_artists(&credits[..1]), "A");
        assert_eq!(format_artists(&credits[..2]), "A ft. X");
        assert_eq!(format_artists(&[]), "");
    }

    #[test]
    fn unroled_credits_count_as_main() {
        let credits = vec![credit("John Coltrane", CreditRole::Other)];
        assert_eq!(format_artists(&credits), "John Coltrane");
    }
}
