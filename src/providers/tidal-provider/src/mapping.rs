use crate::models::{Album, AlbumRef, Artist, Playlist, SearchResponse, Track};
use tidalink_core::models::{
    AlbumRef as CoreAlbumRef, ArtistCredit, CatalogAlbum, CatalogArtist, CatalogPlaylist,
    CatalogTrack, SearchResults,
};

pub fn map_track(track: Track) -> CatalogTrack {
    CatalogTrack {
        id: track.id,
        title: track.title,
        duration_seconds: track.duration,
        track_number: track.track_number,
        artists: map_credits(track.artists, track.artist),
        album: map_album_ref(track.album),
    }
}

pub fn map_album(album: Album) -> CatalogAlbum {
    CatalogAlbum {
        id: album.id,
        title: album.title,
        artists: map_credits(album.artists, album.artist),
        cover: album.cover,
    }
}

pub fn map_playlist(playlist: Playlist) -> CatalogPlaylist {
    CatalogPlaylist {
        id: playlist.uuid,
        title: playlist.title,
        image: playlist.image,
        track_count: playlist.number_of_tracks,
    }
}

pub fn map_artist(artist: Artist) -> CatalogArtist {
    CatalogArtist {
        id: artist.id,
        name: artist.name,
        picture: artist.picture,
    }
}

pub fn map_search(response: SearchResponse) -> SearchResults {
    SearchResults {
        artists: response.artists.items.into_iter().map(map_artist).collect(),
        tracks: response.tracks.items.into_iter().map(map_track).collect(),
        albums: response.albums.items.into_iter().map(map_album).collect(),
    }
}

fn map_album_ref(album: AlbumRef) -> CoreAlbumRef {
    CoreAlbumRef {
        id: album.id,
        title: album.title,
        cover: album.cover,
    }
}

/// Older payloads only carry the singular `artist`; newer ones carry the
/// full `artists` list with roles.
fn map_credits(artists: Vec<Artist>, fallback: Option<Artist>) -> Vec<ArtistCredit> {
    let source = if artists.is_empty() {
        fallback.into_iter().collect()
    } else {
        artists
    };
    source
        .into_iter()
        .map(|artist| ArtistCredit {
            id: artist.id,
            name: artist.name,
            role: artist.role,
        })
        .collect()
}
