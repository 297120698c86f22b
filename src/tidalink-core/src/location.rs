//! The `tidal` location scheme.
//!
//! Locations are the only strings the host persists (bookmarks, favourites,
//! queue entries), so [`Location::parse`] and the `Display` impl must agree
//! byte for byte on every form:
//!
//! ```text
//! tidal                    root menu
//! tidal/my_playlists       the user's playlists
//! tidal/my_albums          the user's favourite albums
//! tidal/my_tracks          the user's favourite tracks
//! tidal/search/<query>     search results (query percent-encoded)
//! tidal:playlist:<id>      playlist contents
//! tidal:album:<id>         album contents
//! tidal:artist:<id>        artist albums
//! tidal:track:<id>         a playable track
//! ```

use crate::models::{AlbumId, ArtistId, PlaylistId, TrackId};
use std::fmt;

const ROOT: &str = "tidal";
const MY_PLAYLISTS: &str = "tidal/my_playlists";
const MY_ALBUMS: &str = "tidal/my_albums";
const MY_TRACKS: &str = "tidal/my_tracks";
const SEARCH_PREFIX: &str = "tidal/search/";

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Location {
    Root,
    MyPlaylists,
    MyAlbums,
    MyTracks,
    Search(String),
    Playlist(PlaylistId),
    Album(AlbumId),
    Artist(ArtistId),
    Track(TrackId),
}

impl Location {
    /// Parse a host URI. Anything outside the scheme, an unknown kind or an
    /// empty id yields `None`.
    pub fn parse(uri: &str) -> Option<Self> {
        match uri {
            ROOT => return Some(Location::Root),
            MY_PLAYLISTS => return Some(Location::MyPlaylists),
            MY_ALBUMS => return Some(Location::MyAlbums),
            MY_TRACKS => return Some(Location::MyTracks),
            _ => {}
        }

        if let Some(encoded) = uri.strip_prefix(SEARCH_PREFIX) {
            let query = urlencoding::decode(encoded).ok()?;
            if query.trim().is_empty() {
                return None;
            }
            return Some(Location::Search(query.into_owned()));
        }

        let mut parts = uri.split(':');
        if parts.next() != Some(ROOT) {
            return None;
        }
        let kind = parts.next()?;
        let id = parts.next().filter(|id| !id.is_empty())?;
        match kind {
            "playlist" => Some(Location::Playlist(PlaylistId::new(id))),
            "album" => Some(Location::Album(AlbumId::new(id))),
            "artist" => Some(Location::Artist(ArtistId::new(id))),
            "track" => Some(Location::Track(TrackId::new(id))),
            _ => None,
        }
    }

    /// The node the host's "back" action returns to.
    pub fn parent(&self) -> Location {
        match self {
            Location::Playlist(_) => Location::MyPlaylists,
            Location::Album(_) => Location::MyAlbums,
            _ => Location::Root,
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Location::Root => f.write_str(ROOT),
            Location::MyPlaylists => f.write_str(MY_PLAYLISTS),
            Location::MyAlbums => f.write_str(MY_ALBUMS),
            Location::MyTracks => f.write_str(MY_TRACKS),
            Location::Search(query) => {
                write!(f, "{SEARCH_PREFIX}{}", urlencoding::encode(query))
            }
            Location::Playlist(id) => write!(f, "{ROOT}:playlist:{id}"),
            Location::Album(id) => write!(f, "{ROOT}:album:{id}"),
            Location::Artist(id) => write!(f, "{ROOT}:artist:{id}"),
            Location::Track(id) => write!(f, "{ROOT}:track:{id}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_locations_match_host_strings() {
        assert_eq!(Location::Root.to_string(), "tidal");
        assert_eq!(Location::MyPlaylists.to_string(), "tidal/my_playlists");
        assert_eq!(Location::MyAlbums.to_string(), "tidal/my_albums");
        assert_eq!(Location::MyTracks.to_string(), "tidal/my_tracks");
    }

    #[test]
    fn every_form_round_trips() {
        for uri in [
            "tidal",
            "tidal/my_playlists",
            "tidal/my_albums",
            "tidal/my_tracks",
            "tidal:playlist:0c3f5a4e-6b9b-4a4e-9c1f-2f9a0c4d5e6f",
            "tidal:album:77",
            "tidal:artist:3346",
            "tidal:track:123",
            "tidal/search/daft%20punk",
        ] {
            let location = Location::parse(uri).unwrap_or_else(|| panic!("{uri} should parse"));
            assert_eq!(location.to_string(), uri);
        }
    }

    #[test]
    fn ids_are_the_third_segment() {
        assert_eq!(
            Location::parse("tidal:album:77"),
            Some(Location::Album(AlbumId::new("77")))
        );
        assert_eq!(
            Location::parse("tidal:track:123:extra"),
            Some(Location::Track(TrackId::new("123")))
        );
    }

    #[test]
    fn unknown_or_malformed_locations_are_rejected() {
        for uri in [
            "",
            "tidal:unknown:1",
            "tidal:album:",
            "tidal:album",
            "tidal/",
            "tidal/my_artists",
            "spotify:track:1",
            "tidalx:track:1",
            "tidal/search/",
        ] {
            assert_eq!(Location::parse(uri), None, "{uri} should not parse");
        }
    }

    #[test]
    fn search_query_is_percent_encoded() {
        let location = Location::Search("AC/DC & friends".into());
        let uri = location.to_string();
        assert!(!uri["tidal/search/".len()..].contains('/'));
        assert_eq!(Location::parse(&uri), Some(location));
    }

    #[test]
    fn parents_point_back_up_the_tree() {
        assert_eq!(
            Location::Album(AlbumId::new("1")).parent(),
            Location::MyAlbums
        );
        assert_eq!(
            Location::Playlist(PlaylistId::new("p")).parent(),
            Location::MyPlaylists
        );
        assert_eq!(Location::MyTracks.parent(), Location::Root);
        assert_eq!(Location::Root.parent(), Location::Root);
    }
}
