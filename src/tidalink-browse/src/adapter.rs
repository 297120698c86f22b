use crate::error::{AdapterError, AdapterResult};
use crate::projection::{
    album_item, artist_item, playable_descriptor, playlist_item, root_categories, track_item,
};
use crate::session::{CatalogSession, SessionManager};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tidalink_core::catalog::{CatalogError, CatalogFactory, CatalogResult, Credentials};
use tidalink_core::config::Config;
use tidalink_core::daemon::{DaemonBridge, DaemonStatus};
use tidalink_core::host::Host;
use tidalink_core::location::Location;
use tidalink_core::models::{
    ItemList, ListView, Navigation, NavigationList, PageRequest, PlayableDescriptor, PrevLink,
    TrackId,
};
use tidalink_player::{PlaybackBridge, DEFAULT_DAEMON_TIMEOUT};
use tokio::time::timeout;
use tracing::{debug, info, warn};

/// Limits applied to every catalog and daemon call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdapterSettings {
    pub page_limit: u32,
    pub search_limit: u32,
    pub request_timeout: Duration,
    pub daemon_timeout: Duration,
}

impl Default for AdapterSettings {
    fn default() -> Self {
        Self {
            page_limit: 50,
            search_limit: 10,
            request_timeout: Duration::from_secs(15),
            daemon_timeout: DEFAULT_DAEMON_TIMEOUT,
        }
    }
}

impl From<&Config> for AdapterSettings {
    fn from(config: &Config) -> Self {
        Self {
            page_limit: config.catalog.page_limit,
            search_limit: config.catalog.search_limit,
            request_timeout: config.catalog.request_timeout(),
            daemon_timeout: config.daemon.timeout(),
        }
    }
}

/// Translates host requests into catalog calls and daemon commands.
pub struct CatalogAdapter {
    sessions: SessionManager,
    playback: PlaybackBridge,
    settings: AdapterSettings,
}

impl CatalogAdapter {
    pub fn new(
        factory: Arc<dyn CatalogFactory>,
        host: Arc<dyn Host>,
        daemon: Arc<dyn DaemonBridge>,
        settings: AdapterSettings,
    ) -> Self {
        Self {
            sessions: SessionManager::new(factory, host.clone()),
            playback: PlaybackBridge::new(daemon, host, settings.daemon_timeout),
            settings,
        }
    }

    pub fn sessions(&self) -> &SessionManager {
        &self.sessions
    }

    /// Plugin start: configure from the saved account, if it is complete.
    pub async fn on_start(&self, saved: &Credentials) -> AdapterResult<bool> {
        info!("tidal plugin starting");
        self.sessions.configure(saved).await
    }

    /// Plugin stop: drop the session and withdraw the browse source.
    pub async fn on_stop(&self) {
        info!("tidal plugin stopping");
        self.sessions.logout().await;
    }

    pub async fn on_restart(&self, saved: &Credentials) -> AdapterResult<bool> {
        self.on_stop().await;
        self.on_start(saved).await
    }

    pub async fn configure(&self, credentials: &Credentials) -> AdapterResult<bool> {
        self.sessions.configure(credentials).await
    }

    pub async fn logout(&self) -> bool {
        self.sessions.logout().await
    }

    /// Navigation list for `uri`, or `None` for anything that is not a
    /// browseable location.
    pub async fn browse(&self, uri: &str) -> AdapterResult<Option<NavigationList>> {
        let Some(location) = Location::parse(uri) else {
            debug!(uri, "unrecognised browse location");
            return Ok(None);
        };
        debug!(%location, "browse");
        let prev = location.parent().to_string();

        let list = match &location {
            Location::Root => ItemList::new(vec![ListView::List], root_categories()),
            Location::MyPlaylists => {
                let session = self.sessions.current().await?;
                let client = session.client();
                let page = self
                    .bounded("my playlists", client.my_playlists(self.first_page()))
                    .await?;
                let items = page.items.iter().map(|p| playlist_item(client, p)).collect();
                ItemList::new(vec![ListView::List, ListView::Grid], items)
            }
            Location::MyAlbums => {
                let session = self.sessions.current().await?;
                let client = session.client();
                let page = self
                    .bounded("my albums", client.my_albums(self.first_page()))
                    .await?;
                let items = page.items.iter().map(|a| album_item(client, a)).collect();
                ItemList::new(vec![ListView::List, ListView::Grid], items)
            }
            Location::MyTracks => {
                let session = self.sessions.current().await?;
                let client = session.client();
                let page = self
                    .bounded("my tracks", client.my_tracks(self.first_page()))
                    .await?;
                let items = page.items.iter().map(|t| track_item(client, t)).collect();
                ItemList::new(vec![ListView::List], items)
            }
            Location::Playlist(id) => {
                let session = self.sessions.current().await?;
                let client = session.client();
                let page = self
                    .bounded("playlist tracks", client.playlist_tracks(id, self.first_page()))
                    .await?;
                let items = page.items.iter().map(|t| track_item(client, t)).collect();
                ItemList::new(vec![ListView::List], items)
            }
            Location::Album(id) => {
                let session = self.sessions.current().await?;
                let client = session.client();
                let page = self
                    .bounded("album tracks", client.album_tracks(id, self.first_page()))
                    .await?;
                let items = page.items.iter().map(|t| track_item(client, t)).collect();
                ItemList::new(vec![ListView::List], items)
            }
            Location::Artist(id) => {
                let session = self.sessions.current().await?;
                let client = session.client();
                let page = self
                    .bounded("artist albums", client.artist_albums(id, self.first_page()))
                    .await?;
                let items = page.items.iter().map(|a| album_item(client, a)).collect();
                ItemList::new(vec![ListView::List, ListView::Grid], items)
            }
            Location::Search(query) => {
                let lists = self.search(query).await?;
                return Ok(Some(NavigationList {
                    navigation: Navigation {
                        lists,
                        prev: PrevLink { uri: prev },
                    },
                }));
            }
            // Tracks are played, not browsed.
            Location::Track(_) => return Ok(None),
        };

        Ok(Some(NavigationList::single(list, prev)))
    }

    /// Artists, tracks and albums matching `query`, one titled list each.
    pub async fn search(&self, query: &str) -> AdapterResult<Vec<ItemList>> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(Vec::new());
        }
        let session = self.sessions.current().await?;
        let client = session.client();
        let results = self
            .bounded("search", client.search(query, self.settings.search_limit))
            .await?;
        debug!(
            query,
            artists = results.artists.len(),
            tracks = results.tracks.len(),
            albums = results.albums.len(),
            "search results"
        );

        Ok(vec![
            ItemList::titled(
                "Tidal Artists",
                vec![ListView::List, ListView::Grid],
                results.artists.iter().map(|a| artist_item(client, a)).collect(),
            ),
            ItemList::titled(
                "Tidal Tracks",
                vec![ListView::List],
                results.tracks.iter().map(|t| track_item(client, t)).collect(),
            ),
            ItemList::titled(
                "Tidal Albums",
                vec![ListView::List, ListView::Grid],
                results.albums.iter().map(|a| album_item(client, a)).collect(),
            ),
        ])
    }

    /// Stream URL plus display metadata for a track location; `None` for
    /// anything else.
    pub async fn resolve_playable(&self, uri: &str) -> AdapterResult<Option<PlayableDescriptor>> {
        let Some(Location::Track(track_id)) = Location::parse(uri) else {
            debug!(uri, "not a playable location");
            return Ok(None);
        };
        let session = self.sessions.current().await?;
        let descriptor = self.resolve_track(&session, &track_id).await?;
        Ok(Some(descriptor))
    }

    async fn resolve_track(
        &self,
        session: &CatalogSession,
        track_id: &TrackId,
    ) -> AdapterResult<PlayableDescriptor> {
        let client = session.client();
        let stream = self
            .bounded("stream url", client.stream_url(track_id))
            .await?;
        let track = self
            .bounded("track info", client.track_info(track_id))
            .await?;
        info!(track = %track_id, quality = %stream.quality, "resolved track");
        Ok(playable_descriptor(client, &track, &stream))
    }

    /// Replace the daemon queue with `uri` and play it.
    ///
    /// A `tidal:track:<id>` location is resolved to its stream first; any
    /// other string is handed to the daemon as-is.
    pub async fn clear_add_play_track(&self, uri: &str) -> AdapterResult<DaemonStatus> {
        let stream_uri = match Location::parse(uri) {
            Some(Location::Track(track_id)) => {
                let session = self.sessions.current().await?;
                self.resolve_track(&session, &track_id).await?.uri
            }
            _ => uri.to_string(),
        };
        Ok(self.playback.clear_add_play(&stream_uri).await?)
    }

    pub async fn enqueue(&self, stream_uri: &str) -> AdapterResult<()> {
        Ok(self.playback.enqueue(stream_uri).await?)
    }

    pub async fn stop(&self) -> AdapterResult<()> {
        Ok(self.playback.stop().await?)
    }

    pub async fn pause(&self) -> AdapterResult<()> {
        Ok(self.playback.pause().await?)
    }

    pub async fn resume(&self) -> AdapterResult<()> {
        Ok(self.playback.resume().await?)
    }

    pub async fn seek(&self, position_ms: u64) -> AdapterResult<()> {
        Ok(self.playback.seek(position_ms).await?)
    }

    pub async fn state(&self) -> AdapterResult<DaemonStatus> {
        Ok(self.playback.status().await?)
    }

    pub async fn push_state(&self) -> AdapterResult<DaemonStatus> {
        Ok(self.playback.push_state().await?)
    }

    /// Host album-art resolution is a plain concatenation of base and path.
    pub fn album_art(&self, base: &str, path: &str) -> String {
        format!("{base}{path}")
    }

    fn first_page(&self) -> PageRequest {
        PageRequest::first_page(self.settings.page_limit)
    }

    async fn bounded<T>(
        &self,
        operation: &str,
        call: impl Future<Output = CatalogResult<T>>,
    ) -> AdapterResult<T> {
        let after = self.settings.request_timeout;
        match timeout(after, call).await {
            Ok(result) => result.map_err(|err| {
                warn!(operation, error = %err, "catalog call failed");
                AdapterError::Catalog(err)
            }),
            Err(_) => {
                warn!(operation, ?after, "catalog call timed out");
                Err(CatalogError::Timeout {
                    operation: operation.to_string(),
                    after,
                }
                .into())
            }
        }
    }
}
