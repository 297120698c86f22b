//! JSON-lines protocol spoken with the audio host.
//!
//! The host writes one [`HostRequest`] per line on stdin and reads one
//! [`HostResponse`] per request from stdout. Host-bound notifications
//! (browse source registration, state sync) share stdout as
//! [`NotificationLine`]s.

use serde::{Deserialize, Serialize};
use tidalink_browse::AdapterError;
use tidalink_core::catalog::CatalogError;
use tidalink_core::daemon::{DaemonError, DaemonStatus};
use tidalink_core::models::{BrowseSource, ItemList, NavigationList, PlayableDescriptor};

/// Protocol version for compatibility checking.
pub const PROTOCOL_VERSION: u32 = 1;

/// Request sent from the host to this plugin.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HostRequest {
    /// Unique request ID for correlation.
    pub id: u64,
    pub method: HostMethod,
}

/// Response to a single [`HostRequest`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HostResponse {
    pub id: u64,
    pub result: HostResult,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "params")]
pub enum HostMethod {
    /// Plugin start: configure from the saved account.
    Start,
    Stop,
    Restart,
    /// Saved account settings, without secrets.
    GetConfig,
    /// Persist the account form and reconfigure the session.
    SaveAccount {
        username: String,
        password: String,
        token: String,
        /// Quality tier; the host's form calls this field `bitrate`.
        #[serde(alias = "bitrate")]
        quality: String,
    },
    Logout,
    Browse { uri: String },
    Search { value: String },
    /// Resolve a track location into a playable descriptor.
    ExplodeUri { uri: String },
    ClearAddPlayTrack { uri: String },
    /// Append a stream to the daemon queue.
    Enqueue { uri: String },
    StopPlayback,
    Pause,
    Resume,
    Seek { position_ms: u64 },
    GetState,
    PushState,
    AlbumArt { base: String, path: String },
    Shutdown,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "status")]
pub enum HostResult {
    Started(PluginInfo),
    Stopped,
    Config(AccountView),
    Configured { configured: bool },
    LoggedOut { had_session: bool },
    Navigation(NavigationList),
    SearchResults { lists: Vec<ItemList> },
    Playable(PlayableDescriptor),
    /// A browse or resolve request for a location this plugin does not serve.
    Empty,
    State(DaemonStatus),
    AlbumArt { url: String },
    /// Transport command accepted.
    Done,
    ShutdownAck,
    Error(PluginError),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PluginInfo {
    pub id: String,
    pub name: String,
    pub version: String,
    pub protocol_version: u32,
    /// Whether the saved account produced a catalog session.
    pub configured: bool,
}

/// Saved account as shown in the host's settings form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountView {
    pub username: String,
    pub quality: String,
    pub has_password: bool,
    pub has_token: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PluginError {
    pub kind: PluginErrorKind,
    pub message: String,
}

impl PluginError {
    pub fn new(kind: PluginErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PluginErrorKind {
    Authentication,
    NotFound,
    Network,
    Timeout,
    DaemonUnavailable,
    NotConfigured,
    InvalidRequest,
    Internal,
}

impl From<&AdapterError> for PluginError {
    fn from(err: &AdapterError) -> Self {
        let kind = match err {
            AdapterError::NotConfigured => PluginErrorKind::NotConfigured,
            AdapterError::InvalidQuality(_) => PluginErrorKind::InvalidRequest,
            AdapterError::Catalog(catalog) => match catalog {
                CatalogError::Authentication { .. } => PluginErrorKind::Authentication,
                CatalogError::NotFound { .. } => PluginErrorKind::NotFound,
                CatalogError::Network { .. } => PluginErrorKind::Network,
                CatalogError::Timeout { .. } => PluginErrorKind::Timeout,
                CatalogError::Decode { .. } | CatalogError::Other { .. } => {
                    PluginErrorKind::Internal
                }
            },
            AdapterError::Daemon(daemon) => match daemon {
                DaemonError::Unavailable { .. } | DaemonError::Io(_) => {
                    PluginErrorKind::DaemonUnavailable
                }
                DaemonError::Timeout { .. } => PluginErrorKind::Timeout,
                DaemonError::Command { .. } | DaemonError::Protocol(_) => PluginErrorKind::Internal,
            },
        };
        PluginError::new(kind, err.to_string())
    }
}

impl From<AdapterError> for PluginError {
    fn from(err: AdapterError) -> Self {
        PluginError::from(&err)
    }
}

/// A host-bound notification line: `{"event": {...}}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationLine {
    pub event: HostNotification,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "params")]
pub enum HostNotification {
    AddBrowseSource(BrowseSource),
    RemoveBrowseSource { uri: String },
    SyncState { service: String, status: DaemonStatus },
    PushState { service: String, status: DaemonStatus },
    ConsumeUpdateService { service: String },
}
