//! Host-facing plugin endpoint: a JSON-lines request loop over stdio that
//! drives the catalog adapter, plus the [`Host`](tidalink_core::host::Host)
//! implementation that reports back to the host process.

mod account;
mod host;
pub mod protocol;
mod server;

pub use account::{AccountError, AccountStore, SavedAccount};
pub use host::{LineSink, StdioHost};
pub use protocol::{
    AccountView, HostMethod, HostNotification, HostRequest, HostResponse, HostResult,
    NotificationLine, PluginError, PluginErrorKind, PluginInfo, PROTOCOL_VERSION,
};
pub use server::{PluginServer, ServerError};
