use crate::protocol::{HostNotification, NotificationLine};
use async_trait::async_trait;
use serde::Serialize;
use std::io::Write;
use std::sync::{Arc, Mutex, PoisonError};
use tidalink_core::daemon::DaemonStatus;
use tidalink_core::host::Host;
use tidalink_core::models::BrowseSource;
use tracing::warn;

/// Shared writer for protocol lines. Responses and notifications go through
/// the same sink so lines never interleave.
#[derive(Clone)]
pub struct LineSink {
    out: Arc<Mutex<Box<dyn Write + Send>>>,
}

impl LineSink {
    pub fn new(writer: impl Write + Send + 'static) -> Self {
        Self {
            out: Arc::new(Mutex::new(Box::new(writer))),
        }
    }

    pub fn stdout() -> Self {
        Self::new(std::io::stdout())
    }

    /// Write `value` as one JSON line and flush.
    pub fn send<T: Serialize>(&self, value: &T) -> std::io::Result<()> {
        let mut line = serde_json::to_string(value)?;
        line.push('\n');
        let mut out = self.out.lock().unwrap_or_else(PoisonError::into_inner);
        out.write_all(line.as_bytes())?;
        out.flush()
    }
}

/// [`Host`] that forwards every capability call to the host process as a
/// notification line.
pub struct StdioHost {
    sink: LineSink,
}

impl StdioHost {
    pub fn new(sink: LineSink) -> Self {
        Self { sink }
    }

    fn notify(&self, event: HostNotification) {
        if let Err(err) = self.sink.send(&NotificationLine { event }) {
            warn!(error = %err, "failed to notify host");
        }
    }
}

#[async_trait]
impl Host for StdioHost {
    fn register_browse_source(&self, source: &BrowseSource) {
        self.notify(HostNotification::AddBrowseSource(source.clone()));
    }

    fn remove_browse_source(&self, uri: &str) {
        self.notify(HostNotification::RemoveBrowseSource { uri: uri.into() });
    }

    async fn sync_state(&self, status: &DaemonStatus, service: &str) {
        self.notify(HostNotification::SyncState {
            service: service.into(),
            status: status.clone(),
        });
    }

    async fn push_state(&self, status: &DaemonStatus, service: &str) {
        self.notify(HostNotification::PushState {
            service: service.into(),
            status: status.clone(),
        });
    }

    fn set_consume_update_service(&self, service: &str) {
        self.notify(HostNotification::ConsumeUpdateService {
            service: service.into(),
        });
    }
}
