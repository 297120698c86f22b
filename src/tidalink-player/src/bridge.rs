use std::sync::Arc;
use std::time::Duration;
use tidalink_core::daemon::{DaemonBridge, DaemonCommand, DaemonError, DaemonResult, DaemonStatus};
use tidalink_core::host::Host;
use tidalink_core::SERVICE_NAME;
use tokio::time::timeout;
use tracing::{debug, info};

pub const DEFAULT_DAEMON_TIMEOUT: Duration = Duration::from_secs(5);

/// Service that owns the daemon's state updates while playback is paused or resumed.
const DAEMON_SERVICE: &str = "mpd";

/// Drives the shared audio daemon on behalf of the catalog and keeps the
/// host's state machine in sync with it.
pub struct PlaybackBridge {
    daemon: Arc<dyn DaemonBridge>,
    host: Arc<dyn Host>,
    timeout: Duration,
}

impl PlaybackBridge {
    pub fn new(daemon: Arc<dyn DaemonBridge>, host: Arc<dyn Host>, timeout: Duration) -> Self {
        Self {
            daemon,
            host,
            timeout,
        }
    }

    /// Replace the daemon queue with `uri` and start it.
    ///
    /// A rejected `load` falls back to a single `add`. The resulting status is
    /// handed to the host under the `tidal` service.
    pub async fn clear_add_play(&self, uri: &str) -> DaemonResult<DaemonStatus> {
        self.call(DaemonCommand::Stop).await?;
        self.call(DaemonCommand::Clear).await?;
        if let Err(err) = self.call(DaemonCommand::Load(uri.to_string())).await {
            debug!(error = %err, "load rejected; adding stream instead");
            self.call(DaemonCommand::Add(uri.to_string())).await?;
        }
        self.call(DaemonCommand::Play).await?;

        let status = self.status().await?;
        info!(state = ?status.state, "playback started");
        self.host.sync_state(&status, SERVICE_NAME).await;
        Ok(status)
    }

    /// Append `uri` to the daemon queue without touching playback.
    pub async fn enqueue(&self, uri: &str) -> DaemonResult<()> {
        self.call(DaemonCommand::Add(uri.to_string())).await
    }

    pub async fn stop(&self) -> DaemonResult<()> {
        self.call(DaemonCommand::Stop).await
    }

    pub async fn pause(&self) -> DaemonResult<()> {
        self.host.set_consume_update_service(DAEMON_SERVICE);
        self.call(DaemonCommand::Pause(true)).await
    }

    pub async fn resume(&self) -> DaemonResult<()> {
        self.host.set_consume_update_service(DAEMON_SERVICE);
        self.call(DaemonCommand::Play).await
    }

    /// Seek to `position_ms` within the current track.
    pub async fn seek(&self, position_ms: u64) -> DaemonResult<()> {
        let seconds = position_ms as f64 / 1000.0;
        self.call(DaemonCommand::Seek(seconds)).await
    }

    pub async fn status(&self) -> DaemonResult<DaemonStatus> {
        timeout(self.timeout, self.daemon.status())
            .await
            .map_err(|_| self.timed_out("status"))?
    }

    /// Read the daemon status and push it to the host as this service's state.
    pub async fn push_state(&self) -> DaemonResult<DaemonStatus> {
        let status = self.status().await?;
        self.host.push_state(&status, SERVICE_NAME).await;
        Ok(status)
    }

    async fn call(&self, command: DaemonCommand) -> DaemonResult<()> {
        command.check_arguments()?;
        timeout(self.timeout, self.daemon.send(&command))
            .await
            .map_err(|_| self.timed_out(command.name()))?
    }

    fn timed_out(&self, command: &str) -> DaemonError {
        DaemonError::Timeout {
            command: command.to_string(),
            after: self.timeout,
        }
    }
}
