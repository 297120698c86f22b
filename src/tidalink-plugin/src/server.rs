use crate::account::AccountStore;
use crate::host::LineSink;
use crate::protocol::{
    HostMethod, HostRequest, HostResponse, HostResult, PluginError, PluginErrorKind, PluginInfo,
    PROTOCOL_VERSION,
};
use std::sync::Arc;
use tidalink_browse::{AdapterError, CatalogAdapter};
use tidalink_core::catalog::Credentials;
use tidalink_core::models::QualityTier;
use tidalink_core::SERVICE_NAME;
use thiserror::Error;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tracing::{debug, info, warn};

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("plugin protocol I/O failed: {0}")]
    Io(#[from] std::io::Error),
}

/// Serves host requests one line at a time until `Shutdown` or end of input.
pub struct PluginServer {
    adapter: Arc<CatalogAdapter>,
    account: Arc<dyn AccountStore>,
    sink: LineSink,
}

impl PluginServer {
    pub fn new(adapter: Arc<CatalogAdapter>, account: Arc<dyn AccountStore>, sink: LineSink) -> Self {
        Self {
            adapter,
            account,
            sink,
        }
    }

    pub async fn serve_stdio(&self) -> Result<(), ServerError> {
        self.serve(BufReader::new(tokio::io::stdin())).await
    }

    pub async fn serve<R: AsyncBufRead + Unpin>(&self, reader: R) -> Result<(), ServerError> {
        let mut lines = reader.lines();
        while let Some(line) = lines.next_line().await? {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            let request = match serde_json::from_str::<HostRequest>(line) {
                Ok(request) => request,
                Err(err) => {
                    warn!(error = %err, "malformed host request");
                    self.sink.send(&HostResponse {
                        id: request_id(line),
                        result: HostResult::Error(PluginError::new(
                            PluginErrorKind::InvalidRequest,
                            format!("malformed request: {err}"),
                        )),
                    })?;
                    continue;
                }
            };

            let shutdown = matches!(request.method, HostMethod::Shutdown);
            let result = self.handle(request.method).await;
            self.sink.send(&HostResponse {
                id: request.id,
                result,
            })?;
            if shutdown {
                info!("host requested shutdown");
                return Ok(());
            }
        }
        info!("host closed the request stream");
        Ok(())
    }

    /// Run one request; failures become a [`HostResult::Error`].
    pub async fn handle(&self, method: HostMethod) -> HostResult {
        match self.dispatch(method).await {
            Ok(result) => result,
            Err(err) => {
                warn!(kind = ?err.kind, error = %err.message, "request failed");
                HostResult::Error(err)
            }
        }
    }

    async fn dispatch(&self, method: HostMethod) -> Result<HostResult, PluginError> {
        let adapter = &self.adapter;
        match method {
            HostMethod::Start => {
                let saved = self.account.load()?;
                let configured = adapter.on_start(&saved).await?;
                Ok(HostResult::Started(PluginInfo {
                    id: SERVICE_NAME.into(),
                    name: "Tidal".into(),
                    version: env!("CARGO_PKG_VERSION").into(),
                    protocol_version: PROTOCOL_VERSION,
                    configured,
                }))
            }
            HostMethod::Stop => {
                adapter.on_stop().await;
                Ok(HostResult::Stopped)
            }
            HostMethod::Restart => {
                let saved = self.account.load()?;
                let configured = adapter.on_restart(&saved).await?;
                Ok(HostResult::Configured { configured })
            }
            HostMethod::GetConfig => Ok(HostResult::Config(self.account.view()?)),
            HostMethod::SaveAccount {
                username,
                password,
                token,
                quality,
            } => {
                // Reject before persisting: an unknown tier would make the saved config unloadable.
                if !quality.trim().is_empty() {
                    quality.parse::<QualityTier>().map_err(AdapterError::from)?;
                }
                let credentials = Credentials::new(username, password, token, quality);
                // Only persist an account the catalog accepted.
                let configured = adapter.configure(&credentials).await?;
                self.account.save(&credentials)?;
                Ok(HostResult::Configured { configured })
            }
            HostMethod::Logout => {
                let had_session = adapter.logout().await;
                self.account.forget_password()?;
                Ok(HostResult::LoggedOut { had_session })
            }
            HostMethod::Browse { uri } => Ok(match adapter.browse(&uri).await? {
                Some(navigation) => HostResult::Navigation(navigation),
                None => HostResult::Empty,
            }),
            HostMethod::Search { value } => Ok(HostResult::SearchResults {
                lists: adapter.search(&value).await?,
            }),
            HostMethod::ExplodeUri { uri } => Ok(match adapter.resolve_playable(&uri).await? {
                Some(descriptor) => HostResult::Playable(descriptor),
                None => HostResult::Empty,
            }),
            HostMethod::ClearAddPlayTrack { uri } => {
                Ok(HostResult::State(adapter.clear_add_play_track(&uri).await?))
            }
            HostMethod::Enqueue { uri } => {
                adapter.enqueue(&uri).await?;
                Ok(HostResult::Done)
            }
            HostMethod::StopPlayback => {
                adapter.stop().await?;
                Ok(HostResult::Done)
            }
            HostMethod::Pause => {
                adapter.pause().await?;
                Ok(HostResult::Done)
            }
            HostMethod::Resume => {
                adapter.resume().await?;
                Ok(HostResult::Done)
            }
            HostMethod::Seek { position_ms } => {
                adapter.seek(position_ms).await?;
                Ok(HostResult::Done)
            }
            HostMethod::GetState => Ok(HostResult::State(adapter.state().await?)),
            HostMethod::PushState => Ok(HostResult::State(adapter.push_state().await?)),
            HostMethod::AlbumArt { base, path } => Ok(HostResult::AlbumArt {
                url: adapter.album_art(&base, &path),
            }),
            HostMethod::Shutdown => {
                debug!("stopping before shutdown");
                adapter.on_stop().await;
                Ok(HostResult::ShutdownAck)
            }
        }
    }
}

/// Best-effort id of a request that failed to parse, so the host can still correlate.
fn request_id(line: &str) -> u64 {
    serde_json::from_str::<serde_json::Value>(line)
        .ok()
        .and_then(|value| value.get("id")?.as_u64())
        .unwrap_or(0)
}
