use crate::error::{AdapterError, AdapterResult};
use std::sync::Arc;
use tidalink_core::catalog::{CatalogClient, CatalogFactory, Credentials};
use tidalink_core::host::Host;
use tidalink_core::location::Location;
use tidalink_core::models::{BrowseSource, QualityTier};
use tokio::sync::RwLock;
use tracing::{debug, info};

/// One authenticated catalog client plus the account it belongs to.
pub struct CatalogSession {
    client: Arc<dyn CatalogClient>,
    username: String,
}

impl CatalogSession {
    pub fn client(&self) -> &dyn CatalogClient {
        self.client.as_ref()
    }
}

/// Holds at most one [`CatalogSession`] and keeps the host's browse source
/// registration in step with it.
pub struct SessionManager {
    factory: Arc<dyn CatalogFactory>,
    host: Arc<dyn Host>,
    session: RwLock<Option<Arc<CatalogSession>>>,
}

impl SessionManager {
    pub fn new(factory: Arc<dyn CatalogFactory>, host: Arc<dyn Host>) -> Self {
        Self {
            factory,
            host,
            session: RwLock::new(None),
        }
    }

    /// Build a session from `credentials`, replacing any previous one.
    ///
    /// Returns `Ok(false)` and leaves everything untouched when any field is
    /// empty. The browse source is registered only when no session existed.
    pub async fn configure(&self, credentials: &Credentials) -> AdapterResult<bool> {
        if !credentials.is_complete() {
            info!("tidal account incomplete; catalog not configured");
            return Ok(false);
        }
        let quality: QualityTier = credentials.quality.parse()?;
        let client = self.factory.connect(credentials, quality)?;
        let session = Arc::new(CatalogSession {
            client,
            username: credentials.username.clone(),
        });

        let previous = self.session.write().await.replace(session);
        if previous.is_none() {
            self.host.register_browse_source(&BrowseSource::tidal());
        }
        info!(username = %credentials.username, %quality, "tidal session configured");
        Ok(true)
    }

    /// Drop the session and withdraw the browse source. Returns whether a
    /// session existed.
    pub async fn logout(&self) -> bool {
        let previous = self.session.write().await.take();
        match previous {
            Some(session) => {
                self.host.remove_browse_source(&Location::Root.to_string());
                info!(username = %session.username, "tidal session closed");
                true
            }
            None => {
                debug!("no tidal session to close");
                false
            }
        }
    }

    pub async fn current(&self) -> AdapterResult<Arc<CatalogSession>> {
        self.session
            .read()
            .await
            .clone()
            .ok_or(AdapterError::NotConfigured)
    }

    pub async fn is_configured(&self) -> bool {
        self.session.read().await.is_some()
    }
}
