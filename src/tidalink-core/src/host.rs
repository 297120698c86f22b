use crate::daemon::DaemonStatus;
use crate::models::BrowseSource;
use async_trait::async_trait;

/// Capabilities the host platform hands to the adapter.
///
/// The adapter never reaches into host globals; everything it needs from the
/// host goes through this trait.
#[async_trait]
pub trait Host: Send + Sync {
    /// Make the catalog appear among the host's browse sources.
    fn register_browse_source(&self, source: &BrowseSource);

    fn remove_browse_source(&self, uri: &str);

    /// Feed a freshly read daemon status to the host's playback-state coordinator.
    async fn sync_state(&self, status: &DaemonStatus, service: &str);

    /// Push a service-originated state update to the host.
    async fn push_state(&self, status: &DaemonStatus, service: &str);

    /// Tell the coordinator which service's daemon updates to consume next.
    fn set_consume_update_service(&self, service: &str);
}
