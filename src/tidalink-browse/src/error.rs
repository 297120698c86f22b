use thiserror::Error;
use tidalink_core::catalog::CatalogError;
use tidalink_core::daemon::DaemonError;
use tidalink_core::models::UnknownQualityTier;

#[derive(Debug, Error)]
pub enum AdapterError {
    #[error("tidal account is not configured")]
    NotConfigured,
    #[error(transparent)]
    Catalog(#[from] CatalogError),
    #[error(transparent)]
    Daemon(#[from] DaemonError),
    #[error("invalid quality setting: {0}")]
    InvalidQuality(#[from] UnknownQualityTier),
}

pub type AdapterResult<T> = Result<T, AdapterError>;
