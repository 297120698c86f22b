pub mod catalog;
pub mod config;
pub mod daemon;
pub mod host;
pub mod location;
pub mod logging;
pub mod models;
pub mod paths;
pub mod redact;
pub mod secrets;

pub use catalog::{
    ArtworkResolver, CatalogClient, CatalogError, CatalogFactory, CatalogResult, Credentials,
};
pub use config::{
    AccountConfig, CatalogConfig, Config, ConfigError, ConsoleSink, DaemonConfig, LogLevel,
    LoggingConfig, ValidationError,
};
pub use daemon::{DaemonBridge, DaemonCommand, DaemonError, DaemonResult, DaemonStatus, PlayState};
pub use host::Host;
pub use location::Location;
pub use logging::{init_logging, LoggingError, LoggingGuard};
pub use models::*;
pub use paths::{AppDirs, DirsError};
pub use secrets::{CredentialStore, SecretKind, SecretsError};

pub const APP_NAME: &str = "tidalink";
pub const APP_AUTHOR: &str = "Tidalink";
pub const APP_QUALIFIER: &str = "io";

/// Service name the host knows this catalog under.
pub const SERVICE_NAME: &str = "tidal";

/// Host-relative icon shown when the catalog has no artwork for an entity.
pub const DEFAULT_ICON: &str = "/albumart?sourceicon=music_service/tidal/default_icon.svg";

/// Host-relative icon for the browse source itself.
pub const SOURCE_ICON: &str = "/albumart?sourceicon=music_service/tidal/tidal.svg";
