use crate::models::QualityTier;
use crate::paths::AppDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

const CURRENT_CONFIG_VERSION: u32 = 1;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_config_version")]
    pub config_version: u32,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub account: AccountConfig,
    #[serde(default)]
    pub catalog: CatalogConfig,
    #[serde(default)]
    pub daemon: DaemonConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            config_version: default_config_version(),
            logging: LoggingConfig::default(),
            account: AccountConfig::default(),
            catalog: CatalogConfig::default(),
            daemon: DaemonConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: LogLevel,
    #[serde(default = "default_max_log_files")]
    pub max_log_files: usize,
    /// Where console log lines go; the file log is always written.
    #[serde(default)]
    pub console: ConsoleSink,
    #[serde(default)]
    pub file_name: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            max_log_files: default_max_log_files(),
            console: ConsoleSink::default(),
            file_name: None,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ConsoleSink {
    #[default]
    Stdout,
    /// Keeps stdout free for the plugin protocol.
    Stderr,
    Off,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_filter_directive(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

/// Saved account. The password is kept in the OS keyring, not here.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct AccountConfig {
    #[serde(default)]
    pub username: String,
    /// Catalog API token sent as `X-Tidal-Token`.
    #[serde(default)]
    pub token: String,
    /// One of LOW, HIGH, LOSSLESS, HI_RES.
    #[serde(default)]
    pub quality: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CatalogConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_country_code")]
    pub country_code: String,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    #[serde(default = "default_page_limit")]
    pub page_limit: u32,
    #[serde(default = "default_search_limit")]
    pub search_limit: u32,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            country_code: default_country_code(),
            request_timeout_secs: default_request_timeout_secs(),
            page_limit: default_page_limit(),
            search_limit: default_search_limit(),
        }
    }
}

impl CatalogConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DaemonConfig {
    #[serde(default = "default_daemon_host")]
    pub host: String,
    #[serde(default = "default_daemon_port")]
    pub port: u16,
    #[serde(default = "default_daemon_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for DaemonConfig {
    fn default() -> Self {
        Self {
            host: default_daemon_host(),
            port: default_daemon_port(),
            timeout_secs: default_daemon_timeout_secs(),
        }
    }
}

impl DaemonConfig {
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.max(1))
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config at {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse config at {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("config validation failed: {0}")]
    Validation(ValidationError),
    #[error("failed to prepare configuration directories: {0}")]
    Directories(#[from] crate::paths::DirsError),
}

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("unsupported config_version {found}, expected {expected}")]
    UnsupportedVersion { found: u32, expected: u32 },
    #[error("invalid account quality: {0}")]
    Quality(#[from] crate::models::UnknownQualityTier),
    #[error("catalog.page_limit must be greater than zero")]
    ZeroPageLimit,
}

impl Config {
    pub fn load_or_default(dirs: &AppDirs) -> Result<Self, ConfigError> {
        dirs.ensure_exists()?;
        Self::load_from(&Self::config_path(dirs))
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Config = toml::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate().map_err(ConfigError::Validation)?;
        Ok(config)
    }

    pub fn save(&self, dirs: &AppDirs) -> Result<(), ConfigError> {
        dirs.ensure_exists()?;
        self.save_to(&Self::config_path(dirs))
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let contents = toml::to_string_pretty(self)?;
        fs::write(path, contents).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::debug!(path = %path.display(), "saved configuration");
        Ok(())
    }

    pub fn config_path(dirs: &AppDirs) -> PathBuf {
        dirs.config_dir().join("config.toml")
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.config_version != CURRENT_CONFIG_VERSION {
            return Err(ValidationError::UnsupportedVersion {
                found: self.config_version,
                expected: CURRENT_CONFIG_VERSION,
            });
        }
        // An empty quality means "not configured yet", which is allowed.
        if !self.account.quality.trim().is_empty() {
            self.account.quality.parse::<QualityTier>()?;
        }
        if self.catalog.page_limit == 0 {
            return Err(ValidationError::ZeroPageLimit);
        }
        Ok(())
    }
}

fn default_config_version() -> u32 {
    CURRENT_CONFIG_VERSION
}

fn default_log_level() -> LogLevel {
    LogLevel::Info
}

fn default_max_log_files() -> usize {
    7
}

fn default_base_url() -> String {
    "https://api.tidalhifi.com/v1/".into()
}

fn default_country_code() -> String {
    "US".into()
}

fn default_request_timeout_secs() -> u64 {
    15
}

fn default_page_limit() -> u32 {
    50
}

fn default_search_limit() -> u32 {
    10
}

fn default_daemon_host() -> String {
    "127.0.0.1".into()
}

fn default_daemon_port() -> u16 {
    6600
}

fn default_daemon_timeout_secs() -> u64 {
    5
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.logging.max_log_files, 7);
        assert_eq!(config.logging.console, ConsoleSink::Stdout);
        assert_eq!(config.logging.level, LogLevel::Info);
        assert_eq!(config.catalog.search_limit, 10);
        assert_eq!(config.daemon.address(), "127.0.0.1:6600");
    }

    #[test]
    fn invalid_version_rejected() {
        let mut config = Config::default();
        config.config_version = CURRENT_CONFIG_VERSION + 1;
        let result = config.validate();
        assert!(matches!(
            result,
            Err(ValidationError::UnsupportedVersion { .. })
        ));
    }

    #[test]
    fn unknown_quality_rejected() {
        let mut config = Config::default();
        config.account.quality = "ULTRA".into();
        assert!(matches!(config.validate(), Err(ValidationError::Quality(_))));
    }

    #[test]
    fn partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            "config_version = 1\n[account]\nusername = \"listener\"\nquality = \"HI_RES\"\n[daemon]\nport = 6601\n",
        )
        .unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.account.username, "listener");
        assert_eq!(config.account.token, "");
        assert_eq!(config.daemon.port, 6601);
        assert_eq!(config.daemon.host, "127.0.0.1");
        assert_eq!(config.catalog.base_url, "https://api.tidalhifi.com/v1/");
    }

    #[test]
    fn save_then_load_keeps_account() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let mut config = Config::default();
        config.account = AccountConfig {
            username: "listener".into(),
            token: "wc8j_yBJd20zOmx0".into(),
            quality: "LOSSLESS".into(),
        };
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.account, config.account);
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config.config_version, CURRENT_CONFIG_VERSION);
    }
}
