use crate::config::{ConsoleSink, LoggingConfig};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_subscriber::fmt::writer::{BoxMakeWriter, MakeWriterExt};
use tracing_subscriber::{fmt, EnvFilter};

const DEFAULT_LOG_FILE: &str = "tidalink.log";

/// Keeps the background file writer alive; drop it last.
pub struct LoggingGuard {
    _file_guard: WorkerGuard,
    log_dir: PathBuf,
}

impl LoggingGuard {
    pub fn log_dir(&self) -> &Path {
        &self.log_dir
    }
}

/// Install the global subscriber: a daily rolling file in `log_dir` plus the
/// configured console sink. `RUST_LOG` overrides the configured level.
pub fn init_logging(config: &LoggingConfig, log_dir: &Path) -> Result<LoggingGuard, LoggingError> {
    fs::create_dir_all(log_dir).map_err(|source| LoggingError::CreateDirectory {
        path: log_dir.to_path_buf(),
        source,
    })?;

    let env_filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(config.level.as_filter_directive()).map_err(|source| {
            LoggingError::ParseLevel {
                level: config.level.as_filter_directive().to_string(),
                source,
            }
        })?,
    };

    let (file, file_guard) = build_file_writer(config, log_dir)?;
    let writer = match config.console {
        ConsoleSink::Stdout => BoxMakeWriter::new(std::io::stdout.and(file)),
        ConsoleSink::Stderr => BoxMakeWriter::new(std::io::stderr.and(file)),
        ConsoleSink::Off => BoxMakeWriter::new(file),
    };

    fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_ansi(false)
        .with_writer(writer)
        .try_init()
        .map_err(LoggingError::SubscriberInstall)?;

    Ok(LoggingGuard {
        _file_guard: file_guard,
        log_dir: log_dir.to_path_buf(),
    })
}

fn build_file_writer(
    config: &LoggingConfig,
    log_dir: &Path,
) -> Result<(NonBlocking, WorkerGuard), LoggingError> {
    let file_stem = config.file_name.as_deref().unwrap_or(DEFAULT_LOG_FILE);
    prune_old_logs(log_dir, file_stem, config.max_log_files.max(1))?;

    let appender = tracing_appender::rolling::daily(log_dir, file_stem);
    Ok(tracing_appender::non_blocking(appender))
}

/// Remove the oldest rotated files so at most `keep` remain.
fn prune_old_logs(dir: &Path, file_stem: &str, keep: usize) -> Result<(), LoggingError> {
    let mut entries: Vec<_> = fs::read_dir(dir)
        .map_err(|source| LoggingError::ReadDir {
            path: dir.to_path_buf(),
            source,
        })?
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_name().to_string_lossy().starts_with(file_stem))
        .filter_map(|entry| {
            let modified = entry.metadata().ok()?.modified().ok()?;
            Some((entry.path(), modified))
        })
        .collect();

    if entries.len() <= keep {
        return Ok(());
    }

    entries.sort_by_key(|(_, modified)| *modified);
    let excess = entries.len() - keep;
    for (path, _) in entries.into_iter().take(excess) {
        fs::remove_file(&path).map_err(|source| LoggingError::Cleanup { path, source })?;
    }
    Ok(())
}

#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("failed to create log directory {path}: {source}")]
    CreateDirectory {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse log level {level}: {source}")]
    ParseLevel {
        level: String,
        source: tracing_subscriber::filter::ParseError,
    },
    #[error("failed to install tracing subscriber: {0}")]
    SubscriberInstall(Box<dyn std::error::Error + Send + Sync>),
    #[error("failed to list log directory {path}: {source}")]
    ReadDir {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to remove old log file {path}: {source}")]
    Cleanup {
        path: PathBuf,
        source: std::io::Error,
    },
}
