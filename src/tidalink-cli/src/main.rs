use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use tidal_provider::{TidalClientFactory, TidalConfig};
use tidalink_browse::{AdapterSettings, CatalogAdapter};
use tidalink_core::catalog::Credentials;
use tidalink_core::config::{Config, ConsoleSink};
use tidalink_core::daemon::DaemonStatus;
use tidalink_core::host::Host;
use tidalink_core::models::{BrowseSource, QualityTier};
use tidalink_core::{init_logging, AppDirs, CredentialStore, SERVICE_NAME};
use tidalink_mpd::MpdClient;
use tidalink_plugin::{AccountStore, LineSink, PluginServer, SavedAccount, StdioHost};
use tracing::info;

#[derive(Debug, Parser)]
#[command(name = "tidalink", version, about = "TIDAL catalog browsing and playback for MPD hosts")]
struct Cli {
    /// Keep config and logs under this directory instead of the platform default
    #[arg(long, global = true)]
    root: Option<PathBuf>,
    /// Audio daemon address override, as host:port
    #[arg(long, global = true)]
    daemon: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Serve the host plugin protocol on stdin/stdout
    Serve,
    /// Print the navigation list for a location
    Browse {
        #[arg(default_value = "tidal")]
        uri: String,
    },
    /// Search artists, tracks and albums
    Search {
        #[arg(required = true)]
        query: Vec<String>,
    },
    /// Resolve a track location into its stream and metadata
    Resolve { uri: String },
    /// Replace the daemon queue with a track location or stream URL and play it
    Play { uri: String },
    /// Append a stream URL to the daemon queue
    Enqueue { uri: String },
    Stop,
    Pause,
    Resume,
    /// Seek within the current track
    Seek {
        /// Position in seconds
        seconds: f64,
    },
    /// Print the daemon's playback status
    Status,
    /// Save the account; the password goes to the OS keyring
    Login {
        username: String,
        /// API token sent with every catalog request
        #[arg(long)]
        token: String,
        /// LOW, HIGH, LOSSLESS or HI_RES
        #[arg(long, default_value = "LOSSLESS")]
        quality: String,
        /// Read from stdin when omitted
        #[arg(long)]
        password: Option<String>,
    },
    /// Forget the saved password
    Logout,
    /// Show the saved account without secrets
    Account,
}

impl Command {
    /// Commands that need a catalog session before they run.
    fn needs_session(&self) -> bool {
        matches!(
            self,
            Command::Browse { .. }
                | Command::Search { .. }
                | Command::Resolve { .. }
                | Command::Play { .. }
        )
    }
}

/// Stdout carries command output, so console logs move to stderr. In serve
/// mode stdout is the protocol stream and console logging is off.
fn console_for(command: &Command, sink: ConsoleSink) -> ConsoleSink {
    match (command, sink) {
        (Command::Serve, ConsoleSink::Stdout) => ConsoleSink::Off,
        (_, ConsoleSink::Stdout) => ConsoleSink::Stderr,
        (_, other) => other,
    }
}

fn parse_daemon_address(address: &str) -> Result<(String, u16)> {
    let Some((host, port)) = address.rsplit_once(':') else {
        bail!("daemon address must be host:port, got '{address}'");
    };
    if host.is_empty() {
        bail!("daemon address is missing a host: '{address}'");
    }
    let port = port
        .parse()
        .with_context(|| format!("invalid daemon port in '{address}'"))?;
    Ok((host.to_string(), port))
}

fn seek_millis(seconds: f64) -> u64 {
    (seconds.max(0.0) * 1000.0).round() as u64
}

/// Host stand-in for one-shot commands: capability calls only reach the log.
struct ConsoleHost;

#[async_trait]
impl Host for ConsoleHost {
    fn register_browse_source(&self, source: &BrowseSource) {
        info!(uri = %source.uri, "browse source available");
    }

    fn remove_browse_source(&self, uri: &str) {
        info!(uri, "browse source withdrawn");
    }

    async fn sync_state(&self, status: &DaemonStatus, service: &str) {
        info!(service, state = ?status.state, "playback state");
    }

    async fn push_state(&self, status: &DaemonStatus, service: &str) {
        info!(service, state = ?status.state, "playback state pushed");
    }

    fn set_consume_update_service(&self, _service: &str) {}
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let mut stdout = std::io::stdout().lock();
    serde_json::to_writer_pretty(&mut stdout, value)?;
    writeln!(stdout)?;
    Ok(())
}

fn read_password() -> Result<String> {
    eprint!("Password: ");
    std::io::stderr().flush()?;
    let mut line = String::new();
    std::io::stdin()
        .read_line(&mut line)
        .context("failed to read password from stdin")?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let dirs = match &cli.root {
        Some(root) => AppDirs::rooted_at(root),
        None => AppDirs::discover()?,
    };
    let mut config = Config::load_or_default(&dirs)?;
    if let Some(address) = &cli.daemon {
        let (host, port) = parse_daemon_address(address)?;
        config.daemon.host = host;
        config.daemon.port = port;
    }
    config.logging.console = console_for(&cli.command, config.logging.console);
    let _logging = init_logging(&config.logging, dirs.log_dir())?;

    let account = Arc::new(SavedAccount::new(
        dirs.clone(),
        config.clone(),
        CredentialStore::new(SERVICE_NAME),
    ));

    let command = match cli.command {
        Command::Login {
            username,
            token,
            quality,
            password,
        } => return login(account.as_ref(), username, token, quality, password),
        Command::Logout => {
            account.forget_password()?;
            println!("Saved password removed");
            return Ok(());
        }
        Command::Account => return print_json(&account.view()?),
        other => other,
    };

    let sink = LineSink::stdout();
    let host: Arc<dyn Host> = match command {
        Command::Serve => Arc::new(StdioHost::new(sink.clone())),
        _ => Arc::new(ConsoleHost),
    };
    let adapter = Arc::new(CatalogAdapter::new(
        Arc::new(TidalClientFactory::new(TidalConfig::from(&config.catalog))),
        host,
        Arc::new(MpdClient::new(&config.daemon)),
        AdapterSettings::from(&config),
    ));

    if command.needs_session() && !adapter.on_start(&account.load()?).await? {
        info!("no complete saved account; only the root menu is available");
    }

    match command {
        Command::Serve => {
            info!(config_dir = %dirs.config_dir().display(), "serving host plugin protocol");
            PluginServer::new(adapter, account, sink).serve_stdio().await?;
        }
        Command::Browse { uri } => match adapter.browse(&uri).await? {
            Some(navigation) => print_json(&navigation)?,
            None => bail!("'{uri}' is not a browseable location"),
        },
        Command::Search { query } => print_json(&adapter.search(&query.join(" ")).await?)?,
        Command::Resolve { uri } => match adapter.resolve_playable(&uri).await? {
            Some(descriptor) => print_json(&descriptor)?,
            None => bail!("'{uri}' is not a track location"),
        },
        Command::Play { uri } => print_json(&adapter.clear_add_play_track(&uri).await?)?,
        Command::Enqueue { uri } => adapter.enqueue(&uri).await?,
        Command::Stop => adapter.stop().await?,
        Command::Pause => adapter.pause().await?,
        Command::Resume => adapter.resume().await?,
        Command::Seek { seconds } => adapter.seek(seek_millis(seconds)).await?,
        Command::Status => print_json(&adapter.state().await?)?,
        Command::Login { .. } | Command::Logout | Command::Account => {}
    }

    Ok(())
}

fn login(
    account: &SavedAccount,
    username: String,
    token: String,
    quality: String,
    password: Option<String>,
) -> Result<()> {
    quality.parse::<QualityTier>()?;
    let password = match password {
        Some(password) => password,
        None => read_password()?,
    };
    let credentials = Credentials::new(username, password, token, quality);
    if !credentials.is_complete() {
        bail!("username, password, token and quality are all required");
    }
    account.save(&credentials)?;
    println!("Saved account for {}", credentials.username);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn browse_defaults_to_root() {
        let cli = Cli::try_parse_from(["tidalink", "browse"]).unwrap();
        match cli.command {
            Command::Browse { uri } => assert_eq!(uri, "tidal"),
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn search_words_and_global_flags() {
        let cli = Cli::try_parse_from([
            "tidalink",
            "search",
            "nils",
            "frahm",
            "--daemon",
            "volumio.local:6600",
        ])
        .unwrap();
        assert_eq!(cli.daemon.as_deref(), Some("volumio.local:6600"));
        match cli.command {
            Command::Search { query } => assert_eq!(query.join(" "), "nils frahm"),
            other => panic!("unexpected command {other:?}"),
        }
        assert!(Cli::try_parse_from(["tidalink", "search"]).is_err());
    }

    #[test]
    fn login_defaults_quality() {
        let cli = Cli::try_parse_from(["tidalink", "login", "listener", "--token", "t"]).unwrap();
        match cli.command {
            Command::Login {
                username,
                quality,
                password,
                ..
            } => {
                assert_eq!(username, "listener");
                assert_eq!(quality, "LOSSLESS");
                assert!(password.is_none());
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn only_catalog_commands_need_a_session() {
        let play = Cli::try_parse_from(["tidalink", "play", "tidal:track:1"]).unwrap();
        assert!(play.command.needs_session());
        let pause = Cli::try_parse_from(["tidalink", "pause"]).unwrap();
        assert!(!pause.command.needs_session());
        let serve = Cli::try_parse_from(["tidalink", "serve"]).unwrap();
        assert!(!serve.command.needs_session());
    }

    #[test]
    fn daemon_address_parsing() {
        assert_eq!(
            parse_daemon_address("127.0.0.1:6601").unwrap(),
            ("127.0.0.1".to_string(), 6601)
        );
        assert!(parse_daemon_address("localhost").is_err());
        assert!(parse_daemon_address(":6600").is_err());
        assert!(parse_daemon_address("host:port").is_err());
    }

    #[test]
    fn seek_seconds_become_millis() {
        assert_eq!(seek_millis(90.5), 90_500);
        assert_eq!(seek_millis(-3.0), 0);
    }

    #[test]
    fn stdout_logging_stays_off_the_output_stream() {
        assert_eq!(
            console_for(&Command::Status, ConsoleSink::Stdout),
            ConsoleSink::Stderr
        );
        assert_eq!(console_for(&Command::Serve, ConsoleSink::Stdout), ConsoleSink::Off);
        assert_eq!(
            console_for(&Command::Serve, ConsoleSink::Stderr),
            ConsoleSink::Stderr
        );
    }
}
