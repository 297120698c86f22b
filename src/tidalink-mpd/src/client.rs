use crate::protocol::{parse_greeting, parse_line, ProtocolError, ReplyLine};
use async_trait::async_trait;
use std::time::Duration;
use tidalink_core::config::DaemonConfig;
use tidalink_core::daemon::{DaemonBridge, DaemonCommand, DaemonError, DaemonResult, DaemonStatus};
use tidalink_core::redact::redact_secrets;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;
use tokio::sync::Mutex;
use tokio::time::timeout;
use tracing::{debug, info, warn};

/// Attempts per command: the first on the cached connection, one more after reconnecting.
const MAX_ATTEMPTS: usize = 2;

struct Connection {
    reader: BufReader<OwnedReadHalf>,
    writer: OwnedWriteHalf,
}

/// MPD client that connects on first use and reconnects once when the
/// daemon has dropped the connection.
pub struct MpdClient {
    address: String,
    timeout: Duration,
    connection: Mutex<Option<Connection>>,
}

impl MpdClient {
    pub fn new(config: &DaemonConfig) -> Self {
        Self::with_address(config.address(), config.timeout())
    }

    pub fn with_address(address: impl Into<String>, timeout: Duration) -> Self {
        Self {
            address: address.into(),
            timeout,
            connection: Mutex::new(None),
        }
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    /// Run one command and return its `key: value` reply pairs.
    ///
    /// The connection is taken out of the slot for the duration of the
    /// exchange and only put back once the reply has been read in full. A
    /// caller that drops this future mid-exchange therefore drops the socket
    /// too, and the next command starts on a fresh connection.
    pub async fn command(&self, command: &DaemonCommand) -> DaemonResult<Vec<(String, String)>> {
        command.check_arguments()?;
        let mut slot = self.connection.lock().await;
        let mut attempt = 0;
        loop {
            attempt += 1;
            let mut conn = match slot.take() {
                Some(conn) => conn,
                None => self.connect().await?,
            };

            match self.exchange(&mut conn, command).await {
                Ok(pairs) => {
                    *slot = Some(conn);
                    return Ok(pairs);
                }
                Err(err @ DaemonError::Command { .. }) => {
                    *slot = Some(conn);
                    return Err(err);
                }
                Err(err @ DaemonError::Timeout { .. }) => return Err(err),
                Err(err) => {
                    if attempt >= MAX_ATTEMPTS {
                        return Err(err);
                    }
                    warn!(address = %self.address, error = %err, "daemon connection lost; reconnecting");
                }
            }
        }
    }

    async fn connect(&self) -> DaemonResult<Connection> {
        let stream = timeout(self.timeout, TcpStream::connect(&self.address))
            .await
            .map_err(|_| DaemonError::Unavailable {
                message: format!("connect to {} timed out", self.address),
            })?
            .map_err(|e| DaemonError::Unavailable {
                message: format!("connect to {} failed: {e}", self.address),
            })?;

        let (read_half, writer) = stream.into_split();
        let mut reader = BufReader::new(read_half);
        let mut greeting = String::new();
        let read = timeout(self.timeout, reader.read_line(&mut greeting))
            .await
            .map_err(|_| DaemonError::Unavailable {
                message: format!("no greeting from {}", self.address),
            })??;
        if read == 0 {
            return Err(DaemonError::Unavailable {
                message: format!("{} closed the connection", self.address),
            });
        }
        let version = parse_greeting(&greeting).map_err(protocol_error)?;
        info!(address = %self.address, version = %version, "connected to audio daemon");
        Ok(Connection { reader, writer })
    }

    async fn exchange(
        &self,
        conn: &mut Connection,
        command: &DaemonCommand,
    ) -> DaemonResult<Vec<(String, String)>> {
        let line = command.to_wire();
        debug!(command = %redact_secrets(&line), "daemon command");
        conn.writer.write_all(line.as_bytes()).await?;
        conn.writer.write_all(b"\n").await?;
        conn.writer.flush().await?;

        let mut pairs = Vec::new();
        loop {
            let mut reply = String::new();
            let read = timeout(self.timeout, conn.reader.read_line(&mut reply))
                .await
                .map_err(|_| DaemonError::Timeout {
                    command: command.name().to_string(),
                    after: self.timeout,
                })??;
            if read == 0 {
                return Err(DaemonError::Unavailable {
                    message: format!("{} closed the connection", self.address),
                });
            }
            match parse_line(&reply).map_err(protocol_error)? {
                ReplyLine::Pair(key, value) => pairs.push((key, value)),
                ReplyLine::Ok => return Ok(pairs),
                ReplyLine::Ack(ack) => {
                    return Err(DaemonError::Command {
                        code: ack.code,
                        command: ack.command,
                        message: ack.message,
                    })
                }
            }
        }
    }
}

fn protocol_error(err: ProtocolError) -> DaemonError {
    DaemonError::Protocol(err.to_string())
}

#[async_trait]
impl DaemonBridge for MpdClient {
    async fn send(&self, command: &DaemonCommand) -> DaemonResult<()> {
        self.command(command).await.map(|_| ())
    }

    async fn status(&self) -> DaemonResult<DaemonStatus> {
        let mut pairs = self.command(&DaemonCommand::Status).await?;
        pairs.extend(self.command(&DaemonCommand::CurrentSong).await?);
        Ok(DaemonStatus::from_pairs(pairs))
    }
}
