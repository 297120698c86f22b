//! Line-level parsing of MPD replies.

use thiserror::Error;

const GREETING_PREFIX: &str = "OK MPD ";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ProtocolError {
    #[error("unexpected greeting: {0}")]
    Greeting(String),
    #[error("malformed ACK line: {0}")]
    Ack(String),
    #[error("unexpected reply line: {0}")]
    Line(String),
}

/// A failed command as reported by `ACK [code@index] {command} message`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ack {
    pub code: u32,
    pub index: u32,
    pub command: String,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplyLine {
    Pair(String, String),
    Ok,
    Ack(Ack),
}

/// Protocol version advertised in the connection greeting.
pub fn parse_greeting(line: &str) -> Result<String, ProtocolError> {
    line.trim_end()
        .strip_prefix(GREETING_PREFIX)
        .map(str::to_string)
        .ok_or_else(|| ProtocolError::Greeting(line.trim_end().to_string()))
}

pub fn parse_line(line: &str) -> Result<ReplyLine, ProtocolError> {
    let line = line.trim_end_matches(['\r', '\n']);
    if line == "OK" {
        return Ok(ReplyLine::Ok);
    }
    if let Some(rest) = line.strip_prefix("ACK ") {
        return parse_ack(rest)
            .map(ReplyLine::Ack)
            .ok_or_else(|| ProtocolError::Ack(line.to_string()));
    }
    line.split_once(": ")
        .map(|(key, value)| ReplyLine::Pair(key.to_string(), value.to_string()))
        .ok_or_else(|| ProtocolError::Line(line.to_string()))
}

fn parse_ack(rest: &str) -> Option<Ack> {
    let rest = rest.strip_prefix('[')?;
    let (position, rest) = rest.split_once(']')?;
    let (code, index) = position.split_once('@')?;
    let rest = rest.trim_start().strip_prefix('{')?;
    let (command, message) = rest.split_once('}')?;
    Some(Ack {
        code: code.parse().ok()?,
        index: index.parse().ok()?,
        command: command.to_string(),
        message: message.trim().to_string(),
    })
}
