//! Audio daemon abstraction.
//!
//! The daemon speaks the MPD command protocol: one command per line, replies
//! are `key: value` lines terminated by `OK` or an `ACK` error line.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DaemonError {
    #[error("audio daemon unavailable: {message}")]
    Unavailable { message: String },
    #[error("daemon rejected '{command}' (code {code}): {message}")]
    Command {
        code: u32,
        command: String,
        message: String,
    },
    #[error("daemon protocol error: {0}")]
    Protocol(String),
    #[error("daemon call timed out after {after:?}: {command}")]
    Timeout { command: String, after: Duration },
    #[error("daemon io error: {0}")]
    Io(#[from] std::io::Error),
}

pub type DaemonResult<T> = Result<T, DaemonError>;

/// Transport commands issued to the daemon.
#[derive(Debug, Clone, PartialEq)]
pub enum DaemonCommand {
    Stop,
    Clear,
    /// Load a playlist-like URI into the queue.
    Load(String),
    /// Append a single stream/song URI to the queue.
    Add(String),
    Play,
    /// `true` pauses, `false` resumes.
    Pause(bool),
    /// Seek within the current song, in seconds.
    Seek(f64),
    Status,
    CurrentSong,
}

impl DaemonCommand {
    /// Render the command as a single protocol line (without newline).
    pub fn to_wire(&self) -> String {
        match self {
            DaemonCommand::Stop => "stop".into(),
            DaemonCommand::Clear => "clear".into(),
            DaemonCommand::Load(uri) => format!("load {}", quote_argument(uri)),
            DaemonCommand::Add(uri) => format!("add {}", quote_argument(uri)),
            DaemonCommand::Play => "play".into(),
            DaemonCommand::Pause(true) => "pause 1".into(),
            DaemonCommand::Pause(false) => "pause 0".into(),
            DaemonCommand::Seek(seconds) => format!("seekcur {:.3}", seconds.max(0.0)),
            DaemonCommand::Status => "status".into(),
            DaemonCommand::CurrentSong => "currentsong".into(),
        }
    }

    /// Reject arguments that would not survive as a single protocol line.
    pub fn check_arguments(&self) -> DaemonResult<()> {
        let argument = match self {
            DaemonCommand::Load(uri) | DaemonCommand::Add(uri) => uri,
            _ => return Ok(()),
        };
        if argument.chars().any(char::is_control) {
            return Err(DaemonError::Protocol(format!(
                "{} argument contains control characters",
                self.name()
            )));
        }
        Ok(())
    }

    /// Command name without arguments, used in logs and errors.
    pub fn name(&self) -> &'static str {
        match self {
            DaemonCommand::Stop => "stop",
            DaemonCommand::Clear => "clear",
            DaemonCommand::Load(_) => "load",
            DaemonCommand::Add(_) => "add",
            DaemonCommand::Play => "play",
            DaemonCommand::Pause(_) => "pause",
            DaemonCommand::Seek(_) => "seekcur",
            DaemonCommand::Status => "status",
            DaemonCommand::CurrentSong => "currentsong",
        }
    }
}

impl fmt::Display for DaemonCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

fn quote_argument(arg: &str) -> String {
    let mut quoted = String::with_capacity(arg.len() + 2);
    quoted.push('"');
    for c in arg.chars() {
        if c == '"' || c == '\\' {
            quoted.push('\\');
        }
        quoted.push(c);
    }
    quoted.push('"');
    quoted
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PlayState {
    Play,
    Pause,
    #[default]
    Stop,
}

/// Parsed daemon status merged with the current song, when available.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct DaemonStatus {
    pub state: PlayState,
    pub elapsed_seconds: Option<f64>,
    pub duration_seconds: Option<f64>,
    /// Queue position of the current song.
    pub song: Option<u32>,
    /// Instantaneous bitrate in kbps.
    pub bitrate: Option<u32>,
    /// `samplerate:bits:channels` as reported by the daemon.
    pub audio: Option<String>,
    pub volume: Option<i32>,
    pub file: Option<String>,
    pub title: Option<String>,
    pub artist: Option<String>,
    pub album: Option<String>,
}

impl DaemonStatus {
    /// Build a status from `key: value` reply pairs. Unknown keys are ignored.
    pub fn from_pairs<I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut status = DaemonStatus::default();
        let mut legacy_time: Option<(f64, f64)> = None;

        for (key, value) in pairs {
            let value = value.trim();
            match key.as_str() {
                "state" => {
                    status.state = match value {
                        "play" => PlayState::Play,
                        "pause" => PlayState::Pause,
                        _ => PlayState::Stop,
                    }
                }
                "elapsed" => status.elapsed_seconds = value.parse().ok(),
                "duration" => status.duration_seconds = value.parse().ok(),
                "time" => {
                    legacy_time = value.split_once(':').and_then(|(elapsed, total)| {
                        Some((elapsed.parse().ok()?, total.parse().ok()?))
                    })
                }
                "song" => status.song = value.parse().ok(),
                "bitrate" => status.bitrate = value.parse().ok(),
                "audio" => status.audio = Some(value.to_string()),
                "volume" => status.volume = value.parse().ok(),
                "file" => status.file = Some(value.to_string()),
                "Title" => status.title = Some(value.to_string()),
                "Artist" => status.artist = Some(value.to_string()),
                "Album" => status.album = Some(value.to_string()),
                _ => {}
            }
        }

        if let Some((elapsed, total)) = legacy_time {
            status.elapsed_seconds.get_or_insert(elapsed);
            status.duration_seconds.get_or_insert(total);
        }
        status
    }

    pub fn is_playing(&self) -> bool {
        self.state == PlayState::Play
    }
}

/// Command channel to the audio daemon shared by all host plugins.
#[async_trait]
pub trait DaemonBridge: Send + Sync {
    /// Send a transport command; the reply body is discarded.
    async fn send(&self, command: &DaemonCommand) -> DaemonResult<()>;

    /// Read `status` merged with `currentsong`.
    async fn status(&self) -> DaemonResult<DaemonStatus>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(raw: &str) -> DaemonStatus {
        DaemonStatus::from_pairs(raw.lines().filter_map(|line| {
            line.split_once(": ")
                .map(|(key, value)| (key.to_string(), value.to_string()))
        }))
    }

    #[test]
    fn commands_render_mpd_syntax() {
        assert_eq!(DaemonCommand::Stop.to_wire(), "stop");
        assert_eq!(DaemonCommand::Pause(true).to_wire(), "pause 1");
        assert_eq!(DaemonCommand::Pause(false).to_wire(), "pause 0");
        assert_eq!(DaemonCommand::Seek(12.5).to_wire(), "seekcur 12.500");
        assert_eq!(
            DaemonCommand::Add("https://sp.tidal.com/a.flac?token=x".into()).to_wire(),
            "add \"https://sp.tidal.com/a.flac?token=x\""
        );
    }

    #[test]
    fn arguments_escape_quotes_and_backslashes() {
        assert_eq!(
            DaemonCommand::Load(r#"a "b" \c"#.into()).to_wire(),
            r#"load "a \"b\" \\c""#
        );
    }

    #[test]
    fn line_breaks_in_arguments_are_rejected() {
        let split = DaemonCommand::Add("https://s/a.flac\nclear".into());
        assert!(matches!(
            split.check_arguments(),
            Err(DaemonError::Protocol(_))
        ));
        assert!(DaemonCommand::Load("https://s/a.flac\r".into())
            .check_arguments()
            .is_err());
        assert!(DaemonCommand::Load("https://s/a b.flac?x=\"1\"".into())
            .check_arguments()
            .is_ok());
        assert!(DaemonCommand::Play.check_arguments().is_ok());
    }

    #[test]
    fn timeouts_report_sub_second_durations() {
        let err = DaemonError::Timeout {
            command: "status".into(),
            after: Duration::from_millis(200),
        };
        assert!(err.to_string().contains("200ms"), "{err}");
    }

    #[test]
    fn negative_seek_is_clamped() {
        assert_eq!(DaemonCommand::Seek(-3.0).to_wire(), "seekcur 0.000");
    }

    #[test]
    fn parses_status_and_current_song() {
        let raw = "volume: 80\nstate: play\nsong: 0\nelapsed: 12.345\nduration: 200.100\nbitrate: 1411\naudio: 44100:16:2\nfile: https://stream/x.flac\nTitle: Song\nArtist: Someone\n";
        let status = parse(raw);
        assert!(status.is_playing());
        assert_eq!(status.volume, Some(80));
        assert_eq!(status.song, Some(0));
        assert_eq!(status.elapsed_seconds, Some(12.345));
        assert_eq!(status.duration_seconds, Some(200.1));
        assert_eq!(status.bitrate, Some(1411));
        assert_eq!(status.audio.as_deref(), Some("44100:16:2"));
        assert_eq!(status.title.as_deref(), Some("Song"));
        assert_eq!(status.album, None);
    }

    #[test]
    fn legacy_time_fills_missing_fields() {
        let status = parse("state: pause\ntime: 30:240\n");
        assert_eq!(status.state, PlayState::Pause);
        assert_eq!(status.elapsed_seconds, Some(30.0));
        assert_eq!(status.duration_seconds, Some(240.0));
    }

    #[test]
    fn empty_reply_is_stopped() {
        let status = parse("");
        assert_eq!(status.state, PlayState::Stop);
        assert!(!status.is_playing());
    }
}
