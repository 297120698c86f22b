//! Async client for the audio daemon's MPD command protocol.

mod client;
mod protocol;

pub use client::MpdClient;
pub use protocol::{Ack, ProtocolError, ReplyLine};
