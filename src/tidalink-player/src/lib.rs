mod bridge;

pub use bridge::{PlaybackBridge, DEFAULT_DAEMON_TIMEOUT};
