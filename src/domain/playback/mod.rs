//! Playback domain: decoded sounds and in-flight session bookkeeping

mod session;
mod sound;

pub use session::{PlaybackSession, SessionId, SessionTracker};
pub use sound::{ChannelIndex, SoundHandle};

/// Default number of playback channels in the pool
pub const DEFAULT_CHANNELS: usize = 32;

/// Default slack added to a sound's duration before its session expires
pub const DEFAULT_GRACE_MS: u64 = 100;
