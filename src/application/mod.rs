//! Application layer - Use cases and port interfaces
//!
//! Contains the core playback and hotkey operations and trait definitions
//! for external system interactions.

pub mod context;
pub mod hotkey_config;
pub mod listener;
pub mod mixer;
pub mod player;
pub mod ports;

#[cfg(test)]
pub(crate) mod test_support;

// Re-export use cases
pub use context::{AppContext, AppEvent};
pub use hotkey_config::{apply_chord, apply_recorded, persist_chord, ApplyError, ApplyReport};
pub use listener::{Activation, InstallOutcome, ListenerError, ListenerManager};
pub use mixer::ChannelPool;
pub use player::{pick_random, PendingPlay, PlaybackEngine, PlaybackError, PlaybackStarted};
