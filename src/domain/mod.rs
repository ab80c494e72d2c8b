//! Domain layer - Core playback and hotkey logic
//!
//! Contains value objects, state machines, and domain errors.
//! This layer has no dependencies on external systems.

pub mod config;
pub mod error;
pub mod hotkey;
pub mod playback;

// Re-export common types
pub use config::AppConfig;
pub use error::*;
pub use hotkey::{ChordDescriptor, ChordMatcher, HotkeyRecorder, KeyToken, Modifier};
pub use playback::{ChannelIndex, PlaybackSession, SessionId, SessionTracker, SoundHandle};
