//! Port interfaces (traits) for external systems
//!
//! These traits define the boundaries between the application
//! and infrastructure layers.

pub mod audio;
pub mod config;
pub mod keyboard;
pub mod library;
pub mod notifier;

// Re-export common types
pub use audio::{decode_off_thread, AudioBackend, AudioError, SoundDecoder};
pub use config::ConfigStore;
pub use keyboard::{KeySink, KeySource, KeySourceError};
pub use library::{is_audio_file, AudioLibrary, AUDIO_EXTENSIONS};
pub use notifier::{NotificationError, NotificationIcon, Notifier};
