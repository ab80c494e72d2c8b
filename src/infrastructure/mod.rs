//! Infrastructure layer - Adapter implementations
//!
//! Contains concrete implementations of the port interfaces,
//! integrating with the audio device, the OS keyboard hook, the file system
//! and the desktop notification service.

pub mod audio;
pub mod config;
pub mod keyboard;
pub mod library;
pub mod notification;

// Re-export adapters
pub use audio::{RodioBackend, RodioDecoder};
pub use config::JsonConfigStore;
pub use keyboard::RdevKeySource;
pub use library::FsAudioLibrary;
pub use notification::{create_notifier, NoOpNotifier, NotifyRustNotifier};
