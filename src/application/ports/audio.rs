//! Audio ports: file decoding and per-channel output

use std::path::{Path, PathBuf};
use std::sync::Arc;

use thiserror::Error;

use crate::domain::playback::{ChannelIndex, SoundHandle};

/// Errors that can occur while decoding or playing audio
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AudioError {
    /// The file could not be opened
    #[error("Cannot open file: {0}")]
    Io(String),

    /// The file could not be decoded
    #[error("Decode failed: {0}")]
    Decode(String),

    /// Output on a channel could not be started
    #[error("Playback failed: {0}")]
    PlaybackFailed(String),

    /// No audio output device available
    #[error("Audio device not available: {0}")]
    DeviceNotAvailable(String),
}

/// Port trait for turning a file into decoded audio.
///
/// Decoding reads and converts the whole file, so callers on the main
/// thread run it through [`decode_off_thread`].
pub trait SoundDecoder: Send + Sync {
    /// Decode a file into a sound handle
    fn decode(&self, path: &Path) -> Result<SoundHandle, AudioError>;
}

/// Decode `path` on the blocking thread pool
pub async fn decode_off_thread(
    decoder: Arc<dyn SoundDecoder>,
    path: PathBuf,
) -> Result<SoundHandle, AudioError> {
    tokio::task::spawn_blocking(move || decoder.decode(&path))
        .await
        .map_err(|e| AudioError::Decode(format!("Decoder task failed: {}", e)))?
}

/// Port trait for the underlying mixer.
///
/// Implementations own one output slot per channel index. `start` must not
/// block until the sound ends.
pub trait AudioBackend {
    /// Begin playing `sound` on `channel`, replacing whatever the slot held
    fn start(&mut self, channel: ChannelIndex, sound: &SoundHandle) -> Result<(), AudioError>;

    /// Silence and release one channel's output slot
    fn release(&mut self, channel: ChannelIndex);

    /// Silence and release every output slot
    fn stop_all(&mut self);
}
