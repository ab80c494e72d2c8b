//! Random playback use case
//!
//! Picks a random file, reserves a free channel, decodes the file, starts it
//! and registers a session that frees the channel once the sound has finished.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use rand::seq::SliceRandom;
use thiserror::Error;

use crate::domain::playback::{ChannelIndex, SessionId, SessionTracker, SoundHandle};

use super::mixer::ChannelPool;
use super::ports::{decode_off_thread, AudioBackend, AudioError, AudioLibrary, SoundDecoder};

/// Errors from a playback request. The messages are user-facing status text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlaybackError {
    #[error("All channels are busy, please wait...")]
    ChannelExhausted,

    #[error("No audio files found! Put MP3/WAV/OGG/FLAC files in: {}", dir.display())]
    NoAudioFiles { dir: PathBuf },

    #[error("Playback failed: {file}\nError: {reason}")]
    DecodeOrPlaybackFailure { file: String, reason: String },
}

/// A sound that started playing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaybackStarted {
    /// File name of the sound
    pub file_name: String,
    /// Channel it was assigned
    pub channel: ChannelIndex,
    /// Session that will free the channel
    pub session: SessionId,
    /// Active sessions, including this one
    pub active: usize,
    /// Length of the sound
    pub duration: Duration,
}

/// A request holding a reserved channel while its file decodes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingPlay {
    /// Reserved channel
    pub channel: ChannelIndex,
    /// File being decoded
    pub path: PathBuf,
    /// File name shown to the user
    pub file_name: String,
}

/// Pick one path uniformly at random
pub fn pick_random(files: &[PathBuf]) -> Option<&PathBuf> {
    files.choose(&mut rand::thread_rng())
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string())
}

/// Overlapping playback engine: channel pool + session tracker + library.
///
/// A request runs in two steps. [`PlaybackEngine::begin_random`] reserves a
/// channel; the caller decodes the file off the event loop and hands the
/// result to [`PlaybackEngine::finish`], which starts output and registers
/// the session from the moment output began.
pub struct PlaybackEngine<B: AudioBackend, L: AudioLibrary> {
    pool: ChannelPool<B>,
    sessions: SessionTracker,
    decoder: Arc<dyn SoundDecoder>,
    library: L,
}

impl<B: AudioBackend, L: AudioLibrary> PlaybackEngine<B, L> {
    /// Create an engine with `channels` output channels and the given grace margin
    pub fn new(
        backend: B,
        decoder: Arc<dyn SoundDecoder>,
        library: L,
        channels: usize,
        grace: Duration,
    ) -> Self {
        Self {
            pool: ChannelPool::new(backend, channels),
            sessions: SessionTracker::new(grace),
            decoder,
            library,
        }
    }

    /// Pick a random file from the library and reserve a channel for it
    pub fn begin_random(&mut self) -> Result<PendingPlay, PlaybackError> {
        let files = self.library.discover();
        let path = pick_random(&files).ok_or_else(|| PlaybackError::NoAudioFiles {
            dir: self.library.base_dir().to_path_buf(),
        })?;
        self.begin_file(path)
    }

    /// Reserve a channel for one specific file
    pub fn begin_file(&mut self, path: &Path) -> Result<PendingPlay, PlaybackError> {
        let file_name = display_name(path);
        let Some(channel) = self.pool.acquire_channel() else {
            tracing::debug!(file = %file_name, "all {} channels busy", self.pool.capacity());
            return Err(PlaybackError::ChannelExhausted);
        };

        tracing::trace!(file = %file_name, %channel, "channel reserved");
        Ok(PendingPlay {
            channel,
            path: path.to_path_buf(),
            file_name,
        })
    }

    /// Decoder for pending requests
    pub fn decoder(&self) -> Arc<dyn SoundDecoder> {
        Arc::clone(&self.decoder)
    }

    /// Start a decoded sound on its reserved channel. A failed decode or a
    /// failed start gives the channel back and registers nothing.
    pub fn finish(
        &mut self,
        pending: PendingPlay,
        decoded: Result<SoundHandle, AudioError>,
    ) -> Result<PlaybackStarted, PlaybackError> {
        let PendingPlay {
            channel, file_name, ..
        } = pending;
        let failure = |reason: String| PlaybackError::DecodeOrPlaybackFailure {
            file: file_name.clone(),
            reason,
        };

        if !self.pool.is_reserved(channel) {
            // Shut down while decoding
            return Err(failure("playback was stopped".to_string()));
        }

        let sound = match decoded {
            Ok(sound) => sound,
            Err(e) => {
                self.pool.cancel(channel);
                return Err(failure(e.to_string()));
            }
        };

        let duration = sound.duration();
        self.pool
            .play(channel, sound.clone())
            .map_err(|e| failure(e.to_string()))?;

        let session = self.sessions.register(sound, channel, Instant::now());
        tracing::debug!(
            file = %file_name,
            %channel,
            %session,
            duration_ms = duration.as_millis() as u64,
            "playback started"
        );

        Ok(PlaybackStarted {
            file_name,
            channel,
            session,
            active: self.sessions.active_count(),
            duration,
        })
    }

    /// Play a randomly chosen file, decoding it on the blocking pool
    pub async fn play_random(&mut self) -> Result<PlaybackStarted, PlaybackError> {
        let pending = self.begin_random()?;
        let decoded = decode_off_thread(self.decoder(), pending.path.clone()).await;
        self.finish(pending, decoded)
    }

    /// Play one specific file, decoding it on the blocking pool
    pub async fn play_file(&mut self, path: &Path) -> Result<PlaybackStarted, PlaybackError> {
        let pending = self.begin_file(path)?;
        let decoded = decode_off_thread(self.decoder(), pending.path.clone()).await;
        self.finish(pending, decoded)
    }

    /// Retire every session whose expiry is at or before `now`, freeing its
    /// channel. Returns how many were retired.
    pub fn retire_due(&mut self, now: Instant) -> usize {
        let due = self.sessions.due(now);
        for id in &due {
            self.on_expire(*id);
        }
        due.len()
    }

    /// Retire one session and free its channel
    pub fn on_expire(&mut self, id: SessionId) -> bool {
        match self.sessions.expire(id) {
            Some(session) => {
                self.pool.release(session.channel);
                tracing::debug!(session = %id, channel = %session.channel, "session expired");
                true
            }
            None => false,
        }
    }

    /// Earliest pending expiry
    pub fn next_expiry(&self) -> Option<Instant> {
        self.sessions.next_expiry()
    }

    /// Number of sounds still playing. Reserved channels are not counted.
    pub fn active_count(&self) -> usize {
        self.sessions.active_count()
    }

    /// Pool size
    pub fn capacity(&self) -> usize {
        self.pool.capacity()
    }

    /// Files currently discoverable
    pub fn files(&self) -> Vec<PathBuf> {
        self.library.discover()
    }

    /// Primary directory searched for files
    pub fn base_dir(&self) -> &Path {
        self.library.base_dir()
    }

    /// Cancel all pending expiries without reporting them, then silence and
    /// release every channel.
    pub fn shutdown(&mut self) {
        let cleared = self.sessions.reset();
        self.pool.stop_all();
        tracing::debug!(cleared, "playback engine shut down");
    }

    /// Access the channel pool
    pub fn pool(&self) -> &ChannelPool<B> {
        &self.pool
    }
}
