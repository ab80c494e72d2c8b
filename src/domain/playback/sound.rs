//! Decoded sound value object

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// Index of a playback channel in the pool
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChannelIndex(usize);

impl ChannelIndex {
    /// Wrap a raw channel index
    pub const fn new(index: usize) -> Self {
        Self(index)
    }

    /// Get the raw index
    pub const fn get(&self) -> usize {
        self.0
    }
}

impl fmt::Display for ChannelIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Decoded, interleaved audio ready to be handed to an output channel.
///
/// Immutable once created. Cloning shares the sample buffer, so a handle can
/// be given to the mixer and to the session tracker without copying audio.
#[derive(Clone)]
pub struct SoundHandle {
    name: String,
    channels: u16,
    sample_rate: u32,
    samples: Arc<[f32]>,
    duration: Duration,
}

impl SoundHandle {
    /// Create a handle from interleaved `f32` samples.
    ///
    /// The duration is derived from the sample count, so it is exact even for
    /// formats whose headers do not report a length.
    pub fn new(name: impl Into<String>, channels: u16, sample_rate: u32, samples: Vec<f32>) -> Self {
        let frames_per_sec = u64::from(channels.max(1)) * u64::from(sample_rate.max(1));
        let nanos = (samples.len() as u128 * 1_000_000_000) / u128::from(frames_per_sec);
        Self {
            name: name.into(),
            channels,
            sample_rate,
            samples: samples.into(),
            duration: Duration::from_nanos(nanos.min(u128::from(u64::MAX)) as u64),
        }
    }

    /// Display name (usually the file name)
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of interleaved channels
    pub fn channels(&self) -> u16 {
        self.channels
    }

    /// Sample rate in Hz
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Interleaved samples
    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    /// Shared handle to the sample buffer
    pub fn shared_samples(&self) -> Arc<[f32]> {
        Arc::clone(&self.samples)
    }

    /// Playback length
    pub fn duration(&self) -> Duration {
        self.duration
    }
}

impl fmt::Debug for SoundHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SoundHandle")
            .field("name", &self.name)
            .field("channels", &self.channels)
            .field("sample_rate", &self.sample_rate)
            .field("samples", &self.samples.len())
            .field("duration", &self.duration)
            .finish()
    }
}
