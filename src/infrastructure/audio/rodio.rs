//! Rodio-based audio backend
//!
//! Decodes files fully into memory and plays each channel on its own
//! `rodio::Sink`, all mixed into one output stream. Sinks read straight from
//! the decoded buffer without copying it.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use rodio::{Decoder, OutputStream, OutputStreamHandle, Sink, Source};

use crate::application::ports::{AudioBackend, AudioError, SoundDecoder};
use crate::domain::playback::{ChannelIndex, SoundHandle};

/// Audio backend on the default output device.
///
/// Holds the output stream, which must stay on the thread that opened it.
pub struct RodioBackend {
    _stream: OutputStream,
    handle: OutputStreamHandle,
    sinks: Vec<Option<Sink>>,
}

impl RodioBackend {
    /// Open the default output device
    pub fn new() -> Result<Self, AudioError> {
        let (stream, handle) = OutputStream::try_default()
            .map_err(|e| AudioError::DeviceNotAvailable(e.to_string()))?;

        Ok(Self {
            _stream: stream,
            handle,
            sinks: Vec::new(),
        })
    }

    fn slot(&mut self, channel: ChannelIndex) -> &mut Option<Sink> {
        let index = channel.get();
        if self.sinks.len() <= index {
            self.sinks.resize_with(index + 1, || None);
        }
        &mut self.sinks[index]
    }
}

/// Decode a file into interleaved `f32` samples
pub fn decode_file(path: &Path) -> Result<SoundHandle, AudioError> {
    let file = File::open(path).map_err(|e| AudioError::Io(e.to_string()))?;
    let decoder = Decoder::new(BufReader::new(file)).map_err(|e| AudioError::Decode(e.to_string()))?;

    let channels = decoder.channels();
    let sample_rate = decoder.sample_rate();
    let samples: Vec<f32> = decoder.convert_samples::<f32>().collect();

    if samples.is_empty() {
        return Err(AudioError::Decode("file contains no audio".to_string()));
    }

    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string());

    Ok(SoundHandle::new(name, channels, sample_rate, samples))
}

/// File decoder backed by rodio's format support
#[derive(Debug, Clone, Copy, Default)]
pub struct RodioDecoder;

impl SoundDecoder for RodioDecoder {
    fn decode(&self, path: &Path) -> Result<SoundHandle, AudioError> {
        decode_file(path)
    }
}

/// Source reading from a sound's shared sample buffer
struct SharedSamples {
    samples: Arc<[f32]>,
    pos: usize,
    channels: u16,
    sample_rate: u32,
    duration: Duration,
}

impl SharedSamples {
    fn new(sound: &SoundHandle) -> Self {
        Self {
            samples: sound.shared_samples(),
            pos: 0,
            channels: sound.channels(),
            sample_rate: sound.sample_rate(),
            duration: sound.duration(),
        }
    }
}

impl Iterator for SharedSamples {
    type Item = f32;

    fn next(&mut self) -> Option<f32> {
        let sample = self.samples.get(self.pos).copied()?;
        self.pos += 1;
        Some(sample)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.samples.len() - self.pos;
        (remaining, Some(remaining))
    }
}

impl Source for SharedSamples {
    fn current_frame_len(&self) -> Option<usize> {
        Some(self.samples.len() - self.pos)
    }

    fn channels(&self) -> u16 {
        self.channels
    }

    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    fn total_duration(&self) -> Option<Duration> {
        Some(self.duration)
    }
}

impl AudioBackend for RodioBackend {
    fn start(&mut self, channel: ChannelIndex, sound: &SoundHandle) -> Result<(), AudioError> {
        let sink = Sink::try_new(&self.handle).map_err(|e| AudioError::PlaybackFailed(e.to_string()))?;
        sink.append(SharedSamples::new(sound));

        // Replacing the slot drops (and silences) any previous sink
        if let Some(old) = self.slot(channel).replace(sink) {
            old.stop();
        }
        Ok(())
    }

    fn release(&mut self, channel: ChannelIndex) {
        if let Some(sink) = self.slot(channel).take() {
            sink.stop();
        }
    }

    fn stop_all(&mut self) {
        for sink in self.sinks.iter_mut().filter_map(Option::take) {
            sink.stop();
        }
    }
}
