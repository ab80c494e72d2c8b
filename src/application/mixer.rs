//! Channel pool mixer
//!
//! Owns a fixed number of playback channels on top of an [`AudioBackend`].
//! A channel is claimed by [`ChannelPool::acquire_channel`] and stays busy
//! until [`ChannelPool::cancel`] or [`ChannelPool::release`]; the pool never
//! frees a channel on its own.

use crate::domain::playback::{ChannelIndex, SoundHandle};

use super::ports::{AudioBackend, AudioError};

#[derive(Debug, Clone)]
enum Slot {
    Free,
    /// Claimed while its sound decodes
    Reserved,
    Playing(SoundHandle),
}

/// Fixed-size set of playback channels
pub struct ChannelPool<B: AudioBackend> {
    backend: B,
    slots: Vec<Slot>,
}

impl<B: AudioBackend> ChannelPool<B> {
    /// Create a pool with `capacity` channels (at least one)
    pub fn new(backend: B, capacity: usize) -> Self {
        Self {
            backend,
            slots: vec![Slot::Free; capacity.max(1)],
        }
    }

    /// Number of channels in the pool
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Number of channels reserved or playing
    pub fn busy_count(&self) -> usize {
        self.slots
            .iter()
            .filter(|slot| !matches!(slot, Slot::Free))
            .count()
    }

    /// Check if a channel is reserved or playing
    pub fn is_busy(&self, channel: ChannelIndex) -> bool {
        self.slots
            .get(channel.get())
            .is_some_and(|slot| !matches!(slot, Slot::Free))
    }

    /// Check if a channel is claimed but not yet playing
    pub fn is_reserved(&self, channel: ChannelIndex) -> bool {
        matches!(self.slots.get(channel.get()), Some(Slot::Reserved))
    }

    /// Claim the lowest free channel, or `None` if every channel is busy
    pub fn acquire_channel(&mut self) -> Option<ChannelIndex> {
        let index = self
            .slots
            .iter()
            .position(|slot| matches!(slot, Slot::Free))?;
        self.slots[index] = Slot::Reserved;
        Some(ChannelIndex::new(index))
    }

    /// Give back a reserved channel that will not be played
    pub fn cancel(&mut self, channel: ChannelIndex) {
        if let Some(slot) = self.slots.get_mut(channel.get()) {
            if matches!(slot, Slot::Reserved) {
                *slot = Slot::Free;
            }
        }
    }

    /// Start `sound` on `channel`. The channel stays busy until released;
    /// on failure it is free again.
    pub fn play(&mut self, channel: ChannelIndex, sound: SoundHandle) -> Result<(), AudioError> {
        let slot = self.slots.get_mut(channel.get()).ok_or_else(|| {
            AudioError::PlaybackFailed(format!("channel {} is out of range", channel))
        })?;
        if matches!(slot, Slot::Playing(_)) {
            return Err(AudioError::PlaybackFailed(format!(
                "channel {} is already playing",
                channel
            )));
        }

        if let Err(e) = self.backend.start(channel, &sound) {
            *slot = Slot::Free;
            return Err(e);
        }
        *slot = Slot::Playing(sound);
        Ok(())
    }

    /// Free a playing channel for reuse, returning the sound it held
    pub fn release(&mut self, channel: ChannelIndex) -> Option<SoundHandle> {
        let slot = self.slots.get_mut(channel.get())?;
        if !matches!(slot, Slot::Playing(_)) {
            return None;
        }
        match std::mem::replace(slot, Slot::Free) {
            Slot::Playing(sound) => {
                self.backend.release(channel);
                Some(sound)
            }
            _ => None,
        }
    }

    /// Silence every channel and drop all assignments and reservations
    pub fn stop_all(&mut self) {
        self.backend.stop_all();
        self.slots.iter_mut().for_each(|slot| *slot = Slot::Free);
    }

    /// Access the backend
    pub fn backend(&self) -> &B {
        &self.backend
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::test_support::{sound, MockBackend};

    #[test]
    fn acquire_returns_lowest_free_channel() {
        let mut pool = ChannelPool::new(MockBackend::new(), 3);
        assert_eq!(pool.acquire_channel(), Some(ChannelIndex::new(0)));
        pool.play(ChannelIndex::new(0), sound("a", 10)).unwrap();

        assert_eq!(pool.acquire_channel(), Some(ChannelIndex::new(1)));
        pool.play(ChannelIndex::new(1), sound("b", 10)).unwrap();

        pool.release(ChannelIndex::new(0));
        assert_eq!(pool.acquire_channel(), Some(ChannelIndex::new(0)));
    }

    #[test]
    fn reservation_blocks_channel_until_cancelled() {
        let mut pool = ChannelPool::new(MockBackend::new(), 2);
        let first = pool.acquire_channel().unwrap();
        let second = pool.acquire_channel().unwrap();

        assert_ne!(first, second);
        assert!(pool.is_reserved(first));
        assert_eq!(pool.busy_count(), 2);
        assert_eq!(pool.acquire_channel(), None);
        assert!(pool.backend().started().is_empty());

        pool.cancel(first);
        assert!(!pool.is_busy(first));
        assert_eq!(pool.acquire_channel(), Some(first));
    }

    #[test]
    fn cancel_does_not_touch_playing_channel() {
        let mut pool = ChannelPool::new(MockBackend::new(), 1);
        let channel = pool.acquire_channel().unwrap();
        pool.play(channel, sound("a", 10)).unwrap();

        pool.cancel(channel);
        assert!(pool.is_busy(channel));
        assert!(!pool.is_reserved(channel));
    }

    #[test]
    fn distinct_channels_until_exhausted() {
        let mut pool = ChannelPool::new(MockBackend::new(), 4);
        let mut seen = Vec::new();
        for i in 0..4 {
            let channel = pool.acquire_channel().unwrap();
            assert!(!seen.contains(&channel));
            seen.push(channel);
            pool.play(channel, sound(&format!("s{}", i), 10)).unwrap();
        }
        assert_eq!(pool.busy_count(), 4);
        assert_eq!(pool.acquire_channel(), None);
    }

    #[test]
    fn play_on_busy_channel_fails() {
        let mut pool = ChannelPool::new(MockBackend::new(), 1);
        pool.play(ChannelIndex::new(0), sound("a", 10)).unwrap();
        assert!(pool.play(ChannelIndex::new(0), sound("b", 10)).is_err());
        assert_eq!(pool.backend().started().len(), 1);
    }

    #[test]
    fn play_out_of_range_fails() {
        let mut pool = ChannelPool::new(MockBackend::new(), 1);
        assert!(pool.play(ChannelIndex::new(5), sound("a", 10)).is_err());
    }

    #[test]
    fn backend_failure_leaves_channel_free() {
        let mut pool = ChannelPool::new(MockBackend::failing_start(), 2);
        let channel = pool.acquire_channel().unwrap();
        assert!(pool.play(channel, sound("a", 10)).is_err());
        assert!(!pool.is_busy(channel));
        assert_eq!(pool.acquire_channel(), Some(channel));
    }

    #[test]
    fn release_returns_sound_and_tells_backend() {
        let mut pool = ChannelPool::new(MockBackend::new(), 2);
        pool.play(ChannelIndex::new(1), sound("a", 10)).unwrap();

        let released = pool.release(ChannelIndex::new(1)).unwrap();
        assert_eq!(released.name(), "a");
        assert_eq!(pool.backend().released(), vec![ChannelIndex::new(1)]);
        assert!(pool.release(ChannelIndex::new(1)).is_none());
    }

    #[test]
    fn release_ignores_reservation() {
        let mut pool = ChannelPool::new(MockBackend::new(), 1);
        let channel = pool.acquire_channel().unwrap();

        assert!(pool.release(channel).is_none());
        assert!(pool.is_reserved(channel));
        assert!(pool.backend().released().is_empty());
    }

    #[test]
    fn stop_all_frees_everything() {
        let mut pool = ChannelPool::new(MockBackend::new(), 3);
        pool.play(ChannelIndex::new(0), sound("a", 10)).unwrap();
        pool.play(ChannelIndex::new(1), sound("b", 10)).unwrap();
        let pending = pool.acquire_channel().unwrap();

        pool.stop_all();
        assert_eq!(pool.busy_count(), 0);
        assert!(!pool.is_reserved(pending));
        assert_eq!(pool.backend().stop_all_calls(), 1);
    }

    #[test]
    fn zero_capacity_is_clamped() {
        let pool = ChannelPool::new(MockBackend::new(), 0);
        assert_eq!(pool.capacity(), 1);
    }
}
