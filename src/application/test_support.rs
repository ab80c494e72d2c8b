//! Hand-written port mocks shared by the application tests

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use crate::domain::config::AppConfig;
use crate::domain::error::ConfigError;
use crate::domain::hotkey::KeyToken;
use crate::domain::playback::{ChannelIndex, SoundHandle};

use super::ports::{
    AudioBackend, AudioError, AudioLibrary, ConfigStore, KeySink, KeySource, KeySourceError,
    NotificationError, NotificationIcon, Notifier, SoundDecoder,
};

/// A sound of `ms` milliseconds (mono, 1kHz)
pub fn sound(name: &str, ms: u64) -> SoundHandle {
    SoundHandle::new(name, 1, 1_000, vec![0.0; ms as usize])
}

/// Records every call instead of producing audio
#[derive(Default)]
pub struct MockBackend {
    started: Vec<(ChannelIndex, String)>,
    released: Vec<ChannelIndex>,
    stop_all_calls: usize,
    fail_start: bool,
}

impl MockBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_start() -> Self {
        Self {
            fail_start: true,
            ..Self::new()
        }
    }

    pub fn started(&self) -> Vec<(ChannelIndex, String)> {
        self.started.clone()
    }

    pub fn released(&self) -> Vec<ChannelIndex> {
        self.released.clone()
    }

    pub fn stop_all_calls(&self) -> usize {
        self.stop_all_calls
    }
}

impl AudioBackend for MockBackend {
    fn start(&mut self, channel: ChannelIndex, sound: &SoundHandle) -> Result<(), AudioError> {
        if self.fail_start {
            return Err(AudioError::PlaybackFailed("device lost".to_string()));
        }
        self.started.push((channel, sound.name().to_string()));
        Ok(())
    }

    fn release(&mut self, channel: ChannelIndex) {
        self.released.push(channel);
    }

    fn stop_all(&mut self) {
        self.stop_all_calls += 1;
    }
}

/// Produces silent sounds named after the file, optionally slowly
pub struct MockDecoder {
    duration_ms: u64,
    delay: Duration,
    undecodable: HashSet<String>,
    calls: AtomicUsize,
}

impl MockDecoder {
    pub fn new() -> Self {
        Self {
            duration_ms: 1_000,
            delay: Duration::ZERO,
            undecodable: HashSet::new(),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn with_duration_ms(mut self, ms: u64) -> Self {
        self.duration_ms = ms;
        self
    }

    pub fn with_undecodable(mut self, name: &str) -> Self {
        self.undecodable.insert(name.to_string());
        self
    }

    /// Block the calling thread this long on every decode
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn shared(self) -> Arc<Self> {
        Arc::new(self)
    }
}

impl SoundDecoder for MockDecoder {
    fn decode(&self, path: &Path) -> Result<SoundHandle, AudioError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            std::thread::sleep(self.delay);
        }
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        if self.undecodable.contains(&name) {
            return Err(AudioError::Decode("unsupported format".to_string()));
        }
        Ok(sound(&name, self.duration_ms))
    }
}

/// Fixed list of files
pub struct MockLibrary {
    files: Vec<PathBuf>,
    base: PathBuf,
}

impl MockLibrary {
    pub fn new(files: &[&str]) -> Self {
        Self {
            files: files.iter().map(PathBuf::from).collect(),
            base: PathBuf::from("/sounds"),
        }
    }
}

impl AudioLibrary for MockLibrary {
    fn discover(&self) -> Vec<PathBuf> {
        self.files.clone()
    }

    fn base_dir(&self) -> &Path {
        &self.base
    }
}

#[derive(Default)]
struct KeySourceInner {
    sink: Mutex<Option<KeySink>>,
    subscribe_calls: AtomicUsize,
    failures_left: AtomicUsize,
}

/// In-memory key source; clones share the same slot
#[derive(Clone, Default)]
pub struct MockKeySource {
    inner: Arc<KeySourceInner>,
}

impl MockKeySource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next `n` subscribe calls fail
    pub fn fail_next(&self, n: usize) {
        self.inner.failures_left.store(n, Ordering::SeqCst);
    }

    pub fn subscribe_calls(&self) -> usize {
        self.inner.subscribe_calls.load(Ordering::SeqCst)
    }

    /// Deliver an event to the subscribed sink, if any
    pub fn emit(&self, token: KeyToken, pressed: bool) {
        let mut guard = self.inner.sink.lock().unwrap();
        if let Some(sink) = guard.as_mut() {
            sink(token, pressed);
        }
    }

    /// Press and release `tokens` as a chord
    pub fn tap(&self, tokens: &[KeyToken]) {
        for token in tokens {
            self.emit(token.clone(), true);
        }
        for token in tokens.iter().rev() {
            self.emit(token.clone(), false);
        }
    }
}

impl KeySource for MockKeySource {
    fn subscribe(&self, sink: KeySink) -> Result<(), KeySourceError> {
        self.inner.subscribe_calls.fetch_add(1, Ordering::SeqCst);
        let failures = self.inner.failures_left.load(Ordering::SeqCst);
        if failures > 0 {
            self.inner.failures_left.store(failures - 1, Ordering::SeqCst);
            return Err(KeySourceError::HookUnavailable("mock failure".to_string()));
        }
        let mut guard = self.inner.sink.lock().unwrap();
        if guard.is_some() {
            return Err(KeySourceError::AlreadySubscribed);
        }
        *guard = Some(sink);
        Ok(())
    }

    fn unsubscribe(&self) {
        *self.inner.sink.lock().unwrap() = None;
    }

    fn is_subscribed(&self) -> bool {
        self.inner.sink.lock().unwrap().is_some()
    }
}

/// In-memory config store
#[derive(Default)]
pub struct MockConfigStore {
    config: Mutex<AppConfig>,
    saves: AtomicUsize,
    fail_save: bool,
}

impl MockConfigStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_save() -> Self {
        Self {
            fail_save: true,
            ..Default::default()
        }
    }

    pub fn saved(&self) -> AppConfig {
        self.config.lock().unwrap().clone()
    }

    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ConfigStore for MockConfigStore {
    async fn load(&self) -> Result<AppConfig, ConfigError> {
        Ok(self.config.lock().unwrap().clone())
    }

    async fn save(&self, config: &AppConfig) -> Result<(), ConfigError> {
        if self.fail_save {
            return Err(ConfigError::WriteError("read-only file system".to_string()));
        }
        self.saves.fetch_add(1, Ordering::SeqCst);
        *self.config.lock().unwrap() = config.clone();
        Ok(())
    }

    fn path(&self) -> PathBuf {
        PathBuf::from("/mock/config.json")
    }

    fn exists(&self) -> bool {
        true
    }

    async fn init(&self) -> Result<(), ConfigError> {
        self.save(&AppConfig::defaults()).await
    }
}

/// Collects notifications
#[derive(Default)]
pub struct MockNotifier {
    sent: Mutex<Vec<(String, String)>>,
}

impl MockNotifier {
    pub fn sent(&self) -> Vec<(String, String)> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Notifier for MockNotifier {
    async fn notify(
        &self,
        title: &str,
        message: &str,
        _icon: NotificationIcon,
    ) -> Result<(), NotificationError> {
        self.sent
            .lock()
            .unwrap()
            .push((title.to_string(), message.to_string()));
        Ok(())
    }
}
