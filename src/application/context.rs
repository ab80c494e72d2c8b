//! Process-wide application context
//!
//! One owned aggregate holding the playback engine, the listener manager,
//! the recorder and the loaded configuration. Built once at startup and
//! driven from the main thread only.

use std::sync::Arc;
use std::time::Instant;

use crate::domain::config::AppConfig;
use crate::domain::hotkey::{ChordDescriptor, HotkeyRecorder, KeyToken, RecorderUpdate};
use crate::domain::playback::SoundHandle;

use super::hotkey_config::{apply_chord, apply_recorded, persist_chord, ApplyError, ApplyReport};
use super::listener::{InstallOutcome, ListenerError, ListenerManager};
use super::player::{PendingPlay, PlaybackEngine, PlaybackError, PlaybackStarted};
use super::ports::{
    AudioBackend, AudioError, AudioLibrary, ConfigStore, KeySink, KeySource, SoundDecoder,
};

/// Events posted to the main loop from other threads and tasks
#[derive(Debug, Clone)]
pub enum AppEvent {
    /// The global chord was satisfied
    HotkeyActivated,
    /// A key event captured while recording a new chord
    RecorderKey { token: KeyToken, pressed: bool },
    /// A pending request finished decoding
    Decoded {
        pending: PendingPlay,
        decoded: Result<SoundHandle, AudioError>,
    },
}

/// Owned aggregate of the core components
pub struct AppContext<B: AudioBackend, L: AudioLibrary, K: KeySource> {
    engine: PlaybackEngine<B, L>,
    listener: ListenerManager<K>,
    recorder: HotkeyRecorder,
    store: Box<dyn ConfigStore>,
    config: AppConfig,
}

impl<B: AudioBackend, L: AudioLibrary, K: KeySource> AppContext<B, L, K> {
    pub fn new(
        engine: PlaybackEngine<B, L>,
        listener: ListenerManager<K>,
        store: Box<dyn ConfigStore>,
        config: AppConfig,
    ) -> Self {
        Self {
            engine,
            listener,
            recorder: HotkeyRecorder::new(),
            store,
            config,
        }
    }

    /// Install the configured chord. A fallback to the default chord is
    /// persisted so the broken value is not loaded again.
    pub async fn install_configured_hotkey(&mut self) -> Result<ApplyReport, ApplyError> {
        let canonical = self.config.hotkey_or_default().to_string();
        let outcome = self.listener.install_from_config(&canonical)?;
        let chord = outcome.chord().clone();

        let persist_error = if outcome.fell_back() {
            persist_chord(self.store.as_ref(), &mut self.config, &chord)
                .await
                .err()
        } else {
            // Keep the display form in step with the canonical one
            self.config.set_hotkey(&chord);
            None
        };

        Ok(ApplyReport {
            modifierless: !chord.has_modifier(),
            outcome,
            persist_error,
        })
    }

    /// Reserve a channel for one random file; decode it with [`Self::decoder`]
    /// and pass the result to [`Self::finish_play`].
    pub fn begin_play(&mut self) -> Result<PendingPlay, PlaybackError> {
        self.engine.begin_random()
    }

    /// Start a decoded request on its reserved channel
    pub fn finish_play(
        &mut self,
        pending: PendingPlay,
        decoded: Result<SoundHandle, AudioError>,
    ) -> Result<PlaybackStarted, PlaybackError> {
        self.engine.finish(pending, decoded)
    }

    pub fn decoder(&self) -> Arc<dyn SoundDecoder> {
        self.engine.decoder()
    }

    /// Play one random file, waiting for its decode
    pub async fn play(&mut self) -> Result<PlaybackStarted, PlaybackError> {
        self.engine.play_random().await
    }

    /// Retire sessions that are due
    pub fn retire_due(&mut self, now: Instant) -> usize {
        self.engine.retire_due(now)
    }

    pub fn next_expiry(&self) -> Option<Instant> {
        self.engine.next_expiry()
    }

    pub fn active_count(&self) -> usize {
        self.engine.active_count()
    }

    pub fn engine(&self) -> &PlaybackEngine<B, L> {
        &self.engine
    }

    pub fn listener(&self) -> &ListenerManager<K> {
        &self.listener
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Chord currently listening, if any
    pub fn active_chord(&self) -> Option<&ChordDescriptor> {
        self.listener.active_chord()
    }

    /// Start recording a new chord; key events go to `sink` until the
    /// recording is applied or cancelled.
    pub fn start_recording(&mut self, sink: KeySink) -> Result<(), ListenerError> {
        self.listener.begin_capture(sink)?;
        self.recorder.start();
        Ok(())
    }

    pub fn is_recording(&self) -> bool {
        self.recorder.is_recording()
    }

    /// Check if a recording is in progress or waiting to be applied
    pub fn has_pending_recording(&self) -> bool {
        self.listener.is_capturing()
    }

    /// Feed a captured key event to the recorder
    pub fn on_recorder_key(&mut self, token: KeyToken, pressed: bool) -> RecorderUpdate {
        let update = self.recorder.on_key_event(token, pressed);
        if update == RecorderUpdate::Completed {
            tracing::debug!(captured = %self.recorder.current_display_string(), "recording complete");
        }
        update
    }

    /// Display string of what has been captured so far
    pub fn recorded_display(&self) -> String {
        self.recorder.current_display_string()
    }

    /// Stop capturing without applying
    pub fn stop_recording(&mut self) {
        self.recorder.stop();
    }

    /// Discard the recording and reinstall the previous chord
    pub fn cancel_recording(&mut self) -> Result<Option<InstallOutcome>, ListenerError> {
        self.recorder.cancel();
        self.listener.end_capture()
    }

    /// Apply and persist the recorded chord
    pub async fn apply_recording(&mut self) -> Result<ApplyReport, ApplyError> {
        apply_recorded(
            &mut self.listener,
            &mut self.recorder,
            self.store.as_ref(),
            &mut self.config,
        )
        .await
    }

    /// Apply and persist `chord`
    pub async fn apply_hotkey(&mut self, chord: &ChordDescriptor) -> Result<ApplyReport, ApplyError> {
        self.recorder.stop();
        apply_chord(&mut self.listener, self.store.as_ref(), &mut self.config, chord).await
    }

    /// Apply and persist the built-in default chord
    pub async fn reset_hotkey(&mut self) -> Result<ApplyReport, ApplyError> {
        self.apply_hotkey(&ChordDescriptor::default_chord()).await
    }

    /// Ordered teardown: stop the listener, clear pending expiries, then
    /// silence and release every channel.
    pub fn shutdown(&mut self) {
        self.recorder.stop();
        self.listener.uninstall();
        self.engine.shutdown();
        tracing::debug!("context shut down");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::listener::Activation;
    use crate::application::test_support::{
        MockBackend, MockConfigStore, MockDecoder, MockKeySource, MockLibrary,
    };
    use crate::domain::hotkey::Modifier;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use std::time::Duration;

    type Ctx = AppContext<MockBackend, MockLibrary, MockKeySource>;

    fn context(config: AppConfig) -> (Ctx, MockKeySource, Arc<AtomicUsize>) {
        let keys = MockKeySource::new();
        let count = Arc::new(AtomicUsize::new(0));
        let c = Arc::clone(&count);
        let activate: Activation = Arc::new(move || {
            c.fetch_add(1, Ordering::SeqCst);
        });
        let engine = PlaybackEngine::new(
            MockBackend::new(),
            MockDecoder::new().with_duration_ms(200).shared(),
            MockLibrary::new(&["a.mp3", "b.wav"]),
            2,
            Duration::from_millis(100),
        );
        let listener = ListenerManager::new(keys.clone(), activate);
        let ctx = AppContext::new(engine, listener, Box::new(MockConfigStore::new()), config);
        (ctx, keys, count)
    }

    fn ctrl_alt() -> Vec<KeyToken> {
        vec![Modifier::Ctrl.into(), Modifier::Alt.into()]
    }

    #[tokio::test]
    async fn installs_configured_hotkey() {
        let config = AppConfig {
            hotkey: Some("<alt>+q".to_string()),
            ..Default::default()
        };
        let (mut ctx, keys, count) = context(config);

        let report = ctx.install_configured_hotkey().await.unwrap();
        assert!(!report.outcome.fell_back());
        assert_eq!(ctx.config().hotkey_display.as_deref(), Some("Alt + Q"));

        keys.tap(&[Modifier::Alt.into(), KeyToken::char('q')]);
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn corrupt_hotkey_falls_back_and_is_replaced() {
        let config = AppConfig {
            hotkey: Some("<ctrl>++".to_string()),
            ..Default::default()
        };
        let (mut ctx, _, _) = context(config);

        let report = ctx.install_configured_hotkey().await.unwrap();
        assert!(report.outcome.fell_back());
        assert!(report.persist_error.is_none());
        assert_eq!(ctx.config().hotkey.as_deref(), Some("<ctrl>+<alt>"));
    }

    #[tokio::test]
    async fn play_and_expire_through_context() {
        let (mut ctx, _, _) = context(AppConfig::defaults());
        let before = Instant::now();

        ctx.play().await.unwrap();
        ctx.play().await.unwrap();
        assert_eq!(ctx.play().await, Err(PlaybackError::ChannelExhausted));
        assert_eq!(ctx.active_count(), 2);

        let expiry = ctx.next_expiry().unwrap();
        assert!(expiry >= before + Duration::from_millis(300));
        assert_eq!(ctx.retire_due(expiry + Duration::from_secs(1)), 2);
        assert_eq!(ctx.active_count(), 0);
    }

    #[tokio::test]
    async fn split_play_reserves_then_starts() {
        let (mut ctx, _, _) = context(AppConfig::defaults());

        let pending = ctx.begin_play().unwrap();
        assert_eq!(ctx.active_count(), 0);
        assert!(ctx.engine().pool().is_reserved(pending.channel));

        let decoded = ctx.decoder().decode(&pending.path);
        let started = ctx.finish_play(pending, decoded).unwrap();
        assert_eq!(ctx.active_count(), 1);
        assert_eq!(started.active, 1);
    }

    #[tokio::test]
    async fn record_and_apply_flow() {
        let (mut ctx, keys, count) = context(AppConfig::defaults());
        ctx.install_configured_hotkey().await.unwrap();

        let events = Arc::new(Mutex::new(Vec::new()));
        let sink_events = Arc::clone(&events);
        ctx.start_recording(Box::new(move |token, pressed| {
            sink_events
                .lock()
                .unwrap()
                .push(AppEvent::RecorderKey { token, pressed });
        }))
        .unwrap();
        assert!(ctx.is_recording());

        keys.tap(&[Modifier::Win.into(), KeyToken::char('r')]);
        // Chord listener is suspended while recording
        assert_eq!(count.load(Ordering::SeqCst), 0);

        let captured: Vec<AppEvent> = events.lock().unwrap().drain(..).collect();
        let mut last = RecorderUpdate::Ignored;
        for event in captured {
            if let AppEvent::RecorderKey { token, pressed } = event {
                last = ctx.on_recorder_key(token, pressed);
            }
        }
        assert_eq!(last, RecorderUpdate::Completed);
        assert_eq!(ctx.recorded_display(), "Win + R");

        let report = ctx.apply_recording().await.unwrap();
        assert_eq!(report.chord().canonical(), "<cmd>+r");
        assert!(!ctx.has_pending_recording());

        keys.tap(&[Modifier::Win.into(), KeyToken::char('r')]);
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn cancel_recording_restores_previous_chord() {
        let (mut ctx, keys, count) = context(AppConfig::defaults());
        ctx.install_configured_hotkey().await.unwrap();

        ctx.start_recording(Box::new(|_, _| {})).unwrap();
        ctx.on_recorder_key(KeyToken::char('z'), true);
        ctx.cancel_recording().unwrap();

        assert!(!ctx.is_recording());
        assert_eq!(ctx.recorded_display(), "");
        keys.tap(&ctrl_alt());
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn reset_hotkey_applies_default() {
        let config = AppConfig {
            hotkey: Some("<alt>+q".to_string()),
            ..Default::default()
        };
        let (mut ctx, _, _) = context(config);
        ctx.install_configured_hotkey().await.unwrap();

        let report = ctx.reset_hotkey().await.unwrap();
        assert_eq!(report.chord(), &ChordDescriptor::default_chord());
        assert_eq!(ctx.config().hotkey.as_deref(), Some("<ctrl>+<alt>"));
    }

    #[tokio::test]
    async fn shutdown_releases_everything_in_order() {
        let (mut ctx, keys, count) = context(AppConfig::defaults());
        ctx.install_configured_hotkey().await.unwrap();
        ctx.play().await.unwrap();

        ctx.shutdown();

        assert!(!keys.is_subscribed());
        assert!(ctx.active_chord().is_none());
        assert_eq!(ctx.active_count(), 0);
        assert!(ctx.next_expiry().is_none());
        assert_eq!(ctx.engine().pool().busy_count(), 0);
        assert_eq!(ctx.engine().pool().backend().stop_all_calls(), 1);

        keys.tap(&ctrl_alt());
        assert_eq!(count.load(Ordering::SeqCst), 0);
    }
}
