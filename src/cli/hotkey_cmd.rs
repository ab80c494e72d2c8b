//! Hotkey command handler

use thiserror::Error;
use tokio::sync::mpsc;

use crate::application::persist_chord;
use crate::application::ports::{ConfigStore, KeySource, KeySourceError};
use crate::domain::error::{ChordError, ConfigError};
use crate::domain::hotkey::{ChordDescriptor, HotkeyRecorder, KeyToken, RecorderUpdate};
use crate::infrastructure::RdevKeySource;

use super::app::{load_file_config, EXIT_ERROR, EXIT_USAGE_ERROR};
use super::args::HotkeyAction;
use super::presenter::Presenter;

/// Hotkey command errors
#[derive(Debug, Error)]
pub enum HotkeyCommandError {
    #[error(transparent)]
    Chord(#[from] ChordError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    KeySource(#[from] KeySourceError),

    #[error("Recording cancelled")]
    Cancelled,
}

impl HotkeyCommandError {
    /// Process exit code for this error
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::Chord(_) => EXIT_USAGE_ERROR,
            _ => EXIT_ERROR,
        }
    }
}

/// Handle hotkey subcommand
pub async fn handle_hotkey_command<S: ConfigStore>(
    action: HotkeyAction,
    store: &S,
    presenter: &mut Presenter,
) -> Result<(), HotkeyCommandError> {
    match action {
        HotkeyAction::Show => handle_show(store, presenter).await,
        HotkeyAction::Set { chord } => {
            let chord: ChordDescriptor = chord.parse()?;
            save(store, presenter, &chord).await
        }
        HotkeyAction::Reset => save(store, presenter, &ChordDescriptor::default_chord()).await,
        HotkeyAction::Record => {
            let source = RdevKeySource::new();
            let chord = record_chord(&source, presenter).await?;
            save(store, presenter, &chord).await
        }
    }
}

async fn handle_show<S: ConfigStore>(store: &S, presenter: &Presenter) -> Result<(), HotkeyCommandError> {
    let config = store.load().await?;
    let canonical = config.hotkey_or_default();

    match canonical.parse::<ChordDescriptor>() {
        Ok(chord) => {
            presenter.key_value("hotkey", &chord.canonical());
            presenter.key_value("hotkey_display", &chord.display());
        }
        Err(e) => {
            presenter.key_value("hotkey", canonical);
            presenter.key_value("hotkey_display", config.hotkey_display_or_default());
            presenter.warn(&format!("{} - the default hotkey will be used", e));
        }
    }
    Ok(())
}

async fn save<S: ConfigStore>(
    store: &S,
    presenter: &Presenter,
    chord: &ChordDescriptor,
) -> Result<(), HotkeyCommandError> {
    let mut config = load_file_config(store, presenter).await;
    persist_chord(store, &mut config, chord).await?;

    presenter.success(&format!("Hotkey saved: {}", chord.display()));
    if !chord.has_modifier() {
        presenter.warn(&modifierless_warning(chord));
    }
    Ok(())
}

/// Warning shown for chords without a modifier
pub fn modifierless_warning(chord: &ChordDescriptor) -> String {
    format!(
        "{} has no modifier key and may trigger while you type",
        chord.display()
    )
}

/// Capture one chord from the keyboard.
///
/// Finishes when every captured key has been released. Ctrl+C cancels.
pub async fn record_chord<K: KeySource>(
    source: &K,
    presenter: &mut Presenter,
) -> Result<ChordDescriptor, HotkeyCommandError> {
    let (tx, mut rx) = mpsc::unbounded_channel::<(KeyToken, bool)>();
    source.subscribe(Box::new(move |token, pressed| {
        let _ = tx.send((token, pressed));
    }))?;

    let mut recorder = HotkeyRecorder::new();
    recorder.start();
    presenter.start_spinner("Press the new hotkey, then release all keys...");

    let result = loop {
        tokio::select! {
            event = rx.recv() => {
                let Some((token, pressed)) = event else {
                    break Err(HotkeyCommandError::Cancelled);
                };
                match recorder.on_key_event(token, pressed) {
                    RecorderUpdate::Captured => presenter.update_spinner(&format!(
                        "Recording: {}",
                        recorder.current_display_string()
                    )),
                    RecorderUpdate::Completed => break recorder.finalize().map_err(Into::into),
                    RecorderUpdate::Released | RecorderUpdate::Ignored => {}
                }
            }
            _ = tokio::signal::ctrl_c() => break Err(HotkeyCommandError::Cancelled),
        }
    };

    source.unsubscribe();
    match &result {
        Ok(chord) => presenter.spinner_success(&format!("Captured: {}", chord.display())),
        Err(_) => presenter.spinner_fail("Recording cancelled"),
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::test_support::{MockConfigStore, MockKeySource};
    use crate::domain::hotkey::Modifier;

    #[tokio::test]
    async fn set_persists_canonical_and_display() {
        let store = MockConfigStore::new();
        let mut presenter = Presenter::new();

        handle_hotkey_command(
            HotkeyAction::Set {
                chord: "<shift>+<ctrl>+p".to_string(),
            },
            &store,
            &mut presenter,
        )
        .await
        .unwrap();

        let saved = store.saved();
        assert_eq!(saved.hotkey.as_deref(), Some("<ctrl>+<shift>+p"));
        assert_eq!(saved.hotkey_display.as_deref(), Some("Ctrl + Shift + P"));
    }

    #[tokio::test]
    async fn set_rejects_invalid_chord_as_usage_error() {
        let store = MockConfigStore::new();
        let mut presenter = Presenter::new();

        let err = handle_hotkey_command(
            HotkeyAction::Set {
                chord: "<ctrl>+<nope>".to_string(),
            },
            &store,
            &mut presenter,
        )
        .await
        .unwrap_err();

        assert_eq!(err.exit_code(), EXIT_USAGE_ERROR);
        assert_eq!(store.save_count(), 0);
    }

    #[tokio::test]
    async fn reset_persists_default() {
        let store = MockConfigStore::new();
        let mut presenter = Presenter::new();

        handle_hotkey_command(HotkeyAction::Reset, &store, &mut presenter)
            .await
            .unwrap();
        assert_eq!(store.saved().hotkey.as_deref(), Some("<ctrl>+<alt>"));
    }

    #[tokio::test]
    async fn save_failure_is_error() {
        let store = MockConfigStore::failing_save();
        let mut presenter = Presenter::new();

        let err = handle_hotkey_command(HotkeyAction::Reset, &store, &mut presenter)
            .await
            .unwrap_err();
        assert!(matches!(err, HotkeyCommandError::Config(_)));
        assert_eq!(err.exit_code(), EXIT_ERROR);
    }

    #[tokio::test]
    async fn record_captures_until_release() {
        let keys = MockKeySource::new();
        let emitter = keys.clone();
        tokio::spawn(async move {
            while !emitter.is_subscribed() {
                tokio::task::yield_now().await;
            }
            emitter.tap(&[
                KeyToken::named("ctrl_l"),
                KeyToken::named("ctrl_r"),
                Modifier::Alt.into(),
            ]);
        });

        let mut presenter = Presenter::new();
        let chord = record_chord(&keys, &mut presenter).await.unwrap();

        assert_eq!(chord.display(), "Ctrl + Alt");
        assert!(!keys.is_subscribed());
    }

    #[tokio::test]
    async fn record_fails_without_hook() {
        let keys = MockKeySource::new();
        keys.fail_next(1);
        let mut presenter = Presenter::new();

        let err = record_chord(&keys, &mut presenter).await.unwrap_err();
        assert!(matches!(err, HotkeyCommandError::KeySource(_)));
    }

    #[test]
    fn warning_names_chord() {
        let chord: ChordDescriptor = "q".parse().unwrap();
        assert!(modifierless_warning(&chord).starts_with("Q has no modifier"));
    }
}
