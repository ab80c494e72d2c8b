//! Hotkey reconfiguration use case
//!
//! Applies a chord to the live listener and writes it back to the config
//! store. The in-memory chord stays active even if the write fails.

use thiserror::Error;

use crate::domain::config::AppConfig;
use crate::domain::error::ConfigError;
use crate::domain::hotkey::{ChordDescriptor, HotkeyRecorder};

use super::listener::{InstallOutcome, ListenerError, ListenerManager};
use super::ports::{ConfigStore, KeySource};

/// Errors that leave the previous chord in effect (or no chord at all, for
/// a fatal listener failure)
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApplyError {
    #[error("No keys captured - the previous hotkey stays active")]
    EmptyChord,

    #[error(transparent)]
    Listener(#[from] ListenerError),
}

/// What happened when a chord was applied
#[derive(Debug, Clone)]
pub struct ApplyReport {
    /// The install result; holds the chord that is now active
    pub outcome: InstallOutcome,
    /// The applied chord has no modifier and may trigger while typing
    pub modifierless: bool,
    /// Set when the chord could not be written back
    pub persist_error: Option<ConfigError>,
}

impl ApplyReport {
    pub fn chord(&self) -> &ChordDescriptor {
        self.outcome.chord()
    }
}

/// Store `chord` in `config` and write the whole record back
pub async fn persist_chord<C: ConfigStore + ?Sized>(
    store: &C,
    config: &mut AppConfig,
    chord: &ChordDescriptor,
) -> Result<(), ConfigError> {
    config.set_hotkey(chord);
    store.save(config).await?;
    tracing::debug!(hotkey = %chord, path = %store.path().display(), "hotkey saved");
    Ok(())
}

/// Install `chord` and persist whichever chord ended up active.
///
/// If the install falls back to the default chord, the default is persisted
/// so the next start does not fail the same way.
pub async fn apply_chord<K: KeySource, C: ConfigStore + ?Sized>(
    listener: &mut ListenerManager<K>,
    store: &C,
    config: &mut AppConfig,
    chord: &ChordDescriptor,
) -> Result<ApplyReport, ApplyError> {
    let outcome = listener.install(chord)?;
    let active = outcome.chord().clone();

    let modifierless = !active.has_modifier();
    if modifierless {
        tracing::warn!(hotkey = %active, "hotkey has no modifier and may trigger while typing");
    }

    let persist_error = match persist_chord(store, config, &active).await {
        Ok(()) => None,
        Err(e) => {
            tracing::warn!(error = %e, "hotkey applied but could not be saved");
            Some(e)
        }
    };

    Ok(ApplyReport {
        outcome,
        modifierless,
        persist_error,
    })
}

/// Apply what the recorder captured.
///
/// An empty capture is refused and the suspended chord is reinstalled.
pub async fn apply_recorded<K: KeySource, C: ConfigStore + ?Sized>(
    listener: &mut ListenerManager<K>,
    recorder: &mut HotkeyRecorder,
    store: &C,
    config: &mut AppConfig,
) -> Result<ApplyReport, ApplyError> {
    recorder.stop();
    match recorder.finalize() {
        Ok(chord) => apply_chord(listener, store, config, &chord).await,
        Err(_) => {
            listener.end_capture()?;
            Err(ApplyError::EmptyChord)
        }
    }
}
