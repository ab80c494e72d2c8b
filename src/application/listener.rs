//! Listener lifecycle manager
//!
//! Owns the single system-wide key subscription. Installing a chord always
//! removes the previous listener first, so there is never more than one
//! active. While a new chord is being recorded the chord listener is
//! suspended and a capture sink takes its place.

use std::sync::Arc;

use thiserror::Error;

use crate::domain::error::ChordError;
use crate::domain::hotkey::{ChordDescriptor, ChordMatcher};

use super::ports::{KeySink, KeySource, KeySourceError};

/// Called on the hook thread each time the active chord is satisfied
pub type Activation = Arc<dyn Fn() + Send + Sync>;

/// Listener errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ListenerError {
    #[error("Invalid hotkey '{input}': {source}")]
    InvalidChord { input: String, source: ChordError },

    #[error("Failed to install hotkey {chord}: {source}")]
    InstallFailed { chord: String, source: KeySourceError },

    /// Neither the requested chord nor the default chord could be bound
    #[error("Global hotkey unavailable: {primary}; default hotkey also failed: {fallback}")]
    Fatal { primary: String, fallback: String },
}

/// Result of a successful install
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstallOutcome {
    /// The requested chord is active
    Installed(ChordDescriptor),
    /// The requested chord failed; the default chord is active instead
    FellBack {
        chord: ChordDescriptor,
        error: ListenerError,
    },
}

impl InstallOutcome {
    /// The chord that is now listening
    pub fn chord(&self) -> &ChordDescriptor {
        match self {
            Self::Installed(chord) | Self::FellBack { chord, .. } => chord,
        }
    }

    pub fn fell_back(&self) -> bool {
        matches!(self, Self::FellBack { .. })
    }
}

/// Start/stop/replace of the one active key listener
pub struct ListenerManager<K: KeySource> {
    source: K,
    on_activate: Activation,
    active: Option<ChordDescriptor>,
    suspended: Option<ChordDescriptor>,
    capturing: bool,
}

impl<K: KeySource> ListenerManager<K> {
    pub fn new(source: K, on_activate: Activation) -> Self {
        Self {
            source,
            on_activate,
            active: None,
            suspended: None,
            capturing: false,
        }
    }

    /// Replace the active listener with one bound to `chord`.
    ///
    /// On failure the default chord is installed instead and the failure is
    /// reported in [`InstallOutcome::FellBack`]. Only when the default chord
    /// also fails is an error returned, with no listener active.
    pub fn install(&mut self, chord: &ChordDescriptor) -> Result<InstallOutcome, ListenerError> {
        self.uninstall();

        match self.bind(chord) {
            Ok(()) => Ok(InstallOutcome::Installed(chord.clone())),
            Err(source) => self.fall_back(ListenerError::InstallFailed {
                chord: chord.display(),
                source,
            }),
        }
    }

    /// Install from a persisted canonical string, falling back to the
    /// default chord if it does not parse.
    pub fn install_from_config(&mut self, canonical: &str) -> Result<InstallOutcome, ListenerError> {
        match canonical.parse::<ChordDescriptor>() {
            Ok(chord) => self.install(&chord),
            Err(source) => {
                self.uninstall();
                self.fall_back(ListenerError::InvalidChord {
                    input: canonical.to_string(),
                    source,
                })
            }
        }
    }

    /// Stop the active listener. No-op when nothing is listening.
    pub fn uninstall(&mut self) {
        self.source.unsubscribe();
        self.capturing = false;
        self.suspended = None;
        if let Some(chord) = self.active.take() {
            tracing::debug!(hotkey = %chord, "hotkey listener removed");
        }
    }

    /// Chord currently listening, if any
    pub fn active_chord(&self) -> Option<&ChordDescriptor> {
        self.active.as_ref()
    }

    /// Check if a capture sink currently replaces the chord listener
    pub fn is_capturing(&self) -> bool {
        self.capturing
    }

    /// Suspend the chord listener and route every key event to `sink`.
    ///
    /// If the capture sink cannot be subscribed the suspended chord is
    /// reinstalled and the error is returned.
    pub fn begin_capture(&mut self, sink: KeySink) -> Result<(), ListenerError> {
        self.source.unsubscribe();
        if !self.capturing {
            self.suspended = self.active.take();
        }

        match self.source.subscribe(sink) {
            Ok(()) => {
                self.capturing = true;
                tracing::debug!("hotkey capture started");
                Ok(())
            }
            Err(source) => {
                self.capturing = false;
                let error = ListenerError::InstallFailed {
                    chord: "recorder".to_string(),
                    source,
                };
                if let Some(chord) = self.suspended.take() {
                    self.install(&chord)?;
                }
                Err(error)
            }
        }
    }

    /// Drop the capture sink and reinstall the chord that was suspended.
    /// Returns `None` if nothing was suspended.
    pub fn end_capture(&mut self) -> Result<Option<InstallOutcome>, ListenerError> {
        if !self.capturing {
            return Ok(None);
        }
        self.source.unsubscribe();
        self.capturing = false;
        tracing::debug!("hotkey capture ended");

        match self.suspended.take() {
            Some(chord) => self.install(&chord).map(Some),
            None => Ok(None),
        }
    }

    fn fall_back(&mut self, error: ListenerError) -> Result<InstallOutcome, ListenerError> {
        tracing::warn!(%error, "installing default hotkey instead");
        let chord = ChordDescriptor::default_chord();

        match self.bind(&chord) {
            Ok(()) => Ok(InstallOutcome::FellBack { chord, error }),
            Err(fallback) => Err(ListenerError::Fatal {
                primary: error.to_string(),
                fallback: fallback.to_string(),
            }),
        }
    }

    fn bind(&mut self, chord: &ChordDescriptor) -> Result<(), KeySourceError> {
        let mut matcher = ChordMatcher::new(chord);
        let on_activate = Arc::clone(&self.on_activate);

        self.source.subscribe(Box::new(move |token, pressed| {
            if matcher.on_key_event(token, pressed) {
                on_activate();
            }
        }))?;

        tracing::info!(hotkey = %chord, display = %chord.display(), "hotkey listener installed");
        self.active = Some(chord.clone());
        Ok(())
    }

    /// Access the key source
    pub fn source(&self) -> &K {
        &self.source
    }
}
