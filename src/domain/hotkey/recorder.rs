//! Interactive chord recorder
//!
//! Captures a new chord from live key events. Every key pressed while
//! recording joins the captured set (first occurrence wins). Recording stops
//! by itself once every captured key has been released again.

use std::collections::HashSet;

use super::chord::{display_string, ChordDescriptor};
use super::key::KeyToken;
use crate::domain::error::ChordError;

/// What a key event did to the recorder
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecorderUpdate {
    /// Not recording, or the event changed nothing visible
    Ignored,
    /// A new key joined the captured set
    Captured,
    /// A key was released but others are still held
    Released,
    /// All keys released; recording stopped
    Completed,
}

/// Transient chord-recording state
#[derive(Debug, Default)]
pub struct HotkeyRecorder {
    recording: bool,
    captured: Vec<KeyToken>,
    held: HashSet<KeyToken>,
}

impl HotkeyRecorder {
    /// Create an idle recorder
    pub fn new() -> Self {
        Self::default()
    }

    /// Begin a fresh capture, discarding anything captured before
    pub fn start(&mut self) {
        self.recording = true;
        self.captured.clear();
        self.held.clear();
    }

    /// Stop capturing. Captured keys are kept for [`finalize`](Self::finalize).
    pub fn stop(&mut self) {
        self.recording = false;
        self.held.clear();
    }

    /// Stop capturing and discard everything captured
    pub fn cancel(&mut self) {
        self.stop();
        self.captured.clear();
    }

    /// Check if currently capturing
    pub fn is_recording(&self) -> bool {
        self.recording
    }

    /// Captured keys in capture order
    pub fn captured(&self) -> &[KeyToken] {
        &self.captured
    }

    /// Feed one canonicalized key event
    pub fn on_key_event(&mut self, token: KeyToken, pressed: bool) -> RecorderUpdate {
        if !self.recording {
            return RecorderUpdate::Ignored;
        }

        if pressed {
            self.held.insert(token.clone());
            if self.captured.contains(&token) {
                return RecorderUpdate::Ignored;
            }
            self.captured.push(token);
            return RecorderUpdate::Captured;
        }

        // A release of a key pressed before recording began (e.g. the Enter
        // that started it) must not end an empty capture.
        if !self.held.remove(&token) || self.captured.is_empty() {
            return RecorderUpdate::Ignored;
        }

        if self.held.is_empty() {
            self.stop();
            RecorderUpdate::Completed
        } else {
            RecorderUpdate::Released
        }
    }

    /// Display string for what has been captured so far, e.g. `Ctrl + Alt`
    pub fn current_display_string(&self) -> String {
        display_string(&self.captured)
    }

    /// Build the chord from the captured keys
    pub fn finalize(&self) -> Result<ChordDescriptor, ChordError> {
        ChordDescriptor::new(self.captured.iter().cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::hotkey::Modifier;

    fn press(r: &mut HotkeyRecorder, name: &str) -> RecorderUpdate {
        r.on_key_event(KeyToken::named(name), true)
    }

    fn release(r: &mut HotkeyRecorder, name: &str) -> RecorderUpdate {
        r.on_key_event(KeyToken::named(name), false)
    }

    #[test]
    fn ignores_events_when_not_recording() {
        let mut r = HotkeyRecorder::new();
        assert_eq!(press(&mut r, "a"), RecorderUpdate::Ignored);
        assert!(r.captured().is_empty());
    }

    #[test]
    fn captures_in_order_and_completes_on_full_release() {
        let mut r = HotkeyRecorder::new();
        r.start();
        assert_eq!(press(&mut r, "ctrl_l"), RecorderUpdate::Captured);
        assert_eq!(press(&mut r, "shift"), RecorderUpdate::Captured);
        assert_eq!(press(&mut r, "p"), RecorderUpdate::Captured);
        assert_eq!(release(&mut r, "p"), RecorderUpdate::Released);
        assert_eq!(release(&mut r, "shift"), RecorderUpdate::Released);
        assert_eq!(release(&mut r, "ctrl_l"), RecorderUpdate::Completed);
        assert!(!r.is_recording());

        let chord = r.finalize().unwrap();
        assert_eq!(chord.canonical(), "<ctrl>+<shift>+p");
        assert_eq!(chord.display(), "Ctrl + Shift + P");
    }

    #[test]
    fn duplicate_modifier_from_two_physical_keys() {
        let mut r = HotkeyRecorder::new();
        r.start();
        assert_eq!(press(&mut r, "ctrl_l"), RecorderUpdate::Captured);
        assert_eq!(press(&mut r, "ctrl_r"), RecorderUpdate::Ignored);
        assert_eq!(press(&mut r, "alt"), RecorderUpdate::Captured);

        assert_eq!(r.current_display_string(), "Ctrl + Alt");
        assert_eq!(r.captured().len(), 2);
    }

    #[test]
    fn display_updates_while_capturing() {
        let mut r = HotkeyRecorder::new();
        r.start();
        assert_eq!(r.current_display_string(), "");
        press(&mut r, "alt");
        assert_eq!(r.current_display_string(), "Alt");
        press(&mut r, "ctrl");
        assert_eq!(r.current_display_string(), "Ctrl + Alt");
    }

    #[test]
    fn stray_release_before_capture_is_ignored() {
        let mut r = HotkeyRecorder::new();
        r.start();
        assert_eq!(release(&mut r, "enter"), RecorderUpdate::Ignored);
        assert!(r.is_recording());
    }

    #[test]
    fn finalize_empty_fails() {
        let mut r = HotkeyRecorder::new();
        r.start();
        assert_eq!(r.finalize(), Err(ChordError::Empty));
    }

    #[test]
    fn manual_stop_keeps_capture() {
        let mut r = HotkeyRecorder::new();
        r.start();
        press(&mut r, "cmd");
        press(&mut r, "r");
        r.stop();
        assert!(!r.is_recording());
        let chord = r.finalize().unwrap();
        assert_eq!(chord.display(), "Win + R");
        assert_eq!(press(&mut r, "x"), RecorderUpdate::Ignored);
    }

    #[test]
    fn cancel_discards_capture() {
        let mut r = HotkeyRecorder::new();
        r.start();
        press(&mut r, "a");
        r.cancel();
        assert!(!r.is_recording());
        assert_eq!(r.finalize(), Err(ChordError::Empty));
    }

    #[test]
    fn start_discards_previous_capture() {
        let mut r = HotkeyRecorder::new();
        r.start();
        press(&mut r, "a");
        r.start();
        assert!(r.captured().is_empty());
    }

    #[test]
    fn modifierless_chord_is_allowed() {
        let mut r = HotkeyRecorder::new();
        r.start();
        press(&mut r, "f9");
        release(&mut r, "f9");
        let chord = r.finalize().unwrap();
        assert!(!chord.has_modifier());
        assert_eq!(chord.canonical(), "<f9>");
    }

    #[test]
    fn modifier_tokens_display_fixed_names() {
        let mut r = HotkeyRecorder::new();
        r.start();
        r.on_key_event(Modifier::Win.into(), true);
        r.on_key_event(Modifier::Shift.into(), true);
        assert_eq!(r.current_display_string(), "Shift + Win");
    }
}
