//! Hotkey domain: key tokens, chords, matching and recording

mod chord;
mod key;
mod matcher;
mod recorder;

pub use chord::{ChordDescriptor, DEFAULT_HOTKEY, DEFAULT_HOTKEY_DISPLAY};
pub use key::{KeyToken, Modifier, NAMED_KEYS};
pub use matcher::{ChordMatcher, MatchState};
pub use recorder::{HotkeyRecorder, RecorderUpdate};
