//! Audio library port for discovering playable files

use std::path::{Path, PathBuf};

/// File extensions recognised as audio (compared case-insensitively)
pub const AUDIO_EXTENSIONS: &[&str] = &["mp3", "wav", "ogg", "flac"];

/// Check if a path has one of the recognised audio extensions
pub fn is_audio_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| AUDIO_EXTENSIONS.iter().any(|known| ext.eq_ignore_ascii_case(known)))
        .unwrap_or(false)
}

/// Port for audio file discovery
pub trait AudioLibrary {
    /// Find playable files. An empty list means nothing was found.
    fn discover(&self) -> Vec<PathBuf>;

    /// Primary directory searched, for status messages
    fn base_dir(&self) -> &Path;
}
