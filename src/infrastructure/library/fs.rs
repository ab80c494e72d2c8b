//! File-system audio library
//!
//! Search tiers, first non-empty one wins:
//! 1. files directly in the base directory
//! 2. files anywhere below the base directory
//! 3. conventional folders (`audio`, `audios`, `music`, `sounds`) under the
//!    base directory and the working directory, then the user's audio dir

use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::application::ports::{is_audio_file, AudioLibrary};

/// Folder names searched when the base directory has nothing
pub const CONVENTIONAL_DIRS: &[&str] = &["audio", "audios", "music", "sounds"];

/// Discovers audio files on disk
pub struct FsAudioLibrary {
    base: PathBuf,
    fallbacks: Vec<PathBuf>,
}

impl FsAudioLibrary {
    /// Library rooted at `base`, with the conventional fallback folders
    pub fn new(base: impl Into<PathBuf>) -> Self {
        let base = base.into();
        let mut fallbacks: Vec<PathBuf> = CONVENTIONAL_DIRS.iter().map(|d| base.join(d)).collect();

        if let Ok(cwd) = std::env::current_dir() {
            fallbacks.extend(CONVENTIONAL_DIRS.iter().map(|d| cwd.join(d)));
        }
        if let Some(audio_dir) = dirs::audio_dir() {
            fallbacks.push(audio_dir);
        }
        fallbacks.dedup();

        Self { base, fallbacks }
    }

    /// Library that only searches `base`
    pub fn base_only(base: impl Into<PathBuf>) -> Self {
        Self {
            base: base.into(),
            fallbacks: Vec::new(),
        }
    }

    /// Directory containing the running executable, or the working directory
    pub fn exe_dir() -> PathBuf {
        std::env::current_exe()
            .ok()
            .and_then(|exe| exe.parent().map(Path::to_path_buf))
            .or_else(|| std::env::current_dir().ok())
            .unwrap_or_else(|| PathBuf::from("."))
    }
}

/// Audio files directly inside `dir`, sorted
fn shallow(dir: &Path) -> Vec<PathBuf> {
    collect(WalkDir::new(dir).min_depth(1).max_depth(1))
}

/// Audio files anywhere below `dir`, sorted
fn recursive(dir: &Path) -> Vec<PathBuf> {
    collect(WalkDir::new(dir).min_depth(1).follow_links(false))
}

fn collect(walk: WalkDir) -> Vec<PathBuf> {
    walk.sort_by_file_name()
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file() && is_audio_file(entry.path()))
        .map(|entry| entry.into_path())
        .collect()
}

impl AudioLibrary for FsAudioLibrary {
    fn discover(&self) -> Vec<PathBuf> {
        let files = shallow(&self.base);
        if !files.is_empty() {
            return files;
        }

        let files = recursive(&self.base);
        if !files.is_empty() {
            tracing::debug!(count = files.len(), "found audio in subdirectories");
            return files;
        }

        for dir in self.fallbacks.iter().filter(|d| d.is_dir()) {
            let files = recursive(dir);
            if !files.is_empty() {
                tracing::debug!(dir = %dir.display(), count = files.len(), "found audio in fallback folder");
                return files;
            }
        }

        Vec::new()
    }

    fn base_dir(&self) -> &Path {
        &self.base
    }
}
