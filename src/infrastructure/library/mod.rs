//! Audio file discovery adapters

mod fs;

pub use fs::{FsAudioLibrary, CONVENTIONAL_DIRS};
