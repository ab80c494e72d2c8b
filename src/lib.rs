//! Roar - random overlapping sound player with a global hotkey
//!
//! Plays a randomly chosen audio file from a folder on each trigger. Several
//! sounds may overlap, one per channel in a fixed-size pool; a channel is
//! freed once its sound's duration plus a grace margin has elapsed. Triggers
//! come from stdin or from a system-wide key chord that can be re-recorded
//! at runtime and is persisted to `config.json`.
//!
//! # Architecture
//!
//! The crate follows hexagonal (ports & adapters) architecture:
//!
//! - **Domain**: Key chords, chord matching and recording, playback sessions, config
//! - **Application**: Channel pool, playback engine, listener lifecycle and port traits
//! - **Infrastructure**: Adapters for rodio, rdev, the file system and notifications
//! - **CLI**: Command-line interface, argument parsing, and signal handling

pub mod application;
pub mod cli;
pub mod domain;
pub mod infrastructure;
