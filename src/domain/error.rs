//! Domain error types

use thiserror::Error;

/// Error when building or parsing a key chord
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChordError {
    /// No keys were captured (or given) for the chord
    #[error("No keys captured. Record a key combination first")]
    Empty,

    /// A segment of the canonical form is empty, e.g. `<ctrl>+`
    #[error("Invalid hotkey \"{input}\": empty key segment")]
    EmptySegment { input: String },

    /// A segment does not name a known key
    #[error("Invalid hotkey \"{input}\": unknown key \"{token}\"")]
    UnknownKey { input: String, token: String },
}

/// Error when configuration fails
#[derive(Debug, Clone, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(String),

    #[error("Failed to parse config file: {0}")]
    ParseError(String),

    #[error("Failed to write config file: {0}")]
    WriteError(String),

    #[error("Invalid config value for '{key}': {message}")]
    ValidationError { key: String, message: String },

    #[error("Config file already exists at: {0}")]
    AlreadyExists(String),
}
