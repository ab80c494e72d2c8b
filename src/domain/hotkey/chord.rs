//! Chord descriptor value object

use std::fmt;
use std::str::FromStr;

use super::key::{KeyToken, Modifier};
use crate::domain::error::ChordError;

/// Default hotkey in canonical form
pub const DEFAULT_HOTKEY: &str = "<ctrl>+<alt>";

/// Default hotkey in display form
pub const DEFAULT_HOTKEY_DISPLAY: &str = "Ctrl + Alt";

/// An immutable, validated set of keys that must be held together.
///
/// Tokens are kept as an ordered set: modifiers first in canonical order,
/// then other keys in the order they were given. Duplicates are dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChordDescriptor {
    tokens: Vec<KeyToken>,
}

impl ChordDescriptor {
    /// Build a chord from tokens. Fails with [`ChordError::Empty`] if there are none.
    pub fn new(tokens: impl IntoIterator<Item = KeyToken>) -> Result<Self, ChordError> {
        let tokens = canonical_order(tokens);
        if tokens.is_empty() {
            return Err(ChordError::Empty);
        }
        Ok(Self { tokens })
    }

    /// The built-in `<ctrl>+<alt>` chord
    pub fn default_chord() -> Self {
        Self {
            tokens: vec![Modifier::Ctrl.into(), Modifier::Alt.into()],
        }
    }

    /// Tokens in canonical order
    pub fn tokens(&self) -> &[KeyToken] {
        &self.tokens
    }

    /// Canonical (persisted) form, e.g. `<ctrl>+<alt>+a`
    pub fn canonical(&self) -> String {
        self.tokens
            .iter()
            .map(KeyToken::canonical)
            .collect::<Vec<_>>()
            .join("+")
    }

    /// Human-readable form, e.g. `Ctrl + Alt + A`
    pub fn display(&self) -> String {
        display_string(&self.tokens)
    }

    /// Check if at least one modifier is part of the chord
    pub fn has_modifier(&self) -> bool {
        self.tokens.iter().any(KeyToken::is_modifier)
    }
}

impl Default for ChordDescriptor {
    fn default() -> Self {
        Self::default_chord()
    }
}

impl FromStr for ChordDescriptor {
    type Err = ChordError;

    /// Parse the canonical form: `+`-separated segments, where a segment is
    /// either a single character or a `<name>`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let input = s.trim();
        if input.is_empty() {
            return Err(ChordError::Empty);
        }

        let tokens = input
            .split('+')
            .map(|segment| KeyToken::parse_segment(segment.trim(), input))
            .collect::<Result<Vec<_>, _>>()?;

        Self::new(tokens)
    }
}

impl fmt::Display for ChordDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.canonical())
    }
}

/// Order tokens as an ordered set: modifiers by canonical order, then the
/// remaining keys by first appearance.
pub(crate) fn canonical_order(tokens: impl IntoIterator<Item = KeyToken>) -> Vec<KeyToken> {
    let mut modifiers: Vec<Modifier> = Vec::new();
    let mut keys: Vec<KeyToken> = Vec::new();

    for token in tokens {
        match token {
            KeyToken::Modifier(m) => {
                if !modifiers.contains(&m) {
                    modifiers.push(m);
                }
            }
            named => {
                if !keys.contains(&named) {
                    keys.push(named);
                }
            }
        }
    }

    modifiers.sort();
    modifiers
        .into_iter()
        .map(KeyToken::Modifier)
        .chain(keys)
        .collect()
}

/// Join display names with ` + ` after canonical ordering
pub(crate) fn display_string(tokens: &[KeyToken]) -> String {
    canonical_order(tokens.iter().cloned())
        .iter()
        .map(KeyToken::display)
        .collect::<Vec<_>>()
        .join(" + ")
}
