//! Edge-triggered chord matcher
//!
//! State machine:
//!   IDLE -> PARTIAL (a key is held, chord not covered)
//!   IDLE | PARTIAL -> SATISFIED (held set covers the chord; fires once)
//!   SATISFIED -> PARTIAL | IDLE (any required key released; never fires)

use std::collections::HashSet;

use super::chord::ChordDescriptor;
use super::key::KeyToken;

/// Observable matcher state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchState {
    Idle,
    Partial,
    Satisfied,
}

/// Tracks held keys against one chord
#[derive(Debug, Clone)]
pub struct ChordMatcher {
    required: HashSet<KeyToken>,
    held: HashSet<KeyToken>,
    satisfied: bool,
}

impl ChordMatcher {
    /// Build a matcher for `chord`
    pub fn new(chord: &ChordDescriptor) -> Self {
        Self {
            required: chord.tokens().iter().cloned().collect(),
            held: HashSet::new(),
            satisfied: false,
        }
    }

    /// Feed one key event. Returns `true` exactly when the chord goes from
    /// not fully held to fully held.
    pub fn on_key_event(&mut self, token: KeyToken, pressed: bool) -> bool {
        if pressed {
            self.held.insert(token);
            if !self.satisfied && self.covers() {
                self.satisfied = true;
                return true;
            }
        } else {
            self.held.remove(&token);
            if self.satisfied && !self.covers() {
                self.satisfied = false;
            }
        }
        false
    }

    /// Current state
    pub fn state(&self) -> MatchState {
        if self.satisfied {
            MatchState::Satisfied
        } else if self.held.is_empty() {
            MatchState::Idle
        } else {
            MatchState::Partial
        }
    }

    /// Forget all held keys
    pub fn reset(&mut self) {
        self.held.clear();
        self.satisfied = false;
    }

    fn covers(&self) -> bool {
        self.required.is_subset(&self.held)
    }
}
