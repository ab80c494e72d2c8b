//! Canonical key tokens
//!
//! Physical keys are normalized into [`KeyToken`]s at the input boundary:
//! left/right variants of a modifier collapse into one [`Modifier`], and
//! every other key becomes a lowercase [`KeyToken::Named`] token.

use std::fmt;

use crate::domain::error::ChordError;

/// Logical modifier keys.
///
/// Declaration order is the canonical display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Modifier {
    Ctrl,
    Alt,
    Shift,
    Win,
}

impl Modifier {
    /// All modifiers in canonical order
    pub const ALL: [Self; 4] = [Self::Ctrl, Self::Alt, Self::Shift, Self::Win];

    /// Canonical (persisted) form, e.g. `<ctrl>`
    pub const fn canonical(&self) -> &'static str {
        match self {
            Self::Ctrl => "<ctrl>",
            Self::Alt => "<alt>",
            Self::Shift => "<shift>",
            Self::Win => "<cmd>",
        }
    }

    /// Human-readable form, e.g. `Ctrl`
    pub const fn display(&self) -> &'static str {
        match self {
            Self::Ctrl => "Ctrl",
            Self::Alt => "Alt",
            Self::Shift => "Shift",
            Self::Win => "Win",
        }
    }

    /// Resolve any side-specific or platform alias to its modifier
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "ctrl" | "ctrl_l" | "ctrl_r" | "control" => Some(Self::Ctrl),
            "alt" | "alt_l" | "alt_r" | "alt_gr" | "option" => Some(Self::Alt),
            "shift" | "shift_l" | "shift_r" => Some(Self::Shift),
            "cmd" | "cmd_l" | "cmd_r" | "super" | "win" | "meta" => Some(Self::Win),
            _ => None,
        }
    }
}

/// Names accepted for non-character keys in the canonical form
pub const NAMED_KEYS: &[&str] = &[
    "space", "enter", "tab", "esc", "backspace", "delete", "insert", "home", "end",
    "page_up", "page_down", "up", "down", "left", "right", "caps_lock", "num_lock",
    "scroll_lock", "print_screen", "pause", "menu", "fn", "f1", "f2", "f3", "f4", "f5", "f6",
    "f7", "f8", "f9", "f10", "f11", "f12", "kp_0", "kp_1", "kp_2", "kp_3", "kp_4", "kp_5",
    "kp_6", "kp_7", "kp_8", "kp_9", "kp_enter", "kp_minus", "kp_plus", "kp_multiply",
    "kp_divide", "kp_delete", "plus",
];

/// A normalized key: one of the closed set of modifiers, or any other key by name
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum KeyToken {
    Modifier(Modifier),
    Named(String),
}

impl KeyToken {
    /// Token for a modifier
    pub const fn modifier(modifier: Modifier) -> Self {
        Self::Modifier(modifier)
    }

    /// Token for a non-modifier key. Names are lowercased; a single `+`
    /// becomes `plus` so it never collides with the chord separator.
    pub fn named(name: &str) -> Self {
        let name = name.to_lowercase();
        if name == "+" {
            return Self::Named("plus".to_string());
        }
        match Modifier::from_name(&name) {
            Some(m) => Self::Modifier(m),
            None => Self::Named(name),
        }
    }

    /// Token for a printable character key
    pub fn char(c: char) -> Self {
        Self::named(c.encode_utf8(&mut [0; 4]))
    }

    /// Check if this is a modifier
    pub fn is_modifier(&self) -> bool {
        matches!(self, Self::Modifier(_))
    }

    /// Canonical (persisted) form: `<ctrl>`, `a`, `<f5>`
    pub fn canonical(&self) -> String {
        match self {
            Self::Modifier(m) => m.canonical().to_string(),
            Self::Named(name) if name.chars().count() == 1 => name.clone(),
            Self::Named(name) => format!("<{}>", name),
        }
    }

    /// Human-readable form: `Ctrl`, `A`, `F5`, `Page_up`
    pub fn display(&self) -> String {
        match self {
            Self::Modifier(m) => m.display().to_string(),
            Self::Named(name) if name.chars().count() == 1 => name.to_uppercase(),
            Self::Named(name) => {
                let mut chars = name.chars();
                match chars.next() {
                    Some(first) => first.to_uppercase().chain(chars).collect(),
                    None => String::new(),
                }
            }
        }
    }

    /// Parse one `+`-separated segment of a canonical chord string.
    ///
    /// `input` is the whole chord string, used for error messages.
    pub fn parse_segment(segment: &str, input: &str) -> Result<Self, ChordError> {
        let unknown = || ChordError::UnknownKey {
            input: input.to_string(),
            token: segment.to_string(),
        };

        if segment.is_empty() {
            return Err(ChordError::EmptySegment {
                input: input.to_string(),
            });
        }

        if let Some(inner) = segment.strip_prefix('<').and_then(|s| s.strip_suffix('>')) {
            let inner = inner.to_lowercase();
            if let Some(m) = Modifier::from_name(&inner) {
                return Ok(Self::Modifier(m));
            }
            if NAMED_KEYS.contains(&inner.as_str()) {
                return Ok(Self::Named(inner));
            }
            return Err(unknown());
        }

        let mut chars = segment.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) if !c.is_whitespace() && !c.is_control() => Ok(Self::char(c)),
            _ => Err(unknown()),
        }
    }
}

impl From<Modifier> for KeyToken {
    fn from(modifier: Modifier) -> Self {
        Self::Modifier(modifier)
    }
}

impl fmt::Display for KeyToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display())
    }
}
