//! Keyboard port: the single system-wide key event subscription

use thiserror::Error;

use crate::domain::hotkey::KeyToken;

/// Receives canonicalized key events: `(token, pressed)`.
///
/// Called on the hook thread; implementations should hand work off rather
/// than doing it inline.
pub type KeySink = Box<dyn FnMut(KeyToken, bool) + Send>;

/// Errors from the system-wide keyboard hook
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum KeySourceError {
    /// The OS hook could not be installed (permissions, no display, ...)
    #[error("Keyboard hook unavailable: {0}")]
    HookUnavailable(String),

    /// A sink is already subscribed; unsubscribe it first
    #[error("A keyboard listener is already active")]
    AlreadySubscribed,
}

/// Port trait for the system-wide keyboard hook.
///
/// At most one sink is subscribed at a time.
pub trait KeySource {
    /// Start delivering key events to `sink`
    fn subscribe(&self, sink: KeySink) -> Result<(), KeySourceError>;

    /// Stop delivering events. When this returns, the previous sink will not
    /// be called again. No-op if nothing is subscribed.
    fn unsubscribe(&self);

    /// Check if a sink is currently subscribed
    fn is_subscribed(&self) -> bool;
}
