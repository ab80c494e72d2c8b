//! System-wide keyboard hook using rdev
//!
//! rdev's hook cannot be stopped once started, so one hook thread runs for
//! the life of the process and feeds a single sink slot. Subscribing and
//! unsubscribing only swap what is in the slot.

use std::sync::mpsc;
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use rdev::{Event, EventType, Key};

use crate::application::ports::{KeySink, KeySource, KeySourceError};
use crate::domain::hotkey::{KeyToken, Modifier};

/// How long to wait for the hook to report a startup failure
const HOOK_STARTUP_GRACE: Duration = Duration::from_millis(250);

type SinkSlot = Arc<Mutex<Option<KeySink>>>;

enum HookState {
    NotStarted,
    Running,
    Failed(String),
}

/// Global key source backed by an rdev hook thread
pub struct RdevKeySource {
    slot: SinkSlot,
    hook: Mutex<HookState>,
}

impl RdevKeySource {
    pub fn new() -> Self {
        Self {
            slot: Arc::new(Mutex::new(None)),
            hook: Mutex::new(HookState::NotStarted),
        }
    }

    /// Start the hook thread on first use
    fn ensure_hook(&self) -> Result<(), KeySourceError> {
        let mut state = self.hook.lock().unwrap_or_else(|e| e.into_inner());
        match &*state {
            HookState::Running => return Ok(()),
            HookState::Failed(reason) => return Err(KeySourceError::HookUnavailable(reason.clone())),
            HookState::NotStarted => {}
        }

        let (tx, rx) = mpsc::channel::<String>();
        let slot = Arc::clone(&self.slot);

        let spawned = thread::Builder::new()
            .name("key-hook".to_string())
            .spawn(move || {
                let callback = move |event: Event| deliver(&slot, event.event_type);
                if let Err(e) = rdev::listen(callback) {
                    let _ = tx.send(format!("{:?}", e));
                }
            });

        if let Err(e) = spawned {
            let reason = e.to_string();
            *state = HookState::Failed(reason.clone());
            return Err(KeySourceError::HookUnavailable(reason));
        }

        // `listen` blocks for as long as the hook runs; an early message or
        // a dropped sender means it never came up.
        match rx.recv_timeout(HOOK_STARTUP_GRACE) {
            Err(mpsc::RecvTimeoutError::Timeout) => {
                tracing::debug!("keyboard hook started");
                *state = HookState::Running;
                Ok(())
            }
            Ok(reason) => {
                *state = HookState::Failed(reason.clone());
                Err(KeySourceError::HookUnavailable(reason))
            }
            Err(mpsc::RecvTimeoutError::Disconnected) => {
                let reason = "keyboard hook exited".to_string();
                *state = HookState::Failed(reason.clone());
                Err(KeySourceError::HookUnavailable(reason))
            }
        }
    }
}

impl Default for RdevKeySource {
    fn default() -> Self {
        Self::new()
    }
}

impl KeySource for RdevKeySource {
    fn subscribe(&self, sink: KeySink) -> Result<(), KeySourceError> {
        self.ensure_hook()?;

        let mut slot = self.slot.lock().unwrap_or_else(|e| e.into_inner());
        if slot.is_some() {
            return Err(KeySourceError::AlreadySubscribed);
        }
        *slot = Some(sink);
        Ok(())
    }

    fn unsubscribe(&self) {
        // Delivery holds this lock, so once we have it no old event is in flight
        *self.slot.lock().unwrap_or_else(|e| e.into_inner()) = None;
    }

    fn is_subscribed(&self) -> bool {
        self.slot
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .is_some()
    }
}

/// Hand one raw event to the subscribed sink, if any
fn deliver(slot: &Mutex<Option<KeySink>>, event: EventType) {
    let (key, pressed) = match event {
        EventType::KeyPress(key) => (key, true),
        EventType::KeyRelease(key) => (key, false),
        _ => return,
    };
    let Some(token) = canonicalize(key) else {
        return;
    };

    let mut guard = slot.lock().unwrap_or_else(|e| e.into_inner());
    if let Some(sink) = guard.as_mut() {
        sink(token, pressed);
    }
}

/// Map a physical rdev key to its canonical token.
///
/// Left/right modifier variants collapse; everything else gets the name used
/// in the persisted chord form. Unknown keys map to `None`.
pub fn canonicalize(key: Key) -> Option<KeyToken> {
    let modifier = match key {
        Key::ControlLeft | Key::ControlRight => Some(Modifier::Ctrl),
        Key::Alt | Key::AltGr => Some(Modifier::Alt),
        Key::ShiftLeft | Key::ShiftRight => Some(Modifier::Shift),
        Key::MetaLeft | Key::MetaRight => Some(Modifier::Win),
        _ => None,
    };
    if let Some(m) = modifier {
        return Some(m.into());
    }

    if let Some(c) = key_char(key) {
        return Some(KeyToken::char(c));
    }

    let name = match key {
        Key::Space => "space",
        Key::Return => "enter",
        Key::Tab => "tab",
        Key::Escape => "esc",
        Key::Backspace => "backspace",
        Key::Delete => "delete",
        Key::Insert => "insert",
        Key::Home => "home",
        Key::End => "end",
        Key::PageUp => "page_up",
        Key::PageDown => "page_down",
        Key::UpArrow => "up",
        Key::DownArrow => "down",
        Key::LeftArrow => "left",
        Key::RightArrow => "right",
        Key::CapsLock => "caps_lock",
        Key::NumLock => "num_lock",
        Key::ScrollLock => "scroll_lock",
        Key::PrintScreen => "print_screen",
        Key::Pause => "pause",
        Key::Function => "fn",
        Key::F1 => "f1",
        Key::F2 => "f2",
        Key::F3 => "f3",
        Key::F4 => "f4",
        Key::F5 => "f5",
        Key::F6 => "f6",
        Key::F7 => "f7",
        Key::F8 => "f8",
        Key::F9 => "f9",
        Key::F10 => "f10",
        Key::F11 => "f11",
        Key::F12 => "f12",
        Key::Kp0 => "kp_0",
        Key::Kp1 => "kp_1",
        Key::Kp2 => "kp_2",
        Key::Kp3 => "kp_3",
        Key::Kp4 => "kp_4",
        Key::Kp5 => "kp_5",
        Key::Kp6 => "kp_6",
        Key::Kp7 => "kp_7",
        Key::Kp8 => "kp_8",
        Key::Kp9 => "kp_9",
        Key::KpReturn => "kp_enter",
        Key::KpMinus => "kp_minus",
        Key::KpPlus => "kp_plus",
        Key::KpMultiply => "kp_multiply",
        Key::KpDivide => "kp_divide",
        Key::KpDelete => "kp_delete",
        _ => return None,
    };
    Some(KeyToken::Named(name.to_string()))
}

/// Unshifted character for printable keys (US layout)
fn key_char(key: Key) -> Option<char> {
    let c = match key {
        Key::KeyA => 'a',
        Key::KeyB => 'b',
        Key::KeyC => 'c',
        Key::KeyD => 'd',
        Key::KeyE => 'e',
        Key::KeyF => 'f',
        Key::KeyG => 'g',
        Key::KeyH => 'h',
        Key::KeyI => 'i',
        Key::KeyJ => 'j',
        Key::KeyK => 'k',
        Key::KeyL => 'l',
        Key::KeyM => 'm',
        Key::KeyN => 'n',
        Key::KeyO => 'o',
        Key::KeyP => 'p',
        Key::KeyQ => 'q',
        Key::KeyR => 'r',
        Key::KeyS => 's',
        Key::KeyT => 't',
        Key::KeyU => 'u',
        Key::KeyV => 'v',
        Key::KeyW => 'w',
        Key::KeyX => 'x',
        Key::KeyY => 'y',
        Key::KeyZ => 'z',
        Key::Num0 => '0',
        Key::Num1 => '1',
        Key::Num2 => '2',
        Key::Num3 => '3',
        Key::Num4 => '4',
        Key::Num5 => '5',
        Key::Num6 => '6',
        Key::Num7 => '7',
        Key::Num8 => '8',
        Key::Num9 => '9',
        Key::BackQuote => '`',
        Key::Minus => '-',
        Key::Equal => '=',
        Key::LeftBracket => '[',
        Key::RightBracket => ']',
        Key::SemiColon => ';',
        Key::Quote => '\'',
        Key::BackSlash | Key::IntlBackslash => '\\',
        Key::Comma => ',',
        Key::Dot => '.',
        Key::Slash => '/',
        _ => return None,
    };
    Some(c)
}
