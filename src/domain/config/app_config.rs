//! Application configuration value object

use serde::{Deserialize, Serialize};

use crate::domain::hotkey::{ChordDescriptor, DEFAULT_HOTKEY, DEFAULT_HOTKEY_DISPLAY};
use crate::domain::playback::{DEFAULT_CHANNELS, DEFAULT_GRACE_MS};

/// Application configuration.
/// All fields are optional to support partial configs and merging.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Canonical chord string, e.g. `<ctrl>+<alt>`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hotkey: Option<String>,
    /// Human-readable chord, e.g. `Ctrl + Alt`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hotkey_display: Option<String>,
    /// Size of the playback channel pool
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channels: Option<usize>,
    /// Slack added to each sound's duration before its channel is freed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grace_ms: Option<u64>,
    /// Show desktop notifications for hotkey changes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notify: Option<bool>,
}

impl AppConfig {
    /// Create config with default values
    pub fn defaults() -> Self {
        Self {
            hotkey: Some(DEFAULT_HOTKEY.to_string()),
            hotkey_display: Some(DEFAULT_HOTKEY_DISPLAY.to_string()),
            channels: Some(DEFAULT_CHANNELS),
            grace_ms: Some(DEFAULT_GRACE_MS),
            notify: Some(false),
        }
    }

    /// Create an empty config (all None)
    pub fn empty() -> Self {
        Self::default()
    }

    /// Merge this config with another, where other takes precedence.
    /// Only non-None values from other will override this.
    pub fn merge(self, other: Self) -> Self {
        Self {
            hotkey: other.hotkey.or(self.hotkey),
            hotkey_display: other.hotkey_display.or(self.hotkey_display),
            channels: other.channels.or(self.channels),
            grace_ms: other.grace_ms.or(self.grace_ms),
            notify: other.notify.or(self.notify),
        }
    }

    /// Store a chord, replacing both the canonical and display forms
    pub fn set_hotkey(&mut self, chord: &ChordDescriptor) {
        self.hotkey = Some(chord.canonical());
        self.hotkey_display = Some(chord.display());
    }

    /// Get the canonical hotkey string, or the default if not set
    pub fn hotkey_or_default(&self) -> &str {
        self.hotkey.as_deref().unwrap_or(DEFAULT_HOTKEY)
    }

    /// Get the display hotkey string, or the default if not set
    pub fn hotkey_display_or_default(&self) -> &str {
        self.hotkey_display
            .as_deref()
            .unwrap_or(DEFAULT_HOTKEY_DISPLAY)
    }

    /// Get channel count, or the default if not set or zero
    pub fn channels_or_default(&self) -> usize {
        self.channels.filter(|&n| n > 0).unwrap_or(DEFAULT_CHANNELS)
    }

    /// Get grace margin in milliseconds, or the default if not set
    pub fn grace_ms_or_default(&self) -> u64 {
        self.grace_ms.unwrap_or(DEFAULT_GRACE_MS)
    }

    /// Get notify setting, or false if not set
    pub fn notify_or_default(&self) -> bool {
        self.notify.unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_have_expected_values() {
        let config = AppConfig::defaults();
        assert_eq!(config.hotkey, Some("<ctrl>+<alt>".to_string()));
        assert_eq!(config.hotkey_display, Some("Ctrl + Alt".to_string()));
        assert_eq!(config.channels, Some(32));
        assert_eq!(config.grace_ms, Some(100));
        assert_eq!(config.notify, Some(false));
    }

    #[test]
    fn empty_has_all_none() {
        let config = AppConfig::empty();
        assert!(config.hotkey.is_none());
        assert!(config.hotkey_display.is_none());
        assert!(config.channels.is_none());
        assert!(config.grace_ms.is_none());
        assert!(config.notify.is_none());
    }

    #[test]
    fn merge_other_takes_precedence() {
        let base = AppConfig::defaults();
        let other = AppConfig {
            hotkey: Some("<alt>+a".to_string()),
            channels: Some(4),
            ..Default::default()
        };

        let merged = base.merge(other);

        assert_eq!(merged.hotkey, Some("<alt>+a".to_string()));
        assert_eq!(merged.channels, Some(4));
        assert_eq!(merged.grace_ms, Some(100)); // Kept from base
    }

    #[test]
    fn empty_config_falls_back_to_defaults() {
        let config = AppConfig::empty();
        assert_eq!(config.hotkey_or_default(), "<ctrl>+<alt>");
        assert_eq!(config.hotkey_display_or_default(), "Ctrl + Alt");
        assert_eq!(config.channels_or_default(), 32);
        assert_eq!(config.grace_ms_or_default(), 100);
        assert!(!config.notify_or_default());
    }

    #[test]
    fn zero_channels_uses_default() {
        let config = AppConfig {
            channels: Some(0),
            ..Default::default()
        };
        assert_eq!(config.channels_or_default(), 32);
    }

    #[test]
    fn set_hotkey_replaces_both_forms() {
        let mut config = AppConfig::defaults();
        let chord: ChordDescriptor = "<shift>+<f2>".parse().unwrap();
        config.set_hotkey(&chord);
        assert_eq!(config.hotkey_or_default(), "<shift>+<f2>");
        assert_eq!(config.hotkey_display_or_default(), "Shift + F2");
    }

    #[test]
    fn json_field_names_match_file_format() {
        let config = AppConfig {
            hotkey: Some("<ctrl>+<alt>".to_string()),
            hotkey_display: Some("Ctrl + Alt".to_string()),
            ..Default::default()
        };
        let json = serde_json::to_string(&config).unwrap();
        assert_eq!(
            json,
            r#"{"hotkey":"<ctrl>+<alt>","hotkey_display":"Ctrl + Alt"}"#
        );
    }
}
