//! CLI presenter for output formatting
//!
//! The terminal stands in for a status label: every user-facing status line
//! goes through here.

use std::time::Duration;

use colored::*;
use indicatif::{ProgressBar, ProgressStyle};

use crate::application::PlaybackStarted;

/// Presenter for CLI output formatting
pub struct Presenter {
    spinner: Option<ProgressBar>,
}

impl Presenter {
    /// Create a new presenter
    pub fn new() -> Self {
        Self { spinner: None }
    }

    /// Start a spinner with message
    pub fn start_spinner(&mut self, message: &str) {
        let style = ProgressStyle::default_spinner()
            .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏")
            .template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner());

        let spinner = ProgressBar::new_spinner();
        spinner.set_style(style);
        spinner.set_message(message.to_string());
        spinner.enable_steady_tick(Duration::from_millis(80));
        self.spinner = Some(spinner);
    }

    /// Update spinner message
    pub fn update_spinner(&self, message: &str) {
        if let Some(ref spinner) = self.spinner {
            spinner.set_message(message.to_string());
        }
    }

    /// Check if a spinner is showing
    pub fn has_spinner(&self) -> bool {
        self.spinner.is_some()
    }

    /// Mark spinner as success and finish
    pub fn spinner_success(&mut self, message: &str) {
        if let Some(spinner) = self.spinner.take() {
            spinner.finish_with_message(format!("{} {}", "✓".green(), message));
        }
    }

    /// Mark spinner as failed and finish
    pub fn spinner_fail(&mut self, message: &str) {
        if let Some(spinner) = self.spinner.take() {
            spinner.finish_with_message(format!("{} {}", "✗".red(), message));
        }
    }

    /// Stop spinner without status
    pub fn stop_spinner(&mut self) {
        if let Some(spinner) = self.spinner.take() {
            spinner.finish_and_clear();
        }
    }

    /// Print info message to stderr
    pub fn info(&self, message: &str) {
        self.line(format!("{} {}", "ℹ".cyan(), message));
    }

    /// Print success message to stderr
    pub fn success(&self, message: &str) {
        self.line(format!("{} {}", "✓".green(), message));
    }

    /// Print warning message to stderr
    pub fn warn(&self, message: &str) {
        self.line(format!("{} {}", "⚠".yellow(), message));
    }

    /// Print error message to stderr
    pub fn error(&self, message: &str) {
        self.line(format!("{} {}", "✗".red(), message));
    }

    /// Print a playback status line
    pub fn status(&self, message: &str) {
        self.line(format!("{} {}", "♪".magenta(), message));
    }

    /// Status after a sound starts
    pub fn playing(&self, started: &PlaybackStarted) {
        self.status(&format_playing(started));
    }

    /// Output text to stdout (command results)
    pub fn output(&self, text: &str) {
        println!("{}", text);
    }

    /// Print a key-value pair
    pub fn key_value(&self, key: &str, value: &str) {
        println!("{}: {}", key.cyan(), value);
    }

    /// Print the interactive command list
    pub fn help(&self, hotkey: &str) {
        let rows = [
            ("<enter>, p", "play a random sound"),
            ("r", "record a new hotkey"),
            ("s", "stop recording"),
            ("a", "apply the recorded hotkey"),
            ("c", "cancel recording"),
            ("d", "reset hotkey to default"),
            ("l", "list audio files"),
            ("h", "show this help"),
            ("q", "quit"),
        ];
        eprintln!("{} {}", "Hotkey:".bold(), hotkey);
        for (keys, what) in rows {
            eprintln!("  {:<12} {}", keys.cyan(), what);
        }
    }

    /// Print above the spinner when one is showing
    fn line(&self, text: String) {
        match &self.spinner {
            Some(spinner) => spinner.println(text),
            None => eprintln!("{}", text),
        }
    }
}

impl Default for Presenter {
    fn default() -> Self {
        Self::new()
    }
}

/// "Playing: <file>" plus the live count
pub fn format_playing(started: &PlaybackStarted) -> String {
    format!(
        "Playing: {}\nActive sounds: {}",
        started.file_name, started.active
    )
}

/// Status once some sounds remain after one expires
pub fn format_active(active: usize) -> String {
    format!("Active sounds: {}", active)
}

/// Status once everything has finished
pub fn format_ready(hotkey_display: &str) -> String {
    format!("Ready - press <enter> or {} to play", hotkey_display)
}
