//! CLI argument definitions using Clap

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::domain::config::AppConfig;

/// Roar - random overlapping sound player with a global hotkey
#[derive(Parser, Debug)]
#[command(name = "roar")]
#[command(version)]
#[command(about = "Play a random sound from a folder, by command or by global hotkey")]
#[command(long_about = None)]
pub struct Cli {
    /// Directory to search for sounds and keep config.json in
    /// (default: the executable's directory)
    #[arg(long, value_name = "DIR", global = true, env = "ROAR_DIR")]
    pub dir: Option<PathBuf>,

    /// Config file to use instead of <DIR>/config.json
    #[arg(long, value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// Number of playback channels (sounds that can overlap)
    #[arg(long, value_name = "N", value_parser = clap::value_parser!(u16).range(1..))]
    pub channels: Option<u16>,

    /// Extra milliseconds a channel stays reserved after its sound ends
    #[arg(long, value_name = "MS")]
    pub grace_ms: Option<u64>,

    /// Show desktop notifications for hotkey changes
    #[arg(short = 'n', long)]
    pub notify: bool,

    /// Print debug diagnostics to stderr
    #[arg(short = 'v', long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

impl Cli {
    /// Config values given on the command line
    pub fn to_config(&self) -> AppConfig {
        AppConfig {
            channels: self.channels.map(usize::from),
            grace_ms: self.grace_ms,
            notify: if self.notify { Some(true) } else { None },
            ..Default::default()
        }
    }
}

/// Subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Play one random sound and wait for it to finish
    Play,
    /// List the audio files that would be played
    Files,
    /// Show or change the global hotkey
    Hotkey {
        #[command(subcommand)]
        action: HotkeyAction,
    },
}

/// Hotkey action subcommands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum HotkeyAction {
    /// Print the saved hotkey
    Show,
    /// Save a hotkey given in canonical form, e.g. "<ctrl>+<alt>+p"
    Set {
        /// Chord in canonical form
        chord: String,
    },
    /// Save the default hotkey (Ctrl + Alt)
    Reset,
    /// Press a chord on the keyboard and save it
    Record,
}
