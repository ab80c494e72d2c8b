//! CLI layer - Command-line interface
//!
//! Contains argument parsing, output formatting, signal handling,
//! logging setup and the interactive player loop.

pub mod app;
pub mod args;
pub mod hotkey_cmd;
pub mod logging;
pub mod play_cmd;
pub mod player_app;
pub mod presenter;
pub mod signals;

// Re-export commonly used types
pub use app::{EXIT_ERROR, EXIT_SUCCESS, EXIT_USAGE_ERROR};
pub use args::{Cli, Commands, HotkeyAction};
pub use hotkey_cmd::handle_hotkey_command;
pub use logging::init_logging;
pub use play_cmd::{list_files, run_play_once};
pub use player_app::run_player;
pub use presenter::Presenter;
