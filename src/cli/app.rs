//! Shared app setup: exit codes, paths and config loading

use std::path::{Path, PathBuf};

use crate::application::ports::ConfigStore;
use crate::domain::config::AppConfig;
use crate::domain::error::ConfigError;
use crate::infrastructure::{FsAudioLibrary, JsonConfigStore};

use super::args::Cli;
use super::presenter::Presenter;

/// Exit codes
pub const EXIT_SUCCESS: u8 = 0;
pub const EXIT_ERROR: u8 = 1;
pub const EXIT_USAGE_ERROR: u8 = 2;

/// Directory searched for sounds: `--dir`, else the executable's directory
pub fn resolve_base_dir(cli: &Cli) -> PathBuf {
    cli.dir.clone().unwrap_or_else(FsAudioLibrary::exe_dir)
}

/// Config store: `--config`, else `config.json` in the base directory
pub fn config_store(cli: &Cli, base_dir: &Path) -> JsonConfigStore {
    match &cli.config {
        Some(path) => JsonConfigStore::with_path(path),
        None => JsonConfigStore::in_dir(base_dir),
    }
}

/// Load the config file. A missing file is empty; an unreadable or corrupt
/// one is reported and treated as empty.
pub async fn load_file_config<S: ConfigStore + ?Sized>(store: &S, presenter: &Presenter) -> AppConfig {
    match store.load().await {
        Ok(config) => config,
        Err(e) => {
            report_config_error(&e, store, presenter);
            AppConfig::empty()
        }
    }
}

fn report_config_error<S: ConfigStore + ?Sized>(error: &ConfigError, store: &S, presenter: &Presenter) {
    tracing::warn!(path = %store.path().display(), %error, "ignoring config file");
    presenter.warn(&format!(
        "{} ({}) - using defaults",
        error,
        store.path().display()
    ));
}

/// Merge: defaults < file < CLI
pub async fn load_merged_config<S: ConfigStore + ?Sized>(
    store: &S,
    cli_config: AppConfig,
    presenter: &Presenter,
) -> AppConfig {
    let file_config = load_file_config(store, presenter).await;
    AppConfig::defaults().merge(file_config).merge(cli_config)
}
