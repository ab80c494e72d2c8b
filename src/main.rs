//! Roar CLI entry point

use std::process::ExitCode;

use clap::Parser;

use roar::cli::{
    app::{config_store, load_merged_config, resolve_base_dir},
    args::{Cli, Commands},
    handle_hotkey_command, init_logging, list_files, run_play_once, run_player,
    presenter::Presenter,
};
use roar::infrastructure::FsAudioLibrary;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let mut presenter = Presenter::new();
    let base_dir = resolve_base_dir(&cli);
    let store = config_store(&cli, &base_dir);
    let cli_config = cli.to_config();
    tracing::debug!(base_dir = %base_dir.display(), "starting");

    let code = match cli.command {
        Some(Commands::Hotkey { action }) => {
            match handle_hotkey_command(action, &store, &mut presenter).await {
                Ok(()) => return ExitCode::SUCCESS,
                Err(e) => {
                    presenter.error(&e.to_string());
                    e.exit_code()
                }
            }
        }
        Some(Commands::Files) => list_files(&FsAudioLibrary::new(base_dir), &presenter),
        Some(Commands::Play) => {
            let config = load_merged_config(&store, cli_config, &presenter).await;
            run_play_once(FsAudioLibrary::new(base_dir), &config, &presenter).await
        }
        None => {
            let config = load_merged_config(&store, cli_config, &presenter).await;
            run_player(FsAudioLibrary::new(base_dir), store, config, &mut presenter).await
        }
    };

    ExitCode::from(code)
}
