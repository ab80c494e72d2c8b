//! One-shot `play` and `files` subcommands

use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::application::ports::{AudioBackend, AudioLibrary};
use crate::application::{PlaybackEngine, PlaybackError};
use crate::domain::config::AppConfig;
use crate::infrastructure::{RodioBackend, RodioDecoder};

use super::app::{EXIT_ERROR, EXIT_SUCCESS};
use super::presenter::Presenter;

/// Play one random file and wait until its channel is released
pub async fn run_play_once<L: AudioLibrary>(library: L, config: &AppConfig, presenter: &Presenter) -> u8 {
    let backend = match RodioBackend::new() {
        Ok(backend) => backend,
        Err(e) => {
            presenter.error(&format!("Audio output unavailable: {}", e));
            return EXIT_ERROR;
        }
    };

    let mut engine = PlaybackEngine::new(
        backend,
        Arc::new(RodioDecoder),
        library,
        config.channels_or_default(),
        Duration::from_millis(config.grace_ms_or_default()),
    );
    let code = play_and_wait(&mut engine, presenter).await;
    engine.shutdown();
    code
}

async fn play_and_wait<B: AudioBackend, L: AudioLibrary>(
    engine: &mut PlaybackEngine<B, L>,
    presenter: &Presenter,
) -> u8 {
    match engine.play_random().await {
        Ok(started) => presenter.playing(&started),
        Err(e @ PlaybackError::NoAudioFiles { .. }) => {
            presenter.warn(&e.to_string());
            return EXIT_ERROR;
        }
        Err(e) => {
            presenter.error(&e.to_string());
            return EXIT_ERROR;
        }
    }

    while let Some(expiry) = engine.next_expiry() {
        tokio::time::sleep_until(tokio::time::Instant::from_std(expiry)).await;
        engine.retire_due(Instant::now());
    }
    EXIT_SUCCESS
}

/// Print every file the player would choose from
pub fn list_files<L: AudioLibrary>(library: &L, presenter: &Presenter) -> u8 {
    let files = library.discover();
    if files.is_empty() {
        let error = PlaybackError::NoAudioFiles {
            dir: library.base_dir().to_path_buf(),
        };
        presenter.warn(&error.to_string());
        return EXIT_SUCCESS;
    }

    for file in &files {
        presenter.output(&file.display().to_string());
    }
    tracing::debug!(count = files.len(), "listed audio files");
    EXIT_SUCCESS
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::test_support::{MockBackend, MockDecoder, MockLibrary};

    #[tokio::test]
    async fn waits_for_channel_release() {
        let mut engine = PlaybackEngine::new(
            MockBackend::new(),
            MockDecoder::new().with_duration_ms(60).shared(),
            MockLibrary::new(&["a.wav"]),
            1,
            Duration::from_millis(20),
        );

        let code = play_and_wait(&mut engine, &Presenter::new()).await;

        assert_eq!(code, EXIT_SUCCESS);
        assert_eq!(engine.active_count(), 0);
        assert_eq!(engine.pool().backend().released().len(), 1);
    }

    #[tokio::test]
    async fn no_files_is_error() {
        let mut engine = PlaybackEngine::new(
            MockBackend::new(),
            MockDecoder::new().shared(),
            MockLibrary::new(&[]),
            1,
            Duration::from_millis(100),
        );

        assert_eq!(play_and_wait(&mut engine, &Presenter::new()).await, EXIT_ERROR);
        assert!(engine.pool().backend().started().is_empty());
    }

    #[test]
    fn empty_listing_succeeds() {
        assert_eq!(list_files(&MockLibrary::new(&[]), &Presenter::new()), EXIT_SUCCESS);
        assert_eq!(list_files(&MockLibrary::new(&["x.ogg"]), &Presenter::new()), EXIT_SUCCESS);
    }
}
