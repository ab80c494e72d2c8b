//! Interactive player: stdin commands, global hotkey and channel expiry
//! multiplexed on the main thread

use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;

use crate::application::ports::{
    decode_off_thread, AudioBackend, AudioLibrary, ConfigStore, KeySink, KeySource,
    NotificationIcon, Notifier,
};
use crate::application::{
    Activation, AppContext, AppEvent, ApplyError, ApplyReport, InstallOutcome, ListenerError,
    ListenerManager, PlaybackEngine, PlaybackError,
};
use crate::domain::config::AppConfig;
use crate::domain::hotkey::{KeyToken, RecorderUpdate};
use crate::infrastructure::{
    create_notifier, FsAudioLibrary, NotifyRustNotifier, RdevKeySource, RodioBackend, RodioDecoder,
};

use super::app::{EXIT_ERROR, EXIT_SUCCESS};
use super::hotkey_cmd::modifierless_warning;
use super::presenter::{format_active, format_ready, Presenter};
use super::signals::ShutdownSignal;

/// Deadline used when no channel is waiting to expire
const IDLE_WAKEUP: Duration = Duration::from_secs(3600);

/// A line typed at the prompt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerCommand {
    Play,
    Record,
    Stop,
    Apply,
    Cancel,
    Default,
    List,
    Help,
    Quit,
}

impl PlayerCommand {
    /// Parse a prompt line. An empty line plays.
    pub fn parse(line: &str) -> Option<Self> {
        match line.trim().to_lowercase().as_str() {
            "" | "p" | "play" => Some(Self::Play),
            "r" | "record" => Some(Self::Record),
            "s" | "stop" => Some(Self::Stop),
            "a" | "apply" => Some(Self::Apply),
            "c" | "cancel" => Some(Self::Cancel),
            "d" | "default" => Some(Self::Default),
            "l" | "list" => Some(Self::List),
            "h" | "help" | "?" => Some(Self::Help),
            "q" | "quit" | "exit" => Some(Self::Quit),
            _ => None,
        }
    }
}

/// What the loop does after handling an input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
    /// No hotkey could be installed, not even the default
    Fatal(String),
}

/// Run the interactive player until quit, EOF-and-signal, or a fatal
/// listener failure
pub async fn run_player<S: ConfigStore + 'static>(
    library: FsAudioLibrary,
    store: S,
    config: AppConfig,
    presenter: &mut Presenter,
) -> u8 {
    let backend = match RodioBackend::new() {
        Ok(backend) => backend,
        Err(e) => {
            presenter.error(&format!("Audio output unavailable: {}", e));
            return EXIT_ERROR;
        }
    };

    let engine = PlaybackEngine::new(
        backend,
        Arc::new(RodioDecoder),
        library,
        config.channels_or_default(),
        Duration::from_millis(config.grace_ms_or_default()),
    );

    let (events_tx, mut events) = mpsc::unbounded_channel::<AppEvent>();
    let activate_tx = events_tx.clone();
    let on_activate: Activation = Arc::new(move || {
        let _ = activate_tx.send(AppEvent::HotkeyActivated);
    });

    let notifier = create_notifier(config.notify_or_default());
    let listener = ListenerManager::new(RdevKeySource::new(), on_activate);
    let mut ctx = AppContext::new(engine, listener, Box::new(store), config);

    match ctx.install_configured_hotkey().await {
        Ok(report) => {
            if report.outcome.fell_back() {
                report_apply(&report, presenter, notifier.as_ref()).await;
            } else if report.modifierless {
                presenter.warn(&modifierless_warning(report.chord()));
            }
        }
        Err(e) => return fatal(&mut ctx, presenter, &e.to_string()).await,
    }

    let mut signals = match ShutdownSignal::new() {
        Ok(signals) => signals,
        Err(e) => {
            presenter.error(&format!("Failed to install signal handlers: {}", e));
            ctx.shutdown();
            return EXIT_ERROR;
        }
    };

    presenter.info(&format!(
        "{} audio file(s) in {}",
        ctx.engine().files().len(),
        ctx.engine().base_dir().display()
    ));
    presenter.help(&hotkey_display(&ctx));
    presenter.status(&format_ready(&hotkey_display(&ctx)));

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdin_open = true;

    let flow = loop {
        let next_expiry = ctx.next_expiry();
        let deadline = next_expiry.unwrap_or_else(|| Instant::now() + IDLE_WAKEUP);

        let flow = tokio::select! {
            reason = signals.recv() => {
                if let Some(reason) = reason {
                    tracing::debug!(%reason, "shutdown requested");
                }
                Flow::Quit
            }
            line = lines.next_line(), if stdin_open => match line {
                Ok(Some(line)) => match PlayerCommand::parse(&line) {
                    Some(command) => {
                        handle_command(command, &mut ctx, presenter, notifier.as_ref(), &events_tx).await
                    }
                    None => {
                        presenter.warn(&format!("Unknown command '{}' - press h for help", line.trim()));
                        Flow::Continue
                    }
                },
                Ok(None) => {
                    tracing::debug!("stdin closed, hotkey only");
                    stdin_open = false;
                    Flow::Continue
                }
                Err(e) => {
                    tracing::warn!(error = %e, "stdin read failed, hotkey only");
                    stdin_open = false;
                    Flow::Continue
                }
            },
            Some(event) = events.recv() => handle_event(event, &mut ctx, presenter, &events_tx),
            _ = tokio::time::sleep_until(tokio::time::Instant::from_std(deadline)), if next_expiry.is_some() => {
                retire(&mut ctx, presenter, Instant::now());
                Flow::Continue
            }
        };

        match flow {
            Flow::Continue => {}
            other => break other,
        }
    };

    match flow {
        Flow::Fatal(message) => fatal(&mut ctx, presenter, &message).await,
        _ => {
            presenter.stop_spinner();
            ctx.shutdown();
            presenter.info("Bye");
            EXIT_SUCCESS
        }
    }
}

/// Report a listener failure that left no hotkey active and tear down
async fn fatal<B, L, K>(ctx: &mut AppContext<B, L, K>, presenter: &mut Presenter, message: &str) -> u8
where
    B: AudioBackend,
    L: AudioLibrary,
    K: KeySource,
{
    presenter.stop_spinner();
    presenter.error(message);

    // Shown regardless of --notify: the terminal may not be visible
    if let Err(e) = NotifyRustNotifier::new()
        .notify("Roar hotkey unavailable", message, NotificationIcon::Error)
        .await
    {
        tracing::debug!(error = %e, "notification failed");
    }

    ctx.shutdown();
    EXIT_ERROR
}

fn hotkey_display<B: AudioBackend, L: AudioLibrary, K: KeySource>(ctx: &AppContext<B, L, K>) -> String {
    match ctx.active_chord() {
        Some(chord) => chord.display(),
        None => ctx.config().hotkey_display_or_default().to_string(),
    }
}

/// Handle one prompt command
pub async fn handle_command<B, L, K>(
    command: PlayerCommand,
    ctx: &mut AppContext<B, L, K>,
    presenter: &mut Presenter,
    notifier: &dyn Notifier,
    events: &mpsc::UnboundedSender<AppEvent>,
) -> Flow
where
    B: AudioBackend,
    L: AudioLibrary,
    K: KeySource,
{
    match command {
        PlayerCommand::Play => {
            play(ctx, presenter, events);
            Flow::Continue
        }
        PlayerCommand::Record => {
            if ctx.has_pending_recording() {
                presenter.warn("Already recording - press 'a' to apply or 'c' to cancel");
                return Flow::Continue;
            }
            let tx = events.clone();
            let sink: KeySink = Box::new(move |token: KeyToken, pressed: bool| {
                let _ = tx.send(AppEvent::RecorderKey { token, pressed });
            });
            match ctx.start_recording(sink) {
                Ok(()) => {
                    presenter.start_spinner("Press the new hotkey, then release all keys...");
                    Flow::Continue
                }
                Err(e) => listener_failure(e, presenter),
            }
        }
        PlayerCommand::Stop => {
            if !ctx.is_recording() {
                presenter.warn("Not recording");
                return Flow::Continue;
            }
            ctx.stop_recording();
            let captured = ctx.recorded_display();
            if !captured.is_empty() {
                presenter.spinner_success(&captured_message(&captured));
                return Flow::Continue;
            }
            // Nothing to apply: put the previous chord back
            match ctx.cancel_recording() {
                Ok(_) => {
                    presenter.spinner_fail("Recording stopped - nothing captured, hotkey unchanged");
                    Flow::Continue
                }
                Err(e) => listener_failure(e, presenter),
            }
        }
        PlayerCommand::Apply => {
            if !ctx.has_pending_recording() {
                presenter.warn("Nothing recorded - press 'r' first");
                return Flow::Continue;
            }
            presenter.stop_spinner();
            let result = ctx.apply_recording().await;
            finish_apply(result, presenter, notifier).await
        }
        PlayerCommand::Cancel => {
            if !ctx.has_pending_recording() {
                presenter.warn("Not recording");
                return Flow::Continue;
            }
            match ctx.cancel_recording() {
                Ok(outcome) => {
                    presenter.spinner_fail("Recording cancelled");
                    if let Some(outcome @ InstallOutcome::FellBack { .. }) = outcome {
                        presenter.warn(&fallback_message(&outcome));
                    }
                    Flow::Continue
                }
                Err(e) => listener_failure(e, presenter),
            }
        }
        PlayerCommand::Default => {
            presenter.stop_spinner();
            let result = ctx.reset_hotkey().await;
            finish_apply(result, presenter, notifier).await
        }
        PlayerCommand::List => {
            let files = ctx.engine().files();
            if files.is_empty() {
                let error = PlaybackError::NoAudioFiles {
                    dir: ctx.engine().base_dir().to_path_buf(),
                };
                presenter.warn(&error.to_string());
            } else {
                for file in files {
                    presenter.output(&file.display().to_string());
                }
            }
            Flow::Continue
        }
        PlayerCommand::Help => {
            presenter.help(&hotkey_display(ctx));
            Flow::Continue
        }
        PlayerCommand::Quit => Flow::Quit,
    }
}

/// Handle one event posted from the keyboard hook thread or a decode task
pub fn handle_event<B, L, K>(
    event: AppEvent,
    ctx: &mut AppContext<B, L, K>,
    presenter: &mut Presenter,
    events: &mpsc::UnboundedSender<AppEvent>,
) -> Flow
where
    B: AudioBackend,
    L: AudioLibrary,
    K: KeySource,
{
    match event {
        AppEvent::HotkeyActivated => play(ctx, presenter, events),
        AppEvent::Decoded { pending, decoded } => match ctx.finish_play(pending, decoded) {
            Ok(started) => presenter.playing(&started),
            Err(e) => presenter.error(&e.to_string()),
        },
        AppEvent::RecorderKey { token, pressed } => match ctx.on_recorder_key(token, pressed) {
            RecorderUpdate::Captured => {
                presenter.update_spinner(&format!("Recording: {}", ctx.recorded_display()));
            }
            RecorderUpdate::Completed => {
                presenter.spinner_success(&captured_message(&ctx.recorded_display()));
            }
            RecorderUpdate::Released | RecorderUpdate::Ignored => {}
        },
    }
    Flow::Continue
}

/// Reserve a channel and decode on the blocking pool; the result comes back
/// as [`AppEvent::Decoded`].
fn play<B: AudioBackend, L: AudioLibrary, K: KeySource>(
    ctx: &mut AppContext<B, L, K>,
    presenter: &Presenter,
    events: &mpsc::UnboundedSender<AppEvent>,
) {
    match ctx.begin_play() {
        Ok(pending) => {
            let decoder = ctx.decoder();
            let tx = events.clone();
            tokio::spawn(async move {
                let decoded = decode_off_thread(decoder, pending.path.clone()).await;
                let _ = tx.send(AppEvent::Decoded { pending, decoded });
            });
        }
        Err(PlaybackError::ChannelExhausted) => presenter.warn(&PlaybackError::ChannelExhausted.to_string()),
        Err(e @ PlaybackError::NoAudioFiles { .. }) => presenter.warn(&e.to_string()),
        Err(e) => presenter.error(&e.to_string()),
    }
}

/// Retire due sessions and print the resulting status
fn retire<B: AudioBackend, L: AudioLibrary, K: KeySource>(
    ctx: &mut AppContext<B, L, K>,
    presenter: &Presenter,
    now: Instant,
) {
    if ctx.retire_due(now) == 0 {
        return;
    }
    match ctx.active_count() {
        0 => presenter.status(&format_ready(&hotkey_display(ctx))),
        active => presenter.status(&format_active(active)),
    }
}

fn captured_message(display: &str) -> String {
    format!("Captured: {} - press 'a' to apply or 'c' to cancel", display)
}

fn fallback_message(outcome: &InstallOutcome) -> String {
    match outcome {
        InstallOutcome::FellBack { chord, error } => {
            format!("{} - using default hotkey {}", error, chord.display())
        }
        InstallOutcome::Installed(chord) => format!("Hotkey set: {}", chord.display()),
    }
}

fn listener_failure(error: ListenerError, presenter: &Presenter) -> Flow {
    match error {
        ListenerError::Fatal { .. } => Flow::Fatal(error.to_string()),
        other => {
            presenter.error(&other.to_string());
            Flow::Continue
        }
    }
}

async fn finish_apply(
    result: Result<ApplyReport, ApplyError>,
    presenter: &Presenter,
    notifier: &dyn Notifier,
) -> Flow {
    match result {
        Ok(report) => {
            report_apply(&report, presenter, notifier).await;
            Flow::Continue
        }
        Err(ApplyError::EmptyChord) => {
            presenter.warn(&ApplyError::EmptyChord.to_string());
            Flow::Continue
        }
        Err(ApplyError::Listener(e)) => listener_failure(e, presenter),
    }
}

async fn report_apply(report: &ApplyReport, presenter: &Presenter, notifier: &dyn Notifier) {
    let chord = report.chord();
    if report.outcome.fell_back() {
        presenter.warn(&fallback_message(&report.outcome));
    } else {
        presenter.success(&format!("Hotkey set: {}", chord.display()));
    }
    if report.modifierless {
        presenter.warn(&modifierless_warning(chord));
    }
    if let Some(e) = &report.persist_error {
        presenter.warn(&format!("Hotkey is active but was not saved: {}", e));
    }

    if let Err(e) = notifier
        .notify(
            "Hotkey changed",
            &format!("Press {} to play a sound", chord.display()),
            NotificationIcon::Keyboard,
        )
        .await
    {
        tracing::debug!(error = %e, "notification failed");
    }
}
