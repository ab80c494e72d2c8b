//! Shutdown signal handling

use std::fmt;

use colored::Colorize;
use tokio::sync::mpsc;

/// OS signal that requested shutdown
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownReason {
    /// SIGINT / Ctrl+C
    Interrupt,
    /// SIGTERM
    Terminate,
}

impl fmt::Display for ShutdownReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Interrupt => write!(f, "SIGINT"),
            Self::Terminate => write!(f, "SIGTERM"),
        }
    }
}

/// Delivers SIGINT/SIGTERM to the main loop as messages
pub struct ShutdownSignal {
    receiver: mpsc::Receiver<ShutdownReason>,
}

impl ShutdownSignal {
    /// Start listening for shutdown signals.
    ///
    /// Must be called from inside a tokio runtime.
    pub fn new() -> Result<Self, std::io::Error> {
        let (tx, rx) = mpsc::channel(4);

        // SIGINT (Ctrl+C)
        let tx_int = tx.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                eprintln!("{} Received SIGINT (shutdown)", "↓".cyan());
                let _ = tx_int.send(ShutdownReason::Interrupt).await;
            }
        });

        // SIGTERM
        #[cfg(unix)]
        {
            use tokio::signal::unix::{signal, SignalKind};

            let mut sigterm = signal(SignalKind::terminate())?;
            tokio::spawn(async move {
                sigterm.recv().await;
                eprintln!("{} Received SIGTERM (shutdown)", "↓".cyan());
                let _ = tx.send(ShutdownReason::Terminate).await;
            });
        }
        #[cfg(not(unix))]
        drop(tx);

        Ok(Self { receiver: rx })
    }

    /// Wait for the next shutdown request
    pub async fn recv(&mut self) -> Option<ShutdownReason> {
        self.receiver.recv().await
    }

    /// Build from an existing channel
    pub fn from_receiver(receiver: mpsc::Receiver<ShutdownReason>) -> Self {
        Self { receiver }
    }
}
