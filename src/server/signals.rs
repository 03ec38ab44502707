// Signal handling for reload and graceful shutdown

use crate::error::{Result, TagsearchError};
use tokio::signal::unix::{signal, Signal as TokioSignal, SignalKind};

/// What a received signal asks the server to do
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServerSignal {
    /// SIGTERM, SIGINT or SIGHUP
    Shutdown,
    /// SIGUSR1: rebuild the corpus snapshot
    Reload,
}

/// Signal handler that manages multiple Unix signals
pub struct SignalHandler {
    sigterm: TokioSignal,
    sigint: TokioSignal,
    sighup: TokioSignal,
    sigusr1: TokioSignal,
}

impl SignalHandler {
    /// Create a new signal handler
    /// Sets up handlers for SIGTERM, SIGINT, SIGHUP, and SIGUSR1
    pub fn new() -> Result<Self> {
        Ok(Self {
            sigterm: listen(SignalKind::terminate(), "SIGTERM")?,
            sigint: listen(SignalKind::interrupt(), "SIGINT")?,
            sighup: listen(SignalKind::hangup(), "SIGHUP")?,
            sigusr1: listen(SignalKind::user_defined1(), "SIGUSR1")?,
        })
    }

    /// Wait for the next signal
    pub async fn wait(&mut self) -> ServerSignal {
        tokio::select! {
            _ = self.sigterm.recv() => {
                tracing::info!("Received SIGTERM");
                ServerSignal::Shutdown
            }
            _ = self.sigint.recv() => {
                tracing::info!("Received SIGINT");
                ServerSignal::Shutdown
            }
            _ = self.sighup.recv() => {
                tracing::info!("Received SIGHUP");
                ServerSignal::Shutdown
            }
            _ = self.sigusr1.recv() => {
                tracing::info!("Received SIGUSR1");
                ServerSignal::Reload
            }
        }
    }
}

fn listen(kind: SignalKind, name: &str) -> Result<TokioSignal> {
    signal(kind).map_err(|e| TagsearchError::Io {
        source: e,
        context: format!("Failed to setup {} handler", name),
    })
}
