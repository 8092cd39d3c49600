// Signal handling for graceful server shutdown

use crate::error::{DocsearchError, Result};
use tokio::signal::unix::{signal, Signal as TokioSignal, SignalKind};

/// Waits for the first shutdown signal (SIGTERM or SIGINT)
pub struct SignalHandler {
    sigterm: TokioSignal,
    sigint: TokioSignal,
}

impl SignalHandler {
    pub fn new() -> Result<Self> {
        let sigterm = signal(SignalKind::terminate()).map_err(|e| DocsearchError::Io {
            source: e,
            context: "Failed to setup SIGTERM handler".to_string(),
        })?;
        let sigint = signal(SignalKind::interrupt()).map_err(|e| DocsearchError::Io {
            source: e,
            context: "Failed to setup SIGINT handler".to_string(),
        })?;

        Ok(Self { sigterm, sigint })
    }

    /// Wait for a signal and return its name
    pub async fn wait(mut self) -> &'static str {
        tokio::select! {
            _ = self.sigterm.recv() => {
                tracing::info!("Received SIGTERM");
                "terminate"
            }
            _ = self.sigint.recv() => {
                tracing::info!("Received SIGINT");
                "interrupt"
            }
        }
    }
}
