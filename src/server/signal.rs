// Signal handling module
//
// SIGTERM and SIGINT both request a graceful shutdown; nothing else is
// handled. Configuration is immutable per process, so there is no
// reload signal.

use std::sync::Arc;
use tokio::sync::Notify;

/// Signal handler state
pub struct SignalHandler {
    /// Notified once shutdown is requested
    pub shutdown: Arc<Notify>,
}

impl SignalHandler {
    pub fn new() -> Self {
        Self {
            shutdown: Arc::new(Notify::new()),
        }
    }
}

impl Default for SignalHandler {
    fn default() -> Self {
        Self::new()
    }
}

/// Start the signal listener task (Unix)
#[cfg(unix)]
pub fn start_signal_handler(handler: Arc<SignalHandler>) {
    use tokio::signal::unix::{signal, SignalKind};

    tokio::spawn(async move {
        let mut sigterm =
            signal(SignalKind::terminate()).expect("Failed to register SIGTERM handler");
        let mut sigint =
            signal(SignalKind::interrupt()).expect("Failed to register SIGINT handler");

        tokio::select! {
            _ = sigterm.recv() => {
                crate::logger::log_warning("SIGTERM received, shutting down");
            }
            _ = sigint.recv() => {
                crate::logger::log_warning("SIGINT received, shutting down");
            }
        }

        // notify_one stores a permit, so a signal arriving between two
        // polls of the accept loop is not lost
        handler.shutdown.notify_one();
    });
}

/// Windows fallback: only Ctrl+C is supported
#[cfg(not(unix))]
pub fn start_signal_handler(handler: Arc<SignalHandler>) {
    tokio::spawn(async move {
        if let Ok(()) = tokio::signal::ctrl_c().await {
            crate::logger::log_warning("Ctrl+C received, shutting down");
            handler.shutdown.notify_one();
        }
    });
}
