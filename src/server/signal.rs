// Signal handling module
//
// Supported signals:
// - SIGTERM: Graceful shutdown
// - SIGINT:  Graceful shutdown (Ctrl+C)

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::Notify;

use crate::logger;

/// Signal handler state
pub struct SignalHandler {
    /// Wakes the accept loop; `notify_one` keeps the permit if nobody waits yet
    pub shutdown: Notify,
    /// Whether shutdown has been requested
    pub shutdown_requested: AtomicBool,
}

impl SignalHandler {
    pub fn new() -> Self {
        Self {
            shutdown: Notify::new(),
            shutdown_requested: AtomicBool::new(false),
        }
    }

    /// Request shutdown; repeated requests are ignored
    pub fn request_shutdown(&self, reason: &str) {
        if !self.shutdown_requested.swap(true, Ordering::SeqCst) {
            logger::log_info(&format!("{reason} received, shutting down gracefully..."));
            self.shutdown.notify_one();
        }
    }
}

impl Default for SignalHandler {
    fn default() -> Self {
        Self::new()
    }
}

/// Start signal handlers (Unix: SIGTERM and SIGINT)
#[cfg(unix)]
pub fn start_signal_handler(handler: Arc<SignalHandler>) {
    use tokio::signal::unix::{signal, SignalKind};

    tokio::spawn(async move {
        let (mut sigterm, mut sigint) =
            match (signal(SignalKind::terminate()), signal(SignalKind::interrupt())) {
                (Ok(term), Ok(int)) => (term, int),
                (Err(e), _) | (_, Err(e)) => {
                    logger::log_warning(&format!(
                        "Failed to register signal handlers ({e}), falling back to Ctrl+C"
                    ));
                    if tokio::signal::ctrl_c().await.is_ok() {
                        handler.request_shutdown("Ctrl+C");
                    }
                    return;
                }
            };

        tokio::select! {
            _ = sigterm.recv() => handler.request_shutdown("SIGTERM"),
            _ = sigint.recv() => handler.request_shutdown("SIGINT"),
        }
    });
}

/// Non-Unix fallback - only handles Ctrl+C
#[cfg(not(unix))]
pub fn start_signal_handler(handler: Arc<SignalHandler>) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            handler.request_shutdown("Ctrl+C");
        }
    });
}
