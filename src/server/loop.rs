// Server loop module
// Accepts connections until shutdown, then drains in-flight connections

use hyper_util::server::graceful::GracefulShutdown;
use std::sync::atomic::AtomicUsize;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;

use super::connection::accept_connection;
use super::signal::SignalHandler;
use crate::config::AppState;
use crate::logger;

/// How long in-flight connections may run after shutdown is requested
const DRAIN_TIMEOUT: Duration = Duration::from_secs(10);

/// Serve connections from `listener` until `signals` requests shutdown.
#[allow(clippy::ignored_unit_patterns)]
pub async fn start_server_loop(
    listener: TcpListener,
    state: Arc<AppState>,
    signals: Arc<SignalHandler>,
) {
    let active_connections = Arc::new(AtomicUsize::new(0));
    let graceful = GracefulShutdown::new();

    loop {
        tokio::select! {
            accept_result = listener.accept() => {
                match accept_result {
                    Ok((stream, peer_addr)) => accept_connection(
                        stream,
                        peer_addr,
                        &state,
                        &active_connections,
                        &graceful,
                    ),
                    Err(e) => logger::log_error(&format!("Failed to accept connection: {e}")),
                }
            }

            _ = signals.shutdown.notified() => break,
        }
    }

    // Stop accepting before draining
    drop(listener);

    tokio::select! {
        _ = graceful.shutdown() => logger::log_info("All connections closed"),
        _ = tokio::time::sleep(DRAIN_TIMEOUT) => logger::log_warning(&format!(
            "Connections still open after {} seconds, exiting anyway",
            DRAIN_TIMEOUT.as_secs()
        )),
    }
}
