// Server module entry
// Accept loop, per-connection handling and graceful shutdown

mod connection;
mod listener;
mod signal;

pub use listener::create_listener;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::net::TcpListener;

use crate::config::AppState;
use crate::logger;

/// How long shutdown waits for in-flight connections to finish
const SHUTDOWN_GRACE: Duration = Duration::from_secs(5);

/// Accept connections until a shutdown signal arrives.
///
/// Each accepted connection is served on its own task; the loop itself
/// only accepts, counts and enforces the connection limit.
pub async fn run(
    listener: TcpListener,
    state: Arc<AppState>,
) -> Result<(), Box<dyn std::error::Error>> {
    let signals = Arc::new(signal::SignalHandler::new());
    signal::start_signal_handler(Arc::clone(&signals));

    let active_connections = Arc::new(AtomicUsize::new(0));

    loop {
        tokio::select! {
            accept_result = listener.accept() => {
                match accept_result {
                    Ok((stream, peer_addr)) => {
                        connection::accept_connection(
                            stream,
                            peer_addr,
                            &state,
                            &active_connections,
                        );
                    }
                    Err(e) => {
                        logger::log_error(&format!("Failed to accept connection: {e}"));
                    }
                }
            }

            () = signals.shutdown.notified() => {
                logger::log_shutdown(active_connections.load(Ordering::SeqCst));
                break;
            }
        }
    }

    // Give in-flight requests a bounded window to finish
    let deadline = tokio::time::Instant::now() + SHUTDOWN_GRACE;
    while active_connections.load(Ordering::SeqCst) > 0 && tokio::time::Instant::now() < deadline {
        tokio::time::sleep(Duration::from_millis(50)).await;
    }

    Ok(())
}
