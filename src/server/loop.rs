// Accept loop module
// Serves requests indefinitely; only external termination stops the process

use std::io;
use std::sync::Arc;
use tokio::net::TcpListener;

use super::connection::accept_connection;
use crate::config::AppState;
use crate::logger;

/// Run the accept loop forever.
///
/// An accept error affects a single connection attempt: it is logged and
/// the loop keeps going, so one bad client never takes the listener down.
pub async fn run(listener: TcpListener, state: Arc<AppState>) -> io::Result<()> {
    loop {
        match listener.accept().await {
            Ok((stream, peer_addr)) => {
                accept_connection(stream, peer_addr, &state);
            }
            Err(e) => {
                logger::log_error(&format!("Failed to accept connection: {e}"));
            }
        }
    }
}
