// Server module entry
// Accept loop: one task per connection, no shared mutable state

pub mod connection;
pub mod listener;

pub use connection::spawn_connection;
pub use listener::create_listener;

use std::sync::Arc;
use tokio::net::TcpListener;

use crate::config::AppState;
use crate::logger;

/// Accept connections forever
///
/// Accept errors (e.g. file descriptor exhaustion) are logged and the loop
/// keeps going; process termination is the only way out.
pub async fn run(listener: TcpListener, state: Arc<AppState>) {
    loop {
        match listener.accept().await {
            Ok((stream, peer_addr)) => spawn_connection(stream, peer_addr, Arc::clone(&state)),
            Err(e) => logger::log_error(&format!("Failed to accept connection: {e}")),
        }
    }
}
