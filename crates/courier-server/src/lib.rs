//! Courier messaging server.
//!
//! Clients register or log in over a persistent TCP connection, maintain a
//! friend list, and exchange text messages that are relayed live or
//! buffered in transcripts while the receiver is offline. Logical sessions
//! outlive connections: a login rebinds a new transport to the stored
//! session without losing friends or history.
//!
//! ## Architecture
//!
//! ```text
//! courier-server
//!   ├─ Server        (TCP accept loop, one task per connection)
//!   ├─ handshake     (REGISTER/LOGIN state machine)
//!   ├─ router        (per-session receive loop + command dispatch)
//!   ├─ Session       (credentials, friends, transcripts, bound transport)
//!   ├─ Directory     (username → session registry, uniqueness authority)
//!   └─ transport     (framed line reads/writes over AsyncRead/AsyncWrite)
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod directory;
mod error;
mod handshake;
mod router;
mod session;
mod transport;

use std::sync::Arc;

pub use directory::{Directory, RegisterError};
pub use error::ServerError;
pub use handshake::serve;
pub use session::{Session, SessionState, lock_pair};
use tokio::net::TcpListener;
pub use transport::{BoxedRead, BoxedWrite, Connection, FrameReader, FrameWriter, ReadEvent};

/// Server configuration for the production runtime.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to bind to (e.g., "0.0.0.0:8877").
    pub bind_address: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { bind_address: "0.0.0.0:8877".to_owned() }
    }
}

/// Production Courier server.
///
/// Owns the listening socket and the process-wide session directory.
pub struct Server {
    listener: TcpListener,
    directory: Arc<Directory>,
}

impl Server {
    /// Create and bind a new server.
    ///
    /// # Errors
    ///
    /// Returns an error if binding to the address fails.
    pub async fn bind(config: ServerConfig) -> Result<Self, ServerError> {
        let listener = TcpListener::bind(&config.bind_address).await?;
        Ok(Self { listener, directory: Arc::new(Directory::new()) })
    }

    /// The process-wide session directory.
    pub fn directory(&self) -> &Arc<Directory> {
        &self.directory
    }

    /// Get the local address the server is bound to.
    pub fn local_addr(&self) -> Result<std::net::SocketAddr, ServerError> {
        Ok(self.listener.local_addr()?)
    }

    /// Run the server, accepting connections and spawning one worker task
    /// per connection.
    ///
    /// This method runs until the process is shut down; accept failures
    /// are logged and do not stop the loop.
    pub async fn run(self) -> Result<(), ServerError> {
        loop {
            match self.listener.accept().await {
                Ok((stream, addr)) => {
                    tracing::debug!(%addr, "new connection");
                    let directory = Arc::clone(&self.directory);
                    tokio::spawn(async move {
                        if let Err(err) = serve(Connection::from_stream(stream), directory).await {
                            tracing::debug!(%addr, "connection error: {err}");
                        }
                    });
                },
                Err(err) => {
                    tracing::error!("accept error: {err}");
                },
            }
        }
    }
}

impl std::fmt::Debug for Server {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Server")
            .field("sessions", &self.directory.len())
            .finish_non_exhaustive()
    }
}
