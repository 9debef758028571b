//! Client error types.

use courier_proto::FrameError;
use thiserror::Error;

/// Errors from client operations.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Underlying socket failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The server answered a handshake with `FAIL` and closed.
    #[error("server rejected the request")]
    Rejected,

    /// The server sent a line that did not decode as a frame.
    #[error("malformed frame from server: {0}")]
    Frame(#[from] FrameError),

    /// The server sent a frame the client cannot interpret here.
    #[error("unexpected reply: {0:?}")]
    UnexpectedReply(Vec<String>),

    /// The server closed the connection.
    #[error("connection closed by server")]
    ConnectionClosed,
}
