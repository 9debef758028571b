//! Server error types.

use thiserror::Error;

/// Errors that can occur in the server runtime.
#[derive(Debug, Error)]
pub enum ServerError {
    /// Socket setup, accept, or address resolution failure.
    #[error("transport error: {0}")]
    Transport(#[from] std::io::Error),
}
