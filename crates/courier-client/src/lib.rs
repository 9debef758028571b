//! Courier client connection.
//!
//! An async library counterpart to the server: connect, register or log
//! in, then drive the session with friend and message commands while
//! consuming pushed [`ServerEvent`]s. Used by the server's end-to-end
//! tests and by downstream tooling.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod client;
mod error;
mod event;

pub use client::{ActiveClient, Client, FriendHistory};
pub use error::ClientError;
pub use event::ServerEvent;
