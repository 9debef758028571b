//! Courier wire protocol.
//!
//! Courier frames are single lines: every field is preceded by a reserved
//! delimiter byte, embedded line breaks are substituted with a holder byte,
//! and the line ends with `\n`. A line whose first byte is the disconnect
//! sentinel is a transport-level close signal rather than a frame.
//!
//! This crate is sans-IO: it converts between field lists and bytes
//! ([`frame`]) and between field lists and typed commands/replies
//! ([`command`], [`reply`]). Reading and writing lines is the transport
//! layer's job.

pub mod command;
pub mod frame;
pub mod reply;

pub use command::{Command, CommandError};
pub use frame::FrameError;
