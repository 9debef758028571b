//! Frame codec.
//!
//! One frame is one line. Each field is preceded by [`DELIM`]; carriage
//! returns and line feeds inside a field are replaced by [`NEWLINE_HOLDER`]
//! so the frame stays a single line for line-buffered transports; the frame
//! ends with a single `\n`.
//!
//! A `MESSAGE` frame from user `A` carrying `"Hello,\r\nWorld!"` is encoded
//! as:
//!
//! ```text
//! { 0xC9, 'M', 'E', 'S', 'S', 'A', 'G', 'E',
//!   0xC9, 'A',
//!   0xC9, 'H', 'e', 'l', 'l', 'o', ',', 0xC7, 0xC7, 'W', 'o', 'r', 'l', 'd', '!', '\n' }
//! ```
//!
//! Decoding maps a holder pair back to `\r\n` and a lone holder to `\n`.
//! The substitution keeps one holder byte per replaced byte, so a bare `\r`
//! is indistinguishable from `\n` on the wire and canonicalizes to `\n`.
//!
//! A line whose *first* byte is [`DISCONNECT`] is not a frame: it is the
//! client-initiated close signal, answered with [`DISCONNECT_ACK`].

use bytes::{BufMut, Bytes, BytesMut};
use thiserror::Error;

/// Reserved byte preceding every field of a frame.
pub const DELIM: u8 = 0xC9;

/// Reserved byte substituting embedded CR/LF inside a field.
pub const NEWLINE_HOLDER: u8 = 0xC7;

/// First byte of the disconnect sentinel line.
pub const DISCONNECT: u8 = 0xC8;

/// Terminating byte of every frame.
pub const FRAME_END: u8 = b'\n';

/// The two-byte reply to a disconnect sentinel, sent before closing.
pub const DISCONNECT_ACK: [u8; 2] = [DISCONNECT, FRAME_END];

/// Errors from frame encoding or decoding.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FrameError {
    /// A frame must carry at least one field.
    #[error("empty frame")]
    Empty,

    /// An incoming line did not start with the field delimiter.
    #[error("frame does not start with the field delimiter (first byte 0x{0:02x})")]
    MissingDelimiter(u8),

    /// A field to encode contained a reserved wire byte.
    #[error("field {index} contains reserved byte 0x{byte:02x}")]
    ReservedByte {
        /// Zero-based index of the offending field.
        index: usize,
        /// The reserved byte found in the field content.
        byte: u8,
    },

    /// A decoded field was not valid UTF-8.
    #[error("field {index} is not valid UTF-8")]
    InvalidUtf8 {
        /// Zero-based index of the offending field.
        index: usize,
    },
}

/// Encode an ordered field list into one wire line.
///
/// # Errors
///
/// Returns [`FrameError::Empty`] for an empty field list and
/// [`FrameError::ReservedByte`] if a field contains one of the reserved
/// bytes ([`DELIM`], [`NEWLINE_HOLDER`]) that cannot survive a round-trip.
pub fn encode<S: AsRef<str>>(fields: &[S]) -> Result<Bytes, FrameError> {
    if fields.is_empty() {
        return Err(FrameError::Empty);
    }

    let content: usize = fields.iter().map(|f| f.as_ref().len()).sum();
    let mut buf = BytesMut::with_capacity(content + fields.len() + 1);

    for (index, field) in fields.iter().enumerate() {
        buf.put_u8(DELIM);
        for &byte in field.as_ref().as_bytes() {
            match byte {
                b'\r' | b'\n' => buf.put_u8(NEWLINE_HOLDER),
                DELIM | NEWLINE_HOLDER => return Err(FrameError::ReservedByte { index, byte }),
                _ => buf.put_u8(byte),
            }
        }
    }
    buf.put_u8(FRAME_END);

    Ok(buf.freeze())
}

/// Decode one wire line into its ordered field list.
///
/// The trailing `\n` is optional; line-based readers may or may not have
/// stripped it already.
///
/// # Errors
///
/// Returns [`FrameError::Empty`] for an empty line,
/// [`FrameError::MissingDelimiter`] if the line does not open with
/// [`DELIM`], and [`FrameError::InvalidUtf8`] if a field does not decode
/// as UTF-8 text.
pub fn decode(line: &[u8]) -> Result<Vec<String>, FrameError> {
    let line = line.strip_suffix(&[FRAME_END]).unwrap_or(line);

    let Some((&first, rest)) = line.split_first() else {
        return Err(FrameError::Empty);
    };
    if first != DELIM {
        return Err(FrameError::MissingDelimiter(first));
    }

    let mut fields = Vec::new();
    for (index, raw) in rest.split(|&b| b == DELIM).enumerate() {
        let mut text = Vec::with_capacity(raw.len());
        let mut i = 0;
        while i < raw.len() {
            if raw[i] == NEWLINE_HOLDER {
                if raw.get(i + 1) == Some(&NEWLINE_HOLDER) {
                    text.extend_from_slice(b"\r\n");
                    i += 2;
                } else {
                    text.push(b'\n');
                    i += 1;
                }
            } else {
                text.push(raw[i]);
                i += 1;
            }
        }
        let field =
            String::from_utf8(text).map_err(|_| FrameError::InvalidUtf8 { index })?;
        fields.push(field);
    }

    Ok(fields)
}

/// Whether an incoming line is the disconnect sentinel.
pub fn is_disconnect(line: &[u8]) -> bool {
    line.first() == Some(&DISCONNECT)
}
