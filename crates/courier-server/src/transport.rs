//! Framed line transport.
//!
//! The rest of the server consumes a connection as two capabilities: read
//! the next framed line ([`FrameReader`]) and write framed lines
//! ([`FrameWriter`]). Both halves are boxed `AsyncRead`/`AsyncWrite`
//! objects, so production code hands in TCP stream halves and tests hand in
//! in-memory duplex pipes.

use std::io;

use courier_proto::frame::{self, FrameError};
use tokio::{
    io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader},
    net::TcpStream,
};

/// Boxed read half of a connection.
pub type BoxedRead = Box<dyn AsyncRead + Send + Unpin>;

/// Boxed write half of a connection.
pub type BoxedWrite = Box<dyn AsyncWrite + Send + Unpin>;

/// One framed line read from the peer.
#[derive(Debug)]
pub enum ReadEvent {
    /// A decoded frame.
    Frame(Vec<String>),

    /// A line that was neither a frame nor the sentinel. The connection is
    /// still usable; the caller decides whether to skip or reject.
    Malformed(FrameError),

    /// The client-initiated disconnect sentinel.
    Disconnect,

    /// The peer closed the stream.
    Closed,
}

/// Reads framed lines from the receive half of a connection.
pub struct FrameReader {
    reader: BufReader<BoxedRead>,
    buf: Vec<u8>,
}

impl FrameReader {
    /// Wrap a read half.
    pub fn new(read: BoxedRead) -> Self {
        Self { reader: BufReader::new(read), buf: Vec::with_capacity(256) }
    }

    /// Read the next line and classify it.
    ///
    /// Suspends until a full line arrives; this is the only suspension
    /// point of a session worker.
    ///
    /// # Errors
    ///
    /// Returns the underlying I/O error; the connection is unusable after
    /// that.
    pub async fn next_event(&mut self) -> io::Result<ReadEvent> {
        self.buf.clear();
        let n = self.reader.read_until(frame::FRAME_END, &mut self.buf).await?;
        if n == 0 {
            return Ok(ReadEvent::Closed);
        }
        if frame::is_disconnect(&self.buf) {
            return Ok(ReadEvent::Disconnect);
        }
        match frame::decode(&self.buf) {
            Ok(fields) => Ok(ReadEvent::Frame(fields)),
            Err(err) => Ok(ReadEvent::Malformed(err)),
        }
    }
}

impl std::fmt::Debug for FrameReader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FrameReader").finish_non_exhaustive()
    }
}

/// Writes framed lines to the send half of a connection.
pub struct FrameWriter {
    writer: BoxedWrite,
}

impl FrameWriter {
    /// Wrap a write half.
    pub fn new(write: BoxedWrite) -> Self {
        Self { writer: write }
    }

    /// Encode and write one frame, flushing it onto the wire.
    ///
    /// # Errors
    ///
    /// Returns the underlying I/O error, or `InvalidData` if the fields
    /// cannot be framed (reserved bytes in content).
    pub async fn send<S: AsRef<str>>(&mut self, fields: &[S]) -> io::Result<()> {
        let bytes = frame::encode(fields)
            .map_err(|err| io::Error::new(io::ErrorKind::InvalidData, err))?;
        self.writer.write_all(&bytes).await?;
        self.writer.flush().await
    }

    /// Echo the disconnect sentinel back to the peer.
    pub async fn send_disconnect_ack(&mut self) -> io::Result<()> {
        self.writer.write_all(&frame::DISCONNECT_ACK).await?;
        self.writer.flush().await
    }

    /// Close the send half.
    pub async fn shutdown(&mut self) -> io::Result<()> {
        self.writer.shutdown().await
    }
}

impl std::fmt::Debug for FrameWriter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FrameWriter").finish_non_exhaustive()
    }
}

/// Both halves of a connection not yet bound to a session.
#[derive(Debug)]
pub struct Connection {
    /// Receive half.
    pub reader: FrameReader,
    /// Send half.
    pub writer: FrameWriter,
}

impl Connection {
    /// Build a connection from boxed halves.
    pub fn new(read: BoxedRead, write: BoxedWrite) -> Self {
        Self { reader: FrameReader::new(read), writer: FrameWriter::new(write) }
    }

    /// Build a connection from an accepted TCP stream.
    pub fn from_stream(stream: TcpStream) -> Self {
        let (read, write) = stream.into_split();
        Self::new(Box::new(read), Box::new(write))
    }
}
