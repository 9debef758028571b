//! Shared in-memory test plumbing.
//!
//! Each test peer is one end of a duplex pipe whose other end is served by
//! the real handshake/router stack, so tests exercise the full connection
//! path without sockets.

#![allow(dead_code)]

use std::sync::Arc;

use courier_proto::frame;
use courier_server::{Connection, Directory, serve};
use tokio::io::{
    AsyncBufReadExt, AsyncWriteExt, BufReader, DuplexStream, ReadHalf, WriteHalf,
};

/// The client side of a served connection.
pub struct TestPeer {
    reader: BufReader<ReadHalf<DuplexStream>>,
    writer: WriteHalf<DuplexStream>,
    buf: Vec<u8>,
}

impl TestPeer {
    /// Encode and send one frame.
    pub async fn send(&mut self, fields: &[&str]) {
        let bytes = frame::encode(fields).unwrap();
        self.writer.write_all(&bytes).await.unwrap();
    }

    /// Send raw bytes, bypassing the codec.
    pub async fn send_raw(&mut self, bytes: &[u8]) {
        self.writer.write_all(bytes).await.unwrap();
    }

    /// Send the disconnect sentinel line.
    pub async fn send_sentinel(&mut self) {
        self.send_raw(&[frame::DISCONNECT, frame::FRAME_END]).await;
    }

    /// Read one raw line, or `None` on EOF.
    pub async fn recv_line(&mut self) -> Option<Vec<u8>> {
        self.buf.clear();
        let n = self.reader.read_until(frame::FRAME_END, &mut self.buf).await.unwrap();
        (n != 0).then(|| self.buf.clone())
    }

    /// Read and decode one frame, panicking on EOF or the sentinel.
    pub async fn recv(&mut self) -> Vec<String> {
        let line = self.recv_line().await.expect("server closed the connection");
        assert!(!frame::is_disconnect(&line), "unexpected disconnect sentinel");
        frame::decode(&line).unwrap()
    }

    /// Assert the next read is the echoed disconnect sentinel.
    pub async fn expect_disconnect_ack(&mut self) {
        let line = self.recv_line().await.expect("server closed without sentinel echo");
        assert_eq!(line, frame::DISCONNECT_ACK.to_vec());
    }

    /// Assert the server has closed this connection.
    pub async fn expect_closed(&mut self) {
        assert_eq!(self.recv_line().await, None);
    }
}

/// Open a fresh connection served by the full handshake/router stack.
pub fn connect(directory: &Arc<Directory>) -> TestPeer {
    let (near, far) = tokio::io::duplex(4096);
    let (read, write) = tokio::io::split(far);
    tokio::spawn(serve(Connection::new(Box::new(read), Box::new(write)), Arc::clone(directory)));

    let (read, write) = tokio::io::split(near);
    TestPeer { reader: BufReader::new(read), writer: write, buf: Vec::new() }
}

/// Register a fresh user and consume the `SUCCESS` and `WELCOME` frames.
pub async fn register(
    directory: &Arc<Directory>,
    username: &str,
    email: &str,
    password: &str,
) -> TestPeer {
    let mut peer = connect(directory);
    peer.send(&["REGISTER", username, email, password]).await;
    assert_eq!(peer.recv().await, vec!["SUCCESS"]);
    assert_eq!(
        peer.recv().await,
        vec!["WELCOME".to_owned(), format!("Welcome {username}!")]
    );
    peer
}

/// Wait until a session's receive loop has detached its transport.
pub async fn wait_until_offline(directory: &Arc<Directory>, username: &str) {
    let session = directory.lookup(username).expect("session not registered");
    while session.is_active().await {
        tokio::task::yield_now().await;
    }
}
