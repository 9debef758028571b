//! Client connection state machine.
//!
//! A [`Client`] is an unauthenticated connection; [`Client::register`] and
//! [`Client::login`] consume it and return an [`ActiveClient`] bound to a
//! server-side session. The active client sends friend and message
//! commands and surfaces server pushes as [`ServerEvent`]s.

use courier_proto::frame;
use tokio::{
    io::{AsyncBufReadExt, AsyncWriteExt, BufReader},
    net::{
        TcpStream, ToSocketAddrs,
        tcp::{OwnedReadHalf, OwnedWriteHalf},
    },
};

use crate::{error::ClientError, event::ServerEvent};

/// One friend entry from a login payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FriendHistory {
    /// The friend's username.
    pub username: String,
    /// The mirrored transcript as stored on the server, one line per
    /// trailing `\n`.
    pub transcript: String,
}

/// A line read from the server.
enum Incoming {
    Fields(Vec<String>),
    Sentinel,
    Closed,
}

/// An unauthenticated connection awaiting its handshake.
pub struct Client {
    reader: BufReader<OwnedReadHalf>,
    writer: OwnedWriteHalf,
    buf: Vec<u8>,
}

impl Client {
    /// Open a TCP connection to a Courier server.
    ///
    /// # Errors
    ///
    /// Returns the connection failure.
    pub async fn connect(addr: impl ToSocketAddrs) -> Result<Self, ClientError> {
        let stream = TcpStream::connect(addr).await?;
        let (read, write) = stream.into_split();
        Ok(Self { reader: BufReader::new(read), writer: write, buf: Vec::with_capacity(256) })
    }

    async fn send<S: AsRef<str>>(&mut self, fields: &[S]) -> Result<(), ClientError> {
        let bytes = frame::encode(fields)?;
        self.writer.write_all(&bytes).await?;
        self.writer.flush().await?;
        Ok(())
    }

    async fn recv(&mut self) -> Result<Incoming, ClientError> {
        self.buf.clear();
        let n = self.reader.read_until(frame::FRAME_END, &mut self.buf).await?;
        if n == 0 {
            return Ok(Incoming::Closed);
        }
        if frame::is_disconnect(&self.buf) {
            return Ok(Incoming::Sentinel);
        }
        Ok(Incoming::Fields(frame::decode(&self.buf)?))
    }

    /// Register a new account over this connection.
    ///
    /// # Errors
    ///
    /// [`ClientError::Rejected`] when the username or email is already
    /// taken; transport errors otherwise.
    pub async fn register(
        mut self,
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<ActiveClient, ClientError> {
        self.send(&["REGISTER", username, email, password]).await?;
        match self.recv().await? {
            Incoming::Fields(fields) => match fields.first().map(String::as_str) {
                Some("SUCCESS") => Ok(ActiveClient { inner: self, username: username.to_owned() }),
                Some("FAIL") => Err(ClientError::Rejected),
                _ => Err(ClientError::UnexpectedReply(fields)),
            },
            Incoming::Sentinel | Incoming::Closed => Err(ClientError::ConnectionClosed),
        }
    }

    /// Log into an existing account over this connection.
    ///
    /// On success also returns the stored friends with their mirrored
    /// transcripts, in the order the server listed them.
    ///
    /// # Errors
    ///
    /// [`ClientError::Rejected`] for an unknown user, a wrong password, or
    /// a session that is already bound elsewhere.
    pub async fn login(
        mut self,
        username: &str,
        password: &str,
    ) -> Result<(ActiveClient, Vec<FriendHistory>), ClientError> {
        self.send(&["LOGIN", username, "", password]).await?;
        match self.recv().await? {
            Incoming::Fields(fields) => match fields.first().map(String::as_str) {
                Some("SUCCESS") => {
                    let mut friends = Vec::new();
                    for pair in fields[1..].chunks(2) {
                        let [friend, transcript] = pair else {
                            return Err(ClientError::UnexpectedReply(fields.clone()));
                        };
                        friends.push(FriendHistory {
                            username: friend.clone(),
                            transcript: transcript.clone(),
                        });
                    }
                    let client =
                        ActiveClient { inner: self, username: username.to_owned() };
                    Ok((client, friends))
                },
                Some("FAIL") => Err(ClientError::Rejected),
                _ => Err(ClientError::UnexpectedReply(fields)),
            },
            Incoming::Sentinel | Incoming::Closed => Err(ClientError::ConnectionClosed),
        }
    }
}

impl std::fmt::Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client").finish_non_exhaustive()
    }
}

/// A connection bound to a server-side session.
pub struct ActiveClient {
    inner: Client,
    username: String,
}

impl ActiveClient {
    /// The username this session is bound to.
    pub fn username(&self) -> &str {
        &self.username
    }

    /// Request a symmetric friendship with `username`.
    ///
    /// The outcome arrives as a [`ServerEvent::FriendAdded`] or
    /// [`ServerEvent::FriendAddRejected`] push.
    pub async fn add_friend(&mut self, username: &str) -> Result<(), ClientError> {
        self.inner.send(&["ADDFRIEND", username]).await
    }

    /// Request removal of the friendship with `username`.
    pub async fn remove_friend(&mut self, username: &str) -> Result<(), ClientError> {
        self.inner.send(&["REMOVEFRIEND", username]).await
    }

    /// Send a text message to a friend.
    ///
    /// The server does not acknowledge messages; a message to a non-friend
    /// is silently dropped.
    pub async fn send_message(&mut self, to: &str, text: &str) -> Result<(), ClientError> {
        self.inner.send(&["MESSAGE", to, text]).await
    }

    /// Wait for the next server push.
    ///
    /// # Errors
    ///
    /// [`ClientError::ConnectionClosed`] once the server has gone away.
    pub async fn next_event(&mut self) -> Result<ServerEvent, ClientError> {
        match self.inner.recv().await? {
            Incoming::Fields(fields) => Ok(ServerEvent::from_fields(fields)),
            Incoming::Sentinel => Ok(ServerEvent::Disconnected),
            Incoming::Closed => Err(ClientError::ConnectionClosed),
        }
    }

    /// Send the disconnect sentinel and wait for the server's echo.
    ///
    /// Pushes that race the sentinel are discarded. The server keeps the
    /// session's friends and transcripts for the next login.
    pub async fn disconnect(mut self) -> Result<(), ClientError> {
        self.inner.writer.write_all(&[frame::DISCONNECT, frame::FRAME_END]).await?;
        self.inner.writer.flush().await?;
        loop {
            match self.inner.recv().await? {
                Incoming::Sentinel | Incoming::Closed => return Ok(()),
                Incoming::Fields(_) => {},
            }
        }
    }
}

impl std::fmt::Debug for ActiveClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActiveClient").field("username", &self.username).finish_non_exhaustive()
    }
}
