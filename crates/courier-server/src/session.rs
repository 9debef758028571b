//! Logical user session.
//!
//! A [`Session`] is the per-user state that outlives any single connection:
//! credentials, the friend set, the per-friend transcripts, and whichever
//! transport is currently bound. It is created once at registration and
//! never deleted; logging out only clears the transport.
//!
//! All mutable state sits behind one async mutex. Relaying a frame to a
//! peer and rebinding that peer's transport both go through the same lock,
//! so a frame is never written to a transport mid-swap. Operations that
//! touch two sessions acquire both locks via [`lock_pair`], which orders by
//! username.

use std::{
    collections::{BTreeMap, BTreeSet},
    fmt, io,
    sync::Arc,
};

use tokio::sync::{Mutex, MutexGuard};

use crate::transport::FrameWriter;

/// Per-user logical session.
pub struct Session {
    username: String,
    email: String,
    password: String,
    state: Mutex<SessionState>,
}

/// The lock-guarded mutable half of a [`Session`].
#[derive(Default)]
pub struct SessionState {
    friends: BTreeSet<String>,
    transcripts: BTreeMap<String, Vec<String>>,
    transport: Option<FrameWriter>,
}

impl Session {
    /// Create a fresh session with no friends and no bound transport.
    pub fn new(
        username: impl Into<String>,
        email: impl Into<String>,
        password: impl Into<String>,
    ) -> Arc<Self> {
        Arc::new(Self {
            username: username.into(),
            email: email.into(),
            password: password.into(),
            state: Mutex::new(SessionState::default()),
        })
    }

    /// Unique, immutable username.
    pub fn username(&self) -> &str {
        &self.username
    }

    /// Unique, immutable email address.
    pub fn email(&self) -> &str {
        &self.email
    }

    /// Compare a login credential against the stored one.
    pub fn password_matches(&self, candidate: &str) -> bool {
        self.password == candidate
    }

    /// Lock the mutable state.
    pub async fn lock(&self) -> MutexGuard<'_, SessionState> {
        self.state.lock().await
    }

    /// Whether a transport is currently bound.
    pub async fn is_active(&self) -> bool {
        self.lock().await.is_active()
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("username", &self.username)
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish_non_exhaustive()
    }
}

impl SessionState {
    /// Whether a transport is bound.
    pub fn is_active(&self) -> bool {
        self.transport.is_some()
    }

    /// Bind a transport, returning the previous one if any.
    ///
    /// The handshake only calls this after the activity check, so a live
    /// transport is never displaced; the return value exists for tests.
    pub fn bind(&mut self, writer: FrameWriter) -> Option<FrameWriter> {
        self.transport.replace(writer)
    }

    /// Detach the bound transport, leaving the session offline.
    pub fn detach(&mut self) -> Option<FrameWriter> {
        self.transport.take()
    }

    /// Whether `username` is an established friend.
    pub fn is_friend(&self, username: &str) -> bool {
        self.friends.contains(username)
    }

    /// Current friends, in deterministic order.
    pub fn friends(&self) -> impl Iterator<Item = &str> {
        self.friends.iter().map(String::as_str)
    }

    /// Insert a friend and its empty transcript.
    ///
    /// Returns false if the friendship already exists.
    pub fn add_friend(&mut self, username: &str) -> bool {
        if !self.friends.insert(username.to_owned()) {
            return false;
        }
        self.transcripts.insert(username.to_owned(), Vec::new());
        true
    }

    /// Drop a friend and its transcript.
    ///
    /// Returns false if there was no such friend.
    pub fn remove_friend(&mut self, username: &str) -> bool {
        if !self.friends.remove(username) {
            return false;
        }
        self.transcripts.remove(username);
        true
    }

    /// Append one line to a friend's transcript.
    ///
    /// Lines for usernames without a transcript are discarded; the router
    /// only appends between established friends.
    pub fn append_line(&mut self, friend: &str, line: String) {
        if let Some(lines) = self.transcripts.get_mut(friend) {
            lines.push(line);
        }
    }

    /// A friend's transcript lines.
    pub fn transcript(&self, friend: &str) -> Option<&[String]> {
        self.transcripts.get(friend).map(Vec::as_slice)
    }

    /// Flatten a friend's transcript into one login-payload field, each
    /// line followed by `\n`.
    pub fn transcript_text(&self, friend: &str) -> String {
        self.transcripts.get(friend).map_or_else(String::new, |lines| {
            let mut text = String::new();
            for line in lines {
                text.push_str(line);
                text.push('\n');
            }
            text
        })
    }

    /// Write a frame to the bound transport, if any.
    ///
    /// Returns `Ok(false)` when the session is offline. A failed write
    /// detaches the dead transport before surfacing the error.
    pub async fn push<S: AsRef<str>>(&mut self, fields: &[S]) -> io::Result<bool> {
        let Some(writer) = self.transport.as_mut() else {
            return Ok(false);
        };
        match writer.send(fields).await {
            Ok(()) => Ok(true),
            Err(err) => {
                self.transport = None;
                Err(err)
            },
        }
    }

}

impl fmt::Debug for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionState")
            .field("friends", &self.friends)
            .field("active", &self.is_active())
            .finish_non_exhaustive()
    }
}

/// Lock two distinct sessions in username order.
///
/// Guards are returned in argument order. Callers must not pass the same
/// session twice; command handlers reject self-targeting before locking.
pub async fn lock_pair<'a>(
    a: &'a Session,
    b: &'a Session,
) -> (MutexGuard<'a, SessionState>, MutexGuard<'a, SessionState>) {
    if a.username() < b.username() {
        let first = a.lock().await;
        let second = b.lock().await;
        (first, second)
    } else {
        let second = b.lock().await;
        let first = a.lock().await;
        (first, second)
    }
}
