//! Connection handshake.
//!
//! A fresh connection sends exactly one frame: `REGISTER` or `LOGIN`. The
//! controller either creates a new session (registration) or rebinds an
//! existing one to the new transport (login), then hands the connection to
//! the router loop. Every other first line rejects the connection.
//!
//! States: `AwaitingFirstFrame → {Registering, LoggingIn} → Bound |
//! Rejected`. The activity check during login is the sole takeover guard: a
//! session rebinds only while no live transport is attached, so two
//! transports can never drive one session.

use std::{io, sync::Arc};

use courier_proto::{Command, reply};
use tracing::{debug, info, warn};

use crate::{
    directory::Directory,
    router,
    session::Session,
    transport::{Connection, FrameReader, FrameWriter, ReadEvent},
};

/// Terminal handshake states.
enum Outcome {
    /// The transport is bound to this session; run the router on it.
    Bound(Arc<Session>, FrameReader),
    /// The transport was refused and closed.
    Rejected,
}

/// Drive one connection from handshake through router loop to teardown.
///
/// # Errors
///
/// Returns the I/O error that ended the connection, if any. Rejected
/// handshakes are a normal outcome, not an error.
pub async fn serve(conn: Connection, directory: Arc<Directory>) -> io::Result<()> {
    match negotiate(conn, &directory).await? {
        Outcome::Bound(session, reader) => router::run(&session, &directory, reader).await,
        Outcome::Rejected => Ok(()),
    }
}

/// Read the first frame and dispatch to registration or login.
async fn negotiate(conn: Connection, directory: &Directory) -> io::Result<Outcome> {
    let Connection { mut reader, mut writer } = conn;

    let fields = match reader.next_event().await? {
        ReadEvent::Frame(fields) => fields,
        ReadEvent::Disconnect => {
            writer.send_disconnect_ack().await?;
            writer.shutdown().await?;
            return Ok(Outcome::Rejected);
        },
        ReadEvent::Closed => return Ok(Outcome::Rejected),
        ReadEvent::Malformed(err) => {
            warn!("malformed handshake frame: {err}");
            writer.shutdown().await?;
            return Ok(Outcome::Rejected);
        },
    };

    match Command::parse(&fields) {
        Ok(Command::Register { username, email, password }) => {
            register(reader, writer, directory, username, email, password).await
        },
        Ok(Command::Login { username, password }) => {
            login(reader, writer, directory, &username, &password).await
        },
        Ok(other) => {
            debug!(?other, "first frame is not a handshake command");
            reject(writer, reply::login_failure()).await
        },
        Err(err) => {
            warn!("bad handshake frame: {err}");
            reject(writer, reply::login_failure()).await
        },
    }
}

/// Send a refusal and close the transport.
async fn reject(mut writer: FrameWriter, fields: Vec<String>) -> io::Result<Outcome> {
    writer.send(&fields).await?;
    writer.shutdown().await?;
    Ok(Outcome::Rejected)
}

/// `REGISTER <username> <email> <password>`: claim both identities and
/// bind this transport to the new session.
async fn register(
    reader: FrameReader,
    mut writer: FrameWriter,
    directory: &Directory,
    username: String,
    email: String,
    password: String,
) -> io::Result<Outcome> {
    let session = Session::new(username, email, password);

    // Bind before inserting: the session must already be active when it
    // becomes discoverable, or a concurrent login could pass the activity
    // check and bind a second transport.
    session.lock().await.bind(writer);

    if let Err(err) = directory.register(Arc::clone(&session)) {
        debug!(username = session.username(), "registration refused: {err}");
        let Some(writer) = session.lock().await.detach() else {
            return Ok(Outcome::Rejected);
        };
        return reject(writer, reply::register_outcome(false)).await;
    }

    let sent = session.lock().await.push(&reply::register_outcome(true)).await;
    if let Err(err) = sent {
        // The client never learned it was registered; roll the claim back
        // so the identity stays available.
        directory.remove(session.username());
        return Err(err);
    }

    info!(username = session.username(), "registered");
    Ok(Outcome::Bound(session, reader))
}

/// `LOGIN <username> <_> <password>`: verify the credential against the
/// existing session and swap the new transport in.
async fn login(
    reader: FrameReader,
    mut writer: FrameWriter,
    directory: &Directory,
    username: &str,
    password: &str,
) -> io::Result<Outcome> {
    let Some(session) = directory.lookup(username) else {
        debug!(username, "login refused: unknown username");
        return reject(writer, reply::login_failure()).await;
    };

    let mut state = session.lock().await;
    if !session.password_matches(password) || state.is_active() {
        debug!(username, active = state.is_active(), "login refused");
        drop(state);
        return reject(writer, reply::login_failure()).await;
    }

    // Payload and rebind happen under the same lock, so no relay can slip
    // a frame in between.
    let payload = reply::login_success(
        state
            .friends()
            .map(|friend| (friend, state.transcript_text(friend)))
            .collect::<Vec<_>>(),
    );
    writer.send(&payload).await?;
    state.bind(writer);
    drop(state);

    info!(username, "logged in");
    Ok(Outcome::Bound(session, reader))
}
