//! Message router.
//!
//! The router owns a bound session's receive loop: greet, then decode and
//! dispatch frames until the client sends the disconnect sentinel, the
//! stream closes, or I/O fails. Friend and message commands mutate both
//! sides of the pair and relay to the peer's transport when it is online.
//!
//! Dispatch rules:
//!
//! - `ADDFRIEND` / `REMOVEFRIEND` mutate the relation symmetrically, reply
//!   `SUCCESS`/`FAIL` to the requester and push a `SUCCESS` notice to the
//!   affected peer when active.
//! - `MESSAGE` is friend-gated: transcripts on both sides record the line,
//!   the peer gets a live relay only while online, and a message to a
//!   non-friend is dropped without a reply.
//! - Unknown commands and malformed frames are logged and skipped.
//!
//! Whatever ends the loop, the transport is detached and the session stays
//! registered for a later login.

use std::io;

use courier_proto::{Command, reply};
use tracing::{debug, info, warn};

use crate::{
    directory::Directory,
    session::{Session, lock_pair},
    transport::{FrameReader, ReadEvent},
};

/// Transcript line recorded on both sides when a friendship forms.
fn friendship_line(other: &str) -> String {
    format!("ADDFRIEND SUCCESS: {other}")
}

/// Run the receive loop for a freshly bound session.
///
/// # Errors
///
/// Returns the I/O error that ended the loop, if it was not a clean
/// disconnect. The session is detached either way.
pub async fn run(
    session: &Session,
    directory: &Directory,
    mut reader: FrameReader,
) -> io::Result<()> {
    let greeted = session.lock().await.push(&reply::welcome(session.username())).await;

    let result = match greeted {
        Ok(_) => receive_loop(session, directory, &mut reader).await,
        Err(err) => Err(err),
    };

    if let Some(mut writer) = session.lock().await.detach() {
        let _ = writer.shutdown().await;
    }
    info!(username = session.username(), "session detached");

    result
}

async fn receive_loop(
    session: &Session,
    directory: &Directory,
    reader: &mut FrameReader,
) -> io::Result<()> {
    loop {
        match reader.next_event().await? {
            ReadEvent::Frame(fields) => dispatch(session, directory, &fields).await?,
            ReadEvent::Malformed(err) => {
                warn!(username = session.username(), "skipping malformed frame: {err}");
            },
            ReadEvent::Disconnect => {
                // Detach before echoing: once the client sees the ack, the
                // session is already free for the next login.
                if let Some(mut writer) = session.lock().await.detach() {
                    let _ = writer.send_disconnect_ack().await;
                    let _ = writer.shutdown().await;
                }
                debug!(username = session.username(), "client disconnected");
                return Ok(());
            },
            ReadEvent::Closed => return Ok(()),
        }
    }
}

async fn dispatch(session: &Session, directory: &Directory, fields: &[String]) -> io::Result<()> {
    match Command::parse(fields) {
        Ok(Command::AddFriend { username }) => add_friend(session, directory, &username).await,
        Ok(Command::RemoveFriend { username }) => {
            remove_friend(session, directory, &username).await
        },
        Ok(Command::Message { to, text }) => relay_message(session, directory, &to, &text).await,
        Ok(Command::Register { .. } | Command::Login { .. }) => {
            // Handshake commands carry no meaning on a bound session.
            debug!(username = session.username(), "ignoring handshake command mid-session");
            Ok(())
        },
        Ok(Command::Unknown { name }) => {
            debug!(username = session.username(), command = %name, "ignoring unknown command");
            Ok(())
        },
        Err(err) => {
            warn!(username = session.username(), "skipping bad command frame: {err}");
            Ok(())
        },
    }
}

/// `ADDFRIEND <username>`: establish the symmetric relation.
async fn add_friend(session: &Session, directory: &Directory, name: &str) -> io::Result<()> {
    let me = session.username();

    let target = if name == me { None } else { directory.lookup(name) };
    let Some(target) = target else {
        session.lock().await.push(&reply::add_friend(false, name)).await?;
        return Ok(());
    };

    let (mut mine, mut theirs) = lock_pair(session, &target).await;
    if !mine.add_friend(name) {
        drop(theirs);
        mine.push(&reply::add_friend(false, name)).await?;
        return Ok(());
    }
    theirs.add_friend(me);
    mine.append_line(name, friendship_line(name));
    theirs.append_line(me, friendship_line(me));

    mine.push(&reply::add_friend(true, name)).await?;
    if let Err(err) = theirs.push(&reply::add_friend(true, me)).await {
        warn!(peer = name, "dropping dead transport during friend notice: {err}");
    }

    info!(username = me, friend = name, "friendship established");
    Ok(())
}

/// `REMOVEFRIEND <username>`: drop the relation and both transcripts.
async fn remove_friend(session: &Session, directory: &Directory, name: &str) -> io::Result<()> {
    let me = session.username();

    let target = if name == me { None } else { directory.lookup(name) };
    let Some(target) = target else {
        session.lock().await.push(&reply::remove_friend(false, name)).await?;
        return Ok(());
    };

    let (mut mine, mut theirs) = lock_pair(session, &target).await;
    if !mine.remove_friend(name) {
        drop(theirs);
        mine.push(&reply::remove_friend(false, name)).await?;
        return Ok(());
    }
    theirs.remove_friend(me);

    mine.push(&reply::remove_friend(true, name)).await?;
    if let Err(err) = theirs.push(&reply::remove_friend(true, me)).await {
        warn!(peer = name, "dropping dead transport during friend notice: {err}");
    }

    info!(username = me, friend = name, "friendship removed");
    Ok(())
}

/// `MESSAGE <username> <text>`: transcribe on both sides, relay live when
/// the friend is online. Messages outside an established friendship are
/// dropped without a reply.
async fn relay_message(
    session: &Session,
    directory: &Directory,
    to: &str,
    text: &str,
) -> io::Result<()> {
    let me = session.username();

    let target = if to == me { None } else { directory.lookup(to) };
    let Some(target) = target else {
        debug!(username = me, to, "dropping message to unknown user");
        return Ok(());
    };

    let (mut mine, mut theirs) = lock_pair(session, &target).await;
    if !mine.is_friend(to) {
        debug!(username = me, to, "dropping message to non-friend");
        return Ok(());
    }

    let line = format!("{me}: {text}");
    mine.append_line(to, line.clone());
    theirs.append_line(me, line);

    match theirs.push(&reply::relay_message(me, text)).await {
        Ok(true) => debug!(username = me, to, "message relayed"),
        Ok(false) => debug!(username = me, to, "message buffered for offline friend"),
        Err(err) => {
            warn!(peer = to, "dropping dead transport during relay: {err}");
        },
    }
    Ok(())
}
