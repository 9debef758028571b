//! Client→server command vocabulary.
//!
//! A decoded frame is a field list whose leading field names the command.
//! [`Command::parse`] turns that list into a typed value; command names the
//! protocol does not know parse to [`Command::Unknown`] so the caller can
//! ignore them, while a known command with missing fields is an error the
//! caller must not crash on.

use thiserror::Error;

/// A parsed client command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Create a new account and bind the connection to it.
    Register {
        /// Requested unique username.
        username: String,
        /// Requested unique email address.
        email: String,
        /// Opaque credential, compared by equality at login.
        password: String,
    },

    /// Bind the connection to an existing account.
    ///
    /// The wire shape carries an unused field between username and password
    /// where `REGISTER` carries the email; it is ignored here.
    Login {
        /// Account to log into.
        username: String,
        /// Credential to compare against the stored one.
        password: String,
    },

    /// Add a user to the friend list, symmetrically.
    AddFriend {
        /// Username of the user to befriend.
        username: String,
    },

    /// Remove a user from the friend list, symmetrically.
    RemoveFriend {
        /// Username of the friend to drop.
        username: String,
    },

    /// Send a text message to a friend.
    Message {
        /// Username of the receiving friend.
        to: String,
        /// Message body.
        text: String,
    },

    /// A command name this protocol version does not know.
    Unknown {
        /// The leading field as received.
        name: String,
    },
}

/// Errors from parsing a field list into a [`Command`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CommandError {
    /// The frame had no fields at all.
    #[error("empty command frame")]
    Empty,

    /// A known command was missing a required field.
    #[error("{command} frame is missing the {field} field")]
    MissingField {
        /// The command name.
        command: &'static str,
        /// The missing field.
        field: &'static str,
    },
}

impl Command {
    /// Parse a decoded field list.
    ///
    /// # Errors
    ///
    /// Returns [`CommandError`] when the list is empty or a known command
    /// lacks one of its fields.
    pub fn parse(fields: &[String]) -> Result<Self, CommandError> {
        let (name, args) = fields.split_first().ok_or(CommandError::Empty)?;
        match name.as_str() {
            "REGISTER" => Ok(Self::Register {
                username: required(args, 0, "REGISTER", "username")?,
                email: required(args, 1, "REGISTER", "email")?,
                password: required(args, 2, "REGISTER", "password")?,
            }),
            "LOGIN" => Ok(Self::Login {
                username: required(args, 0, "LOGIN", "username")?,
                // args[1] mirrors the REGISTER email slot and is unused.
                password: required(args, 2, "LOGIN", "password")?,
            }),
            "ADDFRIEND" => Ok(Self::AddFriend {
                username: required(args, 0, "ADDFRIEND", "username")?,
            }),
            "REMOVEFRIEND" => Ok(Self::RemoveFriend {
                username: required(args, 0, "REMOVEFRIEND", "username")?,
            }),
            "MESSAGE" => Ok(Self::Message {
                to: required(args, 0, "MESSAGE", "username")?,
                text: required(args, 1, "MESSAGE", "text")?,
            }),
            _ => Ok(Self::Unknown { name: name.clone() }),
        }
    }
}

fn required(
    args: &[String],
    index: usize,
    command: &'static str,
    field: &'static str,
) -> Result<String, CommandError> {
    args.get(index).cloned().ok_or(CommandError::MissingField { command, field })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields(raw: &[&str]) -> Vec<String> {
        raw.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn parses_register() {
        let cmd = Command::parse(&fields(&["REGISTER", "alice", "alice@example.com", "pw"]));
        assert_eq!(
            cmd,
            Ok(Command::Register {
                username: "alice".into(),
                email: "alice@example.com".into(),
                password: "pw".into(),
            })
        );
    }

    #[test]
    fn parses_login_and_ignores_email_slot() {
        let cmd = Command::parse(&fields(&["LOGIN", "alice", "", "pw"]));
        assert_eq!(cmd, Ok(Command::Login { username: "alice".into(), password: "pw".into() }));
    }

    #[test]
    fn parses_friend_commands() {
        assert_eq!(
            Command::parse(&fields(&["ADDFRIEND", "bob"])),
            Ok(Command::AddFriend { username: "bob".into() })
        );
        assert_eq!(
            Command::parse(&fields(&["REMOVEFRIEND", "bob"])),
            Ok(Command::RemoveFriend { username: "bob".into() })
        );
    }

    #[test]
    fn parses_message() {
        assert_eq!(
            Command::parse(&fields(&["MESSAGE", "bob", "hi there"])),
            Ok(Command::Message { to: "bob".into(), text: "hi there".into() })
        );
    }

    #[test]
    fn unknown_name_is_not_an_error() {
        assert_eq!(
            Command::parse(&fields(&["FROBNICATE", "x"])),
            Ok(Command::Unknown { name: "FROBNICATE".into() })
        );
    }

    #[test]
    fn empty_frame_is_an_error() {
        assert_eq!(Command::parse(&[]), Err(CommandError::Empty));
    }

    #[test]
    fn missing_fields_are_errors() {
        assert_eq!(
            Command::parse(&fields(&["LOGIN", "alice"])),
            Err(CommandError::MissingField { command: "LOGIN", field: "password" })
        );
        assert_eq!(
            Command::parse(&fields(&["MESSAGE", "bob"])),
            Err(CommandError::MissingField { command: "MESSAGE", field: "text" })
        );
        assert_eq!(
            Command::parse(&fields(&["ADDFRIEND"])),
            Err(CommandError::MissingField { command: "ADDFRIEND", field: "username" })
        );
    }
}
