//! Frames pushed by the server during a bound session.

/// A server push, decoded from one frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServerEvent {
    /// Greeting sent right after the transport is bound.
    Welcome(String),

    /// A friendship involving this user was established.
    FriendAdded {
        /// The other user of the new pair.
        username: String,
    },

    /// An `ADDFRIEND` request of ours was refused.
    FriendAddRejected {
        /// The username we tried to befriend.
        username: String,
    },

    /// A friendship involving this user was dissolved.
    FriendRemoved {
        /// The other user of the dropped pair.
        username: String,
    },

    /// A `REMOVEFRIEND` request of ours was refused.
    FriendRemoveRejected {
        /// The username we tried to drop.
        username: String,
    },

    /// A live message from a friend.
    Message {
        /// Sending friend.
        from: String,
        /// Message body.
        text: String,
    },

    /// The server acknowledged our disconnect sentinel.
    Disconnected,

    /// A frame shape this client version does not know.
    Unknown(Vec<String>),
}

impl ServerEvent {
    /// Classify a decoded frame.
    pub fn from_fields(fields: Vec<String>) -> Self {
        match fields.iter().map(String::as_str).collect::<Vec<_>>().as_slice() {
            ["WELCOME", text] => Self::Welcome((*text).to_owned()),
            ["ADDFRIEND", "SUCCESS", username] => {
                Self::FriendAdded { username: (*username).to_owned() }
            },
            ["ADDFRIEND", "FAIL", username] => {
                Self::FriendAddRejected { username: (*username).to_owned() }
            },
            ["REMOVEFRIEND", "SUCCESS", username] => {
                Self::FriendRemoved { username: (*username).to_owned() }
            },
            ["REMOVEFRIEND", "FAIL", username] => {
                Self::FriendRemoveRejected { username: (*username).to_owned() }
            },
            ["MESSAGE", from, text] => {
                Self::Message { from: (*from).to_owned(), text: (*text).to_owned() }
            },
            _ => Self::Unknown(fields),
        }
    }
}
