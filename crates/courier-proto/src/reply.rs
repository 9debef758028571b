//! Server→client frame shapes.
//!
//! Every reply and push the server emits is built here, so the wire layout
//! of each shape lives in exactly one place.

/// Positive status keyword.
pub const SUCCESS: &str = "SUCCESS";

/// Negative status keyword.
pub const FAIL: &str = "FAIL";

fn status(ok: bool) -> String {
    if ok { SUCCESS.to_owned() } else { FAIL.to_owned() }
}

/// Registration outcome: `SUCCESS` or `FAIL`.
pub fn register_outcome(ok: bool) -> Vec<String> {
    vec![status(ok)]
}

/// Login rejection: `FAIL`.
pub fn login_failure() -> Vec<String> {
    vec![FAIL.to_owned()]
}

/// Login payload: `SUCCESS` followed by one (friend, transcript) pair per
/// current friend.
pub fn login_success<'a, I>(friends: I) -> Vec<String>
where
    I: IntoIterator<Item = (&'a str, String)>,
{
    let mut fields = vec![SUCCESS.to_owned()];
    for (friend, transcript) in friends {
        fields.push(friend.to_owned());
        fields.push(transcript);
    }
    fields
}

/// Greeting pushed on a freshly bound transport.
pub fn welcome(username: &str) -> Vec<String> {
    vec!["WELCOME".to_owned(), format!("Welcome {username}!")]
}

/// `ADDFRIEND` outcome for the requester, or the push to the added friend.
pub fn add_friend(ok: bool, username: &str) -> Vec<String> {
    vec!["ADDFRIEND".to_owned(), status(ok), username.to_owned()]
}

/// `REMOVEFRIEND` outcome for the requester, or the push to the removed
/// friend.
pub fn remove_friend(ok: bool, username: &str) -> Vec<String> {
    vec!["REMOVEFRIEND".to_owned(), status(ok), username.to_owned()]
}

/// Live relay of a friend's message.
pub fn relay_message(sender: &str, text: &str) -> Vec<String> {
    vec!["MESSAGE".to_owned(), sender.to_owned(), text.to_owned()]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn register_outcome_is_a_single_status_field() {
        assert_eq!(register_outcome(true), vec!["SUCCESS"]);
        assert_eq!(register_outcome(false), vec!["FAIL"]);
    }

    #[test]
    fn login_success_flattens_friend_transcript_pairs() {
        let fields = login_success([
            ("alice", "alice: hi\n".to_owned()),
            ("bob", String::new()),
        ]);
        assert_eq!(fields, vec!["SUCCESS", "alice", "alice: hi\n", "bob", ""]);
    }

    #[test]
    fn welcome_greets_by_name() {
        assert_eq!(welcome("carol"), vec!["WELCOME", "Welcome carol!"]);
    }

    #[test]
    fn friend_replies_carry_status_and_name() {
        assert_eq!(add_friend(true, "bob"), vec!["ADDFRIEND", "SUCCESS", "bob"]);
        assert_eq!(add_friend(false, "bob"), vec!["ADDFRIEND", "FAIL", "bob"]);
        assert_eq!(remove_friend(true, "bob"), vec!["REMOVEFRIEND", "SUCCESS", "bob"]);
    }

    #[test]
    fn relayed_message_names_the_sender() {
        assert_eq!(relay_message("alice", "hi"), vec!["MESSAGE", "alice", "hi"]);
    }
}
