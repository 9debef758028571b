//! Codec round-trip properties.

use courier_proto::frame;
use proptest::prelude::*;

/// Field content free of reserved wire bytes, with line breaks restricted
/// to `\n` and `\r\n` separated by at least one ordinary character (the
/// holder substitution cannot represent arbitrary CR/LF runs).
fn field_strategy() -> impl Strategy<Value = String> {
    let word = "[a-zA-Z0-9 .,!?]{1,12}";
    let sep = prop_oneof![Just("\n".to_owned()), Just("\r\n".to_owned())];
    (
        proptest::string::string_regex(word).unwrap(),
        prop::collection::vec((sep, proptest::string::string_regex(word).unwrap()), 0..4),
    )
        .prop_map(|(head, tail)| {
            let mut field = head;
            for (sep, word) in tail {
                field.push_str(&sep);
                field.push_str(&word);
            }
            field
        })
}

proptest! {
    #[test]
    fn decode_inverts_encode(fields in prop::collection::vec(field_strategy(), 1..6)) {
        let encoded = frame::encode(&fields).unwrap();
        let decoded = frame::decode(&encoded).unwrap();
        prop_assert_eq!(decoded, fields);
    }

    #[test]
    fn encoded_frame_is_one_line(fields in prop::collection::vec(field_strategy(), 1..6)) {
        let encoded = frame::encode(&fields).unwrap();
        prop_assert_eq!(encoded.last(), Some(&frame::FRAME_END));
        let interior = &encoded[..encoded.len() - 1];
        prop_assert!(!interior.contains(&frame::FRAME_END));
        prop_assert!(!interior.contains(&b'\r'));
    }

    #[test]
    fn encoded_frame_opens_with_delimiter(fields in prop::collection::vec(field_strategy(), 1..6)) {
        let encoded = frame::encode(&fields).unwrap();
        prop_assert_eq!(encoded.first(), Some(&frame::DELIM));
        prop_assert!(!frame::is_disconnect(&encoded));
    }
}
