//! Property-based tests for the variable-length integer codec
//!
//! The decoder is the parsing boundary for every length field in the message
//! layer, so these properties cover ALL inputs, not hand-picked examples.

use latchkey_proto::{MAX_VARINT, ProtocolError, read_variable_integer, write_variable_integer};
use proptest::prelude::*;

#[test]
fn prop_write_then_read_returns_value() {
    proptest!(|(value in 0..=MAX_VARINT)| {
        let mut buf = Vec::new();
        write_variable_integer(value, &mut buf).unwrap();

        // PROPERTY: The decoder accepts every encoding the encoder emits
        let (decoded, consumed) = read_variable_integer(&buf).unwrap();
        prop_assert_eq!(decoded, value);
        prop_assert_eq!(consumed, buf.len());
    });
}

#[test]
fn prop_encoding_is_minimal() {
    proptest!(|(value in 0..=MAX_VARINT)| {
        let mut buf = Vec::new();
        write_variable_integer(value, &mut buf).unwrap();

        // PROPERTY: Encoded length is the smallest class that fits the value
        let expected = if value < 1 << 6 { 1 } else if value < 1 << 14 { 2 } else { 4 };
        prop_assert_eq!(buf.len(), expected);
    });
}

#[test]
fn prop_decoder_never_panics() {
    proptest!(|(data in prop::collection::vec(any::<u8>(), 0..16))| {
        // PROPERTY: Arbitrary input yields a value or an error, never a panic
        let _ = read_variable_integer(&data);
    });
}

#[test]
fn prop_accepted_encodings_are_canonical() {
    proptest!(|(data in prop::collection::vec(any::<u8>(), 1..8))| {
        if let Ok((value, consumed)) = read_variable_integer(&data) {
            let mut buf = Vec::new();
            write_variable_integer(value, &mut buf).unwrap();

            // PROPERTY: Anything the decoder accepts re-encodes to the same bytes
            prop_assert_eq!(&data[..consumed], buf.as_slice());
        }
    });
}

#[test]
fn prop_reserved_prefix_rejected() {
    proptest!(|(first in 0xC0u8..=0xFF, rest in prop::collection::vec(any::<u8>(), 0..8))| {
        let mut data = vec![first];
        data.extend(rest);

        // PROPERTY: The 8-byte prefix is rejected regardless of what follows
        prop_assert_eq!(read_variable_integer(&data), Err(ProtocolError::InvalidLengthPrefix));
    });
}

#[test]
fn prop_padded_one_byte_values_rejected() {
    proptest!(|(value in 0u8..64)| {
        // PROPERTY: A one-byte value in a two-byte encoding is non-minimal
        prop_assert_eq!(
            read_variable_integer(&[0x40, value]),
            Err(ProtocolError::NonMinimalEncoding)
        );
    });
}
