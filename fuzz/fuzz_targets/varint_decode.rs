//! Fuzz target for read_variable_integer
//!
//! Feeds arbitrary bytes to the varint decoder to find:
//! - Parser panics or out-of-bounds reads
//! - Shift overflows in value assembly
//! - Accepted encodings that are not canonical
//!
//! Every accepted input must re-encode to exactly the bytes consumed.

#![no_main]

use latchkey_proto::{read_variable_integer, write_variable_integer};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok((value, consumed)) = read_variable_integer(data) else {
        return;
    };

    assert!(consumed <= data.len());

    let mut encoded = Vec::new();
    write_variable_integer(value, &mut encoded).unwrap();
    assert_eq!(&data[..consumed], encoded.as_slice(), "accepted a non-canonical encoding");
});
