//! Variable-length integer codec.

use bytes::BufMut;

use crate::errors::{ProtocolError, Result};

/// Largest value with a variable-length encoding (2^30 - 1)
pub const MAX_VARINT: u32 = (1 << 30) - 1;

/// Prefix reserved for 8-byte integers, which this codec does not accept
const RESERVED_PREFIX: u8 = 0b11;

/// Decode a variable-length integer from the start of `data`.
///
/// Returns the value and the number of bytes consumed. Trailing bytes are
/// left for the caller.
///
/// # Errors
///
/// - `ProtocolError::Truncated` if `data` is shorter than the encoding
/// - `ProtocolError::InvalidLengthPrefix` for the 8-byte prefix
/// - `ProtocolError::NonMinimalEncoding` if a shorter encoding would have fit
pub fn read_variable_integer(data: &[u8]) -> Result<(u32, usize)> {
    let Some(&first) = data.first() else {
        return Err(ProtocolError::Truncated { expected: 1, actual: 0 });
    };

    let prefix = first >> 6;
    if prefix == RESERVED_PREFIX {
        return Err(ProtocolError::InvalidLengthPrefix);
    }

    let length = 1usize << prefix;
    let Some(rest) = data.get(1..length) else {
        return Err(ProtocolError::Truncated { expected: length, actual: data.len() });
    };

    let value =
        rest.iter().fold(u32::from(first & 0x3F), |acc, &byte| (acc << 8) | u32::from(byte));

    // A 2n-byte encoding must carry a value that needs more than n bytes' worth
    // of usable bits
    if prefix > 0 && value < 1 << (8 * (length / 2) - 2) {
        return Err(ProtocolError::NonMinimalEncoding);
    }

    Ok((value, length))
}

/// Append the minimal encoding of `value` to `dst`.
///
/// # Errors
///
/// - `ProtocolError::VarintTooLarge` if `value > MAX_VARINT`
pub fn write_variable_integer(value: u32, dst: &mut impl BufMut) -> Result<()> {
    match value {
        0..=0x3F => dst.put_u8(value as u8),
        0x40..=0x3FFF => dst.put_u16(0x4000 | value as u16),
        0x4000..=MAX_VARINT => dst.put_u32(0x8000_0000 | value),
        _ => return Err(ProtocolError::VarintTooLarge { value }),
    }
    Ok(())
}
