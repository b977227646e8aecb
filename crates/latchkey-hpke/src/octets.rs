//! Big-endian integer/octet-string conversion and buffer XOR (RFC 8017 §4).

use crate::error::{HpkeError, Result};

/// Width of the integer type used by [`i2osp`] and [`os2ip`].
const INT_WIDTH: usize = 16;

/// Encode `n` as a `width`-byte big-endian octet string.
///
/// # Errors
///
/// - `IntegerTooLarge` if `n >= 256^width`
pub fn i2osp(n: u128, width: usize) -> Result<Vec<u8>> {
    if width < INT_WIDTH && n >> (8 * width) != 0 {
        return Err(HpkeError::IntegerTooLarge { width });
    }

    let mut out = vec![0u8; width];
    let be = n.to_be_bytes();
    let take = width.min(INT_WIDTH);
    out[width - take..].copy_from_slice(&be[INT_WIDTH - take..]);
    Ok(out)
}

/// Decode a big-endian octet string of any length into an integer.
///
/// Leading zero octets are ignored, so the input may be wider than the
/// integer type as long as the value itself fits.
///
/// # Errors
///
/// - `IntegerTooLarge` if the value needs more than 128 bits
pub fn os2ip(bytes: &[u8]) -> Result<u128> {
    let significant = bytes.iter().position(|&b| b != 0).map_or(&[][..], |i| &bytes[i..]);
    if significant.len() > INT_WIDTH {
        return Err(HpkeError::IntegerTooLarge { width: INT_WIDTH });
    }

    Ok(significant.iter().fold(0u128, |acc, &b| (acc << 8) | u128::from(b)))
}

/// Byte-wise XOR of two equal-length buffers.
///
/// # Errors
///
/// - `LengthMismatch` if the buffers differ in length
pub fn xor(a: &[u8], b: &[u8]) -> Result<Vec<u8>> {
    if a.len() != b.len() {
        return Err(HpkeError::LengthMismatch { left: a.len(), right: b.len() });
    }

    Ok(a.iter().zip(b).map(|(x, y)| x ^ y).collect())
}
