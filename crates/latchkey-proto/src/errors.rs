//! Error types for wire-format decoding

use thiserror::Error;

/// Errors from encoding or decoding wire primitives
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ProtocolError {
    /// Length prefix `0b11` (8-byte integers) is not supported
    #[error("invalid variable-length integer prefix")]
    InvalidLengthPrefix,

    /// Value would fit a shorter encoding
    #[error("non-minimal variable-length integer encoding")]
    NonMinimalEncoding,

    /// Input ends before the declared length
    #[error("truncated input: expected {expected} bytes, got {actual}")]
    Truncated {
        /// Bytes required by the encoding
        expected: usize,
        /// Bytes available
        actual: usize,
    },

    /// Value does not fit in 30 bits
    #[error("value {value} too large for a variable-length integer")]
    VarintTooLarge {
        /// Offending value
        value: u32,
    },
}

/// Result type for protocol operations
pub type Result<T> = std::result::Result<T, ProtocolError>;
