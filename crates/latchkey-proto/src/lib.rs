//! Latchkey Protocol Wire Primitives
//!
//! Integer encodings shared by the Latchkey message layer. Everything here is
//! a pure function over byte slices: decoders never allocate and reject
//! malformed input instead of guessing.
//!
//! # Variable-Length Integers
//!
//! The top two bits of the first byte select the encoded length; the
//! remaining bits hold the big-endian value.
//!
//! ```text
//! prefix  length  usable bits  range
//!   00      1         6        0 ..= 63
//!   01      2        14        64 ..= 16383
//!   10      4        30        16384 ..= 2^30 - 1
//!   11      -         -        rejected
//! ```
//!
//! # Security
//!
//! - Canonical Encoding: every value has exactly one accepted encoding, so
//!   two parsers can never disagree on what a length field says
//! - Bounds: the decoder checks the declared length against the input before
//!   reading any byte past the first

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod errors;
pub mod varint;

pub use errors::{ProtocolError, Result};
pub use varint::{MAX_VARINT, read_variable_integer, write_variable_integer};
