//! Error types for HPKE operations

use thiserror::Error;

use crate::suite::KemId;

/// Errors from HPKE primitives, setup and contexts
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HpkeError {
    /// Integer does not fit in the requested number of octets
    #[error("integer too large for {width} octets")]
    IntegerTooLarge {
        /// Requested output width in bytes
        width: usize,
    },

    /// Two buffers that must be the same length are not
    #[error("length mismatch: {left} != {right}")]
    LengthMismatch {
        /// Length of the left operand
        left: usize,
        /// Length of the right operand
        right: usize,
    },

    /// Key, nonce or scalar has the wrong width
    #[error("invalid {what} length: expected {expected}, got {actual}")]
    InvalidLength {
        /// What was being checked
        what: &'static str,
        /// Expected length
        expected: usize,
        /// Actual length
        actual: usize,
    },

    /// Public key bytes are not a valid point for the KEM
    #[error("invalid public key")]
    InvalidPublicKey,

    /// Private key bytes are not a valid scalar for the KEM
    #[error("invalid private key")]
    InvalidPrivateKey,

    /// Key was created by a different KEM than the one in use
    #[error("key belongs to {actual:?}, suite uses {expected:?}")]
    KemMismatch {
        /// KEM of the suite
        expected: KemId,
        /// KEM the key was created by
        actual: KemId,
    },

    /// Rejection sampling found no valid scalar within 256 candidates
    #[error("derive key pair: no valid candidate found")]
    DeriveKeyPair,

    /// KEM does not provide authenticated encapsulation
    #[error("{kem:?} does not support authenticated encapsulation")]
    AuthNotSupported {
        /// KEM in use
        kem: KemId,
    },

    /// Exactly one of `psk` and `psk_id` was provided
    #[error("inconsistent PSK inputs")]
    InconsistentPskInputs,

    /// PSK provided to a mode that does not use one
    #[error("PSK input provided when not needed")]
    UnexpectedPskInput,

    /// PSK mode used without a PSK
    #[error("missing required PSK input")]
    MissingPskInput,

    /// Auth mode used without a sender key
    #[error("missing sender key for authenticated mode")]
    MissingSenderKey,

    /// Sender key provided to a mode that does not authenticate the sender
    #[error("sender key provided for unauthenticated mode")]
    UnexpectedSenderKey,

    /// HKDF-Expand asked for more than 255 hash lengths
    #[error("expand length {requested} exceeds maximum {max}")]
    ExpandLengthExceeded {
        /// Requested output length
        requested: usize,
        /// Maximum output length for the KDF
        max: usize,
    },

    /// Exporter asked for more than 255 hash lengths
    #[error("export length {requested} exceeds maximum {max}")]
    ExportLengthExceeded {
        /// Requested export length
        requested: usize,
        /// Maximum export length for the KDF
        max: usize,
    },

    /// AEAD tag did not verify
    #[error("authentication failed")]
    AuthenticationFailure,

    /// AEAD encryption failed (plaintext too long for the cipher)
    #[error("seal failed")]
    SealFailed,

    /// Sequence number exhausted for this context
    #[error("message limit reached")]
    MessageLimitReached,

    /// Seal/open called on a context using the export-only AEAD
    #[error("export-only AEAD cannot seal or open")]
    ExportOnly,

    /// Algorithm identifier is not registered
    #[error("unsupported {kind} identifier {id:#06x}")]
    UnsupportedAlgorithm {
        /// Algorithm family ("KEM", "KDF", "AEAD")
        kind: &'static str,
        /// Raw identifier
        id: u16,
    },
}

impl HpkeError {
    /// Returns true if the context that produced this error can no longer be
    /// used.
    ///
    /// A failed `open` leaves the receiver's sequence untouched, so
    /// authentication failures are not fatal to the context. Exhausting the
    /// sequence is: the caller must establish a new context.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::MessageLimitReached)
    }
}

/// Result type for HPKE operations
pub type Result<T> = std::result::Result<T, HpkeError>;
