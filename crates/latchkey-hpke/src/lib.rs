//! Latchkey Hybrid Public Key Encryption
//!
//! HPKE (RFC 9180) for the Latchkey group messaging protocol: a KEM, a KDF
//! and an AEAD composed into sender/receiver encryption contexts. Higher
//! layers use it to encrypt path secrets and welcome messages to a member's
//! public key.
//!
//! # Data Flow
//!
//! Setup runs once per channel and flows in one direction. After that each
//! context seals or opens messages, advancing its own sequence counter.
//!
//! ```text
//! Recipient public key
//!        │
//!        ▼
//! KEM Encap / AuthEncap → (shared_secret, enc)      enc ──► peer
//!        │
//!        ▼
//! Key Schedule(mode, shared_secret, info, psk, psk_id)
//!        │
//!        ▼
//! Context { key, base_nonce, exporter_secret, sequence = 0 }
//!        │
//!        ▼
//! seal / open (nonce = base_nonce XOR sequence), export
//! ```
//!
//! # Security
//!
//! Nonce Uniqueness:
//! - A context is bound to one direction; only the sender seals
//! - Each successful seal/open advances the sequence exactly once
//! - The sequence is bounded by the nonce width; at the bound the context
//!   refuses to seal or open (`MessageLimitReached`)
//!
//! Key Material:
//! - Private scalars and derived secrets are held in `Zeroizing` buffers
//! - `Debug` output never includes key bytes
//! - Nothing secret is logged
//!
//! Failure Semantics:
//! - Every error is returned, never retried
//! - A failed `open` returns no plaintext and does not advance the sequence
//! - PSK and key/KEM checks run before any cryptographic work
//!
//! Randomness:
//! - Callers supply a `CryptoRng`; only `derive_key_pair` and the
//!   `*_with_ephemeral` entry points are deterministic

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod aead;
pub mod context;
pub mod error;
pub mod kdf;
pub mod kem;
pub mod octets;
pub mod setup;
pub mod suite;

pub use aead::{Aead, AesGcm128, AesGcm256, ChaCha20Poly1305, ExportOnly};
pub use context::{Context, ReceiverContext, SenderContext};
pub use error::{HpkeError, Result};
pub use kdf::{HkdfSha256, HkdfSha384, HkdfSha512, Kdf};
pub use kem::{
    AuthKem, Kem, PrivateKey, PublicKey,
    dhkem::{DhGroup, DhKem},
    nist::{DhKemP256, DhKemP384, P256, P384},
};
pub use setup::{Hpke, Mode, Psk};
pub use suite::{AeadId, CipherSuite, KdfId, KemId, SuiteId};

/// Owned secret bytes, wiped on drop.
pub type Secret = zeroize::Zeroizing<Vec<u8>>;
