//! Key encapsulation mechanisms
//!
//! A KEM turns a recipient public key into a `(shared_secret, enc)` pair;
//! the recipient recovers the same shared secret from `enc` with its private
//! key. Authenticated encapsulation additionally binds a sender static key
//! and is a separate capability ([`AuthKem`]) reached through
//! [`Kem::as_auth`], since not every KEM can provide it.
//!
//! # Security
//!
//! - Private scalars live in `Zeroizing` buffers and are wiped on drop
//! - Keys carry the [`KemId`] that created them; every operation rejects keys
//!   from another KEM with `KemMismatch`
//! - Randomness is always supplied by the caller

pub mod dhkem;
pub mod nist;

use std::fmt;

use rand::{CryptoRng, RngCore};

use crate::{
    Secret,
    error::{HpkeError, Result},
    suite::KemId,
};

/// Serialized KEM public key.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct PublicKey {
    kem: KemId,
    bytes: Vec<u8>,
}

impl PublicKey {
    pub(crate) fn new(kem: KemId, bytes: Vec<u8>) -> Self {
        Self { kem, bytes }
    }

    /// KEM that produced this key.
    pub fn kem(&self) -> KemId {
        self.kem
    }

    /// Serialized key (`SerializePublicKey`).
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }
}

impl fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PublicKey").field("kem", &self.kem).field("len", &self.bytes.len()).finish()
    }
}

/// KEM private key together with its public key.
///
/// The public key is kept alongside the scalar because authenticated
/// encapsulation needs `pk(skS)` in the KEM context.
#[derive(Clone)]
pub struct PrivateKey {
    kem: KemId,
    scalar: Secret,
    public_key: PublicKey,
}

impl PrivateKey {
    pub(crate) fn new(kem: KemId, scalar: Secret, public_key: PublicKey) -> Self {
        Self { kem, scalar, public_key }
    }

    /// KEM that produced this key.
    pub fn kem(&self) -> KemId {
        self.kem
    }

    /// Serialized scalar (`SerializePrivateKey`). Treat as secret.
    pub fn as_bytes(&self) -> &[u8] {
        &self.scalar
    }

    /// The matching public key.
    pub fn public_key(&self) -> &PublicKey {
        &self.public_key
    }
}

impl fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PrivateKey")
            .field("kem", &self.kem)
            .field("public_key", &self.public_key)
            .finish_non_exhaustive()
    }
}

/// Key encapsulation mechanism.
pub trait Kem: fmt::Debug {
    /// Registry identifier.
    fn id(&self) -> KemId;

    /// Length of the shared secret (Nsecret).
    fn secret_length(&self) -> usize;

    /// Length of the encapsulated key (Nenc).
    fn enc_length(&self) -> usize;

    /// Length of a serialized public key (Npk).
    fn public_key_length(&self) -> usize;

    /// Length of a serialized private key (Nsk).
    fn private_key_length(&self) -> usize;

    /// Generate a fresh random key pair.
    fn generate_key_pair<R: CryptoRng + RngCore>(
        &self,
        rng: &mut R,
    ) -> Result<(PrivateKey, PublicKey)>;

    /// Deterministically derive a key pair from input keying material.
    ///
    /// # Errors
    ///
    /// - `DeriveKeyPair` if no valid private key is found
    fn derive_key_pair(&self, ikm: &[u8]) -> Result<(PrivateKey, PublicKey)>;

    /// Parse and validate a serialized public key.
    fn deserialize_public_key(&self, bytes: &[u8]) -> Result<PublicKey>;

    /// Parse and validate a serialized private key, recomputing its public
    /// key.
    fn deserialize_private_key(&self, bytes: &[u8]) -> Result<PrivateKey>;

    /// Encapsulate a fresh shared secret to `pk_r`.
    ///
    /// Returns `(shared_secret, enc)`.
    fn encap<R: CryptoRng + RngCore>(&self, pk_r: &PublicKey, rng: &mut R) -> Result<(Secret, Vec<u8>)> {
        let (sk_e, _) = self.generate_key_pair(rng)?;
        self.encap_with_ephemeral(pk_r, &sk_e)
    }

    /// Encapsulate using a caller-chosen ephemeral key.
    ///
    /// Only for known-answer tests: reusing an ephemeral key across
    /// encapsulations breaks the KEM's security.
    fn encap_with_ephemeral(&self, pk_r: &PublicKey, sk_e: &PrivateKey) -> Result<(Secret, Vec<u8>)>;

    /// Recover the shared secret from `enc`.
    fn decap(&self, enc: &[u8], sk_r: &PrivateKey) -> Result<Secret>;

    /// Authenticated encapsulation binding the sender key `sk_s`.
    ///
    /// # Errors
    ///
    /// - `AuthNotSupported` if the KEM has no authenticated variant
    fn auth_encap<R: CryptoRng + RngCore>(
        &self,
        pk_r: &PublicKey,
        sk_s: &PrivateKey,
        rng: &mut R,
    ) -> Result<(Secret, Vec<u8>)> {
        let auth = self.as_auth().ok_or(HpkeError::AuthNotSupported { kem: self.id() })?;
        let (sk_e, _) = self.generate_key_pair(rng)?;
        auth.auth_encap_with_ephemeral(pk_r, sk_s, &sk_e)
    }

    /// Authenticated encapsulation capability, if this KEM has one.
    fn as_auth(&self) -> Option<&dyn AuthKem> {
        None
    }
}

/// Authenticated encapsulation: the shared secret also depends on a sender
/// static key pair, so only its holder can produce a matching `enc`.
pub trait AuthKem {
    /// `AuthEncap` with a caller-chosen ephemeral key.
    fn auth_encap_with_ephemeral(
        &self,
        pk_r: &PublicKey,
        sk_s: &PrivateKey,
        sk_e: &PrivateKey,
    ) -> Result<(Secret, Vec<u8>)>;

    /// `AuthDecap`: recover the shared secret, verifying it was produced with
    /// the private key of `pk_s`.
    fn auth_decap(&self, enc: &[u8], sk_r: &PrivateKey, pk_s: &PublicKey) -> Result<Secret>;
}

pub(crate) fn check_kem(expected: KemId, actual: KemId) -> Result<()> {
    if expected == actual { Ok(()) } else { Err(HpkeError::KemMismatch { expected, actual }) }
}
