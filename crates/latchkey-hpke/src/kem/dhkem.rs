//! DHKEM: a KEM built from a Diffie-Hellman group and a KDF (RFC 9180 §4.1)
//!
//! ```text
//! Encap(pkR):                        AuthEncap(pkR, skS):
//!   skE, pkE = GenerateKeyPair()       skE, pkE = GenerateKeyPair()
//!   dh  = DH(skE, pkR)                 dh  = DH(skE, pkR) || DH(skS, pkR)
//!   ctx = enc || pkR                   ctx = enc || pkR || pkS
//!   shared_secret = ExtractAndExpand(dh, ctx)
//! ```
//!
//! Decap/AuthDecap recompute the same DH terms from the receiver side, so
//! both ends derive byte-identical shared secrets.

use std::{fmt, marker::PhantomData};

use rand::{CryptoRng, RngCore};
use zeroize::Zeroizing;

use super::{AuthKem, Kem, PrivateKey, PublicKey, check_kem};
use crate::{
    Secret,
    error::{HpkeError, Result},
    kdf::Kdf,
    suite::{KemId, SuiteId},
};

/// Maximum number of rejection-sampling candidates in `DeriveKeyPair`
const MAX_CANDIDATES: u16 = 256;

/// Diffie-Hellman group used by [`DhKem`].
pub trait DhGroup: Clone + fmt::Debug {
    /// Length of a DH shared secret (Ndh).
    const DH_LENGTH: usize;

    /// Length of a serialized private key (Nsk).
    const PRIVATE_KEY_LENGTH: usize;

    /// Length of a serialized public key (Npk).
    const PUBLIC_KEY_LENGTH: usize;

    /// Mask applied to the first byte of each `DeriveKeyPair` candidate.
    const BITMASK: u8;

    /// A uniformly random valid scalar.
    fn random_scalar<R: CryptoRng + RngCore>(rng: &mut R) -> Secret;

    /// True if `scalar` is non-zero and below the group order.
    fn is_valid_scalar(scalar: &[u8]) -> bool;

    /// Serialized public key for `scalar`.
    fn public_key(scalar: &[u8]) -> Result<Vec<u8>>;

    /// Check that `bytes` is a valid serialized public key.
    fn validate_public_key(bytes: &[u8]) -> Result<()>;

    /// Non-interactive DH between `scalar` and `public_key`.
    fn dh(scalar: &[u8], public_key: &[u8]) -> Result<Secret>;
}

/// DHKEM(G, KDF)
#[derive(Debug, Clone)]
pub struct DhKem<G, F> {
    id: KemId,
    kdf: F,
    suite_id: SuiteId,
    group: PhantomData<G>,
}

impl<G: DhGroup, F: Kdf> DhKem<G, F> {
    pub(crate) fn new(id: KemId, kdf: F) -> Self {
        Self { id, kdf, suite_id: SuiteId::kem(id), group: PhantomData }
    }

    /// KDF used for key derivation inside the KEM.
    pub fn kdf(&self) -> &F {
        &self.kdf
    }

    /// `ExtractAndExpand(dh, kem_context)`
    pub fn extract_and_expand(&self, dh: &[u8], kem_context: &[u8]) -> Result<Secret> {
        let eae_prk = self.kdf.labeled_extract(&self.suite_id, &[], b"eae_prk", dh);
        self.kdf.labeled_expand(
            &self.suite_id,
            &eae_prk,
            b"shared_secret",
            kem_context,
            self.kdf.extracted_length(),
        )
    }

    fn key_pair(&self, scalar: Secret) -> Result<(PrivateKey, PublicKey)> {
        let public_key = PublicKey::new(self.id, G::public_key(&scalar)?);
        let private_key = PrivateKey::new(self.id, scalar, public_key.clone());
        Ok((private_key, public_key))
    }

    /// `G::dh`, checked to produce exactly Ndh bytes.
    fn dh(scalar: &[u8], public_key: &[u8]) -> Result<Secret> {
        let shared = G::dh(scalar, public_key)?;
        if shared.len() != G::DH_LENGTH {
            return Err(HpkeError::InvalidLength {
                what: "dh output",
                expected: G::DH_LENGTH,
                actual: shared.len(),
            });
        }
        Ok(shared)
    }

    fn check_enc(&self, enc: &[u8]) -> Result<()> {
        if enc.len() != G::PUBLIC_KEY_LENGTH {
            return Err(HpkeError::InvalidLength {
                what: "enc",
                expected: G::PUBLIC_KEY_LENGTH,
                actual: enc.len(),
            });
        }
        Ok(())
    }
}

impl<G: DhGroup, F: Kdf> Kem for DhKem<G, F> {
    fn id(&self) -> KemId {
        self.id
    }

    fn secret_length(&self) -> usize {
        self.kdf.extracted_length()
    }

    fn enc_length(&self) -> usize {
        G::PUBLIC_KEY_LENGTH
    }

    fn public_key_length(&self) -> usize {
        G::PUBLIC_KEY_LENGTH
    }

    fn private_key_length(&self) -> usize {
        G::PRIVATE_KEY_LENGTH
    }

    fn generate_key_pair<R: CryptoRng + RngCore>(
        &self,
        rng: &mut R,
    ) -> Result<(PrivateKey, PublicKey)> {
        self.key_pair(G::random_scalar(rng))
    }

    /// Rejection sampling: expand candidate scalars from `ikm` until one is
    /// non-zero and below the group order.
    fn derive_key_pair(&self, ikm: &[u8]) -> Result<(PrivateKey, PublicKey)> {
        let dkp_prk = self.kdf.labeled_extract(&self.suite_id, &[], b"dkp_prk", ikm);

        for counter in 0..MAX_CANDIDATES {
            let mut candidate = self.kdf.labeled_expand(
                &self.suite_id,
                &dkp_prk,
                b"candidate",
                &[counter as u8],
                G::PRIVATE_KEY_LENGTH,
            )?;
            candidate[0] &= G::BITMASK;

            if G::is_valid_scalar(&candidate) {
                tracing::trace!(kem = ?self.id, counter, "derived key pair");
                return self.key_pair(candidate);
            }
        }

        tracing::warn!(kem = ?self.id, "derive key pair exhausted all candidates");
        Err(HpkeError::DeriveKeyPair)
    }

    fn deserialize_public_key(&self, bytes: &[u8]) -> Result<PublicKey> {
        G::validate_public_key(bytes)?;
        Ok(PublicKey::new(self.id, bytes.to_vec()))
    }

    fn deserialize_private_key(&self, bytes: &[u8]) -> Result<PrivateKey> {
        if bytes.len() != G::PRIVATE_KEY_LENGTH {
            return Err(HpkeError::InvalidLength {
                what: "private key",
                expected: G::PRIVATE_KEY_LENGTH,
                actual: bytes.len(),
            });
        }
        if !G::is_valid_scalar(bytes) {
            return Err(HpkeError::InvalidPrivateKey);
        }

        let (private_key, _) = self.key_pair(Zeroizing::new(bytes.to_vec()))?;
        Ok(private_key)
    }

    fn encap_with_ephemeral(&self, pk_r: &PublicKey, sk_e: &PrivateKey) -> Result<(Secret, Vec<u8>)> {
        check_kem(self.id, pk_r.kem())?;
        check_kem(self.id, sk_e.kem())?;

        let dh = Self::dh(sk_e.as_bytes(), pk_r.as_bytes())?;
        let enc = sk_e.public_key().as_bytes().to_vec();

        let kem_context = [enc.as_slice(), pk_r.as_bytes()].concat();
        let shared_secret = self.extract_and_expand(&dh, &kem_context)?;

        Ok((shared_secret, enc))
    }

    fn decap(&self, enc: &[u8], sk_r: &PrivateKey) -> Result<Secret> {
        check_kem(self.id, sk_r.kem())?;
        self.check_enc(enc)?;

        let dh = Self::dh(sk_r.as_bytes(), enc)?;

        let kem_context = [enc, sk_r.public_key().as_bytes()].concat();
        self.extract_and_expand(&dh, &kem_context)
    }

    fn as_auth(&self) -> Option<&dyn AuthKem> {
        Some(self)
    }
}

impl<G: DhGroup, F: Kdf> AuthKem for DhKem<G, F> {
    fn auth_encap_with_ephemeral(
        &self,
        pk_r: &PublicKey,
        sk_s: &PrivateKey,
        sk_e: &PrivateKey,
    ) -> Result<(Secret, Vec<u8>)> {
        check_kem(self.id, pk_r.kem())?;
        check_kem(self.id, sk_s.kem())?;
        check_kem(self.id, sk_e.kem())?;

        let dh_e = Self::dh(sk_e.as_bytes(), pk_r.as_bytes())?;
        let dh_s = Self::dh(sk_s.as_bytes(), pk_r.as_bytes())?;
        let dh = Zeroizing::new([dh_e.as_slice(), dh_s.as_slice()].concat());

        let enc = sk_e.public_key().as_bytes().to_vec();
        let kem_context =
            [enc.as_slice(), pk_r.as_bytes(), sk_s.public_key().as_bytes()].concat();
        let shared_secret = self.extract_and_expand(&dh, &kem_context)?;

        Ok((shared_secret, enc))
    }

    fn auth_decap(&self, enc: &[u8], sk_r: &PrivateKey, pk_s: &PublicKey) -> Result<Secret> {
        check_kem(self.id, sk_r.kem())?;
        check_kem(self.id, pk_s.kem())?;
        self.check_enc(enc)?;

        let dh_e = Self::dh(sk_r.as_bytes(), enc)?;
        let dh_s = Self::dh(sk_r.as_bytes(), pk_s.as_bytes())?;
        let dh = Zeroizing::new([dh_e.as_slice(), dh_s.as_slice()].concat());

        let kem_context = [enc, sk_r.public_key().as_bytes(), pk_s.as_bytes()].concat();
        self.extract_and_expand(&dh, &kem_context)
    }
}
