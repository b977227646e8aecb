//! Authenticated encryption for HPKE contexts.
//!
//! Ciphertexts are laid out as `ciphertext || tag` with a 16-byte tag at the
//! end, matching WebCrypto and every other interoperable HPKE stack. Nonce
//! uniqueness is the caller's job: [`crate::SenderContext`] derives a fresh
//! nonce per sequence number.

use std::fmt;

use aes_gcm::aead::{Aead as AeadCipher, AeadCore, KeyInit, Nonce, Payload};

use crate::{
    error::{HpkeError, Result},
    suite::AeadId,
};

/// Size of the authentication tag for every AEAD in this module
const TAG_LENGTH: usize = 16;

/// AEAD scheme with fixed key, nonce and tag lengths.
pub trait Aead: Clone + fmt::Debug {
    /// Registry identifier.
    fn id(&self) -> AeadId;

    /// Key length in bytes (Nk).
    fn key_length(&self) -> usize;

    /// Nonce length in bytes (Nn).
    fn nonce_length(&self) -> usize;

    /// Tag length in bytes (Nt).
    fn tag_length(&self) -> usize;

    /// Encrypt and authenticate `pt` with `aad`, returning `ct || tag`.
    fn seal(&self, key: &[u8], nonce: &[u8], aad: &[u8], pt: &[u8]) -> Result<Vec<u8>>;

    /// Verify and decrypt `ct || tag`. No plaintext is returned unless the tag
    /// verifies.
    ///
    /// # Errors
    ///
    /// - `AuthenticationFailure` if the tag does not verify
    fn open(&self, key: &[u8], nonce: &[u8], aad: &[u8], ct: &[u8]) -> Result<Vec<u8>>;
}

/// Defines an AEAD backed by a RustCrypto cipher with a 12-byte nonce.
macro_rules! impl_aead {
    ($name:ident, $cipher:ty, $id:expr, $nk:literal, $doc:literal) => {
        #[doc = $doc]
        #[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
        pub struct $name;

        impl Aead for $name {
            fn id(&self) -> AeadId {
                $id
            }

            fn key_length(&self) -> usize {
                $nk
            }

            fn nonce_length(&self) -> usize {
                12
            }

            fn tag_length(&self) -> usize {
                TAG_LENGTH
            }

            fn seal(&self, key: &[u8], nonce: &[u8], aad: &[u8], pt: &[u8]) -> Result<Vec<u8>> {
                check_lengths(self, key, nonce)?;
                seal_with::<$cipher>(key, nonce, aad, pt)
            }

            fn open(&self, key: &[u8], nonce: &[u8], aad: &[u8], ct: &[u8]) -> Result<Vec<u8>> {
                check_lengths(self, key, nonce)?;
                if ct.len() < TAG_LENGTH {
                    return Err(HpkeError::AuthenticationFailure);
                }
                open_with::<$cipher>(key, nonce, aad, ct)
            }
        }
    };
}

impl_aead!(AesGcm128, aes_gcm::Aes128Gcm, AeadId::Aes128Gcm, 16, "AES-128-GCM");
impl_aead!(AesGcm256, aes_gcm::Aes256Gcm, AeadId::Aes256Gcm, 32, "AES-256-GCM");
impl_aead!(
    ChaCha20Poly1305,
    chacha20poly1305::ChaCha20Poly1305,
    AeadId::ChaCha20Poly1305,
    32,
    "ChaCha20-Poly1305"
);

/// Export-only mode: contexts derive exporter secrets but cannot seal or
/// open.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExportOnly;

impl Aead for ExportOnly {
    fn id(&self) -> AeadId {
        AeadId::ExportOnly
    }

    fn key_length(&self) -> usize {
        0
    }

    fn nonce_length(&self) -> usize {
        0
    }

    fn tag_length(&self) -> usize {
        0
    }

    fn seal(&self, _key: &[u8], _nonce: &[u8], _aad: &[u8], _pt: &[u8]) -> Result<Vec<u8>> {
        Err(HpkeError::ExportOnly)
    }

    fn open(&self, _key: &[u8], _nonce: &[u8], _aad: &[u8], _ct: &[u8]) -> Result<Vec<u8>> {
        Err(HpkeError::ExportOnly)
    }
}

fn check_lengths(aead: &impl Aead, key: &[u8], nonce: &[u8]) -> Result<()> {
    if key.len() != aead.key_length() {
        return Err(HpkeError::InvalidLength {
            what: "AEAD key",
            expected: aead.key_length(),
            actual: key.len(),
        });
    }
    if nonce.len() != aead.nonce_length() {
        return Err(HpkeError::InvalidLength {
            what: "AEAD nonce",
            expected: aead.nonce_length(),
            actual: nonce.len(),
        });
    }
    Ok(())
}

fn seal_with<C>(key: &[u8], nonce: &[u8], aad: &[u8], pt: &[u8]) -> Result<Vec<u8>>
where
    C: KeyInit + AeadCipher + AeadCore,
{
    let cipher = C::new_from_slice(key).map_err(|_| HpkeError::SealFailed)?;
    cipher
        .encrypt(Nonce::<C>::from_slice(nonce), Payload { msg: pt, aad })
        .map_err(|_| HpkeError::SealFailed)
}

fn open_with<C>(key: &[u8], nonce: &[u8], aad: &[u8], ct: &[u8]) -> Result<Vec<u8>>
where
    C: KeyInit + AeadCipher + AeadCore,
{
    let cipher = C::new_from_slice(key).map_err(|_| HpkeError::AuthenticationFailure)?;
    cipher
        .decrypt(Nonce::<C>::from_slice(nonce), Payload { msg: ct, aad })
        .map_err(|_| HpkeError::AuthenticationFailure)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roundtrip(aead: &impl Aead) {
        let key = vec![0x42u8; aead.key_length()];
        let nonce = vec![0x01u8; aead.nonce_length()];
        let pt = b"Beauty is truth, truth beauty";
        let aad = b"Count-0";

        let ct = aead.seal(&key, &nonce, aad, pt).unwrap();
        assert_eq!(ct.len(), pt.len() + aead.tag_length());

        let opened = aead.open(&key, &nonce, aad, &ct).unwrap();
        assert_eq!(opened, pt);
    }

    #[test]
    fn all_ciphers_roundtrip() {
        roundtrip(&AesGcm128);
        roundtrip(&AesGcm256);
        roundtrip(&ChaCha20Poly1305);
    }

    #[test]
    fn aes_128_gcm_known_answer() {
        // RFC 9180 A.3.1, sequence 0
        let key = hex::decode("868c066ef58aae6dc589b6cfdd18f97e").unwrap();
        let nonce = hex::decode("4e0bc5018beba4bf004cca59").unwrap();
        let aad = hex::decode("436f756e742d30").unwrap();
        let pt =
            hex::decode("4265617574792069732074727574682c20747275746820626561757479").unwrap();

        let ct = AesGcm128.seal(&key, &nonce, &aad, &pt).unwrap();
        assert_eq!(
            hex::encode(&ct),
            "5ad590bb8baa577f8619db35a36311226a896e7342a6d836d8b7bcd2f20b6c7f9076ac232e3ab2523f39513434"
        );
    }

    #[test]
    fn tampered_aad_fails_authentication() {
        let key = [7u8; 16];
        let nonce = [9u8; 12];
        let ct = AesGcm128.seal(&key, &nonce, b"aad", b"secret").unwrap();

        assert_eq!(
            AesGcm128.open(&key, &nonce, b"daa", &ct),
            Err(HpkeError::AuthenticationFailure)
        );
    }

    #[test]
    fn tampered_tag_fails_authentication() {
        let key = [7u8; 32];
        let nonce = [9u8; 12];
        let mut ct = ChaCha20Poly1305.seal(&key, &nonce, b"", b"secret").unwrap();
        let last = ct.len() - 1;
        ct[last] ^= 0x01;

        assert_eq!(
            ChaCha20Poly1305.open(&key, &nonce, b"", &ct),
            Err(HpkeError::AuthenticationFailure)
        );
    }

    #[test]
    fn short_ciphertext_fails_authentication() {
        let result = AesGcm256.open(&[0u8; 32], &[0u8; 12], b"", &[0u8; 15]);
        assert_eq!(result, Err(HpkeError::AuthenticationFailure));
    }

    #[test]
    fn wrong_key_length_is_rejected() {
        let result = AesGcm128.seal(&[0u8; 32], &[0u8; 12], b"", b"pt");
        assert_eq!(
            result,
            Err(HpkeError::InvalidLength { what: "AEAD key", expected: 16, actual: 32 })
        );
    }

    #[test]
    fn wrong_nonce_length_is_rejected() {
        let result = AesGcm128.open(&[0u8; 16], &[0u8; 24], b"", &[0u8; 32]);
        assert_eq!(
            result,
            Err(HpkeError::InvalidLength { what: "AEAD nonce", expected: 12, actual: 24 })
        );
    }

    #[test]
    fn export_only_cannot_seal_or_open() {
        assert_eq!(ExportOnly.seal(&[], &[], b"", b"pt"), Err(HpkeError::ExportOnly));
        assert_eq!(ExportOnly.open(&[], &[], b"", b"ct"), Err(HpkeError::ExportOnly));
    }
}
