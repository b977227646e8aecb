//! NIST prime-curve groups for DHKEM (P-256, P-384).
//!
//! Public keys use the uncompressed SEC1 encoding `0x04 || X || Y`; the DH
//! output is the X coordinate of the shared point.

use p256::elliptic_curve::sec1::ToEncodedPoint;
use rand::{CryptoRng, RngCore};
use zeroize::Zeroizing;

use super::dhkem::{DhGroup, DhKem};
use crate::{
    Secret,
    error::{HpkeError, Result},
    kdf::{HkdfSha256, HkdfSha384},
    suite::KemId,
};

/// SEC1 tag for an uncompressed point
const UNCOMPRESSED_TAG: u8 = 0x04;

/// Defines a [`DhGroup`] over a RustCrypto NIST curve crate.
macro_rules! impl_nist_group {
    ($name:ident, $curve:ident, $nsk:literal, $npk:literal, $doc:literal) => {
        #[doc = $doc]
        #[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
        pub struct $name;

        impl $name {
            fn secret_key(scalar: &[u8]) -> Result<$curve::SecretKey> {
                if scalar.len() != $nsk {
                    return Err(HpkeError::InvalidPrivateKey);
                }
                $curve::SecretKey::from_slice(scalar).map_err(|_| HpkeError::InvalidPrivateKey)
            }

            fn decode_public_key(bytes: &[u8]) -> Result<$curve::PublicKey> {
                if bytes.len() != $npk || bytes[0] != UNCOMPRESSED_TAG {
                    return Err(HpkeError::InvalidPublicKey);
                }
                $curve::PublicKey::from_sec1_bytes(bytes).map_err(|_| HpkeError::InvalidPublicKey)
            }
        }

        impl DhGroup for $name {
            const DH_LENGTH: usize = $nsk;
            const PRIVATE_KEY_LENGTH: usize = $nsk;
            const PUBLIC_KEY_LENGTH: usize = $npk;
            const BITMASK: u8 = 0xFF;

            fn random_scalar<R: CryptoRng + RngCore>(rng: &mut R) -> Secret {
                let secret = $curve::SecretKey::random(rng);
                let bytes = Zeroizing::new(secret.to_bytes());
                Zeroizing::new(bytes.to_vec())
            }

            fn is_valid_scalar(scalar: &[u8]) -> bool {
                Self::secret_key(scalar).is_ok()
            }

            fn public_key(scalar: &[u8]) -> Result<Vec<u8>> {
                let secret = Self::secret_key(scalar)?;
                Ok(secret.public_key().to_encoded_point(false).as_bytes().to_vec())
            }

            fn validate_public_key(bytes: &[u8]) -> Result<()> {
                Self::decode_public_key(bytes).map(|_| ())
            }

            fn dh(scalar: &[u8], public_key: &[u8]) -> Result<Secret> {
                let secret = Self::secret_key(scalar)?;
                let public = Self::decode_public_key(public_key)?;

                let shared =
                    $curve::ecdh::diffie_hellman(secret.to_nonzero_scalar(), public.as_affine());
                Ok(Zeroizing::new(shared.raw_secret_bytes().to_vec()))
            }
        }
    };
}

impl_nist_group!(P256, p256, 32, 65, "NIST P-256 (secp256r1)");
impl_nist_group!(P384, p384, 48, 97, "NIST P-384 (secp384r1)");

/// DHKEM(P-256, HKDF-SHA256), KEM id 0x0010
pub type DhKemP256 = DhKem<P256, HkdfSha256>;

/// DHKEM(P-384, HKDF-SHA384), KEM id 0x0011
pub type DhKemP384 = DhKem<P384, HkdfSha384>;

impl Default for DhKemP256 {
    fn default() -> Self {
        Self::new(KemId::P256HkdfSha256, HkdfSha256)
    }
}

impl Default for DhKemP384 {
    fn default() -> Self {
        Self::new(KemId::P384HkdfSha384, HkdfSha384)
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;

    use super::*;
    use crate::kem::{AuthKem, Kem};

    fn unhex(s: &str) -> Vec<u8> {
        hex::decode(s).unwrap()
    }

    fn rng() -> ChaCha20Rng {
        ChaCha20Rng::seed_from_u64(9180)
    }

    #[test]
    fn p256_derive_key_pair_matches_known_answer() {
        // RFC 9180 A.3.1 recipient key
        let kem = DhKemP256::default();
        let (sk, pk) = kem
            .derive_key_pair(&unhex(
                "668b37171f1072f3cf12ea8a236a45df23fc13b82af3609ad1e354f6ef817550",
            ))
            .unwrap();

        assert_eq!(
            sk.as_bytes(),
            unhex("f3ce7fdae57e1a310d87f1ebbde6f328be0a99cdbcadf4d6589cf29de4b8ffd2")
        );
        assert_eq!(
            pk.as_bytes(),
            unhex(
                "04fe8c19ce0905191ebc298a9245792531f26f0cece2460639e8bc39cb7f706a826a779b4cf969b8a0e539c7f62fb3d30ad6aa8f80e30f1d128aafd68a2ce72ea0"
            )
        );
    }

    #[test]
    fn p256_encap_known_answer() {
        // RFC 9180 A.3.1 ephemeral key and shared secret
        let kem = DhKemP256::default();
        let (_, pk_r) = kem
            .derive_key_pair(&unhex(
                "668b37171f1072f3cf12ea8a236a45df23fc13b82af3609ad1e354f6ef817550",
            ))
            .unwrap();
        let (sk_e, _) = kem
            .derive_key_pair(&unhex(
                "4270e54ffd08d79d5928020af4686d8f6b7d35dbe470265f1f5aa22816ce860e",
            ))
            .unwrap();

        let (shared_secret, enc) = kem.encap_with_ephemeral(&pk_r, &sk_e).unwrap();

        assert_eq!(
            enc,
            unhex(
                "04a92719c6195d5085104f469a8b9814d5838ff72b60501e2c4466e5e67b325ac98536d7b61a1af4b78e5b7f951c0900be863c403ce65c9bfcb9382657222d18c4"
            )
        );
        assert_eq!(
            *shared_secret,
            unhex("c0d26aeab536609a572b07695d933b589dcf363ff9d93c93adea537aeabb8cb8")
        );
    }

    #[test]
    fn derive_key_pair_is_deterministic() {
        let kem = DhKemP384::default();
        let (sk_a, pk_a) = kem.derive_key_pair(b"seed material").unwrap();
        let (sk_b, pk_b) = kem.derive_key_pair(b"seed material").unwrap();

        assert_eq!(sk_a.as_bytes(), sk_b.as_bytes());
        assert_eq!(pk_a, pk_b);
        assert_eq!(pk_a.as_bytes().len(), 97);
    }

    #[test]
    fn encap_then_decap_agree() {
        let mut rng = rng();
        let kem = DhKemP256::default();
        let (sk_r, pk_r) = kem.generate_key_pair(&mut rng).unwrap();

        let (sender_secret, enc) = kem.encap(&pk_r, &mut rng).unwrap();
        let receiver_secret = kem.decap(&enc, &sk_r).unwrap();

        assert_eq!(enc.len(), kem.enc_length());
        assert_eq!(sender_secret.len(), kem.secret_length());
        assert_eq!(*sender_secret, *receiver_secret);
    }

    #[test]
    fn auth_encap_then_auth_decap_agree() {
        let mut rng = rng();
        let kem = DhKemP384::default();
        let (sk_r, pk_r) = kem.generate_key_pair(&mut rng).unwrap();
        let (sk_s, pk_s) = kem.generate_key_pair(&mut rng).unwrap();

        let (sender_secret, enc) = kem.auth_encap(&pk_r, &sk_s, &mut rng).unwrap();
        let receiver_secret = kem.auth_decap(&enc, &sk_r, &pk_s).unwrap();

        assert_eq!(*sender_secret, *receiver_secret);
    }

    #[test]
    fn auth_decap_with_wrong_sender_disagrees() {
        let mut rng = rng();
        let kem = DhKemP256::default();
        let (sk_r, pk_r) = kem.generate_key_pair(&mut rng).unwrap();
        let (sk_s, _) = kem.generate_key_pair(&mut rng).unwrap();
        let (_, pk_other) = kem.generate_key_pair(&mut rng).unwrap();

        let (sender_secret, enc) = kem.auth_encap(&pk_r, &sk_s, &mut rng).unwrap();
        let receiver_secret = kem.auth_decap(&enc, &sk_r, &pk_other).unwrap();

        assert_ne!(*sender_secret, *receiver_secret);
    }

    #[test]
    fn generated_scalars_are_valid_and_fresh() {
        let mut rng = rng();
        let first = P256::random_scalar(&mut rng);
        let second = P256::random_scalar(&mut rng);

        assert_eq!(first.len(), 32);
        assert!(P256::is_valid_scalar(&first));
        assert_ne!(*first, *second);
        assert_eq!(P384::random_scalar(&mut rng).len(), 48);
    }

    #[test]
    fn private_key_roundtrips_through_serialization() {
        let kem = DhKemP256::default();
        let (sk, pk) = kem.generate_key_pair(&mut rng()).unwrap();

        let restored = kem.deserialize_private_key(sk.as_bytes()).unwrap();
        assert_eq!(restored.public_key(), &pk);
        assert_eq!(kem.deserialize_public_key(pk.as_bytes()).unwrap(), pk);
    }

    #[test]
    fn invalid_private_keys_are_rejected() {
        let kem = DhKemP256::default();

        assert_eq!(kem.deserialize_private_key(&[0u8; 32]).unwrap_err(), HpkeError::InvalidPrivateKey);
        assert_eq!(
            kem.deserialize_private_key(&[0xFFu8; 32]).unwrap_err(),
            HpkeError::InvalidPrivateKey
        );
        assert_eq!(
            kem.deserialize_private_key(&[1u8; 31]).unwrap_err(),
            HpkeError::InvalidLength { what: "private key", expected: 32, actual: 31 }
        );
    }

    #[test]
    fn invalid_public_keys_are_rejected() {
        let kem = DhKemP256::default();
        let (_, pk) = kem.generate_key_pair(&mut rng()).unwrap();

        let mut compressed_tag = pk.as_bytes().to_vec();
        compressed_tag[0] = 0x02;
        assert_eq!(kem.deserialize_public_key(&compressed_tag), Err(HpkeError::InvalidPublicKey));

        let mut off_curve = pk.as_bytes().to_vec();
        off_curve[64] ^= 0x01;
        assert_eq!(kem.deserialize_public_key(&off_curve), Err(HpkeError::InvalidPublicKey));

        assert_eq!(kem.deserialize_public_key(&[0x00]), Err(HpkeError::InvalidPublicKey));
    }

    #[test]
    fn decap_rejects_wrong_length_enc() {
        let kem = DhKemP256::default();
        let (sk, _) = kem.generate_key_pair(&mut rng()).unwrap();

        assert_eq!(
            kem.decap(&[0x04; 33], &sk),
            Err(HpkeError::InvalidLength { what: "enc", expected: 65, actual: 33 })
        );
    }

    #[test]
    fn keys_from_another_kem_are_rejected() {
        let mut rng = rng();
        let p256 = DhKemP256::default();
        let p384 = DhKemP384::default();
        let (_, pk_384) = p384.generate_key_pair(&mut rng).unwrap();

        assert_eq!(
            p256.encap(&pk_384, &mut rng),
            Err(HpkeError::KemMismatch {
                expected: KemId::P256HkdfSha256,
                actual: KemId::P384HkdfSha384,
            })
        );
    }
}
