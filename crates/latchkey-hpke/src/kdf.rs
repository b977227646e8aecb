//! Key derivation: HKDF and HPKE labeled extract/expand (RFC 9180 §4).

use std::fmt;

use hkdf::Hkdf;
use hmac::{Hmac, Mac};
use sha2::{Sha256, Sha384, Sha512};
use zeroize::Zeroizing;

use crate::{
    Secret,
    error::{HpkeError, Result},
    octets::i2osp,
    suite::{KdfId, SuiteId},
};

/// Version label prepended to every labeled KDF input
const HPKE_VERSION_LABEL: &[u8] = b"HPKE-v1";

/// Extract-then-expand key derivation function.
///
/// `labeled_extract`/`labeled_expand` bind every derivation to the
/// `"HPKE-v1"` version label, a [`SuiteId`] and a purpose label, so values
/// derived for different purposes or suites can never collide.
pub trait Kdf: Clone + fmt::Debug {
    /// Registry identifier.
    fn id(&self) -> KdfId;

    /// Output length of [`Kdf::extract`] in bytes (Nh).
    fn extracted_length(&self) -> usize;

    /// Extract a fixed-length pseudorandom key from `ikm`. An empty salt is
    /// treated as the zero-length salt.
    fn extract(&self, salt: &[u8], ikm: &[u8]) -> Secret;

    /// Expand `prk` with `info` into exactly `length` bytes.
    ///
    /// # Errors
    ///
    /// - `ExpandLengthExceeded` if `length > 255 * Nh`
    /// - `InvalidLength` if `prk` is shorter than Nh
    fn expand(&self, prk: &[u8], info: &[u8], length: usize) -> Result<Secret>;

    /// `Extract(salt, "HPKE-v1" || suite_id || label || ikm)`
    fn labeled_extract(&self, suite_id: &SuiteId, salt: &[u8], label: &[u8], ikm: &[u8]) -> Secret {
        let suite_id = suite_id.as_bytes();
        let mut labeled_ikm = Zeroizing::new(Vec::with_capacity(
            HPKE_VERSION_LABEL.len() + suite_id.len() + label.len() + ikm.len(),
        ));
        labeled_ikm.extend_from_slice(HPKE_VERSION_LABEL);
        labeled_ikm.extend_from_slice(suite_id);
        labeled_ikm.extend_from_slice(label);
        labeled_ikm.extend_from_slice(ikm);

        self.extract(salt, &labeled_ikm)
    }

    /// `Expand(prk, I2OSP(length, 2) || "HPKE-v1" || suite_id || label || info, length)`
    ///
    /// # Errors
    ///
    /// - `IntegerTooLarge` if `length` does not fit in two octets
    /// - any error from [`Kdf::expand`]
    fn labeled_expand(
        &self,
        suite_id: &SuiteId,
        prk: &[u8],
        label: &[u8],
        info: &[u8],
        length: usize,
    ) -> Result<Secret> {
        let suite_id = suite_id.as_bytes();
        let mut labeled_info = i2osp(length as u128, 2)?;
        labeled_info.reserve(HPKE_VERSION_LABEL.len() + suite_id.len() + label.len() + info.len());
        labeled_info.extend_from_slice(HPKE_VERSION_LABEL);
        labeled_info.extend_from_slice(suite_id);
        labeled_info.extend_from_slice(label);
        labeled_info.extend_from_slice(info);

        self.expand(prk, &labeled_info, length)
    }
}

/// Defines an HKDF instantiation over a SHA-2 hash.
macro_rules! impl_hkdf {
    ($name:ident, $hash:ty, $id:expr, $nh:literal, $doc:literal) => {
        #[doc = $doc]
        #[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
        pub struct $name;

        impl Kdf for $name {
            fn id(&self) -> KdfId {
                $id
            }

            fn extracted_length(&self) -> usize {
                $nh
            }

            fn extract(&self, salt: &[u8], ikm: &[u8]) -> Secret {
                // HKDF-Extract is a single HMAC keyed by the salt
                let Ok(mut mac) = Hmac::<$hash>::new_from_slice(salt) else {
                    unreachable!("HMAC accepts any key size");
                };
                mac.update(ikm);
                Zeroizing::new(mac.finalize().into_bytes().to_vec())
            }

            fn expand(&self, prk: &[u8], info: &[u8], length: usize) -> Result<Secret> {
                let max = 255 * $nh;
                if length > max {
                    return Err(HpkeError::ExpandLengthExceeded { requested: length, max });
                }

                let hkdf = Hkdf::<$hash>::from_prk(prk).map_err(|_| HpkeError::InvalidLength {
                    what: "PRK",
                    expected: $nh,
                    actual: prk.len(),
                })?;

                let mut okm = Zeroizing::new(vec![0u8; length]);
                hkdf.expand(info, okm.as_mut_slice())
                    .map_err(|_| HpkeError::ExpandLengthExceeded { requested: length, max })?;

                Ok(okm)
            }
        }
    };
}

impl_hkdf!(HkdfSha256, Sha256, KdfId::HkdfSha256, 32, "HKDF-SHA256");
impl_hkdf!(HkdfSha384, Sha384, KdfId::HkdfSha384, 48, "HKDF-SHA384");
impl_hkdf!(HkdfSha512, Sha512, KdfId::HkdfSha512, 64, "HKDF-SHA512");
