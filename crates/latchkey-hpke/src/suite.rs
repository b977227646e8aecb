//! Algorithm identifiers and suite-id labels (RFC 9180 §7).
//!
//! HPKE domain-separates every labeled KDF call with a suite id. Which suite
//! id applies depends on who is calling:
//!
//! ```text
//! KEM-internal (DeriveKeyPair, ExtractAndExpand)  "KEM" || kem_id
//! HPKE key schedule and exporter                  "HPKE" || kem_id || kdf_id || aead_id
//! Bare KDF use                                    "KDF" || kdf_id
//! ```
//!
//! Mixing these up silently breaks interoperability, so each scope has its
//! own constructor on [`SuiteId`].

use serde::{Deserialize, Serialize};

use crate::error::HpkeError;

/// KEM identifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u16)]
pub enum KemId {
    /// DHKEM(P-256, HKDF-SHA256)
    P256HkdfSha256 = 0x0010,
    /// DHKEM(P-384, HKDF-SHA384)
    P384HkdfSha384 = 0x0011,
}

/// KDF identifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u16)]
pub enum KdfId {
    /// HKDF-SHA256
    HkdfSha256 = 0x0001,
    /// HKDF-SHA384
    HkdfSha384 = 0x0002,
    /// HKDF-SHA512
    HkdfSha512 = 0x0003,
}

/// AEAD identifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u16)]
pub enum AeadId {
    /// AES-128-GCM
    Aes128Gcm = 0x0001,
    /// AES-256-GCM
    Aes256Gcm = 0x0002,
    /// ChaCha20-Poly1305
    ChaCha20Poly1305 = 0x0003,
    /// Export-only: the context can export secrets but not seal/open
    ExportOnly = 0xFFFF,
}

impl KemId {
    /// Registry value.
    pub fn to_u16(self) -> u16 {
        self as u16
    }
}

impl KdfId {
    /// Registry value.
    pub fn to_u16(self) -> u16 {
        self as u16
    }
}

impl AeadId {
    /// Registry value.
    pub fn to_u16(self) -> u16 {
        self as u16
    }
}

impl TryFrom<u16> for KemId {
    type Error = HpkeError;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            0x0010 => Ok(Self::P256HkdfSha256),
            0x0011 => Ok(Self::P384HkdfSha384),
            id => Err(HpkeError::UnsupportedAlgorithm { kind: "KEM", id }),
        }
    }
}

impl TryFrom<u16> for KdfId {
    type Error = HpkeError;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            0x0001 => Ok(Self::HkdfSha256),
            0x0002 => Ok(Self::HkdfSha384),
            0x0003 => Ok(Self::HkdfSha512),
            id => Err(HpkeError::UnsupportedAlgorithm { kind: "KDF", id }),
        }
    }
}

impl TryFrom<u16> for AeadId {
    type Error = HpkeError;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            0x0001 => Ok(Self::Aes128Gcm),
            0x0002 => Ok(Self::Aes256Gcm),
            0x0003 => Ok(Self::ChaCha20Poly1305),
            0xFFFF => Ok(Self::ExportOnly),
            id => Err(HpkeError::UnsupportedAlgorithm { kind: "AEAD", id }),
        }
    }
}

/// Domain-separation prefix for labeled KDF calls.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SuiteId(Vec<u8>);

impl SuiteId {
    /// `"KEM" || I2OSP(kem_id, 2)`, used inside a KEM.
    pub fn kem(kem: KemId) -> Self {
        Self::concat(b"KEM", &[kem.to_u16()])
    }

    /// `"KDF" || I2OSP(kdf_id, 2)`, used by a standalone KDF.
    pub fn kdf(kdf: KdfId) -> Self {
        Self::concat(b"KDF", &[kdf.to_u16()])
    }

    /// `"HPKE" || I2OSP(kem_id, 2) || I2OSP(kdf_id, 2) || I2OSP(aead_id, 2)`,
    /// used by the key schedule and exporter.
    pub fn hpke(kem: KemId, kdf: KdfId, aead: AeadId) -> Self {
        Self::concat(b"HPKE", &[kem.to_u16(), kdf.to_u16(), aead.to_u16()])
    }

    fn concat(prefix: &[u8], ids: &[u16]) -> Self {
        let mut bytes = Vec::with_capacity(prefix.len() + 2 * ids.len());
        bytes.extend_from_slice(prefix);
        for id in ids {
            bytes.extend_from_slice(&id.to_be_bytes());
        }
        Self(bytes)
    }

    /// Raw suite id bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

/// A complete HPKE algorithm selection.
///
/// Plain data: higher layers store it in their own configuration and
/// persisted group state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CipherSuite {
    /// Key encapsulation mechanism
    pub kem: KemId,
    /// Key derivation function
    pub kdf: KdfId,
    /// Authenticated encryption scheme
    pub aead: AeadId,
}

impl CipherSuite {
    /// Build a suite from raw registry values.
    pub fn from_ids(kem: u16, kdf: u16, aead: u16) -> Result<Self, HpkeError> {
        Ok(Self { kem: kem.try_into()?, kdf: kdf.try_into()?, aead: aead.try_into()? })
    }

    /// The 10-byte HPKE suite id for this selection.
    pub fn suite_id(&self) -> SuiteId {
        SuiteId::hpke(self.kem, self.kdf, self.aead)
    }
}
