//! HPKE setup: the four modes and the key schedule (RFC 9180 §5.1).
//!
//! | Mode       | Sender                | Receiver              | Extra inputs        |
//! |------------|-----------------------|-----------------------|---------------------|
//! | `Base`     | `setup_base_s`        | `setup_base_r`        |                     |
//! | `Psk`      | `setup_psk_s`         | `setup_psk_r`         | psk, psk_id         |
//! | `Auth`     | `setup_auth_s`        | `setup_auth_r`        | sender static key   |
//! | `AuthPsk`  | `setup_auth_psk_s`    | `setup_auth_psk_r`    | psk, psk_id, sender |
//!
//! Every sender call returns `(enc, SenderContext)`; `enc` goes to the peer,
//! which passes it to the matching receiver call.
//!
//! # Key Schedule
//!
//! ```text
//! psk_id_hash = LabeledExtract("", "psk_id_hash", psk_id)
//! info_hash   = LabeledExtract("", "info_hash", info)
//! context     = mode || psk_id_hash || info_hash
//! secret      = LabeledExtract(shared_secret, "secret", psk)
//!
//! key             = LabeledExpand(secret, "key", context, Nk)
//! base_nonce      = LabeledExpand(secret, "base_nonce", context, Nn)
//! exporter_secret = LabeledExpand(secret, "exp", context, Nh)
//! ```

use rand::{CryptoRng, RngCore};

use crate::{
    aead::Aead,
    context::{Context, ReceiverContext, SenderContext},
    error::{HpkeError, Result},
    kdf::Kdf,
    kem::{AuthKem, Kem, PrivateKey, PublicKey, check_kem},
    suite::{CipherSuite, SuiteId},
};

/// HPKE mode, encoded as the first byte of the key schedule context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Mode {
    /// Encryption to a public key
    Base = 0x00,
    /// Additionally authenticated by a pre-shared key
    Psk = 0x01,
    /// Additionally authenticated by the sender's static KEM key
    Auth = 0x02,
    /// Both PSK and sender key authentication
    AuthPsk = 0x03,
}

impl Mode {
    /// Key schedule mode byte.
    pub fn to_u8(self) -> u8 {
        self as u8
    }

    fn uses_psk(self) -> bool {
        matches!(self, Self::Psk | Self::AuthPsk)
    }

    fn uses_auth(self) -> bool {
        matches!(self, Self::Auth | Self::AuthPsk)
    }
}

/// Pre-shared key and its identifier.
///
/// Both are empty in `Base` and `Auth` modes, both non-empty otherwise.
#[derive(Clone, Copy, Default)]
pub struct Psk<'a> {
    /// Pre-shared key bytes
    pub psk: &'a [u8],
    /// Identifier of the pre-shared key
    pub id: &'a [u8],
}

impl Psk<'static> {
    /// No pre-shared key.
    pub const NONE: Self = Self { psk: &[], id: &[] };
}

impl<'a> Psk<'a> {
    /// A pre-shared key and its identifier.
    pub fn new(psk: &'a [u8], id: &'a [u8]) -> Self {
        Self { psk, id }
    }

    /// Check the PSK inputs against `mode`.
    ///
    /// # Errors
    ///
    /// - `InconsistentPskInputs` if exactly one of psk/id is empty
    /// - `UnexpectedPskInput` if a PSK is given to `Base` or `Auth`
    /// - `MissingPskInput` if no PSK is given to `Psk` or `AuthPsk`
    pub fn verify(&self, mode: Mode) -> Result<()> {
        let got_psk = !self.psk.is_empty();
        let got_psk_id = !self.id.is_empty();

        if got_psk != got_psk_id {
            return Err(HpkeError::InconsistentPskInputs);
        }
        if got_psk && !mode.uses_psk() {
            return Err(HpkeError::UnexpectedPskInput);
        }
        if !got_psk && mode.uses_psk() {
            return Err(HpkeError::MissingPskInput);
        }
        Ok(())
    }
}

impl std::fmt::Debug for Psk<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Psk").field("id_len", &self.id.len()).finish_non_exhaustive()
    }
}

/// An HPKE instance: one KEM, one KDF and one AEAD.
#[derive(Debug, Clone)]
pub struct Hpke<K, F, A> {
    kem: K,
    kdf: F,
    aead: A,
    suite_id: SuiteId,
}

impl<K: Kem, F: Kdf, A: Aead> Hpke<K, F, A> {
    /// Compose an HPKE instance from its three algorithms.
    pub fn new(kem: K, kdf: F, aead: A) -> Self {
        let suite_id = SuiteId::hpke(kem.id(), kdf.id(), aead.id());
        Self { kem, kdf, aead, suite_id }
    }

    /// The KEM, e.g. for key generation.
    pub fn kem(&self) -> &K {
        &self.kem
    }

    /// The key schedule KDF.
    pub fn kdf(&self) -> &F {
        &self.kdf
    }

    /// The AEAD.
    pub fn aead(&self) -> &A {
        &self.aead
    }

    /// `"HPKE" || kem_id || kdf_id || aead_id`
    pub fn suite_id(&self) -> &SuiteId {
        &self.suite_id
    }

    /// Algorithm identifiers of this instance.
    pub fn suite(&self) -> CipherSuite {
        CipherSuite { kem: self.kem.id(), kdf: self.kdf.id(), aead: self.aead.id() }
    }

    /// Base mode sender setup.
    pub fn setup_base_s<R: CryptoRng + RngCore>(
        &self,
        pk_r: &PublicKey,
        info: &[u8],
        rng: &mut R,
    ) -> Result<(Vec<u8>, SenderContext<F, A>)> {
        self.setup_s(Mode::Base, pk_r, info, Psk::NONE, None, rng)
    }

    /// Base mode receiver setup.
    pub fn setup_base_r(
        &self,
        enc: &[u8],
        sk_r: &PrivateKey,
        info: &[u8],
    ) -> Result<ReceiverContext<F, A>> {
        self.setup_r(Mode::Base, enc, sk_r, info, Psk::NONE, None)
    }

    /// PSK mode sender setup.
    pub fn setup_psk_s<R: CryptoRng + RngCore>(
        &self,
        pk_r: &PublicKey,
        info: &[u8],
        psk: &[u8],
        psk_id: &[u8],
        rng: &mut R,
    ) -> Result<(Vec<u8>, SenderContext<F, A>)> {
        self.setup_s(Mode::Psk, pk_r, info, Psk::new(psk, psk_id), None, rng)
    }

    /// PSK mode receiver setup.
    pub fn setup_psk_r(
        &self,
        enc: &[u8],
        sk_r: &PrivateKey,
        info: &[u8],
        psk: &[u8],
        psk_id: &[u8],
    ) -> Result<ReceiverContext<F, A>> {
        self.setup_r(Mode::Psk, enc, sk_r, info, Psk::new(psk, psk_id), None)
    }

    /// Auth mode sender setup, authenticated by `sk_s`.
    pub fn setup_auth_s<R: CryptoRng + RngCore>(
        &self,
        pk_r: &PublicKey,
        info: &[u8],
        sk_s: &PrivateKey,
        rng: &mut R,
    ) -> Result<(Vec<u8>, SenderContext<F, A>)> {
        self.setup_s(Mode::Auth, pk_r, info, Psk::NONE, Some(sk_s), rng)
    }

    /// Auth mode receiver setup, verifying the sender holds `pk_s`.
    pub fn setup_auth_r(
        &self,
        enc: &[u8],
        sk_r: &PrivateKey,
        info: &[u8],
        pk_s: &PublicKey,
    ) -> Result<ReceiverContext<F, A>> {
        self.setup_r(Mode::Auth, enc, sk_r, info, Psk::NONE, Some(pk_s))
    }

    /// AuthPSK mode sender setup.
    pub fn setup_auth_psk_s<R: CryptoRng + RngCore>(
        &self,
        pk_r: &PublicKey,
        info: &[u8],
        psk: &[u8],
        psk_id: &[u8],
        sk_s: &PrivateKey,
        rng: &mut R,
    ) -> Result<(Vec<u8>, SenderContext<F, A>)> {
        self.setup_s(Mode::AuthPsk, pk_r, info, Psk::new(psk, psk_id), Some(sk_s), rng)
    }

    /// AuthPSK mode receiver setup.
    pub fn setup_auth_psk_r(
        &self,
        enc: &[u8],
        sk_r: &PrivateKey,
        info: &[u8],
        psk: &[u8],
        psk_id: &[u8],
        pk_s: &PublicKey,
    ) -> Result<ReceiverContext<F, A>> {
        self.setup_r(Mode::AuthPsk, enc, sk_r, info, Psk::new(psk, psk_id), Some(pk_s))
    }

    /// Sender setup in any mode with a caller-chosen ephemeral key.
    ///
    /// Deterministic, for known-answer tests only. `sk_s` must be present
    /// exactly for the auth modes.
    pub fn setup_s_with_ephemeral(
        &self,
        mode: Mode,
        pk_r: &PublicKey,
        info: &[u8],
        psk: Psk<'_>,
        sk_s: Option<&PrivateKey>,
        sk_e: &PrivateKey,
    ) -> Result<(Vec<u8>, SenderContext<F, A>)> {
        self.check_sender_inputs(mode, pk_r, psk, sk_s)?;

        let (shared_secret, enc) = match sk_s {
            Some(sk_s) => self.auth()?.auth_encap_with_ephemeral(pk_r, sk_s, sk_e)?,
            None => self.kem.encap_with_ephemeral(pk_r, sk_e)?,
        };

        let context = self.key_schedule(mode, &shared_secret, info, psk)?;
        Ok((enc, SenderContext::new(context)))
    }

    fn setup_s<R: CryptoRng + RngCore>(
        &self,
        mode: Mode,
        pk_r: &PublicKey,
        info: &[u8],
        psk: Psk<'_>,
        sk_s: Option<&PrivateKey>,
        rng: &mut R,
    ) -> Result<(Vec<u8>, SenderContext<F, A>)> {
        self.check_sender_inputs(mode, pk_r, psk, sk_s)?;

        let (shared_secret, enc) = match sk_s {
            Some(sk_s) => self.kem.auth_encap(pk_r, sk_s, rng)?,
            None => self.kem.encap(pk_r, rng)?,
        };

        let context = self.key_schedule(mode, &shared_secret, info, psk)?;
        Ok((enc, SenderContext::new(context)))
    }

    fn setup_r(
        &self,
        mode: Mode,
        enc: &[u8],
        sk_r: &PrivateKey,
        info: &[u8],
        psk: Psk<'_>,
        pk_s: Option<&PublicKey>,
    ) -> Result<ReceiverContext<F, A>> {
        psk.verify(mode)?;
        check_kem(self.kem.id(), sk_r.kem())?;
        if let Some(pk_s) = pk_s {
            check_kem(self.kem.id(), pk_s.kem())?;
        }

        let shared_secret = match pk_s {
            Some(pk_s) => self.auth()?.auth_decap(enc, sk_r, pk_s)?,
            None => self.kem.decap(enc, sk_r)?,
        };

        let context = self.key_schedule(mode, &shared_secret, info, psk)?;
        Ok(ReceiverContext::new(context))
    }

    fn check_sender_inputs(
        &self,
        mode: Mode,
        pk_r: &PublicKey,
        psk: Psk<'_>,
        sk_s: Option<&PrivateKey>,
    ) -> Result<()> {
        psk.verify(mode)?;
        match (mode.uses_auth(), sk_s.is_some()) {
            (true, false) => return Err(HpkeError::MissingSenderKey),
            (false, true) => return Err(HpkeError::UnexpectedSenderKey),
            _ => {}
        }
        check_kem(self.kem.id(), pk_r.kem())?;
        if let Some(sk_s) = sk_s {
            check_kem(self.kem.id(), sk_s.kem())?;
        }
        Ok(())
    }

    fn auth(&self) -> Result<&dyn AuthKem> {
        self.kem.as_auth().ok_or(HpkeError::AuthNotSupported { kem: self.kem.id() })
    }

    fn key_schedule(
        &self,
        mode: Mode,
        shared_secret: &[u8],
        info: &[u8],
        psk: Psk<'_>,
    ) -> Result<Context<F, A>> {
        let kdf = &self.kdf;
        let suite_id = &self.suite_id;

        let psk_id_hash = kdf.labeled_extract(suite_id, &[], b"psk_id_hash", psk.id);
        let info_hash = kdf.labeled_extract(suite_id, &[], b"info_hash", info);

        let mut ks_context = Vec::with_capacity(1 + psk_id_hash.len() + info_hash.len());
        ks_context.push(mode.to_u8());
        ks_context.extend_from_slice(&psk_id_hash);
        ks_context.extend_from_slice(&info_hash);

        let secret = kdf.labeled_extract(suite_id, shared_secret, b"secret", psk.psk);

        let key =
            kdf.labeled_expand(suite_id, &secret, b"key", &ks_context, self.aead.key_length())?;
        let base_nonce = kdf.labeled_expand(
            suite_id,
            &secret,
            b"base_nonce",
            &ks_context,
            self.aead.nonce_length(),
        )?;
        let exporter_secret =
            kdf.labeled_expand(suite_id, &secret, b"exp", &ks_context, kdf.extracted_length())?;

        tracing::debug!(
            ?mode,
            kem = ?self.kem.id(),
            kdf = ?kdf.id(),
            aead = ?self.aead.id(),
            "established HPKE context"
        );

        Ok(Context::new(
            kdf.clone(),
            self.aead.clone(),
            suite_id.clone(),
            key,
            base_nonce,
            exporter_secret,
        ))
    }
}

impl<K: Kem + Default, F: Kdf + Default, A: Aead + Default> Default for Hpke<K, F, A> {
    fn default() -> Self {
        Self::new(K::default(), F::default(), A::default())
    }
}
