//! Encryption contexts produced by HPKE setup.
//!
//! A context is bound to one direction of one channel. Each seal/open uses
//! the nonce `base_nonce XOR I2OSP(sequence, Nn)` and then advances the
//! sequence, so a (key, nonce) pair is never used twice.
//!
//! ```text
//! sequence:  0        1        2       ...   2^(8*Nn) - 1
//!            │        │        │                 │
//!            ▼        ▼        ▼                 ▼
//! nonce:  base^0   base^1   base^2   ...   MessageLimitReached
//! ```
//!
//! A failed `open` leaves the sequence untouched: the receiver can still
//! open the genuine message for that slot.

use std::fmt;

use crate::{
    Secret,
    aead::Aead,
    error::{HpkeError, Result},
    kdf::Kdf,
    octets::{i2osp, xor},
    suite::{AeadId, SuiteId},
};

/// Message counter bounded by the nonce width.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Sequence {
    value: u128,
    max: u128,
}

impl Sequence {
    /// Counter starting at zero, bounded by `2^(8 * nonce_length) - 1`.
    fn new(nonce_length: usize) -> Self {
        let max = if nonce_length >= 16 { u128::MAX } else { (1u128 << (8 * nonce_length)) - 1 };
        Self { value: 0, max }
    }

    /// Error once the counter has reached its bound.
    fn check(&self) -> Result<()> {
        if self.value >= self.max {
            tracing::warn!(sequence = self.value, "context message limit reached");
            return Err(HpkeError::MessageLimitReached);
        }
        Ok(())
    }

    fn increment(&mut self) -> Result<()> {
        self.check()?;
        self.value += 1;
        Ok(())
    }
}

/// Key material and sequence state shared by sender and receiver contexts.
pub struct Context<F, A> {
    kdf: F,
    aead: A,
    suite_id: SuiteId,
    key: Secret,
    base_nonce: Secret,
    exporter_secret: Secret,
    sequence: Sequence,
}

impl<F: Kdf, A: Aead> Context<F, A> {
    pub(crate) fn new(
        kdf: F,
        aead: A,
        suite_id: SuiteId,
        key: Secret,
        base_nonce: Secret,
        exporter_secret: Secret,
    ) -> Self {
        let sequence = Sequence::new(aead.nonce_length());
        Self { kdf, aead, suite_id, key, base_nonce, exporter_secret, sequence }
    }

    /// AEAD key. Treat as secret.
    pub fn key(&self) -> &[u8] {
        &self.key
    }

    /// Base nonce the per-message nonces are derived from.
    pub fn base_nonce(&self) -> &[u8] {
        &self.base_nonce
    }

    /// Exporter secret. Treat as secret.
    pub fn exporter_secret(&self) -> &[u8] {
        &self.exporter_secret
    }

    /// Number of messages sealed or opened so far.
    pub fn sequence(&self) -> u128 {
        self.sequence.value
    }

    /// `base_nonce XOR I2OSP(sequence, Nn)` for the current sequence.
    pub fn compute_nonce(&self) -> Result<Vec<u8>> {
        let sequence = i2osp(self.sequence.value, self.aead.nonce_length())?;
        xor(&self.base_nonce, &sequence)
    }

    /// Derive `length` bytes of secret bound to `exporter_context`.
    ///
    /// # Errors
    ///
    /// - `ExportLengthExceeded` if `length > 255 * Nh`
    pub fn export(&self, exporter_context: &[u8], length: usize) -> Result<Secret> {
        let max = 255 * self.kdf.extracted_length();
        if length > max {
            return Err(HpkeError::ExportLengthExceeded { requested: length, max });
        }

        self.kdf.labeled_expand(&self.suite_id, &self.exporter_secret, b"sec", exporter_context, length)
    }

    /// Nonce for the next message, or an error if this context cannot
    /// encrypt.
    fn next_nonce(&self) -> Result<Vec<u8>> {
        if self.aead.id() == AeadId::ExportOnly {
            return Err(HpkeError::ExportOnly);
        }
        self.sequence.check()?;
        self.compute_nonce()
    }
}

impl<F: fmt::Debug, A: fmt::Debug> fmt::Debug for Context<F, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("kdf", &self.kdf)
            .field("aead", &self.aead)
            .field("sequence", &self.sequence.value)
            .finish_non_exhaustive()
    }
}

/// Seal-only context held by the sender.
#[derive(Debug)]
pub struct SenderContext<F, A> {
    context: Context<F, A>,
}

impl<F: Kdf, A: Aead> SenderContext<F, A> {
    pub(crate) fn new(context: Context<F, A>) -> Self {
        Self { context }
    }

    /// Encrypt `pt` bound to `aad`, returning `ct || tag`.
    ///
    /// The sequence advances on success, whether or not the caller keeps the
    /// ciphertext.
    ///
    /// # Errors
    ///
    /// - `MessageLimitReached` once the sequence is exhausted
    /// - `ExportOnly` for export-only suites
    pub fn seal(&mut self, aad: &[u8], pt: &[u8]) -> Result<Vec<u8>> {
        let nonce = self.context.next_nonce()?;
        let ct = self.context.aead.seal(&self.context.key, &nonce, aad, pt)?;
        self.context.sequence.increment()?;
        Ok(ct)
    }

    /// See [`Context::export`].
    pub fn export(&self, exporter_context: &[u8], length: usize) -> Result<Secret> {
        self.context.export(exporter_context, length)
    }

    /// Messages sealed so far.
    pub fn sequence(&self) -> u128 {
        self.context.sequence()
    }

    /// Derived key material.
    pub fn context(&self) -> &Context<F, A> {
        &self.context
    }
}

/// Open-only context held by the receiver.
#[derive(Debug)]
pub struct ReceiverContext<F, A> {
    context: Context<F, A>,
}

impl<F: Kdf, A: Aead> ReceiverContext<F, A> {
    pub(crate) fn new(context: Context<F, A>) -> Self {
        Self { context }
    }

    /// Verify and decrypt `ct` bound to `aad`.
    ///
    /// # Errors
    ///
    /// - `AuthenticationFailure` if the tag does not verify; the sequence
    ///   does not advance
    /// - `MessageLimitReached` once the sequence is exhausted
    /// - `ExportOnly` for export-only suites
    pub fn open(&mut self, aad: &[u8], ct: &[u8]) -> Result<Vec<u8>> {
        let nonce = self.context.next_nonce()?;
        let pt = self.context.aead.open(&self.context.key, &nonce, aad, ct).inspect_err(|_| {
            tracing::debug!(sequence = self.context.sequence.value, "open failed");
        })?;
        self.context.sequence.increment()?;
        Ok(pt)
    }

    /// See [`Context::export`].
    pub fn export(&self, exporter_context: &[u8], length: usize) -> Result<Secret> {
        self.context.export(exporter_context, length)
    }

    /// Messages opened so far.
    pub fn sequence(&self) -> u128 {
        self.context.sequence()
    }

    /// Derived key material.
    pub fn context(&self) -> &Context<F, A> {
        &self.context
    }
}

#[cfg(test)]
mod tests {
    use zeroize::Zeroizing;

    use super::*;
    use crate::{
        aead::{AesGcm128, ExportOnly},
        kdf::HkdfSha256,
        suite::{KdfId, KemId},
    };

    fn context<A: Aead>(aead: A) -> Context<HkdfSha256, A> {
        let suite_id = SuiteId::hpke(KemId::P256HkdfSha256, KdfId::HkdfSha256, aead.id());
        Context::new(
            HkdfSha256,
            aead.clone(),
            suite_id,
            Zeroizing::new(vec![0x11; aead.key_length()]),
            Zeroizing::new(vec![0x22; aead.nonce_length()]),
            Zeroizing::new(vec![0x33; 32]),
        )
    }

    fn pair() -> (SenderContext<HkdfSha256, AesGcm128>, ReceiverContext<HkdfSha256, AesGcm128>) {
        (SenderContext::new(context(AesGcm128)), ReceiverContext::new(context(AesGcm128)))
    }

    #[test]
    fn sequence_bound_follows_nonce_width() {
        assert_eq!(Sequence::new(12).max, (1u128 << 96) - 1);
        assert_eq!(Sequence::new(16).max, u128::MAX);
        assert_eq!(Sequence::new(0).max, 0);
    }

    #[test]
    fn nonce_is_base_nonce_xor_sequence() {
        let mut ctx = context(AesGcm128);
        assert_eq!(ctx.compute_nonce().unwrap(), vec![0x22; 12]);

        ctx.sequence.value = 0x0102;
        let mut expected = vec![0x22; 12];
        expected[10] ^= 0x01;
        expected[11] ^= 0x02;
        assert_eq!(ctx.compute_nonce().unwrap(), expected);
    }

    #[test]
    fn seal_and_open_advance_sequence() {
        let (mut sender, mut receiver) = pair();

        for i in 0..3u8 {
            let ct = sender.seal(b"aad", &[i; 8]).unwrap();
            assert_eq!(receiver.open(b"aad", &ct).unwrap(), vec![i; 8]);
        }

        assert_eq!(sender.sequence(), 3);
        assert_eq!(receiver.sequence(), 3);
    }

    #[test]
    fn failed_open_does_not_advance_sequence() {
        let (mut sender, mut receiver) = pair();
        let ct = sender.seal(b"aad", b"message").unwrap();

        assert_eq!(receiver.open(b"other", &ct), Err(HpkeError::AuthenticationFailure));
        assert_eq!(receiver.sequence(), 0);

        assert_eq!(receiver.open(b"aad", &ct).unwrap(), b"message");
        assert_eq!(receiver.sequence(), 1);
    }

    #[test]
    fn distinct_messages_use_distinct_nonces() {
        let (mut sender, _) = pair();
        let first = sender.seal(b"", b"same").unwrap();
        let second = sender.seal(b"", b"same").unwrap();

        assert_ne!(first, second);
    }

    #[test]
    fn seal_fails_at_message_limit() {
        let (mut sender, _) = pair();
        sender.context.sequence.value = sender.context.sequence.max - 1;

        assert!(sender.seal(b"", b"last").is_ok());
        assert_eq!(sender.seal(b"", b"one more"), Err(HpkeError::MessageLimitReached));
        assert_eq!(sender.sequence(), (1u128 << 96) - 1);
    }

    #[test]
    fn open_fails_at_message_limit() {
        let (_, mut receiver) = pair();
        receiver.context.sequence.value = receiver.context.sequence.max;

        let err = receiver.open(b"", &[0u8; 32]).unwrap_err();
        assert_eq!(err, HpkeError::MessageLimitReached);
        assert!(err.is_fatal());
    }

    #[test]
    fn export_respects_length_bound() {
        let ctx = context(AesGcm128);

        assert_eq!(ctx.export(b"ctx", 255 * 32).unwrap().len(), 255 * 32);
        assert_eq!(
            ctx.export(b"ctx", 255 * 32 + 1),
            Err(HpkeError::ExportLengthExceeded { requested: 255 * 32 + 1, max: 255 * 32 })
        );
    }

    #[test]
    fn export_depends_on_exporter_context() {
        let ctx = context(AesGcm128);
        assert_ne!(*ctx.export(b"a", 32).unwrap(), *ctx.export(b"b", 32).unwrap());
    }

    #[test]
    fn export_only_context_exports_but_cannot_seal() {
        let mut sender = SenderContext::new(context(ExportOnly));

        assert_eq!(sender.seal(b"", b"pt"), Err(HpkeError::ExportOnly));
        assert_eq!(sender.export(b"ctx", 16).unwrap().len(), 16);
    }

    #[test]
    fn debug_output_hides_key_material() {
        let ctx = context(AesGcm128);
        let rendered = format!("{ctx:?}");

        assert!(rendered.contains("sequence"));
        assert!(!rendered.contains("17, 17"));
    }
}
