//! Fuzz target for HPKE receiver setup and open
//!
//! Tests the receiver path under adversarial inputs.
//!
//! # Strategy
//!
//! - Arbitrary `enc` bytes (wrong length, off-curve, identity, valid)
//! - Genuine ciphertexts with arbitrary bit flips
//! - Arbitrary aad and raw ciphertext bytes
//!
//! # Invariants
//!
//! - Setup and open never panic, only return errors
//! - A modified ciphertext or aad never opens
//! - A failed open leaves the sequence unchanged
//! - The genuine ciphertext still opens after failed attempts

#![no_main]

use arbitrary::Arbitrary;
use latchkey_hpke::{AesGcm128, DhKemP256, HkdfSha256, Hpke, Kem};
use libfuzzer_sys::fuzz_target;
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;

#[derive(Debug, Arbitrary)]
struct OpenScenario {
    /// Seed for recipient and ephemeral keys
    seed: u64,
    /// Replacement `enc`, used instead of the genuine one when present
    forged_enc: Option<Vec<u8>>,
    /// Plaintext sealed by the genuine sender
    plaintext: Vec<u8>,
    /// Associated data for the genuine seal
    aad: Vec<u8>,
    /// Attacks applied before the genuine open
    attacks: Vec<Attack>,
}

#[derive(Debug, Arbitrary)]
enum Attack {
    /// Flip one bit of the genuine ciphertext
    FlipBit { index: usize, bit: u8 },
    /// Open the genuine ciphertext under different aad
    WrongAad(Vec<u8>),
    /// Open attacker-chosen bytes
    Raw(Vec<u8>),
}

fuzz_target!(|scenario: OpenScenario| {
    let mut rng = ChaCha20Rng::seed_from_u64(scenario.seed);
    let hpke: Hpke<DhKemP256, HkdfSha256, AesGcm128> = Hpke::default();
    let (sk_r, pk_r) = hpke.kem().generate_key_pair(&mut rng).unwrap();

    let (enc, mut sender) = hpke.setup_base_s(&pk_r, b"fuzz", &mut rng).unwrap();

    if let Some(forged) = &scenario.forged_enc {
        // Arbitrary enc must be rejected or produce an unrelated context
        let _ = hpke.setup_base_r(forged, &sk_r, b"fuzz");
        return;
    }

    let mut receiver = hpke.setup_base_r(&enc, &sk_r, b"fuzz").unwrap();
    let ct = sender.seal(&scenario.aad, &scenario.plaintext).unwrap();

    for attack in &scenario.attacks {
        let result = match attack {
            Attack::FlipBit { index, bit } => {
                let mut tampered = ct.clone();
                let i = index % tampered.len();
                tampered[i] ^= 1 << (bit % 8);
                receiver.open(&scenario.aad, &tampered)
            },
            Attack::WrongAad(aad) => {
                if *aad == scenario.aad {
                    continue;
                }
                receiver.open(aad, &ct)
            },
            Attack::Raw(bytes) => {
                if *bytes == ct {
                    continue;
                }
                receiver.open(&scenario.aad, bytes)
            },
        };

        assert!(result.is_err(), "forged input opened");
        assert_eq!(receiver.sequence(), 0, "failed open advanced the sequence");
    }

    let opened = receiver.open(&scenario.aad, &ct).unwrap();
    assert_eq!(opened, scenario.plaintext);
    assert_eq!(receiver.sequence(), 1);
});
