//! Deterministic RNG wrapper and seed-derivation helpers.

use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use siphasher::sip::SipHasher13;
use std::hash::Hasher;

/// Master seed used when a configuration does not supply one.
pub const DEFAULT_MASTER_SEED: u64 = 0x05EE_D5EE_DD15_5EED_u64;

/// Substream family used for detector noise realisations.
pub const NOISE_STREAM: u64 = 0x4E01_5E00;

/// Substream family used for sampler seeds.
pub const SAMPLER_STREAM: u64 = 0x5A4D_9E00;

/// Deterministic RNG handle exposed to glens consumers.
///
/// The handle is a thin wrapper around `StdRng`. Substreams are derived by
/// hashing `(master_seed, substream_id)` with SipHash-1-3 configured with fixed
/// zero keys, so noise for one detector never depends on how many draws another
/// detector or a sampler made.
#[derive(Debug, Clone)]
pub struct RngHandle {
    rng: StdRng,
}

impl RngHandle {
    /// Creates a new RNG handle from a master seed.
    pub fn from_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Creates a handle for `substream` of the given stream family.
    pub fn substream(master_seed: u64, family: u64, substream: u64) -> Self {
        Self::from_seed(derive_substream_seed(
            derive_substream_seed(master_seed, family),
            substream,
        ))
    }

    /// Returns a uniform draw in `[0, 1)`.
    pub fn next_unit(&mut self) -> f64 {
        (self.rng.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }
}

impl RngCore for RngHandle {
    fn next_u32(&mut self) -> u32 {
        self.rng.next_u32()
    }

    fn next_u64(&mut self) -> u64 {
        self.rng.next_u64()
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        self.rng.fill_bytes(dest)
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
        self.rng.try_fill_bytes(dest)
    }
}

/// Derives the deterministic seed for a specific substream.
pub fn derive_substream_seed(master_seed: u64, substream: u64) -> u64 {
    let mut hasher = SipHasher13::new_with_keys(0, 0);
    hasher.write_u64(master_seed);
    hasher.write_u64(substream);
    hasher.finish()
}

/// Derives a stable substream identifier from a text label.
pub fn label_substream(label: &str) -> u64 {
    let mut hasher = SipHasher13::new_with_keys(0, 0);
    hasher.write(label.as_bytes());
    hasher.finish()
}
