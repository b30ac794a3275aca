//! Random sources for record generation.
//!
//! RULE: Builders and samplers never reach for a thread-local or global RNG.
//! Every draw flows through the SampleRng handed to them by the batch driver.
//!
//! A seeded run derives one stream per entity type from the seed, seeded
//! from (seed XOR stream_index). This means:
//!   - Customer and patient batches with the same seed do not share draws.
//!   - Each stream is fully reproducible in isolation.
//!
//! A SampleRng is owned by exactly one batch and is not shared across
//! threads; there is no process-wide random state to lock.

use crate::types::Seed;
use rand::{RngCore, SeedableRng};
use rand_pcg::Pcg64Mcg;

/// A named random stream for a single batch.
pub struct SampleRng {
    pub name: &'static str,
    inner: Pcg64Mcg,
}

impl SampleRng {
    /// Create a stream from the run seed and a stable stream index.
    /// The index must never change once assigned.
    pub fn new(seed: u64, stream_index: u64) -> Self {
        let derived_seed = seed ^ (stream_index.wrapping_mul(0x9e37_79b9_7f4a_7c15));
        Self {
            name: "unnamed",
            inner: Pcg64Mcg::seed_from_u64(derived_seed),
        }
    }

    /// Create a stream seeded from OS entropy. Not reproducible.
    pub fn from_entropy() -> Self {
        Self {
            name: "entropy",
            inner: Pcg64Mcg::from_entropy(),
        }
    }

    pub fn with_name(mut self, name: &'static str) -> Self {
        self.name = name;
        self
    }

    /// Roll a float in [0.0, 1.0).
    pub fn next_f64(&mut self) -> f64 {
        let bits = self.inner.next_u64();
        (bits >> 11) as f64 * (1.0 / (1u64 << 53) as f64)
    }

    /// Roll a u64 in [0, n).
    pub fn next_u64_below(&mut self, n: u64) -> u64 {
        assert!(n > 0, "n must be > 0");
        self.inner.next_u64() % n
    }

    /// Roll an integer in [lo, hi], both ends included.
    pub fn int_inclusive(&mut self, lo: i64, hi: i64) -> i64 {
        assert!(lo <= hi, "lo must be <= hi");
        let span = hi.abs_diff(lo).saturating_add(1);
        lo.wrapping_add(self.next_u64_below(span) as i64)
    }

    /// Bernoulli trial: returns true with probability p.
    pub fn chance(&mut self, p: f64) -> bool {
        self.next_f64() < p
    }

    /// Uniform float in [a, b).
    pub fn uniform(&mut self, a: f64, b: f64) -> f64 {
        a + (b - a) * self.next_f64()
    }

    /// Pick one element uniformly. `items` must not be empty.
    pub fn pick<'a, T>(&mut self, items: &'a [T]) -> &'a T {
        &items[self.next_u64_below(items.len() as u64) as usize]
    }
}

impl RngCore for SampleRng {
    fn next_u32(&mut self) -> u32 {
        self.inner.next_u32()
    }

    fn next_u64(&mut self) -> u64 {
        self.inner.next_u64()
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        self.inner.fill_bytes(dest)
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
        self.inner.try_fill_bytes(dest)
    }
}

/// All entity streams for a single seeded run, indexed by stable slot.
pub struct RngBank {
    seed: u64,
}

impl RngBank {
    /// Negative seeds use their two's-complement bits.
    pub fn new(seed: Seed) -> Self {
        Self { seed: seed as u64 }
    }

    pub fn for_stream(&self, slot: StreamSlot) -> SampleRng {
        SampleRng::new(self.seed, slot as u64).with_name(slot.name())
    }
}

/// Stable stream slot assignments.
/// NEVER reorder or remove entries; only append.
/// Reordering changes every entity's seeded output.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u64)]
pub enum StreamSlot {
    Customer = 1,
    Patient = 2,
}

impl StreamSlot {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Customer => "customer",
            Self::Patient => "patient",
        }
    }
}
