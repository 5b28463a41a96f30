//! Deterministic simulation-level RNG wrapper.
//!
//! # Determinism strategy
//!
//! Randomness lives in an explicit `SimRng` handle, seeded once per run and
//! passed by `&mut` into route sampling — never a shared static stream.  Two
//! runs with the same seed produce identical route tables and therefore
//! identical flow histories.
//!
//! `child()` derives independently seeded sub-streams (e.g. one per sampling
//! pass) using golden-ratio seed mixing, so adding a pass never disturbs the
//! draws of earlier passes.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

/// 64-bit fractional golden-ratio constant for seed mixing.
const MIXING_CONSTANT: u64 = 0x9e37_79b9_7f4a_7c15;

/// Simulation-level deterministic RNG.
///
/// Used only in single-threaded or explicitly synchronised contexts.  If a
/// phase needs parallel randomness, give each worker its own `SimRng` derived
/// via [`SimRng::child`].
pub struct SimRng(SmallRng);

impl SimRng {
    pub fn new(seed: u64) -> Self {
        SimRng(SmallRng::seed_from_u64(seed))
    }

    /// Derive a child `SimRng` with a different seed offset — useful for
    /// seeding per-pass or per-thread RNGs deterministically from the root.
    pub fn child(&mut self, offset: u64) -> SimRng {
        let child_seed: u64 = self.0.r#gen::<u64>() ^ offset.wrapping_mul(MIXING_CONSTANT);
        SimRng(SmallRng::seed_from_u64(child_seed))
    }

    /// Expose the inner `SmallRng` for use with `rand`/`rand_distr`
    /// distribution types (`dist.sample(rng.inner())`).
    #[inline]
    pub fn inner(&mut self) -> &mut SmallRng {
        &mut self.0
    }

    #[inline]
    pub fn random<T>(&mut self) -> T
    where
        rand::distributions::Standard: rand::distributions::Distribution<T>,
    {
        self.0.r#gen()
    }

    #[inline]
    pub fn gen_range<T, R>(&mut self, range: R) -> T
    where
        T: rand::distributions::uniform::SampleUniform,
        R: rand::distributions::uniform::SampleRange<T>,
    {
        self.0.gen_range(range)
    }

    #[inline]
    pub fn gen_bool(&mut self, p: f64) -> bool {
        self.0.gen_bool(p.clamp(0.0, 1.0))
    }
}
