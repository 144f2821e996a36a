//! # Deterministic random number generation
//!
//! Every randomized decision of the engine flows through a single [`Rng`]
//! instance seeded at engine creation, so a fixed seed reproduces the exact
//! same search.

use rand::rngs::StdRng;
use rand::{Rng as _, SeedableRng};

#[derive(Debug)]
pub struct Rng {
    inner: StdRng,
}

impl Rng {
    pub fn new(seed: u32) -> Self {
        Self {
            inner: StdRng::seed_from_u64(u64::from(seed)),
        }
    }

    /// A uniformly random value in the inclusive range `[lo, hi]`.
    pub fn pick_uniform(&mut self, lo: u64, hi: u64) -> u64 {
        assert!(lo <= hi, "empty range for pick_uniform");
        self.inner.gen_range(lo..=hi)
    }

    /// True with probability `permille / 1000`.
    pub fn pick_with_prob(&mut self, permille: u32) -> bool {
        assert!(permille <= 1000, "probability must be given in permille");
        self.pick_uniform(0, 999) < u64::from(permille)
    }

    /// A uniformly random index into a collection of length `len`.
    pub fn pick_index(&mut self, len: usize) -> usize {
        assert!(len > 0, "can not pick from an empty collection");
        self.pick_uniform(0, len as u64 - 1) as usize
    }

    /// A uniformly random element of a non-empty slice.
    pub fn pick_from_slice<T: Copy>(&mut self, values: &[T]) -> T {
        values[self.pick_index(values.len())]
    }

    pub fn pick_u64(&mut self) -> u64 {
        self.inner.gen()
    }

    pub fn flip(&mut self) -> bool {
        self.inner.gen()
    }
}
