//! Deterministic content RNG.
//!
//! A string seed is hashed and folded through a sine transform, yielding the
//! same sequence for the same seed on every run. This keeps generated cases
//! reproducible: the seed is the case.
//!
//! The statistical quality of this generator (clustering, period) is
//! unverified. It is fine for picking weapons and shuffling suspects and
//! must never be used for anything security-relevant. Swapping in a vetted
//! PRNG would silently change every existing seed's case, so the transform
//! stays as-is.

/// Seeded pseudo-random sequence.
#[derive(Debug, Clone)]
pub struct SeededRng {
    state: f64,
}

impl SeededRng {
    pub fn new(seed: &str) -> Self {
        let mut hash: u32 = 0;
        for byte in seed.bytes() {
            hash = hash.wrapping_mul(31).wrapping_add(u32::from(byte));
        }
        Self {
            state: f64::from(hash),
        }
    }

    /// Next value in `[0, 1)`.
    pub fn next_f64(&mut self) -> f64 {
        self.state += 1.0;
        let x = self.state.sin() * 10_000.0;
        x - x.floor()
    }

    /// Uniform index into `0..len`. `len` must be non-zero.
    pub fn pick_index(&mut self, len: usize) -> usize {
        debug_assert!(len > 0, "pick_index on empty range");
        let idx = (self.next_f64() * len as f64) as usize;
        idx.min(len - 1)
    }

    pub fn pick<'a, T>(&mut self, items: &'a [T]) -> &'a T {
        &items[self.pick_index(items.len())]
    }

    /// Event with probability `p`.
    pub fn chance(&mut self, p: f64) -> bool {
        self.next_f64() < p
    }

    /// Uniform integer in `lo..hi`.
    pub fn range(&mut self, lo: u32, hi: u32) -> u32 {
        debug_assert!(lo < hi, "empty range");
        lo + self.pick_index((hi - lo) as usize) as u32
    }

    /// In-place Fisher-Yates shuffle.
    pub fn shuffle<T>(&mut self, items: &mut [T]) {
        for i in (1..items.len()).rev() {
            let j = self.pick_index(i + 1);
            items.swap(i, j);
        }
    }
}
