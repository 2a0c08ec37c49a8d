//! Seeded pseudo-random number generator.
//!
//! A 64-bit xorshift generator (shifts 13, 7, 17). It is small, deterministic for a
//! given seed and good enough to pick victims and to generate fuzz workloads.

/// State substituted for a zero seed, which would otherwise lock the generator at zero.
const ZERO_SEED_STATE: u64 = 0x9E37_79B9_7F4A_7C15;

/// Xorshift pseudo-random number generator.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct XorShift64 {
    state: u64,
}

impl XorShift64 {
    /// Creates a generator from `seed`. Equal seeds produce equal sequences.
    pub const fn new(seed: u64) -> Self {
        Self {
            state: if seed == 0 { ZERO_SEED_STATE } else { seed },
        }
    }

    /// Advances the generator and returns the next 64-bit value.
    pub const fn next_u64(&mut self) -> u64 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.state = x;
        x
    }

    /// Returns the next value truncated to 32 bits.
    pub const fn next_u32(&mut self) -> u32 {
        (self.next_u64() >> 32) as u32
    }

    /// Fills `buf` with random bytes.
    pub fn fill(&mut self, buf: &mut [u8]) {
        for chunk in buf.chunks_mut(8) {
            let bytes = self.next_u64().to_le_bytes();
            chunk.copy_from_slice(&bytes[..chunk.len()]);
        }
    }

    /// Returns a value in `0..bound`; `bound` must be nonzero.
    pub const fn below(&mut self, bound: u64) -> u64 {
        self.next_u64() % bound
    }
}
