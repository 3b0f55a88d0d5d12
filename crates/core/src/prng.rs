//! Injectable random sources.
//!
//! Every randomized initialization in the backdrop (particle positions,
//! velocities, radii, colors) draws from a [`RandomSource`] handed in by the
//! caller. [`Xorshift64`] is the default implementation: same seed, same
//! sequence, on every platform.

use serde::{Deserialize, Serialize};

/// A source of uniformly distributed values.
///
/// Only [`next_f64`](RandomSource::next_f64) is required; the range helpers
/// are derived from it.
pub trait RandomSource {
    /// Returns a uniformly distributed f64 in [0, 1).
    fn next_f64(&mut self) -> f64;

    /// Returns a uniformly distributed f64 in [min, max).
    ///
    /// An empty range (`min == max`) always yields `min`.
    fn next_range(&mut self, min: f64, max: f64) -> f64 {
        min + self.next_f64() * (max - min)
    }

    /// Returns a uniformly distributed index in [0, len).
    ///
    /// `len` must be non-zero.
    fn next_index(&mut self, len: usize) -> usize {
        debug_assert!(len > 0, "next_index called with an empty range");
        ((self.next_f64() * len as f64) as usize).min(len.saturating_sub(1))
    }
}

impl<R: RandomSource + ?Sized> RandomSource for &mut R {
    fn next_f64(&mut self) -> f64 {
        (**self).next_f64()
    }
}

/// Xorshift64 deterministic PRNG with shifts (13, 7, 17).
///
/// A seed of 0 is replaced with a fixed non-zero value, since zero is a fixed
/// point of the algorithm.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Xorshift64 {
    state: u64,
}

impl Xorshift64 {
    const FALLBACK_SEED: u64 = 0x5EED_DEAD_BEEF_CAFE;

    pub fn new(seed: u64) -> Self {
        Self {
            state: if seed == 0 { Self::FALLBACK_SEED } else { seed },
        }
    }

    /// Advances the state and returns the next 64-bit value.
    pub fn next_u64(&mut self) -> u64 {
        self.state ^= self.state << 13;
        self.state ^= self.state >> 7;
        self.state ^= self.state << 17;
        self.state
    }
}

impl RandomSource for Xorshift64 {
    /// Upper 53 bits of [`next_u64`](Xorshift64::next_u64) over 2^53.
    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }
}
