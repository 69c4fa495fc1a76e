//! xorshift64* random number generator
//!
//! A fast, high-quality PRNG suitable for simulation: 64-bit state, 64-bit
//! output, passes BigCrush. Same seed, same sequence, so runs are
//! replayable.

use serde::{Deserialize, Serialize};

/// Deterministic random number generator using xorshift64*.
///
/// # Example
/// ```
/// use market_simulator_core::SimRng;
///
/// let mut rng = SimRng::new(12345);
/// let side = rng.next_f64() < 0.5;
/// let quantity = rng.int_range(50, 200); // inclusive bounds
/// let impact = rng.uniform(-6.0, -1.0);  // half-open [min, max)
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimRng {
    /// Internal state (64-bit, never zero)
    state: u64,
}

impl SimRng {
    /// Create a new generator from a seed.
    ///
    /// A zero seed is mapped to 1: xorshift state must be non-zero.
    pub fn new(seed: u64) -> Self {
        let state = if seed == 0 { 1 } else { seed };
        Self { state }
    }

    /// Generate the next random u64, advancing the state.
    pub fn next_u64(&mut self) -> u64 {
        let mut x = self.state;
        x ^= x >> 12;
        x ^= x << 25;
        x ^= x >> 27;
        self.state = x;
        x.wrapping_mul(0x2545F4914F6CDD1D)
    }

    /// Random f64 in `[0.0, 1.0)`.
    pub fn next_f64(&mut self) -> f64 {
        let value = self.next_u64();
        // 53 mantissa bits of the raw draw, scaled into [0, 1)
        (value >> 11) as f64 * (1.0 / ((1u64 << 53) as f64))
    }

    /// Random f64 uniformly distributed in `[min, max)`.
    ///
    /// # Panics
    /// Panics if `min >= max`.
    pub fn uniform(&mut self, min: f64, max: f64) -> f64 {
        assert!(min < max, "min must be less than max");
        min + self.next_f64() * (max - min)
    }

    /// Random integer uniformly distributed in `[min, max]` (inclusive).
    ///
    /// # Panics
    /// Panics if `min > max`.
    pub fn int_range(&mut self, min: i64, max: i64) -> i64 {
        assert!(min <= max, "min must not exceed max");
        let span = (max - min) as u64 + 1;
        min + (self.next_u64() % span) as i64
    }

    /// Current generator state, for snapshotting.
    pub fn state(&self) -> u64 {
        self.state
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_seed_converted_to_nonzero() {
        let rng = SimRng::new(0);
        assert_ne!(rng.state(), 0, "zero seed should be converted to 1");
    }

    #[test]
    fn test_same_seed_same_sequence() {
        let mut a = SimRng::new(99999);
        let mut b = SimRng::new(99999);
        for _ in 0..100 {
            assert_eq!(a.next_u64(), b.next_u64());
        }
    }

    #[test]
    fn test_next_f64_in_range() {
        let mut rng = SimRng::new(12345);
        for _ in 0..1000 {
            let val = rng.next_f64();
            assert!((0.0..1.0).contains(&val), "next_f64() produced {}", val);
        }
    }

    #[test]
    fn test_uniform_bounds() {
        let mut rng = SimRng::new(7);
        for _ in 0..1000 {
            let val = rng.uniform(-6.0, -1.0);
            assert!((-6.0..-1.0).contains(&val), "uniform() produced {}", val);
        }
    }

    #[test]
    fn test_int_range_inclusive() {
        let mut rng = SimRng::new(42);
        let mut saw_min = false;
        let mut saw_max = false;
        for _ in 0..10_000 {
            let q = rng.int_range(50, 200);
            assert!((50..=200).contains(&q));
            saw_min |= q == 50;
            saw_max |= q == 200;
        }
        assert!(saw_min && saw_max, "inclusive bounds should both be reachable");
    }

    #[test]
    #[should_panic(expected = "min must be less than max")]
    fn test_uniform_invalid_bounds() {
        let mut rng = SimRng::new(12345);
        rng.uniform(3.0, -6.0);
    }
}
