use rand::{
    rngs::SmallRng,
    Rng,
    SeedableRng,
};
use tracing::trace;

use crate::{
    config::{
        DEFAULT_MAX_LEVELS,
        DEFAULT_PROBABILITY,
    },
    errs::SkipSetError,
};

/// Upon the insertion of a new node in the list, the node is replicated to high
/// levels with a certain probability as determined by a `LevelGenerator`.
pub trait LevelGenerator {
    /// The total number of levels that are assumed to exist for this level
    /// generator.
    fn total(&self) -> usize;
    /// Generate the number of levels a new node participates in, in the range
    /// `[1, total]`.
    ///
    /// This must never return `0` or anything `> self.total()`.
    fn random(&mut self) -> usize;
    /// Reset the random source so future levels are reproducible.
    fn reseed(&mut self, seed: u64);
}

/// A level generator which will produce geometrically distributed numbers.
///
/// The probability of a node reaching level `n` is `p` times the probability
/// of it reaching level `n-1`, with the probability truncated at the maximum
/// number of levels allowed.
#[derive(Debug, Clone)]
pub struct GeometricalLevelGenerator {
    total: usize,
    p: f64,
    rng: SmallRng, // Fast generator
}

impl Default for GeometricalLevelGenerator {
    fn default() -> Self {
        GeometricalLevelGenerator {
            total: DEFAULT_MAX_LEVELS,
            p: DEFAULT_PROBABILITY,
            rng: SmallRng::from_entropy(),
        }
    }
}

impl GeometricalLevelGenerator {
    /// Create a new GeometricalLevelGenerator with `total` number of levels,
    /// and `p` as the probability that a given node is present in the next
    /// level. `p == 1` is allowed and puts every node in every level.
    pub fn new(total: usize, p: f64) -> Result<Self, SkipSetError> {
        Self::with_rng(total, p, SmallRng::from_entropy())
    }

    /// Same as [`GeometricalLevelGenerator::new`] with a deterministic seed.
    pub fn seeded(total: usize, p: f64, seed: u64) -> Result<Self, SkipSetError> {
        Self::with_rng(total, p, SmallRng::seed_from_u64(seed))
    }

    fn with_rng(total: usize, p: f64, rng: SmallRng) -> Result<Self, SkipSetError> {
        if total == 0 {
            return Err(SkipSetError::InvalidMaxLevels);
        }
        if !(p > 0.0 && p <= 1.0) {
            return Err(SkipSetError::InvalidProbability(p));
        }
        Ok(GeometricalLevelGenerator { total, p, rng })
    }

    pub fn p(&self) -> f64 {
        self.p
    }
}

impl LevelGenerator for GeometricalLevelGenerator {
    fn random(&mut self) -> usize {
        let mut h = 1;
        while h < self.total && self.rng.gen_bool(self.p) {
            h += 1;
        }
        trace!(levels = h, "sampled node height");
        h
    }

    fn total(&self) -> usize {
        self.total
    }

    fn reseed(&mut self, seed: u64) {
        self.rng = SmallRng::seed_from_u64(seed);
    }
}

#[cfg(test)]
mod tests {
    use super::{
        GeometricalLevelGenerator,
        LevelGenerator,
    };
    use crate::errs::SkipSetError;

    #[test]
    fn invalid_total() {
        assert_eq!(
            GeometricalLevelGenerator::new(0, 0.5).unwrap_err(),
            SkipSetError::InvalidMaxLevels
        );
    }

    #[test]
    fn invalid_p_0() {
        assert_eq!(
            GeometricalLevelGenerator::new(1, 0.0).unwrap_err(),
            SkipSetError::InvalidProbability(0.0)
        );
    }

    #[test]
    fn invalid_p_above_1() {
        assert!(GeometricalLevelGenerator::new(1, 1.01).is_err());
    }

    #[test]
    fn new() {
        let generator = GeometricalLevelGenerator::new(1, 0.5).unwrap();
        assert_eq!(generator.total(), 1);
    }

    #[test]
    fn single_level_always_one() {
        let mut generator = GeometricalLevelGenerator::seeded(1, 0.9, 3).unwrap();
        for _ in 0..1_000 {
            assert_eq!(generator.random(), 1);
        }
    }

    #[test]
    fn p_one_saturates() {
        let mut generator = GeometricalLevelGenerator::seeded(7, 1.0, 3).unwrap();
        for _ in 0..100 {
            assert_eq!(generator.random(), 7);
        }
    }

    #[test]
    fn within_bounds() {
        let mut generator = GeometricalLevelGenerator::seeded(4, 0.75, 11).unwrap();
        let mut seen_max = false;
        for _ in 0..10_000 {
            let h = generator.random();
            assert!((1..=4).contains(&h));
            seen_max |= h == 4;
        }
        assert!(seen_max, "clamp must still reach the top level");
    }

    #[test]
    fn roughly_geometric() {
        let mut generator = GeometricalLevelGenerator::seeded(32, 0.5, 42).unwrap();
        let samples = 100_000;
        let ones = (0..samples).filter(|_| generator.random() == 1).count();
        // half of all nodes should stay on level 0
        let ratio = ones as f64 / samples as f64;
        assert!((0.45..0.55).contains(&ratio), "ratio was {ratio}");
    }

    #[test]
    fn reseed_is_deterministic() {
        let mut a = GeometricalLevelGenerator::new(16, 0.5).unwrap();
        let mut b = GeometricalLevelGenerator::new(16, 0.5).unwrap();
        a.reseed(99);
        b.reseed(99);
        let xs: Vec<usize> = (0..256).map(|_| a.random()).collect();
        let ys: Vec<usize> = (0..256).map(|_| b.random()).collect();
        assert_eq!(xs, ys);
    }
}
