use getset::CopyGetters;

use crate::errs::SkipSetError;

/// The default continuation probability. Level `n` holds roughly half of the
/// nodes of level `n - 1`.
pub const DEFAULT_PROBABILITY: f64 = 0.5;

/// The default number of levels, enough for a few thousand elements before
/// the top level stops thinning out the search.
pub const DEFAULT_MAX_LEVELS: usize = 12;

/// Construction parameters for a [`LeveledOrderedSet`].
///
/// [`LeveledOrderedSet`]: crate::skiplist::LeveledOrderedSet
#[derive(Debug, Clone, Copy, PartialEq, CopyGetters)]
#[getset(get_copy = "pub")]
pub struct Config {
    /// Probability that a node present in level `n` is also in level `n + 1`.
    p: f64,
    /// Upper bound on the number of levels any node participates in.
    max_levels: usize,
    /// Fixed seed for level sampling, entropy-seeded when absent.
    seed: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            p: DEFAULT_PROBABILITY,
            max_levels: DEFAULT_MAX_LEVELS,
            seed: None,
        }
    }
}

impl Config {
    pub fn new(p: f64, max_levels: usize) -> Self {
        Config {
            p,
            max_levels,
            seed: None,
        }
    }

    pub fn with_probability(mut self, p: f64) -> Self {
        self.p = p;
        self
    }

    pub fn with_max_levels(mut self, max_levels: usize) -> Self {
        self.max_levels = max_levels;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Check the parameters without clamping anything.
    pub fn validate(&self) -> Result<(), SkipSetError> {
        // written so NaN fails too
        if !(self.p > 0.0 && self.p <= 1.0) {
            return Err(SkipSetError::InvalidProbability(self.p));
        }
        if self.max_levels == 0 {
            return Err(SkipSetError::InvalidMaxLevels);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        let config = Config::default();
        assert_eq!(config.p(), DEFAULT_PROBABILITY);
        assert_eq!(config.max_levels(), DEFAULT_MAX_LEVELS);
        assert_eq!(config.seed(), None);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_probability_bounds() {
        assert_eq!(
            Config::new(0.0, 4).validate(),
            Err(SkipSetError::InvalidProbability(0.0))
        );
        assert_eq!(
            Config::new(-0.25, 4).validate(),
            Err(SkipSetError::InvalidProbability(-0.25))
        );
        assert_eq!(
            Config::new(1.5, 4).validate(),
            Err(SkipSetError::InvalidProbability(1.5))
        );
        assert!(matches!(
            Config::new(f64::NAN, 4).validate(),
            Err(SkipSetError::InvalidProbability(_))
        ));
        assert!(Config::new(1.0, 4).validate().is_ok());
    }

    #[test]
    fn test_zero_levels() {
        assert_eq!(
            Config::default().with_max_levels(0).validate(),
            Err(SkipSetError::InvalidMaxLevels)
        );
    }

    #[test]
    fn test_builder() {
        let config = Config::default()
            .with_probability(0.25)
            .with_max_levels(16)
            .with_seed(7);
        assert_eq!(config.p(), 0.25);
        assert_eq!(config.max_levels(), 16);
        assert_eq!(config.seed(), Some(7));
    }
}
