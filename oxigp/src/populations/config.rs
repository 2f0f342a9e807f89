use crate::evaluation::FitnessMetric;
use crate::populations::errors::ConfigError;

use serde::{Deserialize, Serialize};

use std::num::NonZeroUsize;

/// Configuration data for population generation
/// and evolution.
///
/// # Note
/// All quantities expressing probabilities
/// must be in the range [0.0, 1.0]; this is
/// checked when the configuration is handed to
/// [`Population::new`](crate::Population::new).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EvolutionConfig {
    /// Size of the population, constant across generations.
    pub population_size: NonZeroUsize,
    /// Number of generations the loop runs for; there is no
    /// early-stopping condition.
    pub generations: NonZeroUsize,
    /// Chance that each adjacent offspring pair is crossed over.
    pub crossover_chance: f64,
    /// Chance that each offspring is mutated.
    pub mutation_chance: f64,
    /// Height bound enforced on every variation result.
    pub max_height: NonZeroUsize,
    /// Number of individuals sampled per selection tournament.
    pub tournament_size: NonZeroUsize,
    /// Error metric minimized by the search.
    pub metric: FitnessMetric,
    /// Ramped half-and-half depth range `(min, max)` for the
    /// initial population.
    pub initial_depth: (usize, usize),
    /// Grow depth range `(min, max)` for mutation replacement
    /// subtrees.
    pub mutation_depth: (usize, usize),
    /// Capacity of the hall of fame.
    pub hall_of_fame_size: NonZeroUsize,
    /// Seed for the engine's random source. `None` seeds from
    /// entropy; a fixed value makes runs reproducible.
    pub seed: Option<u64>,
}

impl EvolutionConfig {
    /// Returns a "zero-valued" default configuration.
    /// All values are 0, `None`, or in the case of
    /// `NonZeroUsize`s, 1.
    ///
    /// # Note
    /// This value is not suitable for use in most experiments.
    /// It is meant as a way to abbreviate configuration
    /// instantiation, or to fill in unused values.
    ///
    /// # Examples
    /// ```
    /// use oxigp::EvolutionConfig;
    /// use std::num::NonZeroUsize;
    ///
    /// let config = EvolutionConfig {
    ///     population_size: NonZeroUsize::new(100).unwrap(),
    ///     crossover_chance: 0.9,
    ///     ..EvolutionConfig::zero()
    /// };
    /// ```
    pub const fn zero() -> EvolutionConfig {
        // SAFETY: 1 is a valid NonZeroUsize. Replace this with
        // NonZeroUsize::new(1).unwrap() once const Option::unwrap
        // becomes stable.
        const ONE: NonZeroUsize = unsafe { NonZeroUsize::new_unchecked(1) };
        EvolutionConfig {
            population_size: ONE,
            generations: ONE,
            crossover_chance: 0.0,
            mutation_chance: 0.0,
            max_height: ONE,
            tournament_size: ONE,
            metric: FitnessMetric::MeanSquaredError,
            initial_depth: (0, 0),
            mutation_depth: (0, 0),
            hall_of_fame_size: ONE,
            seed: None,
        }
    }

    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        for (name, chance) in [
            ("crossover_chance", self.crossover_chance),
            ("mutation_chance", self.mutation_chance),
        ] {
            if !(0.0..=1.0).contains(&chance) {
                return Err(ConfigError::ProbabilityOutOfRange(name, chance));
            }
        }
        for (name, (min, max)) in [
            ("initial_depth", self.initial_depth),
            ("mutation_depth", self.mutation_depth),
        ] {
            if min > max {
                return Err(ConfigError::InvalidDepthRange(name, min, max));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_config_is_valid() {
        assert_eq!(EvolutionConfig::zero().validate(), Ok(()));
    }

    #[test]
    fn out_of_range_probabilities_are_rejected() {
        let config = EvolutionConfig {
            crossover_chance: 1.5,
            ..EvolutionConfig::zero()
        };
        assert_eq!(
            config.validate(),
            Err(ConfigError::ProbabilityOutOfRange("crossover_chance", 1.5))
        );

        let config = EvolutionConfig {
            mutation_chance: -0.1,
            ..EvolutionConfig::zero()
        };
        assert_eq!(
            config.validate(),
            Err(ConfigError::ProbabilityOutOfRange("mutation_chance", -0.1))
        );
    }

    #[test]
    fn inverted_depth_ranges_are_rejected() {
        let config = EvolutionConfig {
            initial_depth: (3, 1),
            ..EvolutionConfig::zero()
        };
        assert_eq!(
            config.validate(),
            Err(ConfigError::InvalidDepthRange("initial_depth", 3, 1))
        );
    }
}
