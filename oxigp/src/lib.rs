//! A genetic-programming engine for symbolic regression over
//! expression trees.
//!
//! Candidate solutions are arithmetic expression trees built
//! from a user-defined [`PrimitiveSet`] of operators, input
//! variables and ephemeral constants. A [`Population`] of such
//! trees is evolved against a regression [`Dataset`] with
//! tournament selection, one-point subtree crossover and
//! subtree-replacement mutation, both kept under a static
//! height limit. Replacement is purely generational; the best
//! expressions ever found survive in a hall of fame, and every
//! generation is recorded in a [`GenerationLog`].
//!
//! Runs are reproducible: seed the configuration and two runs
//! over the same dataset produce identical populations, logs
//! and champions.
//!
//! # Example usage: recovering y = x² + x from samples
//! ```
//! use oxigp::{
//!     Dataset, EphemeralConstant, EvolutionConfig, FitnessMetric, Population, PrimitiveSet,
//! };
//! use std::num::NonZeroUsize;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut pset = PrimitiveSet::new(["x"]);
//!     pset.add_primitive("add", 2, |args: &[f64]| args[0] + args[1])?;
//!     pset.add_primitive("sub", 2, |args: &[f64]| args[0] - args[1])?;
//!     pset.add_primitive("mul", 2, |args: &[f64]| args[0] * args[1])?;
//!     pset.set_constants(EphemeralConstant {
//!         low: -1.0,
//!         high: 1.0,
//!         precision: 4,
//!     });
//!
//!     let config = EvolutionConfig {
//!         population_size: NonZeroUsize::new(100).unwrap(),
//!         generations: NonZeroUsize::new(10).unwrap(),
//!         crossover_chance: 0.9,
//!         mutation_chance: 0.2,
//!         max_height: NonZeroUsize::new(8).unwrap(),
//!         tournament_size: NonZeroUsize::new(3).unwrap(),
//!         metric: FitnessMetric::MeanSquaredError,
//!         initial_depth: (1, 2),
//!         mutation_depth: (0, 2),
//!         seed: Some(42),
//!         ..EvolutionConfig::zero()
//!     };
//!
//!     let data = Dataset::new(
//!         (-10..=10)
//!             .map(|x| {
//!                 let x = x as f64 / 2.0;
//!                 (vec![x], x * x + x)
//!             })
//!             .collect(),
//!     );
//!
//!     let mut population = Population::new(config, pset)?;
//!     population.run(&data)?;
//!
//!     let champion = population.champion().unwrap();
//!     println!(
//!         "{} (fitness {:?})",
//!         champion.tree().formula(population.primitive_set()),
//!         champion.fitness(),
//!     );
//!     Ok(())
//! }
//! ```

mod evaluation;
mod operators;
mod populations;
mod trees;

pub use evaluation::*;
pub use operators::*;
pub use populations::*;
pub use trees::*;
