//! A Population is a collection of candidate expression
//! trees. It is evolved against a regression dataset with
//! tournament selection, subtree crossover and subtree
//! mutation, under pure generational replacement; the best
//! individual ever seen survives in a hall of fame.
mod config;
mod errors;
mod hall_of_fame;
mod log;

use crate::evaluation::{self, Dataset, EvaluationError};
use crate::operators::{crossover, mutate, tournament_select, HeightLimit};
use crate::trees::{ExpressionTree, PrimitiveSet, TreeFactory};
pub use config::EvolutionConfig;
pub use errors::ConfigError;
pub use hall_of_fame::HallOfFame;
pub use log::{GenerationLog, Stats};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use std::time::Instant;

/// A candidate solution: an expression tree paired with its
/// fitness, if currently known.
///
/// Fitness is unset on freshly generated trees, cleared by
/// any structural change (crossover or mutation), and only
/// ever repopulated by evaluation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Individual {
    tree: ExpressionTree,
    fitness: Option<f64>,
}

impl Individual {
    /// Returns an unevaluated individual over the given tree.
    pub fn new(tree: ExpressionTree) -> Individual {
        Individual {
            tree,
            fitness: None,
        }
    }

    /// Returns the individual's tree.
    pub fn tree(&self) -> &ExpressionTree {
        &self.tree
    }

    pub(crate) fn tree_mut(&mut self) -> &mut ExpressionTree {
        &mut self.tree
    }

    /// Returns the individual's fitness, if evaluated.
    pub fn fitness(&self) -> Option<f64> {
        self.fitness
    }

    /// Sets the individual's fitness value.
    pub fn set_fitness(&mut self, fitness: f64) {
        self.fitness = Some(fitness);
    }

    /// Clears the fitness. Called after any structural change,
    /// so stale scores never leak into selection or archiving.
    pub fn invalidate_fitness(&mut self) {
        self.fitness = None;
    }

    /// Returns the tree's node count.
    pub fn size(&self) -> usize {
        self.tree.size()
    }

    /// Returns the tree's height in edges.
    pub fn height(&self) -> usize {
        self.tree.height()
    }
}

/// A population of candidate expressions, together with
/// everything needed to evolve it: the primitive set, the
/// evolution configuration, the hall of fame, the per-run
/// generation logs and a single seedable random source.
///
/// # Examples
/// ```
/// use oxigp::{
///     Dataset, EphemeralConstant, EvolutionConfig, FitnessMetric, Population, PrimitiveSet,
/// };
/// use std::num::NonZeroUsize;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let mut pset = PrimitiveSet::new(["x"]);
/// pset.add_primitive("add", 2, |args: &[f64]| args[0] + args[1])?;
/// pset.add_primitive("mul", 2, |args: &[f64]| args[0] * args[1])?;
/// pset.set_constants(EphemeralConstant { low: -1.0, high: 1.0, precision: 4 });
///
/// let config = EvolutionConfig {
///     population_size: NonZeroUsize::new(50).unwrap(),
///     generations: NonZeroUsize::new(5).unwrap(),
///     crossover_chance: 0.9,
///     mutation_chance: 0.2,
///     max_height: NonZeroUsize::new(8).unwrap(),
///     tournament_size: NonZeroUsize::new(3).unwrap(),
///     metric: FitnessMetric::MeanSquaredError,
///     initial_depth: (1, 2),
///     mutation_depth: (0, 2),
///     seed: Some(42),
///     ..EvolutionConfig::zero()
/// };
///
/// let data = Dataset::new(
///     (0..10).map(|x| (vec![x as f64], 2.0 * x as f64 + 1.0)).collect(),
/// );
///
/// let mut population = Population::new(config, pset)?;
/// population.run(&data)?;
///
/// assert_eq!(population.logs().len(), 5);
/// assert!(population.champion().is_some());
/// # Ok(())
/// # }
/// ```
pub struct Population {
    individuals: Vec<Individual>,
    hall_of_fame: HallOfFame,
    logs: Vec<GenerationLog>,
    generation: usize,
    config: EvolutionConfig,
    pset: PrimitiveSet,
    rng: StdRng,
}

impl Population {
    /// Creates a population of `population_size` individuals,
    /// freshly built with ramped half-and-half generation over
    /// the configured `initial_depth` range, all unevaluated.
    ///
    /// # Errors
    /// Fails fast on an invalid configuration or a primitive
    /// set that cannot produce trees.
    pub fn new(config: EvolutionConfig, pset: PrimitiveSet) -> Result<Population, ConfigError> {
        config.validate()?;
        pset.validate()?;
        let mut rng = seed_rng(config.seed);
        let individuals = seed_individuals(&config, &pset, &mut rng);
        Ok(Population {
            individuals,
            hall_of_fame: HallOfFame::new(config.hall_of_fame_size.get()),
            logs: vec![],
            generation: 0,
            config,
            pset,
            rng,
        })
    }

    /// Runs the full generational loop: exactly `generations`
    /// iterations, each of which evaluates every unscored
    /// individual, updates the hall of fame, records the
    /// generation's statistics, and produces the next
    /// generation by tournament selection, adjacent-pair
    /// crossover and per-individual mutation (both height
    /// guarded), replacing the population wholesale.
    ///
    /// The final population is the last offspring generation
    /// and is therefore unevaluated; the best solution is the
    /// hall of fame's, exposed via [`Population::champion`].
    ///
    /// # Errors
    /// Fails if the dataset is empty or its row widths do not
    /// match the primitive set's variable count.
    pub fn run(&mut self, data: &Dataset) -> Result<(), Box<dyn std::error::Error>> {
        for _ in 0..self.config.generations.get() {
            let start = Instant::now();
            let generation = self.generation;

            self.evaluate_fitness(data)?;
            self.hall_of_fame.update(&self.individuals, &self.pset);

            let fitness: Vec<f64> = self
                .individuals
                .iter()
                .map(|individual| individual.fitness().unwrap_or(f64::INFINITY))
                .collect();
            let sizes: Vec<usize> = self.individuals.iter().map(Individual::size).collect();

            self.evolve();

            let best = self
                .hall_of_fame
                .best()
                .expect("hall of fame is empty after a scored update")
                .clone();
            self.logs.push(GenerationLog {
                generation,
                duration: start.elapsed(),
                fitness_stats: Stats::from(fitness.iter().copied()),
                size_stats: Stats::from(sizes.iter().map(|size| *size as f64)),
                fitness,
                sizes,
                best_formula: best.tree().formula(&self.pset),
                best,
            });
        }
        Ok(())
    }

    /// Evaluates every individual whose fitness is unset,
    /// in parallel. Individuals whose trees were not changed
    /// by variation keep their score; fitness is a pure
    /// function of tree and data, so results are identical
    /// to re-scoring everything.
    ///
    /// # Errors
    /// Fails if the dataset is empty or any row's width does
    /// not match the primitive set's variable count.
    pub fn evaluate_fitness(&mut self, data: &Dataset) -> Result<(), EvaluationError> {
        evaluation::validate_dataset(&self.pset, data)?;
        let pset = &self.pset;
        let metric = self.config.metric;
        self.individuals
            .par_iter_mut()
            .filter(|individual| individual.fitness().is_none())
            .for_each(|individual| {
                let fitness = evaluation::score(individual.tree(), pset, data, metric);
                individual.set_fitness(fitness);
            });
        Ok(())
    }

    /// Produces the next generation: select `population_size`
    /// individuals by tournament, deep-clone them, cross
    /// adjacent pairs with `crossover_chance`, mutate each
    /// with `mutation_chance` (both under the height limit,
    /// with silent revert), then replace the population.
    /// Fitness is cleared only on individuals a variation
    /// actually changed.
    fn evolve(&mut self) {
        let n = self.config.population_size.get();
        let selected = tournament_select(
            &self.individuals,
            n,
            self.config.tournament_size.get(),
            &mut self.rng,
        );
        let mut offspring: Vec<Individual> = selected.into_iter().cloned().collect();

        let limit = HeightLimit::new(self.config.max_height.get());
        let (mutation_min, mutation_max) = self.config.mutation_depth;

        // Crossover over adjacent pairs (0,1), (2,3), ...
        for pair in (1..n).step_by(2) {
            if self.rng.gen::<f64>() < self.config.crossover_chance {
                let (head, tail) = offspring.split_at_mut(pair);
                let first = &mut head[pair - 1];
                let second = &mut tail[0];
                let rng = &mut self.rng;
                let applied = limit.apply(&mut [first.tree_mut(), second.tree_mut()], |trees| {
                    let (a, b) = trees.split_at_mut(1);
                    crossover(&mut *a[0], &mut *b[0], rng);
                });
                if applied {
                    first.invalidate_fitness();
                    second.invalidate_fitness();
                }
            }
        }

        for individual in &mut offspring {
            if self.rng.gen::<f64>() < self.config.mutation_chance {
                let pset = &self.pset;
                let rng = &mut self.rng;
                let applied = limit.apply(&mut [individual.tree_mut()], |trees| {
                    mutate(&mut *trees[0], pset, mutation_min, mutation_max, rng);
                });
                if applied {
                    individual.invalidate_fitness();
                }
            }
        }

        self.individuals = offspring;
        self.generation += 1;
    }

    /// Resets the population to a fresh initial state with the
    /// same configuration and primitive set, clearing the hall
    /// of fame and the logs.
    pub fn reset(&mut self) {
        let mut rng = seed_rng(self.config.seed);
        self.individuals = seed_individuals(&self.config, &self.pset, &mut rng);
        self.hall_of_fame = HallOfFame::new(self.config.hall_of_fame_size.get());
        self.logs.clear();
        self.generation = 0;
        self.rng = rng;
    }

    /// Returns the best individual ever observed, if any
    /// generation has been evaluated yet.
    pub fn champion(&self) -> Option<&Individual> {
        self.hall_of_fame.best()
    }

    /// Returns the current individuals, in population order.
    pub fn individuals(&self) -> &[Individual] {
        &self.individuals
    }

    /// Returns the hall of fame.
    pub fn hall_of_fame(&self) -> &HallOfFame {
        &self.hall_of_fame
    }

    /// Returns one record per completed generation, in order.
    pub fn logs(&self) -> &[GenerationLog] {
        &self.logs
    }

    /// Returns the current generation number.
    pub fn generation(&self) -> usize {
        self.generation
    }

    /// Returns the primitive set the population draws from.
    pub fn primitive_set(&self) -> &PrimitiveSet {
        &self.pset
    }
}

fn seed_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}

fn seed_individuals(
    config: &EvolutionConfig,
    pset: &PrimitiveSet,
    rng: &mut StdRng,
) -> Vec<Individual> {
    let (min_depth, max_depth) = config.initial_depth;
    let factory = TreeFactory::new(pset, min_depth, max_depth);
    (0..config.population_size.get())
        .map(|_| Individual::new(factory.half_and_half(rng)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evaluation::FitnessMetric;
    use crate::trees::{EphemeralConstant, PrimitiveSetError};

    use std::num::NonZeroUsize;

    fn arithmetic_set() -> PrimitiveSet {
        let mut pset = PrimitiveSet::new(["x"]);
        pset.add_primitive("add", 2, |args: &[f64]| args[0] + args[1])
            .unwrap();
        pset.add_primitive("sub", 2, |args: &[f64]| args[0] - args[1])
            .unwrap();
        pset.add_primitive("mul", 2, |args: &[f64]| args[0] * args[1])
            .unwrap();
        pset.add_primitive("div", 2, |args: &[f64]| {
            if args[1].abs() < 1e-6 {
                1.0
            } else {
                args[0] / args[1]
            }
        })
        .unwrap();
        pset.set_constants(EphemeralConstant {
            low: -1.0,
            high: 1.0,
            precision: 4,
        });
        pset
    }

    fn test_config() -> EvolutionConfig {
        EvolutionConfig {
            population_size: NonZeroUsize::new(30).unwrap(),
            generations: NonZeroUsize::new(8).unwrap(),
            crossover_chance: 0.9,
            mutation_chance: 0.2,
            max_height: NonZeroUsize::new(6).unwrap(),
            tournament_size: NonZeroUsize::new(3).unwrap(),
            metric: FitnessMetric::MeanSquaredError,
            initial_depth: (1, 2),
            mutation_depth: (0, 2),
            seed: Some(42),
            ..EvolutionConfig::zero()
        }
    }

    fn line_data() -> Dataset {
        Dataset::new(
            (-5..=5)
                .map(|x| (vec![x as f64], 2.0 * x as f64 + 1.0))
                .collect(),
        )
    }

    #[test]
    fn construction_rejects_bad_configurations() {
        let config = EvolutionConfig {
            crossover_chance: 1.5,
            ..test_config()
        };
        assert!(matches!(
            Population::new(config, arithmetic_set()),
            Err(ConfigError::ProbabilityOutOfRange("crossover_chance", _))
        ));

        let bare = PrimitiveSet::new(["x"]);
        assert!(matches!(
            Population::new(test_config(), bare),
            Err(ConfigError::Primitives(PrimitiveSetError::NoPrimitives))
        ));
    }

    #[test]
    fn population_size_is_invariant_across_generations() {
        let mut population = Population::new(test_config(), arithmetic_set()).unwrap();
        population.run(&line_data()).unwrap();

        assert_eq!(population.individuals().len(), 30);
        assert_eq!(population.logs().len(), 8);
        for log in population.logs() {
            assert_eq!(log.fitness.len(), 30);
            assert_eq!(log.sizes.len(), 30);
        }
        assert_eq!(population.generation(), 8);
    }

    #[test]
    fn height_bound_holds_for_every_individual() {
        let mut population = Population::new(test_config(), arithmetic_set()).unwrap();
        population.run(&line_data()).unwrap();

        for individual in population.individuals() {
            assert!(individual.height() <= 6);
        }
        for log in population.logs() {
            assert!(log.best.height() <= 6);
        }
    }

    #[test]
    fn archive_best_never_regresses() {
        let mut population = Population::new(test_config(), arithmetic_set()).unwrap();
        population.run(&line_data()).unwrap();

        let bests: Vec<f64> = population
            .logs()
            .iter()
            .map(|log| log.best.fitness().unwrap())
            .collect();
        for pair in bests.windows(2) {
            assert!(pair[1] <= pair[0]);
        }
    }

    #[test]
    fn runs_are_deterministic_under_a_fixed_seed() {
        let mut first = Population::new(test_config(), arithmetic_set()).unwrap();
        let mut second = Population::new(test_config(), arithmetic_set()).unwrap();
        first.run(&line_data()).unwrap();
        second.run(&line_data()).unwrap();

        for (a, b) in first.logs().iter().zip(second.logs()) {
            assert_eq!(a.fitness, b.fitness);
            assert_eq!(a.sizes, b.sizes);
            assert_eq!(a.best_formula, b.best_formula);
        }
        assert_eq!(first.individuals(), second.individuals());
    }

    #[test]
    fn search_improves_on_a_linear_target() {
        let config = EvolutionConfig {
            population_size: NonZeroUsize::new(80).unwrap(),
            generations: NonZeroUsize::new(15).unwrap(),
            ..test_config()
        };
        let mut population = Population::new(config, arithmetic_set()).unwrap();
        population.run(&line_data()).unwrap();

        let logs = population.logs();
        let first_best = logs.first().and_then(|log| log.best.fitness()).unwrap();
        let final_best = logs.last().and_then(|log| log.best.fitness()).unwrap();
        assert!(final_best.is_finite());
        assert!(final_best <= first_best);

        let champion = population.champion().unwrap();
        assert_eq!(champion.fitness(), Some(final_best));
    }

    #[test]
    fn empty_dataset_fails_the_run() {
        let mut population = Population::new(test_config(), arithmetic_set()).unwrap();
        let error = population.run(&Dataset::new(vec![])).unwrap_err();
        assert_eq!(error.to_string(), "evaluation dataset has no rows");
    }

    #[test]
    fn mismatched_row_width_fails_evaluation() {
        let mut population = Population::new(test_config(), arithmetic_set()).unwrap();
        let data = Dataset::new(vec![(vec![1.0, 2.0], 3.0)]);
        assert_eq!(
            population.evaluate_fitness(&data),
            Err(EvaluationError::RowWidthMismatch {
                row: 0,
                expected: 1,
                found: 2,
            })
        );
    }

    #[test]
    fn reset_restores_a_fresh_state() {
        let mut population = Population::new(test_config(), arithmetic_set()).unwrap();
        population.run(&line_data()).unwrap();
        population.reset();

        assert_eq!(population.generation(), 0);
        assert!(population.logs().is_empty());
        assert!(population.hall_of_fame().is_empty());
        assert_eq!(population.individuals().len(), 30);
        assert!(population
            .individuals()
            .iter()
            .all(|individual| individual.fitness().is_none()));
    }

    #[test]
    fn champion_serde_round_trip() {
        let mut population = Population::new(test_config(), arithmetic_set()).unwrap();
        population.run(&line_data()).unwrap();

        let champion = population.champion().unwrap();
        let json = serde_json::to_string(champion).unwrap();
        let back: Individual = serde_json::from_str(&json).unwrap();
        assert_eq!(&back, champion);
    }
}
