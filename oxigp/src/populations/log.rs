use crate::populations::Individual;

use serde::{Deserialize, Serialize};

use std::fmt;
use std::time::Duration;

/// A struct for reporting basic statistical data.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Stats {
    pub maximum: f64,
    pub minimum: f64,
    pub mean: f64,
    pub median: f64,
}

impl Stats {
    /// Returns statistics about numbers in a sequence.
    ///
    /// # Panics
    /// Panics if the sequence is empty.
    ///
    /// # Examples
    /// ```
    /// use oxigp::Stats;
    ///
    /// let stats = Stats::from([-2.0, -1.0, 0.5, 1.0, 1.5].iter().copied());
    /// assert_eq!(stats.maximum, 1.5);
    /// assert_eq!(stats.minimum, -2.0);
    /// assert_eq!(stats.mean, 0.0);
    /// assert_eq!(stats.median, 0.5);
    /// ```
    pub fn from(data: impl Iterator<Item = f64>) -> Stats {
        let mut data: Vec<f64> = data.collect();
        let mid = data.len() / 2;
        let (mut max, mut min, mut sum) = (f64::MIN, f64::MAX, 0.0);
        for d in &data {
            max = d.max(max);
            min = d.min(min);
            sum += d;
        }
        let mean = sum / data.len() as f64;
        let mut median = *data.select_nth_unstable_by(mid, |a, b| a.total_cmp(b)).1;
        if data.len() % 2 == 0 {
            median = (median
                + *data
                    .select_nth_unstable_by(mid - 1, |a, b| a.total_cmp(b))
                    .1)
                / 2.0;
        }
        Stats {
            maximum: max,
            minimum: min,
            mean,
            median,
        }
    }
}

/// A snapshot of one generation, recorded after that
/// generation's offspring replaced the population.
/// Immutable once appended to the run's log.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GenerationLog {
    /// Generation index, starting at 0.
    pub generation: usize,
    /// Wall-clock duration of the generation. Reporting only;
    /// never used for control decisions.
    pub duration: Duration,
    /// Fitness of every individual, in population order.
    pub fitness: Vec<f64>,
    /// Tree size of every individual, in population order.
    pub sizes: Vec<usize>,
    /// Summary of `fitness`.
    pub fitness_stats: Stats,
    /// Summary of `sizes`.
    pub size_stats: Stats,
    /// Deep copy of the best individual observed so far
    /// (taken from the hall of fame, not the live population).
    pub best: Individual,
    /// Prefix-form rendering of `best`'s tree.
    pub best_formula: String,
}

impl fmt::Display for GenerationLog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "GenerationLog {{\n\
            \tgeneration: {:?}\n\
            \tduration: {:?}\n\
            \tfitness: {:?}\n\
            \tsize: {:?}\n\
            \tbest_fitness: {:?}\n\
            \tbest: {}\n\
            }}",
            &self.generation,
            &self.duration,
            &self.fitness_stats,
            &self.size_stats,
            &self.best.fitness(),
            &self.best_formula,
        )
    }
}
