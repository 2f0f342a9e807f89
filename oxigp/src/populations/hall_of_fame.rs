use crate::populations::Individual;
use crate::trees::PrimitiveSet;

use ahash::AHashSet;

/// Best-ever archive of individuals, ordered best (lowest
/// fitness) first.
///
/// The archive survives generational replacement: it holds
/// deep copies, independent of the live population, so later
/// variation of population members cannot corrupt it. The best
/// recorded fitness never regresses across updates. Members
/// are deduplicated by their rendered formula, so the archive
/// never stores two structurally identical expressions.
#[derive(Clone, Debug)]
pub struct HallOfFame {
    capacity: usize,
    members: Vec<Individual>,
    signatures: AHashSet<String>,
}

impl HallOfFame {
    /// Returns an empty archive holding at most `capacity`
    /// individuals.
    pub fn new(capacity: usize) -> HallOfFame {
        HallOfFame {
            capacity,
            members: Vec::with_capacity(capacity),
            signatures: AHashSet::new(),
        }
    }

    /// Scans the individuals and retains the best ever seen.
    /// Individuals with unset fitness are ignored.
    pub fn update(&mut self, individuals: &[Individual], pset: &PrimitiveSet) {
        for individual in individuals {
            let fitness = match individual.fitness() {
                Some(fitness) => fitness,
                None => continue,
            };
            if self.members.len() == self.capacity {
                if let Some(worst) = self.members.last() {
                    if fitness >= recorded(worst) {
                        continue;
                    }
                }
            }
            let signature = individual.tree().formula(pset);
            if self.signatures.contains(&signature) {
                continue;
            }
            let at = self.members.partition_point(|member| recorded(member) <= fitness);
            self.members.insert(at, individual.clone());
            self.signatures.insert(signature);
            if self.members.len() > self.capacity {
                if let Some(removed) = self.members.pop() {
                    self.signatures.remove(&removed.tree().formula(pset));
                }
            }
        }
    }

    /// Returns the best individual ever recorded.
    pub fn best(&self) -> Option<&Individual> {
        self.members.first()
    }

    /// Iterates over the archive, best first.
    pub fn iter(&self) -> impl Iterator<Item = &Individual> {
        self.members.iter()
    }

    /// Returns the number of archived individuals.
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Returns whether the archive is empty.
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

fn recorded(member: &Individual) -> f64 {
    // Members are only ever inserted with fitness set.
    member.fitness().unwrap_or(f64::INFINITY)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trees::{ExpressionTree, Node};

    fn pset() -> PrimitiveSet {
        let mut pset = PrimitiveSet::new(["x"]);
        pset.add_primitive("add", 2, |args: &[f64]| args[0] + args[1])
            .unwrap();
        pset
    }

    fn constant_individual(value: f64, fitness: f64) -> Individual {
        let mut individual = Individual::new(ExpressionTree::new(Node::Constant(value)));
        individual.set_fitness(fitness);
        individual
    }

    #[test]
    fn keeps_the_best_and_respects_capacity() {
        let pset = pset();
        let mut archive = HallOfFame::new(2);
        archive.update(
            &[
                constant_individual(1.0, 5.0),
                constant_individual(2.0, 1.0),
                constant_individual(3.0, 3.0),
            ],
            &pset,
        );
        assert_eq!(archive.len(), 2);
        let fitnesses: Vec<Option<f64>> = archive.iter().map(Individual::fitness).collect();
        assert_eq!(fitnesses, vec![Some(1.0), Some(3.0)]);
    }

    #[test]
    fn best_fitness_is_monotonic_across_updates() {
        let pset = pset();
        let mut archive = HallOfFame::new(1);
        archive.update(&[constant_individual(1.0, 4.0)], &pset);
        assert_eq!(archive.best().and_then(Individual::fitness), Some(4.0));

        // A worse generation never displaces the recorded best.
        archive.update(&[constant_individual(2.0, 9.0)], &pset);
        assert_eq!(archive.best().and_then(Individual::fitness), Some(4.0));

        archive.update(&[constant_individual(3.0, 2.0)], &pset);
        assert_eq!(archive.best().and_then(Individual::fitness), Some(2.0));
    }

    #[test]
    fn stores_deep_copies_independent_of_the_population() {
        let pset = pset();
        let mut population = vec![constant_individual(1.0, 4.0)];
        let mut archive = HallOfFame::new(1);
        archive.update(&population, &pset);

        // Mutating the live population must not touch the archive.
        *population[0].tree_mut() = ExpressionTree::new(Node::Constant(99.0));
        population[0].invalidate_fitness();

        let best = archive.best().unwrap();
        assert_eq!(best.tree(), &ExpressionTree::new(Node::Constant(1.0)));
        assert_eq!(best.fitness(), Some(4.0));
    }

    #[test]
    fn duplicate_formulas_are_archived_once() {
        let pset = pset();
        let mut archive = HallOfFame::new(5);
        archive.update(
            &[constant_individual(1.0, 2.0), constant_individual(1.0, 2.0)],
            &pset,
        );
        assert_eq!(archive.len(), 1);
    }

    #[test]
    fn unscored_individuals_are_ignored() {
        let pset = pset();
        let mut archive = HallOfFame::new(1);
        archive.update(
            &[Individual::new(ExpressionTree::new(Node::Constant(1.0)))],
            &pset,
        );
        assert!(archive.is_empty());
    }
}
