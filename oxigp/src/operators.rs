//! Selection and variation operators.
//!
//! Variation operators work on trees in place; the engine
//! wraps them in a [`HeightLimit`] so that any result
//! exceeding the configured height bound is silently
//! reverted rather than surfaced as an error.
use crate::populations::Individual;
use crate::trees::{ExpressionTree, Node, PrimitiveSet, TreeFactory};

use rand::Rng;

/// Tournament selection: repeats `n` times — sample
/// `tournament_size` individuals uniformly at random, with
/// replacement, and keep the one with the strictly lowest
/// fitness (ties go to the first sampled). With
/// `tournament_size == 1` this degenerates to uniform random
/// sampling with replacement.
///
/// The returned individuals are references into `individuals`
/// and must be cloned by the caller before any variation is
/// applied to them.
///
/// # Panics
/// Panics if `individuals` is empty, `tournament_size` is 0,
/// or any sampled individual has unset fitness.
pub fn tournament_select<'a, R: Rng>(
    individuals: &'a [Individual],
    n: usize,
    tournament_size: usize,
    rng: &mut R,
) -> Vec<&'a Individual> {
    assert!(tournament_size > 0, "tournament of size 0");
    (0..n)
        .map(|_| {
            let mut winner: Option<&Individual> = None;
            for _ in 0..tournament_size {
                let contender = &individuals[rng.gen_range(0..individuals.len())];
                let beats = match winner {
                    Some(current) => scored(contender) < scored(current),
                    None => true,
                };
                if beats {
                    winner = Some(contender);
                }
            }
            winner.unwrap_or_else(|| unreachable!())
        })
        .collect()
}

fn scored(individual: &Individual) -> f64 {
    individual
        .fitness()
        .unwrap_or_else(|| panic!("selection over unevaluated individual"))
}

/// One-point subtree crossover: picks one preorder index
/// uniformly at random in each tree (the root included) and
/// swaps the subtrees rooted there.
pub fn crossover<R: Rng>(first: &mut ExpressionTree, second: &mut ExpressionTree, rng: &mut R) {
    let i = rng.gen_range(0..first.size());
    let j = rng.gen_range(0..second.size());
    let from_first = first.subtree(i).map(Node::clone);
    let from_second = second.subtree(j).map(Node::clone);
    if let (Some(a), Some(b)) = (from_first, from_second) {
        first.replace_subtree(i, b);
        second.replace_subtree(j, a);
    }
}

/// Subtree-replacement mutation: picks one preorder index
/// uniformly at random and substitutes a fresh grow-built
/// subtree over `min_depth..=max_depth` in its place.
pub fn mutate<R: Rng>(
    tree: &mut ExpressionTree,
    pset: &PrimitiveSet,
    min_depth: usize,
    max_depth: usize,
    rng: &mut R,
) {
    let index = rng.gen_range(0..tree.size());
    let replacement = TreeFactory::new(pset, min_depth, max_depth).grow(rng);
    tree.replace_subtree(index, replacement.into_root());
}

/// Height-limiting wrapper for variation operators.
///
/// Applies an operation to a set of trees, then checks every
/// result against the height bound. If any output exceeds it,
/// the entire operation is undone and the inputs are restored
/// unchanged — a silent revert, not a failure. This keeps tree
/// growth ("bloat") bounded without raising errors mid-loop.
///
/// # Examples
/// ```
/// use oxigp::{ExpressionTree, HeightLimit, Node};
///
/// let limit = HeightLimit::new(1);
/// let mut tree = ExpressionTree::new(Node::Constant(0.0));
///
/// // The operation pushes the tree over the bound, so it
/// // is reverted and `apply` reports that nothing stuck.
/// let applied = limit.apply(&mut [&mut tree], |trees| {
///     *trees[0] = ExpressionTree::new(Node::Primitive {
///         op: 0,
///         children: vec![Node::Primitive {
///             op: 0,
///             children: vec![Node::Constant(1.0)],
///         }],
///     });
/// });
///
/// assert!(!applied);
/// assert_eq!(tree, ExpressionTree::new(Node::Constant(0.0)));
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HeightLimit {
    max_height: usize,
}

impl HeightLimit {
    /// Returns a wrapper enforcing `height <= max_height`.
    pub fn new(max_height: usize) -> HeightLimit {
        HeightLimit { max_height }
    }

    /// Returns the enforced bound.
    pub fn max_height(&self) -> usize {
        self.max_height
    }

    /// Applies `operator` to the trees, reverting all of them
    /// if any result exceeds the bound. Returns whether the
    /// operation's effect was kept.
    pub fn apply<F>(&self, trees: &mut [&mut ExpressionTree], operator: F) -> bool
    where
        F: FnOnce(&mut [&mut ExpressionTree]),
    {
        let snapshots: Vec<ExpressionTree> = trees.iter().map(|tree| (**tree).clone()).collect();
        operator(trees);
        if trees.iter().any(|tree| tree.height() > self.max_height) {
            for (tree, snapshot) in trees.iter_mut().zip(snapshots) {
                **tree = snapshot;
            }
            false
        } else {
            true
        }
    }
}
