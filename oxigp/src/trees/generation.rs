use crate::trees::{ExpressionTree, Node, PrimitiveSet};

use rand::Rng;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Method {
    Full,
    Grow,
}

/// Stochastic generator of random expression trees over a
/// depth range, supporting the full and grow methods and
/// their ramped half-and-half combination.
///
/// For every generated tree, a target depth is chosen
/// uniformly in `min_depth..=max_depth`. The full method
/// extends every branch to exactly the target depth before
/// terminating; the grow method may additionally terminate
/// any branch early (at depth > 0), with the terminal ratio
/// of the primitive set as the per-node chance.
///
/// # Examples
/// ```
/// use oxigp::{PrimitiveSet, TreeFactory};
/// use rand::{rngs::StdRng, SeedableRng};
///
/// let mut pset = PrimitiveSet::new(["x"]);
/// pset.add_primitive("add", 2, |args: &[f64]| args[0] + args[1]).unwrap();
///
/// let factory = TreeFactory::new(&pset, 1, 3);
/// let mut rng = StdRng::seed_from_u64(42);
///
/// let tree = factory.half_and_half(&mut rng);
/// assert!(tree.height() <= 3);
/// ```
#[derive(Clone, Copy, Debug)]
pub struct TreeFactory<'a> {
    pset: &'a PrimitiveSet,
    min_depth: usize,
    max_depth: usize,
}

impl<'a> TreeFactory<'a> {
    /// Returns a factory generating trees whose target depth
    /// is drawn from `min_depth..=max_depth`.
    ///
    /// # Panics
    /// Generation panics if `min_depth > max_depth` or the
    /// primitive set fails [`PrimitiveSet::validate`].
    pub fn new(pset: &'a PrimitiveSet, min_depth: usize, max_depth: usize) -> TreeFactory<'a> {
        TreeFactory {
            pset,
            min_depth,
            max_depth,
        }
    }

    /// Generates a tree with the full method: every branch
    /// reaches exactly the target depth.
    pub fn full<R: Rng>(&self, rng: &mut R) -> ExpressionTree {
        let target = rng.gen_range(self.min_depth..=self.max_depth);
        ExpressionTree::new(self.build(Method::Full, 0, target, rng))
    }

    /// Generates a tree with the grow method: branches may
    /// terminate early, so shapes are sparse and uneven.
    pub fn grow<R: Rng>(&self, rng: &mut R) -> ExpressionTree {
        let target = rng.gen_range(self.min_depth..=self.max_depth);
        ExpressionTree::new(self.build(Method::Grow, 0, target, rng))
    }

    /// Generates a tree choosing uniformly between the full
    /// and grow methods (ramped half-and-half). Seeding an
    /// initial population this way yields a structurally
    /// diverse mix of bushy and sparse shapes.
    pub fn half_and_half<R: Rng>(&self, rng: &mut R) -> ExpressionTree {
        let target = rng.gen_range(self.min_depth..=self.max_depth);
        let method = if rng.gen::<bool>() {
            Method::Full
        } else {
            Method::Grow
        };
        ExpressionTree::new(self.build(method, 0, target, rng))
    }

    fn build<R: Rng>(&self, method: Method, depth: usize, target: usize, rng: &mut R) -> Node {
        if depth == target
            || (method == Method::Grow
                && depth > 0
                && rng.gen::<f64>() < self.pset.terminal_ratio())
        {
            self.terminal(rng)
        } else {
            let op = rng.gen_range(0..self.pset.primitives().len());
            let children = (0..self.pset.primitive(op).arity())
                .map(|_| self.build(method, depth + 1, target, rng))
                .collect();
            Node::Primitive { op, children }
        }
    }

    fn terminal<R: Rng>(&self, rng: &mut R) -> Node {
        let variables = self.pset.variable_count();
        let pick = rng.gen_range(0..self.pset.terminal_count());
        match self.pset.constants() {
            Some(constants) if pick >= variables => Node::Constant(constants.sample(rng)),
            _ => Node::Variable(pick),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trees::EphemeralConstant;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn arithmetic_set() -> PrimitiveSet {
        let mut pset = PrimitiveSet::new(["x", "y"]);
        pset.add_primitive("add", 2, |args: &[f64]| args[0] + args[1])
            .unwrap();
        pset.add_primitive("neg", 1, |args: &[f64]| -args[0]).unwrap();
        pset.set_constants(EphemeralConstant {
            low: -1.0,
            high: 1.0,
            precision: 4,
        });
        pset
    }

    fn min_leaf_depth(node: &Node) -> usize {
        match node {
            Node::Primitive { children, .. } => {
                1 + children.iter().map(min_leaf_depth).min().unwrap_or(0)
            }
            _ => 0,
        }
    }

    #[test]
    fn full_reaches_exact_target_depth() {
        let pset = arithmetic_set();
        let factory = TreeFactory::new(&pset, 3, 3);
        let mut rng = StdRng::seed_from_u64(1);
        for _ in 0..50 {
            let tree = factory.full(&mut rng);
            assert_eq!(tree.height(), 3);
            assert_eq!(min_leaf_depth(tree.root()), 3);
        }
    }

    #[test]
    fn grow_stays_within_target_depth() {
        let pset = arithmetic_set();
        let factory = TreeFactory::new(&pset, 0, 4);
        let mut rng = StdRng::seed_from_u64(2);
        for _ in 0..200 {
            let tree = factory.grow(&mut rng);
            assert!(tree.height() <= 4);
            assert!(tree.size() >= 1);
        }
    }

    #[test]
    fn half_and_half_stays_within_range() {
        let pset = arithmetic_set();
        let factory = TreeFactory::new(&pset, 1, 3);
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..200 {
            let tree = factory.half_and_half(&mut rng);
            assert!(tree.height() <= 3);
        }
    }

    #[test]
    fn generation_is_deterministic_under_a_fixed_seed() {
        let pset = arithmetic_set();
        let factory = TreeFactory::new(&pset, 1, 4);
        let mut first = StdRng::seed_from_u64(99);
        let mut second = StdRng::seed_from_u64(99);
        for _ in 0..50 {
            assert_eq!(
                factory.half_and_half(&mut first),
                factory.half_and_half(&mut second)
            );
        }
    }
}
