use crate::trees::PrimitiveSet;

use serde::{Deserialize, Serialize};

/// A single node of an expression tree.
///
/// Primitive nodes reference their function by index into the
/// [`PrimitiveSet`] the tree was built from, and carry exactly
/// `arity` children. Terminal nodes are either a variable
/// reference (index into the feature vector) or a constant
/// whose value was fixed at node creation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Node {
    /// Internal node: a primitive application.
    Primitive {
        /// Index into the primitive set.
        op: usize,
        /// Exactly `arity` operands.
        children: Vec<Node>,
    },
    /// Leaf node: reference to an input feature.
    Variable(usize),
    /// Leaf node: an ephemeral constant, fixed at creation.
    Constant(f64),
}

impl Node {
    /// Returns the number of nodes in this subtree.
    pub fn size(&self) -> usize {
        match self {
            Node::Primitive { children, .. } => {
                1 + children.iter().map(Node::size).sum::<usize>()
            }
            _ => 1,
        }
    }

    /// Returns the height of this subtree, counted in edges
    /// (a lone terminal has height 0).
    pub fn height(&self) -> usize {
        match self {
            Node::Primitive { children, .. } => {
                1 + children.iter().map(Node::height).max().unwrap_or(0)
            }
            _ => 0,
        }
    }

    /// Evaluates the subtree against one feature vector.
    /// Variable nodes index into `inputs`, whose length must
    /// match the variable count the tree was built with.
    pub fn eval(&self, pset: &PrimitiveSet, inputs: &[f64]) -> f64 {
        match self {
            Node::Constant(value) => *value,
            Node::Variable(index) => inputs[*index],
            Node::Primitive { op, children } => {
                let args: Vec<f64> = children.iter().map(|c| c.eval(pset, inputs)).collect();
                pset.primitive(*op).call(&args)
            }
        }
    }

    /// Renders the subtree in prefix form, e.g. `add(x, mul(x, 2.0))`.
    pub fn formula(&self, pset: &PrimitiveSet) -> String {
        match self {
            Node::Constant(value) => format!("{:?}", value),
            Node::Variable(index) => pset.variables()[*index].clone(),
            Node::Primitive { op, children } => {
                let args: Vec<String> = children.iter().map(|c| c.formula(pset)).collect();
                format!("{}({})", pset.primitive(*op).name(), args.join(", "))
            }
        }
    }

    pub(crate) fn get(&self, index: usize) -> Option<&Node> {
        fn walk<'a>(node: &'a Node, index: &mut usize) -> Option<&'a Node> {
            if *index == 0 {
                return Some(node);
            }
            *index -= 1;
            if let Node::Primitive { children, .. } = node {
                for child in children {
                    if let Some(found) = walk(child, index) {
                        return Some(found);
                    }
                }
            }
            None
        }
        let mut index = index;
        walk(self, &mut index)
    }

    pub(crate) fn get_mut(&mut self, index: usize) -> Option<&mut Node> {
        fn walk<'a>(node: &'a mut Node, index: &mut usize) -> Option<&'a mut Node> {
            if *index == 0 {
                return Some(node);
            }
            *index -= 1;
            if let Node::Primitive { children, .. } = node {
                for child in children {
                    if let Some(found) = walk(child, index) {
                        return Some(found);
                    }
                }
            }
            None
        }
        let mut index = index;
        walk(self, &mut index)
    }
}

/// A complete candidate expression.
///
/// The tree is structurally immutable except through
/// whole-subtree replacement, which is how crossover and
/// mutation operate. Subtrees are addressed by preorder
/// index: the root is 0, followed by the first child's
/// subtree, and so on.
///
/// # Examples
/// ```
/// use oxigp::{ExpressionTree, Node, PrimitiveSet};
///
/// let mut pset = PrimitiveSet::new(["x"]);
/// pset.add_primitive("add", 2, |args: &[f64]| args[0] + args[1]).unwrap();
///
/// // add(x, 1.0)
/// let tree = ExpressionTree::new(Node::Primitive {
///     op: 0,
///     children: vec![Node::Variable(0), Node::Constant(1.0)],
/// });
///
/// assert_eq!(tree.size(), 3);
/// assert_eq!(tree.height(), 1);
/// assert_eq!(tree.eval(&pset, &[2.0]), 3.0);
/// assert_eq!(tree.formula(&pset), "add(x, 1.0)");
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ExpressionTree {
    root: Node,
}

impl ExpressionTree {
    /// Returns a tree with the given root node.
    pub fn new(root: Node) -> ExpressionTree {
        ExpressionTree { root }
    }

    /// Returns the root node.
    pub fn root(&self) -> &Node {
        &self.root
    }

    /// Consumes the tree, returning its root node.
    pub fn into_root(self) -> Node {
        self.root
    }

    /// Returns the number of nodes in the tree.
    pub fn size(&self) -> usize {
        self.root.size()
    }

    /// Returns the tree's height in edges.
    pub fn height(&self) -> usize {
        self.root.height()
    }

    /// Returns the subtree rooted at preorder index `index`,
    /// or `None` if the index is out of bounds.
    pub fn subtree(&self, index: usize) -> Option<&Node> {
        self.root.get(index)
    }

    /// Replaces the subtree rooted at preorder index `index`.
    /// Returns whether the index was in bounds and the
    /// replacement took place.
    pub fn replace_subtree(&mut self, index: usize, subtree: Node) -> bool {
        match self.root.get_mut(index) {
            Some(node) => {
                *node = subtree;
                true
            }
            None => false,
        }
    }

    /// Evaluates the tree against one feature vector.
    pub fn eval(&self, pset: &PrimitiveSet, inputs: &[f64]) -> f64 {
        self.root.eval(pset, inputs)
    }

    /// Renders the tree in prefix form.
    pub fn formula(&self, pset: &PrimitiveSet) -> String {
        self.root.formula(pset)
    }
}
