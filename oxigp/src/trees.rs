//! Expression trees and the machinery to build them.
//! Trees are made of primitive (internal) and terminal
//! (leaf) nodes drawn from a [`PrimitiveSet`], and are
//! generated stochastically by a [`TreeFactory`].
mod errors;
mod generation;
mod nodes;
mod primitives;

pub use errors::PrimitiveSetError;
pub use generation::TreeFactory;
pub use nodes::{ExpressionTree, Node};
pub use primitives::{EphemeralConstant, Primitive, PrimitiveFn, PrimitiveSet};
