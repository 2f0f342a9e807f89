use crate::trees::errors::PrimitiveSetError;

use rand::Rng;
use serde::{Deserialize, Serialize};

/// Implementation signature of a primitive function.
/// The slice holds exactly `arity` already-evaluated
/// child values.
///
/// Partial functions (division, logarithms, ...) must be
/// supplied in a "protected" form that returns a defined
/// fallback instead of panicking; the engine never guards
/// primitive applications itself.
pub type PrimitiveFn = fn(&[f64]) -> f64;

/// A named function of fixed arity, usable as an internal
/// tree node.
///
/// # Examples
/// ```
/// use oxigp::Primitive;
///
/// let add = Primitive::new("add", 2, |args: &[f64]| args[0] + args[1]).unwrap();
/// assert_eq!(add.name(), "add");
/// assert_eq!(add.arity(), 2);
/// ```
#[derive(Clone, Debug)]
pub struct Primitive {
    name: String,
    arity: usize,
    function: PrimitiveFn,
}

impl Primitive {
    /// Returns a new primitive with the given name, arity
    /// and implementation.
    ///
    /// # Errors
    /// Returns [`PrimitiveSetError::ZeroArity`] if `arity` is 0;
    /// nullary "functions" are terminals, not primitives.
    pub fn new(
        name: impl Into<String>,
        arity: usize,
        function: PrimitiveFn,
    ) -> Result<Primitive, PrimitiveSetError> {
        let name = name.into();
        if arity == 0 {
            return Err(PrimitiveSetError::ZeroArity(name));
        }
        Ok(Primitive {
            name,
            arity,
            function,
        })
    }

    /// Returns the primitive's name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the primitive's arity.
    pub fn arity(&self) -> usize {
        self.arity
    }

    pub(crate) fn call(&self, args: &[f64]) -> f64 {
        (self.function)(args)
    }
}

/// Generator of ephemeral constant terminals: values are
/// sampled uniformly from `low..=high` once, at node-creation
/// time, rounded to `precision` decimal places, and immutable
/// thereafter.
///
/// # Examples
/// ```
/// use oxigp::EphemeralConstant;
/// use rand::{rngs::StdRng, SeedableRng};
///
/// let constants = EphemeralConstant {
///     low: -1.0,
///     high: 1.0,
///     precision: 2,
/// };
/// let mut rng = StdRng::seed_from_u64(42);
/// let value = constants.sample(&mut rng);
///
/// assert!((-1.0..=1.0).contains(&value));
/// // Rounded to two decimal places.
/// assert!(((value * 100.0).round() - value * 100.0).abs() < 1e-9);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct EphemeralConstant {
    /// Lower bound of the sampling range.
    pub low: f64,
    /// Upper bound of the sampling range.
    pub high: f64,
    /// Number of decimal places kept.
    pub precision: u32,
}

impl EphemeralConstant {
    /// Draws one fresh constant value.
    pub fn sample<R: Rng>(&self, rng: &mut R) -> f64 {
        let value = rng.gen_range(self.low..=self.high);
        let scale = 10f64.powi(self.precision as i32);
        (value * scale).round() / scale
    }
}

/// The catalog of material available to build trees from:
/// primitive functions, variable terminals (one per input
/// feature, in feature order), and an optional ephemeral
/// constant generator.
///
/// # Examples
/// ```
/// use oxigp::{EphemeralConstant, PrimitiveSet};
///
/// let mut pset = PrimitiveSet::new(["x", "y"]);
/// pset.add_primitive("add", 2, |args: &[f64]| args[0] + args[1]).unwrap();
/// pset.set_constants(EphemeralConstant {
///     low: -1.0,
///     high: 1.0,
///     precision: 4,
/// });
///
/// assert!(pset.validate().is_ok());
/// assert_eq!(pset.variable_count(), 2);
/// assert_eq!(pset.terminal_count(), 3);
/// ```
#[derive(Clone, Debug, Default)]
pub struct PrimitiveSet {
    primitives: Vec<Primitive>,
    variables: Vec<String>,
    constants: Option<EphemeralConstant>,
}

impl PrimitiveSet {
    /// Returns a set with one variable terminal per name,
    /// in order, and no primitives or constants yet.
    pub fn new(variables: impl IntoIterator<Item = impl Into<String>>) -> PrimitiveSet {
        PrimitiveSet {
            primitives: vec![],
            variables: variables.into_iter().map(Into::into).collect(),
            constants: None,
        }
    }

    /// Registers a primitive function.
    ///
    /// # Errors
    /// Returns [`PrimitiveSetError::ZeroArity`] if `arity` is 0.
    pub fn add_primitive(
        &mut self,
        name: impl Into<String>,
        arity: usize,
        function: PrimitiveFn,
    ) -> Result<(), PrimitiveSetError> {
        self.primitives.push(Primitive::new(name, arity, function)?);
        Ok(())
    }

    /// Enables ephemeral constant terminals.
    pub fn set_constants(&mut self, constants: EphemeralConstant) {
        self.constants = Some(constants);
    }

    /// Returns the registered primitives, in registration order.
    pub fn primitives(&self) -> &[Primitive] {
        &self.primitives
    }

    /// Returns the primitive at `index`.
    ///
    /// # Panics
    /// Panics if `index` is out of bounds.
    pub fn primitive(&self, index: usize) -> &Primitive {
        &self.primitives[index]
    }

    /// Returns the variable terminal names, in feature order.
    pub fn variables(&self) -> &[String] {
        &self.variables
    }

    /// Returns the number of variable terminals.
    pub fn variable_count(&self) -> usize {
        self.variables.len()
    }

    /// Returns the ephemeral constant generator, if any.
    pub fn constants(&self) -> Option<&EphemeralConstant> {
        self.constants.as_ref()
    }

    /// Returns the number of terminal choices: variables,
    /// plus one if an ephemeral constant generator is set.
    pub fn terminal_count(&self) -> usize {
        self.variables.len() + usize::from(self.constants.is_some())
    }

    /// Fraction of node choices that are terminals. Used as
    /// the early-termination chance of grow-method generation.
    pub(crate) fn terminal_ratio(&self) -> f64 {
        let terminals = self.terminal_count() as f64;
        terminals / (terminals + self.primitives.len() as f64)
    }

    /// Checks that the set can actually produce trees.
    ///
    /// # Errors
    /// Returns an error if there are no terminals (no tree could
    /// terminate), no primitives (no internal node could be placed),
    /// or the constant range is empty or non-finite.
    pub fn validate(&self) -> Result<(), PrimitiveSetError> {
        if self.primitives.is_empty() {
            return Err(PrimitiveSetError::NoPrimitives);
        }
        if self.terminal_count() == 0 {
            return Err(PrimitiveSetError::EmptyTerminalSet);
        }
        if let Some(constants) = &self.constants {
            if !(constants.low <= constants.high)
                || !constants.low.is_finite()
                || !constants.high.is_finite()
            {
                return Err(PrimitiveSetError::InvalidConstantRange(
                    constants.low,
                    constants.high,
                ));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn arithmetic_set() -> PrimitiveSet {
        let mut pset = PrimitiveSet::new(["x"]);
        pset.add_primitive("add", 2, |args: &[f64]| args[0] + args[1])
            .unwrap();
        pset.add_primitive("neg", 1, |args: &[f64]| -args[0]).unwrap();
        pset
    }

    #[test]
    fn zero_arity_rejected() {
        let mut pset = PrimitiveSet::new(["x"]);
        assert_eq!(
            pset.add_primitive("one", 0, |_: &[f64]| 1.0),
            Err(PrimitiveSetError::ZeroArity("one".to_string()))
        );
    }

    #[test]
    fn empty_terminal_set_rejected() {
        let mut pset = PrimitiveSet::new(Vec::<String>::new());
        pset.add_primitive("add", 2, |args: &[f64]| args[0] + args[1])
            .unwrap();
        assert_eq!(pset.validate(), Err(PrimitiveSetError::EmptyTerminalSet));
    }

    #[test]
    fn empty_primitive_set_rejected() {
        let pset = PrimitiveSet::new(["x"]);
        assert_eq!(pset.validate(), Err(PrimitiveSetError::NoPrimitives));
    }

    #[test]
    fn inverted_constant_range_rejected() {
        let mut pset = arithmetic_set();
        pset.set_constants(EphemeralConstant {
            low: 1.0,
            high: -1.0,
            precision: 2,
        });
        assert_eq!(
            pset.validate(),
            Err(PrimitiveSetError::InvalidConstantRange(1.0, -1.0))
        );
    }

    #[test]
    fn constants_sampled_in_range_and_rounded() {
        let constants = EphemeralConstant {
            low: -2.0,
            high: 2.0,
            precision: 3,
        };
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..100 {
            let value = constants.sample(&mut rng);
            assert!((-2.0..=2.0).contains(&value));
            assert!(((value * 1000.0).round() - value * 1000.0).abs() < 1e-9);
        }
    }

    #[test]
    fn terminal_ratio_counts_the_constant_generator() {
        let mut pset = arithmetic_set();
        assert!((pset.terminal_ratio() - 1.0 / 3.0).abs() < 1e-12);
        pset.set_constants(EphemeralConstant {
            low: 0.0,
            high: 1.0,
            precision: 0,
        });
        assert!((pset.terminal_ratio() - 2.0 / 4.0).abs() < 1e-12);
    }
}
