//! Fitness evaluation of expression trees against a
//! regression dataset.
use crate::trees::{ExpressionTree, PrimitiveSet};

use serde::{Deserialize, Serialize};

use std::error::Error;
use std::fmt;

/// Error metric minimized by the evolutionary search.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum FitnessMetric {
    /// Sum of absolute errors over all rows.
    AbsoluteError,
    /// Sum of squared errors over all rows.
    SumSquaredError,
    /// Sum of squared errors divided by the row count.
    MeanSquaredError,
}

/// An ordered sequence of regression rows, each a feature
/// vector paired with its target value.
///
/// # Examples
/// ```
/// use oxigp::Dataset;
///
/// let data = Dataset::new(vec![(vec![1.0], 3.0), (vec![2.0], 5.0)]);
/// assert_eq!(data.len(), 2);
/// ```
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    rows: Vec<(Vec<f64>, f64)>,
}

impl Dataset {
    /// Returns a dataset over the given rows.
    pub fn new(rows: Vec<(Vec<f64>, f64)>) -> Dataset {
        Dataset { rows }
    }

    /// Returns the rows, in order.
    pub fn rows(&self) -> &[(Vec<f64>, f64)] {
        &self.rows
    }

    /// Returns the number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Returns whether the dataset has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Errors raised when a dataset cannot be evaluated against.
#[derive(Clone, Debug, PartialEq)]
pub enum EvaluationError {
    /// The dataset has no rows; a fitness of 0 or NaN would
    /// be meaningless, so this is an explicit failure.
    EmptyDataset,
    /// A row's feature count does not match the number of
    /// variable terminals in the primitive set.
    RowWidthMismatch {
        row: usize,
        expected: usize,
        found: usize,
    },
}

impl fmt::Display for EvaluationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyDataset => write!(f, "evaluation dataset has no rows"),
            Self::RowWidthMismatch {
                row,
                expected,
                found,
            } => write!(
                f,
                "dataset row {} has {} features, primitive set registers {} variables",
                row, found, expected
            ),
        }
    }
}

impl Error for EvaluationError {}

/// Scores a tree against the dataset under the chosen metric.
/// Lower is better.
///
/// Non-finite accumulations (overflow or NaN from an unstable
/// expression) are sanitized to `f64::INFINITY`, the worst
/// possible fitness, so the ordering of fitness values stays
/// total and a single unstable tree never aborts a run.
///
/// # Errors
/// Fails if the dataset is empty or any row's width does not
/// match the primitive set's variable count.
///
/// # Examples
/// ```
/// use oxigp::{evaluate, Dataset, ExpressionTree, FitnessMetric, Node, PrimitiveSet};
///
/// let mut pset = PrimitiveSet::new(["x"]);
/// pset.add_primitive("add", 2, |args: &[f64]| args[0] + args[1]).unwrap();
///
/// // f(x) = x + 1
/// let tree = ExpressionTree::new(Node::Primitive {
///     op: 0,
///     children: vec![Node::Variable(0), Node::Constant(1.0)],
/// });
/// let data = Dataset::new(vec![(vec![1.0], 3.0)]);
///
/// let fitness = evaluate(&tree, &pset, &data, FitnessMetric::AbsoluteError).unwrap();
/// assert_eq!(fitness, 1.0);
/// ```
pub fn evaluate(
    tree: &ExpressionTree,
    pset: &PrimitiveSet,
    data: &Dataset,
    metric: FitnessMetric,
) -> Result<f64, EvaluationError> {
    validate_dataset(pset, data)?;
    Ok(score(tree, pset, data, metric))
}

pub(crate) fn validate_dataset(
    pset: &PrimitiveSet,
    data: &Dataset,
) -> Result<(), EvaluationError> {
    if data.is_empty() {
        return Err(EvaluationError::EmptyDataset);
    }
    let expected = pset.variable_count();
    for (row, (features, _)) in data.rows().iter().enumerate() {
        if features.len() != expected {
            return Err(EvaluationError::RowWidthMismatch {
                row,
                expected,
                found: features.len(),
            });
        }
    }
    Ok(())
}

/// Scoring core, assuming the dataset was already validated.
pub(crate) fn score(
    tree: &ExpressionTree,
    pset: &PrimitiveSet,
    data: &Dataset,
    metric: FitnessMetric,
) -> f64 {
    let mut total = 0.0;
    for (features, target) in data.rows() {
        let prediction = tree.eval(pset, features);
        let error = target - prediction;
        total += match metric {
            FitnessMetric::AbsoluteError => error.abs(),
            FitnessMetric::SumSquaredError | FitnessMetric::MeanSquaredError => error * error,
        };
    }
    if metric == FitnessMetric::MeanSquaredError {
        total /= data.len() as f64;
    }
    if total.is_finite() {
        total
    } else {
        f64::INFINITY
    }
}
