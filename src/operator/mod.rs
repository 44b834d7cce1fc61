//! Lazily composed linear operators.
//!
//! An operator expression is a tree of [`Operator`] values. The leaves are
//! identities, null operators and [`ArrayOperator`]s over a concrete backing
//! store; the inner nodes are scalings, sums and products. The combinators in
//! [`algebra`] keep that tree flat: a scaling never wraps another scaling, a
//! sum never holds another sum and a product never holds another product.
//!
//! Every variant answers the same questions: its `(rows, cols)` size, its
//! [`Capabilities`] record, `apply`/`solve` into a fresh vector, and
//! `apply_into`/`solve_into` against caller-owned storage. The in-place paths
//! take `&mut self` because sums and products own reusable scratch buffers.
//!
//! Coefficients that depend on time, state or parameters are re-evaluated by
//! [`Operator::refresh`], which also recomputes the capability records of every
//! node on the way back up.
//!
//! # Usage
//! - Build the expression once, e.g. `add(vec![scale(alpha, a), scale(beta, b)])`.
//! - Query [`Capabilities`] (or the free `is_*`/`has_*` functions) to choose between
//!   `solve` and a dense fallback.
//! - In the solver loop call `refresh(u, p, t)` when the operator is not constant,
//!   then `apply_into` with caller-owned storage.

pub mod added;
pub mod algebra;
pub mod array;
pub mod capabilities;
pub mod coefficient;
pub mod composed;
pub mod identity;
pub mod scaled;

pub use added::AddedOperator;
pub use algebra::{add, add_array, add_scalar, neg, scale, sub};
pub use array::ArrayOperator;
pub use capabilities::Capabilities;
pub use coefficient::{CoefficientOp, ScalarCoefficient, UpdateFn, UpdateRule};
pub use composed::{ComposedOperator, compose, left_div, right_div};
pub use identity::{IdentityOperator, NullOperator};
pub use scaled::ScaledOperator;

use crate::core::traits::Scalar;
use crate::error::{OpError, check_dim};
use faer::Mat;

/// A node of an operator expression.
#[derive(Clone, Debug)]
pub enum Operator<T> {
    Identity(IdentityOperator),
    Null(NullOperator),
    Array(ArrayOperator<T>),
    Scaled(ScaledOperator<T>),
    Added(AddedOperator<T>),
    Composed(ComposedOperator<T>),
}

impl<T: Scalar> Operator<T> {
    /// `(rows, cols)`.
    pub fn size(&self) -> (usize, usize) {
        match self {
            Operator::Identity(op) => op.size(),
            Operator::Null(op) => op.size(),
            Operator::Array(op) => op.size(),
            Operator::Scaled(op) => op.size(),
            Operator::Added(op) => op.size(),
            Operator::Composed(op) => op.size(),
        }
    }

    pub fn nrows(&self) -> usize {
        self.size().0
    }

    pub fn ncols(&self) -> usize {
        self.size().1
    }

    /// The capability record of this node.
    pub fn capabilities(&self) -> Capabilities {
        match self {
            Operator::Identity(op) => op.capabilities(),
            Operator::Null(op) => op.capabilities(),
            Operator::Array(op) => op.capabilities(),
            Operator::Scaled(op) => op.capabilities(),
            Operator::Added(op) => op.capabilities(),
            Operator::Composed(op) => op.capabilities(),
        }
    }

    pub fn is_constant(&self) -> bool {
        self.capabilities().contains(Capabilities::CONSTANT)
    }

    pub fn is_zero(&self) -> bool {
        self.capabilities().contains(Capabilities::ZERO)
    }

    pub fn is_square(&self) -> bool {
        self.capabilities().contains(Capabilities::SQUARE)
    }

    pub fn has_solve(&self) -> bool {
        self.capabilities().contains(Capabilities::SOLVE)
    }

    /// Apply into a newly allocated vector.
    pub fn apply(&self, x: &[T]) -> Result<Vec<T>, OpError> {
        match self {
            Operator::Identity(op) => op.apply(x),
            Operator::Null(op) => op.apply(x),
            Operator::Array(op) => op.apply(x),
            Operator::Scaled(op) => op.apply(x),
            Operator::Added(op) => op.apply(x),
            Operator::Composed(op) => op.apply(x),
        }
    }

    /// Apply into caller-owned `y`, overwriting it.
    pub fn apply_into(&mut self, x: &[T], y: &mut [T]) -> Result<(), OpError> {
        if !self.capabilities().contains(Capabilities::IN_PLACE_APPLY) {
            return Err(OpError::Unsupported("operator has no in-place apply"));
        }
        match self {
            Operator::Identity(op) => op.apply_into(x, y),
            Operator::Null(op) => op.apply_into(x, y),
            Operator::Array(op) => op.apply_into(x, y),
            Operator::Scaled(op) => op.apply_into(x, y),
            Operator::Added(op) => op.apply_into(x, y),
            Operator::Composed(op) => op.apply_into(x, y),
        }
    }

    /// Solve `A x = b` into a newly allocated vector.
    pub fn solve(&self, b: &[T]) -> Result<Vec<T>, OpError> {
        match self {
            Operator::Identity(op) => op.solve(b),
            Operator::Null(op) => {
                check_dim(op.size().0, b.len())?;
                Err(OpError::Singular)
            }
            Operator::Array(op) => op.solve(b),
            Operator::Scaled(op) => op.solve(b),
            Operator::Added(op) => op.solve(b),
            Operator::Composed(op) => op.solve(b),
        }
    }

    /// Solve `A x = b` into caller-owned `x`, overwriting it.
    ///
    /// Zero operators fall through to their own length checks and report
    /// `Singular`; anything else without an in-place solve is `Unsupported`.
    pub fn solve_into(&mut self, b: &[T], x: &mut [T]) -> Result<(), OpError> {
        let caps = self.capabilities();
        if !caps.contains(Capabilities::IN_PLACE_SOLVE) && !caps.contains(Capabilities::ZERO) {
            return Err(OpError::Unsupported("operator has no in-place solve"));
        }
        match self {
            Operator::Identity(op) => op.solve_into(b, x),
            Operator::Null(op) => {
                check_dim(op.size().0, b.len())?;
                check_dim(op.size().1, x.len())?;
                Err(OpError::Singular)
            }
            Operator::Array(op) => op.solve_into(b, x),
            Operator::Scaled(op) => op.solve_into(b, x),
            Operator::Added(op) => op.solve_into(b, x),
            Operator::Composed(op) => op.solve_into(b, x),
        }
    }

    /// Conjugate transpose. Identity and null operators are their own adjoint.
    pub fn adjoint(&self) -> Result<Operator<T>, OpError> {
        match self {
            Operator::Identity(op) => Ok(Operator::Identity(*op)),
            Operator::Null(op) => Ok(Operator::Null(op.adjoint())),
            Operator::Array(op) => op.adjoint().map(Operator::Array),
            Operator::Scaled(op) => op.adjoint(),
            Operator::Added(op) => op.adjoint(),
            Operator::Composed(op) => op.adjoint(),
        }
    }

    /// Re-evaluate every coefficient in the tree from state `u`, parameters
    /// `p` and time `t`. Shapes never change.
    pub fn refresh(&mut self, u: &[T], p: &[T], t: T) -> &mut Self {
        match self {
            Operator::Identity(_) | Operator::Null(_) | Operator::Array(_) => {}
            Operator::Scaled(op) => op.refresh(u, p, t),
            Operator::Added(op) => op.refresh(u, p, t),
            Operator::Composed(op) => op.refresh(u, p, t),
        }
        self
    }
}

impl<T> From<IdentityOperator> for Operator<T> {
    fn from(op: IdentityOperator) -> Self {
        Operator::Identity(op)
    }
}

impl<T> From<NullOperator> for Operator<T> {
    fn from(op: NullOperator) -> Self {
        Operator::Null(op)
    }
}

impl<T> From<ArrayOperator<T>> for Operator<T> {
    fn from(op: ArrayOperator<T>) -> Self {
        Operator::Array(op)
    }
}

impl<T> From<ScaledOperator<T>> for Operator<T> {
    fn from(op: ScaledOperator<T>) -> Self {
        Operator::Scaled(op)
    }
}

impl<T> From<AddedOperator<T>> for Operator<T> {
    fn from(op: AddedOperator<T>) -> Self {
        Operator::Added(op)
    }
}

impl<T> From<ComposedOperator<T>> for Operator<T> {
    fn from(op: ComposedOperator<T>) -> Self {
        Operator::Composed(op)
    }
}

impl<T: Scalar> From<Mat<T>> for Operator<T> {
    fn from(mat: Mat<T>) -> Self {
        Operator::Array(ArrayOperator::from(mat))
    }
}
