//! Core linear-algebra traits for lazyop.

use crate::error::OpError;
use faer::Mat;
use num_traits::Float;
use std::fmt::Debug;
use std::sync::Arc;

/// Element type every operator is generic over.
pub trait Scalar: Float + Debug + Send + Sync + 'static {
    /// Complex conjugate. Real scalars are their own conjugate.
    fn conj(self) -> Self {
        self
    }
}

impl Scalar for f32 {}
impl Scalar for f64 {}

/// Matrix-like backing store at the leaves of an operator expression.
///
/// This is the only place concrete numbers live; everything else in the
/// crate is built lazily on top of it. Implementors are read-only during
/// apply, so a single store may be shared between several operators.
pub trait ArrayLike<T>: Send + Sync {
    /// Number of rows.
    fn nrows(&self) -> usize;
    /// Number of columns.
    fn ncols(&self) -> usize;
    /// Compute y = A · x.  `x.len() == ncols()`, `y.len() == nrows()`.
    fn apply_into(&self, x: &[T], y: &mut [T]);
    /// Whether `solve_into` is available.
    fn has_solve(&self) -> bool {
        false
    }
    /// Solve A · x = b, writing the result into `x`.
    fn solve_into(&self, _b: &[T], _x: &mut [T]) -> Result<(), OpError> {
        Err(OpError::Unsupported("backing array has no solve"))
    }
    /// Whether `adjoint` returns `Some`.
    fn has_adjoint(&self) -> bool {
        false
    }
    /// Conjugate transpose, as a new shared store.
    fn adjoint(&self) -> Option<Arc<dyn ArrayLike<T>>> {
        None
    }
    /// Materialize as a dense Faer matrix.
    fn to_dense(&self) -> Mat<T>;
}
