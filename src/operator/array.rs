//! Leaf operator over a shared matrix-like backing store.

use crate::core::traits::{ArrayLike, Scalar};
use crate::error::{OpError, check_dim};
use crate::operator::capabilities::Capabilities;
use faer::Mat;
use std::fmt;
use std::sync::Arc;

/// Wraps a backing [`ArrayLike`] by shared reference.
///
/// Cloning an `ArrayOperator` shares the store; it is read-only during apply
/// and solve, so clones may be used from different threads.
#[derive(Clone)]
pub struct ArrayOperator<T> {
    array: Arc<dyn ArrayLike<T>>,
    caps: Capabilities,
}

impl<T> fmt::Debug for ArrayOperator<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ArrayOperator")
            .field("nrows", &self.array.nrows())
            .field("ncols", &self.array.ncols())
            .field("caps", &self.caps)
            .finish()
    }
}

impl<T: Scalar> ArrayOperator<T> {
    /// Wrap an owned backing store.
    pub fn new<A: ArrayLike<T> + 'static>(array: A) -> Self {
        Self::from_shared(Arc::new(array))
    }

    /// Wrap a store that is already shared with other operators.
    ///
    /// The capability record is read from the store once, here.
    pub fn from_shared(array: Arc<dyn ArrayLike<T>>) -> Self {
        let mut caps = Capabilities::CONSTANT
            | Capabilities::IN_PLACE_APPLY
            | Capabilities::square_if((array.nrows(), array.ncols()));
        if array.has_solve() {
            caps |= Capabilities::INVERTIBLE;
        }
        caps.set(Capabilities::ADJOINT, array.has_adjoint());
        Self { array, caps }
    }

    pub fn array(&self) -> &Arc<dyn ArrayLike<T>> {
        &self.array
    }

    pub fn size(&self) -> (usize, usize) {
        (self.array.nrows(), self.array.ncols())
    }

    pub fn capabilities(&self) -> Capabilities {
        self.caps
    }

    pub fn apply(&self, x: &[T]) -> Result<Vec<T>, OpError> {
        let mut y = vec![T::zero(); self.array.nrows()];
        self.apply_into(x, &mut y)?;
        Ok(y)
    }

    pub fn apply_into(&self, x: &[T], y: &mut [T]) -> Result<(), OpError> {
        check_dim(self.array.ncols(), x.len())?;
        check_dim(self.array.nrows(), y.len())?;
        self.array.apply_into(x, y);
        Ok(())
    }

    pub fn solve(&self, b: &[T]) -> Result<Vec<T>, OpError> {
        let mut x = vec![T::zero(); self.array.ncols()];
        self.solve_into(b, &mut x)?;
        Ok(x)
    }

    /// Delegate to the store's solve.
    ///
    /// # Returns
    /// * `Err(Unsupported)` if the store has no solve
    /// * `Err(DimensionMismatch)` if `b` or `x` has the wrong length
    pub fn solve_into(&self, b: &[T], x: &mut [T]) -> Result<(), OpError> {
        if !self.array.has_solve() {
            return Err(OpError::Unsupported("backing array has no solve"));
        }
        check_dim(self.array.nrows(), b.len())?;
        check_dim(self.array.ncols(), x.len())?;
        self.array.solve_into(b, x)
    }

    pub fn adjoint(&self) -> Result<Self, OpError> {
        self.array
            .adjoint()
            .map(Self::from_shared)
            .ok_or(OpError::Unsupported("backing array has no adjoint"))
    }

    /// Dense copy of the backing store.
    pub fn to_dense(&self) -> Mat<T> {
        self.array.to_dense()
    }
}

impl<T: Scalar> From<Mat<T>> for ArrayOperator<T> {
    fn from(mat: Mat<T>) -> Self {
        Self::new(mat)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::wrappers::{DenseLu, Diagonal};

    #[test]
    fn dense_leaf_round_trip() {
        let mat = Mat::from_fn(2, 2, |i, j| (1 + i + 2 * j) as f64);
        let op = ArrayOperator::from(mat.clone());
        assert_eq!(op.size(), (2, 2));
        assert_eq!(op.apply(&[1.0, 0.0]).unwrap(), vec![1.0, 2.0]);
        assert_eq!(op.to_dense(), mat);
        assert!(matches!(op.solve(&[1.0, 1.0]), Err(OpError::Unsupported(_))));
    }

    #[test]
    fn leaf_checks_lengths() {
        let op = ArrayOperator::new(Diagonal::new(vec![1.0, 2.0, 3.0]));
        let mut y = vec![0.0; 2];
        assert_eq!(
            op.apply_into(&[1.0; 3], &mut y),
            Err(OpError::DimensionMismatch { expected: 3, found: 2 })
        );
    }

    #[test]
    fn lu_leaf_solves() {
        let mat = Mat::from_fn(2, 2, |i, j| if i == j { 4.0 } else { 1.0 });
        let op = ArrayOperator::new(DenseLu::new(mat).unwrap());
        assert!(op.capabilities().contains(Capabilities::SOLVE));
        let b = op.apply(&[1.0, 2.0]).unwrap();
        let x: Vec<f64> = op.solve(&b).unwrap();
        assert!((x[0] - 1.0).abs() < 1e-12 && (x[1] - 2.0).abs() < 1e-12);
    }
}
