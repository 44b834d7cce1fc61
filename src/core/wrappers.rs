//! Backing stores over Faer dense matrices and plain vectors.
//!
//! This module implements [`ArrayLike`] for the concrete containers an operator
//! expression bottoms out at:
//!
//! - `faer::Mat<T>`: dense matrix-vector product, transpose as adjoint, no solve.
//! - [`DenseLu`]: a dense matrix together with its full-pivoting LU factorization,
//!   so it can both apply and solve.
//! - [`Diagonal`]: a diagonal matrix stored as a vector.
//!
//! With the `rayon` feature enabled, the dense product is computed row-parallel
//! once the matrix is large enough to amortize the thread hand-off.
//!
//! # References
//! - [faer crate documentation](https://docs.rs/faer)
//! - [num-traits crate documentation](https://docs.rs/num-traits)

use crate::core::traits::{ArrayLike, Scalar};
use crate::error::{OpError, check_dim};
use faer::linalg::solvers::{FullPivLu, SolveCore};
use faer::traits::ComplexField;
use faer::{Conj, Mat, MatMut};
use num_traits::Float;
use std::sync::Arc;

/// Row count above which the dense product goes parallel.
#[cfg(feature = "rayon")]
const PAR_ROWS: usize = 256;

fn row_dot<T: Scalar>(a: &Mat<T>, i: usize, x: &[T]) -> T {
    (0..a.ncols()).fold(T::zero(), |acc, j| acc + a[(i, j)] * x[j])
}

/// Dense matrix-vector product `y = A * x`.
impl<T: Scalar> ArrayLike<T> for Mat<T> {
    fn nrows(&self) -> usize {
        self.nrows()
    }

    fn ncols(&self) -> usize {
        self.ncols()
    }

    fn apply_into(&self, x: &[T], y: &mut [T]) {
        assert_eq!(self.ncols(), x.len(), "Input vector x has incorrect length");
        assert_eq!(self.nrows(), y.len(), "Output vector y has incorrect length");
        #[cfg(feature = "rayon")]
        {
            if self.nrows() >= PAR_ROWS {
                use rayon::prelude::*;
                y.par_iter_mut()
                    .enumerate()
                    .for_each(|(i, yi)| *yi = row_dot(self, i, x));
                return;
            }
        }
        for (i, yi) in y.iter_mut().enumerate() {
            *yi = row_dot(self, i, x);
        }
    }

    fn has_adjoint(&self) -> bool {
        true
    }

    fn adjoint(&self) -> Option<Arc<dyn ArrayLike<T>>> {
        let adj = Mat::from_fn(self.ncols(), self.nrows(), |i, j| self[(j, i)].conj());
        Some(Arc::new(adj))
    }

    fn to_dense(&self) -> Mat<T> {
        self.clone()
    }
}

/// Dense matrix paired with its full-pivoting LU factorization.
///
/// The factorization is computed once at construction; `solve_into` reuses it.
pub struct DenseLu<T: ComplexField> {
    mat: Mat<T>,
    lu: FullPivLu<T>,
}

impl<T: Scalar + ComplexField> DenseLu<T> {
    /// Factorize a square matrix.
    pub fn new(mat: Mat<T>) -> Result<Self, OpError> {
        check_dim(mat.nrows(), mat.ncols())?;
        let lu = FullPivLu::new(mat.as_ref());
        Ok(Self { mat, lu })
    }

    /// The matrix that was factorized.
    pub fn matrix(&self) -> &Mat<T> {
        &self.mat
    }

    /// Solve A·x = b into a fresh vector.
    pub fn solve(&self, b: &[T]) -> Result<Vec<T>, OpError> {
        let mut x = b.to_vec();
        self.solve_into(b, &mut x)?;
        Ok(x)
    }
}

impl<T: Scalar + ComplexField> ArrayLike<T> for DenseLu<T> {
    fn nrows(&self) -> usize {
        self.mat.nrows()
    }

    fn ncols(&self) -> usize {
        self.mat.ncols()
    }

    fn apply_into(&self, x: &[T], y: &mut [T]) {
        ArrayLike::apply_into(&self.mat, x, y);
    }

    fn has_solve(&self) -> bool {
        true
    }

    fn solve_into(&self, b: &[T], x: &mut [T]) -> Result<(), OpError> {
        check_dim(self.mat.nrows(), b.len())?;
        check_dim(self.mat.ncols(), x.len())?;
        x.copy_from_slice(b);
        let n = x.len();
        let x_mat = MatMut::from_column_major_slice_mut(x, n, 1);
        self.lu.solve_in_place_with_conj(Conj::No, x_mat);
        // A singular factor shows up as non-finite entries after substitution.
        if x.iter().any(|v| !Float::is_finite(*v)) {
            return Err(OpError::Singular);
        }
        Ok(())
    }

    fn has_adjoint(&self) -> bool {
        true
    }

    fn adjoint(&self) -> Option<Arc<dyn ArrayLike<T>>> {
        let adj = Mat::from_fn(self.mat.ncols(), self.mat.nrows(), |i, j| {
            Scalar::conj(self.mat[(j, i)])
        });
        DenseLu::new(adj)
            .ok()
            .map(|lu| Arc::new(lu) as Arc<dyn ArrayLike<T>>)
    }

    fn to_dense(&self) -> Mat<T> {
        self.mat.clone()
    }
}

/// Diagonal matrix stored as its diagonal.
#[derive(Clone, Debug, PartialEq)]
pub struct Diagonal<T> {
    diag: Vec<T>,
}

impl<T: Scalar> Diagonal<T> {
    /// Square diagonal matrix with `diag` on its main diagonal.
    ///
    /// Zero entries are allowed; the store then reports no solve.
    pub fn new(diag: Vec<T>) -> Self {
        Self { diag }
    }

    /// The diagonal entries.
    pub fn diag(&self) -> &[T] {
        &self.diag
    }
}

impl<T: Scalar> ArrayLike<T> for Diagonal<T> {
    fn nrows(&self) -> usize {
        self.diag.len()
    }

    fn ncols(&self) -> usize {
        self.diag.len()
    }

    fn apply_into(&self, x: &[T], y: &mut [T]) {
        assert_eq!(self.diag.len(), x.len(), "Input vector x has incorrect length");
        assert_eq!(self.diag.len(), y.len(), "Output vector y has incorrect length");
        for ((yi, di), xi) in y.iter_mut().zip(&self.diag).zip(x) {
            *yi = *di * *xi;
        }
    }

    fn has_solve(&self) -> bool {
        self.diag.iter().all(|d| *d != T::zero())
    }

    fn solve_into(&self, b: &[T], x: &mut [T]) -> Result<(), OpError> {
        check_dim(self.diag.len(), b.len())?;
        check_dim(self.diag.len(), x.len())?;
        if !self.has_solve() {
            return Err(OpError::Singular);
        }
        for ((xi, di), bi) in x.iter_mut().zip(&self.diag).zip(b) {
            *xi = *bi / *di;
        }
        Ok(())
    }

    fn has_adjoint(&self) -> bool {
        true
    }

    fn adjoint(&self) -> Option<Arc<dyn ArrayLike<T>>> {
        let diag = self.diag.iter().map(|d| d.conj()).collect();
        Some(Arc::new(Diagonal { diag }))
    }

    fn to_dense(&self) -> Mat<T> {
        let n = self.diag.len();
        Mat::from_fn(n, n, |i, j| if i == j { self.diag[i] } else { T::zero() })
    }
}
