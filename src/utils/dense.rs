//! Dense fallback for operators without a native solve.
//!
//! A sum of operators cannot be inverted lazily. When a caller still needs a
//! solve, the expression is materialized column by column (each column is the
//! operator applied to a unit vector) and handed to a full-pivoting LU from
//! Faer. [`DenseOptions::max_dim`] bounds how large an operator may be before
//! this is refused.
//!
//! # Usage
//! - `solve_dense(&op, &b, &DenseOptions::default())` for a one-off solve.
//! - `factorize(&op, &options)` once, then `solve` repeatedly, when the operator
//!   is constant between solver steps.

use crate::config::options::DenseOptions;
use crate::core::traits::Scalar;
use crate::core::wrappers::DenseLu;
use crate::error::{OpError, check_dim};
use crate::operator::{ArrayOperator, Operator, scale};
use faer::Mat;
use faer::traits::ComplexField;
use log::debug;

/// Materialize `op` as a dense matrix.
///
/// # Arguments
/// * `op` - Any operator; array leaves are copied directly
/// * `options` - Size limit for the materialization
///
/// # Returns
/// * `Err(TooLarge)` if either dimension exceeds `options.max_dim`
pub fn to_dense<T: Scalar>(op: &Operator<T>, options: &DenseOptions) -> Result<Mat<T>, OpError> {
    let (rows, cols) = op.size();
    let dim = rows.max(cols);
    if dim > options.max_dim {
        return Err(OpError::TooLarge { dim, max: options.max_dim });
    }
    if let Operator::Array(array) = op {
        return Ok(array.to_dense());
    }
    let mut columns = Vec::with_capacity(cols);
    let mut e = vec![T::zero(); cols];
    for j in 0..cols {
        e[j] = T::one();
        columns.push(op.apply(&e)?);
        e[j] = T::zero();
    }
    Ok(Mat::from_fn(rows, cols, |i, j| columns[j][i]))
}

/// LU-factorized equivalent of `op`.
///
/// A scaling keeps its coefficient (update rule included) and factorizes only
/// the operator it wraps; identities are already trivially factorized.
/// Anything else is materialized, so the result captures the coefficient
/// values current at the time of the call.
pub fn factorize<T: Scalar + ComplexField>(
    op: &Operator<T>,
    options: &DenseOptions,
) -> Result<Operator<T>, OpError> {
    match op {
        Operator::Identity(_) => Ok(op.clone()),
        Operator::Scaled(scaled) => Ok(scale(
            scaled.coefficient().clone(),
            factorize(scaled.inner(), options)?,
        )),
        other => {
            let (rows, cols) = other.size();
            check_dim(rows, cols)?;
            debug!("factorizing {}x{} operator through a dense LU", rows, cols);
            let lu = DenseLu::new(to_dense(other, options)?)?;
            Ok(ArrayOperator::new(lu).into())
        }
    }
}

/// Solve `op · x = b`, falling back to a dense LU when `op` has no solve.
pub fn solve_dense<T: Scalar + ComplexField>(
    op: &Operator<T>,
    b: &[T],
    options: &DenseOptions,
) -> Result<Vec<T>, OpError> {
    if op.has_solve() {
        return op.solve(b);
    }
    let (rows, cols) = op.size();
    check_dim(rows, cols)?;
    check_dim(rows, b.len())?;
    if op.is_zero() {
        return Err(OpError::Singular);
    }
    debug!("no native solve; dense LU fallback for {}x{} operator", rows, cols);
    DenseLu::new(to_dense(op, options)?)?.solve(b)
}
