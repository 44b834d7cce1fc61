//! Combinators that build operator expressions.
//!
//! Shape-changing combinators return `Result` because shapes are checked when
//! the expression is built, never later during apply. Scaling cannot fail and
//! is also available through `*` and unary `-`.
//!
//! # Usage
//! - `scale(alpha, a)` or `alpha * a` for a (possibly time-dependent) scaling.
//! - `add(vec![a, b, c])` for a flat sum; `sub(a, b)` for `a - b`.
//! - `add_scalar(a, lambda)` for the shift `a + λI` of a square operator.
//! - `compose(a, b)`, `left_div` and `right_div` live in [`super::composed`].

use crate::core::traits::{ArrayLike, Scalar};
use crate::error::{OpError, check_dim};
use crate::operator::{AddedOperator, ArrayOperator, IdentityOperator, Operator, ScalarCoefficient, ScaledOperator};
use std::ops::{Mul, Neg};

/// `coefficient × op`. Scaling a scaled operator multiplies the coefficients.
pub fn scale<T: Scalar>(coefficient: impl Into<ScalarCoefficient<T>>, op: Operator<T>) -> Operator<T> {
    Operator::Scaled(ScaledOperator::new(coefficient, op))
}

/// `-op`, i.e. `scale(-1, op)`.
pub fn neg<T: Scalar>(op: Operator<T>) -> Operator<T> {
    scale(-T::one(), op)
}

/// Lazy sum of `ops`, flattening nested sums.
///
/// # Arguments
/// * `ops` - Operands of identical shape
///
/// # Returns
/// * The lone operand unchanged when `ops` has one element
/// * `Operator::Added` otherwise
/// * `Err(EmptySum)` or `Err(DimensionMismatch)` from [`AddedOperator::new`]
pub fn add<T: Scalar>(mut ops: Vec<Operator<T>>) -> Result<Operator<T>, OpError> {
    if ops.len() == 1 {
        return Ok(ops.remove(0));
    }
    AddedOperator::new(ops).map(Operator::Added)
}

/// `a - b = a + (-1)·b`.
pub fn sub<T: Scalar>(a: Operator<T>, b: Operator<T>) -> Result<Operator<T>, OpError> {
    add(vec![a, neg(b)])
}

/// `op + λ·I`. Only defined for square operators.
///
/// # Returns
/// * `Err(DimensionMismatch { expected: rows, found: cols })` for a rectangular `op`
pub fn add_scalar<T: Scalar>(
    op: Operator<T>,
    lambda: impl Into<ScalarCoefficient<T>>,
) -> Result<Operator<T>, OpError> {
    let (rows, cols) = op.size();
    check_dim(rows, cols)?;
    add(vec![op, scale(lambda, IdentityOperator::new(rows).into())])
}

/// `op + A` for a concrete backing array `A`.
pub fn add_array<T: Scalar, A: ArrayLike<T> + 'static>(op: Operator<T>, array: A) -> Result<Operator<T>, OpError> {
    add(vec![op, ArrayOperator::new(array).into()])
}

impl<T: Scalar> Neg for Operator<T> {
    type Output = Operator<T>;
    fn neg(self) -> Self::Output {
        neg(self)
    }
}

impl<T: Scalar> Mul<T> for Operator<T> {
    type Output = Operator<T>;
    fn mul(self, rhs: T) -> Self::Output {
        scale(rhs, self)
    }
}

impl<T: Scalar> Mul<Operator<T>> for ScalarCoefficient<T> {
    type Output = Operator<T>;
    fn mul(self, rhs: Operator<T>) -> Self::Output {
        scale(self, rhs)
    }
}

macro_rules! number_times_operator {
    ($($t:ty),*) => {$(
        impl Mul<Operator<$t>> for $t {
            type Output = Operator<$t>;
            fn mul(self, rhs: Operator<$t>) -> Self::Output {
                scale(self, rhs)
            }
        }
    )*};
}

number_times_operator!(f32, f64);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::wrappers::Diagonal;
    use crate::operator::NullOperator;
    use faer::Mat;

    fn diag(d: &[f64]) -> Operator<f64> {
        ArrayOperator::new(Diagonal::new(d.to_vec())).into()
    }

    #[test]
    fn lone_operand_passes_through() {
        let op = add(vec![diag(&[1.0, 2.0])]).unwrap();
        assert!(matches!(op, Operator::Array(_)));
        assert!(matches!(add::<f64>(vec![]), Err(OpError::EmptySum)));
    }

    #[test]
    fn sub_negates_second_operand() {
        let op = sub(diag(&[3.0, 3.0]), diag(&[1.0, 2.0])).unwrap();
        assert_eq!(op.apply(&[1.0, 1.0]).unwrap(), vec![2.0, 1.0]);
        let Operator::Added(sum) = &op else { panic!("expected a sum") };
        assert!(matches!(sum.terms()[1], Operator::Scaled(_)));
    }

    #[test]
    fn scalar_shift_needs_square() {
        let shifted = add_scalar(diag(&[1.0, 2.0]), 10.0).unwrap();
        assert_eq!(shifted.apply(&[1.0, 1.0]).unwrap(), vec![11.0, 12.0]);

        let wide: Operator<f64> = Mat::from_fn(2, 3, |_, _| 1.0).into();
        assert_eq!(
            add_scalar(wide, 1.0).unwrap_err(),
            OpError::DimensionMismatch { expected: 2, found: 3 }
        );
    }

    #[test]
    fn array_is_wrapped_before_adding() {
        let op = add_array(IdentityOperator::new(2).into(), Diagonal::new(vec![1.0, -1.0])).unwrap();
        assert_eq!(op.apply(&[2.0, 2.0]).unwrap(), vec![4.0, 0.0]);
    }

    #[test]
    fn operator_overloads_scale() {
        let op = -(2.0 * diag(&[1.0, 2.0])) * 3.0;
        let Operator::Scaled(scaled) = &op else { panic!("expected a scaling") };
        assert_eq!(scaled.coefficient().value(), -6.0);
        assert!(matches!(scaled.inner(), Operator::Array(_)));

        let null: Operator<f64> = NullOperator::new(2).into();
        assert!((ScalarCoefficient::new(5.0) * null).is_zero());
    }
}
