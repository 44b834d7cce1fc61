//! `coefficient × operator`, with nested scalings flattened.

use crate::core::traits::Scalar;
use crate::error::{OpError, check_dim};
use crate::operator::Operator;
use crate::operator::capabilities::Capabilities;
use crate::operator::coefficient::ScalarCoefficient;
use log::trace;

/// A coefficient times an operator.
///
/// The wrapped operator is never itself a `ScaledOperator`: scaling a scaled
/// operator multiplies the coefficients and keeps the original inner operator.
#[derive(Clone, Debug)]
pub struct ScaledOperator<T> {
    coefficient: ScalarCoefficient<T>,
    inner: Box<Operator<T>>,
    caps: Capabilities,
}

impl<T: Scalar> ScaledOperator<T> {
    /// Scale `op` by `coefficient`.
    ///
    /// # Arguments
    /// * `coefficient` - A plain number or a [`ScalarCoefficient`] with an update rule
    /// * `op` - Operator to scale; if it is already scaled the coefficients are
    ///   multiplied and its inner operator is reused
    pub fn new(coefficient: impl Into<ScalarCoefficient<T>>, op: Operator<T>) -> Self {
        let coefficient = coefficient.into();
        match op {
            Operator::Scaled(scaled) => {
                trace!("flattening nested scaling into one coefficient");
                let (existing, inner) = scaled.into_parts();
                Self::from_parts(coefficient * existing, inner)
            }
            other => Self::from_parts(coefficient, other),
        }
    }

    fn from_parts(coefficient: ScalarCoefficient<T>, inner: Operator<T>) -> Self {
        let caps = Self::capabilities_of(&coefficient, &inner);
        Self { coefficient, inner: Box::new(inner), caps }
    }

    fn capabilities_of(coefficient: &ScalarCoefficient<T>, inner: &Operator<T>) -> Capabilities {
        let ic = inner.capabilities();
        let mut caps = ic & (Capabilities::SQUARE | Capabilities::ADJOINT | Capabilities::IN_PLACE_APPLY);
        caps.set(
            Capabilities::CONSTANT,
            ic.contains(Capabilities::CONSTANT) && coefficient.is_constant(),
        );
        caps.set(Capabilities::ZERO, ic.contains(Capabilities::ZERO) || coefficient.is_zero());
        if !coefficient.is_zero() {
            caps |= ic & Capabilities::INVERTIBLE;
        }
        caps
    }

    /// The (possibly combined) coefficient.
    pub fn coefficient(&self) -> &ScalarCoefficient<T> {
        &self.coefficient
    }

    /// The scaled operator; never itself a scaling.
    pub fn inner(&self) -> &Operator<T> {
        &self.inner
    }

    pub fn into_parts(self) -> (ScalarCoefficient<T>, Operator<T>) {
        (self.coefficient, *self.inner)
    }

    pub fn size(&self) -> (usize, usize) {
        self.inner.size()
    }

    pub fn capabilities(&self) -> Capabilities {
        self.caps
    }

    pub fn apply(&self, x: &[T]) -> Result<Vec<T>, OpError> {
        let mut y = self.inner.apply(x)?;
        self.coefficient.apply_in_place(&mut y);
        Ok(y)
    }

    /// Inner apply into `y`, then one scaling pass over `y`.
    pub fn apply_into(&mut self, x: &[T], y: &mut [T]) -> Result<(), OpError> {
        self.inner.apply_into(x, y)?;
        self.coefficient.apply_in_place(y);
        Ok(())
    }

    /// `(λL)⁻¹ b = λ⁻¹ (L⁻¹ b)`.
    ///
    /// Lengths are checked before the coefficient, so a mismatched `b` reports
    /// `DimensionMismatch` even when the coefficient is zero.
    pub fn solve(&self, b: &[T]) -> Result<Vec<T>, OpError> {
        check_dim(self.size().0, b.len())?;
        if self.coefficient.is_zero() {
            return Err(OpError::Singular);
        }
        let mut x = self.inner.solve(b)?;
        self.coefficient.solve_in_place(&mut x)?;
        Ok(x)
    }

    pub fn solve_into(&mut self, b: &[T], x: &mut [T]) -> Result<(), OpError> {
        check_dim(self.size().0, b.len())?;
        check_dim(self.size().1, x.len())?;
        if self.coefficient.is_zero() {
            return Err(OpError::Singular);
        }
        self.inner.solve_into(b, x)?;
        self.coefficient.solve_in_place(x)
    }

    pub fn adjoint(&self) -> Result<Operator<T>, OpError> {
        let inner = self.inner.adjoint()?;
        Ok(Operator::Scaled(ScaledOperator::new(self.coefficient.conj(), inner)))
    }

    pub fn refresh(&mut self, u: &[T], p: &[T], t: T) {
        self.coefficient.refresh(u, p, t);
        self.inner.refresh(u, p, t);
        self.caps = Self::capabilities_of(&self.coefficient, &self.inner);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operator::{ArrayOperator, IdentityOperator};
    use faer::Mat;

    #[test]
    fn nested_scaling_flattens() {
        let a: Operator<f64> = ArrayOperator::from(Mat::from_fn(2, 2, |i, j| (i + j) as f64)).into();
        let once = ScaledOperator::new(2.0, a);
        let twice = ScaledOperator::new(3.0, Operator::Scaled(once));
        assert_eq!(twice.coefficient().value(), 6.0);
        assert!(matches!(twice.inner(), Operator::Array(_)));
    }

    #[test]
    fn in_place_matches_allocating() {
        let mut op = ScaledOperator::<f64>::new(-0.5, IdentityOperator::new(3).into());
        let x = [2.0, 4.0, 6.0];
        let mut y = [0.0; 3];
        op.apply_into(&x, &mut y).unwrap();
        assert_eq!(y.to_vec(), op.apply(&x).unwrap());
        assert_eq!(y, [-1.0, -2.0, -3.0]);
    }

    #[test]
    fn solve_divides_after_inner_solve() {
        let op = ScaledOperator::<f64>::new(4.0, IdentityOperator::new(2).into());
        assert_eq!(op.solve(&[8.0, 2.0]).unwrap(), vec![2.0, 0.5]);
    }

    #[test]
    fn refresh_updates_zero_flag() {
        let coef = ScalarCoefficient::<f64>::with_update(0.0, |_old, _u, _p, t| t);
        let mut op = ScaledOperator::new(coef, IdentityOperator::new(2).into());
        assert!(op.capabilities().contains(Capabilities::ZERO));
        assert_eq!(op.solve(&[1.0, 1.0]), Err(OpError::Singular));
        op.refresh(&[], &[], 2.0);
        assert!(!op.capabilities().contains(Capabilities::ZERO));
        assert!(op.capabilities().contains(Capabilities::SOLVE));
        assert!(!op.capabilities().contains(Capabilities::CONSTANT));
        assert_eq!(op.solve(&[1.0, 1.0]).unwrap(), vec![0.5, 0.5]);
    }

    #[test]
    fn zero_scaling_checks_lengths_before_singularity() {
        let mut op = ScaledOperator::<f64>::new(0.0, IdentityOperator::new(3).into());
        assert_eq!(
            op.solve(&[1.0, 2.0]),
            Err(OpError::DimensionMismatch { expected: 3, found: 2 })
        );
        let mut x = vec![0.0; 2];
        assert_eq!(
            op.solve_into(&[1.0, 2.0, 3.0], &mut x),
            Err(OpError::DimensionMismatch { expected: 3, found: 2 })
        );
        let mut x = vec![0.0; 3];
        assert_eq!(op.solve_into(&[1.0, 2.0, 3.0], &mut x), Err(OpError::Singular));
        assert_eq!(op.solve(&[1.0, 2.0, 3.0]), Err(OpError::Singular));
    }
}
