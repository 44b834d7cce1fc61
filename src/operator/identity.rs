//! Dimensioned neutral and absorbing elements of the operator algebra.

use crate::core::traits::Scalar;
use crate::error::{OpError, check_dim};
use crate::operator::capabilities::Capabilities;

/// The `n × n` identity. Carries its size only.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct IdentityOperator {
    n: usize,
}

impl IdentityOperator {
    /// The `n × n` identity.
    pub fn new(n: usize) -> Self {
        Self { n }
    }

    /// Identity sized to match `x`.
    pub fn like<T>(x: &[T]) -> Self {
        Self::new(x.len())
    }

    /// Side length `n`.
    pub fn dim(&self) -> usize {
        self.n
    }

    pub fn size(&self) -> (usize, usize) {
        (self.n, self.n)
    }

    pub fn capabilities(&self) -> Capabilities {
        Capabilities::CONSTANT
            | Capabilities::SQUARE
            | Capabilities::ADJOINT
            | Capabilities::SOLVE
            | Capabilities::IN_PLACE_APPLY
            | Capabilities::IN_PLACE_SOLVE
    }

    /// Returns a copy of `x`; never aliases the caller's storage.
    pub fn apply<T: Scalar>(&self, x: &[T]) -> Result<Vec<T>, OpError> {
        check_dim(self.n, x.len())?;
        Ok(x.to_vec())
    }

    pub fn apply_into<T: Scalar>(&self, x: &[T], y: &mut [T]) -> Result<(), OpError> {
        check_dim(self.n, x.len())?;
        check_dim(self.n, y.len())?;
        y.copy_from_slice(x);
        Ok(())
    }

    pub fn solve<T: Scalar>(&self, b: &[T]) -> Result<Vec<T>, OpError> {
        self.apply(b)
    }

    pub fn solve_into<T: Scalar>(&self, b: &[T], x: &mut [T]) -> Result<(), OpError> {
        self.apply_into(b, x)
    }
}

/// The zero map from length-`cols` vectors to length-`rows` vectors.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct NullOperator {
    rows: usize,
    cols: usize,
}

impl NullOperator {
    /// The square `n × n` null operator.
    pub fn new(n: usize) -> Self {
        Self::rect(n, n)
    }

    /// The `rows × cols` null operator, as produced by absorbing products.
    pub fn rect(rows: usize, cols: usize) -> Self {
        Self { rows, cols }
    }

    /// Square null operator sized to match `x`.
    pub fn like<T>(x: &[T]) -> Self {
        Self::new(x.len())
    }

    pub fn size(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    pub fn capabilities(&self) -> Capabilities {
        let mut caps = Capabilities::CONSTANT
            | Capabilities::ZERO
            | Capabilities::ADJOINT
            | Capabilities::IN_PLACE_APPLY;
        caps.set(Capabilities::SQUARE, self.rows == self.cols);
        caps
    }

    pub fn apply<T: Scalar>(&self, x: &[T]) -> Result<Vec<T>, OpError> {
        check_dim(self.cols, x.len())?;
        Ok(vec![T::zero(); self.rows])
    }

    pub fn apply_into<T: Scalar>(&self, x: &[T], y: &mut [T]) -> Result<(), OpError> {
        check_dim(self.cols, x.len())?;
        check_dim(self.rows, y.len())?;
        y.fill(T::zero());
        Ok(())
    }

    /// Same operator with rows and columns swapped.
    pub fn adjoint(&self) -> Self {
        Self::rect(self.cols, self.rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_copies() {
        let id = IdentityOperator::new(3);
        let u = vec![1.0, 2.0, 3.0];
        let v = id.apply(&u).unwrap();
        assert_eq!(v, u);
        assert_ne!(v.as_ptr(), u.as_ptr());
        let mut w = vec![0.0; 3];
        id.solve_into(&u, &mut w).unwrap();
        assert_eq!(w, u);
    }

    #[test]
    fn identity_checks_length() {
        let id = IdentityOperator::new(3);
        assert_eq!(
            id.apply(&[1.0, 2.0]),
            Err(OpError::DimensionMismatch { expected: 3, found: 2 })
        );
    }

    #[test]
    fn null_zeroes() {
        let null = NullOperator::like(&[0.0; 4]);
        assert_eq!(null.apply(&[1.0, 2.0, 3.0, 4.0]).unwrap(), vec![0.0; 4]);
        let mut y = vec![7.0; 4];
        null.apply_into(&[1.0; 4], &mut y).unwrap();
        assert_eq!(y, vec![0.0; 4]);
        assert!(!null.capabilities().contains(Capabilities::SOLVE));
    }

    #[test]
    fn rectangular_null_adjoint() {
        let null = NullOperator::rect(2, 5);
        assert!(!null.capabilities().contains(Capabilities::SQUARE));
        assert_eq!(null.adjoint().size(), (5, 2));
        assert_eq!(null.apply(&[1.0f32; 5]).unwrap(), vec![0.0f32; 2]);
    }
}
