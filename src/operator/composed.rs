//! Products of operators, `x -> A(B(x))`.

use crate::core::traits::Scalar;
use crate::error::{OpError, check_dim};
use crate::operator::capabilities::Capabilities;
use crate::operator::{NullOperator, Operator, scale};
use log::trace;

/// Flattened product `F₀ F₁ … Fₖ`; `Fₖ` is applied first.
///
/// Two owned buffers carry the intermediate vectors of the in-place paths.
/// They grow to the largest intermediate length and are reused afterwards.
#[derive(Clone, Debug)]
pub struct ComposedOperator<T> {
    factors: Vec<Operator<T>>,
    front: Vec<T>,
    back: Vec<T>,
    caps: Capabilities,
}

/// `outer ∘ inner`.
///
/// Identity factors are absorbed, a null factor turns the whole product into
/// a null operator, scaled factors hoist their coefficient out of the product
/// and nested products are flattened.
pub fn compose<T: Scalar>(outer: Operator<T>, inner: Operator<T>) -> Result<Operator<T>, OpError> {
    check_dim(outer.size().1, inner.size().0)?;
    match (outer, inner) {
        (Operator::Identity(_), op) | (op, Operator::Identity(_)) => Ok(op),
        (a, b) if matches!(a, Operator::Null(_)) || matches!(b, Operator::Null(_)) => {
            trace!("null factor absorbs composition");
            Ok(NullOperator::rect(a.size().0, b.size().1).into())
        }
        (Operator::Scaled(sa), b) => {
            let (coefficient, a) = sa.into_parts();
            Ok(scale(coefficient, compose(a, b)?))
        }
        (a, Operator::Scaled(sb)) => {
            let (coefficient, b) = sb.into_parts();
            Ok(scale(coefficient, compose(a, b)?))
        }
        (a, b) => {
            let mut factors = Vec::new();
            for op in [a, b] {
                match op {
                    Operator::Composed(product) => {
                        trace!("flattening nested product of {} factors", product.factors.len());
                        factors.extend(product.factors);
                    }
                    other => factors.push(other),
                }
            }
            Ok(Operator::Composed(ComposedOperator::from_factors(factors)))
        }
    }
}

/// Left division `a \ b`, the operator `x -> a⁻¹(b(x))`.
///
/// Only the structural cases are simplified: an identity divisor leaves `b`
/// unchanged and a null operand on either side gives a null operator of
/// shape `(a.ncols, b.ncols)`.
///
/// # Arguments
/// * `a` - Divisor; its row count must match `b`'s
/// * `b` - Dividend
///
/// # Returns
/// * `Err(DimensionMismatch)` if `a.nrows != b.nrows`
/// * `Err(Unsupported)` if neither operand is absorbing; use `solve` instead
pub fn left_div<T: Scalar>(a: Operator<T>, b: Operator<T>) -> Result<Operator<T>, OpError> {
    check_dim(a.size().0, b.size().0)?;
    match (a, b) {
        (Operator::Identity(_), b) => Ok(b),
        (a, b) if matches!(a, Operator::Null(_)) || matches!(b, Operator::Null(_)) => {
            trace!("null operand absorbs left division");
            Ok(NullOperator::rect(a.size().1, b.size().1).into())
        }
        _ => Err(OpError::Unsupported("left division by a non-identity operator")),
    }
}

/// Right division `a / b`, the operator `x -> a(b⁻¹(x))`.
///
/// An identity divisor leaves `a` unchanged and a null operand on either side
/// gives a null operator of shape `(a.nrows, b.nrows)`.
///
/// # Returns
/// * `Err(DimensionMismatch)` if `a.ncols != b.ncols`
/// * `Err(Unsupported)` if neither operand is absorbing
pub fn right_div<T: Scalar>(a: Operator<T>, b: Operator<T>) -> Result<Operator<T>, OpError> {
    check_dim(a.size().1, b.size().1)?;
    match (a, b) {
        (a, Operator::Identity(_)) => Ok(a),
        (a, b) if matches!(a, Operator::Null(_)) || matches!(b, Operator::Null(_)) => {
            trace!("null operand absorbs right division");
            Ok(NullOperator::rect(a.size().0, b.size().0).into())
        }
        _ => Err(OpError::Unsupported("right division by a non-identity operator")),
    }
}

impl<T: Scalar> ComposedOperator<T> {
    fn from_factors(factors: Vec<Operator<T>>) -> Self {
        let caps = Self::capabilities_of(&factors);
        Self { factors, front: Vec::new(), back: Vec::new(), caps }
    }

    fn capabilities_of(factors: &[Operator<T>]) -> Capabilities {
        let size = (factors[0].size().0, factors[factors.len() - 1].size().1);
        let mut caps = Capabilities::square_if(size);
        for flag in [
            Capabilities::CONSTANT,
            Capabilities::ADJOINT,
            Capabilities::SOLVE,
            Capabilities::IN_PLACE_APPLY,
            Capabilities::IN_PLACE_SOLVE,
        ] {
            caps.set(flag, factors.iter().all(|f| f.capabilities().contains(flag)));
        }
        caps.set(
            Capabilities::ZERO,
            factors.iter().any(|f| f.capabilities().contains(Capabilities::ZERO)),
        );
        caps
    }

    pub fn factors(&self) -> &[Operator<T>] {
        &self.factors
    }

    pub fn size(&self) -> (usize, usize) {
        (self.factors[0].size().0, self.factors[self.factors.len() - 1].size().1)
    }

    pub fn capabilities(&self) -> Capabilities {
        self.caps
    }

    pub fn apply(&self, x: &[T]) -> Result<Vec<T>, OpError> {
        let mut v = x.to_vec();
        for factor in self.factors.iter().rev() {
            v = factor.apply(&v)?;
        }
        Ok(v)
    }

    pub fn apply_into(&mut self, x: &[T], y: &mut [T]) -> Result<(), OpError> {
        let (rows, cols) = self.size();
        check_dim(cols, x.len())?;
        check_dim(rows, y.len())?;
        let Self { factors, front, back, .. } = self;
        let (outer, rest) = factors.split_first_mut().ok_or(OpError::EmptySum)?;
        let mut started = false;
        for factor in rest.iter_mut().rev() {
            back.resize(factor.size().0, T::zero());
            let input: &[T] = if started { front.as_slice() } else { x };
            factor.apply_into(input, back)?;
            std::mem::swap(front, back);
            started = true;
        }
        let input: &[T] = if started { front.as_slice() } else { x };
        outer.apply_into(input, y)
    }

    /// `(F₀ … Fₖ)⁻¹ b = Fₖ⁻¹ ( … (F₀⁻¹ b))`.
    pub fn solve(&self, b: &[T]) -> Result<Vec<T>, OpError> {
        let mut v = b.to_vec();
        for factor in self.factors.iter() {
            v = factor.solve(&v)?;
        }
        Ok(v)
    }

    pub fn solve_into(&mut self, b: &[T], x: &mut [T]) -> Result<(), OpError> {
        let (rows, cols) = self.size();
        check_dim(rows, b.len())?;
        check_dim(cols, x.len())?;
        let Self { factors, front, back, .. } = self;
        let (last, rest) = factors.split_last_mut().ok_or(OpError::EmptySum)?;
        let mut started = false;
        for factor in rest.iter_mut() {
            back.resize(factor.size().1, T::zero());
            let input: &[T] = if started { front.as_slice() } else { b };
            factor.solve_into(input, back)?;
            std::mem::swap(front, back);
            started = true;
        }
        let input: &[T] = if started { front.as_slice() } else { b };
        last.solve_into(input, x)
    }

    /// `(AB)* = B* A*`.
    pub fn adjoint(&self) -> Result<Operator<T>, OpError> {
        let mut adjoints = self.factors.iter().map(|f| f.adjoint());
        let first = adjoints.next().ok_or(OpError::EmptySum)??;
        adjoints.try_fold(first, |acc, adj| compose(adj?, acc))
    }

    pub fn refresh(&mut self, u: &[T], p: &[T], t: T) {
        for factor in self.factors.iter_mut() {
            factor.refresh(u, p, t);
        }
        self.caps = Self::capabilities_of(&self.factors);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::wrappers::Diagonal;
    use crate::operator::{ArrayOperator, IdentityOperator};
    use faer::Mat;

    fn diag(d: &[f64]) -> Operator<f64> {
        ArrayOperator::new(Diagonal::new(d.to_vec())).into()
    }

    #[test]
    fn identity_is_absorbed() {
        let a = diag(&[1.0, 2.0]);
        let left = compose(IdentityOperator::new(2).into(), a.clone()).unwrap();
        let right = compose(a, IdentityOperator::new(2).into()).unwrap();
        assert!(matches!(left, Operator::Array(_)));
        assert!(matches!(right, Operator::Array(_)));
    }

    #[test]
    fn identity_is_absorbed_under_division() {
        let a = diag(&[1.0, 2.0]);
        let left = left_div(IdentityOperator::new(2).into(), a.clone()).unwrap();
        let right = right_div(a.clone(), IdentityOperator::new(2).into()).unwrap();
        assert!(matches!(left, Operator::Array(_)));
        assert!(matches!(right, Operator::Array(_)));
        assert_eq!(left.apply(&[1.0, 1.0]).unwrap(), vec![1.0, 2.0]);

        assert!(matches!(
            left_div(a.clone(), IdentityOperator::new(2).into()),
            Err(OpError::Unsupported(_))
        ));
        assert!(matches!(right_div(IdentityOperator::new(2).into(), a), Err(OpError::Unsupported(_))));
    }

    #[test]
    fn null_is_absorbed_under_division() {
        let wide: Operator<f64> = ArrayOperator::from(Mat::from_fn(2, 3, |_, _| 1.0)).into();
        let left = left_div(NullOperator::new(2).into(), wide.clone()).unwrap();
        assert!(matches!(left, Operator::Null(_)));
        assert_eq!(left.size(), (2, 3));

        let tall: Operator<f64> = ArrayOperator::from(Mat::from_fn(4, 3, |_, _| 1.0)).into();
        let right = right_div(tall, NullOperator::rect(2, 3).into()).unwrap();
        assert!(matches!(right, Operator::Null(_)));
        assert_eq!(right.size(), (4, 2));
    }

    #[test]
    fn division_dimension_is_checked() {
        let err = left_div(IdentityOperator::new(3).into(), diag(&[1.0, 2.0])).unwrap_err();
        assert_eq!(err, OpError::DimensionMismatch { expected: 3, found: 2 });
        let err = right_div(diag(&[1.0, 2.0]), IdentityOperator::new(3).into()).unwrap_err();
        assert_eq!(err, OpError::DimensionMismatch { expected: 2, found: 3 });
    }

    #[test]
    fn identity_dimension_is_checked() {
        let err = compose(IdentityOperator::new(3).into(), diag(&[1.0, 2.0])).unwrap_err();
        assert_eq!(err, OpError::DimensionMismatch { expected: 3, found: 2 });
    }

    #[test]
    fn null_absorbs_rectangular() {
        let wide: Operator<f64> = ArrayOperator::from(Mat::from_fn(2, 3, |_, _| 1.0)).into();
        let prod = compose(NullOperator::new(2).into(), wide).unwrap();
        assert!(matches!(prod, Operator::Null(_)));
        assert_eq!(prod.size(), (2, 3));
    }

    #[test]
    fn scaling_is_hoisted_and_products_flatten() {
        let ab = compose(scale(2.0, diag(&[1.0, 2.0])), diag(&[3.0, 4.0])).unwrap();
        let abc = compose(ab, scale(0.5, diag(&[5.0, 6.0]))).unwrap();
        let Operator::Scaled(scaled) = &abc else {
            panic!("expected a scaled product, got {:?}", abc);
        };
        assert_eq!(scaled.coefficient().value(), 1.0);
        let Operator::Composed(product) = scaled.inner() else {
            panic!("expected a product inside the scaling");
        };
        assert_eq!(product.factors().len(), 3);
        assert_eq!(abc.apply(&[1.0, 1.0]).unwrap(), vec![15.0, 48.0]);
    }

    #[test]
    fn in_place_paths_match() {
        let mut prod = compose(diag(&[2.0, 4.0]), compose(diag(&[1.0, 3.0]), diag(&[5.0, 7.0])).unwrap()).unwrap();
        let x = [1.0, 1.0];
        let mut y = [0.0; 2];
        prod.apply_into(&x, &mut y).unwrap();
        assert_eq!(y.to_vec(), prod.apply(&x).unwrap());
        let mut back = [0.0; 2];
        prod.solve_into(&y, &mut back).unwrap();
        assert!((back[0] - 1.0).abs() < 1e-12 && (back[1] - 1.0).abs() < 1e-12);
        assert_eq!(prod.solve(&y).unwrap(), back.to_vec());
    }
}
