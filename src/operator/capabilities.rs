//! Capability record and the free trait queries over operators.
//!
//! Every operator variant stores a [`Capabilities`] set, computed from its
//! children when it is built and recomputed after a refresh. Generic solver
//! code asks these questions (constant? square? invertible?) through the free
//! functions below instead of inspecting the operator's variant.

use crate::core::traits::Scalar;
use crate::operator::Operator;
use bitflags::bitflags;

bitflags! {
    #[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
    pub struct Capabilities: u8 {
        const CONSTANT       = 0b0000_0001;
        const ZERO           = 0b0000_0010;
        const SQUARE         = 0b0000_0100;
        const ADJOINT        = 0b0000_1000;
        const SOLVE          = 0b0001_0000;
        const IN_PLACE_APPLY = 0b0010_0000;
        const IN_PLACE_SOLVE = 0b0100_0000;
        const INVERTIBLE     = Self::SOLVE.bits() | Self::IN_PLACE_SOLVE.bits();
    }
}

impl Capabilities {
    /// `SQUARE` when `rows == cols`, empty otherwise.
    pub fn square_if(size: (usize, usize)) -> Self {
        if size.0 == size.1 { Capabilities::SQUARE } else { Capabilities::empty() }
    }
}

/// `(rows, cols)`.
pub fn size<T: Scalar>(op: &Operator<T>) -> (usize, usize) {
    op.size()
}

/// Name of the scalar type the operator acts on.
pub fn element_type<T: Scalar>(_op: &Operator<T>) -> &'static str {
    std::any::type_name::<T>()
}

pub fn is_constant<T: Scalar>(op: &Operator<T>) -> bool {
    op.capabilities().contains(Capabilities::CONSTANT)
}

pub fn is_zero<T: Scalar>(op: &Operator<T>) -> bool {
    op.capabilities().contains(Capabilities::ZERO)
}

pub fn is_square<T: Scalar>(op: &Operator<T>) -> bool {
    op.capabilities().contains(Capabilities::SQUARE)
}

pub fn has_adjoint<T: Scalar>(op: &Operator<T>) -> bool {
    op.capabilities().contains(Capabilities::ADJOINT)
}

pub fn has_in_place_apply<T: Scalar>(op: &Operator<T>) -> bool {
    op.capabilities().contains(Capabilities::IN_PLACE_APPLY)
}

pub fn has_solve<T: Scalar>(op: &Operator<T>) -> bool {
    op.capabilities().contains(Capabilities::SOLVE)
}

pub fn has_in_place_solve<T: Scalar>(op: &Operator<T>) -> bool {
    op.capabilities().contains(Capabilities::IN_PLACE_SOLVE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operator::{IdentityOperator, NullOperator, scale};

    #[test]
    fn leaf_queries() {
        let id: Operator<f64> = IdentityOperator::new(4).into();
        assert_eq!(size(&id), (4, 4));
        assert!(is_constant(&id) && is_square(&id) && has_solve(&id));
        assert!(!is_zero(&id));
        assert_eq!(element_type(&id), "f64");

        let null: Operator<f64> = NullOperator::new(4).into();
        assert!(is_zero(&null) && !has_solve(&null) && has_in_place_apply(&null));
    }

    #[test]
    fn zero_coefficient_drops_solve() {
        let op: Operator<f64> = scale(0.0, IdentityOperator::new(2).into());
        assert!(is_zero(&op));
        assert!(!has_solve(&op) && !has_in_place_solve(&op));
        assert!(has_adjoint(&op));
    }

    #[test]
    fn square_if() {
        assert_eq!(Capabilities::square_if((3, 3)), Capabilities::SQUARE);
        assert!(Capabilities::square_if((3, 2)).is_empty());
    }
}
