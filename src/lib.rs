//! lazyop: matrix-free, lazily composed linear operators over Faer
//!
//! This crate provides an operator algebra for ODE/PDE integrators and linear solvers:
//! identities, null operators, scalings, sums and products built on top of dense or
//! user-supplied backing arrays, with allocation-free in-place application and
//! coefficients that can be refreshed between solver steps.

pub mod config;
pub mod core;
pub mod error;
pub mod operator;
pub mod utils;

// Re-exports for convenience
pub use config::*;
pub use self::core::*;
pub use error::*;
pub use operator::*;
pub use utils::*;

pub use operator::capabilities::{
    element_type, has_adjoint, has_in_place_apply, has_in_place_solve, has_solve, is_constant,
    is_square, is_zero, size,
};
