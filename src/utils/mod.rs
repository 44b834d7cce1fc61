//! Utilities: dense materialization and the dense solve fallback.

pub mod dense;
pub use dense::{factorize, solve_dense, to_dense};
