//! Configuration for operator evaluation.

pub mod options;
pub use options::{DenseOptions, EvalOptions};
