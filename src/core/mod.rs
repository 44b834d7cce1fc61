//! Core scalar and backing-store abstractions.

pub mod traits;
pub mod wrappers;

pub use traits::{ArrayLike, Scalar};
pub use wrappers::{DenseLu, Diagonal};
