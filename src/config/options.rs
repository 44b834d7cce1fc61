//! API options for operator evaluation.
//!
//! `EvalOptions` is carried by every sum of operators and controls how its
//! terms are accumulated. `DenseOptions` bounds the dense fallback used when
//! an operator expression has no native solve and must be materialized.

/// Evaluation switches for lazily summed operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EvalOptions {
    /// Skip terms that report `is_zero` instead of applying them.
    pub skip_zero_terms: bool,
}

impl Default for EvalOptions {
    fn default() -> Self {
        Self { skip_zero_terms: true }
    }
}

/// Limits for materializing an operator into a dense matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DenseOptions {
    /// Largest row or column count that may be materialized.
    pub max_dim: usize,
}

impl Default for DenseOptions {
    fn default() -> Self {
        Self { max_dim: 2048 }
    }
}
