use thiserror::Error;

// Unified error type for lazyop

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum OpError {
    #[error("dimension mismatch: expected {expected}, found {found}")]
    DimensionMismatch { expected: usize, found: usize },
    #[error("operator is singular")]
    Singular,
    #[error("unsupported operation: {0}")]
    Unsupported(&'static str),
    #[error("a sum of operators needs at least one term")]
    EmptySum,
    #[error("operator dimension {dim} exceeds the dense limit {max}")]
    TooLarge { dim: usize, max: usize },
}

/// Fails with `DimensionMismatch` unless `found == expected`.
pub(crate) fn check_dim(expected: usize, found: usize) -> Result<(), OpError> {
    if expected == found {
        Ok(())
    } else {
        Err(OpError::DimensionMismatch { expected, found })
    }
}

/// Row count is compared first, then column count.
pub(crate) fn check_shape(expected: (usize, usize), found: (usize, usize)) -> Result<(), OpError> {
    check_dim(expected.0, found.0)?;
    check_dim(expected.1, found.1)
}
