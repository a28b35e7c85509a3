//! Error types for affine evaluation
//!
//! Shape errors are fatal to the operation that raised them. An
//! `EquivalenceViolated` means the stacked and collapsed paths disagreed and
//! the run must not continue.

/// Affine-evaluation errors
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum AffineError {
    /// Inner dimensions of an operation do not line up
    #[error("Dimension mismatch in {context}: expected {expected}, got {actual}")]
    DimensionMismatch { context: &'static str, expected: usize, actual: usize },

    /// Raw buffer length does not fill the requested matrix shape
    #[error("Shape mismatch: {len} elements do not fill a {rows}x{cols} matrix")]
    ShapeMismatch { rows: usize, cols: usize, len: usize },

    /// A layer sequence must hold at least one layer
    #[error("Layer sequence is empty")]
    EmptySequence,

    /// Stacked and collapsed outputs differ beyond tolerance
    #[error(
        "Equivalence violated: max abs diff {max_abs_diff:.3e} exceeds tolerance (atol={atol:e}, rtol={rtol:e})"
    )]
    EquivalenceViolated { max_abs_diff: f64, atol: f64, rtol: f64 },

    /// Tolerance parameters must be finite and non-negative
    #[error("Invalid tolerance: atol={atol}, rtol={rtol}")]
    InvalidTolerance { atol: f64, rtol: f64 },

    /// Softmax of an empty vector
    #[error("Empty input")]
    EmptyInput,

    /// NaN or infinity in the input
    #[error("Non-finite value at index {index}: {value}")]
    NonFinite { index: usize, value: f64 },
}

/// Result type for affine operations
pub type AffineResult<T> = Result<T, AffineError>;
