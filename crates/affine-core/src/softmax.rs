//! Softmax
//!
//! `softmax(x)_i = exp(x_i - max(x)) / Σ_j exp(x_j - max(x))`
//!
//! Subtracting the max keeps every exponent <= 0, so `exp` cannot overflow and
//! at least one term of the denominator is exactly 1.

use crate::error::{AffineError, AffineResult};
use crate::tensor::Vector;
use ndarray::ArrayView1;

/// Numerically stabilised softmax over a 1-D logit vector
pub fn softmax(logits: &[f64]) -> AffineResult<Vector> {
    if logits.is_empty() {
        return Err(AffineError::EmptyInput);
    }
    if let Some((index, &value)) = logits.iter().enumerate().find(|(_, v)| !v.is_finite()) {
        return Err(AffineError::NonFinite { index, value });
    }

    let x = ArrayView1::from(logits);
    let max = x.fold(f64::NEG_INFINITY, |m, &v| m.max(v));
    let exps = x.mapv(|v| (v - max).exp());
    let sum = exps.sum();

    Ok(Vector::from(exps / sum))
}
