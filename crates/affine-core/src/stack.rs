//! LayerStack 順伝播（stacked evaluation）
//!
//! 層列を先頭から順に適用する基準実装。
//! 縮約（collapse）側の正しさはこの出力との比較で検証する。
//!
//! ```text
//! H_0 = X                  [n][d_in]
//! H_{i+1} = H_i @ W_i + b_i
//! Y = H_L                  [n][d_out]
//! ```

use crate::error::{AffineError, AffineResult};
use crate::sequence::LayerSequence;
use crate::tensor::Matrix;

// =============================================================================
// Forward
// =============================================================================

/// 層列の順伝播
///
/// `batch.cols() != seq.input_dim()` の場合は `DimensionMismatch`。
/// 入力は変更しない。
pub fn forward(batch: &Matrix, seq: &LayerSequence) -> AffineResult<Matrix> {
    check_batch(batch, seq)?;

    let mut h: Option<Matrix> = None;
    for (i, layer) in seq.iter().enumerate() {
        let input = h.as_ref().unwrap_or(batch);
        let next = layer.forward(input)?;
        log::trace!("layer {i}: {:?} -> {:?}", input.shape(), next.shape());
        h = Some(next);
    }
    // LayerSequence は空にならない
    h.ok_or(AffineError::EmptySequence)
}

/// 中間出力を全て返す順伝播
///
/// 戻り値は `[H_1, ..., H_L]`（入力 `H_0` は含まない）。
pub fn forward_trace(batch: &Matrix, seq: &LayerSequence) -> AffineResult<Vec<Matrix>> {
    check_batch(batch, seq)?;

    let mut outputs: Vec<Matrix> = Vec::with_capacity(seq.num_layers());
    for (i, layer) in seq.iter().enumerate() {
        let input = outputs.last().unwrap_or(batch);
        let h = layer.forward(input)?;
        log::trace!("layer {i}: {:?} -> {:?}", input.shape(), h.shape());
        outputs.push(h);
    }
    Ok(outputs)
}

fn check_batch(batch: &Matrix, seq: &LayerSequence) -> AffineResult<()> {
    if batch.cols() != seq.input_dim() {
        return Err(AffineError::DimensionMismatch {
            context: "batch width",
            expected: seq.input_dim(),
            actual: batch.cols(),
        });
    }
    Ok(())
}

// =============================================================================
// LayerStack
// =============================================================================

/// 層列を保持し、バッチの順伝播を行う
#[derive(Clone, Debug)]
pub struct LayerStack {
    sequence: LayerSequence,
}

impl LayerStack {
    pub fn new(sequence: LayerSequence) -> Self {
        Self { sequence }
    }

    #[inline]
    pub fn sequence(&self) -> &LayerSequence {
        &self.sequence
    }

    #[inline]
    pub fn input_dim(&self) -> usize {
        self.sequence.input_dim()
    }

    #[inline]
    pub fn output_dim(&self) -> usize {
        self.sequence.output_dim()
    }

    /// `[n][d_in]` → `[n][d_out]`
    pub fn forward(&self, batch: &Matrix) -> AffineResult<Matrix> {
        forward(batch, &self.sequence)
    }

    pub fn forward_trace(&self, batch: &Matrix) -> AffineResult<Vec<Matrix>> {
        forward_trace(batch, &self.sequence)
    }

    pub fn into_sequence(self) -> LayerSequence {
        self.sequence
    }
}

impl From<LayerSequence> for LayerStack {
    fn from(sequence: LayerSequence) -> Self {
        Self::new(sequence)
    }
}
