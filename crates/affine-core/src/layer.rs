//! アフィン層
//!
//! `H' = H @ W + b`（活性化なし）

use crate::error::{AffineError, AffineResult};
use crate::tensor::{Matrix, Vector};

/// アフィン層（重み + バイアス）
///
/// - `weight`: `[in_dim][out_dim]`（row-major）
/// - `bias`: `[out_dim]`
#[derive(Clone, Debug, PartialEq)]
pub struct AffineLayer {
    weight: Matrix,
    bias: Vector,
}

impl AffineLayer {
    /// 新規作成
    ///
    /// `bias.len() != weight.cols()` の場合は `DimensionMismatch`。
    pub fn new(weight: Matrix, bias: Vector) -> AffineResult<Self> {
        if bias.len() != weight.cols() {
            return Err(AffineError::DimensionMismatch {
                context: "layer bias length",
                expected: weight.cols(),
                actual: bias.len(),
            });
        }
        Ok(Self { weight, bias })
    }

    /// ゼロ初期化
    pub fn zeros(in_dim: usize, out_dim: usize) -> Self {
        Self { weight: Matrix::zeros(in_dim, out_dim), bias: Vector::zeros(out_dim) }
    }

    #[inline]
    pub fn in_dim(&self) -> usize {
        self.weight.rows()
    }

    #[inline]
    pub fn out_dim(&self) -> usize {
        self.weight.cols()
    }

    #[inline]
    pub fn weight(&self) -> &Matrix {
        &self.weight
    }

    #[inline]
    pub fn bias(&self) -> &Vector {
        &self.bias
    }

    pub fn into_parts(self) -> (Matrix, Vector) {
        (self.weight, self.bias)
    }

    /// 順伝播
    ///
    /// `input` は `[n][in_dim]`、戻り値は `[n][out_dim]`。
    pub fn forward(&self, input: &Matrix) -> AffineResult<Matrix> {
        if input.cols() != self.in_dim() {
            return Err(AffineError::DimensionMismatch {
                context: "layer input width",
                expected: self.in_dim(),
                actual: input.cols(),
            });
        }
        input.matmul(&self.weight)?.add_row_broadcast(&self.bias)
    }

    /// パラメータ数
    pub fn param_count(&self) -> usize {
        self.in_dim() * self.out_dim() + self.out_dim()
    }
}
