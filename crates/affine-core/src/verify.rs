//! stacked / collapsed の等価性検証
//!
//! 判定は `|stacked - collapsed| <= atol + rtol * |collapsed|`（要素ごと）。
//! 1 要素でも外れれば `EquivalenceViolated` を返し、呼び出し側は処理を中断する。

use crate::collapse::{collapse, CollapsedAffine};
use crate::error::{AffineError, AffineResult};
use crate::sequence::LayerSequence;
use crate::stack::forward;
use crate::tensor::Matrix;
use ndarray::{Axis, Zip};
use serde::{Deserialize, Serialize};

/// 既定の絶対許容誤差
pub const DEFAULT_ATOL: f64 = 1e-10;
/// 既定の相対許容誤差（numpy `allclose` と同じ）
pub const DEFAULT_RTOL: f64 = 1e-5;

/// `scaled_for` で見積もった誤差上限に掛ける余裕係数
const SCALED_SAFETY: f64 = 16.0;

/// 許容誤差
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Tolerance {
    pub atol: f64,
    pub rtol: f64,
}

impl Default for Tolerance {
    fn default() -> Self {
        Self { atol: DEFAULT_ATOL, rtol: DEFAULT_RTOL }
    }
}

impl Tolerance {
    /// 検査付き作成
    pub fn new(atol: f64, rtol: f64) -> AffineResult<Self> {
        let tol = Self { atol, rtol };
        tol.validate()?;
        Ok(tol)
    }

    /// 絶対誤差のみで判定
    pub fn absolute(atol: f64) -> AffineResult<Self> {
        Self::new(atol, 0.0)
    }

    pub fn validate(&self) -> AffineResult<()> {
        let ok = |v: f64| v.is_finite() && v >= 0.0;
        if !ok(self.atol) || !ok(self.rtol) {
            return Err(AffineError::InvalidTolerance { atol: self.atol, rtol: self.rtol });
        }
        Ok(())
    }

    /// 層列とバッチの規模から絶対許容誤差を見積もる
    ///
    /// 行列積の丸め誤差は積和の長さと途中値の大きさに比例して増える。
    /// 各層で `|h| <= |h| * max_j Σ_k |W[k][j]| + max|b|` として途中値の上限を追い、
    /// `eps * Σ in_dim * 上限 * SCALED_SAFETY` を atol とする。rtol は 0。
    pub fn scaled_for(seq: &LayerSequence, batch: &Matrix) -> Self {
        let mut magnitude = batch.max_abs().max(1.0);
        let mut accum_len = 0usize;

        for layer in seq {
            magnitude = magnitude * max_col_abs_sum(layer.weight()).max(1.0) + layer.bias().max_abs();
            accum_len += layer.in_dim();
        }

        let atol = f64::EPSILON * accum_len.max(1) as f64 * magnitude * SCALED_SAFETY;
        Self { atol, rtol: 0.0 }
    }

    /// 1 要素の判定
    #[inline]
    pub fn accepts(&self, actual: f64, expected: f64) -> bool {
        (actual - expected).abs() <= self.atol + self.rtol * expected.abs()
    }
}

fn max_col_abs_sum(m: &Matrix) -> f64 {
    m.view().mapv(f64::abs).sum_axis(Axis(0)).fold(0.0, |acc, &s| acc.max(s))
}

/// 2 つの出力が許容誤差内で一致するか
///
/// 形状が違えば `DimensionMismatch`。
pub fn allclose(actual: &Matrix, expected: &Matrix, tol: &Tolerance) -> AffineResult<bool> {
    actual.check_same_shape(expected)?;
    Ok(Zip::from(actual.view()).and(expected.view()).all(|&a, &e| tol.accepts(a, e)))
}

/// 検証結果
#[derive(Clone, Debug)]
pub struct EquivalenceReport {
    /// 層を順に適用した出力
    pub stacked: Matrix,
    /// 縮約したアフィン変換
    pub collapsed: CollapsedAffine,
    /// 縮約側の出力
    pub collapsed_output: Matrix,
    pub max_abs_diff: f64,
    pub tolerance: Tolerance,
}

/// 2 経路の出力を比較
///
/// 許容誤差を超えた場合は `EquivalenceViolated`。成功時は最大絶対誤差を返す。
pub fn compare_outputs(stacked: &Matrix, collapsed: &Matrix, tol: &Tolerance) -> AffineResult<f64> {
    tol.validate()?;
    let max_abs_diff = stacked.max_abs_diff(collapsed)?;
    if !allclose(stacked, collapsed, tol)? {
        log::error!("stacked/collapsed mismatch: max abs diff {max_abs_diff:.3e}");
        return Err(AffineError::EquivalenceViolated {
            max_abs_diff,
            atol: tol.atol,
            rtol: tol.rtol,
        });
    }
    Ok(max_abs_diff)
}

/// stacked 評価と collapsed 評価を両方実行して比較
pub fn verify_equivalence(
    batch: &Matrix,
    seq: &LayerSequence,
    tol: &Tolerance,
) -> AffineResult<EquivalenceReport> {
    let stacked = forward(batch, seq)?;
    let collapsed = collapse(seq)?;
    let collapsed_output = collapsed.evaluate(batch)?;

    let max_abs_diff = compare_outputs(&stacked, &collapsed_output, tol)?;
    log::info!(
        "stacked and collapsed outputs agree: {} layers, max abs diff {:.3e}",
        seq.num_layers(),
        max_abs_diff
    );

    Ok(EquivalenceReport { stacked, collapsed, collapsed_output, max_abs_diff, tolerance: *tol })
}
