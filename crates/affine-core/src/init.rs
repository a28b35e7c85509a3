//! 乱数による層・バッチの初期化
//!
//! 乱数生成器は呼び出し側から渡す。グローバルな乱数状態は持たない。
//! 値は全て平均 0 の正規分布から引く。

use crate::error::{AffineError, AffineResult};
use crate::layer::AffineLayer;
use crate::sequence::LayerSequence;
use crate::tensor::{Matrix, Vector};
use rand::Rng;
use rand_distr::StandardNormal;
use serde::{Deserialize, Serialize};

/// 重み・バイアスの既定スケール（標準偏差）
pub const DEFAULT_INIT_SCALE: f64 = 0.5;

/// 初期化設定
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct InitConfig {
    /// 重み・バイアスの標準偏差
    pub scale: f64,
}

impl Default for InitConfig {
    fn default() -> Self {
        Self { scale: DEFAULT_INIT_SCALE }
    }
}

#[inline]
fn normal<R: Rng + ?Sized>(rng: &mut R, scale: f64) -> f64 {
    rng.sample::<f64, _>(StandardNormal) * scale
}

/// `N(0, scale²)` の行列
pub fn random_matrix<R: Rng + ?Sized>(rng: &mut R, rows: usize, cols: usize, scale: f64) -> Matrix {
    Matrix::from_fn(rows, cols, |_, _| normal(rng, scale))
}

/// `N(0, scale²)` のベクトル
pub fn random_vector<R: Rng + ?Sized>(rng: &mut R, len: usize, scale: f64) -> Vector {
    Vector::new((0..len).map(|_| normal(rng, scale)).collect())
}

/// 乱数層（重み → バイアスの順に引く）
pub fn random_layer<R: Rng + ?Sized>(
    rng: &mut R,
    in_dim: usize,
    out_dim: usize,
    cfg: &InitConfig,
) -> AffineResult<AffineLayer> {
    let weight = random_matrix(rng, in_dim, out_dim, cfg.scale);
    let bias = random_vector(rng, out_dim, cfg.scale);
    AffineLayer::new(weight, bias)
}

/// `dims = [d_in, h_1, ..., d_out]` の乱数層列
///
/// `dims.len() < 2` の場合は `EmptySequence`。
pub fn random_sequence<R: Rng + ?Sized>(
    rng: &mut R,
    dims: &[usize],
    cfg: &InitConfig,
) -> AffineResult<LayerSequence> {
    if dims.len() < 2 {
        return Err(AffineError::EmptySequence);
    }
    let layers = dims
        .windows(2)
        .map(|w| random_layer(rng, w[0], w[1], cfg))
        .collect::<AffineResult<Vec<_>>>()?;
    LayerSequence::new(layers)
}

/// 標準正規分布のバッチ `[n_samples][d_in]`
pub fn random_batch<R: Rng + ?Sized>(rng: &mut R, n_samples: usize, d_in: usize) -> Matrix {
    random_matrix(rng, n_samples, d_in, 1.0)
}

/// `[d_in, hidden..., d_out]` を組み立てる
pub fn layer_dims(d_in: usize, hidden: &[usize], d_out: usize) -> Vec<usize> {
    std::iter::once(d_in).chain(hidden.iter().copied()).chain(std::iter::once(d_out)).collect()
}
