//! 層列（LayerSequence）
//!
//! 重みとバイアスを対にした `AffineLayer` の順序付き列。
//! 先頭の層から順に適用される。
//!
//! # 不変条件
//!
//! - 1 層以上
//! - `layers[i].out_dim() == layers[i + 1].in_dim()`
//!
//! いずれも構築時に検査するため、構築済みの `LayerSequence` は常に整合している。

use crate::error::{AffineError, AffineResult};
use crate::layer::AffineLayer;

/// 次元が連鎖した層列
#[derive(Clone, Debug, PartialEq)]
pub struct LayerSequence {
    layers: Vec<AffineLayer>,
}

impl LayerSequence {
    /// 層のリストから作成
    ///
    /// 空なら `EmptySequence`、連鎖が崩れていれば `DimensionMismatch`。
    pub fn new(layers: Vec<AffineLayer>) -> AffineResult<Self> {
        if layers.is_empty() {
            return Err(AffineError::EmptySequence);
        }
        for pair in layers.windows(2) {
            check_chain(&pair[0], &pair[1])?;
        }
        Ok(Self { layers })
    }

    /// 1 層のみの列
    pub fn single(layer: AffineLayer) -> Self {
        Self { layers: vec![layer] }
    }

    /// 末尾に層を追加
    pub fn push(&mut self, layer: AffineLayer) -> AffineResult<()> {
        if let Some(last) = self.layers.last() {
            check_chain(last, &layer)?;
        }
        self.layers.push(layer);
        Ok(())
    }

    #[inline]
    pub fn layers(&self) -> &[AffineLayer] {
        &self.layers
    }

    pub fn iter(&self) -> std::slice::Iter<'_, AffineLayer> {
        self.layers.iter()
    }

    #[inline]
    pub fn num_layers(&self) -> usize {
        self.layers.len()
    }

    /// 全体の入力次元（先頭層の in_dim）
    #[inline]
    pub fn input_dim(&self) -> usize {
        self.layers[0].in_dim()
    }

    /// 全体の出力次元（末尾層の out_dim）
    #[inline]
    pub fn output_dim(&self) -> usize {
        self.layers[self.layers.len() - 1].out_dim()
    }

    /// `[d_in, h_1, ..., d_out]`
    pub fn dims(&self) -> Vec<usize> {
        std::iter::once(self.input_dim()).chain(self.layers.iter().map(|l| l.out_dim())).collect()
    }

    pub fn param_count(&self) -> usize {
        self.layers.iter().map(AffineLayer::param_count).sum()
    }

    pub fn into_layers(self) -> Vec<AffineLayer> {
        self.layers
    }
}

impl<'a> IntoIterator for &'a LayerSequence {
    type Item = &'a AffineLayer;
    type IntoIter = std::slice::Iter<'a, AffineLayer>;

    fn into_iter(self) -> Self::IntoIter {
        self.layers.iter()
    }
}

impl TryFrom<Vec<AffineLayer>> for LayerSequence {
    type Error = AffineError;

    fn try_from(layers: Vec<AffineLayer>) -> AffineResult<Self> {
        Self::new(layers)
    }
}

fn check_chain(prev: &AffineLayer, next: &AffineLayer) -> AffineResult<()> {
    if prev.out_dim() != next.in_dim() {
        return Err(AffineError::DimensionMismatch {
            context: "layer chain",
            expected: prev.out_dim(),
            actual: next.in_dim(),
        });
    }
    Ok(())
}
