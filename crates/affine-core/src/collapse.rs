//! アフィン層列の縮約（collapsed evaluation）
//!
//! 活性化を挟まないアフィン層の合成は 1 つのアフィン変換になる。
//!
//! ```text
//! H = X @ W_eff + b_eff
//! H @ W_i + b_i = X @ (W_eff @ W_i) + (b_eff @ W_i + b_i)
//! ```
//!
//! 左畳み込みで `(W_eff, b_eff)` を更新する。合成は非可換なので順序を保つこと。

use crate::error::AffineResult;
use crate::layer::AffineLayer;
use crate::sequence::LayerSequence;
use crate::tensor::{Matrix, Vector};

/// 縮約済みアフィン変換
///
/// - `weight`: `[d_in][d_out]`
/// - `bias`: `[d_out]`
#[derive(Clone, Debug, PartialEq)]
pub struct CollapsedAffine {
    layer: AffineLayer,
    source_layers: usize,
}

impl CollapsedAffine {
    #[inline]
    pub fn weight(&self) -> &Matrix {
        self.layer.weight()
    }

    #[inline]
    pub fn bias(&self) -> &Vector {
        self.layer.bias()
    }

    #[inline]
    pub fn in_dim(&self) -> usize {
        self.layer.in_dim()
    }

    #[inline]
    pub fn out_dim(&self) -> usize {
        self.layer.out_dim()
    }

    /// 縮約元の層数
    #[inline]
    pub fn source_layers(&self) -> usize {
        self.source_layers
    }

    /// `X @ W_eff + b_eff`
    pub fn evaluate(&self, batch: &Matrix) -> AffineResult<Matrix> {
        self.layer.forward(batch)
    }

    pub fn as_layer(&self) -> &AffineLayer {
        &self.layer
    }

    pub fn into_layer(self) -> AffineLayer {
        self.layer
    }
}

/// 層列を 1 つのアフィン変換に縮約
///
/// 1 層のみなら元の `(W, b)` の複製をそのまま返す（数値誤差なし）。
pub fn collapse(seq: &LayerSequence) -> AffineResult<CollapsedAffine> {
    let layers = seq.layers();
    let first = &layers[0];

    let mut w_eff = first.weight().clone();
    let mut b_eff = first.bias().clone();

    for layer in &layers[1..] {
        // b_eff は更新前の w_eff と同じ段階の値から計算する
        b_eff = b_eff.vecmat(layer.weight())?.add(layer.bias())?;
        w_eff = w_eff.matmul(layer.weight())?;
    }

    log::debug!(
        "collapsed {} layers into W_eff {:?}, b_eff ({},)",
        layers.len(),
        w_eff.shape(),
        b_eff.len()
    );

    Ok(CollapsedAffine { layer: AffineLayer::new(w_eff, b_eff)?, source_layers: layers.len() })
}

/// 縮約器
///
/// `collapse` を保持型として使う場合のラッパー。
#[derive(Clone, Copy, Debug, Default)]
pub struct Collapser;

impl Collapser {
    pub fn collapse(&self, seq: &LayerSequence) -> AffineResult<CollapsedAffine> {
        collapse(seq)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layer(w: &[&[f64]], b: &[f64]) -> AffineLayer {
        AffineLayer::new(Matrix::from_rows(w).unwrap(), Vector::new(b.to_vec())).unwrap()
    }

    #[test]
    fn test_single_layer_is_exact_copy() {
        let l = layer(&[&[0.1, -0.2], &[0.3, 0.4], &[1e-17, 3.0]], &[0.5, -0.5]);
        let seq = LayerSequence::single(l.clone());

        let c = collapse(&seq).unwrap();
        assert_eq!(c.weight(), l.weight());
        assert_eq!(c.bias(), l.bias());
        assert_eq!(c.source_layers(), 1);
    }

    #[test]
    fn test_two_layer_closed_form() {
        // L0: W=[1; 2], b=[3]  (2→1)
        // L1: W=[4 5],  b=[6 7]  (1→2)
        // W_eff = [1; 2] @ [4 5] = [4 5; 8 10]
        // b_eff = [3] @ [4 5] + [6 7] = [18 22]
        let l0 = layer(&[&[1.0], &[2.0]], &[3.0]);
        let l1 = layer(&[&[4.0, 5.0]], &[6.0, 7.0]);
        let seq = LayerSequence::new(vec![l0, l1]).unwrap();

        let c = collapse(&seq).unwrap();
        assert_eq!(c.weight(), &Matrix::from_rows(&[[4.0, 5.0], [8.0, 10.0]]).unwrap());
        assert_eq!(c.bias().to_vec(), vec![18.0, 22.0]);
    }

    #[test]
    fn test_collapse_shape() {
        let layers = [5, 7, 6, 4, 3].windows(2).map(|w| AffineLayer::zeros(w[0], w[1])).collect();
        let seq = LayerSequence::new(layers).unwrap();

        let c = Collapser.collapse(&seq).unwrap();
        assert_eq!(c.weight().shape(), (5, 3));
        assert_eq!(c.bias().len(), 3);
        assert_eq!((c.in_dim(), c.out_dim()), (5, 3));
        assert_eq!(c.source_layers(), 4);
    }

    #[test]
    fn test_collapse_does_not_touch_source() {
        let l0 = layer(&[&[2.0]], &[1.0]);
        let l1 = layer(&[&[3.0]], &[-1.0]);
        let seq = LayerSequence::new(vec![l0.clone(), l1.clone()]).unwrap();

        let _ = collapse(&seq).unwrap();
        assert_eq!(seq.layers()[0], l0);
        assert_eq!(seq.layers()[1], l1);
    }

    #[test]
    fn test_evaluate_matches_scalar_algebra() {
        // (x * 2 + 1) * 3 - 1 = 6x + 2
        let seq =
            LayerSequence::new(vec![layer(&[&[2.0]], &[1.0]), layer(&[&[3.0]], &[-1.0])]).unwrap();
        let c = collapse(&seq).unwrap();

        let y = c.evaluate(&Matrix::from_rows(&[[0.0], [1.0]]).unwrap()).unwrap();
        assert_eq!(y.to_vec(), vec![2.0, 8.0]);
    }
}
