//! 密テンソル（f64）
//!
//! - `Matrix`: 2 階テンソル（`ndarray::Array2<f64>`）
//! - `Vector`: 1 階テンソル（`ndarray::Array1<f64>`）
//!
//! 形状はテンソルの一部として扱い、全ての演算の前に検査する。
//! `ndarray` は形状不一致で panic するため、`dot` / `+` の前に必ず
//! `DimensionMismatch` を返す検査を通すこと。
//! 演算は入力を変更せず、新しいテンソルを返す。

use crate::error::{AffineError, AffineResult};
use ndarray::{s, Array1, Array2, ArrayView1, ArrayView2, Zip};
use std::fmt;

/// NaN を伝播する max
///
/// `f64::max` は非 NaN 側を返すため、差分の最大値に使うと NaN が消える。
#[inline]
fn nan_max(m: f64, v: f64) -> f64 {
    if m.is_nan() || v.is_nan() { f64::NAN } else { m.max(v) }
}

/// 2 階テンソル
#[derive(Clone, Debug, PartialEq)]
pub struct Matrix {
    data: Array2<f64>,
}

impl Matrix {
    /// row-major のバッファから作成
    ///
    /// `rows * cols` が溢れる場合も `ShapeMismatch`。
    pub fn new(rows: usize, cols: usize, data: Vec<f64>) -> AffineResult<Self> {
        let len = data.len();
        if rows.checked_mul(cols) != Some(len) {
            return Err(AffineError::ShapeMismatch { rows, cols, len });
        }
        let data = Array2::from_shape_vec((rows, cols), data)
            .map_err(|_| AffineError::ShapeMismatch { rows, cols, len })?;
        Ok(Self { data })
    }

    /// ゼロ行列
    ///
    /// # Panics
    ///
    /// `rows * cols` が `isize::MAX` を超える場合（`Array2::zeros` と同じ）。
    pub fn zeros(rows: usize, cols: usize) -> Self {
        Self { data: Array2::zeros((rows, cols)) }
    }

    /// 各要素を `f(r, c)` で埋める（row-major 順に呼ぶ）
    pub fn from_fn(rows: usize, cols: usize, mut f: impl FnMut(usize, usize) -> f64) -> Self {
        Self { data: Array2::from_shape_fn((rows, cols), |(r, c)| f(r, c)) }
    }

    /// 行のスライスから作成（全行が同じ長さであること）
    pub fn from_rows<R: AsRef<[f64]>>(rows: &[R]) -> AffineResult<Self> {
        let cols = rows.first().map(|r| r.as_ref().len()).unwrap_or(0);
        let mut data = Vec::with_capacity(rows.len() * cols);
        for row in rows {
            let row = row.as_ref();
            if row.len() != cols {
                return Err(AffineError::DimensionMismatch {
                    context: "matrix row length",
                    expected: cols,
                    actual: row.len(),
                });
            }
            data.extend_from_slice(row);
        }
        Self::new(rows.len(), cols, data)
    }

    /// 単位行列
    pub fn identity(n: usize) -> Self {
        Self { data: Array2::eye(n) }
    }

    #[inline]
    pub fn rows(&self) -> usize {
        self.data.nrows()
    }

    #[inline]
    pub fn cols(&self) -> usize {
        self.data.ncols()
    }

    /// (rows, cols)
    #[inline]
    pub fn shape(&self) -> (usize, usize) {
        self.data.dim()
    }

    #[inline]
    pub fn get(&self, r: usize, c: usize) -> f64 {
        self.data[[r, c]]
    }

    #[inline]
    pub fn row(&self, r: usize) -> ArrayView1<'_, f64> {
        self.data.row(r)
    }

    pub fn row_iter(&self) -> impl Iterator<Item = ArrayView1<'_, f64>> {
        // cols == 0 でも rows 個の空ビューを返す
        self.data.outer_iter()
    }

    #[inline]
    pub fn view(&self) -> ArrayView2<'_, f64> {
        self.data.view()
    }

    /// row-major 順の全要素
    pub fn iter(&self) -> impl Iterator<Item = &f64> {
        self.data.iter()
    }

    /// row-major 順の全要素をコピー
    pub fn to_vec(&self) -> Vec<f64> {
        self.data.iter().copied().collect()
    }

    /// 行列積 `self @ rhs`
    ///
    /// `self.cols == rhs.rows` が必要。
    pub fn matmul(&self, rhs: &Matrix) -> AffineResult<Matrix> {
        if self.cols() != rhs.rows() {
            return Err(AffineError::DimensionMismatch {
                context: "matmul",
                expected: self.cols(),
                actual: rhs.rows(),
            });
        }
        Ok(Matrix { data: self.data.dot(&rhs.data) })
    }

    /// バイアスを各行にブロードキャスト加算
    pub fn add_row_broadcast(&self, bias: &Vector) -> AffineResult<Matrix> {
        if bias.len() != self.cols() {
            return Err(AffineError::DimensionMismatch {
                context: "bias broadcast",
                expected: self.cols(),
                actual: bias.len(),
            });
        }
        Ok(Matrix { data: &self.data + &bias.data })
    }

    /// 要素ごとの差の絶対値の最大
    ///
    /// どちらかに NaN があれば（`inf - inf` を含む）NaN を返す。
    pub fn max_abs_diff(&self, other: &Matrix) -> AffineResult<f64> {
        self.check_same_shape(other)?;
        Ok(Zip::from(&self.data)
            .and(&other.data)
            .fold(0.0, |m, &a, &b| nan_max(m, (a - b).abs())))
    }

    /// 最大絶対値要素（NaN は伝播）
    pub fn max_abs(&self) -> f64 {
        self.data.iter().fold(0.0, |m, v| nan_max(m, v.abs()))
    }

    /// 先頭 `n` 行（行数が足りなければ全行）
    pub fn head(&self, n: usize) -> Matrix {
        let n = n.min(self.rows());
        Matrix { data: self.data.slice(s![..n, ..]).to_owned() }
    }

    pub(crate) fn check_same_shape(&self, other: &Matrix) -> AffineResult<()> {
        if self.rows() != other.rows() {
            return Err(AffineError::DimensionMismatch {
                context: "row count",
                expected: self.rows(),
                actual: other.rows(),
            });
        }
        if self.cols() != other.cols() {
            return Err(AffineError::DimensionMismatch {
                context: "column count",
                expected: self.cols(),
                actual: other.cols(),
            });
        }
        Ok(())
    }
}

impl From<Array2<f64>> for Matrix {
    fn from(data: Array2<f64>) -> Self {
        Self { data }
    }
}

impl fmt::Display for Matrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let prec = f.precision().unwrap_or(8);
        write!(f, "[")?;
        for (r, row) in self.row_iter().enumerate() {
            if r > 0 {
                write!(f, "\n ")?;
            }
            write!(f, "[")?;
            for (c, v) in row.iter().enumerate() {
                if c > 0 {
                    write!(f, " ")?;
                }
                write!(f, "{v:>width$.prec$}", width = prec + 4)?;
            }
            write!(f, "]")?;
        }
        write!(f, "]")
    }
}

/// 1 階テンソル
#[derive(Clone, Debug, PartialEq)]
pub struct Vector {
    data: Array1<f64>,
}

impl Vector {
    pub fn new(data: Vec<f64>) -> Self {
        Self { data: Array1::from(data) }
    }

    pub fn zeros(len: usize) -> Self {
        Self { data: Array1::zeros(len) }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    #[inline]
    pub fn view(&self) -> ArrayView1<'_, f64> {
        self.data.view()
    }

    pub fn iter(&self) -> impl Iterator<Item = &f64> {
        self.data.iter()
    }

    pub fn to_vec(&self) -> Vec<f64> {
        self.data.to_vec()
    }

    /// 行ベクトルとしての積 `self @ m`
    pub fn vecmat(&self, m: &Matrix) -> AffineResult<Vector> {
        if self.len() != m.rows() {
            return Err(AffineError::DimensionMismatch {
                context: "vector-matrix product",
                expected: m.rows(),
                actual: self.len(),
            });
        }
        Ok(Vector { data: self.data.dot(&m.data) })
    }

    /// 要素ごとの和
    pub fn add(&self, other: &Vector) -> AffineResult<Vector> {
        if self.len() != other.len() {
            return Err(AffineError::DimensionMismatch {
                context: "vector add",
                expected: self.len(),
                actual: other.len(),
            });
        }
        Ok(Vector { data: &self.data + &other.data })
    }

    /// 最大絶対値要素（NaN は伝播）
    pub fn max_abs(&self) -> f64 {
        self.data.iter().fold(0.0, |m, v| nan_max(m, v.abs()))
    }
}

impl From<Vec<f64>> for Vector {
    fn from(data: Vec<f64>) -> Self {
        Self::new(data)
    }
}

impl From<Array1<f64>> for Vector {
    fn from(data: Array1<f64>) -> Self {
        Self { data }
    }
}
