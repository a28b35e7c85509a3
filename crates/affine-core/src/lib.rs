//! affine-core
//!
//! 活性化を挟まないアフィン層の列を
//!
//! - 先頭から順に適用する（stacked）
//! - 1 つのアフィン変換に縮約して適用する（collapsed）
//!
//! の 2 通りで評価し、両者が丸め誤差の範囲で一致することを検証する。
//!
//! ```text
//! X [n][d_in]
//!   ├─ LayerStack: H_{i+1} = H_i @ W_i + b_i  ─→ Y_stack
//!   └─ collapse:   X @ W_eff + b_eff          ─→ Y_eff
//! verify: max|Y_stack - Y_eff| <= tolerance
//! ```

pub mod collapse;
pub mod error;
pub mod init;
pub mod layer;
pub mod sequence;
pub mod softmax;
pub mod stack;
pub mod tensor;
pub mod verify;

pub use collapse::{collapse, CollapsedAffine, Collapser};
pub use error::{AffineError, AffineResult};
pub use init::{layer_dims, random_batch, random_layer, random_sequence, InitConfig};
pub use layer::AffineLayer;
pub use sequence::LayerSequence;
pub use softmax::softmax;
pub use stack::{forward, forward_trace, LayerStack};
pub use tensor::{Matrix, Vector};
pub use verify::{compare_outputs, verify_equivalence, EquivalenceReport, Tolerance};
