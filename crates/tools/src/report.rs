//! Console rendering for the demonstration binaries
//!
//! Everything here runs after the numeric results are final and only formats.

use affine_core::{EquivalenceReport, LayerSequence, Matrix};
use std::fmt::Write as _;

fn shape2((r, c): (usize, usize)) -> String {
    format!("({r}, {c})")
}

fn shape1(len: usize) -> String {
    format!("({len},)")
}

/// Shapes of the input, every layer and the collapsed map.
pub fn format_shapes(x: &Matrix, seq: &LayerSequence, report: &EquivalenceReport) -> String {
    let mut out = String::from("Shapes:\n");
    let _ = writeln!(out, "  X:      {}", shape2(x.shape()));
    for (i, layer) in seq.iter().enumerate() {
        let _ = writeln!(
            out,
            "  Layer {}  W: {},  b: {}",
            i + 1,
            shape2(layer.weight().shape()),
            shape1(layer.bias().len())
        );
    }
    let _ = writeln!(
        out,
        "  Collapsed W_eff: {}, b_eff: {}",
        shape2(report.collapsed.weight().shape()),
        shape1(report.collapsed.bias().len())
    );
    out
}

/// Leading `rows` rows of both outputs and the max absolute difference.
pub fn format_outputs(report: &EquivalenceReport, rows: usize) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "First {rows} rows of Y from stacked linear layers:\n{:.8}",
        report.stacked.head(rows)
    );
    let _ = writeln!(
        out,
        "\nFirst {rows} rows of Y from single affine map:\n{:.8}",
        report.collapsed_output.head(rows)
    );
    let _ = writeln!(
        out,
        "\nMax absolute difference between the two outputs: {:.3e}",
        report.max_abs_diff
    );
    out
}

/// Horizontal text bar chart.
///
/// Bar length is proportional to `|value|` relative to the largest magnitude;
/// negative values are drawn with `-` instead of `#`.
pub fn bar_chart(title: &str, values: &[f64], width: usize) -> String {
    let max = values.iter().fold(0.0f64, |m, v| m.max(v.abs()));
    let mut out = String::new();
    let _ = writeln!(out, "{title}");

    for (i, &v) in values.iter().enumerate() {
        let len = if max > 0.0 { ((v.abs() / max) * width as f64).round() as usize } else { 0 };
        let fill = if v < 0.0 { '-' } else { '#' };
        let bar: String = std::iter::repeat_n(fill, len).collect();
        let _ = writeln!(out, "  {i:>3} | {bar:<width$} {v:.4}");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use affine_core::{verify_equivalence, AffineLayer, Tolerance, Vector};

    fn tiny() -> (Matrix, LayerSequence, EquivalenceReport) {
        let seq = LayerSequence::new(vec![
            AffineLayer::new(
                Matrix::from_rows(&[[1.0, 0.0, 2.0], [0.0, 1.0, 0.0]]).unwrap(),
                Vector::new(vec![0.5, 0.0, -1.0]),
            )
            .unwrap(),
            AffineLayer::zeros(3, 1),
        ])
        .unwrap();
        let x = Matrix::from_rows(&[[1.0, 2.0], [3.0, 4.0]]).unwrap();
        let report = verify_equivalence(&x, &seq, &Tolerance::default()).unwrap();
        (x, seq, report)
    }

    #[test]
    fn test_format_shapes() {
        let (x, seq, report) = tiny();
        let s = format_shapes(&x, &seq, &report);
        assert_eq!(
            s,
            "Shapes:\n  X:      (2, 2)\n  Layer 1  W: (2, 3),  b: (3,)\n  Layer 2  W: (3, 1),  b: (1,)\n  Collapsed W_eff: (2, 1), b_eff: (1,)\n"
        );
    }

    #[test]
    fn test_format_outputs_mentions_diff() {
        let (_, _, report) = tiny();
        let s = format_outputs(&report, 3);
        assert!(s.contains("First 3 rows of Y from stacked linear layers:"));
        assert!(s.contains("Max absolute difference between the two outputs: 0.000e0"));
    }

    #[test]
    fn test_bar_chart() {
        let s = bar_chart("Logits", &[2.0, 1.0, -0.5], 8);
        let lines: Vec<&str> = s.lines().collect();
        assert_eq!(lines[0], "Logits");
        assert_eq!(lines[1], "    0 | ######## 2.0000");
        assert_eq!(lines[2], "    1 | ####     1.0000");
        assert_eq!(lines[3], "    2 | --       -0.5000");
    }

    #[test]
    fn test_bar_chart_all_zero() {
        let s = bar_chart("Z", &[0.0], 4);
        assert_eq!(s.lines().nth(1), Some("    0 |      0.0000"));
    }
}
