//! Group means and log2 fold-change.

use serde::{Deserialize, Serialize};

/// Offset added to both means so an all-zero group neither divides by zero
/// nor takes log(0).
pub const FOLD_CHANGE_EPSILON: f64 = 1e-9;

/// Group means and fold-change of group2 over group1 for one feature.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FoldChange {
    /// Mean within group1.
    pub mean1: f64,
    /// Mean within group2.
    pub mean2: f64,
    /// (mean2 + eps) / (mean1 + eps).
    pub ratio: f64,
    /// log2 of the ratio.
    pub log2: f64,
}

/// Arithmetic mean; NaN for an empty slice.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Fold-change of `group2` over `group1`.
pub fn fold_change(group1: &[f64], group2: &[f64]) -> FoldChange {
    let mean1 = mean(group1);
    let mean2 = mean(group2);
    let ratio = (mean2 + FOLD_CHANGE_EPSILON) / (mean1 + FOLD_CHANGE_EPSILON);
    FoldChange {
        mean1,
        mean2,
        ratio,
        log2: ratio.log2(),
    }
}
