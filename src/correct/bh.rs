//! Benjamini-Hochberg false discovery rate correction.

use serde::{Deserialize, Serialize};

/// Result of BH correction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BhCorrected {
    /// Original p-values.
    pub p_values: Vec<f64>,
    /// Adjusted p-values (q-values), same order as `p_values`.
    pub q_values: Vec<f64>,
    /// Number of tests.
    pub n_tests: usize,
}

impl BhCorrected {
    /// Count significant results at a threshold.
    pub fn n_significant(&self, alpha: f64) -> usize {
        self.q_values.iter().filter(|&&q| q < alpha).count()
    }
}

/// Apply Benjamini-Hochberg FDR correction.
///
/// With p-values sorted ascending and rank i (1-based), the candidate is
/// `p_(i) * n / i`. A running minimum is taken from the largest rank down,
/// values are clipped to [0, 1], and the result is returned in input order.
pub fn correct_bh(p_values: &[f64]) -> BhCorrected {
    let n = p_values.len();
    if n == 0 {
        return BhCorrected {
            p_values: vec![],
            q_values: vec![],
            n_tests: 0,
        };
    }

    // Create sorted index
    let mut indices: Vec<usize> = (0..n).collect();
    indices.sort_by(|&a, &b| p_values[a].total_cmp(&p_values[b]));

    let n_f64 = n as f64;
    let mut q_sorted: Vec<f64> = indices
        .iter()
        .enumerate()
        .map(|(i, &idx)| p_values[idx] * n_f64 / (i + 1) as f64)
        .collect();

    // Running minimum from the largest rank down
    for i in (0..n - 1).rev() {
        q_sorted[i] = q_sorted[i].min(q_sorted[i + 1]);
    }

    // Restore original order
    let mut q_values = vec![0.0; n];
    for (i, &orig_idx) in indices.iter().enumerate() {
        q_values[orig_idx] = q_sorted[i].clamp(0.0, 1.0);
    }

    BhCorrected {
        p_values: p_values.to_vec(),
        q_values,
        n_tests: n,
    }
}
