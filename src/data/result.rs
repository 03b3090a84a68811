//! Result types for two-group differential abundance analysis.

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Result for a single feature.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureResult {
    /// Feature identifier.
    pub feature: String,
    /// Arithmetic mean within group1.
    pub mean_group1: f64,
    /// Arithmetic mean within group2.
    pub mean_group2: f64,
    /// log2 of (mean2 + eps) / (mean1 + eps).
    pub log2_fold_change: f64,
    /// Raw two-sided Mann-Whitney p-value.
    pub p_value: f64,
    /// Benjamini-Hochberg adjusted p-value.
    pub q_value: f64,
}

impl FeatureResult {
    /// Check if this result is significant at a q-value threshold.
    pub fn is_significant_at(&self, alpha: f64) -> bool {
        self.q_value < alpha
    }

    /// -log10 of the p-value, offset so that p = 0 stays finite.
    pub fn neg_log10_p(&self) -> f64 {
        -(self.p_value + 1e-12).log10()
    }
}

/// Ordering used for the result table: q-value, then p-value, ascending.
pub fn compare_by_significance(a: &FeatureResult, b: &FeatureResult) -> Ordering {
    a.q_value
        .total_cmp(&b.q_value)
        .then_with(|| a.p_value.total_cmp(&b.p_value))
}

/// All feature results of one comparison, sorted by (q-value, p-value).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResultTable {
    /// Baseline group label.
    pub group1: String,
    /// Comparison group label.
    pub group2: String,
    /// Sorted results, one per feature.
    pub results: Vec<FeatureResult>,
}

impl ResultTable {
    /// Build the table, applying the single sort pass. The sort is stable, so
    /// rows tied on both keys keep their feature order.
    pub fn new(group1: &str, group2: &str, mut results: Vec<FeatureResult>) -> Self {
        results.sort_by(compare_by_significance);
        Self {
            group1: group1.to_string(),
            group2: group2.to_string(),
            results,
        }
    }

    /// Number of results.
    pub fn len(&self) -> usize {
        self.results.len()
    }

    /// Check if empty.
    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    /// Iterate over results in table order.
    pub fn iter(&self) -> impl Iterator<Item = &FeatureResult> {
        self.results.iter()
    }

    /// The first `n` rows (or all, if fewer).
    pub fn top(&self, n: usize) -> &[FeatureResult] {
        &self.results[..n.min(self.results.len())]
    }

    /// Column label of the log2 fold-change, e.g. `log2FC_(Severe_vs_Mild)`.
    pub fn log2fc_label(&self) -> String {
        format!("log2FC_({}_vs_{})", self.group2, self.group1)
    }

    /// Header row of the persisted table.
    pub fn headers(&self) -> Vec<String> {
        vec![
            "feature".to_string(),
            format!("mean_{}", self.group1),
            format!("mean_{}", self.group2),
            self.log2fc_label(),
            "p_value".to_string(),
            "q_value".to_string(),
        ]
    }

    /// Count significant results at a few customary thresholds.
    pub fn summary(&self) -> ResultSummary {
        ResultSummary {
            total: self.len(),
            significant_p05: self.iter().filter(|r| r.p_value < 0.05).count(),
            significant_q05: self.iter().filter(|r| r.is_significant_at(0.05)).count(),
            significant_q10: self.iter().filter(|r| r.is_significant_at(0.10)).count(),
        }
    }

    /// Write the full table as comma-separated text.
    ///
    /// Floats use the shortest representation that round-trips, so identical
    /// inputs give byte-identical output.
    pub fn write_csv<W: Write>(&self, writer: W) -> Result<()> {
        let mut csv_writer = csv::Writer::from_writer(writer);
        csv_writer.write_record(self.headers())?;
        for r in &self.results {
            csv_writer.write_record([
                r.feature.clone(),
                r.mean_group1.to_string(),
                r.mean_group2.to_string(),
                r.log2_fold_change.to_string(),
                r.p_value.to_string(),
                r.q_value.to_string(),
            ])?;
        }
        csv_writer.flush()?;
        Ok(())
    }

    /// Write the full table to a CSV file.
    pub fn to_csv<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let file = File::create(path)?;
        self.write_csv(BufWriter::new(file))
    }

    /// Fixed-width text preview of the first `n` rows.
    pub fn preview(&self, n: usize) -> String {
        let headers = self.headers();
        let rows: Vec<Vec<String>> = self
            .top(n)
            .iter()
            .map(|r| {
                vec![
                    r.feature.clone(),
                    format!("{:.4}", r.mean_group1),
                    format!("{:.4}", r.mean_group2),
                    format!("{:.4}", r.log2_fold_change),
                    format!("{:.4e}", r.p_value),
                    format!("{:.4e}", r.q_value),
                ]
            })
            .collect();

        let widths: Vec<usize> = (0..headers.len())
            .map(|c| {
                rows.iter()
                    .map(|row| row[c].len())
                    .chain(std::iter::once(headers[c].len()))
                    .max()
                    .unwrap_or(0)
            })
            .collect();

        let format_row = |cells: &[String]| -> String {
            cells
                .iter()
                .zip(&widths)
                .enumerate()
                .map(|(c, (cell, &w))| {
                    if c == 0 {
                        format!("{:<w$}", cell, w = w)
                    } else {
                        format!("{:>w$}", cell, w = w)
                    }
                })
                .collect::<Vec<_>>()
                .join("  ")
        };

        let mut out = format_row(&headers);
        for row in &rows {
            out.push('\n');
            out.push_str(&format_row(row));
        }
        out
    }
}

/// Summary statistics for a result table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultSummary {
    pub total: usize,
    pub significant_p05: usize,
    pub significant_q05: usize,
    pub significant_q10: usize,
}

impl std::fmt::Display for ResultSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Total features tested: {}", self.total)?;
        writeln!(f, "Significant at p < 0.05:  {}", self.significant_p05)?;
        writeln!(f, "Significant at q < 0.05:  {}", self.significant_q05)?;
        writeln!(f, "Significant at q < 0.10:  {}", self.significant_q10)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(feature: &str, log2fc: f64, p: f64, q: f64) -> FeatureResult {
        FeatureResult {
            feature: feature.to_string(),
            mean_group1: 1.0,
            mean_group2: 2.0,
            log2_fold_change: log2fc,
            p_value: p,
            q_value: q,
        }
    }

    #[test]
    fn test_sorted_by_q_then_p() {
        let table = ResultTable::new(
            "Mild",
            "Severe",
            vec![
                result("t1", 0.0, 0.04, 0.2),
                result("t2", 0.0, 0.03, 0.1),
                result("t3", 0.0, 0.01, 0.1),
                result("t4", 0.0, 0.5, 0.9),
            ],
        );
        let order: Vec<&str> = table.iter().map(|r| r.feature.as_str()).collect();
        assert_eq!(order, vec!["t3", "t2", "t1", "t4"]);
    }

    #[test]
    fn test_full_ties_keep_feature_order() {
        let table = ResultTable::new(
            "Mild",
            "Severe",
            vec![
                result("b", 0.0, 0.3, 0.3),
                result("a", 0.0, 0.3, 0.3),
                result("c", 0.0, 0.3, 0.3),
            ],
        );
        let order: Vec<&str> = table.iter().map(|r| r.feature.as_str()).collect();
        assert_eq!(order, vec!["b", "a", "c"]);
    }

    #[test]
    fn test_headers() {
        let table = ResultTable::new("Mild", "Severe", vec![]);
        assert_eq!(
            table.headers(),
            vec![
                "feature",
                "mean_Mild",
                "mean_Severe",
                "log2FC_(Severe_vs_Mild)",
                "p_value",
                "q_value"
            ]
        );
    }

    #[test]
    fn test_write_csv() {
        let table = ResultTable::new("Mild", "Severe", vec![result("taxon_1", 1.5, 0.25, 0.5)]);
        let mut buf = Vec::new();
        table.write_csv(&mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert_eq!(
            text,
            "feature,mean_Mild,mean_Severe,log2FC_(Severe_vs_Mild),p_value,q_value\n\
             taxon_1,1,2,1.5,0.25,0.5\n"
        );
    }

    #[test]
    fn test_top_clamps() {
        let table = ResultTable::new("Mild", "Severe", vec![result("t1", 0.0, 0.1, 0.1)]);
        assert_eq!(table.top(10).len(), 1);
        assert_eq!(table.top(0).len(), 0);
    }

    #[test]
    fn test_summary() {
        let table = ResultTable::new(
            "Mild",
            "Severe",
            vec![
                result("t1", 0.0, 0.001, 0.004),
                result("t2", 0.0, 0.02, 0.06),
                result("t3", 0.0, 0.04, 0.08),
                result("t4", 0.0, 0.5, 0.5),
            ],
        );
        let summary = table.summary();
        assert_eq!(summary.total, 4);
        assert_eq!(summary.significant_p05, 3);
        assert_eq!(summary.significant_q05, 1);
        assert_eq!(summary.significant_q10, 3);
    }

    #[test]
    fn test_preview_has_header_and_rows() {
        let table = ResultTable::new(
            "Mild",
            "Severe",
            vec![result("t1", 1.0, 0.01, 0.02), result("t2", -1.0, 0.2, 0.2)],
        );
        let preview = table.preview(10);
        let lines: Vec<&str> = preview.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("feature"));
        assert!(lines[1].starts_with("t1"));
    }

    #[test]
    fn test_neg_log10_p() {
        let r = result("t", 0.0, 0.01, 0.01);
        assert!((r.neg_log10_p() - 2.0).abs() < 1e-8);
        let zero = result("t", 0.0, 0.0, 0.0);
        assert!((zero.neg_log10_p() - 12.0).abs() < 1e-8);
    }
}
