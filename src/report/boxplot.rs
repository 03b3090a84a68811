//! Per-feature boxplots of raw abundance grouped by clinical label.

use crate::report::svg::{padded_range, Anchor, LineStyle, PlotArea, SvgDocument};
use serde::{Deserialize, Serialize};

const WIDTH: f64 = 400.0;
const HEIGHT: f64 = 400.0;
const BOX_COLOR: &str = "#1f77b4";
const MEDIAN_COLOR: &str = "#2ca02c";

/// Whisker reach as a multiple of the interquartile range.
pub const WHISKER_IQR: f64 = 1.5;

/// Five-number summary plus outliers for one box.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoxStats {
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    /// Lowest value within q1 - 1.5 IQR.
    pub whisker_low: f64,
    /// Highest value within q3 + 1.5 IQR.
    pub whisker_high: f64,
    /// Values beyond the whiskers.
    pub outliers: Vec<f64>,
}

/// Quantile of sorted data with linear interpolation between order
/// statistics.
pub fn quantile_sorted(sorted: &[f64], q: f64) -> f64 {
    if sorted.is_empty() {
        return f64::NAN;
    }
    let pos = q.clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    sorted[lo] + (sorted[hi] - sorted[lo]) * (pos - lo as f64)
}

impl BoxStats {
    /// Summarise a sample; `None` when empty.
    pub fn from_values(values: &[f64]) -> Option<Self> {
        if values.is_empty() {
            return None;
        }
        let mut sorted = values.to_vec();
        sorted.sort_by(f64::total_cmp);

        let q1 = quantile_sorted(&sorted, 0.25);
        let median = quantile_sorted(&sorted, 0.5);
        let q3 = quantile_sorted(&sorted, 0.75);
        let iqr = q3 - q1;
        let low_fence = q1 - WHISKER_IQR * iqr;
        let high_fence = q3 + WHISKER_IQR * iqr;

        let whisker_low = sorted
            .iter()
            .copied()
            .find(|&v| v >= low_fence)
            .unwrap_or(q1);
        let whisker_high = sorted
            .iter()
            .rev()
            .copied()
            .find(|&v| v <= high_fence)
            .unwrap_or(q3);
        let outliers = sorted
            .iter()
            .copied()
            .filter(|&v| v < whisker_low || v > whisker_high)
            .collect();

        Some(Self {
            q1,
            median,
            q3,
            whisker_low,
            whisker_high,
            outliers,
        })
    }
}

/// Render one feature's boxplot as SVG text.
///
/// `groups` holds (label, values) pairs in drawing order.
pub fn render_boxplot(feature: &str, group_col: &str, groups: &[(String, Vec<f64>)]) -> String {
    let boxes: Vec<(&str, BoxStats)> = groups
        .iter()
        .filter_map(|(label, values)| BoxStats::from_values(values).map(|b| (label.as_str(), b)))
        .collect();

    let (y_min, y_max) = groups
        .iter()
        .flat_map(|(_, values)| values.iter().copied())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(v), hi.max(v))
        });

    let area = PlotArea {
        left: 65.0,
        top: 40.0,
        width: WIDTH - 85.0,
        height: HEIGHT - 95.0,
        x_range: (0.5, boxes.len().max(1) as f64 + 0.5),
        y_range: padded_range(y_min, y_max, 0.05),
    };

    let mut doc = SvgDocument::new(WIDTH, HEIGHT);
    area.draw_axes(&mut doc, false);

    let half_width = (area.width / boxes.len().max(1) as f64) * 0.25;
    for (i, (label, stats)) in boxes.iter().enumerate() {
        let cx = area.px((i + 1) as f64);
        let (top, bottom) = (area.py(stats.q3), area.py(stats.q1));

        doc.rect(cx - half_width, top, 2.0 * half_width, bottom - top, "none", BOX_COLOR);
        let my = area.py(stats.median);
        doc.line(cx - half_width, my, cx + half_width, my, MEDIAN_COLOR, LineStyle::Solid);

        let (wl, wh) = (area.py(stats.whisker_low), area.py(stats.whisker_high));
        doc.line(cx, bottom, cx, wl, BOX_COLOR, LineStyle::Solid);
        doc.line(cx, top, cx, wh, BOX_COLOR, LineStyle::Solid);
        doc.line(cx - half_width / 2.0, wl, cx + half_width / 2.0, wl, "black", LineStyle::Solid);
        doc.line(cx - half_width / 2.0, wh, cx + half_width / 2.0, wh, "black", LineStyle::Solid);

        for &v in &stats.outliers {
            doc.ring(cx, area.py(v), 3.0, "black");
        }

        doc.line(cx, area.bottom(), cx, area.bottom() + 4.0, "black", LineStyle::Solid);
        doc.text(cx, area.bottom() + 16.0, label, 10.0, Anchor::Middle);
    }

    doc.text(
        area.left + area.width / 2.0,
        24.0,
        &format!("{} abundance by {}", feature, group_col),
        13.0,
        Anchor::Middle,
    );
    doc.text(area.left + area.width / 2.0, HEIGHT - 18.0, group_col, 12.0, Anchor::Middle);
    doc.vertical_text(18.0, area.top + area.height / 2.0, "Abundance", 12.0);

    doc.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_quantiles_interpolate() {
        let sorted = [1.0, 2.0, 3.0, 4.0];
        assert_relative_eq!(quantile_sorted(&sorted, 0.25), 1.75);
        assert_relative_eq!(quantile_sorted(&sorted, 0.5), 2.5);
        assert_relative_eq!(quantile_sorted(&sorted, 0.75), 3.25);
        assert_relative_eq!(quantile_sorted(&[7.0], 0.3), 7.0);
        assert!(quantile_sorted(&[], 0.5).is_nan());
    }

    #[test]
    fn test_box_stats_with_outlier() {
        let stats = BoxStats::from_values(&[1.0, 2.0, 3.0, 4.0, 100.0]).unwrap();
        assert_relative_eq!(stats.q1, 2.0);
        assert_relative_eq!(stats.median, 3.0);
        assert_relative_eq!(stats.q3, 4.0);
        assert_relative_eq!(stats.whisker_low, 1.0);
        assert_relative_eq!(stats.whisker_high, 4.0);
        assert_eq!(stats.outliers, vec![100.0]);
    }

    #[test]
    fn test_box_stats_constant() {
        let stats = BoxStats::from_values(&[5.0, 5.0, 5.0]).unwrap();
        assert_eq!(stats.whisker_low, 5.0);
        assert_eq!(stats.whisker_high, 5.0);
        assert!(stats.outliers.is_empty());
        assert!(BoxStats::from_values(&[]).is_none());
    }

    #[test]
    fn test_render_one_box_per_group() {
        let groups = vec![
            ("Mild".to_string(), vec![1.0, 2.0, 3.0]),
            ("Severe".to_string(), vec![10.0, 12.0, 50.0, 11.0, 13.0]),
        ];
        let svg = render_boxplot("taxon_A", "Severity", &groups);
        assert!(svg.contains("taxon_A abundance by Severity"));
        assert!(svg.contains(">Mild<"));
        assert!(svg.contains(">Severe<"));
        assert!(svg.contains(">Abundance<"));
        // one outlier (50) drawn as a ring
        assert_eq!(svg.matches("<circle").count(), 1);
    }
}
