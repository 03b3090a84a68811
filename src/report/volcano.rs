//! Volcano plot: log2 fold-change against -log10(p-value).

use crate::data::ResultTable;
use crate::label::LabelSelection;
use crate::report::svg::{padded_range, Anchor, LineStyle, PlotArea, SvgDocument};

const WIDTH: f64 = 700.0;
const HEIGHT: f64 = 500.0;
const POINT_COLOR: &str = "#1f77b4";
const LABELED_COLOR: &str = "#d62728";
const REFERENCE_COLOR: &str = "grey";

/// Offset (data units) of an annotation from its point.
pub const LABEL_OFFSET: f64 = 0.02;

/// Reference lines of the volcano plot, in data coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VolcanoGuides {
    /// Vertical dashed lines at +/- this value.
    pub fc_thresh: f64,
    /// Height of the horizontal dashed line: -log10(p_thresh + 1e-12).
    ///
    /// Always in p-value space, even when labels are chosen by q-value.
    pub significance_line: f64,
}

impl VolcanoGuides {
    pub fn new(fc_thresh: f64, p_thresh: f64) -> Self {
        Self {
            fc_thresh,
            significance_line: -(p_thresh + 1e-12).log10(),
        }
    }
}

/// Render the volcano plot of a result table as SVG text.
pub fn render_volcano(
    table: &ResultTable,
    labels: &LabelSelection,
    guides: &VolcanoGuides,
) -> String {
    let points: Vec<(f64, f64)> = table
        .iter()
        .map(|r| (r.log2_fold_change, r.neg_log10_p()))
        .collect();

    let x_max_abs = points
        .iter()
        .map(|(x, _)| x.abs())
        .fold(guides.fc_thresh, f64::max);
    let y_max = points
        .iter()
        .map(|(_, y)| *y)
        .fold(guides.significance_line, f64::max);
    let x_range = padded_range(-x_max_abs, x_max_abs, 0.08);
    let (_, y_hi) = padded_range(0.0, y_max, 0.08);

    let area = PlotArea {
        left: 70.0,
        top: 45.0,
        width: WIDTH - 100.0,
        height: HEIGHT - 105.0,
        x_range,
        y_range: (0.0, y_hi),
    };

    let mut doc = SvgDocument::new(WIDTH, HEIGHT);
    area.draw_axes(&mut doc, true);

    for x in [guides.fc_thresh, -guides.fc_thresh] {
        doc.line(area.px(x), area.top, area.px(x), area.bottom(), REFERENCE_COLOR, LineStyle::Dashed);
    }
    doc.line(area.px(0.0), area.top, area.px(0.0), area.bottom(), REFERENCE_COLOR, LineStyle::Dotted);
    let hy = area.py(guides.significance_line);
    doc.line(area.left, hy, area.right(), hy, REFERENCE_COLOR, LineStyle::Dashed);

    // labeled points are drawn last so they sit on top
    for (i, &(x, y)) in points.iter().enumerate() {
        if !labels.contains(i) {
            doc.circle(area.px(x), area.py(y), 4.0, POINT_COLOR, 0.7);
        }
    }
    for (i, row) in table.iter().enumerate() {
        if !labels.contains(i) {
            continue;
        }
        let (x, y) = points[i];
        doc.circle(area.px(x), area.py(y), 4.0, LABELED_COLOR, 0.9);
        doc.text(
            area.px(x + LABEL_OFFSET),
            area.py(y + LABEL_OFFSET),
            &row.feature,
            8.0,
            Anchor::Start,
        );
    }

    doc.text(
        area.left + area.width / 2.0,
        25.0,
        "Volcano Plot: Microbiome Associations",
        14.0,
        Anchor::Middle,
    );
    doc.text(
        area.left + area.width / 2.0,
        HEIGHT - 20.0,
        &format!("log2 Fold Change ({} vs {})", table.group2, table.group1),
        12.0,
        Anchor::Middle,
    );
    doc.vertical_text(20.0, area.top + area.height / 2.0, "-log10(p-value)", 12.0);

    doc.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LabelMode;
    use crate::data::FeatureResult;
    use crate::label::{select_labels, LabelThresholds};

    fn table() -> ResultTable {
        let row = |feature: &str, log2fc: f64, p: f64| FeatureResult {
            feature: feature.to_string(),
            mean_group1: 1.0,
            mean_group2: 2.0,
            log2_fold_change: log2fc,
            p_value: p,
            q_value: p,
        };
        ResultTable::new(
            "Mild",
            "Severe",
            vec![row("up<&>", 2.5, 0.001), row("flat", 0.1, 0.8), row("down", -3.0, 0.02)],
        )
    }

    #[test]
    fn test_guides() {
        let guides = VolcanoGuides::new(1.0, 0.05);
        assert!((guides.significance_line - 1.30103).abs() < 1e-4);
    }

    #[test]
    fn test_render_contains_points_and_labels() {
        let table = table();
        let thresholds = LabelThresholds {
            use_q: false,
            p_thresh: 0.05,
            q_thresh: 0.1,
            fc_thresh: 1.0,
        };
        let labels = select_labels(&table, LabelMode::Threshold, 10, &thresholds);
        let svg = render_volcano(&table, &labels, &VolcanoGuides::new(1.0, 0.05));

        assert_eq!(svg.matches("<circle").count(), 3);
        assert_eq!(svg.matches(&format!("fill=\"{}\"", LABELED_COLOR)).count(), 2);
        assert!(svg.contains("up&lt;&amp;&gt;"));
        assert!(svg.contains(">down<"));
        assert!(!svg.contains(">flat<"));
        assert!(svg.contains("log2 Fold Change (Severe vs Mild)"));
        assert!(svg.contains("-log10(p-value)"));
    }

    #[test]
    fn test_render_reference_lines() {
        let table = table();
        let labels = select_labels(&table, LabelMode::None, 0, &LabelThresholds {
            use_q: true,
            p_thresh: 0.05,
            q_thresh: 0.1,
            fc_thresh: 1.0,
        });
        let svg = render_volcano(&table, &labels, &VolcanoGuides::new(1.0, 0.05));
        assert_eq!(svg.matches("stroke-dasharray=\"6,4\"").count(), 3);
        assert_eq!(svg.matches("stroke-dasharray=\"1.5,3\"").count(), 1);
        assert!(!svg.contains(LABELED_COLOR));
    }

    #[test]
    fn test_render_empty_table() {
        let table = ResultTable::new("Mild", "Severe", vec![]);
        let labels = LabelSelection {
            mode: LabelMode::None,
            indices: vec![],
        };
        let svg = render_volcano(&table, &labels, &VolcanoGuides::new(1.0, 0.05));
        assert!(svg.contains("Volcano Plot"));
        assert!(!svg.contains("NaN"));
    }
}
