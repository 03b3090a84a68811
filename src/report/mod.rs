//! Rendering of an [`AnalysisReport`] into files.
//!
//! The engine never touches the filesystem; a [`ReportRenderer`] receives the
//! finished report and decides what to write. [`SvgReportRenderer`] produces
//! the results table, a volcano plot, boxplots of the top features and a JSON
//! run summary.

pub mod boxplot;
pub mod svg;
pub mod volcano;

use crate::error::Result;
use crate::pipeline::AnalysisReport;
use log::info;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

pub use boxplot::{render_boxplot, BoxStats};
pub use volcano::{render_volcano, VolcanoGuides};

pub const RESULTS_TABLE_FILE: &str = "results_table.csv";
pub const VOLCANO_PLOT_FILE: &str = "volcano_plot.svg";
pub const SUMMARY_FILE: &str = "analysis_summary.json";

/// Number of top-ranked features that get a boxplot.
pub const BOXPLOT_COUNT: usize = 3;

/// Paths of everything a renderer wrote.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderedOutputs {
    pub results_table: PathBuf,
    pub volcano_plot: PathBuf,
    /// (feature, file) per boxplot, in table order.
    pub boxplots: Vec<(String, PathBuf)>,
    pub summary_json: PathBuf,
}

/// Machine-readable summary of one run, written next to the plots.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisSummary {
    pub group_col: String,
    pub group1: String,
    pub group2: String,
    pub n_group1: usize,
    pub n_group2: usize,
    pub n_features: usize,
    pub log2fc_column: String,
    pub label_mode: String,
    pub labeled_features: Vec<String>,
    pub top_features: Vec<String>,
    pub significant_p05: usize,
    pub significant_q05: usize,
    pub significant_q10: usize,
    pub results_table: PathBuf,
    pub volcano_plot: PathBuf,
    pub boxplots: Vec<PathBuf>,
}

impl AnalysisSummary {
    fn new(report: &AnalysisReport, outputs: &RenderedOutputs) -> Self {
        let summary = report.table.summary();
        Self {
            group_col: report.samples.group_col().to_string(),
            group1: report.samples.group1().to_string(),
            group2: report.samples.group2().to_string(),
            n_group1: report.samples.n_group1(),
            n_group2: report.samples.n_group2(),
            n_features: report.table.len(),
            log2fc_column: report.log2fc_label(),
            label_mode: report.labels.mode.name().to_string(),
            labeled_features: report.labels.feature_names(&report.table),
            top_features: report.top_features(BOXPLOT_COUNT),
            significant_p05: summary.significant_p05,
            significant_q05: summary.significant_q05,
            significant_q10: summary.significant_q10,
            results_table: outputs.results_table.clone(),
            volcano_plot: outputs.volcano_plot.clone(),
            boxplots: outputs.boxplots.iter().map(|(_, p)| p.clone()).collect(),
        }
    }
}

/// Turns a finished analysis into output files.
pub trait ReportRenderer {
    fn render(&self, report: &AnalysisReport, out_dir: &Path) -> Result<RenderedOutputs>;
}

/// Writes CSV, SVG plots and a JSON summary.
#[derive(Debug, Clone, Copy, Default)]
pub struct SvgReportRenderer;

impl ReportRenderer for SvgReportRenderer {
    fn render(&self, report: &AnalysisReport, out_dir: &Path) -> Result<RenderedOutputs> {
        std::fs::create_dir_all(out_dir)?;

        let results_table = out_dir.join(RESULTS_TABLE_FILE);
        report.table.to_csv(&results_table)?;
        info!("Wrote {:?}", results_table);

        let guides = VolcanoGuides::new(report.config.fc_thresh, report.config.p_thresh);
        let volcano_plot = out_dir.join(VOLCANO_PLOT_FILE);
        std::fs::write(
            &volcano_plot,
            render_volcano(&report.table, &report.labels, &guides),
        )?;
        info!("Wrote {:?}", volcano_plot);

        let features = report.top_features(BOXPLOT_COUNT);
        let stems = unique_file_stems(&features);
        let mut boxplots = Vec::with_capacity(features.len());
        for (feature, stem) in features.into_iter().zip(stems) {
            let Some(index) = report.samples.feature_index(&feature) else {
                continue;
            };
            let groups = report.samples.values_by_label(index);
            let path = out_dir.join(format!("boxplot_{}.svg", stem));
            std::fs::write(
                &path,
                render_boxplot(&feature, report.samples.group_col(), &groups),
            )?;
            info!("Wrote {:?}", path);
            boxplots.push((feature, path));
        }

        let outputs = RenderedOutputs {
            results_table,
            volcano_plot,
            boxplots,
            summary_json: out_dir.join(SUMMARY_FILE),
        };
        let summary = AnalysisSummary::new(report, &outputs);
        std::fs::write(&outputs.summary_json, serde_json::to_string_pretty(&summary)?)?;
        info!("Wrote {:?}", outputs.summary_json);

        Ok(outputs)
    }
}

fn unsafe_chars() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[^A-Za-z0-9._-]").unwrap())
}

/// Make a feature name safe to embed in a file name: every character outside
/// `[A-Za-z0-9._-]` becomes `_`.
pub fn sanitize_file_stem(feature: &str) -> String {
    let stem = unsafe_chars().replace_all(feature, "_").into_owned();
    if stem.is_empty() {
        "feature".to_string()
    } else {
        stem
    }
}

/// Sanitized stems for a list of features; names that collide after
/// sanitizing get `_2`, `_3`, ... appended.
pub fn unique_file_stems(features: &[String]) -> Vec<String> {
    let mut taken = HashSet::new();
    features
        .iter()
        .map(|feature| {
            let base = sanitize_file_stem(feature);
            let mut stem = base.clone();
            let mut n = 2;
            while !taken.insert(stem.clone()) {
                stem = format!("{}_{}", base, n);
                n += 1;
            }
            stem
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{AnalysisConfig, LabelMode};
    use crate::data::{AbundanceTable, DelimitedTable, Metadata};
    use crate::pipeline::analyze;

    fn report(config: &AnalysisConfig) -> AnalysisReport {
        let ab = DelimitedTable::from_reader(
            "SampleID,g/Bacteroides,Prevotella,Akkermansia muciniphila,Other\n\
             S1,1,10,3,5\nS2,2,11,4,5\nS3,3,12,5,5\nS4,20,1,30,5\nS5,30,2,40,5\nS6,40,3,50,5\n"
                .as_bytes(),
            b',',
        )
        .unwrap();
        let meta = DelimitedTable::from_reader(
            "SampleID,Severity\nS1,Mild\nS2,Mild\nS3,Mild\nS4,Severe\nS5,Severe\nS6,Severe\n"
                .as_bytes(),
            b',',
        )
        .unwrap();
        analyze(
            config,
            &AbundanceTable::from_table(&ab).unwrap(),
            &Metadata::from_table(&meta).unwrap(),
        )
        .unwrap()
    }

    #[test]
    fn test_sanitize_file_stem() {
        assert_eq!(sanitize_file_stem("g/Bacteroides"), "g_Bacteroides");
        assert_eq!(sanitize_file_stem("k__Bacteria;p__Firmicutes"), "k__Bacteria_p__Firmicutes");
        assert_eq!(sanitize_file_stem("taxon_A.1-b"), "taxon_A.1-b");
        assert_eq!(sanitize_file_stem(""), "feature");
    }

    #[test]
    fn test_unique_file_stems() {
        let features = vec!["a/b".to_string(), "a_b".to_string(), "a b".to_string()];
        assert_eq!(unique_file_stems(&features), vec!["a_b", "a_b_2", "a_b_3"]);
    }

    #[test]
    fn test_render_writes_every_output() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("nested").join("results");
        let report = report(&AnalysisConfig::default());

        let outputs = SvgReportRenderer.render(&report, &out).unwrap();

        assert!(outputs.results_table.exists());
        assert!(outputs.volcano_plot.exists());
        assert!(outputs.summary_json.exists());
        assert_eq!(outputs.boxplots.len(), BOXPLOT_COUNT);
        for (_, path) in &outputs.boxplots {
            assert!(path.exists());
            let name = path.file_name().unwrap().to_str().unwrap();
            assert!(name.starts_with("boxplot_"));
            assert!(!name.contains('/') && !name.contains(' '));
        }
    }

    #[test]
    fn test_summary_json_contents() {
        let dir = tempfile::tempdir().unwrap();
        let config = AnalysisConfig {
            label_mode: LabelMode::Top,
            top_n: 2,
            ..Default::default()
        };
        let report = report(&config);
        let outputs = SvgReportRenderer.render(&report, dir.path()).unwrap();

        let text = std::fs::read_to_string(&outputs.summary_json).unwrap();
        let summary: AnalysisSummary = serde_json::from_str(&text).unwrap();
        assert_eq!(summary.n_group1, 3);
        assert_eq!(summary.n_group2, 3);
        assert_eq!(summary.n_features, 4);
        assert_eq!(summary.label_mode, "top");
        assert_eq!(summary.labeled_features.len(), 2);
        assert_eq!(summary.log2fc_column, "log2FC_(Severe_vs_Mild)");
        assert_eq!(summary.top_features, report.top_features(3));
    }

    #[test]
    fn test_results_table_has_every_feature() {
        let dir = tempfile::tempdir().unwrap();
        let config = AnalysisConfig {
            label_mode: LabelMode::None,
            ..Default::default()
        };
        let outputs = SvgReportRenderer.render(&report(&config), dir.path()).unwrap();
        let csv = std::fs::read_to_string(&outputs.results_table).unwrap();
        let mut lines = csv.lines();
        assert_eq!(
            lines.next().unwrap(),
            "feature,mean_Mild,mean_Severe,log2FC_(Severe_vs_Mild),p_value,q_value"
        );
        assert_eq!(lines.count(), 4);
    }
}
