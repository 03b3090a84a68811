//! Two-group microbiome differential abundance analysis.
//!
//! Compares the abundance of every feature of a microbiome table between two
//! clinical groups and reports fold-changes, rank-sum p-values and
//! Benjamini-Hochberg q-values, plus a volcano plot and boxplots.
//!
//! # Overview
//!
//! - **config**: Immutable run configuration (YAML, defaults)
//! - **data**: Table loading, sample join, result table
//! - **effect**: Group means and log2 fold-change
//! - **test**: Hypothesis testing (Mann-Whitney U)
//! - **correct**: Multiple testing correction (Benjamini-Hochberg)
//! - **label**: Volcano annotation policy (threshold / top / none)
//! - **pipeline**: Analysis engine producing an [`pipeline::AnalysisReport`]
//! - **report**: Rendering to CSV, SVG and JSON
//!
//! # Example
//!
//! ```no_run
//! use microbiome_assoc::prelude::*;
//! use std::path::Path;
//!
//! let config = AnalysisConfig::default();
//! let report = Pipeline::new(config).run_from_files().unwrap();
//! let outputs = SvgReportRenderer.render(&report, Path::new("results")).unwrap();
//! println!("{}", report.table.preview(10));
//! println!("Volcano plot: {:?}", outputs.volcano_plot);
//! ```

pub mod config;
pub mod correct;
pub mod data;
pub mod effect;
pub mod error;
pub mod label;
pub mod pipeline;
pub mod report;
pub mod test;

/// Convenient re-exports for common usage.
pub mod prelude {
    pub use crate::config::{parse_delimiter, AnalysisConfig, LabelMode, SAMPLE_ID_COLUMN};
    pub use crate::correct::{correct_bh, BhCorrected};
    pub use crate::data::{
        check_sample_ids, AbundanceTable, DelimitedTable, FeatureResult, GroupedSamples, Metadata,
        ResultSummary, ResultTable,
    };
    pub use crate::effect::{fold_change, mean, FoldChange, FOLD_CHANGE_EPSILON};
    pub use crate::error::{DaaError, Result};
    pub use crate::label::{select_labels, select_labels_for, LabelSelection, LabelThresholds};
    pub use crate::pipeline::{analyze, AnalysisReport, FeatureStats, Pipeline};
    pub use crate::report::{
        sanitize_file_stem, AnalysisSummary, RenderedOutputs, ReportRenderer, SvgReportRenderer,
    };
    pub use crate::test::{mann_whitney_u, MannWhitneyResult, MwuMethod};
}
