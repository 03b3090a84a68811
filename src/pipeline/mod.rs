//! Pipeline composition and execution for two-group differential abundance.

mod runner;

pub use runner::{
    analyze, build_result_table, compute_feature_stats, AnalysisReport, FeatureStats, Pipeline,
};
