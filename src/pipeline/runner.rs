//! Pipeline runner: load, join, per-feature statistics, correction, ranking.

use crate::config::AnalysisConfig;
use crate::correct::correct_bh;
use crate::data::{AbundanceTable, FeatureResult, GroupedSamples, Metadata, ResultTable};
use crate::effect::fold_change;
use crate::error::Result;
use crate::label::{select_labels_for, LabelSelection};
use crate::test::{mann_whitney_u, MwuMethod};
use log::{debug, info};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// Uncorrected statistics for one feature, before BH and sorting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureStats {
    /// Feature identifier.
    pub feature: String,
    /// Mean within group1.
    pub mean_group1: f64,
    /// Mean within group2.
    pub mean_group2: f64,
    /// log2 fold-change of group2 over group1.
    pub log2_fold_change: f64,
    /// Mann-Whitney U of group1.
    pub u_statistic: f64,
    /// Two-sided p-value.
    pub p_value: f64,
    /// How the p-value was obtained.
    pub method: MwuMethod,
}

/// Compute means, fold-change, and the rank-sum test for every feature.
///
/// Features are independent and processed in parallel; the output is in
/// feature order.
pub fn compute_feature_stats(samples: &GroupedSamples) -> Vec<FeatureStats> {
    (0..samples.n_features())
        .into_par_iter()
        .map(|feature| {
            let x1 = samples.group1_values(feature);
            let x2 = samples.group2_values(feature);
            let fc = fold_change(&x1, &x2);
            let test = mann_whitney_u(&x1, &x2);
            FeatureStats {
                feature: samples.feature_ids()[feature].clone(),
                mean_group1: fc.mean1,
                mean_group2: fc.mean2,
                log2_fold_change: fc.log2,
                u_statistic: test.u_statistic,
                p_value: test.p_value,
                method: test.method,
            }
        })
        .collect()
}

/// Attach BH q-values to per-feature statistics and sort into a result table.
pub fn build_result_table(group1: &str, group2: &str, stats: &[FeatureStats]) -> ResultTable {
    let p_values: Vec<f64> = stats.iter().map(|s| s.p_value).collect();
    let bh = correct_bh(&p_values);
    debug!(
        "{} of {} features below q = 0.05",
        bh.n_significant(0.05),
        bh.n_tests
    );

    let results = stats
        .iter()
        .zip(&bh.q_values)
        .map(|(s, &q_value)| FeatureResult {
            feature: s.feature.clone(),
            mean_group1: s.mean_group1,
            mean_group2: s.mean_group2,
            log2_fold_change: s.log2_fold_change,
            p_value: s.p_value,
            q_value,
        })
        .collect();

    ResultTable::new(group1, group2, results)
}

/// Everything a renderer needs from one analysis run.
#[derive(Debug, Clone)]
pub struct AnalysisReport {
    /// Configuration the run used.
    pub config: AnalysisConfig,
    /// Joined samples with the two groups resolved.
    pub samples: GroupedSamples,
    /// Sorted results, one row per feature.
    pub table: ResultTable,
    /// Rows to annotate on the volcano plot.
    pub labels: LabelSelection,
}

impl AnalysisReport {
    /// Column label of the log2 fold-change.
    pub fn log2fc_label(&self) -> String {
        self.table.log2fc_label()
    }

    /// Names of the top `n` features by (q-value, p-value).
    pub fn top_features(&self, n: usize) -> Vec<String> {
        self.table.top(n).iter().map(|r| r.feature.clone()).collect()
    }
}

/// The whole analysis on loaded tables: validate, join, test every feature,
/// correct, sort and pick labels. Pure; nothing is written.
pub fn analyze(
    config: &AnalysisConfig,
    abundance: &AbundanceTable,
    metadata: &Metadata,
) -> Result<AnalysisReport> {
    config.validate()?;
    analyze_validated(config, abundance, metadata)
}

/// [`analyze`] for a configuration that already passed `validate()`.
fn analyze_validated(
    config: &AnalysisConfig,
    abundance: &AbundanceTable,
    metadata: &Metadata,
) -> Result<AnalysisReport> {
    let samples = GroupedSamples::join(
        abundance,
        metadata,
        &config.group_col,
        &config.group1,
        &config.group2,
    )?;
    info!(
        "Comparing {} (n={}) against {} (n={}) on {} features",
        config.group2,
        samples.n_group2(),
        config.group1,
        samples.n_group1(),
        samples.n_features()
    );

    let stats = compute_feature_stats(&samples);
    let n_exact = stats.iter().filter(|s| s.method == MwuMethod::Exact).count();
    debug!(
        "Mann-Whitney p-values: {} exact, {} asymptotic",
        n_exact,
        stats.len() - n_exact
    );

    let table = build_result_table(&config.group1, &config.group2, &stats);
    let labels = select_labels_for(&table, config);
    info!("{} features labeled (mode: {})", labels.len(), config.label_mode);

    Ok(AnalysisReport {
        config: config.clone(),
        samples,
        table,
        labels,
    })
}

/// Two-group analysis driven by an immutable configuration.
#[derive(Debug, Clone)]
pub struct Pipeline {
    config: AnalysisConfig,
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new(AnalysisConfig::default())
    }
}

impl Pipeline {
    /// Create a pipeline for a configuration.
    pub fn new(config: AnalysisConfig) -> Self {
        Self { config }
    }

    /// The configuration in use.
    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Load both input tables named by the configuration.
    pub fn load(&self) -> Result<(AbundanceTable, Metadata)> {
        let delimiter = self.config.delimiter()?;

        info!("Loading abundance table from {:?}", self.config.abundance);
        let abundance = AbundanceTable::from_path(&self.config.abundance, delimiter)?;
        info!("Loading metadata from {:?}", self.config.metadata);
        let metadata = Metadata::from_path(&self.config.metadata, delimiter)?;

        info!(
            "Loaded {} samples x {} features; {} metadata rows",
            abundance.n_samples(),
            abundance.n_features(),
            metadata.n_samples()
        );
        Ok((abundance, metadata))
    }

    /// Run the statistics on already-loaded tables. Writes nothing.
    pub fn run(&self, abundance: &AbundanceTable, metadata: &Metadata) -> Result<AnalysisReport> {
        analyze(&self.config, abundance, metadata)
    }

    /// Validate the configuration, then load the inputs and run the
    /// statistics. A bad configuration fails before any file is opened.
    pub fn run_from_files(&self) -> Result<AnalysisReport> {
        self.config.validate()?;
        let (abundance, metadata) = self.load()?;
        analyze_validated(&self.config, &abundance, &metadata)
    }
}
