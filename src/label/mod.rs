//! Selection of features to annotate on the volcano plot.
//!
//! The selection only drives annotation; the persisted result table always
//! keeps every feature.

use crate::config::{AnalysisConfig, LabelMode};
use crate::data::{FeatureResult, ResultTable};
use serde::{Deserialize, Serialize};

/// Cutoffs used by the `threshold` labeling mode.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LabelThresholds {
    /// Compare q-values instead of raw p-values.
    pub use_q: bool,
    /// Raw p-value cutoff.
    pub p_thresh: f64,
    /// q-value cutoff.
    pub q_thresh: f64,
    /// Absolute log2 fold-change cutoff.
    pub fc_thresh: f64,
}

impl LabelThresholds {
    /// Thresholds taken from a configuration.
    pub fn from_config(config: &AnalysisConfig) -> Self {
        Self {
            use_q: config.use_q,
            p_thresh: config.p_thresh,
            q_thresh: config.q_thresh,
            fc_thresh: config.fc_thresh,
        }
    }

    /// Whether a single result passes both the significance and the
    /// fold-change cutoff (strict comparisons).
    pub fn passes(&self, result: &FeatureResult) -> bool {
        let significant = if self.use_q {
            result.q_value < self.q_thresh
        } else {
            result.p_value < self.p_thresh
        };
        significant && result.log2_fold_change.abs() > self.fc_thresh
    }
}

/// Features chosen for annotation, as indices into a [`ResultTable`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelSelection {
    /// Mode that produced the selection.
    pub mode: LabelMode,
    /// Row indices into the sorted result table, ascending.
    pub indices: Vec<usize>,
}

impl LabelSelection {
    /// Number of labeled features.
    pub fn len(&self) -> usize {
        self.indices.len()
    }

    /// Check if nothing is labeled.
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Whether a table row is labeled.
    pub fn contains(&self, index: usize) -> bool {
        self.indices.binary_search(&index).is_ok()
    }

    /// The labeled rows themselves.
    pub fn rows<'a>(&'a self, table: &'a ResultTable) -> impl Iterator<Item = &'a FeatureResult> + 'a {
        self.indices.iter().filter_map(move |&i| table.results.get(i))
    }

    /// Names of the labeled features, in table order.
    pub fn feature_names(&self, table: &ResultTable) -> Vec<String> {
        self.rows(table).map(|r| r.feature.clone()).collect()
    }
}

/// Apply a labeling mode to a sorted result table.
///
/// - `threshold`: every row passing [`LabelThresholds::passes`]
/// - `top`: the first `top_n` rows, i.e. the smallest q-values, regardless of
///   fold-change
/// - `none`: nothing
pub fn select_labels(
    table: &ResultTable,
    mode: LabelMode,
    top_n: usize,
    thresholds: &LabelThresholds,
) -> LabelSelection {
    let indices = match mode {
        LabelMode::Threshold => table
            .iter()
            .enumerate()
            .filter(|(_, r)| thresholds.passes(r))
            .map(|(i, _)| i)
            .collect(),
        LabelMode::Top => (0..top_n.min(table.len())).collect(),
        LabelMode::None => Vec::new(),
    };
    LabelSelection { mode, indices }
}

/// [`select_labels`] with every setting taken from the configuration.
pub fn select_labels_for(table: &ResultTable, config: &AnalysisConfig) -> LabelSelection {
    select_labels(
        table,
        config.label_mode,
        config.top_n,
        &LabelThresholds::from_config(config),
    )
}
