//! Sample identity validation, join, and two-group selection.

use crate::data::{AbundanceTable, Metadata};
use crate::error::{DaaError, Result};
use nalgebra::DMatrix;
use std::collections::{BTreeSet, HashMap};

/// Reject any asymmetric difference between the sample sets of the two tables.
///
/// Both differences are returned sorted so the report is stable.
pub fn check_sample_ids(abundance: &AbundanceTable, metadata: &Metadata) -> Result<()> {
    let abundance_ids: BTreeSet<&str> = abundance.sample_ids().iter().map(String::as_str).collect();
    let metadata_ids: BTreeSet<&str> = metadata.sample_ids().iter().map(String::as_str).collect();

    let missing_in_abundance: Vec<String> = metadata_ids
        .difference(&abundance_ids)
        .map(|s| s.to_string())
        .collect();
    let missing_in_metadata: Vec<String> = abundance_ids
        .difference(&metadata_ids)
        .map(|s| s.to_string())
        .collect();

    if missing_in_abundance.is_empty() && missing_in_metadata.is_empty() {
        Ok(())
    } else {
        Err(DaaError::SampleMismatch {
            missing_in_abundance,
            missing_in_metadata,
        })
    }
}

/// Samples joined across metadata and abundance, with the two comparison
/// groups resolved.
///
/// Rows follow metadata order. Samples whose label is neither group stay in
/// the joined data (they are drawn in boxplots) but take no part in the tests.
#[derive(Debug, Clone)]
pub struct GroupedSamples {
    /// Grouping column name.
    group_col: String,
    /// Baseline label.
    group1: String,
    /// Comparison label.
    group2: String,
    /// Joined sample identifiers.
    sample_ids: Vec<String>,
    /// Group label per joined sample (None when missing).
    labels: Vec<Option<String>>,
    /// Feature identifiers.
    feature_ids: Vec<String>,
    /// Abundance values (joined samples x features).
    values: DMatrix<f64>,
    /// Row indices of group1 samples.
    group1_rows: Vec<usize>,
    /// Row indices of group2 samples.
    group2_rows: Vec<usize>,
}

impl GroupedSamples {
    /// Validate, join, and split the two tables.
    ///
    /// Fails when the grouping column is absent, the sample sets differ, or
    /// either group is empty.
    pub fn join(
        abundance: &AbundanceTable,
        metadata: &Metadata,
        group_col: &str,
        group1: &str,
        group2: &str,
    ) -> Result<Self> {
        if !metadata.has_column(group_col) {
            return Err(DaaError::MissingColumn {
                table: "Metadata".to_string(),
                column: group_col.to_string(),
            });
        }
        check_sample_ids(abundance, metadata)?;

        let row_of: HashMap<&str, usize> = abundance
            .sample_ids()
            .iter()
            .enumerate()
            .map(|(i, s)| (s.as_str(), i))
            .collect();
        let order: Vec<usize> = metadata
            .sample_ids()
            .iter()
            .filter_map(|s| row_of.get(s.as_str()).copied())
            .collect();
        let joined = abundance.subset_samples(&order)?;

        let labels: Vec<Option<String>> = metadata
            .column(group_col)?
            .into_iter()
            .map(|v| v.map(String::from))
            .collect();

        let rows_with = |label: &str| -> Vec<usize> {
            labels
                .iter()
                .enumerate()
                .filter(|(_, l)| l.as_deref() == Some(label))
                .map(|(i, _)| i)
                .collect()
        };
        let group1_rows = rows_with(group1);
        let group2_rows = rows_with(group2);

        if group1_rows.is_empty() || group2_rows.is_empty() {
            return Err(DaaError::EmptyGroup {
                group1: group1.to_string(),
                n1: group1_rows.len(),
                group2: group2.to_string(),
                n2: group2_rows.len(),
            });
        }

        Ok(Self {
            group_col: group_col.to_string(),
            group1: group1.to_string(),
            group2: group2.to_string(),
            sample_ids: joined.sample_ids().to_vec(),
            labels,
            feature_ids: joined.feature_ids().to_vec(),
            values: joined.data().clone(),
            group1_rows,
            group2_rows,
        })
    }

    /// Grouping column name.
    pub fn group_col(&self) -> &str {
        &self.group_col
    }

    /// Baseline label.
    pub fn group1(&self) -> &str {
        &self.group1
    }

    /// Comparison label.
    pub fn group2(&self) -> &str {
        &self.group2
    }

    /// Number of group1 samples.
    pub fn n_group1(&self) -> usize {
        self.group1_rows.len()
    }

    /// Number of group2 samples.
    pub fn n_group2(&self) -> usize {
        self.group2_rows.len()
    }

    /// Joined sample identifiers.
    pub fn sample_ids(&self) -> &[String] {
        &self.sample_ids
    }

    /// Feature identifiers.
    pub fn feature_ids(&self) -> &[String] {
        &self.feature_ids
    }

    /// Number of features.
    pub fn n_features(&self) -> usize {
        self.feature_ids.len()
    }

    /// Position of a feature by name.
    pub fn feature_index(&self, feature: &str) -> Option<usize> {
        self.feature_ids.iter().position(|f| f == feature)
    }

    /// Values of one feature for the group1 samples.
    pub fn group1_values(&self, feature: usize) -> Vec<f64> {
        self.group1_rows.iter().map(|&r| self.values[(r, feature)]).collect()
    }

    /// Values of one feature for the group2 samples.
    pub fn group2_values(&self, feature: usize) -> Vec<f64> {
        self.group2_rows.iter().map(|&r| self.values[(r, feature)]).collect()
    }

    /// Values of one feature split by every label in the grouping column,
    /// labels sorted. Samples with a missing label are skipped.
    pub fn values_by_label(&self, feature: usize) -> Vec<(String, Vec<f64>)> {
        let mut by_label: std::collections::BTreeMap<&str, Vec<f64>> = Default::default();
        for (row, label) in self.labels.iter().enumerate() {
            if let Some(label) = label {
                by_label
                    .entry(label.as_str())
                    .or_default()
                    .push(self.values[(row, feature)]);
            }
        }
        by_label
            .into_iter()
            .map(|(label, values)| (label.to_string(), values))
            .collect()
    }
}
