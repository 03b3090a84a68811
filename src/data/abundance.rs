//! Feature abundance table (samples x features).

use crate::config::SAMPLE_ID_COLUMN;
use crate::data::table::DelimitedTable;
use crate::error::{DaaError, Result};
use nalgebra::DMatrix;
use std::path::Path;

/// A dense abundance table storing one numeric value per sample and feature.
///
/// Rows represent samples, columns represent features. Feature columns are
/// every column of the input except `SampleID`, in file order.
#[derive(Debug, Clone)]
pub struct AbundanceTable {
    /// Dense matrix (samples x features).
    data: DMatrix<f64>,
    /// Sample identifiers (row names).
    sample_ids: Vec<String>,
    /// Feature identifiers (column names).
    feature_ids: Vec<String>,
}

impl AbundanceTable {
    /// Create a new AbundanceTable from a dense matrix and identifiers.
    pub fn new(
        data: DMatrix<f64>,
        sample_ids: Vec<String>,
        feature_ids: Vec<String>,
    ) -> Result<Self> {
        let (nrows, ncols) = data.shape();
        if nrows != sample_ids.len() {
            return Err(DaaError::DimensionMismatch {
                expected: nrows,
                actual: sample_ids.len(),
            });
        }
        if ncols != feature_ids.len() {
            return Err(DaaError::DimensionMismatch {
                expected: ncols,
                actual: feature_ids.len(),
            });
        }
        Ok(Self {
            data,
            sample_ids,
            feature_ids,
        })
    }

    /// Load an abundance table from a delimited file.
    pub fn from_path<P: AsRef<Path>>(path: P, delimiter: u8) -> Result<Self> {
        let table = DelimitedTable::from_path(path, delimiter)?;
        Self::from_table(&table)
    }

    /// Build from an already-read delimited table.
    ///
    /// Every non-identifier cell must parse as a finite number.
    pub fn from_table(table: &DelimitedTable) -> Result<Self> {
        let id_col = table.require_column(SAMPLE_ID_COLUMN, "Abundance")?;
        let sample_ids = table.unique_ids(id_col, "Abundance")?;

        let feature_cols: Vec<usize> = (0..table.headers().len())
            .filter(|&c| c != id_col)
            .collect();
        let feature_ids: Vec<String> = feature_cols
            .iter()
            .map(|&c| table.headers()[c].clone())
            .collect();

        let mut values = Vec::with_capacity(sample_ids.len() * feature_ids.len());
        for (row, sample_id) in table.rows().iter().zip(&sample_ids) {
            for (&col, feature_id) in feature_cols.iter().zip(&feature_ids) {
                let raw = &row[col];
                let value: f64 = raw
                    .parse()
                    .ok()
                    .filter(|v: &f64| v.is_finite())
                    .ok_or_else(|| DaaError::InvalidValue {
                        value: raw.clone(),
                        sample: sample_id.clone(),
                        feature: feature_id.clone(),
                    })?;
                values.push(value);
            }
        }

        let data = DMatrix::from_row_slice(sample_ids.len(), feature_ids.len(), &values);
        Self::new(data, sample_ids, feature_ids)
    }

    /// Get the value at (sample, feature).
    #[inline]
    pub fn get(&self, sample: usize, feature: usize) -> f64 {
        self.data[(sample, feature)]
    }

    /// Number of samples (rows).
    #[inline]
    pub fn n_samples(&self) -> usize {
        self.data.nrows()
    }

    /// Number of features (columns).
    #[inline]
    pub fn n_features(&self) -> usize {
        self.data.ncols()
    }

    /// Sample identifiers.
    #[inline]
    pub fn sample_ids(&self) -> &[String] {
        &self.sample_ids
    }

    /// Feature identifiers.
    #[inline]
    pub fn feature_ids(&self) -> &[String] {
        &self.feature_ids
    }

    /// Get the underlying dense matrix.
    #[inline]
    pub fn data(&self) -> &DMatrix<f64> {
        &self.data
    }

    /// Subset to the given sample rows, in the given order.
    pub fn subset_samples(&self, indices: &[usize]) -> Result<Self> {
        if let Some(&bad) = indices.iter().find(|&&i| i >= self.n_samples()) {
            return Err(DaaError::InvalidParameter(format!(
                "Sample index {} out of bounds",
                bad
            )));
        }
        let data = self.data.select_rows(indices);
        let sample_ids = indices.iter().map(|&i| self.sample_ids[i].clone()).collect();
        Self::new(data, sample_ids, self.feature_ids.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn load(text: &str) -> Result<AbundanceTable> {
        let table = DelimitedTable::from_reader(text.as_bytes(), b',')?;
        AbundanceTable::from_table(&table)
    }

    #[test]
    fn test_dimensions() {
        let abundance = load("SampleID,taxon_A,taxon_B\nS1,1.5,0\nS2,2,10\nS3,0,3\n").unwrap();
        assert_eq!(abundance.n_samples(), 3);
        assert_eq!(abundance.n_features(), 2);
        assert_eq!(abundance.feature_ids(), &["taxon_A", "taxon_B"]);
        assert_eq!(abundance.get(0, 0), 1.5);
        assert_eq!(abundance.get(1, 1), 10.0);
    }

    #[test]
    fn test_sample_id_not_first_column() {
        let abundance = load("taxon_A,SampleID,taxon_B\n1,S1,2\n").unwrap();
        assert_eq!(abundance.sample_ids(), &["S1"]);
        assert_eq!(abundance.feature_ids(), &["taxon_A", "taxon_B"]);
        assert_eq!(abundance.get(0, 1), 2.0);
    }

    #[test]
    fn test_missing_sample_id() {
        let err = load("Sample,taxon_A\nS1,1\n").unwrap_err();
        assert!(matches!(err, DaaError::MissingColumn { .. }));
    }

    #[test]
    fn test_non_numeric_value() {
        let err = load("SampleID,taxon_A\nS1,abc\n").unwrap_err();
        match err {
            DaaError::InvalidValue { value, sample, feature } => {
                assert_eq!(value, "abc");
                assert_eq!(sample, "S1");
                assert_eq!(feature, "taxon_A");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_non_finite_value() {
        assert!(load("SampleID,taxon_A\nS1,NaN\n").is_err());
        assert!(load("SampleID,taxon_A\nS1,\n").is_err());
    }

    #[test]
    fn test_no_features() {
        let abundance = load("SampleID\nS1\nS2\n").unwrap();
        assert_eq!(abundance.n_features(), 0);
        assert_eq!(abundance.n_samples(), 2);
    }

    #[test]
    fn test_subset_samples() {
        let abundance = load("SampleID,A\nS1,1\nS2,2\nS3,3\n").unwrap();
        let subset = abundance.subset_samples(&[2, 0]).unwrap();
        assert_eq!(subset.sample_ids(), &["S3", "S1"]);
        assert_eq!(subset.get(0, 0), 3.0);
        assert_eq!(subset.get(1, 0), 1.0);
        assert!(abundance.subset_samples(&[5]).is_err());
    }
}
