//! Sample metadata handling for differential abundance analysis.

use crate::config::SAMPLE_ID_COLUMN;
use crate::data::table::DelimitedTable;
use crate::error::{DaaError, Result};
use std::collections::HashMap;
use std::path::Path;

/// Sample metadata: one row of string values per sample.
///
/// Values are kept as text; empty cells and `NA`/`na` are treated as missing.
/// Columns other than the identifier and the grouping column are carried but
/// not used by the analysis.
#[derive(Debug, Clone, Default)]
pub struct Metadata {
    /// Sample IDs in file order.
    sample_ids: Vec<String>,
    /// Column names (excluding `SampleID`).
    column_names: Vec<String>,
    /// Data stored as sample_id -> column_name -> value (None when missing).
    data: HashMap<String, HashMap<String, Option<String>>>,
}

impl Metadata {
    /// Load metadata from a delimited file.
    pub fn from_path<P: AsRef<Path>>(path: P, delimiter: u8) -> Result<Self> {
        let table = DelimitedTable::from_path(path, delimiter)?;
        Self::from_table(&table)
    }

    /// Build from an already-read delimited table.
    pub fn from_table(table: &DelimitedTable) -> Result<Self> {
        let id_col = table.require_column(SAMPLE_ID_COLUMN, "Metadata")?;
        let sample_ids = table.unique_ids(id_col, "Metadata")?;

        let columns: Vec<(usize, String)> = table
            .headers()
            .iter()
            .enumerate()
            .filter(|(c, _)| *c != id_col)
            .map(|(c, name)| (c, name.clone()))
            .collect();

        let mut data = HashMap::with_capacity(sample_ids.len());
        for (row, sample_id) in table.rows().iter().zip(&sample_ids) {
            let sample_data: HashMap<String, Option<String>> = columns
                .iter()
                .map(|(c, name)| {
                    let raw = row[*c].as_str();
                    let value = if raw.is_empty() || raw == "NA" || raw == "na" {
                        None
                    } else {
                        Some(raw.to_string())
                    };
                    (name.clone(), value)
                })
                .collect();
            data.insert(sample_id.clone(), sample_data);
        }

        Ok(Self {
            sample_ids,
            column_names: columns.into_iter().map(|(_, name)| name).collect(),
            data,
        })
    }

    /// Sample IDs in order.
    pub fn sample_ids(&self) -> &[String] {
        &self.sample_ids
    }

    /// Column names.
    pub fn column_names(&self) -> &[String] {
        &self.column_names
    }

    /// Number of samples.
    pub fn n_samples(&self) -> usize {
        self.sample_ids.len()
    }

    /// Get a value for a specific sample and column. `None` if the sample or
    /// column is unknown, or the value is missing.
    pub fn get(&self, sample_id: &str, column: &str) -> Option<&str> {
        self.data
            .get(sample_id)
            .and_then(|m| m.get(column))
            .and_then(|v| v.as_deref())
    }

    /// Get all values for a column, in sample order.
    pub fn column(&self, column: &str) -> Result<Vec<Option<&str>>> {
        if !self.has_column(column) {
            return Err(DaaError::MissingColumn {
                table: "Metadata".to_string(),
                column: column.to_string(),
            });
        }
        Ok(self
            .sample_ids
            .iter()
            .map(|sid| self.get(sid, column))
            .collect())
    }

    /// Check if a column exists.
    pub fn has_column(&self, column: &str) -> bool {
        self.column_names.iter().any(|c| c == column)
    }
}
