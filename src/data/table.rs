//! Generic delimited-table reading shared by the abundance and metadata loaders.

use crate::error::{DaaError, Result};
use std::collections::HashSet;
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// A header plus string records, exactly as read from a delimited file.
#[derive(Debug, Clone)]
pub struct DelimitedTable {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl DelimitedTable {
    /// Read a delimited file. Cells are trimmed of surrounding whitespace and
    /// blank lines are skipped.
    pub fn from_path<P: AsRef<Path>>(path: P, delimiter: u8) -> Result<Self> {
        let file = File::open(path)?;
        Self::from_reader(file, delimiter)
    }

    /// Read delimited text from any reader.
    pub fn from_reader<R: Read>(reader: R, delimiter: u8) -> Result<Self> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .delimiter(delimiter)
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let headers: Vec<String> = csv_reader.headers()?.iter().map(String::from).collect();
        if headers.is_empty() || headers.iter().all(|h| h.is_empty()) {
            return Err(DaaError::EmptyData("Table has no header row".to_string()));
        }

        let mut rows = Vec::new();
        for record in csv_reader.records() {
            let record = record?;
            rows.push(record.iter().map(String::from).collect());
        }

        Ok(Self { headers, rows })
    }

    /// Column names in file order.
    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    /// Data rows in file order.
    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    /// Number of data rows.
    pub fn n_rows(&self) -> usize {
        self.rows.len()
    }

    /// Position of a column, if present.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    /// Position of a column that must be present; `table` names the input in
    /// the error message.
    pub fn require_column(&self, name: &str, table: &str) -> Result<usize> {
        self.column_index(name).ok_or_else(|| DaaError::MissingColumn {
            table: table.to_string(),
            column: name.to_string(),
        })
    }

    /// Values of the identifier column, rejecting duplicates.
    pub fn unique_ids(&self, id_col: usize, table: &str) -> Result<Vec<String>> {
        let mut seen = HashSet::with_capacity(self.rows.len());
        let mut ids = Vec::with_capacity(self.rows.len());
        for row in &self.rows {
            let id = row[id_col].clone();
            if !seen.insert(id.clone()) {
                return Err(DaaError::DuplicateSample {
                    table: table.to_string(),
                    sample_id: id,
                });
            }
            ids.push(id);
        }
        Ok(ids)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_comma() {
        let text = "SampleID, A ,B\nS1, 1 ,2\nS2,3,4\n";
        let table = DelimitedTable::from_reader(text.as_bytes(), b',').unwrap();
        assert_eq!(table.headers(), &["SampleID", "A", "B"]);
        assert_eq!(table.n_rows(), 2);
        assert_eq!(table.rows()[0], vec!["S1", "1", "2"]);
    }

    #[test]
    fn test_read_tab() {
        let text = "SampleID\tgroup\nS1\tMild\n";
        let table = DelimitedTable::from_reader(text.as_bytes(), b'\t').unwrap();
        assert_eq!(table.column_index("group"), Some(1));
        assert_eq!(table.rows()[0][1], "Mild");
    }

    #[test]
    fn test_ragged_row_is_error() {
        let text = "SampleID,A,B\nS1,1\n";
        assert!(matches!(
            DelimitedTable::from_reader(text.as_bytes(), b','),
            Err(DaaError::Csv(_))
        ));
    }

    #[test]
    fn test_require_column() {
        let text = "id,A\nS1,1\n";
        let table = DelimitedTable::from_reader(text.as_bytes(), b',').unwrap();
        let err = table.require_column("SampleID", "Abundance").unwrap_err();
        assert!(matches!(err, DaaError::MissingColumn { .. }));
        assert_eq!(
            err.to_string(),
            "Abundance table must contain a 'SampleID' column"
        );
    }

    #[test]
    fn test_duplicate_ids() {
        let text = "SampleID,A\nS1,1\nS1,2\n";
        let table = DelimitedTable::from_reader(text.as_bytes(), b',').unwrap();
        assert!(matches!(
            table.unique_ids(0, "Abundance"),
            Err(DaaError::DuplicateSample { .. })
        ));
    }
}
