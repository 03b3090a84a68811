//! Error types for the microbiome-assoc library.

use thiserror::Error;

/// Main error type for the library.
#[derive(Error, Debug)]
pub enum DaaError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV parsing error: {0}")]
    Csv(#[from] csv::Error),

    #[error("{table} table must contain a '{column}' column")]
    MissingColumn { table: String, column: String },

    #[error(
        "SampleID mismatch detected: present in metadata but missing in abundance: {missing_in_abundance:?}; \
         present in abundance but missing in metadata: {missing_in_metadata:?}"
    )]
    SampleMismatch {
        missing_in_abundance: Vec<String>,
        missing_in_metadata: Vec<String>,
    },

    #[error("One of the groups is empty. Found sizes: {group1}={n1}, {group2}={n2}")]
    EmptyGroup {
        group1: String,
        n1: usize,
        group2: String,
        n2: usize,
    },

    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("Duplicate SampleID '{sample_id}' in {table} table")]
    DuplicateSample { table: String, sample_id: String },

    #[error("Invalid abundance value '{value}' for sample '{sample}', feature '{feature}'")]
    InvalidValue {
        value: String,
        sample: String,
        feature: String,
    },

    #[error("Empty data: {0}")]
    EmptyData(String),

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("YAML serialization error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for library operations.
pub type Result<T> = std::result::Result<T, DaaError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mismatch_lists_both_sides() {
        let err = DaaError::SampleMismatch {
            missing_in_abundance: vec!["S9".into()],
            missing_in_metadata: vec!["S7".into()],
        };
        let msg = err.to_string();
        assert!(msg.contains("S9"));
        assert!(msg.contains("S7"));
    }

    #[test]
    fn test_empty_group_reports_sizes() {
        let err = DaaError::EmptyGroup {
            group1: "Mild".into(),
            n1: 3,
            group2: "Severe".into(),
            n2: 0,
        };
        assert_eq!(
            err.to_string(),
            "One of the groups is empty. Found sizes: Mild=3, Severe=0"
        );
    }
}
