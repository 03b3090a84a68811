//! Analysis configuration.
//!
//! A single immutable [`AnalysisConfig`] is built once per run (defaults, then an
//! optional YAML file, then command-line overrides) and threaded through every
//! stage of the pipeline.

use crate::error::{DaaError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Name of the sample identifier column expected in both input tables.
pub const SAMPLE_ID_COLUMN: &str = "SampleID";

/// How features are chosen for annotation on the volcano plot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LabelMode {
    /// Significance cutoff plus fold-change cutoff.
    #[default]
    Threshold,
    /// The N features with the smallest q-values.
    Top,
    /// No annotation.
    None,
}

impl LabelMode {
    /// Get the descriptive name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Threshold => "threshold",
            Self::Top => "top",
            Self::None => "none",
        }
    }
}

impl std::fmt::Display for LabelMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Full configuration for one analysis run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Path to the abundance table.
    pub abundance: PathBuf,
    /// Path to the metadata table.
    pub metadata: PathBuf,
    /// Field delimiter shared by both inputs (`\t` or `tab` for TAB).
    pub sep: String,
    /// Metadata column holding the group labels.
    pub group_col: String,
    /// Baseline group label.
    pub group1: String,
    /// Group compared against `group1`.
    pub group2: String,
    /// Output directory.
    pub out: PathBuf,
    /// Volcano labeling mode.
    pub label_mode: LabelMode,
    /// Number of features labeled in `top` mode.
    pub top_n: usize,
    /// Threshold on q-values instead of raw p-values.
    pub use_q: bool,
    /// Raw p-value threshold.
    pub p_thresh: f64,
    /// q-value (FDR) threshold.
    pub q_thresh: f64,
    /// Absolute log2 fold-change threshold.
    pub fc_thresh: f64,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            abundance: PathBuf::from("data/example_microbiome.csv"),
            metadata: PathBuf::from("data/example_metadata.csv"),
            sep: ",".to_string(),
            group_col: "Severity".to_string(),
            group1: "Mild".to_string(),
            group2: "Severe".to_string(),
            out: PathBuf::from("results"),
            label_mode: LabelMode::Threshold,
            top_n: 10,
            use_q: false,
            p_thresh: 0.05,
            q_thresh: 0.10,
            fc_thresh: 1.0,
        }
    }
}

impl AnalysisConfig {
    /// Load from YAML string. Missing keys take their default values.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        serde_yaml::from_str(yaml).map_err(DaaError::from)
    }

    /// Load from a YAML file.
    pub fn from_yaml_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_yaml(&text)
    }

    /// Save to YAML string.
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).map_err(DaaError::from)
    }

    /// Resolve `sep` to the single byte used by the table reader.
    pub fn delimiter(&self) -> Result<u8> {
        parse_delimiter(&self.sep)
    }

    /// Check the configuration for values the pipeline cannot work with.
    pub fn validate(&self) -> Result<()> {
        self.delimiter()?;

        if self.group_col.trim().is_empty() {
            return Err(DaaError::InvalidParameter(
                "group_col must not be empty".to_string(),
            ));
        }
        if self.group1 == self.group2 {
            return Err(DaaError::InvalidParameter(format!(
                "group1 and group2 must differ (both are '{}')",
                self.group1
            )));
        }
        for (name, value) in [
            ("p_thresh", self.p_thresh),
            ("q_thresh", self.q_thresh),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(DaaError::InvalidParameter(format!(
                    "{} must be within [0, 1], got {}",
                    name, value
                )));
            }
        }
        if !self.fc_thresh.is_finite() || self.fc_thresh < 0.0 {
            return Err(DaaError::InvalidParameter(format!(
                "fc_thresh must be a non-negative number, got {}",
                self.fc_thresh
            )));
        }
        Ok(())
    }
}

/// Parse a delimiter argument. Accepts a single ASCII character, or the
/// spellings `\t` and `tab` for a TAB.
pub fn parse_delimiter(sep: &str) -> Result<u8> {
    match sep {
        "\\t" | "tab" | "\t" => Ok(b'\t'),
        s if s.len() == 1 && s.is_ascii() => Ok(s.as_bytes()[0]),
        other => Err(DaaError::InvalidParameter(format!(
            "Delimiter must be a single ASCII character, got '{}'",
            other
        ))),
    }
}
