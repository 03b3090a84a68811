//! Data structures for two-group differential abundance analysis.

mod abundance;
mod groups;
mod metadata;
mod result;
mod table;

pub use abundance::AbundanceTable;
pub use groups::{check_sample_ids, GroupedSamples};
pub use metadata::Metadata;
pub use result::{compare_by_significance, FeatureResult, ResultSummary, ResultTable};
pub use table::DelimitedTable;
