//! Effect size estimation.

pub mod fold_change;

pub use fold_change::{fold_change, mean, FoldChange, FOLD_CHANGE_EPSILON};
