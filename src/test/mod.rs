//! Statistical hypothesis testing for differential abundance.


pub use mann_whitney::{mann_whitney_u, MannWhitneyResult, MwuMethod};
