//! statlab: statistical-analysis helpers over tabular experimental data.
//!
//! The core is the test-selection and result-aggregation pipeline in
//! [`analysis`]: given a [`Dataset`], a set of named variables and optional
//! grouping keys, it decides which test variant to run (e.g. pooled vs
//! Welch t-test, chosen by a Levene diagnostic), executes it and assembles
//! a uniform [`ResultTable`] with a significance-filtering option. The
//! [`io`] module loads datasets from and exports tables to spreadsheet
//! files.

pub mod analysis;
pub mod dataset;
pub mod error;
pub mod groupby;
pub mod io;
pub mod stats;
pub mod table;

// Re-export commonly used types
pub use analysis::{
    bonferroni, grouped_indep_ttest, grouped_paired_ttest, indep_ttest, normality_test,
    paired_ttest, pearson_correl, rm_anova, GroupSpec, ALPHA,
};
pub use dataset::{Dataset, Value};
pub use error::{Error, Result};
pub use groupby::{partition, GroupedDataset};
pub use table::{Cell, ResultTable};

// Export version info
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
