//! Statistical tests used by the analysis pipeline.
//!
//! This module exposes the result structs and thin delegating functions;
//! the computations live in [`inference`]. Test statistics follow the
//! classical definitions and p-values come from the `statrs` distribution
//! CDFs, they are not approximated here.

pub mod inference;

use crate::error::Result;

/// Outcome of a two-sided test: the statistic and its p-value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TestResult {
    /// Test statistic (t, W, r or K² depending on the test)
    pub statistic: f64,
    /// Two-sided p-value
    pub p_value: f64,
}

impl TestResult {
    /// Whether the p-value falls strictly below `alpha`.
    pub fn is_significant(&self, alpha: f64) -> bool {
        self.p_value < alpha
    }
}

/// Paired (dependent samples) t-test.
///
/// Both samples must have the same length, one value per subject.
///
/// # Example
/// ```
/// use statlab::stats;
///
/// let pre = vec![1.0, 2.0, 3.0, 4.0];
/// let post = vec![2.0, 3.0, 4.0, 6.0];
/// let res = stats::paired_ttest(&pre, &post).unwrap();
/// assert!((res.statistic + 5.0).abs() < 1e-9);
/// ```
pub fn paired_ttest<T: AsRef<[f64]>, U: AsRef<[f64]>>(sample1: T, sample2: U) -> Result<TestResult> {
    inference::paired_ttest_impl(sample1.as_ref(), sample2.as_ref())
}

/// Independent two-sample t-test.
///
/// `equal_var` selects the pooled-variance form; otherwise Welch's
/// correction is applied to the degrees of freedom.
pub fn indep_ttest<T: AsRef<[f64]>, U: AsRef<[f64]>>(
    sample1: T,
    sample2: U,
    equal_var: bool,
) -> Result<TestResult> {
    inference::indep_ttest_impl(sample1.as_ref(), sample2.as_ref(), equal_var)
}

/// Levene's test for homogeneity of variance between two samples
/// (median-centered form).
pub fn levene<T: AsRef<[f64]>, U: AsRef<[f64]>>(sample1: T, sample2: U) -> Result<TestResult> {
    inference::levene_impl(sample1.as_ref(), sample2.as_ref())
}

/// Pearson product-moment correlation.
///
/// The statistic is the correlation coefficient r; the p-value tests
/// r = 0 via the t transform with n-2 degrees of freedom.
pub fn pearson<T: AsRef<[f64]>, U: AsRef<[f64]>>(x: T, y: U) -> Result<TestResult> {
    inference::pearson_impl(x.as_ref(), y.as_ref())
}

/// D'Agostino-Pearson omnibus normality test (K² statistic).
///
/// Requires at least 8 observations.
pub fn normality<T: AsRef<[f64]>>(sample: T) -> Result<TestResult> {
    inference::normality_impl(sample.as_ref())
}

/// Sphericity-correction regime for a repeated-measures ANOVA line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Correction {
    SphericityAssumed,
    GreenhouseGeisser,
    HuynhFeldt,
    LowerBound,
}

impl Correction {
    pub fn label(&self) -> &'static str {
        match self {
            Correction::SphericityAssumed => "Sphericity Assumed",
            Correction::GreenhouseGeisser => "Greenhouse-Geisser",
            Correction::HuynhFeldt => "Huynh-Feldt",
            Correction::LowerBound => "Lower-bound",
        }
    }

    pub const ALL: [Correction; 4] = [
        Correction::SphericityAssumed,
        Correction::GreenhouseGeisser,
        Correction::HuynhFeldt,
        Correction::LowerBound,
    ];
}

/// One source line of a repeated-measures ANOVA table.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnovaLine {
    pub correction: Correction,
    /// Type III sum of squares (unchanged by the correction)
    pub ss: f64,
    /// Degrees of freedom after scaling by the correction's epsilon
    pub df: f64,
    /// Mean square (ss / df)
    pub ms: f64,
    /// F statistic; None for the error term
    pub f: Option<f64>,
    /// p-value under the corrected degrees of freedom; None for the error term
    pub p: Option<f64>,
}

/// One-way within-subjects (repeated measures) ANOVA result.
#[derive(Debug, Clone, PartialEq)]
pub struct RmAnovaResult {
    /// Condition level labels in first-seen order
    pub levels: Vec<String>,
    /// Number of subjects
    pub subjects: usize,
    /// Main-effect lines, one per correction regime
    pub effect: Vec<AnovaLine>,
    /// Error-term lines, one per correction regime
    pub error: Vec<AnovaLine>,
    /// Greenhouse-Geisser epsilon estimate
    pub gg_epsilon: f64,
    /// Huynh-Feldt epsilon estimate (capped at 1)
    pub hf_epsilon: f64,
}

/// One-way repeated-measures ANOVA over long-format observations.
///
/// `subjects`, `levels` and `values` are parallel: one entry per
/// observation. The design must be balanced (every subject measured once
/// per level).
pub fn rm_anova(subjects: &[String], levels: &[String], values: &[f64]) -> Result<RmAnovaResult> {
    inference::rm_anova_impl(subjects, levels, values)
}
