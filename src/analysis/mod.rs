//! Test selection and result aggregation over a [`Dataset`].
//!
//! Every operation here takes the dataset, a `significant_only` flag and a
//! variable selection, decides which test variant to run, and assembles a
//! [`ResultTable`] with a fixed header per operation. With
//! `significant_only` set, a data row is kept only when its test's p-value
//! falls strictly below the significance threshold; rows that carry no
//! p-value (ANOVA error terms, the Bonferroni threshold line) are
//! informational and always kept.

use log::debug;

use crate::dataset::Dataset;
use crate::error::{Error, Result};
use crate::groupby::partition;
use crate::stats;
use crate::table::{Cell, ResultTable};

/// Nominal significance level.
pub const ALPHA: f64 = 0.05;

const PAIRED_HEADER: [&str; 3] = ["Test-name", "Test Statistic", "p-Value"];
const INDEP_HEADER: [&str; 5] = [
    "Test-name",
    "Levene Statistic",
    "Levene p-Value",
    "Test Statistic",
    "p-Value",
];
const CORREL_HEADER: [&str; 3] = ["Test-name", "Correl. coefficient", "p-Value"];
const NORMALITY_HEADER: [&str; 3] = ["Variable", "Test Statistic", "p-Value"];
const GROUPED_PAIRED_HEADER: [&str; 4] = ["Group", "Test-name", "Test Statistic", "p-Value"];
const GROUPED_INDEP_HEADER: [&str; 6] = [
    "Group",
    "Test-name",
    "Levene Statistic",
    "Levene p-Value",
    "Test Statistic",
    "p-Value",
];
const ANOVA_HEADER: [&str; 7] = ["Source", "Correction", "Type III SS", "df", "SM", "F", "Sig"];
const BONFERRONI_HEADER: [&str; 4] = ["Variable", "Compared-with", "Test Statistic", "p-Value"];

/// Selector for an independent-groups comparison: the grouping variable and
/// the two category labels to compare.
#[derive(Debug, Clone, Copy)]
pub struct GroupSpec<'a> {
    pub variable: &'a str,
    pub first: &'a str,
    pub second: &'a str,
}

impl<'a> GroupSpec<'a> {
    pub fn new(variable: &'a str, first: &'a str, second: &'a str) -> Self {
        GroupSpec {
            variable,
            first,
            second,
        }
    }
}

/// A pending result row: its cells plus the p-value the significance
/// filter keys on (None for informational rows).
#[derive(Debug, Clone)]
struct OutcomeRow {
    cells: Vec<Cell>,
    p_value: Option<f64>,
}

fn filter_significant(rows: Vec<OutcomeRow>, significant_only: bool, threshold: f64) -> Vec<OutcomeRow> {
    if !significant_only {
        return rows;
    }
    rows.into_iter()
        .filter(|r| r.p_value.map_or(true, |p| p < threshold))
        .collect()
}

fn build_table(
    header: &[&str],
    rows: Vec<OutcomeRow>,
    significant_only: bool,
    threshold: f64,
) -> Result<ResultTable> {
    let mut table = ResultTable::new(header);
    for row in filter_significant(rows, significant_only, threshold) {
        table.push_row(row.cells)?;
    }
    Ok(table)
}

/// The variance-assumption selector: the pooled t-test runs only when the
/// Levene diagnostic's p-value exceeds the significance level.
fn equal_variance(levene_p: f64) -> bool {
    levene_p > ALPHA
}

fn paired_rows(data: &Dataset, measures: &[&str]) -> Result<Vec<OutcomeRow>> {
    if measures.len() % 2 != 0 {
        return Err(Error::InvalidInput(format!(
            "paired measures must come two by two, got {} names",
            measures.len()
        )));
    }
    let mut rows = Vec::with_capacity(measures.len() / 2);
    for pair in measures.chunks(2) {
        let a = data.numeric(pair[0])?;
        let b = data.numeric(pair[1])?;
        let res = stats::paired_ttest(&a, &b)?;
        rows.push(OutcomeRow {
            cells: vec![
                Cell::text(format!("{}/{}", pair[0], pair[1])),
                Cell::Number(res.statistic),
                Cell::Number(res.p_value),
            ],
            p_value: Some(res.p_value),
        });
    }
    Ok(rows)
}

fn indep_rows(data: &Dataset, group_by: &GroupSpec, measures: &[&str]) -> Result<Vec<OutcomeRow>> {
    let group_col = data.variable(group_by.variable)?;
    let mut idx_first: Vec<usize> = Vec::new();
    let mut idx_second: Vec<usize> = Vec::new();
    for (i, value) in group_col.iter().enumerate() {
        let label = value.label();
        if label == group_by.first {
            idx_first.push(i);
        } else if label == group_by.second {
            idx_second.push(i);
        }
        // rows in neither category are excluded
    }
    for (label, idx) in [(group_by.first, &idx_first), (group_by.second, &idx_second)] {
        if idx.is_empty() {
            return Err(Error::EmptyData(format!(
                "category '{}' of '{}' matches no rows",
                label, group_by.variable
            )));
        }
    }

    let mut rows = Vec::with_capacity(measures.len());
    for &measure in measures {
        let column = data.variable(measure)?;
        let sample_at = |idx: &[usize]| -> Result<Vec<f64>> {
            idx.iter()
                .map(|&i| {
                    column[i].as_number().ok_or_else(|| {
                        Error::InvalidInput(format!(
                            "variable '{}' holds a non-numeric value at row {}",
                            measure, i
                        ))
                    })
                })
                .collect()
        };
        let s1 = sample_at(&idx_first)?;
        let s2 = sample_at(&idx_second)?;

        let lev = stats::levene(&s1, &s2)?;
        let equal = equal_variance(lev.p_value);
        debug!(
            "{} ({}/{}): Levene p = {:.4}, assuming {} variances",
            measure,
            group_by.first,
            group_by.second,
            lev.p_value,
            if equal { "equal" } else { "unequal" }
        );
        let res = stats::indep_ttest(&s1, &s2, equal)?;
        rows.push(OutcomeRow {
            cells: vec![
                Cell::text(format!("{} ({}/{})", measure, group_by.first, group_by.second)),
                Cell::Number(lev.statistic),
                Cell::Number(lev.p_value),
                Cell::Number(res.statistic),
                Cell::Number(res.p_value),
            ],
            p_value: Some(res.p_value),
        });
    }
    Ok(rows)
}

fn correl_rows(data: &Dataset, measures: &[&str]) -> Result<Vec<OutcomeRow>> {
    if measures.len() < 2 {
        return Err(Error::InvalidInput(format!(
            "correlation needs at least two measures, got {}",
            measures.len()
        )));
    }
    let mut rows = Vec::new();
    for i in 0..measures.len() {
        for j in (i + 1)..measures.len() {
            let x = data.numeric(measures[i])?;
            let y = data.numeric(measures[j])?;
            let res = stats::pearson(&x, &y)?;
            rows.push(OutcomeRow {
                cells: vec![
                    Cell::text(format!("{}/{}", measures[i], measures[j])),
                    Cell::Number(res.statistic),
                    Cell::Number(res.p_value),
                ],
                p_value: Some(res.p_value),
            });
        }
    }
    Ok(rows)
}

fn normality_rows(data: &Dataset, measures: &[&str]) -> Result<Vec<OutcomeRow>> {
    let mut rows = Vec::with_capacity(measures.len());
    for &measure in measures {
        let sample = data.numeric(measure)?;
        let res = stats::normality(&sample)?;
        rows.push(OutcomeRow {
            cells: vec![
                Cell::text(measure),
                Cell::Number(res.statistic),
                Cell::Number(res.p_value),
            ],
            p_value: Some(res.p_value),
        });
    }
    Ok(rows)
}

/// Paired t-tests over consecutive (A, B) measure pairs.
pub fn paired_ttest(data: &Dataset, significant_only: bool, measures: &[&str]) -> Result<ResultTable> {
    build_table(&PAIRED_HEADER, paired_rows(data, measures)?, significant_only, ALPHA)
}

/// Independent two-sample t-tests, one per measure, with the variance
/// assumption selected by a Levene diagnostic per comparison.
pub fn indep_ttest(
    data: &Dataset,
    significant_only: bool,
    group_by: &GroupSpec,
    measures: &[&str],
) -> Result<ResultTable> {
    build_table(
        &INDEP_HEADER,
        indep_rows(data, group_by, measures)?,
        significant_only,
        ALPHA,
    )
}

/// Pearson correlation over every unordered pair of the given measures.
pub fn pearson_correl(data: &Dataset, significant_only: bool, measures: &[&str]) -> Result<ResultTable> {
    build_table(&CORREL_HEADER, correl_rows(data, measures)?, significant_only, ALPHA)
}

/// D'Agostino-Pearson normality test per measure.
pub fn normality_test(data: &Dataset, significant_only: bool, measures: &[&str]) -> Result<ResultTable> {
    build_table(
        &NORMALITY_HEADER,
        normality_rows(data, measures)?,
        significant_only,
        ALPHA,
    )
}

// Partition on sort_by, run the base operation per category, and nest each
// category's block under a leading Group cell (label on the block's first
// row, empty after).
fn grouped_table<F>(
    data: &Dataset,
    significant_only: bool,
    sort_by: &str,
    header: &[&str],
    base: F,
) -> Result<ResultTable>
where
    F: Fn(&Dataset) -> Result<Vec<OutcomeRow>>,
{
    let grouped = partition(data, sort_by)?;
    let mut table = ResultTable::new(header);
    for (category, sub) in grouped.iter() {
        let rows = filter_significant(base(sub)?, significant_only, ALPHA);
        for (i, mut row) in rows.into_iter().enumerate() {
            let label = if i == 0 { Cell::text(category) } else { Cell::Empty };
            row.cells.insert(0, label);
            table.push_row(row.cells)?;
        }
    }
    Ok(table)
}

/// [`paired_ttest`] run once per category of `sort_by`.
pub fn grouped_paired_ttest(
    data: &Dataset,
    significant_only: bool,
    sort_by: &str,
    measures: &[&str],
) -> Result<ResultTable> {
    grouped_table(data, significant_only, sort_by, &GROUPED_PAIRED_HEADER, |sub| {
        paired_rows(sub, measures)
    })
}

/// [`indep_ttest`] run once per category of `sort_by`.
pub fn grouped_indep_ttest(
    data: &Dataset,
    significant_only: bool,
    sort_by: &str,
    group_by: &GroupSpec,
    measures: &[&str],
) -> Result<ResultTable> {
    grouped_table(data, significant_only, sort_by, &GROUPED_INDEP_HEADER, |sub| {
        indep_rows(sub, group_by, measures)
    })
}

/// One-way repeated-measures ANOVA.
///
/// `measures` pairs a measured variable with its condition-level label;
/// each dataset row contributes one long-format observation per pair,
/// keyed by the `subject` variable. The table reports the main effect and
/// its error term under four sphericity regimes.
pub fn rm_anova(
    data: &Dataset,
    significant_only: bool,
    subject: &str,
    condition: &str,
    measures: &[(&str, &str)],
) -> Result<ResultTable> {
    if measures.len() < 2 {
        return Err(Error::InvalidInput(format!(
            "repeated-measures ANOVA needs at least two (variable, level) pairs, got {}",
            measures.len()
        )));
    }
    let subject_col = data.variable(subject)?;
    let subject_labels: Vec<String> = subject_col.iter().map(|v| v.label()).collect();

    let mut subjects: Vec<String> = Vec::new();
    let mut levels: Vec<String> = Vec::new();
    let mut values: Vec<f64> = Vec::new();
    for &(variable, level) in measures {
        let column = data.numeric(variable)?;
        for (i, &v) in column.iter().enumerate() {
            subjects.push(subject_labels[i].clone());
            levels.push(level.to_string());
            values.push(v);
        }
    }

    let res = stats::rm_anova(&subjects, &levels, &values)?;

    let effect_rows: Vec<OutcomeRow> = res
        .effect
        .iter()
        .map(|line| OutcomeRow {
            cells: vec![
                Cell::Empty, // source label set after filtering
                Cell::text(line.correction.label()),
                Cell::Number(line.ss),
                Cell::Number(line.df),
                Cell::Number(line.ms),
                line.f.map_or(Cell::Empty, Cell::Number),
                line.p.map_or(Cell::Empty, Cell::Number),
            ],
            p_value: line.p,
        })
        .collect();
    let error_rows: Vec<OutcomeRow> = res
        .error
        .iter()
        .map(|line| OutcomeRow {
            cells: vec![
                Cell::Empty,
                Cell::text(line.correction.label()),
                Cell::Number(line.ss),
                Cell::Number(line.df),
                Cell::Number(line.ms),
                Cell::Empty,
                Cell::Empty,
            ],
            p_value: None,
        })
        .collect();

    let mut table = ResultTable::new(&ANOVA_HEADER);
    for (source, rows) in [
        (condition.to_string(), filter_significant(effect_rows, significant_only, ALPHA)),
        (format!("Error({})", condition), error_rows),
    ] {
        for (i, mut row) in rows.into_iter().enumerate() {
            if i == 0 {
                row.cells[0] = Cell::text(source.clone());
            }
            table.push_row(row.cells)?;
        }
    }
    Ok(table)
}

/// All pairwise paired t-tests among `measures` under a Bonferroni-adjusted
/// threshold of `0.05 / n`.
///
/// Every ordered pair (i, j), i != j, is reported, so each variable's block
/// lists every partner; the table closes with a row stating the adjusted
/// threshold.
pub fn bonferroni(data: &Dataset, significant_only: bool, measures: &[&str]) -> Result<ResultTable> {
    if measures.len() < 2 {
        return Err(Error::InvalidInput(format!(
            "Bonferroni comparison needs at least two measures, got {}",
            measures.len()
        )));
    }
    let n = measures.len();
    let threshold = ALPHA / n as f64;

    let samples: Vec<Vec<f64>> = measures
        .iter()
        .map(|&m| data.numeric(m))
        .collect::<Result<_>>()?;

    let mut rows = Vec::with_capacity(n * (n - 1));
    for i in 0..n {
        for j in 0..n {
            if i == j {
                continue;
            }
            let res = stats::paired_ttest(&samples[i], &samples[j])?;
            rows.push(OutcomeRow {
                cells: vec![
                    Cell::text(measures[i]),
                    Cell::text(measures[j]),
                    Cell::Number(res.statistic),
                    Cell::Number(res.p_value),
                ],
                p_value: Some(res.p_value),
            });
        }
    }

    let mut table = build_table(&BONFERRONI_HEADER, rows, significant_only, threshold)?;
    table.push_row(vec![
        Cell::text(format!("Adjusted significance threshold (0.05/{})", n)),
        Cell::Empty,
        Cell::Empty,
        Cell::Number(threshold),
    ])?;
    Ok(table)
}
