use statlab::{analysis, Cell, Dataset, Error, GroupSpec};

const TOL: f64 = 1e-9;

fn pre_post_dataset() -> Dataset {
    let mut d = Dataset::new();
    d.add_numeric("Pre", &[1.0, 2.0, 3.0, 4.0]).unwrap();
    d.add_numeric("Post", &[2.0, 3.0, 4.0, 6.0]).unwrap();
    d
}

#[test]
fn test_paired_ttest_concrete_scenario() {
    let d = pre_post_dataset();
    let table = analysis::paired_ttest(&d, false, &["Pre", "Post"]).unwrap();

    assert_eq!(table.header(), &["Test-name", "Test Statistic", "p-Value"]);
    assert_eq!(table.len(), 1);
    let row = &table.rows()[0];
    assert_eq!(row[0].as_text(), Some("Pre/Post"));
    // diffs [-1, -1, -1, -2] give t = -5 exactly
    assert!((row[1].as_number().unwrap() + 5.0).abs() < TOL);
    let p = row[2].as_number().unwrap();
    assert!(p > 0.0 && p < 0.05);
}

#[test]
fn test_paired_ttest_odd_measures_rejected() {
    let d = pre_post_dataset();
    let err = analysis::paired_ttest(&d, false, &["Pre", "Post", "Pre"]).unwrap_err();
    assert!(matches!(err, Error::InvalidInput(_)));
}

#[test]
fn test_paired_ttest_significance_filter() {
    let mut d = pre_post_dataset();
    d.add_numeric("X", &[1.0, 2.0, 3.0, 4.0]).unwrap();

    // Pre/Post is significant, X/X (p = 1) is not
    let all = analysis::paired_ttest(&d, false, &["Pre", "Post", "X", "X"]).unwrap();
    assert_eq!(all.len(), 2);
    let filtered = analysis::paired_ttest(&d, true, &["Pre", "Post", "X", "X"]).unwrap();
    assert_eq!(filtered.len(), 1);
    assert_eq!(filtered.rows()[0][0].as_text(), Some("Pre/Post"));
}

#[test]
fn test_indep_ttest_concrete_scenario() {
    let mut d = Dataset::new();
    d.add_text("Group", &["A", "A", "B", "B"]).unwrap();
    d.add_numeric("Score", &[1.0, 2.0, 8.0, 9.0]).unwrap();

    let spec = GroupSpec::new("Group", "A", "B");
    let table = analysis::indep_ttest(&d, false, &spec, &["Score"]).unwrap();

    assert_eq!(
        table.header(),
        &["Test-name", "Levene Statistic", "Levene p-Value", "Test Statistic", "p-Value"]
    );
    assert_eq!(table.len(), 1);
    let row = &table.rows()[0];
    assert_eq!(row[0].as_text(), Some("Score (A/B)"));
    // two-point groups have identical absolute deviations: homogeneous
    assert_eq!(row[1].as_number(), Some(0.0));
    assert_eq!(row[2].as_number(), Some(1.0));
    // pooled t comparing [1,2] vs [8,9]
    assert!((row[3].as_number().unwrap() + 7.0 / 0.5_f64.sqrt()).abs() < TOL);
}

#[test]
fn test_indep_ttest_switches_to_welch_on_degenerate_unequal_spread() {
    let mut d = Dataset::new();
    d.add_text("Group", &["A", "A", "B", "B"]).unwrap();
    d.add_numeric("Score", &[1.0, 2.0, 10.0, 20.0]).unwrap();

    let spec = GroupSpec::new("Group", "A", "B");
    let table = analysis::indep_ttest(&d, false, &spec, &["Score"]).unwrap();
    let row = &table.rows()[0];
    // deviations {0.5, 0.5} vs {5.0, 5.0}: homogeneity is rejected outright
    assert!(row[1].as_number().unwrap().is_infinite());
    assert_eq!(row[2].as_number(), Some(0.0));
    // Welch t comparing [1,2] vs [10,20]: (1.5 - 15) / sqrt(0.25 + 12.5)
    let t = row[3].as_number().unwrap();
    assert!((t + 13.5 / 12.75_f64.sqrt()).abs() < TOL);
}

#[test]
fn test_indep_ttest_uses_matched_row_positions() {
    // group rows are interleaved, not a prefix of the dataset
    let mut d = Dataset::new();
    d.add_text("Group", &["B", "A", "B", "A"]).unwrap();
    d.add_numeric("Score", &[8.0, 1.0, 9.0, 2.0]).unwrap();

    let spec = GroupSpec::new("Group", "A", "B");
    let table = analysis::indep_ttest(&d, false, &spec, &["Score"]).unwrap();
    let t = table.rows()[0][3].as_number().unwrap();
    assert!((t + 7.0 / 0.5_f64.sqrt()).abs() < TOL);
}

#[test]
fn test_indep_ttest_excludes_unmatched_rows() {
    let mut d = Dataset::new();
    d.add_text("Group", &["A", "A", "B", "B", "C"]).unwrap();
    d.add_numeric("Score", &[1.0, 2.0, 8.0, 9.0, 100.0]).unwrap();

    let spec = GroupSpec::new("Group", "A", "B");
    let table = analysis::indep_ttest(&d, false, &spec, &["Score"]).unwrap();
    let t = table.rows()[0][3].as_number().unwrap();
    assert!((t + 7.0 / 0.5_f64.sqrt()).abs() < TOL);
}

#[test]
fn test_indep_ttest_empty_category_rejected() {
    let mut d = Dataset::new();
    d.add_text("Group", &["A", "A"]).unwrap();
    d.add_numeric("Score", &[1.0, 2.0]).unwrap();

    let spec = GroupSpec::new("Group", "A", "B");
    assert!(matches!(
        analysis::indep_ttest(&d, false, &spec, &["Score"]),
        Err(Error::EmptyData(_))
    ));
}

#[test]
fn test_pearson_correl_all_pairs() {
    let mut d = Dataset::new();
    d.add_numeric("A", &[1.0, 2.0, 3.0, 4.0, 5.0]).unwrap();
    d.add_numeric("B", &[2.0, 4.0, 5.0, 4.0, 5.0]).unwrap();
    d.add_numeric("C", &[5.0, 4.0, 3.0, 2.0, 1.0]).unwrap();

    let table = analysis::pearson_correl(&d, false, &["A", "B", "C"]).unwrap();
    assert_eq!(table.header(), &["Test-name", "Correl. coefficient", "p-Value"]);
    let names: Vec<_> = table.rows().iter().map(|r| r[0].as_text().unwrap().to_string()).collect();
    assert_eq!(names, vec!["A/B", "A/C", "B/C"]);
    // A and C are perfectly anti-correlated
    assert!((table.rows()[1][1].as_number().unwrap() + 1.0).abs() < TOL);
    assert_eq!(table.rows()[1][2].as_number(), Some(0.0));
}

#[test]
fn test_pearson_correl_needs_two_measures() {
    let d = pre_post_dataset();
    assert!(matches!(
        analysis::pearson_correl(&d, false, &["Pre"]),
        Err(Error::InvalidInput(_))
    ));
}

#[test]
fn test_normality_test_row_per_variable() {
    let mut d = Dataset::new();
    d.add_numeric("X", &[2.1, 3.4, 2.9, 3.1, 2.5, 3.0, 2.8, 3.3, 2.6, 3.2]).unwrap();
    d.add_numeric("Y", &[1.0, 1.1, 0.9, 1.2, 0.8, 1.05, 0.95, 1.15, 0.85, 1.0]).unwrap();

    let table = analysis::normality_test(&d, false, &["X", "Y"]).unwrap();
    assert_eq!(table.header(), &["Variable", "Test Statistic", "p-Value"]);
    assert_eq!(table.len(), 2);
    assert_eq!(table.rows()[0][0].as_text(), Some("X"));
    for row in table.rows() {
        assert!(row[1].as_number().unwrap() >= 0.0);
        let p = row[2].as_number().unwrap();
        assert!(p > 0.0 && p <= 1.0);
    }
}

#[test]
fn test_normality_test_insufficient_data() {
    let d = pre_post_dataset();
    assert!(matches!(
        analysis::normality_test(&d, false, &["Pre"]),
        Err(Error::InsufficientData(_))
    ));
}

#[test]
fn test_grouped_paired_ttest_blocks() {
    let mut d = Dataset::new();
    d.add_text("Site", &["A", "A", "A", "A", "B", "B", "B", "B"]).unwrap();
    d.add_numeric("Pre", &[1.0, 2.0, 3.0, 4.0, 2.0, 4.0, 6.0, 8.0]).unwrap();
    d.add_numeric("Post", &[2.0, 3.0, 4.0, 6.0, 3.0, 5.0, 8.0, 10.0]).unwrap();
    d.add_numeric("X", &[1.0, 1.0, 2.0, 2.0, 3.0, 3.0, 4.0, 4.0]).unwrap();
    d.add_numeric("Y", &[1.5, 1.2, 2.5, 2.2, 3.5, 3.2, 4.5, 4.2]).unwrap();

    let table =
        analysis::grouped_paired_ttest(&d, false, "Site", &["Pre", "Post", "X", "Y"]).unwrap();
    assert_eq!(table.header(), &["Group", "Test-name", "Test Statistic", "p-Value"]);
    assert_eq!(table.len(), 4);

    // first row of each block carries the category label, the rest are blank
    assert_eq!(table.rows()[0][0].as_text(), Some("A"));
    assert_eq!(table.rows()[1][0], Cell::Empty);
    assert_eq!(table.rows()[2][0].as_text(), Some("B"));
    assert_eq!(table.rows()[3][0], Cell::Empty);
    assert_eq!(table.rows()[0][1].as_text(), Some("Pre/Post"));

    // block A's Pre/Post t matches the ungrouped computation on its rows
    assert!((table.rows()[0][2].as_number().unwrap() + 5.0).abs() < TOL);
}

#[test]
fn test_grouped_indep_ttest_blocks() {
    let mut d = Dataset::new();
    d.add_text("Site", &["A", "A", "A", "A", "B", "B", "B", "B"]).unwrap();
    d.add_text("Group", &["x", "x", "y", "y", "x", "x", "y", "y"]).unwrap();
    d.add_numeric("Score", &[1.0, 2.0, 8.0, 9.0, 3.0, 4.0, 6.0, 7.0]).unwrap();

    let spec = GroupSpec::new("Group", "x", "y");
    let table = analysis::grouped_indep_ttest(&d, false, "Site", &spec, &["Score"]).unwrap();
    assert_eq!(table.len(), 2);
    assert_eq!(table.rows()[0][0].as_text(), Some("A"));
    assert_eq!(table.rows()[1][0].as_text(), Some("B"));
    assert_eq!(table.rows()[0][1].as_text(), Some("Score (x/y)"));
    assert!((table.rows()[0][4].as_number().unwrap() + 7.0 / 0.5_f64.sqrt()).abs() < TOL);
}

#[test]
fn test_rm_anova_table_layout() {
    let mut d = Dataset::new();
    d.add_text("Subject", &["s1", "s2", "s3", "s4"]).unwrap();
    d.add_numeric("T1", &[1.0, 2.0, 3.0, 4.0]).unwrap();
    d.add_numeric("T2", &[2.0, 3.0, 4.0, 6.0]).unwrap();
    d.add_numeric("T3", &[4.0, 5.0, 7.0, 8.0]).unwrap();

    let table = analysis::rm_anova(
        &d,
        false,
        "Subject",
        "Time",
        &[("T1", "t1"), ("T2", "t2"), ("T3", "t3")],
    )
    .unwrap();

    assert_eq!(
        table.header(),
        &["Source", "Correction", "Type III SS", "df", "SM", "F", "Sig"]
    );
    // 4 correction lines for the effect, 4 for the error term
    assert_eq!(table.len(), 8);
    assert_eq!(table.rows()[0][0].as_text(), Some("Time"));
    assert_eq!(table.rows()[0][1].as_text(), Some("Sphericity Assumed"));
    assert_eq!(table.rows()[1][0], Cell::Empty);
    assert_eq!(table.rows()[3][1].as_text(), Some("Lower-bound"));
    assert_eq!(table.rows()[4][0].as_text(), Some("Error(Time)"));

    // effect lines report F and Sig, error lines do not
    assert!(table.rows()[0][5].as_number().is_some());
    assert!(table.rows()[0][6].as_number().is_some());
    assert_eq!(table.rows()[4][5], Cell::Empty);
    assert_eq!(table.rows()[4][6], Cell::Empty);

    // sphericity-assumed dfs: k-1 = 2 and (k-1)(n-1) = 6
    assert_eq!(table.rows()[0][3].as_number(), Some(2.0));
    assert_eq!(table.rows()[4][3].as_number(), Some(6.0));
}

#[test]
fn test_rm_anova_needs_two_levels() {
    let mut d = Dataset::new();
    d.add_text("Subject", &["s1", "s2"]).unwrap();
    d.add_numeric("T1", &[1.0, 2.0]).unwrap();

    assert!(matches!(
        analysis::rm_anova(&d, false, "Subject", "Time", &[("T1", "t1")]),
        Err(Error::InvalidInput(_))
    ));
}

#[test]
fn test_bonferroni_ordered_pairs_and_threshold() {
    let mut d = Dataset::new();
    d.add_numeric("A", &[1.0, 2.0, 3.0, 4.0]).unwrap();
    d.add_numeric("B", &[2.0, 3.0, 4.0, 6.0]).unwrap();
    d.add_numeric("C", &[1.5, 2.5, 3.5, 4.5]).unwrap();

    let table = analysis::bonferroni(&d, false, &["A", "B", "C"]).unwrap();
    assert_eq!(
        table.header(),
        &["Variable", "Compared-with", "Test Statistic", "p-Value"]
    );
    // n(n-1) comparisons plus the trailing threshold row
    assert_eq!(table.len(), 7);

    let last = table.rows().last().unwrap();
    assert!(last[0].as_text().unwrap().contains("0.05/3"));
    assert_eq!(last[3].as_number(), Some(0.05 / 3.0));

    // (A,B) and (B,A) both reported, with mirrored statistics
    let t_ab = table.rows()[0][2].as_number().unwrap();
    let t_ba = table.rows()[2][2].as_number().unwrap();
    assert!((t_ab + t_ba).abs() < TOL);
}

#[test]
fn test_bonferroni_filter_keeps_threshold_row() {
    let mut d = Dataset::new();
    // barely different: nothing survives 0.05/2
    d.add_numeric("A", &[1.0, 2.0, 3.0, 4.0]).unwrap();
    d.add_numeric("B", &[1.1, 1.9, 3.2, 3.9]).unwrap();

    let table = analysis::bonferroni(&d, true, &["A", "B"]).unwrap();
    assert_eq!(table.len(), 1);
    assert_eq!(table.rows()[0][3].as_number(), Some(0.025));
}

#[test]
fn test_bonferroni_needs_two_measures() {
    let d = pre_post_dataset();
    assert!(matches!(
        analysis::bonferroni(&d, false, &["Pre"]),
        Err(Error::InvalidInput(_))
    ));
}
