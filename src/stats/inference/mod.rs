// Hypothesis-test implementations. P-values come from statrs distribution
// CDFs; only the test statistics themselves are computed here.

use statrs::distribution::{ChiSquared, ContinuousCDF, FisherSnedecor, StudentsT};

use crate::error::{Error, Result};
use crate::stats::{AnovaLine, Correction, RmAnovaResult, TestResult};

fn mean(data: &[f64]) -> f64 {
    data.iter().sum::<f64>() / data.len() as f64
}

/// Unbiased sample variance (n - 1 denominator).
fn sample_var(data: &[f64], m: f64) -> f64 {
    data.iter().map(|&x| (x - m).powi(2)).sum::<f64>() / (data.len() - 1) as f64
}

fn median(data: &[f64]) -> f64 {
    let mut sorted = data.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let n = sorted.len();
    if n % 2 == 1 {
        sorted[n / 2]
    } else {
        (sorted[n / 2 - 1] + sorted[n / 2]) / 2.0
    }
}

/// Two-sided p-value for a t statistic.
fn t_pvalue(t: f64, df: f64) -> Result<f64> {
    if !t.is_finite() {
        return Ok(0.0);
    }
    let dist = StudentsT::new(0.0, 1.0, df).map_err(|e| Error::Computation(e.to_string()))?;
    Ok((2.0 * (1.0 - dist.cdf(t.abs()))).clamp(0.0, 1.0))
}

/// Upper-tail p-value for an F statistic.
fn f_pvalue(f: f64, df1: f64, df2: f64) -> Result<f64> {
    if !f.is_finite() {
        return Ok(0.0);
    }
    let dist = FisherSnedecor::new(df1, df2).map_err(|e| Error::Computation(e.to_string()))?;
    Ok((1.0 - dist.cdf(f)).clamp(0.0, 1.0))
}

fn require_len(name: &str, data: &[f64], min: usize) -> Result<()> {
    if data.len() < min {
        return Err(Error::InsufficientData(format!(
            "{} needs at least {} observations, got {}",
            name,
            min,
            data.len()
        )));
    }
    Ok(())
}

pub(crate) fn paired_ttest_impl(sample1: &[f64], sample2: &[f64]) -> Result<TestResult> {
    if sample1.len() != sample2.len() {
        return Err(Error::InvalidInput(format!(
            "paired t-test samples differ in length ({} vs {})",
            sample1.len(),
            sample2.len()
        )));
    }
    require_len("paired t-test", sample1, 2)?;

    let n = sample1.len();
    let diffs: Vec<f64> = sample1.iter().zip(sample2).map(|(&a, &b)| a - b).collect();
    let m = mean(&diffs);
    let sd = sample_var(&diffs, m).sqrt();
    let se = sd / (n as f64).sqrt();

    let df = (n - 1) as f64;
    if se == 0.0 {
        // identical differences on every subject
        return Ok(if m == 0.0 {
            TestResult { statistic: 0.0, p_value: 1.0 }
        } else {
            TestResult { statistic: f64::INFINITY * m.signum(), p_value: 0.0 }
        });
    }
    let t = m / se;
    Ok(TestResult { statistic: t, p_value: t_pvalue(t, df)? })
}

pub(crate) fn indep_ttest_impl(sample1: &[f64], sample2: &[f64], equal_var: bool) -> Result<TestResult> {
    require_len("independent t-test", sample1, 2)?;
    require_len("independent t-test", sample2, 2)?;

    let n1 = sample1.len() as f64;
    let n2 = sample2.len() as f64;
    let m1 = mean(sample1);
    let m2 = mean(sample2);
    let v1 = sample_var(sample1, m1);
    let v2 = sample_var(sample2, m2);

    let (se, df) = if equal_var {
        let pooled = ((n1 - 1.0) * v1 + (n2 - 1.0) * v2) / (n1 + n2 - 2.0);
        ((pooled * (1.0 / n1 + 1.0 / n2)).sqrt(), n1 + n2 - 2.0)
    } else {
        let a = v1 / n1;
        let b = v2 / n2;
        let se = (a + b).sqrt();
        // Welch-Satterthwaite degrees of freedom
        let df = if a + b == 0.0 {
            n1 + n2 - 2.0
        } else {
            (a + b).powi(2) / (a.powi(2) / (n1 - 1.0) + b.powi(2) / (n2 - 1.0))
        };
        (se, df)
    };

    if se == 0.0 {
        let d = m1 - m2;
        return Ok(if d == 0.0 {
            TestResult { statistic: 0.0, p_value: 1.0 }
        } else {
            TestResult { statistic: f64::INFINITY * d.signum(), p_value: 0.0 }
        });
    }
    let t = (m1 - m2) / se;
    Ok(TestResult { statistic: t, p_value: t_pvalue(t, df)? })
}

/// Median-centered Levene test (two samples).
pub(crate) fn levene_impl(sample1: &[f64], sample2: &[f64]) -> Result<TestResult> {
    require_len("Levene test", sample1, 2)?;
    require_len("Levene test", sample2, 2)?;

    let med1 = median(sample1);
    let med2 = median(sample2);
    let z1: Vec<f64> = sample1.iter().map(|&x| (x - med1).abs()).collect();
    let z2: Vec<f64> = sample2.iter().map(|&x| (x - med2).abs()).collect();

    let n1 = z1.len() as f64;
    let n2 = z2.len() as f64;
    let n = n1 + n2;
    let zbar1 = mean(&z1);
    let zbar2 = mean(&z2);
    let zbar = (n1 * zbar1 + n2 * zbar2) / n;

    let between = n1 * (zbar1 - zbar).powi(2) + n2 * (zbar2 - zbar).powi(2);
    let within: f64 = z1.iter().map(|&z| (z - zbar1).powi(2)).sum::<f64>()
        + z2.iter().map(|&z| (z - zbar2).powi(2)).sum::<f64>();

    // Zero within-group deviation SS: either every absolute deviation is
    // identical (no evidence against homogeneity) or the two groups sit at
    // clearly different spreads with nothing left in the denominator.
    if within == 0.0 {
        return Ok(if between == 0.0 {
            TestResult { statistic: 0.0, p_value: 1.0 }
        } else {
            TestResult { statistic: f64::INFINITY, p_value: 0.0 }
        });
    }
    let w = (n - 2.0) * between / within;
    Ok(TestResult { statistic: w, p_value: f_pvalue(w, 1.0, n - 2.0)? })
}

pub(crate) fn pearson_impl(x: &[f64], y: &[f64]) -> Result<TestResult> {
    if x.len() != y.len() {
        return Err(Error::InvalidInput(format!(
            "correlation samples differ in length ({} vs {})",
            x.len(),
            y.len()
        )));
    }
    require_len("Pearson correlation", x, 3)?;

    let n = x.len() as f64;
    let mx = mean(x);
    let my = mean(y);
    let sxy: f64 = x.iter().zip(y).map(|(&a, &b)| (a - mx) * (b - my)).sum();
    let sxx: f64 = x.iter().map(|&a| (a - mx).powi(2)).sum();
    let syy: f64 = y.iter().map(|&b| (b - my).powi(2)).sum();

    if sxx == 0.0 || syy == 0.0 {
        return Err(Error::Computation(
            "correlation is undefined for a constant sample".to_string(),
        ));
    }
    let r = (sxy / (sxx * syy).sqrt()).clamp(-1.0, 1.0);
    let df = n - 2.0;
    let p = if 1.0 - r * r < f64::EPSILON {
        0.0
    } else {
        let t = r * (df / (1.0 - r * r)).sqrt();
        t_pvalue(t, df)?
    };
    Ok(TestResult { statistic: r, p_value: p })
}

/// D'Agostino-Pearson omnibus test: K² = z_skew² + z_kurtosis², referred
/// to a chi-squared distribution with 2 degrees of freedom.
pub(crate) fn normality_impl(sample: &[f64]) -> Result<TestResult> {
    require_len("normality test", sample, 8)?;

    let n = sample.len() as f64;
    let m = mean(sample);
    let m2 = sample.iter().map(|&x| (x - m).powi(2)).sum::<f64>() / n;
    let m3 = sample.iter().map(|&x| (x - m).powi(3)).sum::<f64>() / n;
    let m4 = sample.iter().map(|&x| (x - m).powi(4)).sum::<f64>() / n;
    if m2 == 0.0 {
        return Err(Error::Computation(
            "normality test is undefined for a constant sample".to_string(),
        ));
    }

    // Skewness transform (D'Agostino 1970)
    let b1 = m3 / m2.powf(1.5);
    let y = b1 * (((n + 1.0) * (n + 3.0)) / (6.0 * (n - 2.0))).sqrt();
    let beta2 = 3.0 * (n * n + 27.0 * n - 70.0) * (n + 1.0) * (n + 3.0)
        / ((n - 2.0) * (n + 5.0) * (n + 7.0) * (n + 9.0));
    let w2 = -1.0 + (2.0 * (beta2 - 1.0)).sqrt();
    let delta = 1.0 / (0.5 * w2.ln()).sqrt();
    let alpha = (2.0 / (w2 - 1.0)).sqrt();
    let z_skew = delta * (y / alpha + ((y / alpha).powi(2) + 1.0).sqrt()).ln();

    // Kurtosis transform (Anscombe & Glynn 1983)
    let b2 = m4 / (m2 * m2);
    let e = 3.0 * (n - 1.0) / (n + 1.0);
    let var_b2 = 24.0 * n * (n - 2.0) * (n - 3.0) / ((n + 1.0).powi(2) * (n + 3.0) * (n + 5.0));
    let xk = (b2 - e) / var_b2.sqrt();
    let sqrt_beta1 = 6.0 * (n * n - 5.0 * n + 2.0) / ((n + 7.0) * (n + 9.0))
        * (6.0 * (n + 3.0) * (n + 5.0) / (n * (n - 2.0) * (n - 3.0))).sqrt();
    let a = 6.0 + 8.0 / sqrt_beta1 * (2.0 / sqrt_beta1 + (1.0 + 4.0 / sqrt_beta1.powi(2)).sqrt());
    let term1 = 1.0 - 2.0 / (9.0 * a);
    let denom = 1.0 + xk * (2.0 / (a - 4.0)).sqrt();
    let term2 = denom.signum() * ((1.0 - 2.0 / a) / denom.abs()).cbrt();
    let z_kurt = (term1 - term2) / (2.0 / (9.0 * a)).sqrt();

    let k2 = z_skew * z_skew + z_kurt * z_kurt;
    let dist = ChiSquared::new(2.0).map_err(|e| Error::Computation(e.to_string()))?;
    Ok(TestResult {
        statistic: k2,
        p_value: (1.0 - dist.cdf(k2)).clamp(0.0, 1.0),
    })
}

/// Pivot long-format observations into a subject x level matrix,
/// preserving first-seen order on both axes. The design must be balanced.
fn pivot_wide(
    subjects: &[String],
    levels: &[String],
    values: &[f64],
) -> Result<(Vec<String>, Vec<Vec<Option<f64>>>)> {
    let mut subject_order: Vec<&str> = Vec::new();
    let mut level_order: Vec<String> = Vec::new();
    for s in subjects {
        if !subject_order.contains(&s.as_str()) {
            subject_order.push(s);
        }
    }
    for l in levels {
        if !level_order.contains(l) {
            level_order.push(l.clone());
        }
    }

    let mut matrix = vec![vec![None; level_order.len()]; subject_order.len()];
    for ((s, l), &v) in subjects.iter().zip(levels).zip(values) {
        let si = subject_order.iter().position(|&x| x == s.as_str()).unwrap();
        let li = level_order.iter().position(|x| x == l).unwrap();
        if matrix[si][li].is_some() {
            return Err(Error::InvalidInput(format!(
                "subject '{}' measured more than once under level '{}'",
                s, l
            )));
        }
        matrix[si][li] = Some(v);
    }
    for (si, row) in matrix.iter().enumerate() {
        if row.iter().any(|c| c.is_none()) {
            return Err(Error::InvalidInput(format!(
                "unbalanced design: subject '{}' is missing a level measurement",
                subject_order[si]
            )));
        }
    }
    Ok((level_order, matrix))
}

pub(crate) fn rm_anova_impl(
    subjects: &[String],
    levels: &[String],
    values: &[f64],
) -> Result<RmAnovaResult> {
    if subjects.len() != levels.len() || subjects.len() != values.len() {
        return Err(Error::InvalidInput(
            "subjects, levels and values must be parallel sequences".to_string(),
        ));
    }
    let (level_order, matrix) = pivot_wide(subjects, levels, values)?;
    let n = matrix.len();
    let k = level_order.len();
    if n < 2 || k < 2 {
        return Err(Error::InsufficientData(format!(
            "repeated-measures ANOVA needs at least 2 subjects and 2 levels, got {} x {}",
            n, k
        )));
    }

    let x: Vec<Vec<f64>> = matrix
        .into_iter()
        .map(|row| row.into_iter().map(|c| c.unwrap_or_default()).collect())
        .collect();
    let nf = n as f64;
    let kf = k as f64;

    let grand = x.iter().flatten().sum::<f64>() / (nf * kf);
    let level_means: Vec<f64> = (0..k)
        .map(|j| x.iter().map(|row| row[j]).sum::<f64>() / nf)
        .collect();
    let subject_means: Vec<f64> = x.iter().map(|row| row.iter().sum::<f64>() / kf).collect();

    let ss_effect = nf * level_means.iter().map(|&m| (m - grand).powi(2)).sum::<f64>();
    let ss_subjects = kf * subject_means.iter().map(|&m| (m - grand).powi(2)).sum::<f64>();
    let ss_total: f64 = x.iter().flatten().map(|&v| (v - grand).powi(2)).sum();
    let ss_error = (ss_total - ss_effect - ss_subjects).max(0.0);

    let df_effect = kf - 1.0;
    let df_error = (kf - 1.0) * (nf - 1.0);
    let ms_effect = ss_effect / df_effect;
    let ms_error = ss_error / df_error;
    let f = if ms_error == 0.0 { f64::INFINITY } else { ms_effect / ms_error };

    let gg = greenhouse_geisser_epsilon(&x, &level_means);
    let hf = huynh_feldt_epsilon(gg, nf, kf);
    let lower = 1.0 / (kf - 1.0);

    let mut effect = Vec::with_capacity(Correction::ALL.len());
    let mut error = Vec::with_capacity(Correction::ALL.len());
    for correction in Correction::ALL {
        let eps = match correction {
            Correction::SphericityAssumed => 1.0,
            Correction::GreenhouseGeisser => gg,
            Correction::HuynhFeldt => hf,
            Correction::LowerBound => lower,
        };
        let d1 = df_effect * eps;
        let d2 = df_error * eps;
        effect.push(AnovaLine {
            correction,
            ss: ss_effect,
            df: d1,
            ms: ss_effect / d1,
            f: Some(f),
            p: Some(f_pvalue(f, d1, d2)?),
        });
        error.push(AnovaLine {
            correction,
            ss: ss_error,
            df: d2,
            ms: ss_error / d2,
            f: None,
            p: None,
        });
    }

    Ok(RmAnovaResult {
        levels: level_order,
        subjects: n,
        effect,
        error,
        gg_epsilon: gg,
        hf_epsilon: hf,
    })
}

/// Greenhouse-Geisser epsilon from the double-centered covariance matrix
/// of the level columns.
fn greenhouse_geisser_epsilon(x: &[Vec<f64>], level_means: &[f64]) -> f64 {
    let n = x.len() as f64;
    let k = level_means.len();
    let kf = k as f64;

    let mut cov = vec![vec![0.0; k]; k];
    for a in 0..k {
        for b in 0..k {
            cov[a][b] = x
                .iter()
                .map(|row| (row[a] - level_means[a]) * (row[b] - level_means[b]))
                .sum::<f64>()
                / (n - 1.0);
        }
    }

    let row_means: Vec<f64> = cov.iter().map(|r| r.iter().sum::<f64>() / kf).collect();
    let grand_mean = row_means.iter().sum::<f64>() / kf;
    let mut trace = 0.0;
    let mut sum_sq = 0.0;
    for a in 0..k {
        for b in 0..k {
            let dc = cov[a][b] - row_means[a] - row_means[b] + grand_mean;
            if a == b {
                trace += dc;
            }
            sum_sq += dc * dc;
        }
    }
    if sum_sq == 0.0 {
        return 1.0;
    }
    let eps = trace * trace / ((kf - 1.0) * sum_sq);
    eps.clamp(1.0 / (kf - 1.0), 1.0)
}

/// Huynh-Feldt epsilon, derived from the Greenhouse-Geisser estimate and
/// capped at 1.
fn huynh_feldt_epsilon(gg: f64, n: f64, k: f64) -> f64 {
    let denom = (k - 1.0) * (n - 1.0 - (k - 1.0) * gg);
    if denom <= 0.0 {
        return 1.0;
    }
    ((n * (k - 1.0) * gg - 2.0) / denom).clamp(1.0 / (k - 1.0), 1.0)
}
