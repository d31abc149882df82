//! Normality test battery for SEF group measurements.
//!
//! Provides four goodness-of-fit tests against the normal distribution. Each
//! test returns a [`TestResult`] with a statistic, a p-value and a pass/fail
//! determination. Tests whose sample-size precondition is unmet are *skipped*
//! (`ran == false`) rather than failed, so callers can tell "not normal" apart
//! from "not enough data to say".

use serde::Serialize;
use statrs::distribution::{ChiSquared, ContinuousCDF, Normal};
use std::f64::consts::{FRAC_1_SQRT_2, PI};

/// Significance level used when no other is given.
pub const DEFAULT_ALPHA: f64 = 0.05;

/// Largest sample the Shapiro-Wilk approximation is valid for.
pub const SHAPIRO_WILK_MAX_N: usize = 5000;

// ═══════════════════════════════════════════════════════════════════════════════
// Core types
// ═══════════════════════════════════════════════════════════════════════════════

/// Result of a single normality test.
#[derive(Debug, Clone, Serialize)]
pub struct TestResult {
    pub name: String,
    /// False when the test's precondition was unmet and nothing was computed.
    pub ran: bool,
    pub passed: bool,
    pub p_value: Option<f64>,
    pub statistic: f64,
    pub details: String,
}

impl TestResult {
    /// A test passes when its p-value is strictly above `alpha`.
    pub fn pass_from_p(p: Option<f64>, alpha: f64) -> bool {
        match p {
            Some(p) => p > alpha,
            None => false,
        }
    }

    fn computed(name: &str, statistic: f64, p: f64, details: String) -> Self {
        TestResult {
            name: name.to_string(),
            ran: true,
            passed: TestResult::pass_from_p(Some(p), DEFAULT_ALPHA),
            p_value: Some(p),
            statistic,
            details,
        }
    }
}

/// Outcome of running the whole battery on one sample.
#[derive(Debug, Clone, Serialize)]
pub struct NormalityReport {
    pub sample_size: usize,
    pub alpha: f64,
    pub results: Vec<TestResult>,
    pub tests_run: usize,
    /// True iff at least one test ran and every test that ran has p > alpha.
    pub approximately_normal: bool,
}

impl NormalityReport {
    /// Names of the tests that were skipped.
    pub fn skipped(&self) -> Vec<&str> {
        self.results
            .iter()
            .filter(|r| !r.ran)
            .map(|r| r.name.as_str())
            .collect()
    }

    /// p-value of a named test, if it ran.
    pub fn p_value(&self, name: &str) -> Option<f64> {
        self.results
            .iter()
            .find(|r| r.ran && r.name == name)
            .and_then(|r| r.p_value)
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Helpers
// ═══════════════════════════════════════════════════════════════════════════════

/// Return a skipped `TestResult` when a precondition is unmet.
fn skipped(name: &str, reason: String) -> TestResult {
    log::warn!("{name} skipped: {reason}");
    TestResult {
        name: name.to_string(),
        ran: false,
        passed: false,
        p_value: None,
        statistic: 0.0,
        details: format!("Skipped: {reason}"),
    }
}

/// Evaluate a polynomial with coefficients in ascending order.
fn poly(coeffs: &[f64], x: f64) -> f64 {
    coeffs.iter().rev().fold(0.0, |acc, &c| acc * x + c)
}

/// Mean and biased (divide-by-n) central moments m2, m3, m4.
fn central_moments(data: &[f64]) -> (f64, f64, f64, f64) {
    let n = data.len() as f64;
    let mean = data.iter().sum::<f64>() / n;
    let (mut m2, mut m3, mut m4) = (0.0, 0.0, 0.0);
    for &x in data {
        let d = x - mean;
        let d2 = d * d;
        m2 += d2;
        m3 += d2 * d;
        m4 += d2 * d2;
    }
    (mean, m2 / n, m3 / n, m4 / n)
}

/// Biased sample skewness g1 = m3 / m2^1.5.
pub fn skewness(data: &[f64]) -> f64 {
    if data.len() < 2 {
        return 0.0;
    }
    let (_, m2, m3, _) = central_moments(data);
    if m2 < 1e-300 { 0.0 } else { m3 / m2.powf(1.5) }
}

/// Biased sample kurtosis b2 = m4 / m2² (normal = 3, not excess).
pub fn kurtosis(data: &[f64]) -> f64 {
    if data.len() < 2 {
        return 0.0;
    }
    let (_, m2, _, m4) = central_moments(data);
    if m2 < 1e-300 { 0.0 } else { m4 / (m2 * m2) }
}

/// Upper tail of χ² with `df` degrees of freedom.
fn chi2_sf(x: f64, df: f64) -> Option<f64> {
    ChiSquared::new(df).ok().map(|d| d.sf(x))
}

fn sorted(data: &[f64]) -> Vec<f64> {
    let mut v = data.to_vec();
    v.sort_by(|a, b| a.total_cmp(b));
    v
}

// ═══════════════════════════════════════════════════════════════════════════════
// 1. SHAPIRO-WILK
// ═══════════════════════════════════════════════════════════════════════════════

// Royston (1995) polynomial approximations.
const SW_C1: [f64; 6] = [0.0, 0.221157, -0.147981, -2.071190, 4.434685, -2.706056];
const SW_C2: [f64; 6] = [0.0, 0.042981, -0.293762, -1.752461, 5.682633, -3.582633];
const SW_C3: [f64; 4] = [0.544, -0.39978, 0.025054, -6.714e-4];
const SW_C4: [f64; 4] = [1.3822, -0.77857, 0.062767, -0.0020322];
const SW_C5: [f64; 4] = [-1.5861, -0.31082, -0.083751, 0.0038915];
const SW_C6: [f64; 3] = [-0.4803, -0.082676, 0.0030302];
const SW_G: [f64; 2] = [-2.273, 0.459];

/// Antisymmetric Shapiro-Wilk weights for a sample of size `n` (n >= 3).
fn shapiro_wilk_coefficients(n: usize) -> Vec<f64> {
    let mut a = vec![0.0; n];
    if n == 3 {
        a[0] = -FRAC_1_SQRT_2;
        a[2] = FRAC_1_SQRT_2;
        return a;
    }

    let norm = Normal::standard();
    let nf = n as f64;
    let m: Vec<f64> = (1..=n)
        .map(|i| norm.inverse_cdf((i as f64 - 0.375) / (nf + 0.25)))
        .collect();
    let summ2: f64 = m.iter().map(|v| v * v).sum();
    let ssumm2 = summ2.sqrt();
    let rsn = 1.0 / nf.sqrt();

    let an = poly(&SW_C1, rsn) + m[n - 1] / ssumm2;
    a[n - 1] = an;
    a[0] = -an;

    if n > 5 {
        let an1 = poly(&SW_C2, rsn) + m[n - 2] / ssumm2;
        a[n - 2] = an1;
        a[1] = -an1;
        let phi = (summ2 - 2.0 * m[n - 1].powi(2) - 2.0 * m[n - 2].powi(2))
            / (1.0 - 2.0 * an * an - 2.0 * an1 * an1);
        let fac = phi.sqrt();
        for i in 2..n - 2 {
            a[i] = m[i] / fac;
        }
    } else {
        let phi = (summ2 - 2.0 * m[n - 1].powi(2)) / (1.0 - 2.0 * an * an);
        let fac = phi.sqrt();
        for i in 1..n - 1 {
            a[i] = m[i] / fac;
        }
    }
    a
}

/// Royston p-value for a W statistic at sample size `n`.
fn shapiro_wilk_p_value(w: f64, n: usize) -> f64 {
    if w >= 1.0 {
        return 1.0;
    }
    let nf = n as f64;
    if n == 3 {
        let p = 6.0 / PI * (w.sqrt().asin() - (0.75f64).sqrt().asin());
        return p.clamp(0.0, 1.0);
    }

    let norm = Normal::standard();
    let mut y = (1.0 - w).ln();
    let (m, s) = if n <= 11 {
        let gamma = poly(&SW_G, nf);
        if y >= gamma {
            return 0.0;
        }
        y = -(gamma - y).ln();
        (poly(&SW_C3, nf), poly(&SW_C4, nf).exp())
    } else {
        let ln_n = nf.ln();
        (poly(&SW_C5, ln_n), poly(&SW_C6, ln_n).exp())
    };
    norm.sf((y - m) / s).clamp(0.0, 1.0)
}

/// Test 1: Shapiro-Wilk W. Requires 3 <= n <= 5000 and a non-zero range.
pub fn shapiro_wilk(data: &[f64]) -> TestResult {
    let name = "Shapiro-Wilk";
    let n = data.len();
    if n < 3 {
        return skipped(name, format!("requires n >= 3, got {n}"));
    }
    if n > SHAPIRO_WILK_MAX_N {
        return skipped(name, format!("requires n <= {SHAPIRO_WILK_MAX_N}, got {n}"));
    }

    let x = sorted(data);
    if x[n - 1] - x[0] < 1e-12 * x[n - 1].abs().max(1.0) {
        return skipped(name, "sample has zero range".to_string());
    }

    let a = shapiro_wilk_coefficients(n);
    let mean = x.iter().sum::<f64>() / n as f64;
    let ssq: f64 = x.iter().map(|v| (v - mean).powi(2)).sum();
    let num: f64 = a.iter().zip(&x).map(|(ai, xi)| ai * xi).sum();
    let w = (num * num / ssq).min(1.0);
    let p = shapiro_wilk_p_value(w, n);

    TestResult::computed(name, w, p, format!("W={w:.6}, n={n}"))
}

// ═══════════════════════════════════════════════════════════════════════════════
// 2. D'AGOSTINO K²
// ═══════════════════════════════════════════════════════════════════════════════

/// z-score of the sample skewness (D'Agostino 1970).
fn skewness_z(g1: f64, n: f64) -> f64 {
    let y = g1 * (((n + 1.0) * (n + 3.0)) / (6.0 * (n - 2.0))).sqrt();
    let beta2 = 3.0 * (n * n + 27.0 * n - 70.0) * (n + 1.0) * (n + 3.0)
        / ((n - 2.0) * (n + 5.0) * (n + 7.0) * (n + 9.0));
    let w2 = -1.0 + (2.0 * (beta2 - 1.0)).sqrt();
    let delta = 1.0 / (0.5 * w2.ln()).sqrt();
    let alpha = (2.0 / (w2 - 1.0)).sqrt();
    let y = if y == 0.0 { 1.0 } else { y };
    let ratio = y / alpha;
    delta * (ratio + (ratio * ratio + 1.0).sqrt()).ln()
}

/// z-score of the sample kurtosis (Anscombe & Glynn 1983).
fn kurtosis_z(b2: f64, n: f64) -> f64 {
    let expected = 3.0 * (n - 1.0) / (n + 1.0);
    let var_b2 = 24.0 * n * (n - 2.0) * (n - 3.0)
        / ((n + 1.0).powi(2) * (n + 3.0) * (n + 5.0));
    let x = (b2 - expected) / var_b2.sqrt();
    let sqrt_beta1 = 6.0 * (n * n - 5.0 * n + 2.0) / ((n + 7.0) * (n + 9.0))
        * (6.0 * (n + 3.0) * (n + 5.0) / (n * (n - 2.0) * (n - 3.0))).sqrt();
    let a = 6.0
        + 8.0 / sqrt_beta1 * (2.0 / sqrt_beta1 + (1.0 + 4.0 / (sqrt_beta1 * sqrt_beta1)).sqrt());
    let term1 = 1.0 - 2.0 / (9.0 * a);
    let denom = 1.0 + x * (2.0 / (a - 4.0)).sqrt();
    if denom == 0.0 {
        return f64::NAN;
    }
    let term2 = denom.signum() * ((1.0 - 2.0 / a) / denom.abs()).cbrt();
    (term1 - term2) / (2.0 / (9.0 * a)).sqrt()
}

/// Test 2: D'Agostino-Pearson K² omnibus test. Requires n >= 8.
pub fn dagostino_k2(data: &[f64]) -> TestResult {
    let name = "D'Agostino K2";
    let n = data.len();
    if n < 8 {
        return skipped(name, format!("requires n >= 8, got {n}"));
    }
    let (_, m2, m3, m4) = central_moments(data);
    if m2 < 1e-300 {
        return skipped(name, "sample has zero variance".to_string());
    }
    let nf = n as f64;
    let zs = skewness_z(m3 / m2.powf(1.5), nf);
    let zk = kurtosis_z(m4 / (m2 * m2), nf);
    if !zs.is_finite() || !zk.is_finite() {
        return skipped(name, "kurtosis transform undefined".to_string());
    }
    let k2 = zs * zs + zk * zk;
    let Some(p) = chi2_sf(k2, 2.0) else {
        return skipped(name, "chi-squared distribution unavailable".to_string());
    };
    TestResult::computed(
        name,
        k2,
        p,
        format!("K2={k2:.4}, z_skew={zs:.3}, z_kurt={zk:.3}"),
    )
}

// ═══════════════════════════════════════════════════════════════════════════════
// 3. JARQUE-BERA
// ═══════════════════════════════════════════════════════════════════════════════

/// Test 3: Jarque-Bera on sample skewness and kurtosis. Requires n >= 8.
pub fn jarque_bera(data: &[f64]) -> TestResult {
    let name = "Jarque-Bera";
    let n = data.len();
    if n < 8 {
        return skipped(name, format!("requires n >= 8, got {n}"));
    }
    let (_, m2, m3, m4) = central_moments(data);
    if m2 < 1e-300 {
        return skipped(name, "sample has zero variance".to_string());
    }
    let s = m3 / m2.powf(1.5);
    let k = m4 / (m2 * m2);
    let jb = n as f64 / 6.0 * (s * s + (k - 3.0).powi(2) / 4.0);
    let Some(p) = chi2_sf(jb, 2.0) else {
        return skipped(name, "chi-squared distribution unavailable".to_string());
    };
    TestResult::computed(
        name,
        jb,
        p,
        format!("JB={jb:.4}, skew={s:.3}, kurtosis={k:.3}"),
    )
}

// ═══════════════════════════════════════════════════════════════════════════════
// 4. KOLMOGOROV-SMIRNOV
// ═══════════════════════════════════════════════════════════════════════════════

/// Asymptotic Kolmogorov p-value with the Stephens small-sample correction.
fn kolmogorov_p_value(d: f64, n: usize) -> f64 {
    let sqrt_n = (n as f64).sqrt();
    let lambda = (sqrt_n + 0.12 + 0.11 / sqrt_n) * d;
    if lambda < 1e-3 {
        return 1.0;
    }
    let mut p = 0.0;
    for k in 1..=100i32 {
        let sign = if k % 2 == 0 { -1.0 } else { 1.0 };
        let term = (-2.0 * (k as f64 * lambda).powi(2)).exp();
        p += sign * term;
        if term < 1e-12 {
            break;
        }
    }
    (2.0 * p).clamp(0.0, 1.0)
}

/// Test 4: Kolmogorov-Smirnov against N(mean, sd) fitted from the sample.
///
/// Estimating the null parameters from the same data makes the test
/// conservative; the details string says so.
pub fn kolmogorov_smirnov(data: &[f64]) -> TestResult {
    let name = "Kolmogorov-Smirnov";
    let n = data.len();
    if n < 2 {
        return skipped(name, format!("requires n >= 2, got {n}"));
    }
    let nf = n as f64;
    let mean = data.iter().sum::<f64>() / nf;
    let sd = (data.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / (nf - 1.0)).sqrt();
    let dist = match Normal::new(mean, sd) {
        Ok(d) if sd > 0.0 => d,
        _ => return skipped(name, "sample has zero variance".to_string()),
    };

    let x = sorted(data);
    let mut d_max = 0.0f64;
    for (i, &v) in x.iter().enumerate() {
        let f = dist.cdf(v);
        let d_plus = (i + 1) as f64 / nf - f;
        let d_minus = f - i as f64 / nf;
        d_max = d_max.max(d_plus).max(d_minus);
    }
    let p = kolmogorov_p_value(d_max, n);

    TestResult::computed(
        name,
        d_max,
        p,
        format!("D={d_max:.6}, n={n}, null fitted N({mean:.4}, {sd:.4})"),
    )
}

// ═══════════════════════════════════════════════════════════════════════════════
// Test battery
// ═══════════════════════════════════════════════════════════════════════════════

/// Run the complete normality battery on a sample.
pub fn run_all_tests(data: &[f64]) -> Vec<TestResult> {
    let tests: [fn(&[f64]) -> TestResult; 4] = [
        shapiro_wilk,
        dagostino_k2,
        jarque_bera,
        kolmogorov_smirnov,
    ];
    tests.iter().map(|test_fn| test_fn(data)).collect()
}

/// Run the battery and judge every test that ran against `alpha`.
pub fn check_normality(data: &[f64], alpha: f64) -> NormalityReport {
    let mut results = run_all_tests(data);
    for r in &mut results {
        r.passed = r.ran && TestResult::pass_from_p(r.p_value, alpha);
    }
    let tests_run = results.iter().filter(|r| r.ran).count();
    let approximately_normal = tests_run > 0 && results.iter().filter(|r| r.ran).all(|r| r.passed);
    NormalityReport {
        sample_size: data.len(),
        alpha,
        results,
        tests_run,
        approximately_normal,
    }
}
