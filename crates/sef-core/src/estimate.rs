//! Parameter estimation: group summaries, δ, κ and ρ.
//!
//! Group A is the reference: δ = (mean_A − mean_B) / sd_A and
//! κ = var_B / var_A. Swapping the groups turns κ into 1/κ, so the
//! direction of the comparison matters and is always carried with the
//! result.

use std::fmt;

use serde::Serialize;
use statrs::distribution::{ContinuousCDF, StudentsT};

use crate::error::{Result, SefError};

/// Descriptive statistics of one group.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupSummary {
    pub label: String,
    pub n: usize,
    pub mean: f64,
    /// Unbiased sample variance (N − 1 denominator).
    pub variance: f64,
    pub std_dev: f64,
}

/// Summarise a group's valid observations. Needs at least two values.
pub fn summarize(label: &str, values: &[f64]) -> Result<GroupSummary> {
    let n = values.len();
    if n < 2 {
        return Err(SefError::InsufficientSample {
            group: label.to_string(),
            needed: 2,
            got: n,
        });
    }
    let nf = n as f64;
    let mean = values.iter().sum::<f64>() / nf;
    let variance = values.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / (nf - 1.0);
    Ok(GroupSummary {
        label: label.to_string(),
        n,
        mean,
        variance,
        std_dev: variance.sqrt(),
    })
}

/// Where a correlation value came from.
///
/// Most competitive datasets have no true pairing between groups, so ρ is
/// often a modelling assumption. Reports always say which one they used.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Correlation {
    /// Pearson r over paired observations, with its two-sided p-value.
    Measured { r: f64, p_value: f64, n: usize },
    /// Caller-supplied value, not derived from data.
    Assumed { r: f64 },
}

impl Correlation {
    /// An assumed correlation, validated to lie in [-1, 1].
    pub fn assumed(r: f64) -> Result<Self> {
        if !r.is_finite() || !(-1.0..=1.0).contains(&r) {
            return Err(SefError::InvalidCorrelation(r));
        }
        Ok(Correlation::Assumed { r })
    }

    pub fn r(&self) -> f64 {
        match *self {
            Correlation::Measured { r, .. } | Correlation::Assumed { r } => r,
        }
    }

    pub fn is_assumed(&self) -> bool {
        matches!(self, Correlation::Assumed { .. })
    }
}

impl fmt::Display for Correlation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Correlation::Measured { r, p_value, n } => {
                write!(f, "{r:.4} (measured, p={p_value:.4}, n={n})")
            }
            Correlation::Assumed { r } => write!(f, "{r:.4} (assumed)"),
        }
    }
}

/// Pearson correlation of paired samples with a t-test p-value.
pub fn pearson(a: &[f64], b: &[f64]) -> Result<Correlation> {
    if a.len() != b.len() {
        return Err(SefError::UnpairedSamples {
            len_a: a.len(),
            len_b: b.len(),
        });
    }
    let n = a.len();
    if n < 3 {
        return Err(SefError::InsufficientSample {
            group: "paired".to_string(),
            needed: 3,
            got: n,
        });
    }

    let nf = n as f64;
    let mean_a = a.iter().sum::<f64>() / nf;
    let mean_b = b.iter().sum::<f64>() / nf;
    let mut cov = 0.0;
    let mut var_a = 0.0;
    let mut var_b = 0.0;
    for (x, y) in a.iter().zip(b) {
        let da = x - mean_a;
        let db = y - mean_b;
        cov += da * db;
        var_a += da * da;
        var_b += db * db;
    }
    if var_a <= 0.0 {
        return Err(SefError::DegenerateVariance {
            group: "paired A".to_string(),
        });
    }
    if var_b <= 0.0 {
        return Err(SefError::DegenerateVariance {
            group: "paired B".to_string(),
        });
    }

    let r = (cov / (var_a * var_b).sqrt()).clamp(-1.0, 1.0);
    let p_value = if r.abs() < 1.0 {
        let df = nf - 2.0;
        let t = r * (df / (1.0 - r * r)).sqrt();
        StudentsT::new(0.0, 1.0, df)
            .map(|dist| (2.0 * dist.sf(t.abs())).min(1.0))
            .map_err(|e| SefError::Config(format!("t distribution: {e}")))?
    } else {
        0.0
    };
    Ok(Correlation::Measured { r, p_value, n })
}

/// Group summaries plus the standardized difference and variance ratio.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Estimate {
    pub group_a: GroupSummary,
    pub group_b: GroupSummary,
    /// (mean_A − mean_B) / sd_A.
    pub delta: f64,
    /// var_B / var_A.
    pub kappa: f64,
}

/// δ, κ and ρ for one comparison.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ParameterSet {
    pub delta: f64,
    pub kappa: f64,
    pub rho: Correlation,
}

impl Estimate {
    pub fn with_correlation(&self, rho: Correlation) -> ParameterSet {
        ParameterSet {
            delta: self.delta,
            kappa: self.kappa,
            rho,
        }
    }

    /// Cohen's d using the pooled standard deviation.
    pub fn cohens_d(&self) -> Option<f64> {
        cohens_d(&self.group_a, &self.group_b)
    }
}

/// Derive δ and κ from two group summaries. Fails when var_A is zero.
pub fn estimate(group_a: GroupSummary, group_b: GroupSummary) -> Result<Estimate> {
    if !(group_a.variance > 0.0 && group_a.variance.is_finite()) {
        return Err(SefError::DegenerateVariance {
            group: group_a.label.clone(),
        });
    }
    let delta = (group_a.mean - group_b.mean) / group_a.std_dev;
    let kappa = group_b.variance / group_a.variance;
    log::debug!(
        "estimate {} vs {}: delta={delta:.4}, kappa={kappa:.4}",
        group_a.label,
        group_b.label
    );
    Ok(Estimate {
        group_a,
        group_b,
        delta,
        kappa,
    })
}

/// Summarise both samples and derive δ and κ.
pub fn estimate_samples(label_a: &str, a: &[f64], label_b: &str, b: &[f64]) -> Result<Estimate> {
    estimate(summarize(label_a, a)?, summarize(label_b, b)?)
}

/// |mean_A − mean_B| over the pooled standard deviation.
pub fn cohens_d(a: &GroupSummary, b: &GroupSummary) -> Option<f64> {
    let dof = (a.n + b.n) as f64 - 2.0;
    if dof <= 0.0 {
        return None;
    }
    let pooled = (((a.n as f64 - 1.0) * a.variance + (b.n as f64 - 1.0) * b.variance) / dof).sqrt();
    if pooled > 0.0 {
        Some((a.mean - b.mean).abs() / pooled)
    } else {
        None
    }
}

/// Conventional magnitude bands for Cohen's d.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EffectSize {
    Negligible,
    Small,
    Medium,
    Large,
}

impl EffectSize {
    pub fn from_d(d: f64) -> Self {
        if d > 0.8 {
            EffectSize::Large
        } else if d > 0.5 {
            EffectSize::Medium
        } else if d > 0.2 {
            EffectSize::Small
        } else {
            EffectSize::Negligible
        }
    }
}

impl fmt::Display for EffectSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            EffectSize::Negligible => "negligible",
            EffectSize::Small => "small",
            EffectSize::Medium => "medium",
            EffectSize::Large => "large",
        };
        f.write_str(s)
    }
}
