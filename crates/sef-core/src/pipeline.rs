//! The full validation pipeline: partition, gate, estimate, normality, SEF.
//!
//! [`validate`] is what `sef analyze` and `sef batch` run for every
//! measurement column. Each step is a plain function call on owned data and
//! the first failure is returned unchanged.

use serde::{Deserialize, Serialize};
use sef_tests::NormalityReport;

use crate::applicability::{self, Applicability};
use crate::error::{Result, SefError};
use crate::estimate::{Correlation, EffectSize, Estimate, ParameterSet, estimate_samples, pearson};
use crate::partition::{GroupSpec, partition};
use crate::quadrant::{Quadrant, QuadrantThresholds};
use crate::sef::{SefResult, evaluate};
use crate::table::ObservationTable;
use crate::transform::{ln_shifted, log_transform};

/// Groups smaller than this are refused.
pub const DEFAULT_MIN_SAMPLES: usize = 10;

/// ρ used when a comparison has no paired observations. Competitors in the
/// same field share conditions, so a small positive value is assumed.
pub const DEFAULT_ASSUMED_RHO: f64 = 0.2;

/// Where ρ comes from.
///
/// In JSON this is either `{"assumed": 0.2}` or `"paired"`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CorrelationSource {
    Assumed(f64),
    /// Pearson r over position-aligned rows of the two groups.
    Paired,
}

impl Default for CorrelationSource {
    fn default() -> Self {
        CorrelationSource::Assumed(DEFAULT_ASSUMED_RHO)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationConfig {
    pub groups: GroupSpec,
    pub measurement: String,
    pub correlation: CorrelationSource,
    pub min_samples: usize,
    pub alpha: f64,
    pub log_transform: bool,
    pub thresholds: QuadrantThresholds,
}

impl ValidationConfig {
    pub fn new(groups: GroupSpec, measurement: impl Into<String>) -> Self {
        Self {
            groups,
            measurement: measurement.into(),
            correlation: CorrelationSource::default(),
            min_samples: DEFAULT_MIN_SAMPLES,
            alpha: sef_tests::DEFAULT_ALPHA,
            log_transform: false,
            thresholds: QuadrantThresholds::default(),
        }
    }

    fn check(&self) -> Result<()> {
        if !(self.alpha > 0.0 && self.alpha < 1.0) {
            return Err(SefError::Config(format!(
                "alpha must lie in (0, 1), got {}",
                self.alpha
            )));
        }
        if self.min_samples < 2 {
            return Err(SefError::Config(format!(
                "min_samples must be at least 2, got {}",
                self.min_samples
            )));
        }
        if let CorrelationSource::Assumed(r) = self.correlation {
            Correlation::assumed(r)?;
        }
        Ok(())
    }
}

/// The same comparison rerun on log-transformed measurements.
#[derive(Debug, Clone, Serialize)]
pub struct LogComparison {
    pub offset: f64,
    pub estimate: Estimate,
    pub sef: SefResult,
    /// Transformed minus original SEF; absent when either is infinite.
    pub sef_change: Option<f64>,
    pub normal_a: bool,
    pub normal_b: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct ValidationReport {
    pub groups: GroupSpec,
    pub measurement: String,
    pub total_rows: usize,
    pub estimate: Estimate,
    pub parameters: ParameterSet,
    pub sef: SefResult,
    pub normality_a: NormalityReport,
    pub normality_b: NormalityReport,
    pub cohens_d: Option<f64>,
    pub effect_size: Option<EffectSize>,
    pub quadrant: Quadrant,
    pub applicability: Applicability,
    pub log_comparison: Option<LogComparison>,
}

impl ValidationReport {
    pub fn both_normal(&self) -> bool {
        self.normality_a.approximately_normal && self.normality_b.approximately_normal
    }
}

fn gate(label: &str, values: &[f64], min_samples: usize) -> Result<()> {
    if values.len() < min_samples {
        return Err(SefError::InsufficientSample {
            group: label.to_string(),
            needed: min_samples,
            got: values.len(),
        });
    }
    Ok(())
}

/// Run one comparison end to end.
pub fn validate(table: &ObservationTable, config: &ValidationConfig) -> Result<ValidationReport> {
    config.check()?;
    let spec = &config.groups;
    let p = partition(table, spec)?;
    let (a, b) = p.measurements(&config.measurement)?;
    gate(&spec.label_a, &a, config.min_samples)?;
    gate(&spec.label_b, &b, config.min_samples)?;

    let estimate = estimate_samples(&spec.label_a, &a, &spec.label_b, &b)?;
    let normality_a = sef_tests::check_normality(&a, config.alpha);
    let normality_b = sef_tests::check_normality(&b, config.alpha);

    let (rho, paired) = match config.correlation {
        CorrelationSource::Assumed(r) => (Correlation::assumed(r)?, None),
        CorrelationSource::Paired => {
            let (pa, pb) = p.paired_measurements(&config.measurement)?;
            (pearson(&pa, &pb)?, Some((pa, pb)))
        }
    };
    let parameters = estimate.with_correlation(rho);
    let sef = evaluate(&parameters)?;

    let both_normal = normality_a.approximately_normal && normality_b.approximately_normal;
    let applicability = applicability::score(&estimate, both_normal);
    let quadrant = Quadrant::classify(estimate.delta, estimate.kappa, config.thresholds);
    let cohens_d = estimate.cohens_d();

    let log_comparison = if config.log_transform {
        let t = log_transform(&a, &b)?;
        let t_estimate = estimate_samples(&spec.label_a, &t.group_a, &spec.label_b, &t.group_b)?;
        let t_rho = match &paired {
            Some((pa, pb)) => pearson(&ln_shifted(pa, t.offset), &ln_shifted(pb, t.offset))?,
            None => rho,
        };
        let t_sef = evaluate(&t_estimate.with_correlation(t_rho))?;
        let sef_change = if sef.sef.is_finite() && t_sef.sef.is_finite() {
            Some(t_sef.sef - sef.sef)
        } else {
            None
        };
        Some(LogComparison {
            offset: t.offset,
            normal_a: sef_tests::check_normality(&t.group_a, config.alpha).approximately_normal,
            normal_b: sef_tests::check_normality(&t.group_b, config.alpha).approximately_normal,
            estimate: t_estimate,
            sef: t_sef,
            sef_change,
        })
    } else {
        None
    };

    log::debug!(
        "validated {} on '{}': SEF={:.4} ({}), {}",
        config.measurement,
        spec.column,
        sef.sef,
        sef.assessment,
        quadrant
    );

    Ok(ValidationReport {
        groups: spec.clone(),
        measurement: config.measurement.clone(),
        total_rows: table.len(),
        estimate,
        parameters,
        sef,
        normality_a,
        normality_b,
        cohens_d,
        effect_size: cohens_d.map(EffectSize::from_d),
        quadrant,
        applicability,
        log_comparison,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Two labelled groups with `n` rows each; A is tighter and higher.
    fn two_groups(n: usize) -> ObservationTable {
        let mut csv = String::from("team,league,points\n");
        for i in 0..n {
            let wobble = ((i * 7) % 11) as f64;
            csv.push_str(&format!("a{i},east,{}\n", 60.0 + wobble));
            csv.push_str(&format!("b{i},west,{}\n", 52.0 + 1.5 * wobble));
        }
        ObservationTable::from_csv_str(&csv).unwrap()
    }

    fn config() -> ValidationConfig {
        ValidationConfig::new(GroupSpec::new("league", "east", "west"), "points")
    }

    #[test]
    fn test_validate_assumed_rho() {
        let report = validate(&two_groups(30), &config()).unwrap();
        assert_eq!(report.total_rows, 60);
        assert!((report.estimate.kappa - 2.25).abs() < 1e-9);
        assert!(report.parameters.rho.is_assumed());
        assert!((report.sef.rho - DEFAULT_ASSUMED_RHO).abs() < 1e-12);
        assert!(report.sef.sef > 1.0);
        assert_eq!(report.quadrant, Quadrant::Q2);
        assert!(report.log_comparison.is_none());
    }

    #[test]
    fn test_validate_paired_rho() {
        let mut cfg = config();
        cfg.correlation = CorrelationSource::Paired;
        let report = validate(&two_groups(30), &cfg).unwrap();
        // B is an exact affine image of A row by row.
        assert!((report.sef.rho - 1.0).abs() < 1e-9);
        assert!(!report.sef.rho_assumed);
    }

    #[test]
    fn test_min_sample_gate() {
        let err = validate(&two_groups(5), &config()).unwrap_err();
        assert!(matches!(
            err,
            SefError::InsufficientSample { needed: 10, got: 5, .. }
        ));
    }

    #[test]
    fn test_absent_label_hits_gate() {
        let mut cfg = config();
        cfg.groups.label_b = "north".into();
        assert!(matches!(
            validate(&two_groups(30), &cfg),
            Err(SefError::InsufficientSample { got: 0, .. })
        ));
    }

    #[test]
    fn test_bad_alpha() {
        let mut cfg = config();
        cfg.alpha = 1.5;
        assert!(matches!(validate(&two_groups(30), &cfg), Err(SefError::Config(_))));
    }

    #[test]
    fn test_log_comparison() {
        let mut cfg = config();
        cfg.log_transform = true;
        let report = validate(&two_groups(30), &cfg).unwrap();
        let log = report.log_comparison.unwrap();
        assert_eq!(log.offset, 0.0);
        assert!(log.estimate.kappa > 0.0);
        assert!(log.sef_change.is_some());
    }

    #[test]
    fn test_correlation_source_json() {
        let assumed: CorrelationSource = serde_json::from_str(r#"{"assumed":0.3}"#).unwrap();
        assert_eq!(assumed, CorrelationSource::Assumed(0.3));
        let paired: CorrelationSource = serde_json::from_str(r#""paired""#).unwrap();
        assert_eq!(paired, CorrelationSource::Paired);
    }
}
