//! Bootstrap balancing of an unequal two-class dataset.
//!
//! Competitive datasets are often lopsided (dozens of GPU submissions, a
//! handful of TPU ones). [`assess`] reports whether the imbalance is bad
//! enough to distort κ, and [`bootstrap_balance`] resamples the minority
//! class with replacement up to the majority size.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;

use crate::error::{Result, SefError};
use crate::partition::{GroupSpec, partition};
use crate::table::ObservationTable;

/// Sample-size ratio above which balancing is recommended.
pub const MAX_SAMPLE_RATIO: f64 = 3.0;
/// Variance-ratio band outside which balancing is recommended.
pub const VARIANCE_RATIO_BAND: (f64, f64) = (0.01, 100.0);
/// Minority classes smaller than this are too small to trust.
pub const MIN_MINORITY_ROWS: usize = 5;

#[derive(Debug, Clone, Serialize)]
pub struct BalanceAssessment {
    pub rows_a: usize,
    pub rows_b: usize,
    /// max / min row count; infinite when a class is empty.
    pub sample_ratio: f64,
    /// var_B / var_A of the measurement column, when one was given.
    pub variance_ratio: Option<f64>,
    pub reasons: Vec<String>,
}

impl BalanceAssessment {
    pub fn needs_balancing(&self) -> bool {
        !self.reasons.is_empty()
    }
}

fn sample_variance(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    Some(values.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / (n - 1.0))
}

/// Check class sizes and, if `measurement` is given, the variance ratio.
pub fn assess(
    table: &ObservationTable,
    spec: &GroupSpec,
    measurement: Option<&str>,
) -> Result<BalanceAssessment> {
    let p = partition(table, spec)?;
    let (rows_a, rows_b) = (p.group_a.len(), p.group_b.len());
    let minority = rows_a.min(rows_b);
    let sample_ratio = if minority == 0 {
        f64::INFINITY
    } else {
        rows_a.max(rows_b) as f64 / minority as f64
    };

    let mut reasons = Vec::new();
    if sample_ratio > MAX_SAMPLE_RATIO {
        reasons.push(format!(
            "sample ratio {sample_ratio:.1}:1 exceeds {MAX_SAMPLE_RATIO}:1"
        ));
    }
    if minority < MIN_MINORITY_ROWS {
        reasons.push(format!(
            "minority class has {minority} row(s), fewer than {MIN_MINORITY_ROWS}"
        ));
    }

    let variance_ratio = match measurement {
        Some(col) => {
            let (a, b) = p.measurements(col)?;
            match (sample_variance(&a), sample_variance(&b)) {
                (Some(va), Some(vb)) if va > 0.0 => Some(vb / va),
                _ => None,
            }
        }
        None => None,
    };
    if let Some(k) = variance_ratio {
        let (lo, hi) = VARIANCE_RATIO_BAND;
        if !(lo..=hi).contains(&k) {
            reasons.push(format!("variance ratio {k:.3} outside [{lo}, {hi}]"));
        }
    }

    Ok(BalanceAssessment {
        rows_a,
        rows_b,
        sample_ratio,
        variance_ratio,
        reasons,
    })
}

/// Resample the minority class with replacement to the majority size.
///
/// The returned table holds the majority rows unchanged followed by the
/// resampled minority rows. Rows of other labels are dropped. The same
/// `seed` always gives the same table.
pub fn bootstrap_balance(
    table: &ObservationTable,
    spec: &GroupSpec,
    seed: u64,
) -> Result<ObservationTable> {
    let p = partition(table, spec)?;
    let (majority, minority, minority_label) = if p.group_a.len() >= p.group_b.len() {
        (&p.group_a, &p.group_b, &spec.label_b)
    } else {
        (&p.group_b, &p.group_a, &spec.label_a)
    };
    if minority.is_empty() {
        return Err(SefError::InsufficientSample {
            group: minority_label.clone(),
            needed: 1,
            got: 0,
        });
    }

    let mut rng = StdRng::seed_from_u64(seed);
    let mut out = ObservationTable::new(table.columns().to_vec());
    for row in majority.rows() {
        out.push_row(row.clone())?;
    }
    let pool = minority.rows();
    for _ in 0..majority.len() {
        out.push_row(pool[rng.random_range(0..pool.len())].clone())?;
    }
    log::info!(
        "bootstrapped '{minority_label}' from {} to {} row(s) (seed {seed})",
        minority.len(),
        majority.len()
    );
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lopsided() -> ObservationTable {
        let mut csv = String::from("hw,score\n");
        for i in 0..12 {
            csv.push_str(&format!("GPU,{}\n", 80 + i));
        }
        csv.push_str("TPU,70\nTPU,75\nTPU,72\n");
        ObservationTable::from_csv_str(&csv).unwrap()
    }

    #[test]
    fn test_assess_flags_imbalance() {
        let a = assess(&lopsided(), &GroupSpec::new("hw", "GPU", "TPU"), Some("score")).unwrap();
        assert_eq!((a.rows_a, a.rows_b), (12, 3));
        assert!((a.sample_ratio - 4.0).abs() < 1e-12);
        assert!(a.needs_balancing());
        assert_eq!(a.reasons.len(), 2);
        assert!(a.variance_ratio.is_some());
    }

    #[test]
    fn test_assess_balanced() {
        let t = ObservationTable::from_csv_str(
            "hw,score\nA,1\nA,2\nA,3\nA,4\nA,5\nB,2\nB,3\nB,4\nB,5\nB,6\n",
        )
        .unwrap();
        let a = assess(&t, &GroupSpec::new("hw", "A", "B"), Some("score")).unwrap();
        assert!(!a.needs_balancing(), "{:?}", a.reasons);
    }

    #[test]
    fn test_bootstrap_equalises_and_is_seeded() {
        let spec = GroupSpec::new("hw", "GPU", "TPU");
        let first = bootstrap_balance(&lopsided(), &spec, 42).unwrap();
        let again = bootstrap_balance(&lopsided(), &spec, 42).unwrap();
        assert_eq!(first, again);
        assert_eq!(first.len(), 24);
        let tpu = first.filter_by_label("hw", "TPU").unwrap();
        assert_eq!(tpu.len(), 12);
        for v in tpu.measurements("score").unwrap() {
            assert!([70.0, 75.0, 72.0].contains(&v));
        }
    }

    #[test]
    fn test_bootstrap_empty_minority() {
        let spec = GroupSpec::new("hw", "GPU", "FPGA");
        assert!(matches!(
            bootstrap_balance(&lopsided(), &spec, 1),
            Err(SefError::InsufficientSample { .. })
        ));
    }
}
