//! Log transformation of skewed measurements.

use serde::Serialize;

use crate::error::{Result, SefError};

/// Two groups mapped through `ln(x + offset)`.
#[derive(Debug, Clone, Serialize)]
pub struct LogTransformed {
    /// Zero unless some value was <= 0, then |min| + 1.
    pub offset: f64,
    #[serde(skip)]
    pub group_a: Vec<f64>,
    #[serde(skip)]
    pub group_b: Vec<f64>,
}

/// Natural log of both groups with a shared offset.
///
/// When the joint minimum is <= 0 both groups are shifted by |min| + 1 so
/// every value is at least 1 before the log.
pub fn log_transform(a: &[f64], b: &[f64]) -> Result<LogTransformed> {
    let min = a
        .iter()
        .chain(b)
        .copied()
        .fold(f64::INFINITY, f64::min);
    if !min.is_finite() {
        return Err(SefError::InsufficientSample {
            group: "log transform".to_string(),
            needed: 1,
            got: 0,
        });
    }
    let offset = if min <= 0.0 { min.abs() + 1.0 } else { 0.0 };
    if offset > 0.0 {
        log::debug!("log transform: applied offset +{offset:.3} (min value {min:.3})");
    }
    Ok(LogTransformed {
        offset,
        group_a: ln_shifted(a, offset),
        group_b: ln_shifted(b, offset),
    })
}

/// `ln(x + offset)` for every value.
pub fn ln_shifted(values: &[f64], offset: f64) -> Vec<f64> {
    values.iter().map(|x| (x + offset).ln()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_positive_values_no_offset() {
        let t = log_transform(&[1.0, std::f64::consts::E], &[10.0]).unwrap();
        assert_eq!(t.offset, 0.0);
        assert!((t.group_a[1] - 1.0).abs() < 1e-12);
        assert!((t.group_b[0] - 10f64.ln()).abs() < 1e-12);
    }

    #[test]
    fn test_offset_applied_to_both_groups() {
        let t = log_transform(&[-2.0, 0.0], &[5.0]).unwrap();
        assert_eq!(t.offset, 3.0);
        assert_eq!(t.group_a[0], 0.0);
        assert!((t.group_b[0] - 8f64.ln()).abs() < 1e-12);
    }

    #[test]
    fn test_zero_triggers_offset() {
        let t = log_transform(&[0.0, 4.0], &[1.0]).unwrap();
        assert_eq!(t.offset, 1.0);
    }

    #[test]
    fn test_empty_input() {
        assert!(log_transform(&[], &[]).is_err());
    }
}
