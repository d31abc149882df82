//! How well a dataset fits the assumptions behind SEF.

use std::fmt;

use serde::Serialize;

use crate::estimate::Estimate;

/// Sample size each group needs for the first criterion.
pub const ADEQUATE_SAMPLE: usize = 20;
/// Acceptable κ band.
pub const KAPPA_RANGE: (f64, f64) = (0.5, 5.0);
/// |δ| must exceed this to count as a meaningful difference.
pub const MIN_ABS_DELTA: f64 = 0.1;
/// Cohen's d must exceed this to count as a practical effect.
pub const MIN_COHENS_D: f64 = 0.2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FrameworkFit {
    Poor,
    Moderate,
    Good,
    Excellent,
}

impl FrameworkFit {
    pub fn from_score(score: u8) -> Self {
        match score {
            4.. => FrameworkFit::Excellent,
            3 => FrameworkFit::Good,
            2 => FrameworkFit::Moderate,
            _ => FrameworkFit::Poor,
        }
    }
}

impl fmt::Display for FrameworkFit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            FrameworkFit::Poor => "poor",
            FrameworkFit::Moderate => "moderate",
            FrameworkFit::Good => "good",
            FrameworkFit::Excellent => "excellent",
        };
        f.write_str(s)
    }
}

/// One point per satisfied criterion, out of five.
#[derive(Debug, Clone, Serialize)]
pub struct Applicability {
    pub adequate_samples: bool,
    pub reasonable_kappa: bool,
    pub meaningful_delta: bool,
    pub both_normal: bool,
    pub practical_effect: bool,
    pub score: u8,
    pub fit: FrameworkFit,
}

/// Score an estimate. `both_normal` comes from the normality battery.
pub fn score(estimate: &Estimate, both_normal: bool) -> Applicability {
    let adequate_samples =
        estimate.group_a.n >= ADEQUATE_SAMPLE && estimate.group_b.n >= ADEQUATE_SAMPLE;
    let reasonable_kappa = (KAPPA_RANGE.0..=KAPPA_RANGE.1).contains(&estimate.kappa);
    let meaningful_delta = estimate.delta.abs() > MIN_ABS_DELTA;
    let practical_effect = estimate.cohens_d().is_some_and(|d| d > MIN_COHENS_D);

    let score = [
        adequate_samples,
        reasonable_kappa,
        meaningful_delta,
        both_normal,
        practical_effect,
    ]
    .iter()
    .filter(|&&c| c)
    .count() as u8;

    Applicability {
        adequate_samples,
        reasonable_kappa,
        meaningful_delta,
        both_normal,
        practical_effect,
        score,
        fit: FrameworkFit::from_score(score),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::estimate::estimate_samples;

    fn spread(n: usize, centre: f64) -> Vec<f64> {
        (0..n).map(|i| centre + (i % 5) as f64).collect()
    }

    #[test]
    fn test_all_criteria() {
        let est = estimate_samples("a", &spread(25, 10.0), "b", &spread(25, 7.0)).unwrap();
        let app = score(&est, true);
        assert_eq!(app.score, 5);
        assert_eq!(app.fit, FrameworkFit::Excellent);
    }

    #[test]
    fn test_reference_scenario_scores_poorly() {
        let est = estimate_samples(
            "A",
            &[10.0, 12.0, 14.0, 16.0, 18.0],
            "B",
            &[5.0, 25.0, 45.0],
        )
        .unwrap();
        let app = score(&est, false);
        // κ = 40 and tiny groups; only the mean difference counts.
        assert!(!app.adequate_samples);
        assert!(!app.reasonable_kappa);
        assert!(app.meaningful_delta);
        assert!(app.practical_effect);
        assert_eq!(app.score, 2);
        assert_eq!(app.fit, FrameworkFit::Moderate);
    }

    #[test]
    fn test_fit_tiers() {
        assert_eq!(FrameworkFit::from_score(5), FrameworkFit::Excellent);
        assert_eq!(FrameworkFit::from_score(3), FrameworkFit::Good);
        assert_eq!(FrameworkFit::from_score(1), FrameworkFit::Poor);
        assert_eq!(FrameworkFit::from_score(0), FrameworkFit::Poor);
    }
}
