//! δ × κ quadrant classification.
//!
//! Datasets are bucketed by whether the reference group clearly outperforms
//! (δ above a threshold) and whether the comparison group is the more
//! variable one (κ at or above a threshold).

use std::fmt;

use serde::{Deserialize, Serialize};

/// Boundaries between quadrants.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct QuadrantThresholds {
    /// Moderate effect size.
    pub delta: f64,
    /// Equal variance.
    pub kappa: f64,
}

impl Default for QuadrantThresholds {
    fn default() -> Self {
        Self {
            delta: 0.5,
            kappa: 1.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Quadrant {
    /// High performance, low variance asymmetry.
    Q1,
    /// High performance, high variance asymmetry.
    Q2,
    /// Low performance, low variance asymmetry.
    Q3,
    /// Low performance, high variance asymmetry.
    Q4,
}

impl Quadrant {
    pub fn classify(delta: f64, kappa: f64, thresholds: QuadrantThresholds) -> Self {
        let high_performance = delta > thresholds.delta;
        let low_asymmetry = kappa < thresholds.kappa;
        match (high_performance, low_asymmetry) {
            (true, true) => Quadrant::Q1,
            (true, false) => Quadrant::Q2,
            (false, true) => Quadrant::Q3,
            (false, false) => Quadrant::Q4,
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Quadrant::Q1 => "high performance, low variance asymmetry",
            Quadrant::Q2 => "high performance, high variance asymmetry",
            Quadrant::Q3 => "low performance, low variance asymmetry",
            Quadrant::Q4 => "low performance, high variance asymmetry",
        }
    }

    /// What the quadrant implies for relative versus absolute measurement.
    pub fn outlook(&self) -> &'static str {
        match self {
            Quadrant::Q1 => "ideal for relative measurement; noise cancellation highly effective",
            Quadrant::Q2 => "relative measurement should still win; asymmetry may cost optimality",
            Quadrant::Q3 => "weak separation; noise cancellation helps but discrimination is hard",
            Quadrant::Q4 => "weak separation and asymmetric noise; least favourable regime",
        }
    }
}

impl fmt::Display for Quadrant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}
