//! The Signal Enhancement Factor.
//!
//! ```text
//! SEF = (1 + κ) / (1 + κ − 2·√κ·ρ)
//! ```
//!
//! SEF compares the signal-to-noise of a relative (A − B) measurement with
//! that of independent measurements. When the denominator reaches zero or
//! below, the formula has hit its asymptote and the result is `+∞`, which
//! callers must read as "the framework breaks down here", not as an
//! enhancement estimate.
//!
//! Swapping the groups maps κ to 1/κ. SEF itself is unchanged by that
//! (multiply numerator and denominator by κ), but δ is not, so results are
//! always reported with the comparison direction.

use std::fmt;

use serde::Serialize;

use crate::error::{Result, SefError};
use crate::estimate::ParameterSet;

/// `1 + κ − 2·√κ·ρ`, without validation.
pub fn sef_denominator(kappa: f64, rho: f64) -> f64 {
    1.0 + kappa - 2.0 * kappa.sqrt() * rho
}

/// Evaluate SEF for κ > 0 and ρ ∈ [-1, 1].
///
/// Returns `f64::INFINITY` when the denominator is not positive.
pub fn signal_enhancement_factor(kappa: f64, rho: f64) -> Result<f64> {
    if !kappa.is_finite() || kappa <= 0.0 {
        return Err(SefError::InvalidKappa(kappa));
    }
    if !rho.is_finite() || !(-1.0..=1.0).contains(&rho) {
        return Err(SefError::InvalidCorrelation(rho));
    }
    let denominator = sef_denominator(kappa, rho);
    if denominator <= 0.0 {
        log::warn!("SEF denominator {denominator:.3e} <= 0 at kappa={kappa}, rho={rho}");
        return Ok(f64::INFINITY);
    }
    Ok((1.0 + kappa) / denominator)
}

/// How much a finite SEF promises over independent measurement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SefAssessment {
    /// SEF > 1.5
    Excellent,
    /// SEF > 1.25
    Good,
    /// SEF > 1.1
    Modest,
    Minimal,
    /// Denominator at or below zero; the estimate is meaningless.
    Breakdown,
}

impl SefAssessment {
    pub fn from_sef(sef: f64) -> Self {
        if !sef.is_finite() {
            SefAssessment::Breakdown
        } else if sef > 1.5 {
            SefAssessment::Excellent
        } else if sef > 1.25 {
            SefAssessment::Good
        } else if sef > 1.1 {
            SefAssessment::Modest
        } else {
            SefAssessment::Minimal
        }
    }
}

impl fmt::Display for SefAssessment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SefAssessment::Excellent => "excellent improvement potential",
            SefAssessment::Good => "good improvement potential",
            SefAssessment::Modest => "modest improvement potential",
            SefAssessment::Minimal => "minimal improvement potential",
            SefAssessment::Breakdown => "framework breaks down (denominator <= 0)",
        };
        f.write_str(s)
    }
}

/// A computed SEF together with the inputs that produced it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SefResult {
    pub kappa: f64,
    pub rho: f64,
    pub rho_assumed: bool,
    pub denominator: f64,
    /// Serialized as `null` when infinite.
    #[serde(serialize_with = "finite_or_null")]
    pub sef: f64,
    #[serde(serialize_with = "finite_or_null")]
    pub improvement_percent: f64,
    pub assessment: SefAssessment,
}

impl SefResult {
    pub fn is_breakdown(&self) -> bool {
        self.assessment == SefAssessment::Breakdown
    }
}

/// Compute SEF from a parameter set, carrying ρ's provenance along.
pub fn evaluate(params: &ParameterSet) -> Result<SefResult> {
    let rho = params.rho.r();
    let sef = signal_enhancement_factor(params.kappa, rho)?;
    Ok(SefResult {
        kappa: params.kappa,
        rho,
        rho_assumed: params.rho.is_assumed(),
        denominator: sef_denominator(params.kappa, rho),
        sef,
        improvement_percent: (sef - 1.0) * 100.0,
        assessment: SefAssessment::from_sef(sef),
    })
}

fn finite_or_null<S: serde::Serializer>(v: &f64, s: S) -> std::result::Result<S::Ok, S::Error> {
    if v.is_finite() {
        s.serialize_f64(*v)
    } else {
        s.serialize_none()
    }
}
