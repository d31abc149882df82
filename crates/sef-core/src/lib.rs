//! # sef-core
//!
//! **Is it better to measure competitors against each other, or one at a time?**
//!
//! `sef-core` estimates the parameters of two competing groups of
//! measurements and evaluates the Signal Enhancement Factor (SEF), the gain
//! in signal-to-noise from recording the *difference* A − B instead of A
//! and B independently:
//!
//! ```text
//! SEF = (1 + κ) / (1 + κ − 2·√κ·ρ)
//! ```
//!
//! where κ = var_B / var_A, ρ is the correlation between the groups and
//! δ = (mean_A − mean_B) / sd_A is the standardized separation.
//!
//! ## Quick Start
//!
//! ```no_run
//! use sef_core::{GroupSpec, ObservationTable, ValidationConfig, validate};
//!
//! let table = ObservationTable::from_csv_path("mlperf.csv")?;
//! let config = ValidationConfig::new(GroupSpec::new("hardware_type", "GPU", "TPU"), "accuracy");
//! let report = validate(&table, &config)?;
//! println!("{}", sef_core::report::render_text(&report));
//! # Ok::<(), sef_core::SefError>(())
//! ```
//!
//! ## Architecture
//!
//! Load → Partition → Estimate → Normality → SEF → Emit
//!
//! ρ is never silent: every [`ParameterSet`] carries a [`Correlation`] that
//! is either measured from paired rows or explicitly assumed, and reports
//! say which. A denominator at or below zero yields `+∞`, reported as a
//! breakdown of the framework rather than as a large enhancement.

pub mod applicability;
pub mod balance;
pub mod error;
pub mod estimate;
pub mod partition;
pub mod pipeline;
pub mod quadrant;
pub mod report;
pub mod scenario;
pub mod sef;
pub mod table;
pub mod transform;

pub use applicability::{Applicability, FrameworkFit};
pub use balance::{BalanceAssessment, bootstrap_balance};
pub use error::{Result, SefError};
pub use estimate::{
    Correlation, EffectSize, Estimate, GroupSummary, ParameterSet, estimate, estimate_samples,
    pearson, summarize,
};
pub use partition::{GroupSpec, Partition, partition};
pub use pipeline::{CorrelationSource, ValidationConfig, ValidationReport, validate};
pub use quadrant::{Quadrant, QuadrantThresholds};
pub use scenario::{Scenario, ScenarioFile, load_scenarios_from_path};
pub use sef::{SefAssessment, SefResult, evaluate, signal_enhancement_factor};
pub use table::ObservationTable;
pub use transform::log_transform;

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
