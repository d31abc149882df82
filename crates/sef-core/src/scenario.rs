//! JSON scenario files for batch runs.
//!
//! ```json
//! {
//!   "scenarios": [
//!     {
//!       "name": "GPU vs TPU accuracy",
//!       "dataset": "mlperf.csv",
//!       "group_column": "hardware_type",
//!       "class_a": "GPU",
//!       "class_b": "TPU",
//!       "measurement": "accuracy",
//!       "correlation": {"assumed": 0.2}
//!     }
//!   ]
//! }
//! ```
//!
//! Relative `dataset` paths are resolved against the scenario file's
//! directory. When `class_a`/`class_b` are omitted the first two labels of
//! `group_column` are used.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Result, SefError};
use crate::partition::GroupSpec;
use crate::pipeline::{CorrelationSource, DEFAULT_MIN_SAMPLES, ValidationConfig};
use crate::quadrant::QuadrantThresholds;
use crate::table::ObservationTable;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Scenario {
    pub name: String,
    pub dataset: PathBuf,
    pub group_column: String,
    #[serde(default)]
    pub class_a: Option<String>,
    #[serde(default)]
    pub class_b: Option<String>,
    pub measurement: String,
    #[serde(default)]
    pub correlation: CorrelationSource,
    #[serde(default = "default_min_samples")]
    pub min_samples: usize,
    #[serde(default = "default_alpha")]
    pub alpha: f64,
    #[serde(default)]
    pub log_transform: bool,
    #[serde(default)]
    pub thresholds: Option<QuadrantThresholds>,
}

fn default_min_samples() -> usize {
    DEFAULT_MIN_SAMPLES
}

fn default_alpha() -> f64 {
    sef_tests::DEFAULT_ALPHA
}

impl Scenario {
    /// Resolve the group labels against `table` and build a pipeline config.
    pub fn config(&self, table: &ObservationTable) -> Result<ValidationConfig> {
        let groups = match (&self.class_a, &self.class_b) {
            (Some(a), Some(b)) => GroupSpec::new(&self.group_column, a, b),
            (None, None) => GroupSpec::first_two_labels(table, &self.group_column)?,
            _ => {
                return Err(SefError::Config(format!(
                    "scenario '{}': give both class_a and class_b or neither",
                    self.name
                )));
            }
        };
        let mut config = ValidationConfig::new(groups, &self.measurement);
        config.correlation = self.correlation;
        config.min_samples = self.min_samples;
        config.alpha = self.alpha;
        config.log_transform = self.log_transform;
        if let Some(t) = self.thresholds {
            config.thresholds = t;
        }
        Ok(config)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioFile {
    pub scenarios: Vec<Scenario>,
}

/// Parse a scenario file from JSON text. Paths are left as written.
pub fn parse_scenarios(text: &str) -> Result<ScenarioFile> {
    let file: ScenarioFile = serde_json::from_str(text).map_err(|e| SefError::Parse {
        line: e.line(),
        message: e.to_string(),
    })?;
    if file.scenarios.is_empty() {
        return Err(SefError::Config("scenario file lists no scenarios".into()));
    }
    Ok(file)
}

/// Load a scenario file and resolve relative dataset paths against its
/// directory.
pub fn load_scenarios_from_path(path: impl AsRef<Path>) -> Result<ScenarioFile> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path).map_err(|e| SefError::io(path, e))?;
    let mut file = parse_scenarios(&text)?;
    let base = path.parent().unwrap_or_else(|| Path::new(""));
    for s in &mut file.scenarios {
        if s.dataset.is_relative() {
            s.dataset = base.join(&s.dataset);
        }
    }
    log::debug!("loaded {} scenario(s) from {}", file.scenarios.len(), path.display());
    Ok(file)
}
