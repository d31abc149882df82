//! Splitting an observation table into the two compared groups.

use serde::{Deserialize, Serialize};

use crate::error::{Result, SefError};
use crate::table::ObservationTable;

/// Which column separates the groups and which labels are compared.
///
/// Group A is the reference group: δ and κ are normalised by its spread.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupSpec {
    pub column: String,
    pub label_a: String,
    pub label_b: String,
}

impl GroupSpec {
    pub fn new(
        column: impl Into<String>,
        label_a: impl Into<String>,
        label_b: impl Into<String>,
    ) -> Self {
        Self {
            column: column.into(),
            label_a: label_a.into(),
            label_b: label_b.into(),
        }
    }

    /// The same comparison with A and B exchanged.
    pub fn swapped(&self) -> Self {
        Self {
            column: self.column.clone(),
            label_a: self.label_b.clone(),
            label_b: self.label_a.clone(),
        }
    }

    /// Pick the first two labels of `column` in first-seen order.
    pub fn first_two_labels(table: &ObservationTable, column: &str) -> Result<Self> {
        let labels = table.distinct_labels(column)?;
        match labels.as_slice() {
            [a, b, ..] => Ok(Self::new(column, a.label.clone(), b.label.clone())),
            _ => Err(SefError::Config(format!(
                "column '{column}' has {} distinct label(s), need at least 2",
                labels.len()
            ))),
        }
    }
}

/// The two sub-tables produced by [`partition`].
#[derive(Debug, Clone)]
pub struct Partition {
    pub spec: GroupSpec,
    pub group_a: ObservationTable,
    pub group_b: ObservationTable,
}

impl Partition {
    /// Valid values of `column` for each group, missing cells dropped.
    pub fn measurements(&self, column: &str) -> Result<(Vec<f64>, Vec<f64>)> {
        Ok((
            self.group_a.measurements(column)?,
            self.group_b.measurements(column)?,
        ))
    }

    /// Values of `column` for rows where both groups are aligned by position
    /// and neither cell is missing. Used for paired correlation.
    pub fn paired_measurements(&self, column: &str) -> Result<(Vec<f64>, Vec<f64>)> {
        let a = self.group_a.numeric_column(column)?;
        let b = self.group_b.numeric_column(column)?;
        if a.len() != b.len() {
            return Err(SefError::UnpairedSamples {
                len_a: a.len(),
                len_b: b.len(),
            });
        }
        Ok(a.into_iter()
            .zip(b)
            .filter_map(|pair| match pair {
                (Some(x), Some(y)) => Some((x, y)),
                _ => None,
            })
            .unzip())
    }
}

/// Split `table` by `spec.column` into group A and group B rows.
///
/// Labels that never occur produce an empty group rather than an error.
pub fn partition(table: &ObservationTable, spec: &GroupSpec) -> Result<Partition> {
    let group_a = table.filter_by_label(&spec.column, &spec.label_a)?;
    let group_b = table.filter_by_label(&spec.column, &spec.label_b)?;
    log::debug!(
        "partitioned on '{}': {}={} row(s), {}={} row(s)",
        spec.column,
        spec.label_a,
        group_a.len(),
        spec.label_b,
        group_b.len()
    );
    Ok(Partition {
        spec: spec.clone(),
        group_a,
        group_b,
    })
}
