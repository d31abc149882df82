pub mod analyze;
pub mod balance;
pub mod batch;
pub mod compute;
pub mod fetch;
pub mod inspect;
pub mod normality;

use sef_core::{GroupSpec, ObservationTable, Result, SefError};

/// Split a comma-separated flag value, dropping empty entries.
pub fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Load a CSV file, announcing its shape.
pub fn load_table(path: &str) -> Result<ObservationTable> {
    let table = ObservationTable::from_csv_path(path)?;
    println!(
        "Loaded {path}: {} records, {} columns",
        table.len(),
        table.columns().len()
    );
    Ok(table)
}

/// Build the group spec from explicit labels, or the first two labels found.
pub fn resolve_groups(
    table: &ObservationTable,
    column: &str,
    class_a: Option<&str>,
    class_b: Option<&str>,
) -> Result<GroupSpec> {
    match (class_a, class_b) {
        (Some(a), Some(b)) => Ok(GroupSpec::new(column, a, b)),
        (None, None) => {
            let spec = GroupSpec::first_two_labels(table, column)?;
            log::info!(
                "no classes given, comparing '{}' vs '{}'",
                spec.label_a,
                spec.label_b
            );
            Ok(spec)
        }
        _ => Err(SefError::Config(
            "give both --class-a and --class-b or neither".to_string(),
        )),
    }
}
