//! Integration tests for sef-core.
//!
//! These tests drive the full pipeline from files on disk:
//! CSV → table → partition → estimate → normality → SEF → report.

use std::path::Path;

use sef_core::report::{render_text, summary_table, write_json};
use sef_core::{
    CorrelationSource, GroupSpec, ObservationTable, SefError, ValidationConfig,
    load_scenarios_from_path, signal_enhancement_factor, validate,
};

fn write(dir: &Path, name: &str, text: &str) -> std::path::PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, text).unwrap();
    path
}

/// Hospital readmission rates for two ownership types, with a few gaps.
fn hospitals_csv() -> String {
    let mut csv = String::from("facility,ownership,readmission_rate,notes\n");
    for i in 0..40 {
        let w = ((i * 13) % 17) as f64 / 4.0;
        let rate = if i % 10 == 3 {
            "N/A".to_string()
        } else {
            format!("{:.2}", 14.0 + w)
        };
        csv.push_str(&format!("H{i:03},Voluntary non-profit,{rate},\"ok, audited\"\n"));
        csv.push_str(&format!("P{i:03},Proprietary,{:.2},\n", 15.5 + 1.8 * w));
    }
    csv
}

#[test]
fn full_pipeline_from_csv_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = write(dir.path(), "hospitals.csv", &hospitals_csv());

    let table = ObservationTable::from_csv_path(&path).unwrap();
    assert_eq!(table.len(), 80);

    let spec = GroupSpec::new("ownership", "Voluntary non-profit", "Proprietary");
    let report = validate(&table, &ValidationConfig::new(spec, "readmission_rate")).unwrap();

    // Four N/A cells are dropped from the non-profit group.
    assert_eq!(report.estimate.group_a.n, 36);
    assert_eq!(report.estimate.group_b.n, 40);
    assert!(report.estimate.kappa > 1.0);
    assert!(report.estimate.delta < 0.0);
    assert!(report.parameters.rho.is_assumed());
    let expected = signal_enhancement_factor(report.estimate.kappa, 0.2).unwrap();
    assert!((report.sef.sef - expected).abs() < 1e-12);

    let text = render_text(&report);
    assert!(text.contains("Classes: Voluntary non-profit vs Proprietary"));
}

#[test]
fn text_in_measurement_column_is_a_parse_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = write(
        dir.path(),
        "bad.csv",
        "team,conf,pts\nA,E,101\nB,W,99\nC,E,lots\n",
    );
    let table = ObservationTable::from_csv_path(&path).unwrap();
    let mut cfg = ValidationConfig::new(GroupSpec::new("conf", "E", "W"), "pts");
    cfg.min_samples = 2;
    let err = validate(&table, &cfg).unwrap_err();
    assert!(matches!(err, SefError::Parse { .. }), "{err}");
}

#[test]
fn missing_file_is_an_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = ObservationTable::from_csv_path(dir.path().join("nope.csv")).unwrap_err();
    assert!(matches!(err, SefError::Io { .. }));
}

#[test]
fn batch_scenarios_resolve_relative_datasets() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "hospitals.csv", &hospitals_csv());
    let scenarios = write(
        dir.path(),
        "scenarios.json",
        r#"{
            "scenarios": [
                {
                    "name": "ownership",
                    "dataset": "hospitals.csv",
                    "group_column": "ownership",
                    "measurement": "readmission_rate",
                    "correlation": {"assumed": 0.0},
                    "log_transform": true
                },
                {
                    "name": "too strict",
                    "dataset": "hospitals.csv",
                    "group_column": "ownership",
                    "measurement": "readmission_rate",
                    "min_samples": 100
                }
            ]
        }"#,
    );

    let file = load_scenarios_from_path(&scenarios).unwrap();
    let mut reports = Vec::new();
    let mut failures = 0;
    for s in &file.scenarios {
        let table = ObservationTable::from_csv_path(&s.dataset).unwrap();
        match s.config(&table).and_then(|cfg| validate(&table, &cfg)) {
            Ok(r) => reports.push((s.name.clone(), r)),
            Err(SefError::InsufficientSample { needed: 100, .. }) => failures += 1,
            Err(e) => panic!("unexpected error: {e}"),
        }
    }
    assert_eq!(reports.len(), 1);
    assert_eq!(failures, 1);

    let (name, r) = &reports[0];
    // First two labels in file order.
    assert_eq!(r.groups.label_a, "Voluntary non-profit");
    // ρ = 0: numerator and denominator coincide, no enhancement.
    assert!((r.sef.sef - 1.0).abs() < 1e-12);
    assert!(r.estimate.kappa > 1.0);
    assert!(r.log_comparison.is_some());

    let summary = summary_table(reports.iter().map(|(n, r)| (n.as_str(), r))).unwrap();
    let out = dir.path().join("summary.csv");
    summary.write_csv_path(&out).unwrap();
    let back = ObservationTable::from_csv_path(&out).unwrap();
    assert_eq!(back.rows()[0][0], *name);

    let json = dir.path().join("report.json");
    write_json(&json, r).unwrap();
    let value: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(json).unwrap()).unwrap();
    assert_eq!(value["measurement"], "readmission_rate");
}

#[test]
fn paired_design_measures_rho() {
    // Same athletes timed under two conditions, one row per condition.
    let mut csv = String::from("athlete,condition,time\n");
    for i in 0..15 {
        let base = 10.0 + ((i * 5) % 7) as f64 * 0.3;
        csv.push_str(&format!("a{i},indoor,{base:.2}\n"));
        csv.push_str(&format!(
            "a{i},outdoor,{:.2}\n",
            base + 0.4 + ((i * 3) % 4) as f64 * 0.1
        ));
    }
    let table = ObservationTable::from_csv_str(&csv).unwrap();
    let mut cfg = ValidationConfig::new(GroupSpec::new("condition", "indoor", "outdoor"), "time");
    cfg.correlation = CorrelationSource::Paired;
    let report = validate(&table, &cfg).unwrap();
    assert!(!report.sef.rho_assumed);
    assert!(report.sef.rho > 0.8, "rho = {}", report.sef.rho);
    assert!(report.sef.sef > 1.0 + report.estimate.kappa);
}
