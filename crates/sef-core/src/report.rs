//! Rendering validation results as text, CSV summaries and JSON.

use std::path::Path;

use serde::Serialize;

use crate::error::{Result, SefError};
use crate::pipeline::ValidationReport;
use crate::table::ObservationTable;

/// Header of the one-row-per-scenario CSV summary.
pub const SUMMARY_COLUMNS: &[&str] = &[
    "scenario",
    "group_column",
    "class_a",
    "class_b",
    "measurement",
    "n_a",
    "n_b",
    "mean_a",
    "mean_b",
    "std_a",
    "std_b",
    "delta",
    "kappa",
    "rho",
    "rho_source",
    "sef",
    "improvement_percent",
    "assessment",
    "quadrant",
    "normal_a",
    "normal_b",
    "cohens_d",
    "applicability_score",
    "framework_fit",
];

fn num(v: f64) -> String {
    if v.is_finite() {
        format!("{v:.6}")
    } else if v > 0.0 {
        "inf".to_string()
    } else {
        String::new()
    }
}

fn mark(ok: bool) -> &'static str {
    if ok { "✓" } else { "✗" }
}

/// Human-readable report of one comparison.
pub fn render_text(report: &ValidationReport) -> String {
    let g = &report.groups;
    let e = &report.estimate;
    let s = &report.sef;
    let mut out = String::new();

    out.push_str("=== SEF FRAMEWORK VALIDATION ===\n");
    out.push_str(&format!("Dataset: {} total records\n", report.total_rows));
    out.push_str(&format!("Classification: {}\n", g.column));
    out.push_str(&format!("Classes: {} vs {}\n", g.label_a, g.label_b));
    out.push_str(&format!("Measurement: {}\n\n", report.measurement));

    out.push_str("Basic Statistics:\n");
    for summary in [&e.group_a, &e.group_b] {
        out.push_str(&format!(
            "  {:<12} n={:<5} mean={:.4}  std={:.4}\n",
            summary.label, summary.n, summary.mean, summary.std_dev
        ));
    }

    out.push_str("\nSEF Parameters:\n");
    out.push_str(&format!("  κ (variance ratio)     = {:.4}\n", e.kappa));
    out.push_str(&format!("  δ (signal separation)  = {:.4}\n", e.delta));
    out.push_str(&format!("  ρ (correlation)        = {}\n", report.parameters.rho));

    out.push_str("\nSEF Calculation:\n");
    out.push_str("  SEF = (1 + κ) / (1 + κ − 2√κ·ρ)\n");
    out.push_str(&format!("  denominator = {:.4}\n", s.denominator));
    if s.is_breakdown() {
        out.push_str("  SEF = ∞\n");
        out.push_str(&format!("  Assessment: {}\n", s.assessment));
    } else {
        out.push_str(&format!("  SEF = {:.4}\n", s.sef));
        out.push_str(&format!("  Improvement: {:.1}%\n", s.improvement_percent));
        out.push_str(&format!("  Assessment: {}\n", s.assessment));
    }

    out.push_str(&format!("\nNormality (alpha = {}):\n", report.normality_a.alpha));
    for (label, n) in [
        (&g.label_a, &report.normality_a),
        (&g.label_b, &report.normality_b),
    ] {
        out.push_str(&format!(
            "  {label}: {} ({}/{} tests ran)\n",
            if n.approximately_normal {
                "approximately normal"
            } else {
                "not normal"
            },
            n.tests_run,
            n.results.len()
        ));
        for t in &n.results {
            let p = t
                .p_value
                .map(|p| format!("p={p:.4}"))
                .unwrap_or_else(|| "skipped".to_string());
            out.push_str(&format!(
                "    {} {:<20} {}\n",
                if t.ran { mark(t.passed) } else { "-" },
                t.name,
                p
            ));
        }
    }

    out.push_str("\nEffect size:\n");
    match (report.cohens_d, report.effect_size) {
        (Some(d), Some(size)) => out.push_str(&format!("  Cohen's d = {d:.4} ({size})\n")),
        _ => out.push_str("  Cohen's d undefined (zero pooled variance)\n"),
    }

    let a = &report.applicability;
    out.push_str("\nFramework Applicability:\n");
    out.push_str(&format!("  {} sample size >= 20 per group\n", mark(a.adequate_samples)));
    out.push_str(&format!("  {} variance ratio within [0.5, 5]\n", mark(a.reasonable_kappa)));
    out.push_str(&format!("  {} signal separation |δ| > 0.1\n", mark(a.meaningful_delta)));
    out.push_str(&format!("  {} both groups approximately normal\n", mark(a.both_normal)));
    out.push_str(&format!("  {} Cohen's d > 0.2\n", mark(a.practical_effect)));
    out.push_str(&format!("  Overall: {}/5 ({} fit)\n", a.score, a.fit));

    out.push_str(&format!(
        "\nQuadrant: {} ({})\n  {}\n",
        report.quadrant,
        report.quadrant.description(),
        report.quadrant.outlook()
    ));

    if let Some(log) = &report.log_comparison {
        out.push_str("\nLog Transformation:\n");
        if log.offset > 0.0 {
            out.push_str(&format!("  offset applied: +{:.4}\n", log.offset));
        }
        out.push_str(&format!("  {:<10} {:>12} {:>12}\n", "", "original", "log"));
        out.push_str(&format!(
            "  {:<10} {:>12.4} {:>12.4}\n",
            "κ", e.kappa, log.estimate.kappa
        ));
        out.push_str(&format!(
            "  {:<10} {:>12.4} {:>12.4}\n",
            "δ", e.delta, log.estimate.delta
        ));
        out.push_str(&format!(
            "  {:<10} {:>12.4} {:>12.4}\n",
            "SEF", s.sef, log.sef.sef
        ));
        let before = format!(
            "{}/{}",
            mark(report.normality_a.approximately_normal),
            mark(report.normality_b.approximately_normal)
        );
        let after = format!("{}/{}", mark(log.normal_a), mark(log.normal_b));
        out.push_str(&format!("  {:<10} {:>12} {:>12}\n", "normal", before, after));
        match log.sef_change {
            Some(change) => out.push_str(&format!("  SEF change: {change:+.4}\n")),
            None => out.push_str("  SEF change: undefined (infinite SEF)\n"),
        }
    }

    out
}

/// One summary row per named report, ready to write as CSV.
pub fn summary_table<'a>(
    reports: impl IntoIterator<Item = (&'a str, &'a ValidationReport)>,
) -> Result<ObservationTable> {
    let columns = SUMMARY_COLUMNS.iter().map(|c| c.to_string()).collect();
    let mut table = ObservationTable::new(columns);
    for (name, r) in reports {
        let e = &r.estimate;
        table.push_row(vec![
            name.to_string(),
            r.groups.column.clone(),
            r.groups.label_a.clone(),
            r.groups.label_b.clone(),
            r.measurement.clone(),
            e.group_a.n.to_string(),
            e.group_b.n.to_string(),
            num(e.group_a.mean),
            num(e.group_b.mean),
            num(e.group_a.std_dev),
            num(e.group_b.std_dev),
            num(e.delta),
            num(e.kappa),
            num(r.sef.rho),
            if r.sef.rho_assumed { "assumed" } else { "measured" }.to_string(),
            num(r.sef.sef),
            num(r.sef.improvement_percent),
            format!("{:?}", r.sef.assessment).to_lowercase(),
            r.quadrant.to_string(),
            r.normality_a.approximately_normal.to_string(),
            r.normality_b.approximately_normal.to_string(),
            r.cohens_d.map(num).unwrap_or_default(),
            r.applicability.score.to_string(),
            r.applicability.fit.to_string(),
        ])?;
    }
    Ok(table)
}

/// Pretty-printed JSON.
pub fn to_json<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    serde_json::to_string_pretty(value)
        .map_err(|e| SefError::Config(format!("cannot serialize report: {e}")))
}

pub fn write_json<T: Serialize + ?Sized>(path: impl AsRef<Path>, value: &T) -> Result<()> {
    let path = path.as_ref();
    std::fs::write(path, to_json(value)?).map_err(|e| SefError::io(path, e))
}

pub fn write_text(path: impl AsRef<Path>, text: &str) -> Result<()> {
    let path = path.as_ref();
    std::fs::write(path, text).map_err(|e| SefError::io(path, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::partition::GroupSpec;
    use crate::pipeline::{ValidationConfig, validate};

    fn report(log_transform: bool) -> ValidationReport {
        let mut csv = String::from("hw,acc\n");
        for i in 0..25 {
            let w = ((i * 5) % 9) as f64;
            csv.push_str(&format!("GPU,{}\n", 90.0 + w));
            csv.push_str(&format!("TPU,{}\n", 85.0 + 0.5 * w + (i % 2) as f64));
        }
        let table = ObservationTable::from_csv_str(&csv).unwrap();
        let mut cfg = ValidationConfig::new(GroupSpec::new("hw", "GPU", "TPU"), "acc");
        cfg.log_transform = log_transform;
        validate(&table, &cfg).unwrap()
    }

    #[test]
    fn test_text_sections() {
        let text = render_text(&report(false));
        assert!(text.contains("Classes: GPU vs TPU"));
        assert!(text.contains("(assumed)"));
        assert!(text.contains("Overall: "));
        assert!(text.contains("Quadrant: Q1"));
        assert!(!text.contains("Log Transformation"));
    }

    #[test]
    fn test_text_log_section() {
        let text = render_text(&report(true));
        assert!(text.contains("Log Transformation"));
        assert!(text.contains("SEF change: "));
    }

    #[test]
    fn test_summary_table() {
        let r = report(false);
        let table = summary_table([("gpu-vs-tpu", &r)]).unwrap();
        assert_eq!(table.len(), 1);
        assert_eq!(table.columns().len(), SUMMARY_COLUMNS.len());
        let row = &table.rows()[0];
        assert_eq!(row[0], "gpu-vs-tpu");
        assert_eq!(row[14], "assumed");
        assert_eq!(row[18], "Q1");

        let mut buf = Vec::new();
        table.write_csv(&mut buf).unwrap();
        let back = ObservationTable::from_csv_str(std::str::from_utf8(&buf).unwrap()).unwrap();
        assert_eq!(back.measurements("kappa").unwrap().len(), 1);
    }

    #[test]
    fn test_json_round_trip_fields() {
        let json: serde_json::Value =
            serde_json::from_str(&to_json(&report(false)).unwrap()).unwrap();
        assert_eq!(json["groups"]["label_a"], "GPU");
        assert_eq!(json["parameters"]["rho"]["kind"], "assumed");
        assert!(json["sef"]["sef"].as_f64().unwrap() > 1.0);
    }

    #[test]
    fn test_num_formats_infinity() {
        assert_eq!(num(f64::INFINITY), "inf");
        assert_eq!(num(1.5), "1.500000");
    }
}
