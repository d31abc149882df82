use std::path::Path;

use sef_core::report::{render_text, summary_table, write_json, write_text};
use sef_core::{
    ObservationTable, Result, Scenario, SefError, ValidationReport, load_scenarios_from_path,
    validate,
};

fn run_scenario(scenario: &Scenario) -> Result<ValidationReport> {
    let table = ObservationTable::from_csv_path(&scenario.dataset)?;
    let config = scenario.config(&table)?;
    validate(&table, &config)
}

pub fn run(scenarios_path: &str, output_dir: Option<&str>) -> Result<()> {
    let file = load_scenarios_from_path(scenarios_path)?;
    println!(
        "Running {} scenario(s) from {scenarios_path}",
        file.scenarios.len()
    );

    let mut done: Vec<(String, ValidationReport)> = Vec::new();
    let mut failed: Vec<(String, SefError)> = Vec::new();
    let mut text = String::new();

    for scenario in &file.scenarios {
        println!("\n{}", "=".repeat(60));
        println!("SCENARIO: {}", scenario.name);
        println!("{}", "=".repeat(60));
        match run_scenario(scenario) {
            Ok(report) => {
                let rendered = render_text(&report);
                print!("{rendered}");
                text.push_str(&format!("## {}\n\n{rendered}\n", scenario.name));
                done.push((scenario.name.clone(), report));
            }
            Err(e) => {
                log::error!("scenario '{}' failed: {e}", scenario.name);
                println!("✗ {}: {e}", scenario.name);
                failed.push((scenario.name.clone(), e));
            }
        }
    }

    // Summary table
    println!("\n{}", "=".repeat(60));
    println!(
        "{:<28} {:>10} {:>8} {:>8} {:>4} {:>10}",
        "Scenario", "SEF", "κ", "ρ", "Q", "Fit"
    );
    println!("{}", "-".repeat(60));
    for (name, r) in &done {
        let sef = if r.sef.sef.is_finite() {
            format!("{:.4}", r.sef.sef)
        } else {
            "∞".to_string()
        };
        println!(
            "{:<28} {:>10} {:>8.3} {:>8.3} {:>4} {:>10}",
            name, sef, r.estimate.kappa, r.sef.rho, r.quadrant, r.applicability.fit
        );
    }
    for (name, _) in &failed {
        println!("{:<28} {:>10}", name, "failed");
    }

    if let Some(dir) = output_dir {
        write_outputs(Path::new(dir), &text, &done, &failed)?;
        println!("\n📄 Results saved to: {dir}");
    }

    if failed.is_empty() {
        Ok(())
    } else {
        Err(SefError::Config(format!(
            "{} of {} scenario(s) failed",
            failed.len(),
            file.scenarios.len()
        )))
    }
}

fn write_outputs(
    dir: &Path,
    text: &str,
    done: &[(String, ValidationReport)],
    failed: &[(String, SefError)],
) -> Result<()> {
    std::fs::create_dir_all(dir).map_err(|e| SefError::io(dir, e))?;
    write_text(dir.join("report.txt"), text)?;
    summary_table(done.iter().map(|(n, r)| (n.as_str(), r)))?
        .write_csv_path(dir.join("summary.csv"))?;

    let mut results = Vec::new();
    for (name, report) in done {
        results.push(serde_json::json!({ "name": name, "report": report }));
    }
    for (name, err) in failed {
        results.push(serde_json::json!({ "name": name, "error": err.to_string() }));
    }
    write_json(dir.join("results.json"), &results)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dataset(dir: &Path) {
        let mut csv = String::from("school,district,score\n");
        for i in 0..15 {
            let w = ((i * 4) % 9) as f64;
            csv.push_str(&format!("n{i},north,{}\n", 500.0 + 10.0 * w));
            csv.push_str(&format!("s{i},south,{}\n", 480.0 + 14.0 * w));
        }
        std::fs::write(dir.join("schools.csv"), csv).unwrap();
    }

    #[test]
    fn test_batch_writes_outputs() {
        let dir = tempfile::tempdir().unwrap();
        dataset(dir.path());
        let scenarios = dir.path().join("s.json");
        std::fs::write(
            &scenarios,
            r#"{"scenarios": [{"name": "districts", "dataset": "schools.csv",
                "group_column": "district", "measurement": "score"}]}"#,
        )
        .unwrap();
        let out = dir.path().join("out");
        run(scenarios.to_str().unwrap(), out.to_str()).unwrap();
        assert!(out.join("report.txt").exists());
        let summary = ObservationTable::from_csv_path(out.join("summary.csv")).unwrap();
        assert_eq!(summary.len(), 1);
        assert_eq!(summary.rows()[0][0], "districts");
    }

    #[test]
    fn test_failed_scenario_does_not_stop_the_rest() {
        let dir = tempfile::tempdir().unwrap();
        dataset(dir.path());
        let scenarios = dir.path().join("s.json");
        std::fs::write(
            &scenarios,
            r#"{"scenarios": [
                {"name": "gone", "dataset": "absent.csv",
                 "group_column": "district", "measurement": "score"},
                {"name": "districts", "dataset": "schools.csv",
                 "group_column": "district", "measurement": "score"}
            ]}"#,
        )
        .unwrap();
        let out = dir.path().join("out");
        let err = run(scenarios.to_str().unwrap(), out.to_str()).unwrap_err();
        assert!(err.to_string().contains("1 of 2"));
        let results: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(out.join("results.json")).unwrap())
                .unwrap();
        assert_eq!(results.as_array().unwrap().len(), 2);
        assert_eq!(results[0]["name"], "districts");
        assert!(results[1]["error"].is_string());
    }
}
