use sef_core::report::{render_text, summary_table, write_json, write_text};
use sef_core::{
    CorrelationSource, QuadrantThresholds, Result, SefError, ValidationConfig, ValidationReport,
    validate,
};

pub struct AnalyzeCommandConfig<'a> {
    pub csv_path: &'a str,
    pub group_column: &'a str,
    pub class_a: Option<&'a str>,
    pub class_b: Option<&'a str>,
    pub measurements: Vec<String>,
    pub rho: Option<f64>,
    pub paired: bool,
    pub min_samples: usize,
    pub alpha: f64,
    pub log_transform: bool,
    pub delta_threshold: f64,
    pub kappa_threshold: f64,
    pub output_path: Option<&'a str>,
    pub csv_path_out: Option<&'a str>,
    pub json_path: Option<&'a str>,
}

impl AnalyzeCommandConfig<'_> {
    fn correlation(&self) -> CorrelationSource {
        match (self.paired, self.rho) {
            (true, _) => CorrelationSource::Paired,
            (false, Some(r)) => CorrelationSource::Assumed(r),
            (false, None) => CorrelationSource::default(),
        }
    }
}

pub fn run(cfg: AnalyzeCommandConfig) -> Result<()> {
    if cfg.measurements.is_empty() {
        return Err(SefError::Config(
            "--measurement names no column".to_string(),
        ));
    }
    let table = super::load_table(cfg.csv_path)?;
    let groups = super::resolve_groups(&table, cfg.group_column, cfg.class_a, cfg.class_b)?;

    let mut reports: Vec<ValidationReport> = Vec::new();
    let mut text = String::new();
    let mut first_error = None;

    for measurement in &cfg.measurements {
        let mut config = ValidationConfig::new(groups.clone(), measurement);
        config.correlation = cfg.correlation();
        config.min_samples = cfg.min_samples;
        config.alpha = cfg.alpha;
        config.log_transform = cfg.log_transform;
        config.thresholds = QuadrantThresholds {
            delta: cfg.delta_threshold,
            kappa: cfg.kappa_threshold,
        };

        println!("\n{}", "=".repeat(60));
        println!("MEASUREMENT: {measurement}");
        println!("{}", "=".repeat(60));
        match validate(&table, &config) {
            Ok(report) => {
                let rendered = render_text(&report);
                print!("{rendered}");
                text.push_str(&rendered);
                text.push('\n');
                reports.push(report);
            }
            Err(e) => {
                eprintln!("✗ {measurement}: {e}");
                first_error.get_or_insert(e);
            }
        }
    }

    if let Some(path) = cfg.output_path {
        write_text(path, &text)?;
        println!("\n📄 Report saved to: {path}");
    }
    if let Some(path) = cfg.csv_path_out {
        let summary = summary_table(reports.iter().map(|r| (r.measurement.as_str(), r)))?;
        summary.write_csv_path(path)?;
        println!("📄 Summary saved to: {path}");
    }
    if let Some(path) = cfg.json_path {
        write_json(path, &reports)?;
        println!("📄 JSON saved to: {path}");
    }

    match first_error {
        Some(e) => Err(e),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Writes a small two-sector dataset and returns (csv path, json path).
    fn fixture(dir: &std::path::Path) -> (String, String) {
        let mut csv = String::from("org,sector,score\n");
        for i in 0..20 {
            let w = ((i * 3) % 7) as f64;
            csv.push_str(&format!("a{i},public,{}\n", 70.0 + w));
            csv.push_str(&format!("b{i},private,{}\n", 65.0 + 2.0 * w));
        }
        let data = dir.join("orgs.csv");
        std::fs::write(&data, csv).unwrap();
        (
            data.to_str().unwrap().to_string(),
            dir.join("out.json").to_str().unwrap().to_string(),
        )
    }

    fn base<'a>(data: &'a str, json: &'a str, measurements: &[&str]) -> AnalyzeCommandConfig<'a> {
        AnalyzeCommandConfig {
            csv_path: data,
            group_column: "sector",
            class_a: None,
            class_b: None,
            measurements: measurements.iter().map(|m| m.to_string()).collect(),
            rho: Some(0.1),
            paired: false,
            min_samples: 10,
            alpha: 0.05,
            log_transform: false,
            delta_threshold: 0.5,
            kappa_threshold: 1.0,
            output_path: None,
            csv_path_out: None,
            json_path: Some(json),
        }
    }

    fn read_json(path: &str) -> serde_json::Value {
        serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap()
    }

    #[test]
    fn test_analyze_writes_json() {
        let dir = tempfile::tempdir().unwrap();
        let (data, json) = fixture(dir.path());
        run(base(&data, &json, &["score"])).unwrap();
        let value = read_json(&json);
        assert_eq!(value.as_array().unwrap().len(), 1);
        assert_eq!(value[0]["groups"]["label_a"], "public");
    }

    #[test]
    fn test_failing_measurement_still_writes_others() {
        let dir = tempfile::tempdir().unwrap();
        let (data, json) = fixture(dir.path());
        let err = run(base(&data, &json, &["score", "missing"])).unwrap_err();
        assert!(matches!(err, SefError::MissingColumn(_)));
        assert_eq!(read_json(&json).as_array().unwrap().len(), 1);
    }

    #[test]
    fn test_correlation_flags() {
        let mut cfg = base("x.csv", "x.json", &["score"]);
        assert_eq!(cfg.correlation(), CorrelationSource::Assumed(0.1));
        cfg.paired = true;
        assert_eq!(cfg.correlation(), CorrelationSource::Paired);
        cfg.paired = false;
        cfg.rho = None;
        assert_eq!(cfg.correlation(), CorrelationSource::Assumed(0.2));
    }
}
