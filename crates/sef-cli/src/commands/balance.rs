use sef_core::balance::assess;
use sef_core::{GroupSpec, Result, bootstrap_balance};

pub struct BalanceCommandConfig<'a> {
    pub csv_path: &'a str,
    pub group_column: &'a str,
    pub class_a: &'a str,
    pub class_b: &'a str,
    pub measurement: Option<&'a str>,
    pub seed: u64,
    pub output_path: Option<&'a str>,
}

pub fn run(cfg: BalanceCommandConfig) -> Result<()> {
    let table = super::load_table(cfg.csv_path)?;
    let spec = GroupSpec::new(cfg.group_column, cfg.class_a, cfg.class_b);
    let a = assess(&table, &spec, cfg.measurement)?;

    println!("\nClass balance on '{}':", spec.column);
    println!("  {}: {} row(s)", spec.label_a, a.rows_a);
    println!("  {}: {} row(s)", spec.label_b, a.rows_b);
    println!("  sample ratio: {:.2}:1", a.sample_ratio);
    if let Some(k) = a.variance_ratio {
        println!("  variance ratio: {k:.4}");
    }
    if a.needs_balancing() {
        println!("  Bootstrap balancing recommended:");
        for reason in &a.reasons {
            println!("    - {reason}");
        }
    } else {
        println!("  Classes are reasonably balanced");
    }

    if let Some(path) = cfg.output_path {
        let balanced = bootstrap_balance(&table, &spec, cfg.seed)?;
        balanced.write_csv_path(path)?;
        println!(
            "\n📄 Balanced dataset ({} rows, seed {}) saved to: {path}",
            balanced.len(),
            cfg.seed
        );
    }
    Ok(())
}
