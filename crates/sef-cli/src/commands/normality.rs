use sef_core::Result;

/// Run the normality battery on one column, optionally restricted to a group.
pub fn run(csv_path: &str, column: &str, group: Option<(&str, &str)>, alpha: f64) -> Result<()> {
    let table = super::load_table(csv_path)?;
    let table = match group {
        Some((group_column, label)) => table.filter_by_label(group_column, label)?,
        None => table,
    };
    let values = table.measurements(column)?;
    let report = sef_tests::check_normality(&values, alpha);

    match group {
        Some((_, label)) => {
            println!("\nNormality of '{column}' for '{label}' (n = {})", values.len())
        }
        None => println!("\nNormality of '{column}' (n = {})", values.len()),
    }
    println!("{}", "-".repeat(60));
    println!(
        "{:<22} {:>12} {:>10} {:>6}",
        "Test", "Statistic", "p-value", "Pass"
    );
    for t in &report.results {
        if t.ran {
            println!(
                "{:<22} {:>12.4} {:>10.4} {:>6}",
                t.name,
                t.statistic,
                t.p_value.unwrap_or(f64::NAN),
                if t.passed { "✓" } else { "✗" }
            );
        } else {
            println!("{:<22} {:>12} {:>10} {:>6}", t.name, "—", "—", "skip");
        }
    }
    println!("{}", "-".repeat(60));
    for t in report.results.iter().filter(|t| !t.details.is_empty()) {
        println!("  {}: {}", t.name, t.details);
    }
    println!(
        "\nApproximately normal at alpha = {}: {} ({} of {} tests ran)",
        report.alpha,
        if report.approximately_normal { "yes" } else { "no" },
        report.tests_run,
        report.results.len()
    );
    Ok(())
}
