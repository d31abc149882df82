use sef_core::Result;

pub fn run(csv_path: &str, group_column: Option<&str>) -> Result<()> {
    let table = super::load_table(csv_path)?;

    println!(
        "\n{:<30} {:>8} {:>8} {:>8}  Kind",
        "Column", "Numeric", "Missing", "Text"
    );
    println!("{}", "-".repeat(66));
    for p in table.profile() {
        println!(
            "{:<30} {:>8} {:>8} {:>8}  {}",
            p.name,
            p.numeric,
            p.missing,
            p.text,
            if p.is_numeric() { "measurement" } else { "label" }
        );
    }

    if let Some(column) = group_column {
        let labels = table.distinct_labels(column)?;
        println!("\nLabels in '{column}' ({} distinct):", labels.len());
        for l in &labels {
            println!("  {:<30} {:>6} row(s)", l.label, l.rows);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use sef_core::SefError;

    #[test]
    fn test_inspect() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("d.csv");
        std::fs::write(&path, "team,conf,pts\nA,E,1\nB,W,NA\n").unwrap();
        let path = path.to_str().unwrap();
        assert!(run(path, Some("conf")).is_ok());
        assert!(matches!(
            run(path, Some("division")),
            Err(SefError::MissingColumn(_))
        ));
    }
}
