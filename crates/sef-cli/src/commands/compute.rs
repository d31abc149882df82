use sef_core::sef::sef_denominator;
use sef_core::{Result, SefAssessment, signal_enhancement_factor};

pub fn run(kappa: f64, rho: f64, json: bool) -> Result<()> {
    let sef = signal_enhancement_factor(kappa, rho)?;
    let denominator = sef_denominator(kappa, rho);
    let assessment = SefAssessment::from_sef(sef);

    if json {
        let value = serde_json::json!({
            "kappa": kappa,
            "rho": rho,
            "denominator": denominator,
            "sef": sef.is_finite().then_some(sef),
            "improvement_percent": sef.is_finite().then_some((sef - 1.0) * 100.0),
            "assessment": assessment,
        });
        println!("{}", sef_core::report::to_json(&value)?);
        return Ok(());
    }

    println!("SEF = (1 + κ) / (1 + κ − 2√κ·ρ)");
    println!("  κ = {kappa:.4}");
    println!("  ρ = {rho:.4}");
    println!("  denominator = {denominator:.6}");
    if sef.is_finite() {
        println!("  SEF = {sef:.4}");
        println!("  Improvement: {:.1}%", (sef - 1.0) * 100.0);
    } else {
        println!("  SEF = ∞");
    }
    println!("  Assessment: {assessment}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use sef_core::SefError;

    #[test]
    fn test_compute_valid() {
        assert!(run(40.0, 0.0, false).is_ok());
        assert!(run(1.0, 1.0, true).is_ok());
    }

    #[test]
    fn test_compute_rejects_bad_kappa() {
        assert!(matches!(
            run(-2.0, 0.0, false),
            Err(SefError::InvalidKappa(_))
        ));
    }
}
