//! Batch command - Analyze one formulation per line

use std::path::Path;

use anyhow::{Context, Result};
use colored::*;

use electrolyte_assistant::analysis::{batch_analyze, Overall};
use electrolyte_assistant::core::domain::Metric;

use super::output;

pub fn run(file: &Path, json: bool) -> Result<()> {
    let raw = std::fs::read_to_string(file)
        .with_context(|| format!("Failed to read {}", file.display()))?;
    let formulations = parse_lines(&raw);
    if formulations.is_empty() {
        anyhow::bail!("No formulations in {}", file.display());
    }

    let results = batch_analyze(&formulations);

    if json {
        println!("{}", serde_json::to_string_pretty(&results)?);
        return Ok(());
    }

    output::header("Batch Analysis");
    println!(
        "   {:<40} {:>8} {:>10} {:>6}",
        "Formulation", "CE (%)", "σ (mS/cm)", "Risks"
    );
    println!("   {}", "-".repeat(68));
    for entry in &results {
        let name = output::truncate(&entry.formulation, 40);
        match &entry.analysis {
            Some(analysis) => {
                let value = |m: Metric| {
                    analysis
                        .prediction(m)
                        .map(|p| format!("{:.1}", p.predicted_value))
                        .unwrap_or_else(|| "-".into())
                };
                let risks = analysis.risks.len().to_string();
                let risks = if analysis.compatibility.overall == Overall::Good {
                    risks.green()
                } else {
                    risks.yellow()
                };
                println!(
                    "   {:<40} {:>8} {:>10} {:>6}",
                    name,
                    value(Metric::CoulombicEfficiency),
                    value(Metric::IonicConductivity),
                    risks
                );
            }
            None => println!(
                "   {:<40} {}",
                name,
                entry.error.as_deref().unwrap_or("failed").red()
            ),
        }
    }
    println!();
    println!("{} formulations analyzed", results.len());

    Ok(())
}

/// Non-empty lines, `#` comments skipped.
fn parse_lines(raw: &str) -> Vec<&str> {
    raw.lines()
        .map(str::trim)
        .filter(|l| !l.is_empty() && !l.starts_with('#'))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_lines() {
        let raw = "# candidates\n1 M LiPF6 in EC/DMC\n\n  3 M LiTFSI in DME  \n";
        assert_eq!(parse_lines(raw), vec!["1 M LiPF6 in EC/DMC", "3 M LiTFSI in DME"]);
    }
}
