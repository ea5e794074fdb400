//! Analyze command - Comprehensive formulation analysis

use anyhow::Result;
use colored::*;

use electrolyte_assistant::analysis::{comprehensive_analysis, ComprehensiveAnalysis, LlmClient};
use electrolyte_assistant::search::SearchHit;

use super::output;
use super::Workspace;

/// Documents retrieved for the research part of an analysis
const RESEARCH_HITS: usize = 3;

pub fn run(workspace: &Workspace, formulation: &str, research: bool, llm: bool, json: bool) -> Result<()> {
    let kb = workspace.open_knowledge_base()?;

    let hits = if research && kb.is_ready() {
        kb.search(formulation.trim(), RESEARCH_HITS)?
    } else {
        if research && !json {
            println!(
                "{} Knowledge base is empty; analyzing without literature.",
                "!".yellow().bold()
            );
        }
        Vec::new()
    };

    let mut analysis = comprehensive_analysis(formulation, Some(hits.as_slice()))?;

    if llm {
        let client = LlmClient::from_config(&workspace.config.llm)?
            .ok_or_else(|| anyhow::anyhow!("AI backend is not configured (set llm.endpoint)"))?;
        if !json {
            println!("{} Asking {} for recommendations...", "→".dimmed(), client.model());
        }
        let runtime = tokio::runtime::Runtime::new()?;
        let narrative = runtime.block_on(client.recommend(
            &analysis.formulation,
            &analysis.formulation_analysis,
            &hits,
        ))?;
        analysis.narrative = Some(narrative);
    }

    kb.record_analysis(&analysis.formulation, &analysis.timestamp, &analysis)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&analysis)?);
    } else {
        print_analysis(&analysis, &hits);
    }

    Ok(())
}

fn print_analysis(analysis: &ComprehensiveAnalysis, hits: &[SearchHit]) {
    output::header("Formulation Analysis");
    println!("Formulation: {}", analysis.formulation.cyan());
    println!("Analyzed at: {}", analysis.timestamp);

    output::formulation_analysis(&analysis.formulation_analysis);

    output::subheader("Recommendations");
    let rec = &analysis.recommendations;
    if !rec.immediate_actions.is_empty() {
        println!("   {}", "Immediate actions".bold());
        output::bullets(&rec.immediate_actions);
    }
    println!("   {}", "Performance optimizations".bold());
    output::bullets(&rec.performance_optimizations);
    if !rec.research_directions.is_empty() {
        println!("   {}", "Research directions".bold());
        output::bullets(&rec.research_directions);
    }

    if let Some(insights) = &analysis.research_insights {
        output::subheader("Literature insights");
        output::bullets(&insights.key_findings);
        for trend in &insights.trends {
            println!("   {} {}", "↗".cyan(), trend);
        }
        for b in &insights.benchmarks {
            println!(
                "   {:<22} avg {:.2}  min {}  max {}  (n={})",
                b.metric.as_str(),
                b.average,
                b.min,
                b.max,
                b.count
            );
        }
        for f in &insights.common_formulations {
            println!("   {} x{}", f.formulation, f.frequency);
        }
        println!();
        println!("   {}", "Related documents".bold());
        for hit in hits {
            println!(
                "   • {} {}",
                hit.document.metadata.title,
                format!("({:.3})", hit.similarity).dimmed()
            );
        }
    }

    if let Some(narrative) = &analysis.narrative {
        output::subheader("AI recommendations");
        println!("{}", narrative);
    }

    println!();
    println!("{}", "=".repeat(60));
}
