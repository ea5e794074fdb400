//! Search command - Retrieve related literature

use anyhow::Result;
use colored::*;
use serde::Serialize;

use electrolyte_assistant::search::{clamp_top_k, SearchHit};

use super::output;
use super::Workspace;

#[derive(Serialize)]
struct SearchResultJson<'a> {
    query: &'a str,
    hits: &'a [SearchHit],
}

pub fn run(workspace: &Workspace, query: &str, top_k: Option<usize>, json: bool) -> Result<()> {
    let query = query.trim();
    if query.is_empty() {
        anyhow::bail!("Query cannot be empty");
    }

    let kb = workspace.open_knowledge_base()?;
    if !kb.is_ready() {
        if json {
            println!("{}", serde_json::json!({ "error": "Knowledge base is empty" }));
        } else {
            println!(
                "{} Knowledge base is empty. Run {} or {} first.",
                "!".yellow().bold(),
                "electrolyte ingest <papers>".cyan(),
                "electrolyte examples".cyan()
            );
        }
        std::process::exit(1);
    }

    let top_k = clamp_top_k(top_k.unwrap_or(workspace.config.retrieval.top_k));
    let hits = kb.search(query, top_k)?;

    if json {
        let result = SearchResultJson { query, hits: &hits };
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(());
    }

    output::header("Search Results");
    println!("Query: \"{}\"", query);
    println!("Found: {} documents", hits.len());
    println!();

    if hits.is_empty() {
        println!("{}", "No relevant documents found.".yellow());
        return Ok(());
    }

    let threshold = workspace.config.retrieval.similarity_threshold;
    for (i, hit) in hits.iter().enumerate() {
        let meta = &hit.document.metadata;
        let score = format!("{:.3}", hit.similarity);
        let score = if hit.similarity >= threshold {
            score.green().bold()
        } else {
            score.normal()
        };
        println!("{}. {} [{}]", i + 1, meta.title.cyan(), score);
        println!("   {} / {}", meta.file_name.dimmed(), meta.section);
        println!("   {}", output::truncate(&hit.document.content, 160).dimmed());
        if !meta.formulations.is_empty() {
            output::formulations(&meta.formulations);
        }
        output::metrics(&meta.metrics);
        println!();
    }

    Ok(())
}
