use anyhow::Result;
use colored::*;
use serde::Serialize;

use electrolyte_assistant::search::{AnalysisRecord, KnowledgeBaseStats};

use super::output;
use super::Workspace;

const RECENT_ANALYSES: usize = 5;

#[derive(Serialize)]
struct AssistantStatus {
    database: String,
    knowledge_base: KnowledgeBaseStats,
    papers: Vec<String>,
    recent_analyses: Vec<AnalysisRecord>,
    ai_backend: Option<String>,
    server: String,
}

pub fn run(workspace: &Workspace, json: bool) -> Result<()> {
    let kb = workspace.open_knowledge_base()?;
    let config = &workspace.config;

    let status = AssistantStatus {
        database: config.database_path(&workspace.paths).display().to_string(),
        knowledge_base: kb.statistics()?,
        papers: kb.papers()?,
        recent_analyses: kb.history(RECENT_ANALYSES)?,
        ai_backend: config
            .llm
            .endpoint
            .as_ref()
            .map(|e| format!("{} ({})", config.llm.model, e)),
        server: config.server.bind_addr(),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&status)?);
    } else {
        print_status(&status);
    }

    Ok(())
}

fn print_status(status: &AssistantStatus) {
    output::header("Electrolyte Assistant Status");
    println!("Database: {}", status.database.dimmed());

    output::subheader("Knowledge base");
    output::knowledge_stats(&status.knowledge_base);

    if !status.papers.is_empty() {
        output::subheader("Papers");
        for paper in &status.papers {
            println!("   {}", paper);
        }
    }

    if !status.recent_analyses.is_empty() {
        output::subheader("Recent analyses");
        for record in &status.recent_analyses {
            println!(
                "   {} {}",
                record.created_at.dimmed(),
                output::truncate(&record.formulation, 60)
            );
        }
    }

    output::subheader("Services");
    println!(
        "   {:<16} {}",
        "AI backend",
        status
            .ai_backend
            .as_deref()
            .map(|b| b.green())
            .unwrap_or_else(|| "not configured".yellow())
    );
    println!("   {:<16} {}", "Web UI", status.server);
    println!();
}
