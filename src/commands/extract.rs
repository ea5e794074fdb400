//! Extract command - Show what ingestion would pull out of a paper

use std::path::Path;

use anyhow::Result;
use colored::*;
use serde::Serialize;

use electrolyte_assistant::core::paper::{PaperMetadata, Section};
use electrolyte_assistant::extraction::{process_paper, Formulation, PerformanceMetrics};

use super::output;
use super::Workspace;

#[derive(Serialize)]
struct ExtractionJson {
    file_name: String,
    metadata: PaperMetadata,
    sections: Vec<SectionJson>,
}

#[derive(Serialize)]
struct SectionJson {
    section: Section,
    words: usize,
    formulations: Vec<Formulation>,
    metrics: PerformanceMetrics,
}

pub fn run(workspace: &Workspace, file: &Path, json: bool) -> Result<()> {
    let retrieval = &workspace.config.retrieval;
    let paper = process_paper(file, retrieval.chunk_size, retrieval.chunk_overlap)?;

    // Whole sections, not chunks, so each value is reported once
    let sections: Vec<SectionJson> = paper
        .sections
        .iter()
        .map(|(section, text)| SectionJson {
            section: section.clone(),
            words: text.split_whitespace().count(),
            formulations: electrolyte_assistant::extract_formulations(text),
            metrics: electrolyte_assistant::extract_metrics(text),
        })
        .collect();

    let result = ExtractionJson {
        file_name: paper.file_name,
        metadata: paper.metadata,
        sections,
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(());
    }

    output::header("Paper Extraction");
    println!("File:     {}", result.file_name.cyan());
    println!("Title:    {}", result.metadata.title.bold());
    println!("Authors:  {}", result.metadata.authors.join(", "));
    println!("Pages:    {}", result.metadata.page_count);
    if !result.metadata.abstract_text.is_empty() {
        println!("Abstract: {}", output::truncate(&result.metadata.abstract_text, 200).dimmed());
    }

    for section in &result.sections {
        output::subheader(&format!("{} ({} words)", section.section, section.words));
        if section.formulations.is_empty() && section.metrics.is_empty() {
            println!("   {}", "nothing extracted".dimmed());
            continue;
        }
        output::formulations(&section.formulations);
        output::metrics(&section.metrics);
    }
    println!();

    Ok(())
}
