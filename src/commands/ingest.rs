//! Ingest command - Add papers to the knowledge base

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use colored::*;
use serde::Serialize;
use walkdir::WalkDir;

use electrolyte_assistant::extraction::{disambiguate_names, process_paper};
use electrolyte_assistant::search::KnowledgeBaseStats;

use super::Workspace;

#[derive(Serialize)]
struct IngestReport {
    processed: Vec<PaperReport>,
    failed: Vec<FailureReport>,
    documents_added: usize,
    replaced: bool,
    duration_ms: u128,
    knowledge_base: KnowledgeBaseStats,
}

#[derive(Serialize)]
struct PaperReport {
    path: String,
    /// Name the paper is stored under
    name: String,
    title: String,
    sections: usize,
    documents: usize,
    formulations: usize,
}

#[derive(Serialize)]
struct FailureReport {
    path: String,
    error: String,
}

pub fn run(workspace: &Workspace, inputs: &[String], replace: bool, json: bool) -> Result<()> {
    let start = Instant::now();
    let files = collect_inputs(inputs)?;
    if files.is_empty() {
        anyhow::bail!("No papers found in {}", inputs.join(", "));
    }

    if !json {
        println!("{} Processing {} papers...", "→".dimmed(), files.len());
    }

    let retrieval = &workspace.config.retrieval;
    let mut papers = Vec::new();
    let mut failed = Vec::new();

    for path in &files {
        match process_paper(path, retrieval.chunk_size, retrieval.chunk_overlap) {
            Ok(paper) => papers.push((path, paper)),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "paper rejected");
                failed.push(FailureReport {
                    path: path.display().to_string(),
                    error: e.to_string(),
                });
            }
        }
    }

    let (paths, mut papers): (Vec<&PathBuf>, Vec<_>) = papers.into_iter().unzip();
    disambiguate_names(&mut papers);

    let mut processed = Vec::new();
    let mut documents = Vec::new();
    for (path, paper) in paths.into_iter().zip(papers) {
        let formulations = paper
            .documents
            .iter()
            .map(|d| d.metadata.formulations.len())
            .sum();
        processed.push(PaperReport {
            path: path.display().to_string(),
            name: paper.file_name.clone(),
            title: paper.metadata.title.clone(),
            sections: paper.sections.len(),
            documents: paper.documents.len(),
            formulations,
        });
        documents.extend(paper.documents);
    }

    let mut kb = workspace.open_knowledge_base()?;
    let documents_added = if replace && !documents.is_empty() {
        kb.replace_documents(documents)?
    } else {
        kb.build_from_documents(documents)?
    };

    let report = IngestReport {
        processed,
        failed,
        documents_added,
        replaced: replace && documents_added > 0,
        duration_ms: start.elapsed().as_millis(),
        knowledge_base: kb.statistics()?,
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }

    if report.processed.is_empty() {
        std::process::exit(1);
    }

    Ok(())
}

/// Expand files, directories (recursively, `.pdf` only) and glob patterns.
fn collect_inputs(inputs: &[String]) -> Result<Vec<PathBuf>> {
    let mut files = BTreeSet::new();

    for input in inputs {
        let path = Path::new(input);
        if path.is_dir() {
            for entry in WalkDir::new(path).into_iter().filter_map(|e| e.ok()) {
                if entry.file_type().is_file() && is_pdf(entry.path()) {
                    files.insert(entry.path().to_path_buf());
                }
            }
        } else if input.contains(['*', '?', '[']) {
            let matches = glob::glob(input).with_context(|| format!("Invalid pattern: {}", input))?;
            for path in matches.filter_map(|p| p.ok()) {
                if path.is_file() {
                    files.insert(path);
                }
            }
        } else {
            // Missing files are reported per paper by the extractor
            files.insert(path.to_path_buf());
        }
    }

    Ok(files.into_iter().collect())
}

fn is_pdf(path: &Path) -> bool {
    path.extension()
        .map(|ext| ext.eq_ignore_ascii_case("pdf"))
        .unwrap_or(false)
}

fn print_report(report: &IngestReport) {
    println!();
    for paper in &report.processed {
        println!(
            "{} {} {}",
            "✓".green().bold(),
            paper.path.cyan(),
            format!(
                "({} sections, {} documents, {} formulations)",
                paper.sections, paper.documents, paper.formulations
            )
            .dimmed()
        );
        println!("  {}", paper.title);
        if !paper.path.ends_with(&paper.name) {
            println!("  {} stored as {}", "→".dimmed(), paper.name.yellow());
        }
    }
    for failure in &report.failed {
        println!("{} {}: {}", "✗".red().bold(), failure.path, failure.error.red());
    }

    println!();
    println!(
        "{} Added {} documents from {} papers in {:.2}s{}",
        "→".dimmed(),
        report.documents_added.to_string().cyan(),
        report.processed.len(),
        report.duration_ms as f64 / 1000.0,
        if report.replaced { " (knowledge base replaced)" } else { "" }
    );
    println!(
        "  {} Knowledge base: {} documents, {} papers",
        "→".dimmed(),
        report.knowledge_base.document_count,
        report.knowledge_base.paper_count
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collect_inputs_walks_directories() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("2024");
        std::fs::create_dir_all(&nested).unwrap();
        std::fs::write(dir.path().join("a.pdf"), b"").unwrap();
        std::fs::write(nested.join("b.PDF"), b"").unwrap();
        std::fs::write(nested.join("notes.txt"), b"").unwrap();

        let files = collect_inputs(&[dir.path().display().to_string()]).unwrap();
        assert_eq!(files.len(), 2);
        assert!(files.iter().all(|f| is_pdf(f)));
    }

    #[test]
    fn test_collect_inputs_glob_and_explicit() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("x.txt"), b"").unwrap();
        std::fs::write(dir.path().join("y.txt"), b"").unwrap();

        let pattern = format!("{}/*.txt", dir.path().display());
        let explicit = dir.path().join("x.txt").display().to_string();
        let files = collect_inputs(&[pattern, explicit]).unwrap();
        assert_eq!(files.len(), 2, "duplicates collapse");
    }
}
