//! Paper ingestion and data extraction
//!
//! - `pdf`: page text from PDF (or plain-text) files
//! - `sections`: section detection and first-page metadata
//! - `formulation`: salt / solvent / additive mentions
//! - `metrics`: Coulombic efficiency, conductivity, voltage window

pub mod formulation;
pub mod metrics;
pub mod pdf;
pub mod sections;

use std::collections::HashSet;
use std::path::Path;

use thiserror::Error;
use tracing::{debug, info};

use crate::core::paper::{Document, DocumentMetadata, PaperMetadata, Section};

pub use formulation::{extract_formulations, Formulation, PatternKind};
pub use metrics::{extract_metrics, PerformanceMetrics};

#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("Unable to read file: {0}")]
    ReadError(String),

    #[error("The PDF is password-protected")]
    PasswordProtected,

    #[error("The PDF appears to be corrupted")]
    CorruptedFile,

    #[error("Unsupported file type: {0}")]
    UnsupportedFormat(String),

    #[error("No extractable text in {0} (scanned or image-only PDF?)")]
    NoText(String),
}

/// A paper after ingestion: metadata plus its section documents.
#[derive(Debug, Clone)]
pub struct ProcessedPaper {
    pub file_name: String,
    pub metadata: PaperMetadata,
    pub sections: Vec<(Section, String)>,
    pub documents: Vec<Document>,
}

impl ProcessedPaper {
    /// Re-key the paper under `name`, rewriting its document ids.
    pub fn rename(&mut self, name: &str) {
        for doc in &mut self.documents {
            if let Some(rest) = doc.id.strip_prefix(self.file_name.as_str()) {
                doc.id = format!("{}{}", name, rest);
            }
            doc.metadata.file_name = name.to_string();
        }
        self.file_name = name.to_string();
    }
}

/// Give papers in one batch distinct names.
///
/// The first paper keeps its name; later papers with the same name become
/// `stem (2).ext`, `stem (3).ext`, and so on.
pub fn disambiguate_names(papers: &mut [ProcessedPaper]) {
    let original: HashSet<String> = papers.iter().map(|p| p.file_name.clone()).collect();
    let mut used: HashSet<String> = HashSet::new();

    for paper in papers.iter_mut() {
        if used.insert(paper.file_name.clone()) {
            continue;
        }
        let path = Path::new(&paper.file_name);
        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| paper.file_name.clone());
        let extension = path
            .extension()
            .map(|e| format!(".{}", e.to_string_lossy()))
            .unwrap_or_default();

        let mut n = 2;
        let name = loop {
            let candidate = format!("{} ({}){}", stem, n, extension);
            if !original.contains(&candidate) && !used.contains(&candidate) {
                break candidate;
            }
            n += 1;
        };
        debug!(from = %paper.file_name, to = %name, "renamed paper with duplicate name");
        paper.rename(&name);
        used.insert(name);
    }
}

/// Split text into word windows of `chunk_size` words sharing `overlap`
/// words. `chunk_size == 0` keeps the text whole.
pub fn chunk_words(text: &str, chunk_size: usize, overlap: usize) -> Vec<String> {
    let words: Vec<&str> = text.split_whitespace().collect();
    if chunk_size == 0 || words.len() <= chunk_size {
        return vec![text.trim().to_string()];
    }

    let step = chunk_size.saturating_sub(overlap).max(1);
    let mut chunks = Vec::new();
    let mut start = 0;
    while start < words.len() {
        let end = (start + chunk_size).min(words.len());
        chunks.push(words[start..end].join(" "));
        if end == words.len() {
            break;
        }
        start += step;
    }
    chunks
}

/// Read a paper from disk and turn it into section documents.
pub fn process_paper(
    path: &Path,
    chunk_size: usize,
    chunk_overlap: usize,
) -> Result<ProcessedPaper, ExtractionError> {
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string());

    info!(file = %file_name, "processing paper");
    let pages = pdf::extract_pages(path)?;
    process_pages(file_name, &pages, chunk_size, chunk_overlap)
}

/// Process an uploaded paper held in memory.
pub fn process_bytes(
    file_name: &str,
    bytes: &[u8],
    chunk_size: usize,
    chunk_overlap: usize,
) -> Result<ProcessedPaper, ExtractionError> {
    info!(file = %file_name, bytes = bytes.len(), "processing uploaded paper");
    let pages = pdf::extract_pages_from_upload(file_name, bytes)?;
    process_pages(file_name.to_string(), &pages, chunk_size, chunk_overlap)
}

fn process_pages(
    file_name: String,
    pages: &[String],
    chunk_size: usize,
    chunk_overlap: usize,
) -> Result<ProcessedPaper, ExtractionError> {
    let first_page = match pages.iter().find(|p| !p.trim().is_empty()) {
        Some(page) => page,
        None => return Err(ExtractionError::NoText(file_name)),
    };

    let metadata = sections::analyze_metadata(first_page, pages.len());
    let sections = sections::structure_pages(pages);
    debug!(file = %file_name, sections = sections.len(), "sections detected");

    let documents = build_documents(&file_name, &metadata, &sections, chunk_size, chunk_overlap);
    info!(
        file = %file_name,
        title = %metadata.title,
        sections = sections.len(),
        documents = documents.len(),
        "paper processed"
    );

    Ok(ProcessedPaper {
        file_name,
        metadata,
        sections,
        documents,
    })
}

/// One document per non-empty section chunk.
pub fn build_documents(
    file_name: &str,
    metadata: &PaperMetadata,
    sections: &[(Section, String)],
    chunk_size: usize,
    chunk_overlap: usize,
) -> Vec<Document> {
    let mut documents = Vec::new();
    for (section, content) in sections {
        if content.trim().is_empty() {
            continue;
        }
        for (i, chunk) in chunk_words(content, chunk_size, chunk_overlap).into_iter().enumerate() {
            documents.push(Document::new(
                Document::document_id(file_name, section, i),
                chunk,
                DocumentMetadata {
                    file_name: file_name.to_string(),
                    section: section.clone(),
                    title: metadata.title.clone(),
                    authors: metadata.authors.clone(),
                    formulations: Vec::new(),
                    metrics: PerformanceMetrics::default(),
                },
            ));
        }
    }
    documents
}
