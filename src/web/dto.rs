use serde::{Deserialize, Serialize};

use crate::analysis::{BatchEntry, ComprehensiveAnalysis};
use crate::core::paper::Section;
use crate::extraction::{Formulation, PerformanceMetrics};
use crate::search::{AnalysisRecord, KnowledgeBaseStats, SearchHit};

pub const DEFAULT_HISTORY_LIMIT: usize = 20;
const PREVIEW_CHARS: usize = 500;

/// POST /api/search request
#[derive(Debug, Deserialize)]
pub struct SearchRequest {
    pub query: String,
    #[serde(default)]
    pub top_k: Option<usize>,
}

/// POST /api/search response
#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub query: String,
    pub hits: Vec<HitInfo>,
    pub count: usize,
}

/// One retrieved document, as shown to the UI
#[derive(Debug, Serialize)]
pub struct HitInfo {
    pub id: String,
    pub title: String,
    pub file_name: String,
    pub section: Section,
    pub similarity: f64,
    /// Similarity at or above the configured threshold
    pub highly_relevant: bool,
    pub preview: String,
    pub formulations: Vec<Formulation>,
    pub metrics: PerformanceMetrics,
}

impl HitInfo {
    pub fn from_hit(hit: &SearchHit, threshold: f64) -> Self {
        let meta = &hit.document.metadata;
        Self {
            id: hit.document.id.clone(),
            title: meta.title.clone(),
            file_name: meta.file_name.clone(),
            section: meta.section.clone(),
            similarity: hit.similarity,
            highly_relevant: hit.similarity >= threshold,
            preview: preview(&hit.document.content),
            formulations: meta.formulations.clone(),
            metrics: meta.metrics.clone(),
        }
    }
}

fn preview(content: &str) -> String {
    if content.chars().count() <= PREVIEW_CHARS {
        return content.to_string();
    }
    let cut: String = content.chars().take(PREVIEW_CHARS).collect();
    format!("{}...", cut.trim_end())
}

/// POST /api/analyze request
#[derive(Debug, Deserialize)]
pub struct AnalyzeRequest {
    pub formulation: String,
    #[serde(default = "default_true")]
    pub include_research: bool,
    #[serde(default)]
    pub use_llm: bool,
}

fn default_true() -> bool {
    true
}

/// POST /api/analyze response
#[derive(Debug, Serialize)]
pub struct AnalyzeResponse {
    #[serde(flatten)]
    pub analysis: ComprehensiveAnalysis,
    /// Retrieved documents the research insights were drawn from
    pub related: Vec<HitInfo>,
    /// Why no AI narrative is present, when one was requested
    #[serde(skip_serializing_if = "Option::is_none")]
    pub llm_error: Option<String>,
}

/// POST /api/analyze/batch request
#[derive(Debug, Deserialize)]
pub struct BatchRequest {
    pub formulations: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct BatchResponse {
    pub results: Vec<BatchEntry>,
    pub count: usize,
}

/// POST /api/extract request
#[derive(Debug, Deserialize)]
pub struct ExtractRequest {
    pub text: String,
}

#[derive(Debug, Serialize)]
pub struct ExtractResponse {
    pub formulations: Vec<Formulation>,
    pub metrics: PerformanceMetrics,
}

/// GET /api/history query
#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct HistoryResponse {
    pub analyses: Vec<AnalysisRecord>,
    pub count: usize,
}

/// POST /api/papers response
#[derive(Debug, Default, Serialize)]
pub struct UploadResponse {
    pub processed: Vec<ProcessedFile>,
    pub failed: Vec<FailedFile>,
    pub documents_added: usize,
    pub status: Option<KnowledgeBaseStats>,
}

#[derive(Debug, Serialize)]
pub struct ProcessedFile {
    pub file_name: String,
    /// Differs from `file_name` when another upload in the batch had the same name
    pub stored_as: String,
    pub title: String,
    pub documents: usize,
}

#[derive(Debug, Serialize)]
pub struct FailedFile {
    pub file_name: String,
    pub error: String,
}

/// POST /api/examples and DELETE /api/knowledge response
#[derive(Debug, Serialize)]
pub struct KnowledgeResponse {
    pub message: String,
    pub status: KnowledgeBaseStats,
}

/// GET /api/status response
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    #[serde(flatten)]
    pub knowledge: KnowledgeBaseStats,
    pub papers: Vec<String>,
    pub ai_backend: Option<String>,
    pub version: &'static str,
}

/// GET /health response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::examples::example_documents;

    #[test]
    fn test_hit_info_threshold() {
        let document = example_documents().remove(0);
        let hit = SearchHit {
            document,
            similarity: 0.7,
        };
        assert!(HitInfo::from_hit(&hit, 0.7).highly_relevant);
        assert!(!HitInfo::from_hit(&hit, 0.8).highly_relevant);
        assert_eq!(HitInfo::from_hit(&hit, 0.7).metrics.coulombic_efficiency, Some(99.7));
    }

    #[test]
    fn test_preview_truncates_on_chars() {
        let long = "锂".repeat(600);
        let p = preview(&long);
        assert_eq!(p.chars().count(), PREVIEW_CHARS + 3);
        assert!(p.ends_with("..."));
        assert_eq!(preview("short"), "short");
    }

    #[test]
    fn test_analyze_request_defaults() {
        let req: AnalyzeRequest = serde_json::from_str(r#"{"formulation": "1 M LiPF6"}"#).unwrap();
        assert!(req.include_research);
        assert!(!req.use_llm);
    }
}
