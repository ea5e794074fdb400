use axum::{
    Json,
    extract::{Multipart, Query, State},
    http::Uri,
    response::Html,
};
use std::sync::Arc;

use super::dto::*;
use super::error::ApiError;
use super::state::AppState;
use crate::analysis::{self, LlmError};
use crate::extraction::{self, extract_formulations, extract_metrics};
use crate::search::clamp_top_k;

/// Documents retrieved for the research part of an analysis
const RESEARCH_HITS: usize = 3;
const MAX_HISTORY_LIMIT: usize = 100;

const INDEX_HTML: &str = include_str!("index.html");

/// GET / - Single-page UI
pub async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

/// GET /health - Health check
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// GET /api/status - Knowledge base statistics
pub async fn status(State(state): State<Arc<AppState>>) -> Result<Json<StatusResponse>, ApiError> {
    let (knowledge, papers) = {
        let kb = state.kb.lock().await;
        (kb.statistics()?, kb.papers()?)
    };

    Ok(Json(StatusResponse {
        knowledge,
        papers,
        ai_backend: state.llm.as_ref().map(|c| c.model().to_string()),
        version: env!("CARGO_PKG_VERSION"),
    }))
}

/// POST /api/papers - Upload and ingest papers
pub async fn upload_papers(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, ApiError> {
    let mut files = Vec::new();
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("Invalid upload: {}", e)))?
    {
        let Some(file_name) = field.file_name().map(String::from) else {
            continue;
        };
        let bytes = field
            .bytes()
            .await
            .map_err(|e| ApiError::BadRequest(format!("Failed to read {}: {}", file_name, e)))?;
        files.push((file_name, bytes));
    }

    if files.is_empty() {
        return Err(ApiError::BadRequest("No files uploaded".into()));
    }
    tracing::info!(files = files.len(), "papers uploaded");

    // PDF parsing is CPU-bound; keep it off the async workers
    let retrieval = state.config.retrieval.clone();
    let results = tokio::task::spawn_blocking(move || {
        files
            .into_iter()
            .map(|(name, bytes)| {
                let result = extraction::process_bytes(
                    &name,
                    &bytes,
                    retrieval.chunk_size,
                    retrieval.chunk_overlap,
                );
                (name, result)
            })
            .collect::<Vec<_>>()
    })
    .await?;

    let mut response = UploadResponse::default();
    let mut uploaded = Vec::new();
    let mut papers = Vec::new();
    for (file_name, result) in results {
        match result {
            Ok(paper) => {
                uploaded.push(file_name);
                papers.push(paper);
            }
            Err(e) => {
                tracing::warn!(file = %file_name, error = %e, "paper rejected");
                response.failed.push(FailedFile {
                    file_name,
                    error: e.to_string(),
                });
            }
        }
    }

    extraction::disambiguate_names(&mut papers);
    let mut documents = Vec::new();
    for (file_name, paper) in uploaded.into_iter().zip(papers) {
        response.processed.push(ProcessedFile {
            file_name,
            stored_as: paper.file_name,
            title: paper.metadata.title,
            documents: paper.documents.len(),
        });
        documents.extend(paper.documents);
    }

    let mut kb = state.kb.lock().await;
    response.documents_added = kb.build_from_documents(documents)?;
    response.status = Some(kb.statistics()?);

    Ok(Json(response))
}

/// POST /api/examples - Load the bundled example documents
pub async fn load_examples(
    State(state): State<Arc<AppState>>,
) -> Result<Json<KnowledgeResponse>, ApiError> {
    let mut kb = state.kb.lock().await;
    let added = kb.load_examples()?;

    Ok(Json(KnowledgeResponse {
        message: format!("Loaded {} example documents", added),
        status: kb.statistics()?,
    }))
}

/// DELETE /api/knowledge - Remove all documents and history
pub async fn clear_knowledge(
    State(state): State<Arc<AppState>>,
) -> Result<Json<KnowledgeResponse>, ApiError> {
    let mut kb = state.kb.lock().await;
    kb.clear()?;

    Ok(Json(KnowledgeResponse {
        message: "Knowledge base cleared".into(),
        status: kb.statistics()?,
    }))
}

/// POST /api/search - Search the literature
pub async fn search(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SearchRequest>,
) -> Result<Json<SearchResponse>, ApiError> {
    let query = req.query.trim();
    if query.is_empty() {
        return Err(ApiError::BadRequest("Query cannot be empty".into()));
    }

    let top_k = clamp_top_k(req.top_k.unwrap_or(state.config.retrieval.top_k));

    let hits = {
        let kb = state.kb.lock().await;
        kb.search(query, top_k)?
    };
    tracing::info!(query, top_k, hits = hits.len(), "search");

    let threshold = state.config.retrieval.similarity_threshold;
    let hits: Vec<HitInfo> = hits.iter().map(|h| HitInfo::from_hit(h, threshold)).collect();
    let count = hits.len();

    Ok(Json(SearchResponse {
        query: query.to_string(),
        hits,
        count,
    }))
}

/// POST /api/analyze - Comprehensive formulation analysis
pub async fn analyze(
    State(state): State<Arc<AppState>>,
    Json(req): Json<AnalyzeRequest>,
) -> Result<Json<AnalyzeResponse>, ApiError> {
    let formulation = req.formulation.trim();
    if formulation.is_empty() {
        return Err(ApiError::BadRequest("Formulation cannot be empty".into()));
    }

    // Research is skipped, not an error, while the knowledge base is empty
    let hits = if req.include_research {
        let kb = state.kb.lock().await;
        if kb.is_ready() {
            kb.search(formulation, RESEARCH_HITS)?
        } else {
            Vec::new()
        }
    } else {
        Vec::new()
    };

    let mut analysis = analysis::comprehensive_analysis(formulation, Some(hits.as_slice()))?;

    // LLM call runs without any lock
    let mut llm_error = None;
    if req.use_llm {
        let result = match &state.llm {
            Some(client) => {
                client
                    .recommend(formulation, &analysis.formulation_analysis, &hits)
                    .await
            }
            None => Err(LlmError::NotConfigured),
        };
        match result {
            Ok(narrative) => analysis.narrative = Some(narrative),
            Err(e) => {
                tracing::warn!(error = %e, "AI recommendation unavailable");
                llm_error = Some(e.to_string());
            }
        }
    }

    {
        let kb = state.kb.lock().await;
        kb.record_analysis(formulation, &analysis.timestamp, &analysis)?;
    }

    let threshold = state.config.retrieval.similarity_threshold;
    Ok(Json(AnalyzeResponse {
        analysis,
        related: hits.iter().map(|h| HitInfo::from_hit(h, threshold)).collect(),
        llm_error,
    }))
}

/// POST /api/analyze/batch - Analyze several formulations
pub async fn analyze_batch(Json(req): Json<BatchRequest>) -> Result<Json<BatchResponse>, ApiError> {
    if req.formulations.iter().all(|f| f.trim().is_empty()) {
        return Err(ApiError::BadRequest("No formulations given".into()));
    }

    let results = analysis::batch_analyze(&req.formulations);
    let count = results.len();
    Ok(Json(BatchResponse { results, count }))
}

/// POST /api/extract - Pull formulations and metrics out of free text
pub async fn extract(Json(req): Json<ExtractRequest>) -> Result<Json<ExtractResponse>, ApiError> {
    if req.text.trim().is_empty() {
        return Err(ApiError::BadRequest("Text cannot be empty".into()));
    }

    Ok(Json(ExtractResponse {
        formulations: extract_formulations(&req.text),
        metrics: extract_metrics(&req.text),
    }))
}

/// GET /api/history - Recent analyses, newest first
pub async fn history(
    State(state): State<Arc<AppState>>,
    Query(query): Query<HistoryQuery>,
) -> Result<Json<HistoryResponse>, ApiError> {
    let limit = query
        .limit
        .unwrap_or(DEFAULT_HISTORY_LIMIT)
        .clamp(1, MAX_HISTORY_LIMIT);

    let analyses = {
        let kb = state.kb.lock().await;
        kb.history(limit)?
    };
    let count = analyses.len();

    Ok(Json(HistoryResponse { analyses, count }))
}

pub async fn not_found(uri: Uri) -> ApiError {
    ApiError::NotFound(format!("No route for {}", uri.path()))
}
