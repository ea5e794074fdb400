//! Electrolyte MCP Server implementation

use anyhow::Result;
use rmcp::{
    model::{CallToolResult, Content, ServerCapabilities, ServerInfo},
    tool, tool_handler, tool_router,
    handler::server::{tool::ToolRouter, wrapper::Parameters},
    ErrorData as McpError, ServerHandler, ServiceExt,
};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::analysis::{comprehensive_analysis, ComprehensiveAnalysis};
use crate::core::config::AssistantConfig;
use crate::core::paths::AssistantPaths;
use crate::extraction::{extract_formulations, extract_metrics, Formulation, PerformanceMetrics};
use crate::search::{clamp_top_k, KnowledgeBase, KnowledgeBaseError, KnowledgeBaseStats};

const RESEARCH_HITS: usize = 3;

/// Parameters for electrolyte_search tool
#[derive(Debug, Deserialize, JsonSchema)]
pub struct SearchParams {
    /// Natural language query (e.g., "high-voltage additive for NCM cathodes")
    #[schemars(description = "Natural language search query")]
    pub query: String,
    /// Maximum number of results to return (default: 5)
    #[schemars(description = "Maximum number of results, 1-10 (default: 5)")]
    #[serde(default = "default_top_k")]
    pub top_k: usize,
}

fn default_top_k() -> usize {
    5
}

/// Parameters for electrolyte_analyze tool
#[derive(Debug, Deserialize, JsonSchema)]
pub struct AnalyzeParams {
    /// Formulation description (e.g., "1.2 M LiPF6 in EC/EMC (3:7) with 2% VC")
    #[schemars(description = "Electrolyte formulation description")]
    pub formulation: String,
    /// Compare against the knowledge base (default: true)
    #[schemars(description = "Include literature insights from the knowledge base (default: true)")]
    #[serde(default = "default_true")]
    pub include_research: bool,
}

fn default_true() -> bool {
    true
}

/// Parameters for electrolyte_extract tool
#[derive(Debug, Deserialize, JsonSchema)]
pub struct ExtractParams {
    /// Free text, e.g. an experimental section
    #[schemars(description = "Text to extract formulations and performance metrics from")]
    pub text: String,
}

/// Search result for JSON output
#[derive(Debug, Serialize)]
struct SearchResultJson {
    title: String,
    file_name: String,
    section: String,
    similarity: f64,
    excerpt: String,
    formulations: Vec<Formulation>,
    metrics: PerformanceMetrics,
}

#[derive(Debug, Serialize)]
struct ExtractResultJson {
    formulations: Vec<Formulation>,
    metrics: PerformanceMetrics,
}

#[derive(Debug, Serialize)]
struct StatusJson {
    knowledge_base: KnowledgeBaseStats,
    papers: Vec<String>,
}

/// Electrolyte MCP Service
#[derive(Clone)]
pub struct ElectrolyteService {
    db_path: PathBuf,
    min_score: f64,
    tool_router: ToolRouter<Self>,
}

impl ElectrolyteService {
    pub fn new(paths: &AssistantPaths, config: &AssistantConfig) -> Self {
        Self {
            db_path: config.database_path(paths),
            min_score: config.retrieval.min_score,
            tool_router: Self::tool_router(),
        }
    }

    // Opened per call so papers ingested from the CLI are picked up
    fn open_kb(&self) -> Result<KnowledgeBase, McpError> {
        KnowledgeBase::open(&self.db_path, self.min_score).map_err(|e| {
            McpError::internal_error(format!("Failed to open knowledge base: {}", e), None)
        })
    }

    fn search_json(&self, query: &str, top_k: usize) -> Result<Vec<SearchResultJson>, McpError> {
        let kb = self.open_kb()?;
        let top_k = clamp_top_k(top_k);
        let hits = kb.search(query, top_k).map_err(|e| match e {
            KnowledgeBaseError::NotReady => McpError::invalid_request(
                "Knowledge base is empty. Ingest papers with `electrolyte ingest` or load examples with `electrolyte examples`.",
                None,
            ),
            _ => McpError::internal_error(format!("Search failed: {}", e), None),
        })?;

        Ok(hits
            .into_iter()
            .map(|h| {
                let meta = h.document.metadata;
                SearchResultJson {
                    title: meta.title,
                    file_name: meta.file_name,
                    section: meta.section.to_string(),
                    similarity: h.similarity,
                    excerpt: h.document.content.chars().take(400).collect(),
                    formulations: meta.formulations,
                    metrics: meta.metrics,
                }
            })
            .collect())
    }

    fn analyze_json(&self, formulation: &str, include_research: bool) -> Result<ComprehensiveAnalysis, McpError> {
        let kb = self.open_kb()?;
        let hits = if include_research && kb.is_ready() {
            kb.search(formulation.trim(), RESEARCH_HITS)
                .map_err(|e| McpError::internal_error(format!("Search failed: {}", e), None))?
        } else {
            Vec::new()
        };

        let analysis = comprehensive_analysis(formulation, Some(hits.as_slice()))
            .map_err(|e| McpError::invalid_params(e.to_string(), None))?;
        kb.record_analysis(&analysis.formulation, &analysis.timestamp, &analysis)
            .map_err(|e| McpError::internal_error(format!("Failed to record analysis: {}", e), None))?;
        Ok(analysis)
    }

    fn status_json(&self) -> Result<StatusJson, McpError> {
        let kb = self.open_kb()?;
        let internal = |e: KnowledgeBaseError| McpError::internal_error(e.to_string(), None);
        Ok(StatusJson {
            knowledge_base: kb.statistics().map_err(internal)?,
            papers: kb.papers().map_err(internal)?,
        })
    }
}

fn to_text<T: Serialize>(value: &T) -> Result<CallToolResult, McpError> {
    let output = serde_json::to_string_pretty(value).map_err(|e| {
        McpError::internal_error(format!("JSON serialization failed: {}", e), None)
    })?;
    Ok(CallToolResult::success(vec![Content::text(output)]))
}

#[tool_router]
impl ElectrolyteService {
    /// Search the electrolyte literature knowledge base
    #[tool(description = "Search ingested battery electrolyte papers by TF-IDF similarity. Returns matching sections with extracted formulations and performance metrics.")]
    async fn electrolyte_search(
        &self,
        params: Parameters<SearchParams>,
    ) -> Result<CallToolResult, McpError> {
        let query = params.0.query.trim();
        if query.is_empty() {
            return Err(McpError::invalid_params("Query cannot be empty", None));
        }

        to_text(&self.search_json(query, params.0.top_k)?)
    }

    /// Analyze an electrolyte formulation
    #[tool(description = "Analyze a lithium battery electrolyte formulation: identifies salts, solvents and additives, predicts ionic conductivity and Coulombic efficiency, flags risks and gives recommendations, optionally backed by the literature knowledge base.")]
    async fn electrolyte_analyze(
        &self,
        params: Parameters<AnalyzeParams>,
    ) -> Result<CallToolResult, McpError> {
        let analysis = self.analyze_json(&params.0.formulation, params.0.include_research)?;
        to_text(&analysis)
    }

    /// Extract formulations and metrics from text
    #[tool(description = "Extract electrolyte formulations (salt concentrations, solvent ratios, additive fractions) and performance metrics (Coulombic efficiency, ionic conductivity, voltage window, cycle life) from text.")]
    async fn electrolyte_extract(
        &self,
        params: Parameters<ExtractParams>,
    ) -> Result<CallToolResult, McpError> {
        let text = &params.0.text;
        to_text(&ExtractResultJson {
            formulations: extract_formulations(text),
            metrics: extract_metrics(text),
        })
    }

    /// Get knowledge base status
    #[tool(description = "Get electrolyte knowledge base status: document, paper and analysis counts and the list of ingested papers.")]
    async fn electrolyte_status(&self) -> Result<CallToolResult, McpError> {
        to_text(&self.status_json()?)
    }
}

#[tool_handler]
impl ServerHandler for ElectrolyteService {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            instructions: Some(
                "Electrolyte research assistant MCP Server. Provides literature search, formulation analysis and data extraction for lithium battery electrolytes.".to_string()
            ),
            ..Default::default()
        }
    }
}

/// Run the MCP server
pub async fn run_mcp_server(paths: AssistantPaths, config: AssistantConfig) -> Result<()> {
    use tokio::io::{stdin, stdout};

    paths.ensure_data_dir()?;
    let service = ElectrolyteService::new(&paths, &config);
    tracing::info!(database = %service.db_path.display(), "MCP server starting on stdio");

    let transport = (stdin(), stdout());
    let server = service.serve(transport).await?;
    server.waiting().await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service(dir: &tempfile::TempDir) -> ElectrolyteService {
        let paths = AssistantPaths::from_root(dir.path().to_path_buf());
        paths.ensure_data_dir().unwrap();
        ElectrolyteService::new(&paths, &AssistantConfig::default())
    }

    #[test]
    fn test_status_and_search_after_examples() {
        let dir = tempfile::tempdir().unwrap();
        let service = service(&dir);
        assert_eq!(service.status_json().unwrap().knowledge_base.document_count, 0);
        assert!(service.search_json("LiFSI", 5).is_err());

        service.open_kb().unwrap().load_examples().unwrap();

        let status = service.status_json().unwrap();
        assert_eq!(status.knowledge_base.document_count, 3);
        assert_eq!(status.papers.len(), 3);

        let results = service.search_json("LiFSI lithium metal transference", 50).unwrap();
        assert!(results.len() <= crate::search::MAX_TOP_K);
        assert_eq!(results[0].file_name, "example-lifsi-metal.pdf");
    }

    #[test]
    fn test_analyze_records_history() {
        let dir = tempfile::tempdir().unwrap();
        let service = service(&dir);

        let analysis = service.analyze_json("3 M LiTFSI in DME", true).unwrap();
        assert!(analysis.research_insights.is_none());
        assert_eq!(service.status_json().unwrap().knowledge_base.analysis_count, 1);

        assert!(service.analyze_json("  ", false).is_err());
    }

    #[tokio::test]
    async fn test_tools_reachable_over_protocol() -> anyhow::Result<()> {
        use rmcp::model::CallToolRequestParam;

        let dir = tempfile::tempdir()?;
        let service = service(&dir);
        service.open_kb().unwrap().load_examples().unwrap();

        let (server_io, client_io) = tokio::io::duplex(4096);
        let server = tokio::spawn(async move {
            service.serve(server_io).await?.waiting().await?;
            anyhow::Ok(())
        });
        let client = ().serve(client_io).await?;

        let mut names: Vec<String> = client
            .list_all_tools()
            .await?
            .into_iter()
            .map(|t| t.name.to_string())
            .collect();
        names.sort();
        assert_eq!(
            names,
            vec![
                "electrolyte_analyze",
                "electrolyte_extract",
                "electrolyte_search",
                "electrolyte_status"
            ]
        );

        let result = client
            .call_tool(CallToolRequestParam {
                name: "electrolyte_status".into(),
                arguments: None,
            })
            .await?;
        let text = &result.content[0].as_text().unwrap().text;
        let status: serde_json::Value = serde_json::from_str(text)?;
        assert_eq!(status["knowledge_base"]["document_count"], 3);

        let result = client
            .call_tool(CallToolRequestParam {
                name: "electrolyte_search".into(),
                arguments: serde_json::json!({"query": "VC additive SEI formation", "top_k": 1})
                    .as_object()
                    .cloned(),
            })
            .await?;
        let hits: serde_json::Value = serde_json::from_str(&result.content[0].as_text().unwrap().text)?;
        assert_eq!(hits[0]["file_name"], "example-vc-sei.pdf");

        client.cancel().await?;
        server.abort();
        Ok(())
    }
}
