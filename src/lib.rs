//! electrolyte-assistant library
//!
//! Research assistant for lithium battery electrolytes: pulls formulations
//! and performance data out of papers, indexes them for retrieval and
//! analyzes candidate formulations against rules and literature.
//!
//! # Modules
//!
//! - `core`: Workspace paths, configuration, domain vocabulary, paper model
//! - `extraction`: PDF/text ingestion, section detection, formulation and metric extraction
//! - `search`: TF-IDF index and the SQLite-backed knowledge base
//! - `analysis`: Rule-based formulation analysis, literature insights, AI backend
//! - `web`: Local web UI and JSON API
//! - `mcp`: MCP server (feature `mcp`)

pub mod analysis;
pub mod core;
pub mod extraction;
#[cfg(feature = "mcp")]
pub mod mcp;
pub mod search;
pub mod web;

// Re-exports for convenience
pub use analysis::{analyze_formulation, comprehensive_analysis, ComprehensiveAnalysis, FormulationAnalysis};
pub use core::config::AssistantConfig;
pub use core::paper::{Document, Section};
pub use core::paths::AssistantPaths;
pub use extraction::{extract_formulations, extract_metrics, process_paper, Formulation, PerformanceMetrics};
pub use search::{KnowledgeBase, SearchHit};
