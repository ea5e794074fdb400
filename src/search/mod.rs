//! Literature knowledge base
//!
//! - `tfidf`: in-memory TF-IDF index with cosine ranking
//! - `store`: SQLite persistence for documents and analysis history
//! - `engine`: `KnowledgeBase`, tying the two together
//! - `examples`: bundled example documents

pub mod engine;
pub mod examples;
pub mod store;
pub mod tfidf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::paper::Document;

pub use engine::{KnowledgeBase, KnowledgeBaseStats, KnowledgeStatus};
pub use store::{AnalysisRecord, KnowledgeStore, StoreStats};
pub use tfidf::TfIdfIndex;

#[derive(Debug, Error)]
pub enum KnowledgeBaseError {
    #[error("Document list is empty")]
    Empty,

    #[error("Duplicate document id in batch: {0} (two papers with the same name?)")]
    DuplicateDocument(String),

    #[error("Knowledge base is not ready: ingest papers or load the examples first")]
    NotReady,

    #[error("Storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("Stored data is not valid JSON: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, KnowledgeBaseError>;

/// Most results any caller may ask for.
pub const MAX_TOP_K: usize = 10;

/// Clamp a requested result count into `1..=MAX_TOP_K`.
pub fn clamp_top_k(top_k: usize) -> usize {
    top_k.clamp(1, MAX_TOP_K)
}

/// A retrieved document with its cosine similarity to the query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    pub document: Document,
    pub similarity: f64,
}
