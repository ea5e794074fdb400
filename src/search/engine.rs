//! Knowledge base - combines the SQLite store and the TF-IDF index

use std::collections::BTreeSet;
use std::path::Path;

use serde::Serialize;
use tracing::{info, warn};

use super::examples::example_documents;
use super::store::{AnalysisRecord, KnowledgeStore};
use super::tfidf::TfIdfIndex;
use super::{KnowledgeBaseError, Result, SearchHit};
use crate::core::paper::Document;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum KnowledgeStatus {
    Ready,
    NotReady,
}

#[derive(Debug, Clone, Serialize)]
pub struct KnowledgeBaseStats {
    pub status: KnowledgeStatus,
    pub document_count: usize,
    pub paper_count: usize,
    pub vocabulary_size: usize,
    pub analysis_count: usize,
    /// Unix timestamp of the latest ingestion
    pub last_indexed: Option<i64>,
}

/// Persistent document collection with a rebuilt-on-change search index.
pub struct KnowledgeBase {
    store: KnowledgeStore,
    index: Option<TfIdfIndex>,
    min_score: f64,
}

impl KnowledgeBase {
    /// Open the store at `db_path` and index whatever it already holds.
    pub fn open(db_path: &Path, min_score: f64) -> Result<Self> {
        Self::with_store(KnowledgeStore::open(db_path)?, min_score)
    }

    /// In-memory knowledge base (for testing)
    pub fn open_in_memory(min_score: f64) -> Result<Self> {
        Self::with_store(KnowledgeStore::open_in_memory()?, min_score)
    }

    fn with_store(store: KnowledgeStore, min_score: f64) -> Result<Self> {
        let mut kb = Self {
            store,
            index: None,
            min_score,
        };
        kb.rebuild_index()?;
        Ok(kb)
    }

    fn rebuild_index(&mut self) -> Result<()> {
        let documents = self.store.list_documents()?;
        self.index = match TfIdfIndex::build(documents) {
            Ok(index) => Some(index),
            Err(KnowledgeBaseError::Empty) => None,
            Err(e) => return Err(e),
        };
        Ok(())
    }

    pub fn is_ready(&self) -> bool {
        self.index.is_some()
    }

    pub fn min_score(&self) -> f64 {
        self.min_score
    }

    /// Add documents and rebuild the index.
    ///
    /// Documents from a paper already in the knowledge base replace that
    /// paper's previous documents. An empty batch is a no-op. A batch with
    /// two documents under one id (two papers sharing a name) is rejected
    /// and leaves the knowledge base unchanged.
    pub fn build_from_documents(&mut self, documents: Vec<Document>) -> Result<usize> {
        if documents.is_empty() {
            warn!("no documents to add; knowledge base unchanged");
            return Ok(0);
        }
        check_unique_ids(&documents)?;

        self.store.replace_papers(&documents)?;
        self.finish_build(&documents)
    }

    /// Drop all documents, then add `documents`.
    pub fn replace_documents(&mut self, documents: Vec<Document>) -> Result<usize> {
        if documents.is_empty() {
            return Err(KnowledgeBaseError::Empty);
        }
        check_unique_ids(&documents)?;

        self.store.replace_all(&documents)?;
        self.finish_build(&documents)
    }

    fn finish_build(&mut self, documents: &[Document]) -> Result<usize> {
        self.store
            .set_meta("last_build", &chrono::Utc::now().timestamp().to_string())?;
        self.rebuild_index()?;

        let papers: BTreeSet<&str> = documents
            .iter()
            .map(|d| d.metadata.file_name.as_str())
            .collect();
        info!(
            added = documents.len(),
            papers = papers.len(),
            total = self.index.as_ref().map_or(0, TfIdfIndex::len),
            "knowledge base updated"
        );
        Ok(documents.len())
    }

    /// Search with the configured minimum score.
    pub fn search(&self, query: &str, top_k: usize) -> Result<Vec<SearchHit>> {
        self.search_with_min_score(query, top_k, self.min_score)
    }

    pub fn search_with_min_score(
        &self,
        query: &str,
        top_k: usize,
        min_score: f64,
    ) -> Result<Vec<SearchHit>> {
        let index = self.index.as_ref().ok_or(KnowledgeBaseError::NotReady)?;
        Ok(index.search(query, top_k, min_score))
    }

    pub fn documents(&self) -> &[Document] {
        self.index.as_ref().map(TfIdfIndex::documents).unwrap_or(&[])
    }

    pub fn papers(&self) -> Result<Vec<String>> {
        self.store.list_files()
    }

    pub fn statistics(&self) -> Result<KnowledgeBaseStats> {
        let stats = self.store.get_stats()?;
        Ok(KnowledgeBaseStats {
            status: if self.is_ready() {
                KnowledgeStatus::Ready
            } else {
                KnowledgeStatus::NotReady
            },
            document_count: stats.document_count,
            paper_count: stats.paper_count,
            vocabulary_size: self.index.as_ref().map_or(0, TfIdfIndex::vocabulary_size),
            analysis_count: stats.analysis_count,
            last_indexed: stats.last_indexed,
        })
    }

    /// Remove documents and analysis history.
    pub fn clear(&mut self) -> Result<()> {
        self.store.clear()?;
        self.index = None;
        info!("knowledge base cleared");
        Ok(())
    }

    /// Add the bundled example documents.
    pub fn load_examples(&mut self) -> Result<usize> {
        self.build_from_documents(example_documents())
    }

    pub fn record_analysis<T: Serialize>(
        &self,
        formulation: &str,
        timestamp: &str,
        result: &T,
    ) -> Result<i64> {
        self.store.record_analysis(formulation, timestamp, result)
    }

    pub fn history(&self, limit: usize) -> Result<Vec<AnalysisRecord>> {
        self.store.recent_analyses(limit)
    }
}

fn check_unique_ids(documents: &[Document]) -> Result<()> {
    let mut seen = BTreeSet::new();
    match documents.iter().find(|d| !seen.insert(d.id.as_str())) {
        Some(dup) => Err(KnowledgeBaseError::DuplicateDocument(dup.id.clone())),
        None => Ok(()),
    }
}
