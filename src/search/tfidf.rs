//! TF-IDF retrieval index
//!
//! Sparse vectors keyed by token. Tokens are lower-cased whitespace-split
//! words with everything except word characters and `.,;:!?` stripped, so
//! `additive.` and `additive` are distinct terms.

use std::collections::{BTreeMap, HashMap, HashSet};

use lazy_static::lazy_static;
use regex::Regex;
use tracing::{debug, info};

use super::{KnowledgeBaseError, Result, SearchHit};
use crate::core::domain::DOMAIN_TERMS;
use crate::core::paper::Document;

// Ordered so equal vectors sum in the same order and tie exactly
type SparseVector = BTreeMap<String, f64>;

lazy_static! {
    static ref STRIP_RE: Regex = Regex::new(r"[^\w\s.,;:!?]").unwrap();
}

pub fn preprocess(text: &str) -> Vec<String> {
    let lower = text.to_lowercase();
    STRIP_RE
        .replace_all(&lower, "")
        .split_whitespace()
        .map(String::from)
        .collect()
}

/// Term frequency of vocabulary words, normalized by token count.
fn term_frequencies(tokens: &[String], vocab: &HashSet<String>) -> SparseVector {
    let mut tf = SparseVector::new();
    if tokens.is_empty() {
        return tf;
    }
    for token in tokens.iter().filter(|t| vocab.contains(*t)) {
        *tf.entry(token.clone()).or_insert(0.0) += 1.0;
    }
    let total = tokens.len() as f64;
    tf.values_mut().for_each(|v| *v /= total);
    tf
}

pub fn cosine_similarity(a: &SparseVector, b: &SparseVector) -> f64 {
    let dot: f64 = a
        .iter()
        .filter_map(|(term, va)| b.get(term).map(|vb| va * vb))
        .sum();
    let norm_a: f64 = a.values().map(|v| v * v).sum();
    let norm_b: f64 = b.values().map(|v| v * v).sum();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a.sqrt() * norm_b.sqrt())
}

/// Immutable index over a document set. Rebuild to add documents.
#[derive(Debug, Clone)]
pub struct TfIdfIndex {
    documents: Vec<Document>,
    vocab: HashSet<String>,
    idf: HashMap<String, f64>,
    vectors: Vec<SparseVector>,
}

impl TfIdfIndex {
    pub fn build(documents: Vec<Document>) -> Result<Self> {
        if documents.is_empty() {
            return Err(KnowledgeBaseError::Empty);
        }
        info!(documents = documents.len(), "building TF-IDF index");

        let tokenized: Vec<Vec<String>> = documents.iter().map(|d| preprocess(&d.content)).collect();

        let mut vocab: HashSet<String> = tokenized.iter().flatten().cloned().collect();
        vocab.extend(DOMAIN_TERMS.iter().map(|t| t.to_lowercase()));
        debug!(vocabulary = vocab.len(), "vocabulary built");

        let mut doc_freq: HashMap<&str, usize> = HashMap::new();
        for tokens in &tokenized {
            let unique: HashSet<&str> = tokens.iter().map(String::as_str).collect();
            for token in unique {
                *doc_freq.entry(token).or_insert(0) += 1;
            }
        }

        // ln(N / (1 + df)): terms present in most documents weigh zero or less
        let n = documents.len() as f64;
        let idf: HashMap<String, f64> = doc_freq
            .into_iter()
            .map(|(term, df)| (term.to_string(), (n / (1.0 + df as f64)).ln()))
            .collect();

        let vectors = tokenized
            .iter()
            .map(|tokens| weight(term_frequencies(tokens, &vocab), &idf))
            .collect();

        Ok(Self {
            documents,
            vocab,
            idf,
            vectors,
        })
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    pub fn vocabulary_size(&self) -> usize {
        self.vocab.len()
    }

    pub fn documents(&self) -> &[Document] {
        &self.documents
    }

    /// Rank documents by cosine similarity to `query`.
    ///
    /// Scores below `min_score` are dropped; ties keep document order.
    pub fn search(&self, query: &str, top_k: usize, min_score: f64) -> Vec<SearchHit> {
        let query_vector = weight(term_frequencies(&preprocess(query), &self.vocab), &self.idf);

        let mut scored: Vec<(usize, f64)> = self
            .vectors
            .iter()
            .enumerate()
            .map(|(i, v)| (i, cosine_similarity(&query_vector, v)))
            .filter(|(_, score)| *score >= min_score)
            .collect();

        scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(top_k);

        debug!(query, hits = scored.len(), "search complete");
        scored
            .into_iter()
            .map(|(i, similarity)| SearchHit {
                document: self.documents[i].clone(),
                similarity,
            })
            .collect()
    }
}

fn weight(tf: SparseVector, idf: &HashMap<String, f64>) -> SparseVector {
    tf.into_iter()
        .filter_map(|(term, tf)| idf.get(&term).map(|w| (term, tf * w)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::paper::{DocumentMetadata, Section};
    use crate::search::examples::example_documents;

    fn doc(id: &str, content: &str) -> Document {
        Document::new(
            id,
            content,
            DocumentMetadata {
                file_name: format!("{}.pdf", id),
                section: Section::Results,
                title: id.to_string(),
                authors: vec![],
                formulations: vec![],
                metrics: Default::default(),
            },
        )
    }

    #[test]
    fn test_preprocess() {
        assert_eq!(
            preprocess("LiPF6/EC-DEC (SEI) formation, 99.5%!"),
            vec!["lipf6ecdec", "sei", "formation,", "99.5!"]
        );
        assert_eq!(preprocess("库伦效率 高"), vec!["库伦效率", "高"]);
    }

    #[test]
    fn test_empty_build_rejected() {
        assert!(matches!(TfIdfIndex::build(vec![]), Err(KnowledgeBaseError::Empty)));
    }

    #[test]
    fn test_vocabulary_includes_domain_terms() {
        let index = TfIdfIndex::build(vec![doc("a", "plain words")]).unwrap();
        assert!(index.vocab.contains("lipf6"));
        assert!(index.vocab.contains("plain"));
        assert_eq!(index.vocabulary_size(), index.vocab.len());
    }

    #[test]
    fn test_example_ranking() {
        let index = TfIdfIndex::build(example_documents()).unwrap();
        let hits = index.search("VC additive SEI formation", 5, 0.1);
        assert!(!hits.is_empty());
        assert_eq!(hits[0].document.metadata.title, "SEI Formation with VC Additive");
    }

    #[test]
    fn test_search_bounds_and_order() {
        let index = TfIdfIndex::build(vec![
            doc("a", "lithium salt in carbonate solvent"),
            doc("b", "lithium lithium anode dendrite"),
            doc("c", "cathode coating layer"),
            doc("d", "dendrite suppression lithium anode"),
        ])
        .unwrap();

        let hits = index.search("lithium anode dendrite", 2, 0.1);
        assert!(hits.len() <= 2);
        for pair in hits.windows(2) {
            assert!(pair[0].similarity >= pair[1].similarity);
        }
        assert!(hits.iter().all(|h| h.similarity >= 0.1));
    }

    #[test]
    fn test_ties_keep_earlier_document_first() {
        let index = TfIdfIndex::build(vec![
            doc("first", "fluorinated ether diluent for localized high concentration"),
            doc("filler1", "cathode coating layer"),
            doc("second", "fluorinated ether diluent for localized high concentration"),
            doc("filler2", "graphite anode binder"),
            doc("filler3", "separator porosity"),
        ])
        .unwrap();

        let hits = index.search("fluorinated ether diluent", 5, 0.1);
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].similarity, hits[1].similarity);
        assert_eq!(hits[0].document.id, "first");
        assert_eq!(hits[1].document.id, "second");
    }

    #[test]
    fn test_unknown_query_has_no_hits() {
        let index = TfIdfIndex::build(example_documents()).unwrap();
        assert!(index.search("zeolite membrane", 5, 0.1).is_empty());
        assert!(index.search("", 5, 0.1).is_empty());
    }

    #[test]
    fn test_cosine_similarity() {
        let a: SparseVector = [("x".to_string(), 1.0)].into_iter().collect();
        let b: SparseVector = [("x".to_string(), 2.0), ("y".to_string(), 0.0)].into_iter().collect();
        assert!((cosine_similarity(&a, &b) - 1.0).abs() < 1e-9);
        assert_eq!(cosine_similarity(&a, &SparseVector::new()), 0.0);
    }
}
