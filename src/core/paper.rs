use serde::{Deserialize, Serialize};

use crate::extraction::formulation::Formulation;
use crate::extraction::metrics::PerformanceMetrics;

/// Section of a research paper.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Section {
    Header,
    Abstract,
    Introduction,
    Experimental,
    Results,
    Discussion,
    Conclusion,
    /// Free-form label supplied by a caller
    #[serde(untagged)]
    Other(String),
}

impl Section {
    /// Sections with heading keywords, in detection priority order.
    pub const DETECTABLE: [Section; 6] = [
        Section::Abstract,
        Section::Introduction,
        Section::Experimental,
        Section::Results,
        Section::Discussion,
        Section::Conclusion,
    ];

    /// Heading keywords (regex fragments, matched case-insensitively).
    pub fn keywords(&self) -> &'static [&'static str] {
        match self {
            Section::Abstract => &["abstract", "摘要"],
            Section::Introduction => &["introduction", "引言"],
            Section::Experimental => &["experimental", "methods?", "方法", "实验部分"],
            Section::Results => &["results", "结果"],
            Section::Discussion => &["discussion", "讨论"],
            Section::Conclusion => &["conclusion", "结论"],
            Section::Header | Section::Other(_) => &[],
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Section::Header => "header",
            Section::Abstract => "abstract",
            Section::Introduction => "introduction",
            Section::Experimental => "experimental",
            Section::Results => "results",
            Section::Discussion => "discussion",
            Section::Conclusion => "conclusion",
            Section::Other(label) => label,
        }
    }

    pub fn from_label(label: &str) -> Self {
        match label.trim().to_lowercase().as_str() {
            "header" => Section::Header,
            "abstract" => Section::Abstract,
            "introduction" => Section::Introduction,
            "experimental" => Section::Experimental,
            "results" => Section::Results,
            "discussion" => Section::Discussion,
            "conclusion" => Section::Conclusion,
            _ => Section::Other(label.trim().to_string()),
        }
    }
}

impl std::fmt::Display for Section {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

pub const UNKNOWN_TITLE: &str = "Untitled";
pub const UNKNOWN_AUTHOR: &str = "Unknown";

/// Bibliographic data read from the first page of a paper.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaperMetadata {
    pub title: String,
    pub authors: Vec<String>,
    #[serde(rename = "abstract")]
    pub abstract_text: String,
    pub page_count: usize,
}

impl Default for PaperMetadata {
    fn default() -> Self {
        Self {
            title: UNKNOWN_TITLE.to_string(),
            authors: vec![UNKNOWN_AUTHOR.to_string()],
            abstract_text: String::new(),
            page_count: 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentMetadata {
    pub file_name: String,
    pub section: Section,
    pub title: String,
    pub authors: Vec<String>,
    #[serde(default)]
    pub formulations: Vec<Formulation>,
    #[serde(default)]
    pub metrics: PerformanceMetrics,
}

/// Retrieval unit: one section (or section chunk) of one paper.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: String,
    pub content: String,
    pub metadata: DocumentMetadata,
}

impl Document {
    /// Build a document and extract its formulations and metrics.
    pub fn new(id: impl Into<String>, content: impl Into<String>, metadata: DocumentMetadata) -> Self {
        let content = content.into();
        let mut metadata = metadata;
        metadata.formulations = crate::extraction::formulation::extract_formulations(&content);
        metadata.metrics = crate::extraction::metrics::extract_metrics(&content);
        Self {
            id: id.into(),
            content,
            metadata,
        }
    }

    pub fn document_id(file_name: &str, section: &Section, chunk: usize) -> String {
        format!("{}#{}#{}", file_name, section, chunk)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_section_labels() {
        assert_eq!(Section::from_label("Results"), Section::Results);
        assert_eq!(Section::from_label("摘要"), Section::Other("摘要".into()));
        assert_eq!(Section::Experimental.to_string(), "experimental");
    }

    #[test]
    fn test_no_keyword_shadowed_within_section() {
        for section in Section::DETECTABLE {
            let keywords = section.keywords();
            for (i, earlier) in keywords.iter().enumerate() {
                let re = regex::Regex::new(&format!("(?i){}", earlier)).unwrap();
                for later in &keywords[i + 1..] {
                    assert!(!re.is_match(later), "{:?}: {} shadows {}", section, earlier, later);
                }
            }
        }
    }

    #[test]
    fn test_section_serde() {
        let json = serde_json::to_string(&Section::Conclusion).unwrap();
        assert_eq!(json, "\"conclusion\"");
        let other: Section = serde_json::from_str("\"appendix\"").unwrap();
        assert_eq!(other, Section::Other("appendix".into()));
        let known: Section = serde_json::from_str("\"abstract\"").unwrap();
        assert_eq!(known, Section::Abstract);
    }

    #[test]
    fn test_document_extracts_on_build() {
        let doc = Document::new(
            "paper.pdf#results#0",
            "Cells with 1 M LiPF6 reached CE = 99.6%",
            DocumentMetadata {
                file_name: "paper.pdf".into(),
                section: Section::Results,
                title: "T".into(),
                authors: vec![],
                formulations: vec![],
                metrics: PerformanceMetrics::default(),
            },
        );
        assert!(doc.metadata.formulations.iter().any(|f| f.component == "LiPF6"));
        assert_eq!(doc.metadata.metrics.coulombic_efficiency, Some(99.6));
    }
}
