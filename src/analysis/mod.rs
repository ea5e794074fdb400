//! Formulation analysis
//!
//! Rule-based assessment of a free-text electrolyte description, research
//! insights over retrieved literature, and an optional AI-written summary.

pub mod analyst;
pub mod components;
pub mod insights;
pub mod llm;
pub mod manager;
pub mod profiles;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::domain::{ComponentKind, Level, Metric};

pub use analyst::analyze_formulation;
pub use components::identify_components;
pub use insights::generate_research_insights;
pub use llm::{LlmClient, LlmError};
pub use manager::{batch_analyze, comprehensive_analysis, BatchEntry};
pub use profiles::{ApplicationProfile, Profile};

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("Formulation description is empty")]
    EmptyFormulation,
}

/// An electrolyte component recognized in a description.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Component {
    pub kind: ComponentKind,
    pub name: String,
    /// Molar concentration, salts only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub concentration: Option<f64>,
    pub role: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Confidence {
    Low,
    Medium,
    High,
}

impl std::fmt::Display for Confidence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        })
    }
}

/// A metric estimated from composition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub metric: Metric,
    pub predicted_value: f64,
    pub unit: String,
    pub confidence: Confidence,
    pub explanation: String,
}

/// A metric stated in the description itself, graded against thresholds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeasuredMetric {
    pub metric: Metric,
    pub actual_value: f64,
    pub level: Level,
    pub description: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Overall {
    Good,
    NeedsAttention,
}

impl std::fmt::Display for Overall {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Good => "good",
            Self::NeedsAttention => "needs attention",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Compatibility {
    pub overall: Overall,
    pub issues: Vec<String>,
    pub strengths: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormulationAnalysis {
    pub components: Vec<Component>,
    pub predictions: Vec<Prediction>,
    pub measured: Vec<MeasuredMetric>,
    pub recommendations: Vec<String>,
    pub compatibility: Compatibility,
    pub risks: Vec<String>,
    /// Application the description targets, when recognizable
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile: Option<ApplicationProfile>,
}

impl FormulationAnalysis {
    pub fn prediction(&self, metric: Metric) -> Option<&Prediction> {
        self.predictions.iter().find(|p| p.metric == metric)
    }

    pub fn has_component(&self, kind: ComponentKind, name: &str) -> bool {
        self.components.iter().any(|c| c.kind == kind && c.name == name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormulationFrequency {
    pub formulation: String,
    pub frequency: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Benchmark {
    pub metric: Metric,
    pub average: f64,
    pub max: f64,
    pub min: f64,
    pub count: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResearchInsights {
    pub trends: Vec<String>,
    pub common_formulations: Vec<FormulationFrequency>,
    pub benchmarks: Vec<Benchmark>,
    pub research_gaps: Vec<String>,
    pub key_findings: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Recommendations {
    pub immediate_actions: Vec<String>,
    pub research_directions: Vec<String>,
    pub performance_optimizations: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComprehensiveAnalysis {
    pub formulation: String,
    pub formulation_analysis: FormulationAnalysis,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub research_insights: Option<ResearchInsights>,
    pub recommendations: Recommendations,
    /// AI backend summary, when requested and available
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub narrative: Option<String>,
    /// Local time, `%Y-%m-%d %H:%M:%S`
    pub timestamp: String,
}
