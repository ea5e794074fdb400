//! Comprehensive analysis: formulation analysis, literature insights and
//! merged recommendations.

use chrono::Local;
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use super::analyst::analyze_formulation;
use super::insights::generate_research_insights;
use super::{AnalysisError, ComprehensiveAnalysis, FormulationAnalysis, Recommendations, ResearchInsights};
use crate::search::SearchHit;

pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// One result of a batch run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchEntry {
    pub formulation: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub analysis: Option<FormulationAnalysis>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Analyze a formulation, adding research insights when `hits` is non-empty.
pub fn comprehensive_analysis(
    formulation: &str,
    hits: Option<&[SearchHit]>,
) -> Result<ComprehensiveAnalysis, AnalysisError> {
    let formulation = formulation.trim();
    if formulation.is_empty() {
        return Err(AnalysisError::EmptyFormulation);
    }
    info!(formulation, "running comprehensive analysis");

    let formulation_analysis = analyze_formulation(formulation);
    let research_insights = hits
        .filter(|h| !h.is_empty())
        .map(generate_research_insights);
    let recommendations = merge_recommendations(&formulation_analysis, research_insights.as_ref());

    Ok(ComprehensiveAnalysis {
        formulation: formulation.to_string(),
        formulation_analysis,
        research_insights,
        recommendations,
        narrative: None,
        timestamp: Local::now().format(TIMESTAMP_FORMAT).to_string(),
    })
}

fn merge_recommendations(
    analysis: &FormulationAnalysis,
    insights: Option<&ResearchInsights>,
) -> Recommendations {
    Recommendations {
        immediate_actions: analysis
            .risks
            .iter()
            .map(|risk| format!("Caution: {}", risk))
            .collect(),
        research_directions: insights
            .map(|i| i.research_gaps.clone())
            .unwrap_or_default(),
        performance_optimizations: analysis.recommendations.clone(),
    }
}

/// Analyze several formulations; a failing entry does not stop the batch.
pub fn batch_analyze<S: AsRef<str>>(formulations: &[S]) -> Vec<BatchEntry> {
    formulations
        .iter()
        .map(|f| {
            let formulation = f.as_ref().trim();
            if formulation.is_empty() {
                error!("skipping empty formulation in batch");
                return BatchEntry {
                    formulation: formulation.to_string(),
                    analysis: None,
                    error: Some(AnalysisError::EmptyFormulation.to_string()),
                };
            }
            BatchEntry {
                formulation: formulation.to_string(),
                analysis: Some(analyze_formulation(formulation)),
                error: None,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::examples::example_documents;

    #[test]
    fn test_comprehensive_without_hits() {
        let result = comprehensive_analysis("1.2 M LiPF6 in EC/EMC (3:7) with 2% VC", None).unwrap();
        assert!(result.research_insights.is_none());
        assert!(result.recommendations.research_directions.is_empty());
        assert_eq!(
            result.recommendations.immediate_actions.len(),
            result.formulation_analysis.risks.len()
        );
        assert!(result.recommendations.immediate_actions[0].starts_with("Caution: "));
        assert_eq!(
            result.recommendations.performance_optimizations,
            result.formulation_analysis.recommendations
        );
        assert!(chrono::NaiveDateTime::parse_from_str(&result.timestamp, TIMESTAMP_FORMAT).is_ok());
    }

    #[test]
    fn test_comprehensive_with_hits() {
        let hits: Vec<SearchHit> = example_documents()
            .into_iter()
            .map(|document| SearchHit {
                document,
                similarity: 0.3,
            })
            .collect();
        let result = comprehensive_analysis("1 M LiFSI in DME", Some(hits.as_slice())).unwrap();
        let insights = result.research_insights.as_ref().unwrap();
        assert_eq!(result.recommendations.research_directions, insights.research_gaps);

        let empty: Vec<SearchHit> = Vec::new();
        let result = comprehensive_analysis("1 M LiFSI in DME", Some(empty.as_slice())).unwrap();
        assert!(result.research_insights.is_none());
    }

    #[test]
    fn test_empty_formulation_rejected() {
        assert!(matches!(
            comprehensive_analysis("   ", None),
            Err(AnalysisError::EmptyFormulation)
        ));
    }

    #[test]
    fn test_batch_keeps_going() {
        let results = batch_analyze(&["1 M LiPF6 in EC/DMC", "", "3 M LiTFSI in DME"]);
        assert_eq!(results.len(), 3);
        assert!(results[0].analysis.is_some());
        assert!(results[1].error.is_some());
        assert!(results[2].analysis.as_ref().unwrap().risks.len() == 1);
    }
}
