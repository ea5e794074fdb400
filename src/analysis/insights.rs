use std::collections::{BTreeMap, HashSet};

use tracing::info;

use super::{Benchmark, FormulationFrequency, ResearchInsights};
use crate::core::domain::{ComponentKind, Metric};
use crate::search::SearchHit;

/// Hits needed before trends are reported.
const TREND_MIN_HITS: usize = 3;

/// Summarize formulations and performance across retrieved documents.
pub fn generate_research_insights(hits: &[SearchHit]) -> ResearchInsights {
    info!(hits = hits.len(), "generating research insights");

    let common_formulations = common_formulations(hits);
    let benchmarks = benchmarks(hits);

    let mut trends = Vec::new();
    if hits.len() >= TREND_MIN_HITS {
        trends.push("High-voltage electrolyte systems are an active research focus".to_string());
        trends.push("Multifunctional additives are drawing increasing attention".to_string());
    }

    let salts_mentioned: HashSet<&str> = hits
        .iter()
        .flat_map(|h| &h.document.metadata.formulations)
        .filter(|f| f.kind == Some(ComponentKind::Salt))
        .map(|f| f.component.as_str())
        .collect();

    let mut research_gaps = Vec::new();
    if !salts_mentioned.contains("LiBOB") {
        research_gaps.push("LiBOB salt systems are comparatively under-studied".to_string());
    }

    let key_findings = vec![
        format!("Analyzed {} related documents", hits.len()),
        format!("Identified {} recurring formulation patterns", common_formulations.len()),
        format!("Benchmarks available for {} performance metrics", benchmarks.len()),
    ];

    ResearchInsights {
        trends,
        common_formulations,
        benchmarks,
        research_gaps,
        key_findings,
    }
}

/// `component_concentration` keys seen more than once, most frequent first.
fn common_formulations(hits: &[SearchHit]) -> Vec<FormulationFrequency> {
    let mut counts: BTreeMap<String, usize> = BTreeMap::new();
    for f in hits.iter().flat_map(|h| &h.document.metadata.formulations) {
        *counts.entry(f.key()).or_insert(0) += 1;
    }

    let mut common: Vec<FormulationFrequency> = counts
        .into_iter()
        .filter(|(_, n)| *n > 1)
        .map(|(formulation, frequency)| FormulationFrequency {
            formulation,
            frequency,
        })
        .collect();
    common.sort_by(|a, b| b.frequency.cmp(&a.frequency));
    common
}

fn benchmarks(hits: &[SearchHit]) -> Vec<Benchmark> {
    let series = [
        (
            Metric::CoulombicEfficiency,
            hits.iter()
                .filter_map(|h| h.document.metadata.metrics.coulombic_efficiency)
                .collect::<Vec<f64>>(),
        ),
        (
            Metric::IonicConductivity,
            hits.iter()
                .filter_map(|h| h.document.metadata.metrics.ionic_conductivity)
                .collect(),
        ),
    ];

    series
        .into_iter()
        .filter(|(_, values)| !values.is_empty())
        .map(|(metric, values)| Benchmark {
            metric,
            average: values.iter().sum::<f64>() / values.len() as f64,
            max: values.iter().cloned().fold(f64::MIN, f64::max),
            min: values.iter().cloned().fold(f64::MAX, f64::min),
            count: values.len(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::examples::example_documents;

    fn hits() -> Vec<SearchHit> {
        example_documents()
            .into_iter()
            .map(|document| SearchHit {
                document,
                similarity: 0.5,
            })
            .collect()
    }

    #[test]
    fn test_insights_from_examples() {
        let insights = generate_research_insights(&hits());

        assert_eq!(insights.trends.len(), 2);
        assert_eq!(insights.research_gaps.len(), 1);

        let ce = insights
            .benchmarks
            .iter()
            .find(|b| b.metric == Metric::CoulombicEfficiency)
            .unwrap();
        assert_eq!(ce.count, 3);
        assert_eq!(ce.max, 99.7);
        assert_eq!(ce.min, 99.3);
        assert!((ce.average - 99.5).abs() < 1e-9);

        let conductivity = insights
            .benchmarks
            .iter()
            .find(|b| b.metric == Metric::IonicConductivity)
            .unwrap();
        assert_eq!(conductivity.count, 2);
        assert!((conductivity.average - 10.2).abs() < 1e-9);
    }

    #[test]
    fn test_common_formulations_need_repeats() {
        let mut hits = hits();
        // the VC example states 1 M LiPF6; add another paper with the same salt
        hits.push(hits[1].clone());
        let insights = generate_research_insights(&hits);
        assert!(insights
            .common_formulations
            .iter()
            .any(|f| f.formulation == "LiPF6_1 M" && f.frequency == 2));
    }

    #[test]
    fn test_few_hits_no_trends() {
        let insights = generate_research_insights(&hits()[..1]);
        assert!(insights.trends.is_empty());
        assert_eq!(insights.key_findings[0], "Analyzed 1 related documents");
    }
}
