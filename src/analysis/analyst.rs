//! Rule-based formulation analysis

use tracing::info;

use super::components::{average_salt_concentration, identify_components, names_of};
use super::profiles::ApplicationProfile;
use super::{
    Compatibility, Component, Confidence, FormulationAnalysis, MeasuredMetric, Overall, Prediction,
};
use crate::core::domain::{ComponentKind, Metric};
use crate::extraction::metrics::extract_metrics;

const BASE_CONDUCTIVITY: f64 = 8.0;
const BASE_CE: f64 = 99.0;
const HIGH_CONCENTRATION: f64 = 2.0;

/// Analyze a free-text formulation description.
pub fn analyze_formulation(text: &str) -> FormulationAnalysis {
    info!(formulation = text, "analyzing formulation");

    let components = identify_components(text);
    let predictions = predict_performance(&components);
    let measured = measured_metrics(text);
    let profile = ApplicationProfile::detect(text);

    let mut recommendations = generate_recommendations(&components, &predictions);
    if let Some(profile) = profile {
        recommendations.extend(profile.recommendations(&components));
    }

    FormulationAnalysis {
        compatibility: assess_compatibility(&components),
        risks: identify_risks(&components),
        components,
        predictions,
        measured,
        recommendations,
        profile,
    }
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

fn predict_performance(components: &[Component]) -> Vec<Prediction> {
    let conductivity = predict_conductivity(components);
    let ce = predict_coulombic_efficiency(components);

    vec![
        Prediction {
            metric: Metric::IonicConductivity,
            predicted_value: conductivity,
            unit: Metric::IonicConductivity.unit().to_string(),
            confidence: Confidence::Medium,
            explanation: explain_conductivity(conductivity),
        },
        Prediction {
            metric: Metric::CoulombicEfficiency,
            predicted_value: ce,
            unit: Metric::CoulombicEfficiency.unit().to_string(),
            confidence: Confidence::Medium,
            explanation: explain_ce(ce),
        },
    ]
}

/// mS/cm, from salt type and average concentration.
fn predict_conductivity(components: &[Component]) -> f64 {
    let salts = names_of(components, ComponentKind::Salt);
    let mut value = BASE_CONDUCTIVITY;

    if salts.contains(&"LiFSI") {
        value += 2.0;
    } else if salts.contains(&"LiTFSI") {
        value += 1.5;
    }

    let concentration = average_salt_concentration(components);
    if concentration > 1.5 {
        value -= 1.0;
    } else if concentration < 0.8 {
        value += 0.5;
    }

    round1(value)
}

/// Percent, from film-forming additives.
fn predict_coulombic_efficiency(components: &[Component]) -> f64 {
    let additives = names_of(components, ComponentKind::Additive);
    let mut value = BASE_CE;

    if additives.contains(&"VC") || additives.contains(&"FEC") {
        value += 0.5;
    }
    if additives.contains(&"LiNO3") {
        value += 0.3;
    }

    round1(value)
}

fn explain_conductivity(value: f64) -> String {
    if value >= 10.0 {
        format!("High predicted conductivity ({} mS/cm), owing to an efficient salt and solvent balance", value)
    } else if value >= 6.0 {
        format!("Moderate conductivity ({} mS/cm), adequate for most applications", value)
    } else {
        format!("Low conductivity ({} mS/cm); optimize salt concentration or the solvent system", value)
    }
}

fn explain_ce(value: f64) -> String {
    if value >= 99.5 {
        format!("Excellent Coulombic efficiency ({}%), indicating a stable interphase", value)
    } else if value >= 99.0 {
        format!("Good Coulombic efficiency ({}%), suitable for practical cells", value)
    } else {
        format!("Coulombic efficiency ({}%) needs improvement; add a film-forming additive", value)
    }
}

/// Metrics stated in the description, graded against the thresholds.
fn measured_metrics(text: &str) -> Vec<MeasuredMetric> {
    let metrics = extract_metrics(text);
    [
        (Metric::CoulombicEfficiency, metrics.coulombic_efficiency),
        (Metric::IonicConductivity, metrics.ionic_conductivity),
        (Metric::CycleLife, metrics.cycle_life),
        (Metric::VoltageWindow, metrics.upper_voltage()),
    ]
    .into_iter()
    .filter_map(|(metric, value)| {
        let value = value?;
        let level = metric.assess(value);
        Some(MeasuredMetric {
            metric,
            actual_value: value,
            level,
            description: level.description().to_string(),
        })
    })
    .collect()
}

fn generate_recommendations(components: &[Component], predictions: &[Prediction]) -> Vec<String> {
    let salts = names_of(components, ComponentKind::Salt);
    let additives = names_of(components, ComponentKind::Additive);
    let mut recommendations = Vec::new();

    if !additives.iter().any(|a| *a == "VC" || *a == "FEC") {
        recommendations.push(
            "Add a VC or FEC film-forming additive to improve first-cycle Coulombic efficiency and cycling stability"
                .to_string(),
        );
    }
    if salts.contains(&"LiPF6") {
        recommendations.push(
            "LiPF6 can decompose at elevated temperature; consider LiTFSI or LiFSI for high-temperature use"
                .to_string(),
        );
    }

    for prediction in predictions {
        match prediction.metric {
            Metric::IonicConductivity if prediction.predicted_value < 5.0 => recommendations.push(
                "Ionic conductivity is low; optimize the solvent ratio or raise the salt concentration"
                    .to_string(),
            ),
            Metric::CoulombicEfficiency if prediction.predicted_value < 99.0 => recommendations.push(
                "Coulombic efficiency needs improvement; add an interface-stabilizing additive".to_string(),
            ),
            _ => {}
        }
    }

    recommendations
}

fn assess_compatibility(components: &[Component]) -> Compatibility {
    let salts = names_of(components, ComponentKind::Salt);
    let solvents = names_of(components, ComponentKind::Solvent);
    let mut issues = Vec::new();
    let mut strengths = Vec::new();

    if (salts.contains(&"LiTFSI") || salts.contains(&"LiFSI")) && !solvents.contains(&"EC") {
        issues.push(
            "LiTFSI/LiFSI may corrode the aluminium current collector; consider adding EC".to_string(),
        );
    }
    if solvents.contains(&"PC") {
        strengths.push("PC provides good high-voltage stability".to_string());
    }
    if solvents.contains(&"DME") || solvents.contains(&"DOL") {
        strengths.push("Ether solvents suit lithium metal batteries".to_string());
    }

    Compatibility {
        overall: if issues.is_empty() {
            Overall::Good
        } else {
            Overall::NeedsAttention
        },
        issues,
        strengths,
    }
}

fn identify_risks(components: &[Component]) -> Vec<String> {
    let mut risks = Vec::new();

    if names_of(components, ComponentKind::Salt).contains(&"LiPF6") {
        risks.push("LiPF6 may decompose above 60 °C and generate HF, shortening cell life".to_string());
    }

    let high_concentration = components
        .iter()
        .filter(|c| c.kind == ComponentKind::Salt)
        .filter_map(|c| c.concentration)
        .any(|c| c > HIGH_CONCENTRATION);
    if high_concentration {
        risks.push("High salt concentration may raise viscosity and lower conductivity".to_string());
    }

    risks
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::domain::Level;

    #[test]
    fn test_lipf6_carbonate_with_vc() {
        let analysis = analyze_formulation("1.2 M LiPF6 in EC/EMC (3:7) with 2% VC");

        let conductivity = analysis.prediction(Metric::IonicConductivity).unwrap();
        assert_eq!(conductivity.predicted_value, 8.0);
        assert_eq!(conductivity.confidence, Confidence::Medium);
        assert!(conductivity.explanation.starts_with("Moderate"));

        let ce = analysis.prediction(Metric::CoulombicEfficiency).unwrap();
        assert_eq!(ce.predicted_value, 99.5);
        assert!(ce.explanation.starts_with("Excellent"));

        assert!(analysis.risks.iter().any(|r| r.contains("LiPF6")));
        assert!(!analysis.recommendations.iter().any(|r| r.contains("VC or FEC")));
        assert!(analysis.recommendations.iter().any(|r| r.contains("elevated temperature")));
        assert_eq!(analysis.compatibility.overall, Overall::Good);
        assert!(analysis.measured.is_empty());
        assert_eq!(analysis.profile, None);
    }

    #[test]
    fn test_concentrated_litfsi() {
        let analysis = analyze_formulation("3 M LiTFSI in DME");

        assert_eq!(
            analysis.prediction(Metric::IonicConductivity).unwrap().predicted_value,
            8.5
        );
        assert!(analysis.risks.iter().any(|r| r.contains("High salt concentration")));
        assert_eq!(analysis.compatibility.overall, Overall::NeedsAttention);
        assert!(analysis.compatibility.issues[0].contains("aluminium"));
        assert_eq!(analysis.compatibility.strengths.len(), 1);
        assert!(analysis.recommendations.iter().any(|r| r.contains("VC or FEC")));
    }

    #[test]
    fn test_lifsi_dilute_with_lino3() {
        let analysis = analyze_formulation("0.5 M LiFSI in EC/DMC with LiNO3");
        assert_eq!(
            analysis.prediction(Metric::IonicConductivity).unwrap().predicted_value,
            10.5
        );
        assert_eq!(
            analysis.prediction(Metric::CoulombicEfficiency).unwrap().predicted_value,
            99.3
        );
        assert!(analysis.compatibility.issues.is_empty());
    }

    #[test]
    fn test_measured_metrics_graded() {
        let analysis = analyze_formulation(
            "1 M LiPF6 in EC/DEC, CE = 98.5%, 4.2 mS/cm, stable for 1200 cycles between 3.0 V and 4.6 V",
        );
        let level = |metric: Metric| {
            analysis
                .measured
                .iter()
                .find(|m| m.metric == metric)
                .map(|m| m.level)
        };
        assert_eq!(level(Metric::CoulombicEfficiency), Some(Level::Poor));
        assert_eq!(level(Metric::IonicConductivity), Some(Level::Poor));
        assert_eq!(level(Metric::CycleLife), Some(Level::Excellent));
        assert_eq!(level(Metric::VoltageWindow), Some(Level::Excellent));
    }

    #[test]
    fn test_profile_recommendations_appended() {
        let analysis = analyze_formulation("1 M LiPF6 in EC/DMC for lithium metal anodes");
        assert_eq!(analysis.profile, Some(ApplicationProfile::LithiumMetal));
        assert!(analysis
            .recommendations
            .iter()
            .any(|r| r.contains("lithium metal battery electrolyte")));
    }

    #[test]
    fn test_empty_text() {
        let analysis = analyze_formulation("");
        assert!(analysis.components.is_empty());
        assert_eq!(analysis.predictions.len(), 2);
        assert!(analysis.risks.is_empty());
    }
}
