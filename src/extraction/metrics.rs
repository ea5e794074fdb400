use lazy_static::lazy_static;
use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};

fn build_all(patterns: &[&str]) -> Vec<Regex> {
    patterns
        .iter()
        .map(|p| RegexBuilder::new(p).case_insensitive(true).build().unwrap())
        .collect()
}

lazy_static! {
    static ref CE_PATTERNS: Vec<Regex> = build_all(&[
        r"\bCE\s*[=:]\s*(\d+\.?\d*)%?",
        r"coulombic\s+efficiency\s*[=:]\s*(\d+\.?\d*)%?",
        r"库伦效率\s*[=:]\s*(\d+\.?\d*)%?",
        // "Coulombic efficiency reached 99.7%", "... was maintained at 99.3%"
        r"coulombic\s+efficiency\s+(?:[a-z]+\s+){0,3}?(\d+\.?\d*)\s*%",
        r"库伦效率\D{0,4}?(\d+\.?\d*)\s*%",
    ]);
    static ref CONDUCTIVITY_PATTERNS: Vec<Regex> = build_all(&[
        r"(\d+\.?\d*)\s*mS\s*cm⁻¹",
        r"(\d+\.?\d*)\s*mS\s*/\s*cm",
        r"(\d+\.?\d*)\s*mS\s*cm\^?-1",
        r"ionic\s+conductivity\s*[=:]\s*(\d+\.?\d*)",
        r"离子电导率\s*[=:]\s*(\d+\.?\d*)",
    ]);
    static ref VOLTAGE_RANGE_PATTERNS: Vec<Regex> = build_all(&[
        r"(\d+\.?\d*)\s*V?\s*[–\-~]\s*(\d+\.?\d*)\s*V\b",
        r"between\s+(\d+\.?\d*)\s*V?\s+and\s+(\d+\.?\d*)\s*V\b",
    ]);
    static ref VOLTAGE_SINGLE_PATTERNS: Vec<Regex> = build_all(&[
        r"voltage\s+window\s*[=:]\s*(\d+\.?\d*)\s*V",
        r"电化学窗口\s*[=:]\s*(\d+\.?\d*)\s*V",
        r"(?:stable|stability)\s+up\s+to\s+(\d+\.?\d*)\s*V",
    ]);
    static ref CYCLE_PATTERNS: Vec<Regex> = build_all(&[
        r"(?:after|over|for)\s+(\d+)\s+cycles",
        r"(\d+)\s+cycles\s+(?:at|with)",
    ]);
    static ref RETENTION_PATTERNS: Vec<Regex> = build_all(&[
        r"(\d+\.?\d*)\s*%\s*capacity\s+retention",
        r"capacity\s+retention\s+(?:of\s+)?(\d+\.?\d*)\s*%",
    ]);
}

/// Performance numbers found in a piece of text. Absent values stay `None`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PerformanceMetrics {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coulombic_efficiency: Option<f64>,
    /// mS/cm
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ionic_conductivity: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub voltage_window_min: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub voltage_window_max: Option<f64>,
    /// Single reported stability limit when no range is given
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub voltage_window: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cycle_life: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub capacity_retention: Option<f64>,
}

impl PerformanceMetrics {
    pub fn is_empty(&self) -> bool {
        self.entries().is_empty()
    }

    /// Present values as `(name, value)` pairs in declaration order.
    pub fn entries(&self) -> Vec<(&'static str, f64)> {
        [
            ("coulombic_efficiency", self.coulombic_efficiency),
            ("ionic_conductivity", self.ionic_conductivity),
            ("voltage_window_min", self.voltage_window_min),
            ("voltage_window_max", self.voltage_window_max),
            ("voltage_window", self.voltage_window),
            ("cycle_life", self.cycle_life),
            ("capacity_retention", self.capacity_retention),
        ]
        .into_iter()
        .filter_map(|(name, value)| value.map(|v| (name, v)))
        .collect()
    }

    /// Upper voltage limit, from a range or a single value.
    pub fn upper_voltage(&self) -> Option<f64> {
        self.voltage_window_max.or(self.voltage_window)
    }
}

/// Extract performance metrics. For each metric the first matching
/// pattern wins; a reported range takes precedence over a single value.
pub fn extract_metrics(text: &str) -> PerformanceMetrics {
    let mut metrics = PerformanceMetrics {
        coulombic_efficiency: first_number(&CE_PATTERNS, text),
        ionic_conductivity: first_number(&CONDUCTIVITY_PATTERNS, text),
        cycle_life: first_number(&CYCLE_PATTERNS, text),
        capacity_retention: first_number(&RETENTION_PATTERNS, text),
        ..Default::default()
    };

    match first_range(&VOLTAGE_RANGE_PATTERNS, text) {
        Some((min, max)) => {
            metrics.voltage_window_min = Some(min);
            metrics.voltage_window_max = Some(max);
        }
        None => metrics.voltage_window = first_number(&VOLTAGE_SINGLE_PATTERNS, text),
    }

    metrics
}

fn first_number(patterns: &[Regex], text: &str) -> Option<f64> {
    patterns.iter().find_map(|re| {
        re.captures(text)
            .and_then(|caps| caps.get(1))
            .and_then(|m| m.as_str().parse().ok())
    })
}

fn first_range(patterns: &[Regex], text: &str) -> Option<(f64, f64)> {
    patterns.iter().find_map(|re| {
        let caps = re.captures(text)?;
        let min: f64 = caps.get(1)?.as_str().parse().ok()?;
        let max: f64 = caps.get(2)?.as_str().parse().ok()?;
        Some((min, max))
    })
}
