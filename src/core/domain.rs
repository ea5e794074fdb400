use std::collections::HashSet;

use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};

lazy_static! {
    pub static ref SALTS: Vec<&'static str> = vec![
        "LiPF6", "LiTFSI", "LiFSI", "LiBOB", "LiDFOB", "LiClO4", "LiAsF6", "LiNO3", "LiBF4",
        "LiPOF2", "LiBETI", "LiDFB", "LiFNFSI", "LiTFPFB",
    ];
    pub static ref SOLVENTS: Vec<&'static str> = vec![
        "EC", "DEC", "DMC", "EMC", "FEMC", "FEC", "DFEC", "DME", "TTE", "PC", "GBL", "THF",
        "CPME", "THP", "1,3-Dioxolane", "DOL", "DMAc", "NMP", "EG", "PG", "PEG", "DMA", "DMF",
        "BC", "MA", "EP", "DPC", "GDE", "DMSO", "AN", "DPhC", "HFE", "MEC", "MP", "PPC", "VC",
        "VEC", "FPC", "DMEe", "BM", "EE", "EGDME", "DEGDME", "TEGDME", "SL", "MeSL", "DMS",
        "DES", "PN", "BN", "PhCN", "TFEC", "DFDMC", "FMEC", "DPrC", "DBuC", "MPC", "EPrC", "EA",
        "MF", "EB", "MB", "EGC", "GC", "TMC", "HMPA", "TMP", "DFDEC", "CP", "VPC", "PFA",
        "BTFE", "P3TE",
    ];
    pub static ref ADDITIVES: Vec<&'static str> = vec!["VC", "FEC", "LiNO3", "CsPF6", "TMSP", "TTE"];

    pub static ref KEY_CONCEPTS: Vec<&'static str> = vec![
        "solvation structure", "SEI formation", "ionic conductivity", "electrochemical window",
        "Li+ transference number", "Coulombic efficiency", "anode stability",
        "cathode stability", "interface engineering", "弱溶剂化", "界面稳定性", "库伦效率",
        "离子电导率", "电化学窗口",
    ];
    pub static ref CHARACTERIZATION_TECHNIQUES: Vec<&'static str> = vec![
        "XPS", "SEM", "TEM", "XRD", "FTIR", "Raman", "NMR", "EIS", "CV", "LSV",
        "in-situ characterization", "同步辐射", "原位测试", "电化学阻抗",
    ];

    /// Terms always present in the retrieval vocabulary
    pub static ref DOMAIN_TERMS: Vec<&'static str> = vec![
        "electrolyte", "lithium", "battery", "ionic", "conductivity", "coulombic", "efficiency",
        "voltage", "cycle", "stability", "SEI", "interface", "solvent", "salt", "additive",
        "formation", "performance", "capacity", "retention", "density", "energy", "anode",
        "cathode", "cell", "cycling", "decomposition", "LiPF6", "LiTFSI", "LiFSI", "EC", "DEC",
        "DMC", "EMC", "FEC", "VC", "库伦效率", "离子电导率", "电化学窗口", "界面稳定性",
    ];

    static ref SALT_SET: HashSet<String> = SALTS.iter().map(|s| s.to_lowercase()).collect();
    static ref SOLVENT_SET: HashSet<String> = SOLVENTS.iter().map(|s| s.to_lowercase()).collect();
    static ref ADDITIVE_SET: HashSet<String> = ADDITIVES.iter().map(|s| s.to_lowercase()).collect();
}

/// Role of a component inside an electrolyte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComponentKind {
    Salt,
    Solvent,
    Additive,
}

impl ComponentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Salt => "salt",
            Self::Solvent => "solvent",
            Self::Additive => "additive",
        }
    }
}

impl std::fmt::Display for ComponentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classify a component name against the domain vocabulary.
///
/// Salts win over additives, additives over solvents (VC and FEC appear in
/// both the solvent and additive lists).
pub fn classify_component(name: &str) -> Option<ComponentKind> {
    let key = name.trim().to_lowercase();
    if SALT_SET.contains(&key) {
        Some(ComponentKind::Salt)
    } else if ADDITIVE_SET.contains(&key) {
        Some(ComponentKind::Additive)
    } else if SOLVENT_SET.contains(&key) {
        Some(ComponentKind::Solvent)
    } else {
        None
    }
}

/// Performance metrics with grading thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    CoulombicEfficiency,
    IonicConductivity,
    CycleLife,
    VoltageWindow,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Thresholds {
    pub excellent: f64,
    pub good: f64,
    pub poor: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Level {
    Excellent,
    Good,
    Poor,
}

impl Level {
    pub fn description(&self) -> &'static str {
        match self {
            Self::Excellent => "excellent performance",
            Self::Good => "good performance",
            Self::Poor => "needs improvement",
        }
    }
}

impl Metric {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CoulombicEfficiency => "coulombic_efficiency",
            Self::IonicConductivity => "ionic_conductivity",
            Self::CycleLife => "cycle_life",
            Self::VoltageWindow => "voltage_window",
        }
    }

    pub fn unit(&self) -> &'static str {
        match self {
            Self::CoulombicEfficiency => "%",
            Self::IonicConductivity => "mS/cm",
            Self::CycleLife => "cycles",
            Self::VoltageWindow => "V",
        }
    }

    pub fn thresholds(&self) -> Thresholds {
        match self {
            Self::CoulombicEfficiency => Thresholds { excellent: 99.5, good: 99.0, poor: 98.0 },
            Self::IonicConductivity => Thresholds { excellent: 10.0, good: 5.0, poor: 1.0 },
            Self::CycleLife => Thresholds { excellent: 1000.0, good: 500.0, poor: 100.0 },
            Self::VoltageWindow => Thresholds { excellent: 4.5, good: 4.3, poor: 4.0 },
        }
    }

    pub fn assess(&self, value: f64) -> Level {
        let t = self.thresholds();
        if value >= t.excellent {
            Level::Excellent
        } else if value >= t.good {
            Level::Good
        } else {
            Level::Poor
        }
    }
}

impl std::fmt::Display for Metric {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_component() {
        assert_eq!(classify_component("LiPF6"), Some(ComponentKind::Salt));
        assert_eq!(classify_component("lipf6"), Some(ComponentKind::Salt));
        assert_eq!(classify_component("LiNO3"), Some(ComponentKind::Salt));
        assert_eq!(classify_component("VC"), Some(ComponentKind::Additive));
        assert_eq!(classify_component("EMC"), Some(ComponentKind::Solvent));
        assert_eq!(classify_component("water"), None);
    }

    #[test]
    fn test_assess() {
        assert_eq!(Metric::CoulombicEfficiency.assess(99.7), Level::Excellent);
        assert_eq!(Metric::CoulombicEfficiency.assess(99.0), Level::Good);
        assert_eq!(Metric::CoulombicEfficiency.assess(97.0), Level::Poor);
        assert_eq!(Metric::IonicConductivity.assess(8.9), Level::Good);
        assert_eq!(Metric::CycleLife.assess(1200.0), Level::Excellent);
    }
}
