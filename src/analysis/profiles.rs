//! Application profiles
//!
//! Typical design targets for three common electrolyte applications. A
//! profile is picked from keywords in the description and its recommended
//! components feed extra recommendations.

use serde::{Deserialize, Serialize};

use super::Component;
use crate::core::domain::ComponentKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplicationProfile {
    HighVoltage,
    LithiumMetal,
    SiliconAnode,
}

/// Design guidance for one application.
#[derive(Debug, Clone, Serialize)]
pub struct Profile {
    pub description: &'static str,
    pub recommended_salts: &'static [&'static str],
    pub recommended_solvents: &'static [&'static str],
    pub recommended_additives: &'static [&'static str],
    pub typical_concentrations: &'static str,
    pub key_considerations: &'static [&'static str],
}

const HIGH_VOLTAGE: Profile = Profile {
    description: "high-voltage electrolyte system",
    recommended_salts: &["LiPF6", "LiTFSI"],
    recommended_solvents: &["FEC", "EMC", "EC"],
    recommended_additives: &["VC", "LiPO2F2"],
    typical_concentrations: "1.0-1.5 M",
    key_considerations: &["oxidative stability", "aluminium current collector compatibility"],
};

const LITHIUM_METAL: Profile = Profile {
    description: "lithium metal battery electrolyte",
    recommended_salts: &["LiFSI", "LiTFSI"],
    recommended_solvents: &["DME", "DOL", "TTE"],
    recommended_additives: &["LiNO3", "CsPF6"],
    typical_concentrations: "1.0-4.0 M",
    key_considerations: &["dendrite suppression", "interface stability"],
};

const SILICON_ANODE: Profile = Profile {
    description: "silicon anode electrolyte",
    recommended_salts: &["LiPF6", "LiFSI"],
    recommended_solvents: &["FEC", "EC", "EMC"],
    recommended_additives: &["FEC", "VC", "SA"],
    typical_concentrations: "1.0-1.2 M",
    key_considerations: &["accommodating volume expansion", "SEI stability"],
};

impl ApplicationProfile {
    pub const ALL: [ApplicationProfile; 3] = [
        ApplicationProfile::HighVoltage,
        ApplicationProfile::LithiumMetal,
        ApplicationProfile::SiliconAnode,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::HighVoltage => "high_voltage",
            Self::LithiumMetal => "lithium_metal",
            Self::SiliconAnode => "silicon_anode",
        }
    }

    pub fn profile(&self) -> &'static Profile {
        match self {
            Self::HighVoltage => &HIGH_VOLTAGE,
            Self::LithiumMetal => &LITHIUM_METAL,
            Self::SiliconAnode => &SILICON_ANODE,
        }
    }

    fn keywords(&self) -> &'static [&'static str] {
        match self {
            Self::HighVoltage => &["high voltage", "high-voltage", "高电压"],
            Self::LithiumMetal => &["lithium metal", "li metal", "lmb", "锂金属"],
            Self::SiliconAnode => &["silicon", "si anode", "硅负极"],
        }
    }

    /// First profile whose keywords appear in `text`.
    pub fn detect(text: &str) -> Option<Self> {
        let lower = text.to_lowercase();
        Self::ALL
            .into_iter()
            .find(|p| p.keywords().iter().any(|k| lower.contains(k)))
    }

    /// Recommendations for profile components missing from `components`.
    pub fn recommendations(&self, components: &[Component]) -> Vec<String> {
        let profile = self.profile();
        let has = |kind: ComponentKind, names: &[&str]| {
            components
                .iter()
                .any(|c| c.kind == kind && names.contains(&c.name.as_str()))
        };

        let mut recommendations = Vec::new();
        if !has(ComponentKind::Salt, profile.recommended_salts) {
            recommendations.push(format!(
                "For a {}, consider {} as the salt",
                profile.description,
                profile.recommended_salts.join(" or ")
            ));
        }
        if !has(ComponentKind::Solvent, profile.recommended_solvents) {
            recommendations.push(format!(
                "For a {}, typical solvents are {}",
                profile.description,
                profile.recommended_solvents.join(", ")
            ));
        }
        if !has(ComponentKind::Additive, profile.recommended_additives) {
            recommendations.push(format!(
                "For a {}, consider additives such as {}",
                profile.description,
                profile.recommended_additives.join(", ")
            ));
        }
        recommendations.push(format!(
            "Typical salt concentration for a {} is {}; key considerations: {}",
            profile.description,
            profile.typical_concentrations,
            profile.key_considerations.join(", ")
        ));
        recommendations
    }
}

impl std::fmt::Display for ApplicationProfile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
