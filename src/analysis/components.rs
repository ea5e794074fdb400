use lazy_static::lazy_static;
use regex::{Regex, RegexBuilder};

use super::Component;
use crate::core::domain::ComponentKind;

fn build(pattern: &str) -> Regex {
    RegexBuilder::new(pattern)
        .case_insensitive(true)
        .build()
        .unwrap()
}

struct Pattern {
    name: &'static str,
    re: Regex,
    role: &'static str,
}

lazy_static! {
    static ref SALTS: Vec<(Pattern, Regex)> = [
        ("LiPF6", "conducting lithium salt with balanced stability and cost"),
        ("LiTFSI", "thermally stable imide salt"),
        ("LiFSI", "highly conductive imide salt"),
        ("LiBOB", "film-forming borate salt"),
    ]
    .into_iter()
    .map(|(name, role)| {
        (
            Pattern {
                name,
                re: build(&format!(r"\b{}\b", name)),
                role,
            },
            build(&format!(r"(\d+\.?\d*)\s*M?\s*{}\b", name)),
        )
    })
    .collect();

    static ref SOLVENTS: Vec<Pattern> = [
        ("EC", "high-dielectric solvent that promotes salt dissociation"),
        ("DEC", "low-viscosity solvent that improves ionic conductivity"),
        ("DMC", "low-viscosity solvent for low-temperature performance"),
        ("EMC", "balancing solvent between solubility and viscosity"),
        ("FEC", "film-forming solvent that stabilizes the SEI"),
        ("PC", "solvent with good high-voltage stability"),
        ("DME", "ether solvent suited to lithium metal batteries"),
        ("DOL", "ether solvent that improves lithium metal compatibility"),
    ]
    .into_iter()
    .map(|(name, role)| Pattern {
        name,
        re: build(&format!(r"\b{}\b", name)),
        role,
    })
    .collect();

    static ref ADDITIVES: Vec<Pattern> = [
        ("VC", r"\bVC\b|vinylene\s+carbonate", "SEI-forming additive that raises first-cycle efficiency"),
        ("FEC", r"\bFEC\b|fluoroethylene\s+carbonate", "film-forming additive for lithium metal and silicon anodes"),
        ("LiNO3", r"\bLiNO3\b|lithium\s+nitrate", "interface stabilizer for lithium metal anodes"),
        ("CsPF6", r"\bCsPF6\b", "cationic additive that suppresses dendrite growth"),
    ]
    .into_iter()
    .map(|(name, pattern, role)| Pattern {
        name,
        re: build(pattern),
        role,
    })
    .collect();
}

/// Recognize salts, solvents and additives in a formulation description.
///
/// Names match as whole tokens, case-insensitively. A number directly in
/// front of a salt (`1.2 M LiPF6`, `1M LiFSI`) is taken as its molar
/// concentration. FEC can be reported both as solvent and as additive.
pub fn identify_components(text: &str) -> Vec<Component> {
    let mut components = Vec::new();

    for (salt, with_concentration) in SALTS.iter() {
        let concentration = with_concentration
            .captures(text)
            .and_then(|caps| caps[1].parse::<f64>().ok());
        if concentration.is_some() || salt.re.is_match(text) {
            components.push(Component {
                kind: ComponentKind::Salt,
                name: salt.name.to_string(),
                concentration,
                role: salt.role.to_string(),
            });
        }
    }

    for (kind, patterns) in [
        (ComponentKind::Solvent, &*SOLVENTS),
        (ComponentKind::Additive, &*ADDITIVES),
    ] {
        components.extend(patterns.iter().filter(|p| p.re.is_match(text)).map(|p| Component {
            kind,
            name: p.name.to_string(),
            concentration: None,
            role: p.role.to_string(),
        }));
    }

    components
}

/// Mean molar concentration of the identified salts, 1.0 M when unknown.
pub fn average_salt_concentration(components: &[Component]) -> f64 {
    let known: Vec<f64> = components
        .iter()
        .filter(|c| c.kind == ComponentKind::Salt)
        .filter_map(|c| c.concentration)
        .collect();
    if known.is_empty() {
        1.0
    } else {
        known.iter().sum::<f64>() / known.len() as f64
    }
}

pub fn names_of(components: &[Component], kind: ComponentKind) -> Vec<&str> {
    components
        .iter()
        .filter(|c| c.kind == kind)
        .map(|c| c.name.as_str())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identify_components() {
        let components = identify_components("1.2 M LiPF6 in EC/EMC (3:7) with 2% VC");

        let salt = &components[0];
        assert_eq!(salt.name, "LiPF6");
        assert_eq!(salt.kind, ComponentKind::Salt);
        assert_eq!(salt.concentration, Some(1.2));

        assert_eq!(names_of(&components, ComponentKind::Solvent), vec!["EC", "EMC"]);
        assert_eq!(names_of(&components, ComponentKind::Additive), vec!["VC"]);
    }

    #[test]
    fn test_whole_token_matching() {
        // "electrolyte" and "FEC" must not register as EC
        let components = identify_components("FEC-rich electrolyte with 1M LiFSI");
        let solvents = names_of(&components, ComponentKind::Solvent);
        assert_eq!(solvents, vec!["FEC"]);
        assert_eq!(names_of(&components, ComponentKind::Additive), vec!["FEC"]);
        assert_eq!(components[0].concentration, Some(1.0));
    }

    #[test]
    fn test_salt_without_concentration() {
        let components = identify_components("LiTFSI in DME/DOL with lithium nitrate");
        assert_eq!(components[0].name, "LiTFSI");
        assert_eq!(components[0].concentration, None);
        assert_eq!(names_of(&components, ComponentKind::Solvent), vec!["DME", "DOL"]);
        assert_eq!(names_of(&components, ComponentKind::Additive), vec!["LiNO3"]);
        assert_eq!(average_salt_concentration(&components), 1.0);
    }

    #[test]
    fn test_average_concentration() {
        let components = identify_components("0.6 M LiFSI + 0.4 M LiBOB in EC");
        assert!((average_salt_concentration(&components) - 0.5).abs() < 1e-9);
    }
}
