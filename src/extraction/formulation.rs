use lazy_static::lazy_static;
use regex::{Captures, Regex, RegexBuilder};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::domain::{classify_component, ComponentKind};

const CONTEXT_CHARS: usize = 100;

const SALT_ALTS: &str = "LiPF6|LiTFSI|LiFSI|LiBOB|LiClO4";
const SOLVENT_ALTS: &str = "EC|DEC|DMC|EMC|FEC|DME|PC";
const ADDITIVE_ALTS: &str = "VC|FEC|LiNO3|CsPF6|TMSP";
const MENTION_ALTS: &str = "EC|DEC|DMC|EMC|FEC|DME|PC|VC|LiPF6|LiTFSI|LiFSI";

fn build(pattern: &str) -> Regex {
    RegexBuilder::new(pattern)
        .case_insensitive(true)
        .build()
        .unwrap()
}

lazy_static! {
    // 1 M LiPF6, 1.5 m LiTFSI
    static ref SALT_RE: Regex = build(&format!(r"(\d+\.?\d*)\s*[Mm]\s*({})", SALT_ALTS));
    // EC:DEC (1:1, v/v), EC/DMC (3:7)
    static ref RATIO_RE: Regex = build(&format!(
        r"({s})[:/]\s*({s})?\s*\(?\s*(\d+)\s*[:：]\s*(\d+)",
        s = SOLVENT_ALTS
    ));
    // 2 wt% VC, 5 vol% FEC
    static ref ADDITIVE_RE: Regex = build(&format!(r"(\d+\.?\d*)\s*(wt%|vol%|%)\s*({})", ADDITIVE_ALTS));
    // 1 M EC, 2 LiFSI
    static ref MENTION_RE: Regex = build(&format!(r"\b(\d+\.?\d*\s*[Mm]?)\s*({})\b", MENTION_ALTS));
}

/// Which extraction pattern produced a formulation entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PatternKind {
    SaltConcentration,
    SolventRatio,
    AdditiveFraction,
    ComponentMention,
}

/// A formulation fact found in text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Formulation {
    /// Canonical component name (`LiPF6`) or solvent pair (`EC/DMC`)
    pub component: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<ComponentKind>,
    /// Amount as written: `1.2 M`, `2 wt%`, `3:7`
    pub concentration: String,
    /// Surrounding text
    pub context: String,
    pub pattern: PatternKind,
}

impl Formulation {
    /// Frequency key used when comparing formulations across papers.
    pub fn key(&self) -> String {
        format!("{}_{}", self.component, self.concentration)
    }
}

/// Extract electrolyte formulation facts from text.
///
/// Patterns run in a fixed order; an entry whose (component, concentration)
/// pair was already found is dropped, so the first pattern wins.
pub fn extract_formulations(text: &str) -> Vec<Formulation> {
    let mut formulations: Vec<Formulation> = Vec::new();

    let mut push = |f: Formulation| {
        let duplicate = formulations
            .iter()
            .any(|e| e.component == f.component && e.concentration == f.concentration);
        if !duplicate {
            formulations.push(f);
        }
    };

    for caps in SALT_RE.captures_iter(text) {
        let component = canonical(&caps[2], SALT_ALTS);
        push(Formulation {
            kind: classify_component(&component),
            concentration: format!("{} M", &caps[1]),
            context: context(text, &caps),
            pattern: PatternKind::SaltConcentration,
            component,
        });
    }

    for caps in RATIO_RE.captures_iter(text) {
        let first = canonical(&caps[1], SOLVENT_ALTS);
        let component = match caps.get(2) {
            Some(second) => format!("{}/{}", first, canonical(second.as_str(), SOLVENT_ALTS)),
            None => first,
        };
        push(Formulation {
            component,
            kind: Some(ComponentKind::Solvent),
            concentration: format!("{}:{}", &caps[3], &caps[4]),
            context: context(text, &caps),
            pattern: PatternKind::SolventRatio,
        });
    }

    for caps in ADDITIVE_RE.captures_iter(text) {
        let component = canonical(&caps[3], ADDITIVE_ALTS);
        push(Formulation {
            kind: classify_component(&component),
            concentration: format!("{} {}", &caps[1], caps[2].to_lowercase()),
            context: context(text, &caps),
            pattern: PatternKind::AdditiveFraction,
            component,
        });
    }

    for caps in MENTION_RE.captures_iter(text) {
        let component = canonical(&caps[2], MENTION_ALTS);
        push(Formulation {
            kind: classify_component(&component),
            concentration: normalize_amount(&caps[1]),
            context: context(text, &caps),
            pattern: PatternKind::ComponentMention,
            component,
        });
    }

    debug!(count = formulations.len(), "extracted formulations");
    formulations
}

/// Map a case-insensitive match back to its spelling in `alternatives`.
fn canonical(found: &str, alternatives: &str) -> String {
    alternatives
        .split('|')
        .find(|alt| alt.eq_ignore_ascii_case(found))
        .unwrap_or(found)
        .to_string()
}

/// `1M` / `1 m` → `1 M`, bare numbers unchanged.
fn normalize_amount(raw: &str) -> String {
    let raw = raw.trim();
    match raw.strip_suffix(['M', 'm']) {
        Some(number) => format!("{} M", number.trim()),
        None => raw.to_string(),
    }
}

/// Up to `CONTEXT_CHARS` characters on each side of the match.
fn context(text: &str, caps: &Captures) -> String {
    let whole = caps.get(0).map(|m| (m.start(), m.end())).unwrap_or((0, 0));
    let before: usize = text[..whole.0]
        .chars()
        .rev()
        .take(CONTEXT_CHARS)
        .map(char::len_utf8)
        .sum();
    let after: usize = text[whole.1..]
        .chars()
        .take(CONTEXT_CHARS)
        .map(char::len_utf8)
        .sum();
    text[whole.0 - before..whole.1 + after].to_string()
}
