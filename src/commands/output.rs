use colored::*;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use electrolyte_assistant::analysis::FormulationAnalysis;
use electrolyte_assistant::core::domain::Level;
use electrolyte_assistant::extraction::{Formulation, PerformanceMetrics};
use electrolyte_assistant::search::KnowledgeBaseStats;

/// Truncate to a display width, counting wide (CJK) characters as two columns.
pub fn truncate(s: &str, max_width: usize) -> String {
    let s = s.split_whitespace().collect::<Vec<_>>().join(" ");
    if s.width() <= max_width {
        return s;
    }

    let mut out = String::new();
    let mut width = 0;
    for c in s.chars() {
        let w = c.width().unwrap_or(0);
        if width + w > max_width.saturating_sub(3) {
            break;
        }
        width += w;
        out.push(c);
    }
    out.push_str("...");
    out
}

pub fn header(title: &str) {
    println!("{}", title.bold());
    println!("{}", "=".repeat(60));
}

pub fn subheader(title: &str) {
    println!();
    println!("{}", title.cyan());
    println!("{}", "-".repeat(40));
}

pub fn bullets(items: &[String]) {
    if items.is_empty() {
        println!("   {}", "(none)".dimmed());
    }
    for item in items {
        println!("   • {}", item);
    }
}

pub fn level(level: Level, text: &str) -> ColoredString {
    match level {
        Level::Excellent => text.green().bold(),
        Level::Good => text.green(),
        Level::Poor => text.yellow(),
    }
}

pub fn formulations(list: &[Formulation]) {
    for f in list {
        let kind = f.kind.map(|k| k.as_str()).unwrap_or("component");
        println!(
            "   {} {:<10} {}",
            format!("{:<12}", f.component).cyan(),
            f.concentration,
            kind.dimmed()
        );
    }
}

pub fn metrics(metrics: &PerformanceMetrics) {
    for (name, value) in metrics.entries() {
        println!("   {:<22} {}", name, value);
    }
}

pub fn knowledge_stats(stats: &KnowledgeBaseStats) {
    let status = if stats.document_count > 0 {
        "ready".green()
    } else {
        "empty".yellow()
    };
    println!("   {:<16} {}", "Status", status);
    println!("   {:<16} {:>6}", "Papers", stats.paper_count);
    println!("   {:<16} {:>6}", "Documents", stats.document_count);
    println!("   {:<16} {:>6}", "Vocabulary", stats.vocabulary_size);
    println!("   {:<16} {:>6}", "Analyses", stats.analysis_count);
    if let Some(ts) = stats.last_indexed.and_then(|t| chrono::DateTime::from_timestamp(t, 0)) {
        println!(
            "   {:<16} {}",
            "Last indexed",
            ts.with_timezone(&chrono::Local).format("%Y-%m-%d %H:%M")
        );
    }
}

pub fn formulation_analysis(analysis: &FormulationAnalysis) {
    subheader("Components");
    if analysis.components.is_empty() {
        println!("   {}", "No known components identified".yellow());
    }
    for c in &analysis.components {
        let name = match c.concentration {
            Some(m) => format!("{} ({} M)", c.name, m),
            None => c.name.clone(),
        };
        println!("   {:<10} {} {}", c.kind.as_str(), format!("{:<20}", name).cyan(), c.role.dimmed());
    }

    subheader("Predicted performance");
    for p in &analysis.predictions {
        println!(
            "   {:<22} {:>6.1} {:<6} [{}]",
            p.metric.as_str(),
            p.predicted_value,
            p.unit,
            p.confidence
        );
        println!("     {}", p.explanation.dimmed());
    }

    if !analysis.measured.is_empty() {
        subheader("Reported values");
        for m in &analysis.measured {
            println!(
                "   {:<22} {:>6.1} {}",
                m.metric.as_str(),
                m.actual_value,
                level(m.level, &m.description)
            );
        }
    }

    if let Some(profile) = &analysis.profile {
        subheader("Application profile");
        println!("   {}", profile);
    }

    subheader(&format!("Compatibility: {}", analysis.compatibility.overall));
    for issue in &analysis.compatibility.issues {
        println!("   {} {}", "✗".red(), issue);
    }
    for strength in &analysis.compatibility.strengths {
        println!("   {} {}", "✓".green(), strength);
    }

    if !analysis.risks.is_empty() {
        subheader("Risks");
        for risk in &analysis.risks {
            println!("   {} {}", "!".yellow().bold(), risk);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_ascii() {
        assert_eq!(truncate("short text", 20), "short text");
        assert_eq!(truncate("abcdefghij", 8), "abcde...");
    }

    #[test]
    fn test_truncate_wide_chars() {
        let t = truncate("锂离子电池电解液研究", 9);
        assert!(t.width() <= 9);
        assert!(t.ends_with("..."));
    }

    #[test]
    fn test_truncate_collapses_whitespace() {
        assert_eq!(truncate("a\n\nb   c", 20), "a b c");
    }
}
