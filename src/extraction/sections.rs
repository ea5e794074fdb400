use lazy_static::lazy_static;
use regex::{Regex, RegexBuilder};

use crate::core::paper::{PaperMetadata, Section, UNKNOWN_AUTHOR, UNKNOWN_TITLE};

/// Only the first lines of a page are checked for a heading.
const HEADING_SCAN_LINES: usize = 5;
/// Lines at least this long are body text, not headings.
const MAX_HEADING_CHARS: usize = 100;
const MIN_TITLE_CHARS: usize = 10;
const MIN_AUTHOR_LINE_CHARS: usize = 5;

lazy_static! {
    static ref SECTION_PATTERNS: Vec<(Section, Vec<Regex>)> = Section::DETECTABLE
        .iter()
        .map(|section| {
            let patterns = section
                .keywords()
                .iter()
                .map(|k| {
                    RegexBuilder::new(k)
                        .case_insensitive(true)
                        .build()
                        .expect("section keyword regex")
                })
                .collect();
            (section.clone(), patterns)
        })
        .collect();
}

/// Heading detected on a line, if any.
pub fn detect_heading(line: &str) -> Option<Section> {
    let clean = line.trim().to_lowercase();
    if clean.is_empty() || clean.chars().count() >= MAX_HEADING_CHARS {
        return None;
    }
    SECTION_PATTERNS
        .iter()
        .find(|(_, patterns)| patterns.iter().any(|re| re.is_match(&clean)))
        .map(|(section, _)| section.clone())
}

/// Group page texts into sections.
///
/// Text before the first detected heading belongs to `Section::Header`.
/// Detection is per page: the first heading among a page's leading lines
/// switches the current section and the whole page is appended to it.
/// Sections are returned in order of first appearance.
pub fn structure_pages(pages: &[String]) -> Vec<(Section, String)> {
    let mut sections: Vec<(Section, String)> = Vec::new();
    let mut current = Section::Header;

    for page in pages {
        if page.trim().is_empty() {
            continue;
        }

        if let Some(section) = page.lines().take(HEADING_SCAN_LINES).find_map(detect_heading) {
            current = section;
        }

        match sections.iter_mut().find(|(s, _)| *s == current) {
            Some((_, text)) => {
                text.push_str(page);
                text.push('\n');
            }
            None => sections.push((current.clone(), format!("{}\n", page))),
        }
    }

    sections
}

/// Read title, authors and abstract from a paper's first page.
pub fn analyze_metadata(first_page: &str, page_count: usize) -> PaperMetadata {
    let title = extract_title(first_page).unwrap_or_else(|| UNKNOWN_TITLE.to_string());
    let authors = extract_authors(first_page);
    let authors = if authors.is_empty() {
        vec![UNKNOWN_AUTHOR.to_string()]
    } else {
        authors
    };

    PaperMetadata {
        title,
        authors,
        abstract_text: extract_abstract(first_page),
        page_count,
    }
}

fn extract_title(text: &str) -> Option<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| line.chars().count() > MIN_TITLE_CHARS)
        .find(|line| {
            let lower = line.to_lowercase();
            !["abstract", "introduction", "author"]
                .iter()
                .any(|k| lower.contains(k))
        })
        .map(String::from)
}

fn extract_authors(text: &str) -> Vec<String> {
    let lines: Vec<&str> = text.lines().collect();
    for (i, line) in lines.iter().enumerate() {
        let lower = line.to_lowercase();
        let affiliation = ["university", "institute", "college", "@"]
            .iter()
            .any(|k| lower.contains(k));
        if !affiliation || i == 0 {
            continue;
        }

        let candidate = lines[i - 1].trim();
        if candidate.chars().count() > MIN_AUTHOR_LINE_CHARS {
            return candidate
                .split(',')
                .map(|a| a.trim().to_string())
                .filter(|a| !a.is_empty())
                .collect();
        }
    }
    Vec::new()
}

fn extract_abstract(text: &str) -> String {
    let mut lines = Vec::new();
    let mut in_abstract = false;

    for line in text.lines() {
        let lower = line.to_lowercase();
        if !in_abstract {
            if lower.contains("abstract") || line.contains("摘要") {
                in_abstract = true;
            }
            continue;
        }
        if ["introduction", "keywords", "1."].iter().any(|k| lower.contains(k)) {
            break;
        }
        if !line.trim().is_empty() {
            lines.push(line.trim());
        }
    }

    lines.join(" ")
}
