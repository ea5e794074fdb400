//! Watch command - Ingest papers as they land in a directory

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::time::{Duration, SystemTime};

use anyhow::{Context, Result};
use colored::*;
use notify::{Event, EventKind, RecursiveMode, Watcher};

use electrolyte_assistant::extraction::process_paper;

use super::Workspace;

/// Writers often emit several events per file; wait for them to settle.
const SETTLE_DELAY: Duration = Duration::from_millis(500);

pub fn run(workspace: &Workspace, dir: &Path) -> Result<()> {
    if !dir.is_dir() {
        anyhow::bail!("Not a directory: {}", dir.display());
    }
    let dir = &dir
        .canonicalize()
        .with_context(|| format!("Failed to resolve {}", dir.display()))?;

    let mut kb = workspace.open_knowledge_base()?;
    let retrieval = workspace.config.retrieval.clone();

    let (tx, rx) = mpsc::channel();
    let mut watcher = notify::recommended_watcher(move |res: notify::Result<Event>| {
        if let Err(e) = tx.send(res) {
            tracing::error!("Failed to send file event: {}", e);
        }
    })?;
    watcher
        .watch(dir, RecursiveMode::Recursive)
        .with_context(|| format!("Failed to watch {}", dir.display()))?;

    println!(
        "{} Watching {} for new papers (Ctrl-C to stop)",
        "→".dimmed(),
        dir.display().to_string().cyan()
    );

    // Last modification time ingested per path
    let mut seen: HashMap<PathBuf, SystemTime> = HashMap::new();

    loop {
        let mut pending = match rx.recv()? {
            Ok(event) => candidate_paths(event),
            Err(e) => {
                tracing::warn!(error = %e, "watch error");
                continue;
            }
        };

        std::thread::sleep(SETTLE_DELAY);
        while let Ok(res) = rx.try_recv() {
            if let Ok(event) = res {
                pending.extend(candidate_paths(event));
            }
        }
        pending.sort();
        pending.dedup();

        for path in pending {
            let Ok(modified) = std::fs::metadata(&path).and_then(|m| m.modified()) else {
                continue;
            };
            if seen.get(&path) == Some(&modified) {
                continue;
            }

            match process_paper(&path, retrieval.chunk_size, retrieval.chunk_overlap) {
                Ok(mut paper) => {
                    paper.rename(&paper_name(dir, &path));
                    let added = kb.build_from_documents(paper.documents)?;
                    seen.insert(path.clone(), modified);
                    println!(
                        "{} {} ({} documents)",
                        "✓".green().bold(),
                        paper.metadata.title.cyan(),
                        added
                    );
                }
                Err(e) => {
                    println!("{} {}: {}", "✗".red().bold(), path.display(), e.to_string().red());
                }
            }
        }
    }
}

/// Papers in subdirectories are keyed on their path below the watched
/// directory, so same-named files in different folders stay separate.
fn paper_name(dir: &Path, path: &Path) -> String {
    path.strip_prefix(dir)
        .map(|rel| rel.to_string_lossy().replace('\\', "/"))
        .unwrap_or_else(|_| path.display().to_string())
}

fn candidate_paths(event: Event) -> Vec<PathBuf> {
    match event.kind {
        EventKind::Create(_) | EventKind::Modify(_) => event
            .paths
            .into_iter()
            .filter(|p| {
                p.extension()
                    .map(|ext| ext.eq_ignore_ascii_case("pdf"))
                    .unwrap_or(false)
            })
            .collect(),
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paper_name_relative_to_watched_dir() {
        let dir = Path::new("/papers");
        assert_eq!(paper_name(dir, Path::new("/papers/paper.pdf")), "paper.pdf");
        assert_eq!(paper_name(dir, Path::new("/papers/a/paper.pdf")), "a/paper.pdf");
        assert_ne!(
            paper_name(dir, Path::new("/papers/a/paper.pdf")),
            paper_name(dir, Path::new("/papers/b/paper.pdf"))
        );
    }
}
