use anyhow::Result;
use colored::*;

use super::Workspace;

pub fn run(workspace: &Workspace, json: bool) -> Result<()> {
    let mut kb = workspace.open_knowledge_base()?;
    let before = kb.statistics()?;
    kb.clear()?;

    if json {
        println!(
            "{}",
            serde_json::json!({
                "documents_removed": before.document_count,
                "analyses_removed": before.analysis_count,
            })
        );
    } else {
        println!(
            "{} Removed {} documents and {} analyses",
            "✓".green().bold(),
            before.document_count,
            before.analysis_count
        );
    }
    Ok(())
}
