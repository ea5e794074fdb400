use anyhow::Result;
use colored::*;

use super::output;
use super::Workspace;

pub fn run(workspace: &Workspace, json: bool) -> Result<()> {
    let mut kb = workspace.open_knowledge_base()?;
    let added = kb.load_examples()?;
    let stats = kb.statistics()?;

    if json {
        println!(
            "{}",
            serde_json::json!({ "documents_added": added, "knowledge_base": stats })
        );
        return Ok(());
    }

    println!("{} Loaded {} example documents", "✓".green().bold(), added.to_string().cyan());
    output::knowledge_stats(&stats);
    Ok(())
}
