use anyhow::Result;
use colored::*;

use electrolyte_assistant::mcp::run_mcp_server;

use super::Workspace;

pub fn run(workspace: Workspace) -> Result<()> {
    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(run_mcp_server(workspace.paths, workspace.config))
}

pub fn print_install_instructions() {
    let workspace_path = std::env::current_dir()
        .map(|p| p.to_string_lossy().to_string())
        .unwrap_or_else(|_| "/path/to/your/workspace".to_string());

    let binary_path = std::env::current_exe()
        .map(|p| p.to_string_lossy().to_string())
        .unwrap_or_else(|_| "electrolyte".to_string());

    println!("{}", "MCP Server Installation Guide".bold().cyan());
    println!();
    println!("Add the following to your MCP client configuration:");
    println!();
    println!(r#"{{
  "mcpServers": {{
    "electrolyte": {{
      "command": "{}",
      "args": ["mcp"],
      "cwd": "{}"
    }}
  }}
}}"#, binary_path, workspace_path);
    println!();
    println!("{}", "Available tools:".bold());
    println!("  • {} - Search ingested papers", "electrolyte_search".green());
    println!("  • {} - Analyze a formulation", "electrolyte_analyze".green());
    println!("  • {} - Extract formulations and metrics from text", "electrolyte_extract".green());
    println!("  • {} - Knowledge base status", "electrolyte_status".green());
}
