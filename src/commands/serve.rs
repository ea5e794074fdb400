use anyhow::Result;
use colored::*;

use electrolyte_assistant::web::{self, AppState};

use super::Workspace;

pub fn run(workspace: Workspace, host: Option<String>, port: Option<u16>) -> Result<()> {
    let Workspace { paths, mut config } = workspace;
    if let Some(host) = host {
        config.server.host = host;
    }
    if let Some(port) = port {
        config.server.port = port;
    }
    let addr = config.server.bind_addr();

    let state = AppState::from_config(&paths, config)?;
    println!("{} Web UI at {}", "→".dimmed(), format!("http://{}", addr).cyan());

    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(web::serve(state, &addr))
}
