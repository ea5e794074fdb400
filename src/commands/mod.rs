pub mod analyze;
pub mod batch;
pub mod clear;
pub mod examples;
pub mod extract;
pub mod ingest;
#[cfg(feature = "mcp")]
pub mod mcp;
pub mod output;
pub mod search;
pub mod serve;
pub mod status;
#[cfg(feature = "watch")]
pub mod watch;

use std::path::Path;

use anyhow::{Context, Result};

use electrolyte_assistant::core::config::AssistantConfig;
use electrolyte_assistant::core::paths::AssistantPaths;
use electrolyte_assistant::search::KnowledgeBase;

/// Workspace paths plus loaded configuration, shared by every command.
pub struct Workspace {
    pub paths: AssistantPaths,
    pub config: AssistantConfig,
}

impl Workspace {
    pub fn load(config_file: Option<&Path>) -> Result<Self> {
        let paths = AssistantPaths::current().context("Cannot determine working directory")?;
        let config = AssistantConfig::load(&paths, config_file)?;
        Ok(Self { paths, config })
    }

    pub fn open_knowledge_base(&self) -> Result<KnowledgeBase> {
        self.paths.ensure_data_dir()?;
        let db_path = self.config.database_path(&self.paths);
        KnowledgeBase::open(&db_path, self.config.retrieval.min_score)
            .with_context(|| format!("Failed to open knowledge base {}", db_path.display()))
    }
}
