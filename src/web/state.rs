use std::sync::Arc;

use tokio::sync::Mutex;

use crate::analysis::{LlmClient, LlmError};
use crate::core::config::AssistantConfig;
use crate::core::paths::AssistantPaths;
use crate::search::KnowledgeBase;

/// Shared state for all handlers
pub struct AppState {
    // SQLite connection is not Sync; every knowledge-base access goes through the lock
    pub kb: Mutex<KnowledgeBase>,

    // Optional: analysis works without an AI backend
    pub llm: Option<LlmClient>,

    pub config: AssistantConfig,
}

impl AppState {
    /// Fails only when an AI backend is configured and its client cannot be built.
    pub fn new(kb: KnowledgeBase, config: AssistantConfig) -> Result<Arc<Self>, LlmError> {
        let llm = LlmClient::from_config(&config.llm)?;
        Ok(Arc::new(Self {
            kb: Mutex::new(kb),
            llm,
            config,
        }))
    }

    /// Open the configured knowledge base.
    pub fn from_config(paths: &AssistantPaths, config: AssistantConfig) -> anyhow::Result<Arc<Self>> {
        paths.ensure_data_dir()?;
        let db_path = config.database_path(paths);
        let kb = KnowledgeBase::open(&db_path, config.retrieval.min_score)?;
        tracing::info!(
            database = %db_path.display(),
            ready = kb.is_ready(),
            ai_backend = config.llm.endpoint.is_some(),
            "knowledge base opened"
        );
        Ok(Self::new(kb, config)?)
    }
}
