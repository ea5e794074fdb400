//! Assistant configuration
//!
//! Loaded from `electrolyte.yaml` (all keys optional) and then overridden
//! by `ELECTROLYTE_*` environment variables.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::paths::AssistantPaths;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AssistantConfig {
    pub retrieval: RetrievalConfig,
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub llm: LlmConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalConfig {
    /// Maximum words per indexed chunk (0 keeps whole sections)
    pub chunk_size: usize,
    /// Words shared between consecutive chunks
    pub chunk_overlap: usize,
    pub top_k: usize,
    /// Hits scoring below this are dropped
    pub min_score: f64,
    /// Hits scoring at or above this are flagged as highly relevant
    pub similarity_threshold: f64,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            chunk_size: 512,
            chunk_overlap: 50,
            top_k: 5,
            min_score: 0.1,
            similarity_threshold: 0.7,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".into(),
            port: 8501,
        }
    }
}

impl ServerConfig {
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Knowledge base file; defaults to `.electrolyte/knowledge.db`
    pub database: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Base URL of an OpenAI-compatible API, e.g. `http://localhost:11434/v1`
    pub endpoint: Option<String>,
    pub model: String,
    pub api_key: Option<String>,
    pub timeout_secs: u64,
    pub temperature: f32,
    pub max_tokens: u32,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            model: "qwen2.5:7b".into(),
            api_key: None,
            timeout_secs: 60,
            temperature: 0.3,
            max_tokens: 1024,
        }
    }
}

impl AssistantConfig {
    /// Load configuration for a workspace.
    ///
    /// An explicit `path` must exist; the default `electrolyte.yaml` is
    /// optional.
    pub fn load(paths: &AssistantPaths, path: Option<&Path>) -> Result<Self> {
        let (file, required) = match path {
            Some(p) => (paths.resolve(p), true),
            None => (paths.config_file.clone(), false),
        };

        let mut config = if file.exists() {
            let raw = std::fs::read_to_string(&file)
                .with_context(|| format!("Failed to read config {}", file.display()))?;
            Self::from_yaml(&raw)
                .with_context(|| format!("Invalid config {}", file.display()))?
        } else if required {
            anyhow::bail!("Config file not found: {}", file.display());
        } else {
            Self::default()
        };

        config.apply_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    pub fn from_yaml(raw: &str) -> Result<Self> {
        if raw.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(raw)?)
    }

    /// Apply `ELECTROLYTE_*` overrides from a variable lookup.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(host) = lookup("ELECTROLYTE_HOST") {
            self.server.host = host;
        }
        if let Some(port) = lookup("ELECTROLYTE_PORT").and_then(|p| p.parse().ok()) {
            self.server.port = port;
        }
        if let Some(db) = lookup("ELECTROLYTE_DB") {
            self.storage.database = Some(PathBuf::from(db));
        }
        if let Some(endpoint) = lookup("ELECTROLYTE_LLM_ENDPOINT") {
            self.llm.endpoint = Some(endpoint).filter(|e| !e.is_empty());
        }
        if let Some(model) = lookup("ELECTROLYTE_LLM_MODEL") {
            self.llm.model = model;
        }
        if let Some(key) = lookup("ELECTROLYTE_LLM_API_KEY") {
            self.llm.api_key = Some(key).filter(|k| !k.is_empty());
        }
    }

    pub fn database_path(&self, paths: &AssistantPaths) -> PathBuf {
        self.storage
            .database
            .as_deref()
            .map(|p| paths.resolve(p))
            .unwrap_or_else(|| paths.database.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let config = AssistantConfig::default();
        assert_eq!(config.retrieval.chunk_size, 512);
        assert_eq!(config.retrieval.chunk_overlap, 50);
        assert_eq!(config.retrieval.top_k, 5);
        assert_eq!(config.server.bind_addr(), "0.0.0.0:8501");
        assert!(config.llm.endpoint.is_none());
    }

    #[test]
    fn test_partial_yaml() -> Result<()> {
        let config = AssistantConfig::from_yaml(
            "retrieval:\n  top_k: 8\nserver:\n  port: 9000\nllm:\n  endpoint: http://localhost:11434/v1\n",
        )?;
        assert_eq!(config.retrieval.top_k, 8);
        assert_eq!(config.retrieval.min_score, 0.1);
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.llm.endpoint.as_deref(), Some("http://localhost:11434/v1"));
        Ok(())
    }

    #[test]
    fn test_env_overrides() {
        let vars: HashMap<&str, &str> = HashMap::from([
            ("ELECTROLYTE_PORT", "8600"),
            ("ELECTROLYTE_HOST", "127.0.0.1"),
            ("ELECTROLYTE_LLM_API_KEY", ""),
            ("ELECTROLYTE_DB", "/tmp/kb.db"),
        ]);
        let mut config = AssistantConfig::default();
        config.apply_overrides(|k| vars.get(k).map(|v| v.to_string()));

        assert_eq!(config.server.bind_addr(), "127.0.0.1:8600");
        assert!(config.llm.api_key.is_none());

        let paths = AssistantPaths::from_root(PathBuf::from("/work"));
        assert_eq!(config.database_path(&paths), PathBuf::from("/tmp/kb.db"));
    }

    #[test]
    fn test_missing_explicit_config_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let paths = AssistantPaths::from_root(dir.path().to_path_buf());
        assert!(AssistantConfig::load(&paths, Some(Path::new("nope.yaml"))).is_err());
        assert!(AssistantConfig::load(&paths, None).is_ok());
    }
}
