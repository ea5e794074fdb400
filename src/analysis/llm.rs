//! AI backend client
//!
//! Talks to any OpenAI-compatible chat-completions endpoint (OpenAI, vLLM,
//! Ollama's `/v1`, ...). Ollama's native `response` field is accepted too.

use std::time::Duration;

use serde_json::{json, Value};
use thiserror::Error;
use tracing::{debug, info};

use super::FormulationAnalysis;
use crate::core::config::LlmConfig;
use crate::search::SearchHit;

/// Retrieved excerpts included in the prompt.
const MAX_CONTEXT_HITS: usize = 3;
const MAX_EXCERPT_CHARS: usize = 600;

const SYSTEM_PROMPT: &str = "You are an expert in lithium battery electrolytes. \
Given a formulation, a rule-based analysis of it and excerpts from related papers, \
write concise, practical recommendations for improving the electrolyte. \
Cite the excerpts by number when you rely on them.";

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("AI backend is not configured (set llm.endpoint)")]
    NotConfigured,

    #[error("AI backend request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("AI backend returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("AI backend response had no content")]
    EmptyResponse,
}

#[derive(Debug, Clone)]
pub struct LlmClient {
    http: reqwest::Client,
    endpoint: String,
    model: String,
    api_key: Option<String>,
    temperature: f32,
    max_tokens: u32,
}

impl LlmClient {
    /// `Ok(None)` when no endpoint is configured.
    pub fn from_config(config: &LlmConfig) -> Result<Option<Self>, LlmError> {
        let Some(endpoint) = config.endpoint.as_deref() else {
            return Ok(None);
        };
        let endpoint = endpoint.trim().trim_end_matches('/').to_string();
        if endpoint.is_empty() {
            return Ok(None);
        }
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Some(Self {
            http,
            endpoint,
            model: config.model.clone(),
            api_key: config.api_key.clone(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
        }))
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Ask the backend for a recommendation narrative.
    pub async fn recommend(
        &self,
        formulation: &str,
        analysis: &FormulationAnalysis,
        hits: &[SearchHit],
    ) -> Result<String, LlmError> {
        let prompt = build_prompt(formulation, analysis, hits);
        info!(model = %self.model, hits = hits.len().min(MAX_CONTEXT_HITS), "requesting AI recommendation");
        self.complete(SYSTEM_PROMPT, &prompt).await
    }

    async fn complete(&self, system: &str, user: &str) -> Result<String, LlmError> {
        let url = format!("{}/chat/completions", self.endpoint);
        let body = json!({
            "model": self.model,
            "messages": [
                {"role": "system", "content": system},
                {"role": "user", "content": user},
            ],
            "temperature": self.temperature,
            "max_tokens": self.max_tokens,
            "stream": false,
        });

        let mut request = self.http.post(&url).json(&body);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(LlmError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let value: Value = response.json().await?;
        debug!(response = %value, "AI backend response");
        extract_content(&value).ok_or(LlmError::EmptyResponse)
    }
}

/// `choices[0].message.content`, or Ollama's top-level `response`.
fn extract_content(value: &Value) -> Option<String> {
    value
        .pointer("/choices/0/message/content")
        .or_else(|| value.get("response"))
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
}

fn build_prompt(formulation: &str, analysis: &FormulationAnalysis, hits: &[SearchHit]) -> String {
    let mut prompt = format!("Formulation: {}\n\n", formulation);

    prompt.push_str("Identified components:\n");
    for c in &analysis.components {
        match c.concentration {
            Some(m) => prompt.push_str(&format!("- {} {} ({} M): {}\n", c.kind, c.name, m, c.role)),
            None => prompt.push_str(&format!("- {} {}: {}\n", c.kind, c.name, c.role)),
        }
    }

    prompt.push_str("\nPredicted performance:\n");
    for p in &analysis.predictions {
        prompt.push_str(&format!("- {}: {} {}\n", p.metric, p.predicted_value, p.unit));
    }

    if !analysis.risks.is_empty() {
        prompt.push_str("\nRisks:\n");
        for r in &analysis.risks {
            prompt.push_str(&format!("- {}\n", r));
        }
    }

    if !hits.is_empty() {
        prompt.push_str("\nRelated literature:\n");
        for (i, hit) in hits.iter().take(MAX_CONTEXT_HITS).enumerate() {
            let excerpt: String = hit.document.content.chars().take(MAX_EXCERPT_CHARS).collect();
            prompt.push_str(&format!(
                "[{}] {} ({}): {}\n",
                i + 1,
                hit.document.metadata.title,
                hit.document.metadata.section,
                excerpt.trim()
            ));
        }
    }

    prompt.push_str("\nGive specific recommendations to improve this electrolyte.");
    prompt
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::analyze_formulation;
    use crate::search::examples::example_documents;

    #[test]
    fn test_from_config_requires_endpoint() {
        assert!(LlmClient::from_config(&LlmConfig::default()).unwrap().is_none());

        let blank = LlmConfig {
            endpoint: Some("  ".into()),
            ..Default::default()
        };
        assert!(LlmClient::from_config(&blank).unwrap().is_none());

        let config = LlmConfig {
            endpoint: Some("http://localhost:11434/v1/".into()),
            ..Default::default()
        };
        let client = LlmClient::from_config(&config).unwrap().expect("client built");
        assert_eq!(client.endpoint, "http://localhost:11434/v1");
        assert_eq!(client.model(), "qwen2.5:7b");
    }

    #[test]
    fn test_extract_content() {
        let openai = json!({"choices": [{"message": {"content": " Use FEC. "}}]});
        assert_eq!(extract_content(&openai).as_deref(), Some("Use FEC."));

        let ollama = json!({"response": "Add VC"});
        assert_eq!(extract_content(&ollama).as_deref(), Some("Add VC"));

        assert_eq!(extract_content(&json!({"choices": []})), None);
    }

    #[test]
    fn test_prompt_limits_context() {
        let analysis = analyze_formulation("1 M LiPF6 in EC/DMC");
        let hits: Vec<SearchHit> = example_documents()
            .into_iter()
            .chain(example_documents())
            .map(|document| SearchHit {
                document,
                similarity: 0.4,
            })
            .collect();
        let prompt = build_prompt("1 M LiPF6 in EC/DMC", &analysis, &hits);
        assert!(prompt.contains("[3]"));
        assert!(!prompt.contains("[4]"));
        assert!(prompt.contains("salt LiPF6 (1 M)"));
        assert!(prompt.contains("Risks:"));
    }

    #[tokio::test]
    #[ignore] // requires a running OpenAI-compatible server at ELECTROLYTE_LLM_ENDPOINT
    async fn test_live_recommendation() {
        let config = LlmConfig {
            endpoint: std::env::var("ELECTROLYTE_LLM_ENDPOINT").ok(),
            ..Default::default()
        };
        let client = LlmClient::from_config(&config).unwrap().expect("endpoint configured");
        let analysis = analyze_formulation("1 M LiPF6 in EC/DMC");
        let text = client.recommend("1 M LiPF6 in EC/DMC", &analysis, &[]).await.unwrap();
        assert!(!text.is_empty());
    }
}
